use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::MortgageError;
use crate::loan::Loan;
use crate::property::House;
use crate::simulator::ComparisonInput;
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::MortgageResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Range of financed amounts to sweep, inclusive of `max`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AmountRange {
    pub min: Money,
    pub max: Money,
    pub step: Money,
}

/// One point of a cost-vs-amount chart series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Financed amount this point is scaled to
    pub amount: Money,
    /// Monthly figure: installment for loans, total monthly cost for houses
    pub monthly: Money,
    /// Lifetime figure: loan total for loans, loan total plus one year of
    /// recurring extras for houses
    pub total: Money,
}

/// A labelled series for one loan or house across financed amounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSeries {
    /// Legend label, "<rate>% TIN"
    pub label: String,
    pub points: Vec<ChartPoint>,
}

/// Loan and house series for every entity in the comparison document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesOutput {
    pub loans: Vec<ChartSeries>,
    pub houses: Vec<ChartSeries>,
}

impl AmountRange {
    /// Materialise the swept amounts. Never overshoots `max`; a misaligned
    /// step simply stops short of it.
    fn amounts(&self) -> MortgageResult<Vec<Money>> {
        if self.min <= Decimal::ZERO {
            return Err(MortgageError::InvalidInput {
                field: "min".into(),
                reason: "Range minimum must be positive".into(),
            });
        }
        if self.max < self.min {
            return Err(MortgageError::InvalidInput {
                field: "max".into(),
                reason: "Range maximum cannot be below the minimum".into(),
            });
        }
        if self.step <= Decimal::ZERO {
            return Err(MortgageError::InvalidInput {
                field: "step".into(),
                reason: "Range step must be positive".into(),
            });
        }

        let mut amounts = Vec::new();
        let mut amount = self.min;
        while amount <= self.max {
            amounts.push(amount);
            amount += self.step;
        }
        Ok(amounts)
    }
}

// ---------------------------------------------------------------------------
// Series construction
// ---------------------------------------------------------------------------

/// Payments scale linearly in the financed amount, so every point is the
/// base loan's figure times `amount / principal`.
fn scaled_points(
    principal: Money,
    monthly: Money,
    total: Money,
    amounts: &[Money],
) -> Vec<ChartPoint> {
    amounts
        .iter()
        .map(|&amount| {
            let scale = amount / principal;
            ChartPoint {
                amount,
                monthly: (monthly * scale).round_dp(2),
                total: (total * scale).round_dp(2),
            }
        })
        .collect()
}

fn rate_label(loan: &Loan) -> String {
    format!("{}% TIN", loan.annual_rate())
}

fn loan_series(loan: &Loan, amounts: &[Money]) -> ChartSeries {
    ChartSeries {
        label: rate_label(loan),
        points: scaled_points(
            loan.principal(),
            loan.monthly_payment(),
            loan.total_payment(),
            amounts,
        ),
    }
}

fn house_series(house: &House, amounts: &[Money]) -> ChartSeries {
    let loan = house.loan();
    ChartSeries {
        label: rate_label(loan),
        points: scaled_points(
            loan.principal(),
            house.total_monthly_cost(),
            house.lifetime_cost(),
            amounts,
        ),
    }
}

/// Chart series for every loan and house in the document, swept over the
/// amount range.
pub fn build_series(
    input: &ComparisonInput,
    range: &AmountRange,
) -> MortgageResult<ComputationOutput<SeriesOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let amounts = range.amounts()?;
    if input.loans.is_empty() && input.houses.is_empty() {
        warnings.push("No loans or houses provided; series output is empty".into());
    }

    let mut loans = Vec::with_capacity(input.loans.len());
    for loan_input in &input.loans {
        loans.push(loan_series(&Loan::from_input(loan_input)?, &amounts));
    }
    let mut houses = Vec::with_capacity(input.houses.len());
    for house_input in &input.houses {
        houses.push(house_series(&House::from_input(house_input)?, &amounts));
    }

    let output = SeriesOutput { loans, houses };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Linear scaling of per-loan figures across financed amounts",
        &serde_json::json!({
            "amount_min": range.min.to_string(),
            "amount_max": range.max.to_string(),
            "amount_step": range.step.to_string(),
            "points_per_series": amounts.len(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::LoanInput;
    use rust_decimal_macros::dec;

    fn reference_input() -> ComparisonInput {
        ComparisonInput {
            loans: vec![LoanInput {
                principal: dec!(100000),
                annual_rate: dec!(3.5),
                term_years: 30,
            }],
            houses: Vec::new(),
        }
    }

    #[test]
    fn test_range_is_inclusive_and_never_overshoots() {
        let aligned = AmountRange {
            min: dec!(50000),
            max: dec!(150000),
            step: dec!(50000),
        };
        assert_eq!(
            aligned.amounts().unwrap(),
            vec![dec!(50000), dec!(100000), dec!(150000)]
        );

        let misaligned = AmountRange {
            min: dec!(50000),
            max: dec!(140000),
            step: dec!(50000),
        };
        assert_eq!(
            misaligned.amounts().unwrap(),
            vec![dec!(50000), dec!(100000)]
        );
    }

    #[test]
    fn test_point_at_principal_reproduces_loan_figures() {
        let range = AmountRange {
            min: dec!(100000),
            max: dec!(100000),
            step: dec!(1),
        };
        let out = build_series(&reference_input(), &range).unwrap();
        let point = &out.result.loans[0].points[0];
        assert_eq!(point.monthly, dec!(449.04));
    }

    #[test]
    fn test_scaling_is_linear() {
        let range = AmountRange {
            min: dec!(50000),
            max: dec!(200000),
            step: dec!(150000),
        };
        let out = build_series(&reference_input(), &range).unwrap();
        let points = &out.result.loans[0].points;
        // 200k is 4x the 50k point, within rounding of the scaled figures
        assert!(
            (points[1].monthly - points[0].monthly * dec!(4)).abs() <= dec!(0.02),
            "expected linear scaling, got {} vs {}",
            points[1].monthly,
            points[0].monthly
        );
    }

    #[test]
    fn test_label_carries_rate() {
        let range = AmountRange {
            min: dec!(100000),
            max: dec!(100000),
            step: dec!(1),
        };
        let out = build_series(&reference_input(), &range).unwrap();
        assert_eq!(out.result.loans[0].label, "3.5% TIN");
    }

    #[test]
    fn test_bad_range_rejected() {
        let range = AmountRange {
            min: dec!(100000),
            max: dec!(50000),
            step: dec!(1000),
        };
        assert!(build_series(&reference_input(), &range).is_err());
    }
}
