use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::MortgageError;
use crate::loan::{annuity_payment, Loan, LoanInput, MONTHS_PER_YEAR, PERCENT_ANNUAL_TO_MONTHLY};
use crate::property::{House, HouseInput};
use crate::solver::{bisect, BisectionConfig, BisectionOutcome};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::MortgageResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Side-by-side comparison of loans and financed properties.
///
/// Entities are appended in the order they should appear in comparison
/// output; nothing here mutates them after insertion.
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    loans: Vec<Loan>,
    houses: Vec<House>,
}

/// Document form of a comparison: loans and/or houses to line up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonInput {
    #[serde(default)]
    pub loans: Vec<LoanInput>,
    #[serde(default)]
    pub houses: Vec<HouseInput>,
}

/// Per-loan row in a comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanSummary {
    pub principal: Money,
    pub annual_rate: Rate,
    pub term_years: u32,
    pub monthly_payment: Money,
    pub total_payment: Money,
}

/// Per-house row in a comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HouseSummary {
    pub principal: Money,
    pub annual_rate: Rate,
    pub term_years: u32,
    pub monthly_payment: Money,
    pub total_monthly_cost: Money,
}

/// Both comparison tables, in insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonOutput {
    pub loans: Vec<LoanSummary>,
    pub houses: Vec<HouseSummary>,
}

/// Parameters for inverting the payment formula.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateSearchInput {
    pub principal: Money,
    pub term_years: u32,
    pub target_monthly_payment: Money,
}

/// Solved rate with the payment it actually achieves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateSearchOutput {
    /// Annual rate in percent
    pub annual_rate: Rate,
    pub achieved_payment: Money,
    pub iterations: u32,
}

// ---------------------------------------------------------------------------
// Simulator
// ---------------------------------------------------------------------------

impl Simulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_loan(&mut self, loan: Loan) {
        self.loans.push(loan);
    }

    pub fn add_house(&mut self, house: House) {
        self.houses.push(house);
    }

    pub fn loans(&self) -> &[Loan] {
        &self.loans
    }

    pub fn houses(&self) -> &[House] {
        &self.houses
    }

    /// Summary rows for the held loans, in insertion order.
    pub fn compare_loans(&self) -> Vec<LoanSummary> {
        self.loans
            .iter()
            .map(|loan| LoanSummary {
                principal: loan.principal(),
                annual_rate: loan.annual_rate(),
                term_years: loan.term_years(),
                monthly_payment: loan.monthly_payment().round_dp(2),
                total_payment: loan.total_payment().round_dp(2),
            })
            .collect()
    }

    /// Summary rows for the held houses, in insertion order.
    pub fn compare_houses(&self) -> Vec<HouseSummary> {
        self.houses
            .iter()
            .map(|house| {
                let loan = house.loan();
                HouseSummary {
                    principal: loan.principal(),
                    annual_rate: loan.annual_rate(),
                    term_years: loan.term_years(),
                    monthly_payment: loan.monthly_payment().round_dp(2),
                    total_monthly_cost: house.total_monthly_cost().round_dp(2),
                }
            })
            .collect()
    }

    /// Annual rate (percent) at which a loan of `principal` over `term_years`
    /// costs `target_monthly_payment` per month. Stateless; does not touch
    /// the held collections.
    pub fn required_interest_rate(
        &self,
        principal: Money,
        term_years: u32,
        target_monthly_payment: Money,
    ) -> MortgageResult<Rate> {
        required_interest_rate(principal, term_years, target_monthly_payment)
    }
}

// ---------------------------------------------------------------------------
// Rate inversion
// ---------------------------------------------------------------------------

/// Invert the installment formula: the annual rate whose monthly payment
/// matches the target, within the default tolerance.
pub fn required_interest_rate(
    principal: Money,
    term_years: u32,
    target_monthly_payment: Money,
) -> MortgageResult<Rate> {
    solve_rate(principal, term_years, target_monthly_payment).map(|(rate, _)| rate)
}

fn solve_rate(
    principal: Money,
    term_years: u32,
    target_monthly_payment: Money,
) -> MortgageResult<(Rate, u32)> {
    // Validate once, up front, so the objective below is total over the bracket.
    let probe = Loan::new(principal, Decimal::ZERO, term_years)?;
    if target_monthly_payment <= Decimal::ZERO {
        return Err(MortgageError::InvalidInput {
            field: "target_monthly_payment".into(),
            reason: "Target payment must be positive".into(),
        });
    }

    let term_months = probe.term_months();
    let payment_at =
        |rate: Rate| annuity_payment(principal, rate / PERCENT_ANNUAL_TO_MONTHLY, term_months);

    let config = BisectionConfig::default();
    match bisect(payment_at, target_monthly_payment, &config)? {
        BisectionOutcome::Converged { value, iterations } => Ok((value, iterations)),
        BisectionOutcome::MaxIterationsExceeded { last_delta, .. } => {
            Err(MortgageError::RateNotFound {
                iterations: config.max_iterations,
                last_delta,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Computation entry points
// ---------------------------------------------------------------------------

/// Line up loans and houses from a comparison document.
pub fn build_comparison(
    input: &ComparisonInput,
) -> MortgageResult<ComputationOutput<ComparisonOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let mut simulator = Simulator::new();
    for loan_input in &input.loans {
        simulator.add_loan(Loan::from_input(loan_input)?);
    }
    for house_input in &input.houses {
        simulator.add_house(House::from_input(house_input)?);
    }

    if input.loans.is_empty() && input.houses.is_empty() {
        warnings.push("Nothing to compare: no loans or houses provided".into());
    }

    let output = ComparisonOutput {
        loans: simulator.compare_loans(),
        houses: simulator.compare_houses(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Side-by-side loan and ownership cost comparison",
        &serde_json::json!({
            "loan_count": input.loans.len(),
            "house_count": input.houses.len(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Solve for the rate behind a target monthly payment and report how the
/// search went.
pub fn build_rate_search(
    input: &RateSearchInput,
) -> MortgageResult<ComputationOutput<RateSearchOutput>> {
    let start = Instant::now();

    let (annual_rate, iterations) = solve_rate(
        input.principal,
        input.term_years,
        input.target_monthly_payment,
    )?;
    let achieved = annuity_payment(
        input.principal,
        annual_rate / PERCENT_ANNUAL_TO_MONTHLY,
        input.term_years * MONTHS_PER_YEAR,
    );

    let output = RateSearchOutput {
        annual_rate,
        achieved_payment: achieved.round_dp(2),
        iterations,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Bisection search over the annual rate",
        &serde_json::json!({
            "principal": input.principal.to_string(),
            "term_years": input.term_years,
            "target_monthly_payment": input.target_monthly_payment.to_string(),
            "bracket_pct": [0, 100],
        }),
        Vec::new(),
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_trip_recovers_known_rate() {
        // Solve for the rate that produces the 3.5% loan's own payment
        let loan = Loan::new(dec!(100000), dec!(3.5), 30).unwrap();
        let target = loan.monthly_payment();

        let rate = required_interest_rate(dec!(100000), 30, target).unwrap();
        assert!(
            (rate - dec!(3.5)).abs() < dec!(0.0001),
            "expected ~3.5, got {rate}"
        );
    }

    #[test]
    fn test_rounded_target_lands_near_known_rate() {
        let rate = required_interest_rate(dec!(100000), 30, dec!(449.04)).unwrap();
        assert!(
            (rate - dec!(3.5)).abs() < dec!(0.001),
            "expected ~3.5, got {rate}"
        );
    }

    #[test]
    fn test_unreachable_target_is_rate_not_found() {
        // Zero-rate payment for 100k over 30y is 277.78; nothing below it is
        // reachable at any non-negative rate
        let result = required_interest_rate(dec!(100000), 30, dec!(100));
        assert!(matches!(
            result,
            Err(MortgageError::RateNotFound { iterations: 1000, .. })
        ));
    }

    #[test]
    fn test_non_positive_target_rejected() {
        assert!(matches!(
            required_interest_rate(dec!(100000), 30, Decimal::ZERO),
            Err(MortgageError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_comparison_preserves_insertion_order() {
        let mut simulator = Simulator::new();
        simulator.add_loan(Loan::new(dec!(100000), dec!(2.0), 30).unwrap());
        simulator.add_loan(Loan::new(dec!(100000), dec!(3.5), 30).unwrap());
        simulator.add_loan(Loan::new(dec!(100000), dec!(1.0), 30).unwrap());

        let rows = simulator.compare_loans();
        let rates: Vec<Rate> = rows.iter().map(|r| r.annual_rate).collect();
        assert_eq!(rates, vec![dec!(2.0), dec!(3.5), dec!(1.0)]);
    }

    #[test]
    fn test_rate_search_report_matches_target() {
        let input = RateSearchInput {
            principal: dec!(100000),
            term_years: 30,
            target_monthly_payment: dec!(449.04),
        };
        let out = build_rate_search(&input).unwrap();
        assert_eq!(out.result.achieved_payment, dec!(449.04));
        assert!(out.result.iterations <= 1000);
    }

    #[test]
    fn test_empty_comparison_warns() {
        let input = ComparisonInput {
            loans: Vec::new(),
            houses: Vec::new(),
        };
        let out = build_comparison(&input).unwrap();
        assert!(out.result.loans.is_empty());
        assert_eq!(out.warnings.len(), 1);
    }
}
