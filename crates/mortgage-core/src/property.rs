use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::MortgageError;
use crate::loan::{AmortizationSchedule, Loan, LoanInput};
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::MortgageResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Parameters describing a financed property: the loan plus its recurring
/// non-mortgage costs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HouseInput {
    pub loan: LoanInput,
    /// Annual property tax
    pub annual_property_tax: Money,
    /// Annual home insurance premium
    pub annual_home_insurance: Money,
    /// Annual maintenance budget
    pub annual_maintenance: Money,
    /// Community fees, already monthly
    pub community_fees: Money,
    /// Utilities estimate, already monthly
    pub utilities: Money,
}

/// A financed property. Owns its loan; all cost figures are fixed at
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct House {
    loan: Loan,
    annual_property_tax: Money,
    annual_home_insurance: Money,
    annual_maintenance: Money,
    community_fees: Money,
    utilities: Money,
}

/// One month of the merged cost schedule: the installment breakdown plus the
/// recurring ownership costs, all rounded to cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedEntry {
    pub month: u32,
    pub installment: Money,
    pub interest: Money,
    pub principal: Money,
    pub remaining_balance: Money,
    pub property_tax: Money,
    pub home_insurance: Money,
    pub maintenance: Money,
    pub community_fees: Money,
    pub utilities: Money,
    /// Installment plus all recurring costs for the month
    pub total_cost: Money,
}

/// Monthly ownership cost components for one property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub monthly_payment: Money,
    pub property_tax: Money,
    pub home_insurance: Money,
    pub maintenance: Money,
    pub community_fees: Money,
    pub utilities: Money,
    pub total_monthly_cost: Money,
}

/// Collected merged schedule with headline totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HouseScheduleOutput {
    pub monthly_payment: Money,
    pub total_monthly_cost: Money,
    /// Months actually present in the schedule (≤ the loan term)
    pub months: u32,
    pub entries: Vec<DetailedEntry>,
}

// ---------------------------------------------------------------------------
// House
// ---------------------------------------------------------------------------

impl House {
    pub fn new(
        loan: Loan,
        annual_property_tax: Money,
        annual_home_insurance: Money,
        annual_maintenance: Money,
        community_fees: Money,
        utilities: Money,
    ) -> MortgageResult<Self> {
        check_non_negative("annual_property_tax", annual_property_tax)?;
        check_non_negative("annual_home_insurance", annual_home_insurance)?;
        check_non_negative("annual_maintenance", annual_maintenance)?;
        check_non_negative("community_fees", community_fees)?;
        check_non_negative("utilities", utilities)?;

        Ok(Self {
            loan,
            annual_property_tax,
            annual_home_insurance,
            annual_maintenance,
            community_fees,
            utilities,
        })
    }

    pub fn from_input(input: &HouseInput) -> MortgageResult<Self> {
        Self::new(
            Loan::from_input(&input.loan)?,
            input.annual_property_tax,
            input.annual_home_insurance,
            input.annual_maintenance,
            input.community_fees,
            input.utilities,
        )
    }

    pub fn loan(&self) -> &Loan {
        &self.loan
    }

    pub fn monthly_property_tax(&self) -> Money {
        self.annual_property_tax / MONTHS_PER_YEAR
    }

    pub fn monthly_home_insurance(&self) -> Money {
        self.annual_home_insurance / MONTHS_PER_YEAR
    }

    pub fn monthly_maintenance(&self) -> Money {
        self.annual_maintenance / MONTHS_PER_YEAR
    }

    pub fn community_fees(&self) -> Money {
        self.community_fees
    }

    pub fn utilities(&self) -> Money {
        self.utilities
    }

    /// Installment plus every recurring cost, unrounded.
    pub fn total_monthly_cost(&self) -> Money {
        self.loan.monthly_payment()
            + self.monthly_property_tax()
            + self.monthly_home_insurance()
            + self.monthly_maintenance()
            + self.community_fees
            + self.utilities
    }

    /// One year of recurring costs on top of the loan's lifetime total.
    /// The chart series use this as the property's headline lifetime figure.
    pub fn lifetime_cost(&self) -> Money {
        self.loan.total_payment()
            + self.annual_property_tax
            + self.annual_home_insurance
            + self.annual_maintenance
            + (self.community_fees + self.utilities) * MONTHS_PER_YEAR
    }

    /// Merged monthly schedule. Terminates when the underlying loan schedule
    /// does; the overlay never decides termination on its own.
    pub fn detailed_schedule(&self) -> DetailedSchedule {
        DetailedSchedule {
            inner: self.loan.amortization_schedule(),
            property_tax: self.monthly_property_tax(),
            home_insurance: self.monthly_home_insurance(),
            maintenance: self.monthly_maintenance(),
            community_fees: self.community_fees,
            utilities: self.utilities,
        }
    }
}

fn check_non_negative(field: &str, value: Money) -> MortgageResult<()> {
    if value < Decimal::ZERO {
        return Err(MortgageError::InvalidInput {
            field: field.into(),
            reason: "Cost figures cannot be negative".into(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Schedule iterator
// ---------------------------------------------------------------------------

/// Adapter over [`AmortizationSchedule`] that attaches the recurring cost
/// components to each month.
///
/// The monthly total adds the rounded installment to the unrounded cost
/// components before its own rounding, so it matches the printed installment
/// rather than re-deriving it.
#[derive(Debug, Clone)]
pub struct DetailedSchedule {
    inner: AmortizationSchedule,
    property_tax: Money,
    home_insurance: Money,
    maintenance: Money,
    community_fees: Money,
    utilities: Money,
}

impl Iterator for DetailedSchedule {
    type Item = DetailedEntry;

    fn next(&mut self) -> Option<DetailedEntry> {
        let base = self.inner.next()?;
        let total_cost = base.installment
            + self.property_tax
            + self.home_insurance
            + self.maintenance
            + self.community_fees
            + self.utilities;

        Some(DetailedEntry {
            month: base.month,
            installment: base.installment,
            interest: base.interest,
            principal: base.principal,
            remaining_balance: base.remaining_balance,
            property_tax: self.property_tax.round_dp(2),
            home_insurance: self.home_insurance.round_dp(2),
            maintenance: self.maintenance.round_dp(2),
            community_fees: self.community_fees.round_dp(2),
            utilities: self.utilities.round_dp(2),
            total_cost: total_cost.round_dp(2),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

// ---------------------------------------------------------------------------
// Computation entry points
// ---------------------------------------------------------------------------

/// Monthly cost components for one property.
pub fn build_cost_breakdown(
    input: &HouseInput,
) -> MortgageResult<ComputationOutput<CostBreakdown>> {
    let start = Instant::now();

    let house = House::from_input(input)?;
    let output = CostBreakdown {
        monthly_payment: house.loan().monthly_payment().round_dp(2),
        property_tax: house.monthly_property_tax().round_dp(2),
        home_insurance: house.monthly_home_insurance().round_dp(2),
        maintenance: house.monthly_maintenance().round_dp(2),
        community_fees: house.community_fees().round_dp(2),
        utilities: house.utilities().round_dp(2),
        total_monthly_cost: house.total_monthly_cost().round_dp(2),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Monthly ownership cost breakdown",
        &house_assumptions(input),
        Vec::new(),
        elapsed,
        output,
    ))
}

/// Build the merged amortization-plus-costs schedule for a property.
pub fn build_house_schedule(
    input: &HouseInput,
) -> MortgageResult<ComputationOutput<HouseScheduleOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let house = House::from_input(input)?;
    let entries: Vec<DetailedEntry> = house.detailed_schedule().collect();

    let months = entries.len() as u32;
    if months < house.loan().term_months() {
        warnings.push(format!(
            "Schedule closed after {} of {} months: the rounded balance reached zero early",
            months,
            house.loan().term_months()
        ));
    }

    let output = HouseScheduleOutput {
        monthly_payment: house.loan().monthly_payment().round_dp(2),
        total_monthly_cost: house.total_monthly_cost().round_dp(2),
        months,
        entries,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "French amortization schedule with ownership cost overlay",
        &house_assumptions(input),
        warnings,
        elapsed,
        output,
    ))
}

pub(crate) fn house_assumptions(input: &HouseInput) -> serde_json::Value {
    serde_json::json!({
        "principal": input.loan.principal.to_string(),
        "annual_rate_pct": input.loan.annual_rate.to_string(),
        "term_years": input.loan.term_years,
        "annual_property_tax": input.annual_property_tax.to_string(),
        "annual_home_insurance": input.annual_home_insurance.to_string(),
        "annual_maintenance": input.annual_maintenance.to_string(),
        "community_fees": input.community_fees.to_string(),
        "utilities": input.utilities.to_string(),
    })
}
