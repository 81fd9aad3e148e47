use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::MortgageError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::MortgageResult;

pub(crate) const MONTHS_PER_YEAR: u32 = 12;

/// Divisor taking a percent annual rate to a fractional monthly rate.
pub(crate) const PERCENT_ANNUAL_TO_MONTHLY: Decimal = dec!(1200);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Parameters describing a fixed-rate loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanInput {
    /// Financed amount
    pub principal: Money,
    /// Nominal annual interest rate in percent (TIN)
    pub annual_rate: Rate,
    /// Term in years
    pub term_years: u32,
}

/// A fixed-rate loan repaid in constant monthly installments (French
/// amortization).
///
/// Derived figures are fixed at construction; the entity is immutable.
#[derive(Debug, Clone, PartialEq)]
pub struct Loan {
    principal: Money,
    annual_rate: Rate,
    term_years: u32,
    term_months: u32,
    monthly_rate: Rate,
}

/// One month of an amortization schedule. All monetary figures rounded to
/// cents; the schedule's internal running balance is not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationEntry {
    /// Month number, 1-based
    pub month: u32,
    /// Constant installment paid this month
    pub installment: Money,
    /// Interest portion of the installment
    pub interest: Money,
    /// Principal portion of the installment
    pub principal: Money,
    /// Balance still owed after this month
    pub remaining_balance: Money,
}

/// Headline figures for a single loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSummary {
    pub monthly_payment: Money,
    pub total_payment: Money,
    pub total_interest: Money,
    pub term_months: u32,
}

/// Collected amortization schedule with aggregate totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationScheduleOutput {
    pub monthly_payment: Money,
    pub total_payment: Money,
    pub total_interest: Money,
    pub total_principal: Money,
    /// Months actually present in the schedule (≤ the loan term)
    pub months: u32,
    pub entries: Vec<AmortizationEntry>,
}

// ---------------------------------------------------------------------------
// Loan
// ---------------------------------------------------------------------------

impl Loan {
    pub fn new(principal: Money, annual_rate: Rate, term_years: u32) -> MortgageResult<Self> {
        if principal <= Decimal::ZERO {
            return Err(MortgageError::InvalidInput {
                field: "principal".into(),
                reason: "Principal must be positive".into(),
            });
        }
        if annual_rate < Decimal::ZERO {
            return Err(MortgageError::InvalidInput {
                field: "annual_rate".into(),
                reason: "Annual rate cannot be negative".into(),
            });
        }
        if term_years == 0 {
            return Err(MortgageError::InvalidInput {
                field: "term_years".into(),
                reason: "Term must be at least 1 year".into(),
            });
        }

        Ok(Self {
            principal,
            annual_rate,
            term_years,
            term_months: term_years * MONTHS_PER_YEAR,
            monthly_rate: annual_rate / PERCENT_ANNUAL_TO_MONTHLY,
        })
    }

    pub fn from_input(input: &LoanInput) -> MortgageResult<Self> {
        Self::new(input.principal, input.annual_rate, input.term_years)
    }

    pub fn principal(&self) -> Money {
        self.principal
    }

    pub fn annual_rate(&self) -> Rate {
        self.annual_rate
    }

    pub fn term_years(&self) -> u32 {
        self.term_years
    }

    pub fn term_months(&self) -> u32 {
        self.term_months
    }

    /// Fractional monthly rate (annual percent / 1200).
    pub fn monthly_rate(&self) -> Rate {
        self.monthly_rate
    }

    /// Constant monthly installment.
    pub fn monthly_payment(&self) -> Money {
        annuity_payment(self.principal, self.monthly_rate, self.term_months)
    }

    /// Total paid over the full term.
    pub fn total_payment(&self) -> Money {
        self.monthly_payment() * Decimal::from(self.term_months)
    }

    /// Lazy month-by-month schedule. See [`AmortizationSchedule`] for the
    /// termination rule.
    pub fn amortization_schedule(&self) -> AmortizationSchedule {
        AmortizationSchedule {
            monthly_payment: self.monthly_payment(),
            monthly_rate: self.monthly_rate,
            term_months: self.term_months,
            month: 0,
            balance: self.principal,
            finished: false,
        }
    }
}

/// Constant installment for `principal` at `monthly_rate` over `term_months`.
///
/// The zero-rate branch is a plain division; the general annuity formula
/// degenerates to 0/0 at a zero rate.
pub(crate) fn annuity_payment(principal: Money, monthly_rate: Rate, term_months: u32) -> Money {
    if monthly_rate.is_zero() {
        return principal / Decimal::from(term_months);
    }

    let growth = (Decimal::ONE + monthly_rate).powd(Decimal::from(term_months));
    principal * monthly_rate * growth / (growth - Decimal::ONE)
}

// ---------------------------------------------------------------------------
// Schedule iterator
// ---------------------------------------------------------------------------

/// Month-by-month amortization schedule.
///
/// Yields at most `term_months` entries and stops immediately after the
/// entry whose rounded balance is exactly zero. The running balance is
/// carried unrounded between months and clamped at zero; only the emitted
/// figures are rounded to cents.
#[derive(Debug, Clone)]
pub struct AmortizationSchedule {
    monthly_payment: Money,
    monthly_rate: Rate,
    term_months: u32,
    month: u32,
    balance: Money,
    finished: bool,
}

impl Iterator for AmortizationSchedule {
    type Item = AmortizationEntry;

    fn next(&mut self) -> Option<AmortizationEntry> {
        if self.finished || self.month >= self.term_months {
            return None;
        }

        self.month += 1;
        let interest = self.balance * self.monthly_rate;
        let principal = self.monthly_payment - interest;
        self.balance = (self.balance - principal).max(Decimal::ZERO);

        let remaining = self.balance.round_dp(2);
        if remaining.is_zero() {
            self.finished = true;
        }

        Some(AmortizationEntry {
            month: self.month,
            installment: self.monthly_payment.round_dp(2),
            interest: interest.round_dp(2),
            principal: principal.round_dp(2),
            remaining_balance: remaining,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.finished {
            return (0, Some(0));
        }
        (0, Some((self.term_months - self.month) as usize))
    }
}

// ---------------------------------------------------------------------------
// Computation entry points
// ---------------------------------------------------------------------------

/// Headline payment figures for one loan.
pub fn build_payment_summary(
    input: &LoanInput,
) -> MortgageResult<ComputationOutput<PaymentSummary>> {
    let start = Instant::now();

    let loan = Loan::from_input(input)?;
    let monthly_payment = loan.monthly_payment();
    let total_payment = loan.total_payment();

    let output = PaymentSummary {
        monthly_payment: monthly_payment.round_dp(2),
        total_payment: total_payment.round_dp(2),
        total_interest: (total_payment - loan.principal()).round_dp(2),
        term_months: loan.term_months(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "French amortization (constant installment)",
        &loan_assumptions(input),
        Vec::new(),
        elapsed,
        output,
    ))
}

/// Build the full amortization schedule for a loan.
pub fn build_amortization_schedule(
    input: &LoanInput,
) -> MortgageResult<ComputationOutput<AmortizationScheduleOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let loan = Loan::from_input(input)?;
    let entries: Vec<AmortizationEntry> = loan.amortization_schedule().collect();

    let total_interest: Money = entries.iter().map(|e| e.interest).sum();
    let total_principal: Money = entries.iter().map(|e| e.principal).sum();
    let months = entries.len() as u32;
    if months < loan.term_months() {
        warnings.push(format!(
            "Schedule closed after {} of {} months: the rounded balance reached zero early",
            months,
            loan.term_months()
        ));
    }

    let output = AmortizationScheduleOutput {
        monthly_payment: loan.monthly_payment().round_dp(2),
        total_payment: loan.total_payment().round_dp(2),
        total_interest,
        total_principal,
        months,
        entries,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "French amortization schedule (monthly, balance-terminated)",
        &loan_assumptions(input),
        warnings,
        elapsed,
        output,
    ))
}

pub(crate) fn loan_assumptions(input: &LoanInput) -> serde_json::Value {
    serde_json::json!({
        "principal": input.principal.to_string(),
        "annual_rate_pct": input.annual_rate.to_string(),
        "term_years": input.term_years,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn reference_loan() -> Loan {
        Loan::new(dec!(100000), dec!(3.5), 30).unwrap()
    }

    #[test]
    fn test_monthly_payment_reference() {
        // 100k at 3.5% over 30 years is the canonical 449.04/month case
        let loan = reference_loan();
        assert_eq!(loan.monthly_payment().round_dp(2), dec!(449.04));
        assert_eq!(loan.term_months(), 360);
    }

    #[test]
    fn test_zero_rate_is_plain_division() {
        let loan = Loan::new(dec!(120000), Decimal::ZERO, 10).unwrap();
        assert_eq!(loan.monthly_payment(), dec!(1000));
        assert_eq!(loan.total_payment(), dec!(120000));
    }

    #[test]
    fn test_total_payment_identity() {
        let loan = reference_loan();
        assert_eq!(
            loan.total_payment(),
            loan.monthly_payment() * dec!(360)
        );
    }

    #[test]
    fn test_schedule_first_month_split() {
        // Month 1: interest = 100000 * 3.5/1200 = 291.67, principal = 157.38
        let entry = reference_loan().amortization_schedule().next().unwrap();
        assert_eq!(entry.month, 1);
        assert_eq!(entry.installment, dec!(449.04));
        assert_eq!(entry.interest, dec!(291.67));
        assert_eq!(entry.principal, dec!(157.38));
    }

    #[test]
    fn test_schedule_runs_to_term_and_zeroes_out() {
        let entries: Vec<AmortizationEntry> =
            reference_loan().amortization_schedule().collect();
        assert_eq!(entries.len(), 360);
        assert_eq!(entries.last().unwrap().remaining_balance, Decimal::ZERO);
    }

    #[test]
    fn test_schedule_stops_once_rounded_balance_is_zero() {
        // Sub-cent principal: the first month's balance already rounds to 0
        let loan = Loan::new(dec!(0.004), Decimal::ZERO, 1).unwrap();
        let entries: Vec<AmortizationEntry> = loan.amortization_schedule().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].remaining_balance, Decimal::ZERO);
    }

    #[test]
    fn test_schedule_is_regenerable() {
        let loan = reference_loan();
        let first: Vec<AmortizationEntry> = loan.amortization_schedule().collect();
        let second: Vec<AmortizationEntry> = loan.amortization_schedule().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        assert!(Loan::new(Decimal::ZERO, dec!(3.5), 30).is_err());
        assert!(Loan::new(dec!(-1), dec!(3.5), 30).is_err());
        assert!(Loan::new(dec!(100000), dec!(-0.1), 30).is_err());
        assert!(Loan::new(dec!(100000), dec!(3.5), 0).is_err());
    }

    #[test]
    fn test_summary_envelope() {
        let input = LoanInput {
            principal: dec!(100000),
            annual_rate: dec!(3.5),
            term_years: 30,
        };
        let out = build_payment_summary(&input).unwrap();
        assert_eq!(out.result.monthly_payment, dec!(449.04));
        assert_eq!(
            out.result.total_interest,
            out.result.total_payment - dec!(100000)
        );
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_schedule_envelope_warns_on_early_close() {
        let input = LoanInput {
            principal: dec!(0.004),
            annual_rate: Decimal::ZERO,
            term_years: 1,
        };
        let out = build_amortization_schedule(&input).unwrap();
        assert_eq!(out.result.months, 1);
        assert_eq!(out.warnings.len(), 1);
    }
}
