use mortgage_core::loan::{build_amortization_schedule, AmortizationEntry, Loan, LoanInput};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Payment formula
// ===========================================================================

#[test]
fn test_reference_scenario_100k_3_5pct_30y() {
    // Canonical fixed-rate case: 100,000 at 3.5% over 30 years.
    // payment = P*r*(1+r)^n / ((1+r)^n - 1) with r = 3.5/1200, n = 360
    // ≈ 449.0447, i.e. 449.04 at 2 dp; lifetime total ≈ 161,656.08
    let loan = Loan::new(dec!(100000), dec!(3.5), 30).unwrap();

    assert_eq!(loan.term_months(), 360);
    assert_eq!(loan.monthly_payment().round_dp(2), dec!(449.04));
    assert!(
        (loan.total_payment() - dec!(161656.08)).abs() < dec!(0.05),
        "total was {}",
        loan.total_payment()
    );
}

#[test]
fn test_zero_rate_payment_is_exact_division() {
    let loan = Loan::new(dec!(100000), Decimal::ZERO, 30).unwrap();
    assert_eq!(loan.monthly_payment(), dec!(100000) / dec!(360));
}

#[test]
fn test_total_payment_identity_across_rates() {
    for rate in [dec!(0), dec!(0.75), dec!(3.5), dec!(12), dec!(40)] {
        let loan = Loan::new(dec!(250000), rate, 25).unwrap();
        assert_eq!(
            loan.total_payment(),
            loan.monthly_payment() * Decimal::from(loan.term_months()),
            "identity failed at rate {rate}"
        );
    }
}

#[test]
fn test_payment_strictly_increases_with_rate() {
    let rates = [
        dec!(0),
        dec!(0.5),
        dec!(1),
        dec!(2),
        dec!(3.5),
        dec!(5),
        dec!(10),
        dec!(50),
        dec!(100),
    ];
    let mut previous: Option<Decimal> = None;
    for rate in rates {
        let payment = Loan::new(dec!(100000), rate, 30).unwrap().monthly_payment();
        if let Some(prev) = previous {
            assert!(
                payment > prev,
                "payment not increasing: {prev} then {payment} at rate {rate}"
            );
        }
        previous = Some(payment);
    }
}

// ===========================================================================
// Schedule
// ===========================================================================

#[test]
fn test_schedule_conserves_principal() {
    let loan = Loan::new(dec!(100000), dec!(3.5), 30).unwrap();
    let entries: Vec<AmortizationEntry> = loan.amortization_schedule().collect();

    let repaid: Decimal = entries.iter().map(|e| e.principal).sum();
    let months = Decimal::from(entries.len() as u32);
    // Each emitted portion is rounded to cents, so allow a cent per month
    assert!(
        (repaid - dec!(100000)).abs() <= dec!(0.01) * months,
        "principal repaid was {repaid}"
    );
}

#[test]
fn test_schedule_length_is_bounded_by_term() {
    for (principal, rate, years) in [
        (dec!(100000), dec!(3.5), 30u32),
        (dec!(5000), dec!(0), 1),
        (dec!(1), dec!(99), 40),
    ] {
        let loan = Loan::new(principal, rate, years).unwrap();
        let months = loan.amortization_schedule().count() as u32;
        assert!(months <= loan.term_months());
    }
}

#[test]
fn test_final_entry_balance_is_zero() {
    let loan = Loan::new(dec!(180000), dec!(2.25), 20).unwrap();
    let last = loan.amortization_schedule().last().unwrap();
    assert_eq!(last.remaining_balance, Decimal::ZERO);
}

#[test]
fn test_interest_plus_principal_equals_installment() {
    let loan = Loan::new(dec!(100000), dec!(3.5), 30).unwrap();
    for entry in loan.amortization_schedule() {
        // Components are rounded independently; they may disagree with the
        // rounded installment by at most a cent
        let split = entry.interest + entry.principal;
        assert!(
            (split - entry.installment).abs() <= dec!(0.01),
            "month {}: {} + {} vs {}",
            entry.month,
            entry.interest,
            entry.principal,
            entry.installment
        );
    }
}

#[test]
fn test_balance_is_monotonically_decreasing() {
    let loan = Loan::new(dec!(100000), dec!(3.5), 30).unwrap();
    let mut previous = dec!(100000);
    for entry in loan.amortization_schedule() {
        assert!(
            entry.remaining_balance < previous,
            "balance rose at month {}",
            entry.month
        );
        previous = entry.remaining_balance;
    }
}

// ===========================================================================
// Envelope
// ===========================================================================

#[test]
fn test_schedule_output_totals_match_entries() {
    let input = LoanInput {
        principal: dec!(100000),
        annual_rate: dec!(3.5),
        term_years: 30,
    };
    let out = build_amortization_schedule(&input).unwrap();
    let schedule = &out.result;

    assert_eq!(schedule.months, 360);
    assert_eq!(schedule.entries.len(), 360);

    let interest: Decimal = schedule.entries.iter().map(|e| e.interest).sum();
    assert_eq!(schedule.total_interest, interest);
    assert!(out.warnings.is_empty());
}
