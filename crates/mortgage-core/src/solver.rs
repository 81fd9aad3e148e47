use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::MortgageError;
use crate::MortgageResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Search bracket and stopping rules for a bisection run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BisectionConfig {
    pub lower: Decimal,
    pub upper: Decimal,
    /// Convergence tolerance on the objective value, not the bracket width
    pub tolerance: Decimal,
    pub max_iterations: u32,
}

impl Default for BisectionConfig {
    /// Bracket wide enough for any plausible annual rate in percent.
    fn default() -> Self {
        Self {
            lower: Decimal::ZERO,
            upper: dec!(100),
            tolerance: dec!(0.000001),
            max_iterations: 1000,
        }
    }
}

/// Outcome of a bisection search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BisectionOutcome {
    /// The objective came within tolerance of the target.
    Converged { value: Decimal, iterations: u32 },
    /// The iteration budget ran out before the tolerance was met.
    MaxIterationsExceeded {
        last_midpoint: Decimal,
        last_delta: Decimal,
    },
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Interval-halving search for the `x` in `[lower, upper]` at which
/// `objective(x)` is within `tolerance` of `target`.
///
/// Requires `objective` to be monotonically increasing over the bracket; the
/// bounds are tightened toward the target on that assumption. Non-convergence
/// is reported as an outcome, not an error: a target below
/// `objective(lower)` or above `objective(upper)` exhausts the budget.
pub fn bisect<F>(
    objective: F,
    target: Decimal,
    config: &BisectionConfig,
) -> MortgageResult<BisectionOutcome>
where
    F: Fn(Decimal) -> Decimal,
{
    validate_config(config)?;

    let mut lower = config.lower;
    let mut upper = config.upper;
    let mut midpoint = lower;
    let mut delta = Decimal::MAX;

    for iteration in 1..=config.max_iterations {
        midpoint = (lower + upper) / dec!(2);
        delta = objective(midpoint) - target;

        if delta.abs() < config.tolerance {
            return Ok(BisectionOutcome::Converged {
                value: midpoint,
                iterations: iteration,
            });
        }
        if delta > Decimal::ZERO {
            upper = midpoint;
        } else {
            lower = midpoint;
        }
    }

    Ok(BisectionOutcome::MaxIterationsExceeded {
        last_midpoint: midpoint,
        last_delta: delta,
    })
}

fn validate_config(config: &BisectionConfig) -> MortgageResult<()> {
    if config.upper <= config.lower {
        return Err(MortgageError::InvalidInput {
            field: "upper".into(),
            reason: "Upper bound must exceed lower bound".into(),
        });
    }
    if config.tolerance <= Decimal::ZERO {
        return Err(MortgageError::InvalidInput {
            field: "tolerance".into(),
            reason: "Tolerance must be positive".into(),
        });
    }
    if config.max_iterations == 0 {
        return Err(MortgageError::InvalidInput {
            field: "max_iterations".into(),
            reason: "Iteration budget must be positive".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_converges_on_square_root() {
        let config = BisectionConfig {
            lower: Decimal::ZERO,
            upper: dec!(10),
            tolerance: dec!(0.000001),
            max_iterations: 100,
        };
        match bisect(|x| x * x, dec!(9), &config).unwrap() {
            BisectionOutcome::Converged { value, .. } => {
                assert!((value - dec!(3)).abs() < dec!(0.001), "got {value}");
            }
            other => panic!("expected convergence, got {other:?}"),
        }
    }

    #[test]
    fn test_unreachable_target_exhausts_budget() {
        let config = BisectionConfig {
            lower: Decimal::ZERO,
            upper: dec!(10),
            tolerance: dec!(0.000001),
            max_iterations: 50,
        };
        // Objective never reaches 200 on [0, 10]
        match bisect(|x| x * x, dec!(200), &config).unwrap() {
            BisectionOutcome::MaxIterationsExceeded { last_delta, .. } => {
                assert!(last_delta < Decimal::ZERO);
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
    }

    #[test]
    fn test_degenerate_bracket_rejected() {
        let config = BisectionConfig {
            lower: dec!(5),
            upper: dec!(5),
            ..BisectionConfig::default()
        };
        assert!(bisect(|x| x, dec!(1), &config).is_err());
    }

    #[test]
    fn test_zero_tolerance_rejected() {
        let config = BisectionConfig {
            tolerance: Decimal::ZERO,
            ..BisectionConfig::default()
        };
        assert!(bisect(|x| x, dec!(1), &config).is_err());
    }
}
