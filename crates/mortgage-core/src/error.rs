use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MortgageError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Rate not found: bisection did not converge after {iterations} iterations (last payment delta: {last_delta})")]
    RateNotFound {
        iterations: u32,
        last_delta: Decimal,
    },
}
