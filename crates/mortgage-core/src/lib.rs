pub mod error;
pub mod loan;
pub mod property;
pub mod series;
pub mod simulator;
pub mod solver;
pub mod types;

pub use error::MortgageError;
pub use types::*;

/// Standard result type for all mortgage-core operations
pub type MortgageResult<T> = Result<T, MortgageError>;
