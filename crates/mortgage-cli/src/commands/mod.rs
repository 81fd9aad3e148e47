pub mod house;
pub mod loan;
pub mod simulate;
