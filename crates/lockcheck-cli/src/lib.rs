//! lockcheck CLI library components.
//!
//! The main binary is in `main.rs`.

pub mod formatters;
pub mod run;

pub use lockcheck_core::{RunOutcome, Severity};
