//! Output formatters for lockcheck results.

pub mod human;
pub mod json;

pub use human::HumanFormatter;
pub use json::JsonFormatter;

use anyhow::Result;
use lockcheck_core::RunOutcome;

/// Trait for formatting run outcomes
pub trait Formatter {
    /// Render the outcome as it would be printed
    fn render(&self, outcome: &RunOutcome, verbose: bool) -> Result<String>;

    /// Render and print to stdout
    fn format(&self, outcome: &RunOutcome, verbose: bool) -> Result<()> {
        print!("{}", self.render(outcome, verbose)?);
        Ok(())
    }
}
