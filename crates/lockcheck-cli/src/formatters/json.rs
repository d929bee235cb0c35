//! JSON formatter for run outcomes.

use super::Formatter;
use anyhow::{Context, Result};
use lockcheck_core::RunOutcome;
use serde_json::json;

pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn render(&self, outcome: &RunOutcome, verbose: bool) -> Result<String> {
        let mut value = serde_json::to_value(outcome).context("Error serializing results")?;

        if let Some(obj) = value.as_object_mut() {
            obj.insert("passed".to_string(), json!(outcome.passed()));

            if let RunOutcome::Diff(diff) = outcome {
                if let Some(report) = diff.report.as_ref().filter(|_| verbose) {
                    obj.insert("summary".to_string(), serde_json::to_value(report.summary())?);
                }
            }
        }

        let mut rendered = serde_json::to_string_pretty(&value).context("Error serializing results")?;
        rendered.push('\n');
        Ok(rendered)
    }
}
