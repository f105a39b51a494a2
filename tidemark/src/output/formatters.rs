//! Concrete run report formatters.

use serde::Serialize;

use crate::catalog::Direction;
use crate::error::{Error, Result};
use crate::operations::{RunReport, TargetOutcome, TargetStatus};

use super::OutputFormatter;

/// Formatter for human-readable output.
pub struct HumanFormatter;

/// Formatter for JSON output.
pub struct JsonFormatter;

const fn verb(direction: Direction) -> &'static str {
    match direction {
        Direction::Up => "applied",
        Direction::Down => "reverted",
    }
}

impl OutputFormatter for HumanFormatter {
    fn format(&self, report: &RunReport) -> Result<String> {
        if report.outcomes.is_empty() {
            return Ok("No targets selected.".to_string());
        }

        let lines: Vec<String> = report
            .outcomes
            .iter()
            .map(|outcome| match &outcome.result {
                Ok(TargetStatus::NothingToDo) => format!("{}: nothing to do", outcome.target),
                Ok(TargetStatus::Completed(summary)) => format!(
                    "{}: {} {} migration(s): {}",
                    outcome.target,
                    verb(summary.direction),
                    summary.completed.len(),
                    summary.completed.join(", ")
                ),
                Err(e) => format!("{}: FAILED: {e}", outcome.target),
            })
            .collect();

        Ok(lines.join("\n"))
    }
}

#[derive(Serialize)]
struct OutcomeView<'a> {
    target: &'a str,
    direction: Direction,
    status: &'static str,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    completed: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    out_of_sync: bool,
}

impl<'a> From<&'a TargetOutcome> for OutcomeView<'a> {
    fn from(outcome: &'a TargetOutcome) -> Self {
        let none: &[String] = &[];
        let (status, completed, error) = match &outcome.result {
            Ok(TargetStatus::NothingToDo) => ("nothing_to_do", none, None),
            Ok(TargetStatus::Completed(summary)) => {
                ("completed", summary.completed.as_slice(), None)
            }
            Err(e) => ("failed", none, Some(e)),
        };
        Self {
            target: &outcome.target,
            direction: outcome.direction,
            status,
            completed,
            error: error.map(ToString::to_string),
            out_of_sync: error.is_some_and(Error::is_out_of_sync),
        }
    }
}

#[derive(Serialize)]
struct ReportView<'a> {
    direction: Direction,
    success: bool,
    targets: Vec<OutcomeView<'a>>,
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, report: &RunReport) -> Result<String> {
        let view = ReportView {
            direction: report.direction,
            success: report.is_success(),
            targets: report.outcomes.iter().map(OutcomeView::from).collect(),
        };

        serde_json::to_string_pretty(&view).map_err(|e| Error::Validation {
            field: "json_output".to_string(),
            message: format!("failed to serialize to JSON: {e}"),
        })
    }
}
