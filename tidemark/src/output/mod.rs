//! Output formatting module for run reports.
//!
//! This module renders a [`RunReport`] either as human-readable lines or as
//! JSON for scripts.

mod formatters;

use crate::operations::RunReport;
use crate::Result;

pub use formatters::{HumanFormatter, JsonFormatter};

/// Trait for formatting run reports into different output formats.
pub trait OutputFormatter {
    /// Format the given run report into a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the formatting fails.
    fn format(&self, report: &RunReport) -> Result<String>;
}

/// Available output formats for run reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One line per target.
    #[default]
    Human,
    /// A JSON document.
    Json,
}

impl OutputFormat {
    /// Create a formatter for this output format.
    ///
    /// # Examples
    ///
    /// ```
    /// use tidemark::operations::RunReport;
    /// use tidemark::output::OutputFormat;
    /// use tidemark::Direction;
    ///
    /// let report = RunReport { direction: Direction::Up, outcomes: Vec::new() };
    /// let text = OutputFormat::Human.create_formatter().format(&report).unwrap();
    /// assert_eq!(text, "No targets selected.");
    /// ```
    #[must_use]
    pub fn create_formatter(&self) -> Box<dyn OutputFormatter> {
        match self {
            Self::Human => Box::new(HumanFormatter),
            Self::Json => Box::new(JsonFormatter),
        }
    }
}
