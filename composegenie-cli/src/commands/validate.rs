//! `composegenie validate` command handler
//!
//! Prints a recorded validation result. There is no live validator; the report
//! comes from the built-in fixtures.

use std::io::Write;

use serde::Serialize;

use composegenie_security::{
    IssueCounts, IssueSeverity, ValidationFixtures, ValidationIssue, ValidationResult,
};

use crate::cli::ValidateArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `validate` command.
pub async fn execute(args: ValidateArgs, writer: &OutputWriter) -> Result<(), CliError> {
    let fixtures = ValidationFixtures::builtin()?;
    let severity = parse_severity(args.severity.as_deref())?;
    let result = select(&fixtures, args.id.as_deref())?;
    writer.render(&ValidationReport::build(result, severity))
}

pub fn parse_severity(input: Option<&str>) -> Result<Option<IssueSeverity>, CliError> {
    input
        .map(|s| {
            IssueSeverity::from_str_loose(s).ok_or_else(|| {
                CliError::Command(format!(
                    "unknown severity '{s}' (expected blocker, warning or suggestion)"
                ))
            })
        })
        .transpose()
}

/// Pick a result by id, or the most recent one.
pub fn select<'a>(
    fixtures: &'a ValidationFixtures,
    id: Option<&str>,
) -> Result<&'a ValidationResult, CliError> {
    match id {
        Some(id) => fixtures
            .find(id)
            .ok_or_else(|| CliError::Command(format!("no validation result with id '{id}'"))),
        None => fixtures
            .latest()
            .ok_or_else(|| CliError::Command("no validation results recorded".to_owned())),
    }
}

#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub validation_id: String,
    pub timestamp: String,
    pub valid: bool,
    pub score: u32,
    /// Counted from the issue list, not the recorded summary.
    pub counts: IssueCounts,
    pub severity: Option<IssueSeverity>,
    pub issues: Vec<ValidationIssue>,
    pub recommendations: Vec<String>,
}

impl ValidationReport {
    /// Issues come out most severe first, keeping recorded order within a severity.
    pub fn build(result: &ValidationResult, severity: Option<IssueSeverity>) -> Self {
        let mut issues: Vec<ValidationIssue> = result
            .issues
            .iter()
            .filter(|i| severity.is_none_or(|s| i.severity == s))
            .cloned()
            .collect();
        issues.sort_by(|a, b| b.severity.cmp(&a.severity));

        Self {
            validation_id: result.validation_id.clone(),
            timestamp: result.timestamp.clone(),
            valid: result.overall.valid,
            score: result.overall.score,
            counts: result.issue_counts(),
            severity,
            issues,
            recommendations: result.recommendations.clone(),
        }
    }
}

impl Render for ValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let verdict = if self.valid {
            "VALID".green()
        } else {
            "INVALID".red().bold()
        };
        writeln!(
            w,
            "{} {}  score {}/100  {}",
            self.validation_id.dimmed(),
            verdict,
            self.score,
            self.timestamp
        )?;
        writeln!(w, "{}", self.counts)?;

        for issue in &self.issues {
            let label = match issue.severity {
                IssueSeverity::Blocker => "BLOCKER".red().bold(),
                IssueSeverity::Warning => "WARNING".yellow(),
                IssueSeverity::Suggestion => "SUGGEST".cyan(),
            };
            let location = match (&issue.service, issue.line) {
                (Some(service), Some(line)) => format!("{service}:{line}"),
                (Some(service), None) => service.clone(),
                (None, Some(line)) => format!("line {line}"),
                (None, None) => String::new(),
            };
            writeln!(w, "{label} [{}] {location}  {}", issue.category, issue.message)?;
            for line in issue.suggestion.lines() {
                writeln!(w, "    {line}")?;
            }
            if issue.auto_fix {
                writeln!(w, "    (auto-fix available)")?;
            }
            if let Some(doc) = &issue.documentation {
                writeln!(w, "    see {doc}")?;
            }
        }

        if self.severity.is_none() && !self.recommendations.is_empty() {
            writeln!(w, "Recommendations:")?;
            for rec in &self.recommendations {
                writeln!(w, "  - {rec}")?;
            }
        }
        Ok(())
    }
}
