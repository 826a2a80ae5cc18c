//! Output formatting for found apps and build reports

use anyhow::{Context, Result};
use std::fmt::Write;

use crate::app::AppRecord;
use crate::build::BuildReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One JSON object per line
    Json,
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_apps(&self, apps: &[AppRecord]) -> Result<String> {
        let mut out = String::new();
        for app in apps {
            match self.format {
                OutputFormat::Json => {
                    let line = serde_json::to_string(app)
                        .with_context(|| format!("Failed to serialize {}", app.directory.display()))?;
                    writeln!(out, "{}", line)?;
                }
                OutputFormat::Human => writeln!(out, "{}", app)?,
            }
        }
        Ok(out)
    }

    pub fn format_report(&self, report: &BuildReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(report).context("Failed to serialize build report")
            }
            OutputFormat::Human => Ok(format_report_human(report)),
        }
    }
}

fn format_report_human(report: &BuildReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Built {} of {} app(s) in partition [{}, {}) of {}",
        report.succeeded,
        report.attempted,
        report.start,
        report.stop,
        report.total
    );

    if !report.failed.is_empty() {
        let _ = writeln!(out, "\nFailed apps:");
        for app in &report.failed {
            let _ = writeln!(out, "  {}", app);
        }
    }

    if report.aborted {
        let skipped = (report.stop - report.start).saturating_sub(report.attempted);
        let _ = writeln!(out, "\nStopped after first failure, {} app(s) not attempted", skipped);
    }
    out
}
