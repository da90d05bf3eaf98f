use anyhow::Context;
use sepguard_types::Report;

/// How a report is written to stdout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// The messages as-is; empty output on pass.
    #[default]
    Text,
    /// The violation list as JSON.
    Json,
}

pub fn render_report(report: &Report, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => Ok(report.render()),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(report).context("serialize report")?;
            json.push('\n');
            Ok(json)
        }
    }
}
