//! `pagehint scan` command handler

use std::io::Write;
use std::time::Duration;

use serde::Serialize;
use tracing::info;

use pagehint_connector::{FsLoader, StaticConnector, StaticOptions};
use pagehint_core::config::PagehintConfig;
use pagehint_core::types::{Problem, Severity};
use pagehint_engine::{Diagnostic, HintDefinition, HintRegistry, ScanReport, Scanner};

use crate::cli::{FailOn, ScanArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `scan` command.
pub async fn execute(
    args: ScanArgs,
    config: PagehintConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let output = run_scan(&args, config).await?;
    writer.render(&output)?;
    check_outcome(&output.report, args.fail_on)
}

/// Build the scanner and connector from configuration and run one scan.
pub async fn run_scan(args: &ScanArgs, config: PagehintConfig) -> Result<ScanOutput, CliError> {
    let registry = build_registry(&args.hints)?;
    let options = StaticOptions {
        fetch_subresources: config.scan.fetch_subresources,
        ..StaticOptions::default()
    };
    let mut connector = match config.scan.connector.as_str() {
        "local" => StaticConnector::with_options(FsLoader::new(), options),
        other => {
            return Err(CliError::Config(format!(
                "unsupported connector '{other}' (expected: local)"
            )));
        }
    };
    let scanner = Scanner::new(registry, config)?;

    info!(
        target = %args.target,
        hints = scanner.registry().count(),
        "starting scan"
    );

    let scan = scanner.scan(&mut connector, &args.target);
    let report = match args.timeout_secs {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), scan)
            .await
            .map_err(|_| {
                CliError::Command(format!(
                    "scan of '{}' timed out after {secs}s",
                    args.target
                ))
            })?,
        None => scan.await,
    };

    Ok(ScanOutput { report })
}

/// Registry with every built-in hint, or only the `--hint` selection.
fn build_registry(selected: &[String]) -> Result<HintRegistry, CliError> {
    if selected.is_empty() {
        return pagehint_hints::builtin_registry().map_err(|e| CliError::Command(e.to_string()));
    }

    let mut definitions: Vec<HintDefinition> = Vec::with_capacity(selected.len());
    for id in selected {
        let definition = pagehint_hints::find(id).ok_or_else(|| {
            CliError::Command(format!(
                "unknown hint '{id}' (see `pagehint hints list`)"
            ))
        })?;
        if !definitions.iter().any(|d| d.meta.id == id) {
            definitions.push(definition);
        }
    }
    pagehint_hints::registry_with(definitions).map_err(|e| CliError::Command(e.to_string()))
}

/// Map a finished scan to the command result.
///
/// A target that could not be fetched is a command error (exit 1); problems at or
/// above the `--fail-on` threshold give exit 4.
pub fn check_outcome(report: &ScanReport, fail_on: FailOn) -> Result<(), CliError> {
    if report.target_failed() {
        let reason = report
            .diagnostics
            .iter()
            .find_map(|d| match d {
                Diagnostic::TargetFetch { reason } => Some(reason.as_str()),
                _ => None,
            })
            .unwrap_or("unknown error");
        return Err(CliError::Command(format!(
            "target '{}' could not be scanned: {reason}",
            report.target
        )));
    }

    let threshold = fail_on.severity();
    if report.has_problems_at(threshold) {
        let count = report
            .problems
            .iter()
            .filter(|p| p.severity >= threshold)
            .count();
        return Err(CliError::ProblemsFound {
            count,
            threshold: threshold.to_string(),
        });
    }

    Ok(())
}

/// Scan result as printed by the CLI. JSON output is the report itself.
#[derive(Serialize)]
#[serde(transparent)]
pub struct ScanOutput {
    pub report: ScanReport,
}

fn location_label(problem: &Problem) -> String {
    match problem.location {
        Some(loc) => loc.to_string(),
        None => "-".to_owned(),
    }
}

impl Render for ScanOutput {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let report = &self.report;
        writeln!(w, "Scan: {}", report.target.bold())?;
        writeln!(
            w,
            "Hints: {} bound, finished in {} ms",
            report.hints_bound.len(),
            report.duration_ms
        )?;

        let mut current: Option<&str> = None;
        let problems = report.sorted_problems();
        for problem in &problems {
            if current != Some(problem.resource.as_str()) {
                writeln!(w)?;
                writeln!(w, "{}", problem.resource.underline())?;
                current = Some(problem.resource.as_str());
            }
            let severity = format!("{:<7}", problem.severity.to_string());
            let severity = match problem.severity {
                Severity::Error => severity.red().bold(),
                Severity::Warning => severity.yellow(),
                Severity::Off => severity.dimmed(),
            };
            writeln!(
                w,
                "  {:>9}  {}  {}  {}",
                location_label(problem),
                severity,
                problem.message,
                problem.hint_id.dimmed()
            )?;
        }

        if !report.diagnostics.is_empty() {
            writeln!(w)?;
            writeln!(w, "Diagnostics:")?;
            for diagnostic in &report.diagnostics {
                writeln!(w, "  {}", diagnostic.to_string().yellow())?;
            }
        }

        writeln!(w)?;
        let counts = report.severity_counts();
        if counts.total() == 0 {
            writeln!(w, "{}", "No problems found.".green().bold())?;
        } else {
            let summary = format!(
                "{} problem(s) ({} error(s), {} warning(s))",
                counts.total(),
                counts.errors,
                counts.warnings
            );
            if counts.errors > 0 {
                writeln!(w, "{}", summary.red().bold())?;
            } else {
                writeln!(w, "{}", summary.yellow().bold())?;
            }
        }

        Ok(())
    }
}
