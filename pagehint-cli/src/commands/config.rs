//! `pagehint config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use pagehint_core::config::PagehintConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::commands::{LoadedConfig, load_config};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: Option<&Path>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => {
            let report = validate(config_path).await;
            writer.render(&report)?;
            if !report.valid {
                return Err(CliError::Config("configuration is invalid".to_owned()));
            }
            Ok(())
        }
        ConfigAction::Show { section } => {
            let loaded = load_config(config_path).await?;
            let report = show(&loaded, section.as_deref())?;
            writer.render(&report)
        }
    }
}

/// Load the configuration and check every `[hints.*]` entry against the built-in hints.
///
/// Unknown hint ids and options that do not match a hint's schema are reported
/// alongside load errors.
pub async fn validate(config_path: Option<&Path>) -> ConfigValidationReport {
    info!("validating configuration");

    match load_config(config_path).await {
        Ok(loaded) => {
            let errors = hint_errors(&loaded.config);
            ConfigValidationReport {
                source: loaded.source,
                valid: errors.is_empty(),
                errors,
            }
        }
        Err(e) => ConfigValidationReport {
            source: config_path
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| super::DEFAULT_CONFIG_FILE.to_owned()),
            valid: false,
            errors: vec![e.to_string()],
        },
    }
}

fn hint_errors(config: &PagehintConfig) -> Vec<String> {
    let mut errors = Vec::new();
    for (id, hint) in &config.hints {
        match pagehint_hints::find(id) {
            None => errors.push(format!("hints.{id}: unknown hint")),
            Some(definition) => {
                if let Err(reason) = definition.meta.schema.validate(&hint.options) {
                    errors.push(format!("hints.{id}.options: {reason}"));
                }
            }
        }
    }
    errors
}

/// Render the effective configuration, or one section of it, as TOML.
pub fn show(loaded: &LoadedConfig, section: Option<&str>) -> Result<ConfigReport, CliError> {
    let config = &loaded.config;
    let config_toml = match section {
        None => toml::to_string_pretty(config),
        Some("general") => toml::to_string_pretty(&config.general),
        Some("scan") => toml::to_string_pretty(&config.scan),
        Some("hints") => toml::to_string_pretty(&config.hints),
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown section: {other} (expected: general, scan, hints)"
            )));
        }
    }
    .unwrap_or_else(|e| format!("(serialization error: {e})"));

    Ok(ConfigReport {
        source: loaded.source.clone(),
        section: section.map(str::to_owned),
        config: serde_json::to_value(config)?,
        config_toml,
    })
}

/// Configuration display report.
///
/// Text output prints `config_toml`; JSON output carries the structured `config`.
#[derive(Debug, Serialize)]
pub struct ConfigReport {
    /// Configuration file path
    pub source: String,
    /// Optional section name (None = full config)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    pub config: serde_json::Value,
    #[serde(skip)]
    pub config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if let Some(ref section) = self.section {
            let section_label = format!("[{}]", section);
            writeln!(
                w,
                "Configuration {} (source: {})",
                section_label.bold(),
                self.source
            )?;
        } else {
            writeln!(w, "Configuration (source: {})", self.source.bold())?;
        }

        writeln!(w)?;
        write!(w, "{}", self.config_toml)?;

        Ok(())
    }
}

/// Configuration validation report.
#[derive(Serialize)]
pub struct ConfigValidationReport {
    /// Configuration file path
    pub source: String,
    pub valid: bool,
    /// Validation error messages (empty if valid)
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Config Validation: {}", self.source.bold())?;

        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }

        Ok(())
    }
}
