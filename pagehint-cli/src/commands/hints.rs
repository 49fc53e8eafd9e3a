//! `pagehint hints` command handler

use std::io::Write;

use serde::Serialize;

use pagehint_core::config::PagehintConfig;
use pagehint_core::types::{Category, Severity};
use pagehint_engine::HintMetadata;

use crate::cli::{HintsAction, HintsArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `hints` command.
pub fn execute(
    args: HintsArgs,
    config: &PagehintConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        HintsAction::List { category } => {
            let category = category.as_deref().map(parse_category).transpose()?;
            let list = build_hint_list(config, category);
            writer.render(&list)
        }
    }
}

fn parse_category(s: &str) -> Result<Category, CliError> {
    match s.trim().to_lowercase().as_str() {
        "accessibility" => Ok(Category::Accessibility),
        "compatibility" => Ok(Category::Compatibility),
        "development" => Ok(Category::Development),
        "interoperability" => Ok(Category::Interoperability),
        "performance" => Ok(Category::Performance),
        "pwa" => Ok(Category::Pwa),
        "security" => Ok(Category::Security),
        "other" => Ok(Category::Other),
        _ => Err(CliError::Command(format!(
            "invalid category: {s} (expected: accessibility, compatibility, development, \
             interoperability, performance, pwa, security, other)"
        ))),
    }
}

/// Built-in hints with the severity the given configuration resolves to.
pub fn build_hint_list(config: &PagehintConfig, category: Option<Category>) -> HintList {
    let hints = pagehint_hints::builtin_hints()
        .into_iter()
        .filter(|h| category.is_none_or(|c| h.meta.category == c))
        .map(|h| HintEntry::new(&h.meta, config))
        .collect();
    HintList { hints }
}

#[derive(Serialize)]
pub struct HintList {
    pub hints: Vec<HintEntry>,
}

#[derive(Serialize)]
pub struct HintEntry {
    pub id: String,
    pub category: Category,
    pub severity: Severity,
    pub default_severity: Severity,
    pub description: String,
    pub options: Vec<String>,
    pub works_with_local_files: bool,
}

impl HintEntry {
    fn new(meta: &HintMetadata, config: &PagehintConfig) -> Self {
        let severity = config
            .hint(meta.id)
            .and_then(|h| h.severity)
            .unwrap_or(meta.default_severity);
        Self {
            id: meta.id.to_owned(),
            category: meta.category,
            severity,
            default_severity: meta.default_severity,
            description: meta.description.to_owned(),
            options: meta
                .schema
                .fields
                .iter()
                .map(|f| format!("{} ({})", f.name, f.kind))
                .collect(),
            works_with_local_files: meta.works_with_local_files,
        }
    }
}

impl Render for HintList {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if self.hints.is_empty() {
            writeln!(w, "No hints found.")?;
            return Ok(());
        }

        writeln!(
            w,
            "{:<34} {:<18} {:<9} Description",
            "ID", "Category", "Severity"
        )?;
        writeln!(w, "{}", "-".repeat(96))?;

        for hint in &self.hints {
            let severity = format!("{:<9}", hint.severity.to_string());
            let severity = match hint.severity {
                Severity::Error => severity.red(),
                Severity::Warning => severity.yellow(),
                Severity::Off => severity.dimmed(),
            };
            writeln!(
                w,
                "{:<34} {:<18} {} {}",
                hint.id,
                hint.category.to_string(),
                severity,
                hint.description
            )?;
            if !hint.options.is_empty() {
                writeln!(w, "{:<34} options: {}", "", hint.options.join(", ").dimmed())?;
            }
        }

        writeln!(w)?;
        writeln!(w, "Total: {} hints", self.hints.len())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagehint_core::config::HintConfig;

    #[test]
    fn test_list_uses_configured_severity() {
        let mut config = PagehintConfig::default();
        config.hints.insert(
            "image-alt".to_owned(),
            HintConfig {
                severity: Some(Severity::Off),
                options: toml::Table::new(),
            },
        );

        let list = build_hint_list(&config, None);
        let image_alt = list
            .hints
            .iter()
            .find(|h| h.id == "image-alt")
            .expect("image-alt listed");
        assert_eq!(image_alt.severity, Severity::Off);
        assert_eq!(image_alt.default_severity, Severity::Warning);
    }

    #[test]
    fn test_list_filters_by_category() {
        let list = build_hint_list(&PagehintConfig::default(), Some(Category::Security));
        let ids: Vec<&str> = list.hints.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["disown-opener", "no-disallowed-headers"]);
    }

    #[test]
    fn test_parse_category() {
        assert_eq!(
            parse_category("Security").expect("valid"),
            Category::Security
        );
        assert!(parse_category("speed").is_err());
    }

    #[test]
    fn test_render_lists_options() {
        let list = build_hint_list(&PagehintConfig::default(), None);
        let mut buffer = Vec::new();
        list.render_text(&mut buffer).expect("render");
        let text = String::from_utf8(buffer).expect("valid UTF-8");

        assert!(text.contains("highest-available-document-mode"));
        assert!(text.contains("include_same_origin (bool)"));
        assert!(text.contains(&format!("Total: {} hints", list.hints.len())));
    }

    #[test]
    fn test_json_uses_kebab_case_category() {
        let list = build_hint_list(&PagehintConfig::default(), Some(Category::Other));
        let json = serde_json::to_value(&list).expect("serialize");
        assert_eq!(json["hints"][0]["id"], "no-broken-links");
        assert_eq!(json["hints"][0]["category"], "other");
        assert_eq!(json["hints"][0]["severity"], "error");
    }
}
