//! disown-opener — 새 창으로 여는 외부 링크의 `window.opener` 노출 검사
//!
//! `target="_blank"`인 `<a>`/`<area>`가 다른 origin을 가리키면 `rel`에 `noopener`가
//! 있어야 합니다. 대상 브라우저 중 `noopener`를 모르는 브라우저가 있으면 `noreferrer`도
//! 요구합니다.

use std::sync::Arc;

use pagehint_core::dom::Element;
use pagehint_core::event::Event;
use pagehint_core::types::{BrowserTarget, Category, Severity};
use pagehint_engine::{
    HintContext, HintDefinition, HintMetadata, OptionField, OptionKind, OptionsSchema,
    Subscriptions,
};
use serde::Deserialize;
use tracing::debug;
use url::Url;

pub const ID: &str = "disown-opener";

const OPTIONS: &[OptionField] = &[OptionField {
    name: "include_same_origin",
    kind: OptionKind::Bool,
    required: false,
    description: "also check links pointing to the page's own origin",
}];

pub fn definition() -> HintDefinition {
    HintDefinition {
        meta: HintMetadata {
            id: ID,
            category: Category::Security,
            description: "Require 'noopener' (and 'noreferrer' when needed) on links that open a new browsing context",
            default_severity: Severity::Warning,
            fixable: false,
            schema: OptionsSchema { fields: OPTIONS },
            works_with_local_files: true,
        },
        factory,
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Options {
    include_same_origin: bool,
}

struct Check {
    ctx: HintContext,
    include_same_origin: bool,
    required: Vec<&'static str>,
}

fn factory(ctx: &HintContext) -> anyhow::Result<Subscriptions> {
    let options: Options = ctx.options()?;
    let check = Arc::new(Check {
        ctx: ctx.clone(),
        include_same_origin: options.include_same_origin,
        required: required_rel_values(ctx.browsers()),
    });

    let anchors = Arc::clone(&check);
    Ok(Subscriptions::new()
        .on("element::a", move |ev: Arc<Event>| {
            let check = Arc::clone(&anchors);
            async move {
                check.inspect(&ev);
                Ok(())
            }
        })
        .on("element::area", move |ev: Arc<Event>| {
            let check = Arc::clone(&check);
            async move {
                check.inspect(&ev);
                Ok(())
            }
        }))
}

fn required_rel_values(browsers: &[BrowserTarget]) -> Vec<&'static str> {
    let mut required = vec!["noopener"];
    if !browsers.iter().all(BrowserTarget::supports_noopener) {
        required.push("noreferrer");
    }
    required
}

impl Check {
    fn inspect(&self, ev: &Event) {
        let Some(element) = ev.element() else {
            return;
        };
        let opens_new_context = element
            .attribute("target")
            .is_some_and(|t| t.trim().eq_ignore_ascii_case("_blank"));
        if !opens_new_context {
            return;
        }
        let Some(href) = element
            .attribute("href")
            .map(str::trim)
            .filter(|h| !h.is_empty())
        else {
            return;
        };
        if !self.applies_to(&ev.resource, href) {
            return;
        }

        let rel: Vec<String> = element
            .attribute("rel")
            .unwrap_or_default()
            .split_ascii_whitespace()
            .map(str::to_ascii_lowercase)
            .collect();
        let missing: Vec<String> = self
            .required
            .iter()
            .filter(|value| !rel.iter().any(|token| token.as_str() == **value))
            .map(|value| format!("'{value}'"))
            .collect();
        if missing.is_empty() {
            return;
        }

        let noun = if missing.len() == 1 { "value" } else { "values" };
        self.ctx.reporter().report(
            &ev.resource,
            Some(element),
            format!("'{href}' is missing 'rel' {noun} {}", missing.join(", ")),
        );
    }

    /// http(s) 링크이고, same-origin 검사가 꺼져 있으면 다른 origin일 때만 대상입니다.
    fn applies_to(&self, resource: &str, href: &str) -> bool {
        let base = Url::parse(resource).ok();
        let link = match &base {
            Some(base) => base.join(href).ok(),
            None => Url::parse(href).ok(),
        };
        let Some(link) = link else {
            debug!(resource, href, "unresolvable link target, skipping");
            return false;
        };
        if !matches!(link.scheme(), "http" | "https") {
            return false;
        }
        if self.include_same_origin {
            return true;
        }
        base.is_none_or(|base| base.origin() != link.origin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{PAGE_URL, config_with, messages, scan_html, scan_with};
    use pagehint_connector::MemoryLoader;

    fn page(html: &'static str) -> MemoryLoader {
        MemoryLoader::new().page(PAGE_URL, "text/html", html)
    }

    #[tokio::test]
    async fn flags_cross_origin_blank_link_without_noopener() {
        let report = scan_html(
            definition(),
            r#"<a href="https://other.example/" target="_blank">x</a>"#,
        )
        .await;

        assert_eq!(
            messages(&report),
            vec!["'https://other.example/' is missing 'rel' value 'noopener'"]
        );
        let location = report.problems[0].location.expect("location");
        assert_eq!((location.line, location.column), (1, 1));
    }

    #[tokio::test]
    async fn requires_noreferrer_for_old_browsers() {
        let config = config_with(ID, "", &["ie 11", "chrome 120"]);
        let report = scan_with(
            definition(),
            config,
            page(r#"<a href="https://other.example/" target="_blank" rel="noopener">x</a>"#),
            PAGE_URL,
        )
        .await;

        assert_eq!(
            messages(&report),
            vec!["'https://other.example/' is missing 'rel' value 'noreferrer'"]
        );
    }

    #[tokio::test]
    async fn complete_rel_passes() {
        let config = config_with(ID, "", &["ie 11"]);
        let report = scan_with(
            definition(),
            config,
            page(r#"<a href="https://other.example/" target="_BLANK" rel="NoOpener noreferrer">x</a>"#),
            PAGE_URL,
        )
        .await;
        assert!(report.problems.is_empty());
    }

    #[tokio::test]
    async fn same_origin_links_are_skipped_by_default() {
        let report = scan_html(
            definition(),
            r#"<a href="/about" target="_blank">a</a><a href="mailto:x@example.com" target="_blank">m</a>"#,
        )
        .await;
        assert!(report.problems.is_empty());
    }

    #[tokio::test]
    async fn include_same_origin_checks_relative_links() {
        let config = config_with(ID, "include_same_origin = true", &[]);
        let report = scan_with(
            definition(),
            config,
            page(r#"<area href="/about" target="_blank">"#),
            PAGE_URL,
        )
        .await;
        assert_eq!(messages(&report), vec!["'/about' is missing 'rel' value 'noopener'"]);
    }

    #[tokio::test]
    async fn links_without_blank_target_are_ignored() {
        let report = scan_html(
            definition(),
            r#"<a href="https://other.example/" target="_self">x</a><a href="https://other.example/">y</a>"#,
        )
        .await;
        assert!(report.problems.is_empty());
    }

    #[test]
    fn required_values_follow_browser_support() {
        let modern: Vec<BrowserTarget> = vec!["chrome 120".parse().unwrap()];
        assert_eq!(required_rel_values(&modern), vec!["noopener"]);

        let legacy: Vec<BrowserTarget> = vec!["safari 10".parse().unwrap()];
        assert_eq!(required_rel_values(&legacy), vec!["noopener", "noreferrer"]);
    }
}
