//! no-disallowed-headers — 서버 구현을 노출하는 응답 헤더 검사

use std::sync::Arc;

use pagehint_core::event::Event;
use pagehint_core::types::{Category, Severity};
use pagehint_engine::{
    HintContext, HintDefinition, HintMetadata, OptionField, OptionKind, OptionsSchema,
    Subscriptions,
};
use serde::Deserialize;

pub const ID: &str = "no-disallowed-headers";

/// 기본 금지 헤더
pub const DEFAULT_DISALLOWED: &[&str] = &[
    "server",
    "x-aspnet-version",
    "x-aspnetmvc-version",
    "x-powered-by",
    "x-runtime",
    "x-version",
];

const OPTIONS: &[OptionField] = &[
    OptionField {
        name: "include",
        kind: OptionKind::StringList,
        required: false,
        description: "additional headers to disallow",
    },
    OptionField {
        name: "ignore",
        kind: OptionKind::StringList,
        required: false,
        description: "headers to allow even if disallowed by default",
    },
];

pub fn definition() -> HintDefinition {
    HintDefinition {
        meta: HintMetadata {
            id: ID,
            category: Category::Security,
            description: "Disallow response headers that reveal server implementation details",
            default_severity: Severity::Warning,
            fixable: false,
            schema: OptionsSchema { fields: OPTIONS },
            works_with_local_files: false,
        },
        factory,
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Options {
    include: Vec<String>,
    ignore: Vec<String>,
}

/// 기본 목록 + `include` − `ignore` (소문자, 정렬)
fn disallowed_headers(options: &Options) -> Vec<String> {
    let ignore: Vec<String> = options
        .ignore
        .iter()
        .map(|h| h.trim().to_ascii_lowercase())
        .collect();
    let mut headers: Vec<String> = DEFAULT_DISALLOWED
        .iter()
        .map(|h| (*h).to_owned())
        .chain(options.include.iter().map(|h| h.trim().to_ascii_lowercase()))
        .filter(|h| !h.is_empty() && !ignore.contains(h))
        .collect();
    headers.sort();
    headers.dedup();
    headers
}

fn factory(ctx: &HintContext) -> anyhow::Result<Subscriptions> {
    let options: Options = ctx.options()?;
    let disallowed = Arc::new(disallowed_headers(&options));
    let reporter = ctx.reporter().clone();

    Ok(Subscriptions::new().on("fetch::end::*", move |ev: Arc<Event>| {
        let disallowed = Arc::clone(&disallowed);
        let reporter = reporter.clone();
        async move {
            let Some(fetch) = ev.fetch_end() else {
                return Ok(());
            };
            let found: Vec<&str> = disallowed
                .iter()
                .map(String::as_str)
                .filter(|name| fetch.response.headers.contains(name))
                .collect();
            if !found.is_empty() {
                reporter.report(
                    &ev.resource,
                    fetch.element.as_ref(),
                    format!(
                        "Response should not include disallowed headers: {}",
                        found.join(", ")
                    ),
                );
            }
            Ok(())
        }
    }))
}
