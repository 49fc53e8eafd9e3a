//! highest-available-document-mode — `X-UA-Compatible: ie=edge` 검사
//!
//! document mode를 지원하는 Internet Explorer(8–11)를 대상으로 하면 최고 문서 모드를
//! 요청해야 하고, 그렇지 않으면 헤더와 meta 요소 모두 불필요합니다.
//! 로컬 파일에는 응답 헤더가 없으므로 항상 meta 요소를 검사합니다.

use std::sync::Arc;

use pagehint_core::dom::{Element, ElementRef};
use pagehint_core::event::{self, Event};
use pagehint_core::types::{Category, Severity};
use pagehint_engine::{
    HintContext, HintDefinition, HintMetadata, OptionField, OptionKind, OptionsSchema,
    Subscriptions,
};
use serde::Deserialize;

pub const ID: &str = "highest-available-document-mode";

const HEADER: &str = "x-ua-compatible";

const OPTIONS: &[OptionField] = &[OptionField {
    name: "require_meta_element",
    kind: OptionKind::Bool,
    required: false,
    description: "require the meta element instead of the response header",
}];

pub fn definition() -> HintDefinition {
    HintDefinition {
        meta: HintMetadata {
            id: ID,
            category: Category::Compatibility,
            description: "Require the highest available document mode for targeted Internet Explorer versions",
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
    require_meta_element: bool,
}

struct Check {
    ctx: HintContext,
    targets_document_mode: bool,
    require_meta: bool,
}

fn factory(ctx: &HintContext) -> anyhow::Result<Subscriptions> {
    let options: Options = ctx.options()?;
    let check = Arc::new(Check {
        ctx: ctx.clone(),
        targets_document_mode: ctx.targets_document_mode_browsers(),
        require_meta: options.require_meta_element || ctx.is_local_target(),
    });

    Ok(Subscriptions::new().on(event::TRAVERSE_END, move |ev: Arc<Event>| {
        let check = Arc::clone(&check);
        async move {
            check.run(&ev.resource);
            Ok(())
        }
    }))
}

/// 공백을 무시하고 `ie=edge`와 비교합니다.
fn is_edge(value: &str) -> bool {
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    compact.eq_ignore_ascii_case("ie=edge")
}

impl Check {
    fn run(&self, resource: &str) {
        let Some(dom) = self.ctx.page_dom() else {
            return;
        };
        let header = self
            .ctx
            .page_headers()
            .and_then(|h| h.get(HEADER))
            .map(str::to_owned);
        let metas: Vec<ElementRef> = dom
            .query("meta")
            .into_iter()
            .filter(|m| {
                m.attribute("http-equiv")
                    .is_some_and(|v| v.trim().eq_ignore_ascii_case(HEADER))
            })
            .collect();

        if !self.targets_document_mode {
            self.flag_unneeded(resource, header.as_deref(), &metas);
        } else if self.require_meta {
            self.check_meta(resource, &metas);
        } else {
            self.check_header(resource, header.as_deref(), &metas);
        }
    }

    fn flag_unneeded(&self, resource: &str, header: Option<&str>, metas: &[ElementRef]) {
        let reporter = self.ctx.reporter();
        if header.is_some() {
            reporter.report(
                resource,
                None,
                "Response should not include unneeded 'x-ua-compatible' header.",
            );
        }
        for meta in metas {
            reporter.report(
                resource,
                Some(meta),
                "'x-ua-compatible' meta element is not needed.",
            );
        }
    }

    fn check_header(&self, resource: &str, header: Option<&str>, metas: &[ElementRef]) {
        let reporter = self.ctx.reporter();
        match header {
            None => reporter.report(
                resource,
                None,
                "Response should include 'x-ua-compatible' header.",
            ),
            Some(value) if !is_edge(value) => reporter.report(
                resource,
                None,
                format!(
                    "'x-ua-compatible' header value should be 'ie=edge', not '{}'.",
                    value.trim()
                ),
            ),
            Some(_) => {}
        }
        for meta in metas {
            reporter.report(
                resource,
                Some(meta),
                "'x-ua-compatible' meta element is not needed as the response header is used.",
            );
        }
    }

    fn check_meta(&self, resource: &str, metas: &[ElementRef]) {
        let reporter = self.ctx.reporter();
        let Some((first, rest)) = metas.split_first() else {
            reporter.report(
                resource,
                None,
                "'x-ua-compatible' meta element should be specified.",
            );
            return;
        };

        let content = first.attribute("content").unwrap_or_default();
        if !is_edge(content) {
            reporter.report(
                resource,
                Some(first),
                format!(
                    "'x-ua-compatible' meta element 'content' attribute value should be 'ie=edge', not '{}'.",
                    content.trim()
                ),
            );
        }

        match first.parent() {
            Some(head) if head.tag_name() == "head" => {
                let misplaced = head
                    .children()
                    .iter()
                    .take_while(|child| !child.is_same(first.as_ref()))
                    .any(|child| !matches!(child.tag_name(), "meta" | "title"));
                if misplaced {
                    reporter.report(
                        resource,
                        Some(first),
                        "'x-ua-compatible' meta element should be specified before all other elements except for '<title>' and other '<meta>' elements.",
                    );
                }
            }
            _ => reporter.report(
                resource,
                Some(first),
                "'x-ua-compatible' meta element should be specified in the '<head>'.",
            ),
        }

        for extra in rest {
            reporter.report(
                resource,
                Some(extra),
                "'x-ua-compatible' meta element is not needed as one was already specified.",
            );
        }
    }
}
