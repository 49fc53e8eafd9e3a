//! meta-charset-utf-8 — `<head>` 첫 요소로 `<meta charset="utf-8">` 하나를 요구

use std::sync::Arc;

use pagehint_core::dom::{Element, ElementRef};
use pagehint_core::event::{self, Event};
use pagehint_core::types::{Category, Severity};
use pagehint_engine::{HintContext, HintDefinition, HintMetadata, OptionsSchema, Subscriptions};

pub const ID: &str = "meta-charset-utf-8";

pub fn definition() -> HintDefinition {
    HintDefinition {
        meta: HintMetadata {
            id: ID,
            category: Category::Interoperability,
            description: "Require '<meta charset=\"utf-8\">' as the first element in '<head>'",
            default_severity: Severity::Warning,
            fixable: false,
            schema: OptionsSchema::EMPTY,
            works_with_local_files: true,
        },
        factory,
    }
}

fn factory(ctx: &HintContext) -> anyhow::Result<Subscriptions> {
    let ctx = ctx.clone();
    Ok(Subscriptions::new().on(event::TRAVERSE_END, move |ev: Arc<Event>| {
        let ctx = ctx.clone();
        async move {
            check(&ctx, &ev.resource);
            Ok(())
        }
    }))
}

fn is_charset_meta(meta: &ElementRef) -> bool {
    meta.has_attribute("charset")
        || meta
            .attribute("http-equiv")
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("content-type"))
}

fn check(ctx: &HintContext, resource: &str) {
    let Some(dom) = ctx.page_dom() else {
        return;
    };
    let reporter = ctx.reporter();

    let metas: Vec<ElementRef> = dom
        .query("meta")
        .into_iter()
        .filter(is_charset_meta)
        .collect();
    let Some((first, rest)) = metas.split_first() else {
        reporter.report(resource, None, "'charset' meta element was not specified.");
        return;
    };

    match first.attribute("charset") {
        Some(value) if !value.trim().eq_ignore_ascii_case("utf-8") => reporter.report(
            resource,
            Some(first),
            format!(
                "'charset' meta element value should be 'utf-8', not '{}'.",
                value.trim()
            ),
        ),
        Some(_) => {}
        None => reporter.report(
            resource,
            Some(first),
            "'charset' meta element should be specified using the shorter '<meta charset=\"utf-8\">' form.",
        ),
    }

    match first.parent() {
        Some(head) if head.tag_name() == "head" => {
            let leads = head
                .children()
                .first()
                .is_some_and(|child| child.is_same(first.as_ref()));
            if !leads {
                reporter.report(
                    resource,
                    Some(first),
                    "'charset' meta element should be the first thing in '<head>'.",
                );
            }
        }
        _ => reporter.report(
            resource,
            Some(first),
            "'charset' meta element should be specified in the '<head>'.",
        ),
    }

    for extra in rest {
        reporter.report(
            resource,
            Some(extra),
            "'charset' meta element is not needed as one was already specified.",
        );
    }
}
