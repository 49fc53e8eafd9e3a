//! no-broken-links — 가져오지 못한 하위 리소스 보고

use std::sync::Arc;

use pagehint_core::event::{self, Event};
use pagehint_core::types::{Category, Severity};
use pagehint_engine::{HintContext, HintDefinition, HintMetadata, OptionsSchema, Subscriptions};

pub const ID: &str = "no-broken-links";

pub fn definition() -> HintDefinition {
    HintDefinition {
        meta: HintMetadata {
            id: ID,
            category: Category::Other,
            description: "Report referenced resources that could not be fetched",
            default_severity: Severity::Error,
            fixable: false,
            schema: OptionsSchema::EMPTY,
            works_with_local_files: true,
        },
        factory,
    }
}

fn factory(ctx: &HintContext) -> anyhow::Result<Subscriptions> {
    let reporter = ctx.reporter().clone();
    Ok(Subscriptions::new().on(event::FETCH_ERROR, move |ev: Arc<Event>| {
        let reporter = reporter.clone();
        async move {
            let Some(failure) = ev.fetch_failure() else {
                return Ok(());
            };
            let message = match failure.status {
                Some(status) => format!("Broken link found ({status} response)."),
                None => format!("Broken link found (request failed: {}).", failure.error),
            };
            reporter.report(&ev.resource, failure.element.as_ref(), message);
            Ok(())
        }
    }))
}
