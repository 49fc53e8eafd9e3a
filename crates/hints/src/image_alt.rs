//! image-alt — `alt` 속성이 없는 이미지

use std::sync::Arc;

use pagehint_core::dom::Element;
use pagehint_core::event::Event;
use pagehint_core::types::{Category, Severity};
use pagehint_engine::{HintContext, HintDefinition, HintMetadata, OptionsSchema, Subscriptions};

pub const ID: &str = "image-alt";

pub fn definition() -> HintDefinition {
    HintDefinition {
        meta: HintMetadata {
            id: ID,
            category: Category::Accessibility,
            description: "Require an 'alt' attribute on every image",
            default_severity: Severity::Warning,
            fixable: false,
            schema: OptionsSchema::EMPTY,
            works_with_local_files: true,
        },
        factory,
    }
}

fn factory(ctx: &HintContext) -> anyhow::Result<Subscriptions> {
    let reporter = ctx.reporter().clone();
    Ok(Subscriptions::new().on("element::img", move |ev: Arc<Event>| {
        let reporter = reporter.clone();
        async move {
            if let Some(img) = ev.element().filter(|img| !img.has_attribute("alt")) {
                reporter.report(
                    &ev.resource,
                    Some(img),
                    "Image element is missing an 'alt' attribute.",
                );
            }
            Ok(())
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{messages, scan_html};

    #[tokio::test]
    async fn flags_images_without_alt() {
        let report = scan_html(
            definition(),
            "<body>\n<img src=data:image/png;base64,AA alt=\"\">\n<IMG SRC=data:image/gif;base64,AA>\n</body>",
        )
        .await;

        assert_eq!(
            messages(&report),
            vec!["Image element is missing an 'alt' attribute."]
        );
        let location = report.problems[0].location.expect("location");
        assert_eq!(location.line, 3);
        assert_eq!(
            report.problems[0].source_code.as_deref(),
            Some("<IMG SRC=data:image/gif;base64,AA>")
        );
    }
}
