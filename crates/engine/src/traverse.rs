//! 문서 트래버설 — 깊이 우선 순회와 이벤트 발행
//!
//! 순회는 재귀 없이 명시적 스택으로 구현되어 깊은 문서에서도 스택 오버플로가 없습니다.
//!
//! ```text
//! traverse::start
//!   element::<tag> → traverse::down → (자식들) → traverse::up
//! traverse::end
//! ```
//!
//! 모든 발행은 `emit_async`이므로 현재 이벤트의 핸들러가 모두 끝나야 다음 단계로 진행합니다.

use pagehint_core::dom::{Document, ElementRef};
use pagehint_core::error::BusError;
use pagehint_core::event::{self, Event};
use pagehint_core::metrics as m;
use tracing::debug;

use crate::bus::EventBus;

/// 순회 통계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalStats {
    /// 방문한 요소 수
    pub elements: usize,
    /// 최대 깊이 (루트 = 1)
    pub max_depth: usize,
}

enum Step {
    Enter(ElementRef),
    Exit(ElementRef),
}

/// 문서를 순회하며 이벤트를 발행합니다.
pub async fn traverse_document(
    bus: &EventBus,
    document: &dyn Document,
    resource: &str,
) -> Result<TraversalStats, BusError> {
    traverse(bus, document.root(), resource).await
}

/// `root`부터 깊이 우선으로 순회하며 이벤트를 발행합니다.
pub async fn traverse(
    bus: &EventBus,
    root: ElementRef,
    resource: &str,
) -> Result<TraversalStats, BusError> {
    debug!(resource, "traversal started");
    bus.emit_async(Event::new(event::TRAVERSE_START, resource))
        .await?;

    let mut stats = TraversalStats::default();
    let mut depth = 0usize;
    let mut stack = vec![Step::Enter(root)];

    while let Some(step) = stack.pop() {
        match step {
            Step::Enter(element) => {
                stats.elements += 1;
                depth += 1;
                stats.max_depth = stats.max_depth.max(depth);

                let name = event::element_event(element.tag_name());
                bus.emit_async(Event::with_element(name, resource, element.clone()))
                    .await?;
                bus.emit_async(Event::with_element(
                    event::TRAVERSE_DOWN,
                    resource,
                    element.clone(),
                ))
                .await?;

                let children = element.children();
                stack.push(Step::Exit(element));
                stack.extend(children.into_iter().rev().map(Step::Enter));
            }
            Step::Exit(element) => {
                depth -= 1;
                bus.emit_async(Event::with_element(event::TRAVERSE_UP, resource, element))
                    .await?;
            }
        }
    }

    bus.emit_async(Event::new(event::TRAVERSE_END, resource))
        .await?;

    metrics::counter!(m::TRAVERSAL_ELEMENTS_TOTAL).increment(stats.elements as u64);
    debug!(
        resource,
        elements = stats.elements,
        max_depth = stats.max_depth,
        "traversal finished"
    );
    Ok(stats)
}
