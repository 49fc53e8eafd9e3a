//! 커넥터 trait과 스캔 드라이버
//!
//! 커넥터는 대상 문서를 가져오고 [`ScanDriver`]를 통해 정해진 순서로 이벤트를 발행합니다.
//!
//! ```text
//! scan::start → fetch::start::target → fetch::end::html → (page 게시)
//!   → fetch::start → fetch::end::<type> | fetch::error   (하위 리소스마다)
//!   → traverse::*, element::*
//! ```
//!
//! `scan::end`는 오케스트레이터만 발행합니다.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use pagehint_core::dom::{Document, DocumentRef, Headers};
use pagehint_core::error::{BusError, ConnectorError};
use pagehint_core::event::{self, Event, FetchEnd, FetchFailure, MediaType};
use tracing::{debug, warn};

use crate::BoxFuture;
use crate::bus::EventBus;
use crate::hint::PageState;
use crate::sink::ProblemSink;
use crate::traverse::{self, TraversalStats};

/// 대상 문서를 가져와 이벤트를 발행하는 커넥터
///
/// 네이티브 async 메서드를 사용합니다.
/// 여러 구현을 동적으로 다루려면 [`DynConnector`]를 사용하세요.
pub trait Connector: Send {
    /// 커넥터 이름 (예: `"local"`)
    fn name(&self) -> &str;

    /// 대상을 가져오고 드라이버로 이벤트를 발행합니다.
    ///
    /// 대상 문서를 가져오지 못하면 에러를 반환합니다.
    fn collect(
        &mut self,
        target: &str,
        driver: &ScanDriver,
    ) -> impl Future<Output = Result<(), ConnectorError>> + Send;

    /// 커넥터 자원을 정리합니다.
    fn close(&mut self) -> impl Future<Output = Result<(), ConnectorError>> + Send;
}

/// dyn-compatible 커넥터 trait
///
/// `Connector`를 구현하면 blanket implementation으로 자동 구현됩니다.
pub trait DynConnector: Send {
    fn name(&self) -> &str;

    fn collect<'a>(
        &'a mut self,
        target: &'a str,
        driver: &'a ScanDriver,
    ) -> BoxFuture<'a, Result<(), ConnectorError>>;

    fn close(&mut self) -> BoxFuture<'_, Result<(), ConnectorError>>;
}

impl<T: Connector> DynConnector for T {
    fn name(&self) -> &str {
        Connector::name(self)
    }

    fn collect<'a>(
        &'a mut self,
        target: &'a str,
        driver: &'a ScanDriver,
    ) -> BoxFuture<'a, Result<(), ConnectorError>> {
        Box::pin(Connector::collect(self, target, driver))
    }

    fn close(&mut self) -> BoxFuture<'_, Result<(), ConnectorError>> {
        Box::pin(Connector::close(self))
    }
}

// ─── ScanDriver ──────────────────────────────────────────────────────

/// 커넥터가 스캔 이벤트를 발행하는 통로
///
/// 스캔 하나에 하나씩 만들어지며 버스, Problem sink, 페이지 상태를 소유합니다.
#[derive(Debug)]
pub struct ScanDriver {
    bus: EventBus,
    sink: Arc<ProblemSink>,
    page: Arc<PageState>,
    scan_started: AtomicBool,
    target: OnceLock<String>,
    traversing: Mutex<Option<String>>,
}

impl ScanDriver {
    pub fn new(bus: EventBus, sink: Arc<ProblemSink>, page: Arc<PageState>) -> Self {
        Self {
            bus,
            sink,
            page,
            scan_started: AtomicBool::new(false),
            target: OnceLock::new(),
            traversing: Mutex::new(None),
        }
    }

    /// `scan::start`를 발행합니다. 두 번째 호출부터는 무시됩니다.
    pub async fn start_scan(&self, resource: &str) -> Result<(), BusError> {
        if self.scan_started.swap(true, Ordering::SeqCst) {
            warn!(resource, "scan::start already emitted, ignoring");
            return Ok(());
        }
        self.bus
            .emit_async(Event::new(event::SCAN_START, resource))
            .await
    }

    pub fn scan_started(&self) -> bool {
        self.scan_started.load(Ordering::SeqCst)
    }

    /// `fetch::start::target`를 발행하고 대상 리소스를 기록합니다.
    pub async fn fetch_start_target(&self, resource: &str) -> Result<(), BusError> {
        if self.target.set(resource.to_owned()).is_err() {
            warn!(resource, "target resource already announced");
        }
        self.sink.track_resource(resource);
        self.bus
            .emit_async(Event::new(event::FETCH_START_TARGET, resource))
            .await
    }

    /// 커넥터가 알린 정규화된 대상 리소스
    pub fn target(&self) -> Option<&str> {
        self.target.get().map(String::as_str)
    }

    /// 하위 리소스의 `fetch::start`를 발행합니다.
    pub async fn fetch_start(&self, resource: &str) -> Result<(), BusError> {
        self.sink.track_resource(resource);
        self.bus
            .emit_async(Event::new(event::FETCH_START, resource))
            .await
    }

    /// 대상 문서의 `fetch::end::html`을 발행합니다.
    ///
    /// 대상 문서는 HTML로 파싱되므로 응답의 `content-type`과 관계없이 미디어 타입을
    /// [`MediaType::Html`]로 맞춥니다.
    pub async fn fetch_end_target(
        &self,
        resource: &str,
        mut fetch: FetchEnd,
    ) -> Result<(), BusError> {
        if fetch.response.media_type != MediaType::Html {
            debug!(
                resource,
                media_type = %fetch.response.media_type,
                "target document treated as html"
            );
            fetch.response.media_type = MediaType::Html;
        }
        self.warn_if_untracked(resource, event::FETCH_END_PREFIX);
        self.bus.emit_async(Event::fetched(resource, fetch)).await
    }

    /// 응답 미디어 타입에 맞는 `fetch::end::<type>`을 발행합니다.
    pub async fn fetch_end(&self, resource: &str, fetch: FetchEnd) -> Result<(), BusError> {
        self.warn_if_untracked(resource, event::FETCH_END_PREFIX);
        self.bus.emit_async(Event::fetched(resource, fetch)).await
    }

    /// `fetch::error`를 발행합니다.
    pub async fn fetch_error(&self, resource: &str, failure: FetchFailure) -> Result<(), BusError> {
        self.warn_if_untracked(resource, event::FETCH_ERROR);
        self.bus
            .emit_async(Event::fetch_failed(resource, failure))
            .await
    }

    // fetch::start 없이 끝난 리소스는 추적하지 않으므로 해당 리소스의 보고는 버려집니다.
    fn warn_if_untracked(&self, resource: &str, event_name: &str) {
        if !self.sink.is_tracked(resource) {
            warn!(resource, event = event_name, "fetch finished without fetch::start");
        }
    }

    /// 대상 문서의 DOM과 헤더를 게시합니다.
    pub fn publish_page(&self, dom: DocumentRef, headers: Headers) {
        if !self.page.publish(dom, headers) {
            warn!("page DOM already published, keeping the first one");
        }
    }

    /// 문서를 순회합니다. 같은 스캔에서 순회는 한 번에 하나만 진행됩니다.
    pub async fn traverse(
        &self,
        document: &dyn Document,
        resource: &str,
    ) -> Result<TraversalStats, BusError> {
        let _guard = TraversalGuard::acquire(&self.traversing, resource)?;
        traverse::traverse_document(&self.bus, document, resource).await
    }

    /// 핸들러 완료를 기다리지 않고 이벤트를 발행합니다.
    pub fn notify(&self, event: Event) -> bool {
        self.bus.emit(event)
    }

    /// `scan::end`를 발행합니다.
    pub(crate) async fn end_scan(&self, resource: &str) -> Result<(), BusError> {
        debug!(resource, "emitting scan::end");
        self.bus
            .emit_async(Event::new(event::SCAN_END, resource))
            .await
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn sink(&self) -> &Arc<ProblemSink> {
        &self.sink
    }

    pub fn page(&self) -> &Arc<PageState> {
        &self.page
    }
}

/// 진행 중인 순회 표시. drop 시 해제됩니다.
struct TraversalGuard<'a> {
    slot: &'a Mutex<Option<String>>,
}

impl<'a> TraversalGuard<'a> {
    fn acquire(slot: &'a Mutex<Option<String>>, resource: &str) -> Result<Self, BusError> {
        let mut active = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(current) = active.as_ref() {
            return Err(BusError::TraversalInProgress {
                active: current.clone(),
                requested: resource.to_owned(),
            });
        }
        *active = Some(resource.to_owned());
        Ok(Self { slot })
    }
}

impl Drop for TraversalGuard<'_> {
    fn drop(&mut self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
