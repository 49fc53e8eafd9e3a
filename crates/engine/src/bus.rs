//! 이벤트 버스 — 이름 기반 pub/sub 와 핸들러 장애 격리
//!
//! [`EventBus`]는 스캔 하나 동안 사용되는 구독 테이블입니다.
//! 힌트 바인딩 단계에서 `&mut`로 구독을 등록하고, 스캔이 시작되면
//! `Arc<EventBus>`로 고정되어 더 이상 변경되지 않습니다.
//!
//! # 디스패치 순서
//! - 정확한 이름 구독자 먼저, 그 다음 와일드카드 구독자
//! - 각 그룹 안에서는 등록 순서
//!
//! # 장애 격리
//! 모든 핸들러는 별도 tokio 태스크 안에서 호출됩니다. 핸들러가 `Err`를 반환하거나
//! panic 하면 [`HandlerFault`]로 기록되고 디스패치는 다음 핸들러로 계속됩니다.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use pagehint_core::error::BusError;
use pagehint_core::event::Event;
use pagehint_core::metrics as m;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::task::JoinError;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

use crate::BoxFuture;

/// 핸들러가 반환하는 future
pub type HandlerFuture = BoxFuture<'static, anyhow::Result<()>>;

/// 비동기 이벤트 핸들러
pub type Handler = Arc<dyn Fn(Arc<Event>) -> HandlerFuture + Send + Sync>;

// ─── Pattern ─────────────────────────────────────────────────────────

/// 구독 패턴
///
/// 정확한 이벤트 이름 또는 `<namespace>::*` 형식의 네임스페이스 와일드카드입니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Pattern {
    /// 정확한 이름 (예: `traverse::start`)
    Exact(String),
    /// 네임스페이스 접두어 (끝의 `::` 포함, 예: `"element::"`)
    Namespace(String),
}

impl Pattern {
    /// 패턴 문자열을 검증하고 파싱합니다.
    pub fn parse(pattern: &str) -> Result<Self, BusError> {
        let invalid = |reason: &str| BusError::InvalidPattern {
            pattern: pattern.to_owned(),
            reason: reason.to_owned(),
        };

        if pattern.is_empty() {
            return Err(invalid("pattern is empty"));
        }
        if pattern.chars().any(char::is_whitespace) {
            return Err(invalid("pattern contains whitespace"));
        }
        if pattern == "*" {
            return Err(invalid("bare wildcard is not allowed"));
        }

        if let Some(namespace) = pattern.strip_suffix("::*") {
            if namespace.is_empty() {
                return Err(invalid("wildcard requires a namespace"));
            }
            if namespace.contains('*') {
                return Err(invalid("'*' is only allowed as the trailing '::*' segment"));
            }
            return Ok(Self::Namespace(format!("{namespace}::")));
        }

        if pattern.contains('*') {
            return Err(invalid("'*' is only allowed as the trailing '::*' segment"));
        }
        if pattern.starts_with("::") || pattern.ends_with("::") {
            return Err(invalid("empty name segment"));
        }
        Ok(Self::Exact(pattern.to_owned()))
    }

    /// 이벤트 이름이 패턴과 일치하는지 확인합니다.
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Exact(exact) => exact == name,
            Self::Namespace(prefix) => name.len() > prefix.len() && name.starts_with(prefix),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Namespace(_))
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(name) => f.write_str(name),
            Self::Namespace(prefix) => write!(f, "{prefix}*"),
        }
    }
}

// ─── HandlerFault ────────────────────────────────────────────────────

/// 격리된 핸들러 장애 기록
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerFault {
    /// 핸들러를 소유한 힌트 ID
    pub hint: String,
    /// 디스패치 중이던 이벤트 이름
    pub event: String,
    /// 이벤트 리소스
    pub resource: String,
    /// 에러 또는 panic 메시지
    pub message: String,
    /// panic 여부
    pub panicked: bool,
}

impl fmt::Display for HandlerFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.panicked { "panicked" } else { "failed" };
        write!(
            f,
            "hint '{}' {} on '{}' ({}): {}",
            self.hint, kind, self.event, self.resource, self.message
        )
    }
}

// ─── EventBus ────────────────────────────────────────────────────────

struct Listener {
    pattern: Pattern,
    owner: String,
    handler: Handler,
}

/// 스캔 단위 이벤트 버스
pub struct EventBus {
    exact: HashMap<String, Vec<Arc<Listener>>>,
    wildcards: Vec<Arc<Listener>>,
    faults: Arc<Mutex<Vec<HandlerFault>>>,
    detached: TaskTracker,
}

impl EventBus {
    /// 빈 버스를 생성합니다.
    pub fn new() -> Self {
        Self {
            exact: HashMap::new(),
            wildcards: Vec::new(),
            faults: Arc::new(Mutex::new(Vec::new())),
            detached: TaskTracker::new(),
        }
    }

    /// 핸들러를 구독합니다.
    ///
    /// 같은 패턴에 여러 핸들러를 등록할 수 있으며, 등록 순서가 호출 순서입니다.
    pub fn subscribe(
        &mut self,
        pattern: &str,
        owner: impl Into<String>,
        handler: Handler,
    ) -> Result<(), BusError> {
        let pattern = Pattern::parse(pattern)?;
        let listener = Arc::new(Listener {
            pattern,
            owner: owner.into(),
            handler,
        });

        match &listener.pattern {
            Pattern::Exact(name) => self
                .exact
                .entry(name.clone())
                .or_default()
                .push(Arc::clone(&listener)),
            Pattern::Namespace(_) => self.wildcards.push(Arc::clone(&listener)),
        }
        debug!(pattern = %listener.pattern, hint = %listener.owner, "listener subscribed");
        Ok(())
    }

    /// async 클로저를 핸들러로 구독합니다.
    pub fn on<F, Fut>(
        &mut self,
        pattern: &str,
        owner: impl Into<String>,
        handler: F,
    ) -> Result<(), BusError>
    where
        F: Fn(Arc<Event>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.subscribe(pattern, owner, boxed_handler(handler))
    }

    /// 등록된 리스너 수
    pub fn listener_count(&self) -> usize {
        self.exact.values().map(Vec::len).sum::<usize>() + self.wildcards.len()
    }

    /// 이름에 일치하는 리스너가 있는지 확인합니다.
    pub fn has_listeners(&self, name: &str) -> bool {
        self.exact.get(name).is_some_and(|l| !l.is_empty())
            || self.wildcards.iter().any(|l| l.pattern.matches(name))
    }

    fn matching(&self, name: &str) -> Vec<Arc<Listener>> {
        let exact = self.exact.get(name).into_iter().flatten();
        let wildcard = self.wildcards.iter().filter(|l| l.pattern.matches(name));
        exact.chain(wildcard).cloned().collect()
    }

    /// 일치하는 핸들러를 순서대로 호출하고, 각 핸들러가 끝날 때까지 기다립니다.
    ///
    /// 핸들러의 에러와 panic은 격리되어 기록됩니다. 핸들러 태스크가 취소되어
    /// 결과를 알 수 없는 경우(런타임 종료 등)에만 에러를 반환합니다.
    pub async fn emit_async(&self, event: Event) -> Result<(), BusError> {
        let event = Arc::new(event);
        metrics::counter!(m::BUS_EVENTS_EMITTED_TOTAL).increment(1);

        for listener in self.matching(&event.name) {
            let handler = Arc::clone(&listener.handler);
            let payload = Arc::clone(&event);
            let outcome = tokio::spawn(async move { handler(payload).await }).await;

            if let Some(aborted) = resolve_outcome(&self.faults, &listener, &event, outcome) {
                return Err(aborted);
            }
        }
        Ok(())
    }

    /// 일치하는 핸들러를 기다리지 않고 실행합니다 (fire-and-forget).
    ///
    /// 적어도 하나의 핸들러가 일치하면 `true`를 반환합니다. 분리된 핸들러의
    /// 장애도 기록되며, [`EventBus::settle`]로 완료를 기다릴 수 있습니다.
    pub fn emit(&self, event: Event) -> bool {
        let listeners = self.matching(&event.name);
        if listeners.is_empty() {
            return false;
        }
        metrics::counter!(m::BUS_EVENTS_EMITTED_TOTAL).increment(1);
        let event = Arc::new(event);

        let Ok(runtime) = Handle::try_current() else {
            for listener in &listeners {
                record_fault(
                    &self.faults,
                    &listener.owner,
                    &event,
                    "no async runtime available for detached dispatch".to_owned(),
                    false,
                );
            }
            return true;
        };

        for listener in listeners {
            let faults = Arc::clone(&self.faults);
            let event = Arc::clone(&event);
            self.detached.spawn_on(
                async move {
                    let handler = Arc::clone(&listener.handler);
                    let payload = Arc::clone(&event);
                    let outcome = tokio::spawn(async move { handler(payload).await }).await;
                    if let Some(aborted) = resolve_outcome(&faults, &listener, &event, outcome) {
                        warn!(error = %aborted, "detached handler aborted");
                    }
                },
                &runtime,
            );
        }
        true
    }

    /// `emit`으로 분리 실행된 모든 핸들러가 끝날 때까지 기다립니다.
    pub async fn settle(&self) {
        self.detached.close();
        self.detached.wait().await;
        self.detached.reopen();
    }

    /// 지금까지 기록된 핸들러 장애 (복사본)
    pub fn faults(&self) -> Vec<HandlerFault> {
        self.faults
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// 기록된 핸들러 장애를 꺼내고 비웁니다.
    pub fn take_faults(&self) -> Vec<HandlerFault> {
        std::mem::take(&mut *self.faults.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("exact", &self.exact.len())
            .field("wildcards", &self.wildcards.len())
            .finish()
    }
}

/// async 클로저를 [`Handler`]로 변환합니다.
pub fn boxed_handler<F, Fut>(handler: F) -> Handler
where
    F: Fn(Arc<Event>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(move |event| Box::pin(handler(event)))
}

/// 핸들러 태스크 결과를 처리합니다. 격리할 수 없는 결과이면 에러를 돌려줍니다.
fn resolve_outcome(
    faults: &Mutex<Vec<HandlerFault>>,
    listener: &Listener,
    event: &Event,
    outcome: Result<anyhow::Result<()>, JoinError>,
) -> Option<BusError> {
    match outcome {
        Ok(Ok(())) => None,
        Ok(Err(e)) => {
            record_fault(faults, &listener.owner, event, format!("{e:#}"), false);
            None
        }
        Err(join) if join.is_panic() => {
            let message = panic_message(join.into_panic());
            record_fault(faults, &listener.owner, event, message, true);
            None
        }
        Err(join) => Some(BusError::DispatchAborted {
            event: event.name.clone(),
            hint: listener.owner.clone(),
            reason: join.to_string(),
        }),
    }
}

fn record_fault(
    faults: &Mutex<Vec<HandlerFault>>,
    owner: &str,
    event: &Event,
    message: String,
    panicked: bool,
) {
    warn!(
        hint = owner,
        event = %event.name,
        resource = %event.resource,
        panicked,
        error = %message,
        "hint handler failed, continuing dispatch"
    );
    metrics::counter!(m::BUS_HANDLER_FAULTS_TOTAL, m::LABEL_HINT => owner.to_owned())
        .increment(1);

    faults
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(HandlerFault {
            hint: owner.to_owned(),
            event: event.name.clone(),
            resource: event.resource.clone(),
            message,
            panicked,
        });
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_owned()
    }
}
