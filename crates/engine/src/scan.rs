//! 스캔 오케스트레이터
//!
//! 스캔 하나의 생명주기를 관리합니다.
//!
//! 1. 스캔 단위 버스/sink/페이지 상태 생성
//! 2. 힌트 바인딩 (`scan::start` 이전)
//! 3. 커넥터 `collect` 실행
//! 4. `scan::end` 발행 (대상 실패 시에도)
//! 5. 커넥터 종료, 분리 실행 핸들러 정리, 결과 조립

use std::sync::Arc;
use std::time::Instant;

use pagehint_core::config::PagehintConfig;
use pagehint_core::error::{ConnectorError, PagehintError};
use pagehint_core::metrics as m;
use pagehint_core::types::BrowserTarget;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::bus::EventBus;
use crate::connector::{DynConnector, ScanDriver};
use crate::hint::{BindContext, HintRegistry, PageState};
use crate::report::{Diagnostic, ScanReport};
use crate::sink::ProblemSink;

/// 스캔 오케스트레이터
///
/// 설정과 레지스트리는 불변이며 여러 스캔이 공유할 수 있습니다.
///
/// # 사용 예시
/// ```ignore
/// let scanner = Scanner::new(registry, config)?;
/// let mut connector = StaticConnector::local();
/// let report = scanner.scan(&mut connector, "./index.html").await;
/// ```
#[derive(Debug)]
pub struct Scanner {
    registry: Arc<HintRegistry>,
    config: Arc<PagehintConfig>,
    browsers: Arc<[BrowserTarget]>,
}

impl Scanner {
    /// 대상 브라우저 목록을 해석해 오케스트레이터를 생성합니다.
    pub fn new(registry: HintRegistry, config: PagehintConfig) -> Result<Self, PagehintError> {
        let browsers: Arc<[BrowserTarget]> = config.browser_targets()?.into();
        Ok(Self {
            registry: Arc::new(registry),
            config: Arc::new(config),
            browsers,
        })
    }

    pub fn registry(&self) -> &HintRegistry {
        &self.registry
    }

    pub fn config(&self) -> &PagehintConfig {
        &self.config
    }

    /// 대상 하나를 스캔합니다.
    ///
    /// 실패는 모두 [`ScanReport::diagnostics`]로 수집되며, 이 함수는 실패하지 않습니다.
    pub async fn scan(&self, connector: &mut dyn DynConnector, target: &str) -> ScanReport {
        let scan_id = Uuid::new_v4().to_string();
        let started = Instant::now();
        info!(%scan_id, target, connector = connector.name(), "scan started");

        let sink = Arc::new(ProblemSink::new(self.config.scan.max_source_snippet));
        let page = Arc::new(PageState::default());
        let mut bus = EventBus::new();

        let outcome = self.registry.bind(
            &BindContext {
                config: &self.config,
                browsers: Arc::clone(&self.browsers),
                sink: Arc::clone(&sink),
                page: Arc::clone(&page),
                target,
            },
            &mut bus,
        );
        let mut diagnostics = outcome.diagnostics;
        metrics::histogram!(m::SCAN_HINTS_BOUND).record(outcome.bound.len() as f64);
        debug!(%scan_id, hints = ?outcome.bound, "hints bound");

        let driver = ScanDriver::new(bus, Arc::clone(&sink), page);

        if let Err(e) = connector.collect(target, &driver).await {
            error!(%scan_id, target, error = %e, "target could not be collected");
            diagnostics.push(match e {
                ConnectorError::Dispatch(inner) => Diagnostic::Dispatch {
                    reason: inner.to_string(),
                },
                other => Diagnostic::TargetFetch {
                    reason: other.to_string(),
                },
            });
        }

        let resource = driver.target().unwrap_or(target).to_owned();
        // emit으로 분리된 핸들러가 끝난 뒤에 scan::end를 발행합니다.
        driver.bus().settle().await;
        if !driver.scan_started() {
            if let Err(e) = driver.start_scan(&resource).await {
                diagnostics.push(Diagnostic::Dispatch {
                    reason: e.to_string(),
                });
            }
        }
        if let Err(e) = driver.end_scan(&resource).await {
            diagnostics.push(Diagnostic::Dispatch {
                reason: e.to_string(),
            });
        }
        let problems = sink.problems();

        if let Err(e) = connector.close().await {
            warn!(%scan_id, error = %e, "connector close failed");
            diagnostics.push(Diagnostic::ConnectorClose {
                reason: e.to_string(),
            });
        }

        driver.bus().settle().await;
        diagnostics.extend(
            driver
                .bus()
                .take_faults()
                .into_iter()
                .map(Diagnostic::from),
        );

        let elapsed = started.elapsed();
        let result = if diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::TargetFetch { .. } | Diagnostic::Dispatch { .. }))
        {
            "failure"
        } else {
            "success"
        };
        metrics::counter!(m::SCAN_COMPLETED_TOTAL, m::LABEL_RESULT => result).increment(1);
        metrics::histogram!(m::SCAN_DURATION_SECONDS).record(elapsed.as_secs_f64());

        info!(
            %scan_id,
            target = %resource,
            problems = problems.len(),
            diagnostics = diagnostics.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "scan finished"
        );

        ScanReport {
            scan_id,
            target: resource,
            problems,
            diagnostics,
            hints_bound: outcome.bound,
            duration_ms: elapsed.as_millis() as u64,
        }
    }
}
