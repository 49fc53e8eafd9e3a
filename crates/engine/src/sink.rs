//! Problem sink — 힌트가 보고한 문제를 스캔 단위로 수집
//!
//! 각 힌트는 바인딩 시점에 자기 ID와 심각도가 고정된 [`Reporter`]를 받습니다.
//! 보고는 실패하지 않으며, 짧은 동기 임계 구역에서만 잠금을 잡습니다.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use pagehint_core::dom::ElementRef;
use pagehint_core::metrics as m;
use pagehint_core::types::{Problem, ProblemLocation, Severity};
use tracing::{debug, warn};

/// 스캔 단위 Problem 저장소
#[derive(Debug)]
pub struct ProblemSink {
    problems: Mutex<Vec<Problem>>,
    resources: Mutex<HashSet<String>>,
    max_snippet: usize,
}

impl ProblemSink {
    /// `max_snippet`: Problem마다 보관할 외부 HTML 최대 문자 수 (0이면 보관하지 않음)
    pub fn new(max_snippet: usize) -> Self {
        Self {
            problems: Mutex::new(Vec::new()),
            resources: Mutex::new(HashSet::new()),
            max_snippet,
        }
    }

    /// fetch가 시작된 리소스를 등록합니다. 등록된 리소스에 대한 보고만 수집됩니다.
    pub fn track_resource(&self, resource: &str) {
        self.resources
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(resource.to_owned());
    }

    pub fn is_tracked(&self, resource: &str) -> bool {
        self.resources
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(resource)
    }

    /// 힌트 전용 Reporter를 생성합니다.
    pub fn reporter(self: &Arc<Self>, hint_id: &str, severity: Severity) -> Reporter {
        Reporter {
            hint_id: Arc::from(hint_id),
            severity,
            sink: Arc::clone(self),
        }
    }

    fn push(&self, problem: Problem) {
        if !self.is_tracked(&problem.resource) {
            warn!(
                hint = %problem.hint_id,
                resource = %problem.resource,
                "dropping problem reported against a resource that was never fetched"
            );
            return;
        }

        debug!(
            hint = %problem.hint_id,
            resource = %problem.resource,
            severity = %problem.severity,
            "problem reported"
        );
        metrics::counter!(
            m::SCAN_PROBLEMS_REPORTED_TOTAL,
            m::LABEL_SEVERITY => problem.severity.to_string()
        )
        .increment(1);

        self.problems
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(problem);
    }

    /// 수집된 Problem (보고 순서)
    pub fn problems(&self) -> Vec<Problem> {
        self.problems
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.problems
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn snippet(&self, element: &ElementRef) -> Option<String> {
        if self.max_snippet == 0 {
            return None;
        }
        Some(element.outer_html().chars().take(self.max_snippet).collect())
    }
}

/// 개별 보고 옵션
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// 설정된 심각도 대신 사용할 심각도
    pub severity: Option<Severity>,
    /// 요소 위치 대신 사용할 위치
    pub location: Option<ProblemLocation>,
    /// 외부 HTML 대신 사용할 소스 조각
    pub source_code: Option<String>,
}

impl ReportOptions {
    pub fn severity(severity: Severity) -> Self {
        Self {
            severity: Some(severity),
            ..Self::default()
        }
    }
}

/// 힌트 하나에 묶인 보고 핸들
#[derive(Debug, Clone)]
pub struct Reporter {
    hint_id: Arc<str>,
    severity: Severity,
    sink: Arc<ProblemSink>,
}

impl Reporter {
    pub fn hint_id(&self) -> &str {
        &self.hint_id
    }

    /// 설정에서 결정된 심각도
    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn is_enabled(&self) -> bool {
        self.severity.is_enabled()
    }

    /// 설정된 심각도로 문제를 보고합니다.
    pub fn report(&self, resource: &str, element: Option<&ElementRef>, message: impl Into<String>) {
        self.report_with(resource, element, message, ReportOptions::default());
    }

    /// 옵션을 지정해 문제를 보고합니다.
    ///
    /// 힌트가 `off`로 설정되었거나 최종 심각도가 `off`이면 아무것도 하지 않습니다.
    pub fn report_with(
        &self,
        resource: &str,
        element: Option<&ElementRef>,
        message: impl Into<String>,
        options: ReportOptions,
    ) {
        if !self.is_enabled() {
            return;
        }
        let severity = options.severity.unwrap_or(self.severity);
        if !severity.is_enabled() {
            return;
        }

        let location = options.location.or_else(|| {
            element
                .and_then(|e| e.location())
                .map(|l| ProblemLocation::new(l.line, l.column))
        });
        let source_code = options
            .source_code
            .or_else(|| element.and_then(|e| self.sink.snippet(e)));

        self.sink.push(Problem {
            resource: resource.to_owned(),
            hint_id: self.hint_id.to_string(),
            severity,
            message: message.into(),
            location,
            source_code,
        });
    }
}
