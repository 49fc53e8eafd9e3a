//! 스캔 결과 — 문제 목록과 진단

use std::fmt;

use pagehint_core::types::{Problem, Severity, sort_problems};
use serde::Serialize;

use crate::bus::HandlerFault;

/// 문제가 아닌 스캔 진행 중의 이상 상황
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// 핸들러가 실패하거나 panic
    HandlerFault {
        hint: String,
        event: String,
        resource: String,
        message: String,
        panicked: bool,
    },
    /// 바인딩에서 제외된 힌트
    HintSkipped { hint: String, reason: String },
    /// 힌트 설정/초기화 실패
    HintConfig { hint: String, reason: String },
    /// 대상 문서를 가져오지 못함
    TargetFetch { reason: String },
    /// 이벤트 디스패치 중단
    Dispatch { reason: String },
    /// 커넥터 종료 실패
    ConnectorClose { reason: String },
}

impl From<HandlerFault> for Diagnostic {
    fn from(fault: HandlerFault) -> Self {
        Self::HandlerFault {
            hint: fault.hint,
            event: fault.event,
            resource: fault.resource,
            message: fault.message,
            panicked: fault.panicked,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HandlerFault {
                hint,
                event,
                resource,
                message,
                panicked,
            } => {
                let what = if *panicked { "panicked" } else { "failed" };
                write!(f, "hint '{hint}' {what} on {event} ({resource}): {message}")
            }
            Self::HintSkipped { hint, reason } => write!(f, "hint '{hint}' skipped: {reason}"),
            Self::HintConfig { hint, reason } => write!(f, "hint '{hint}' not loaded: {reason}"),
            Self::TargetFetch { reason } => write!(f, "target fetch failed: {reason}"),
            Self::Dispatch { reason } => write!(f, "dispatch aborted: {reason}"),
            Self::ConnectorClose { reason } => write!(f, "connector close failed: {reason}"),
        }
    }
}

/// 심각도별 문제 수
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub errors: usize,
    pub warnings: usize,
}

impl SeverityCounts {
    pub fn total(&self) -> usize {
        self.errors + self.warnings
    }
}

/// 스캔 한 번의 결과
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// 스캔 ID (UUID v4)
    pub scan_id: String,
    /// 정규화된 대상
    pub target: String,
    /// 보고 순서의 문제 목록
    pub problems: Vec<Problem>,
    pub diagnostics: Vec<Diagnostic>,
    /// 바인딩된 힌트 ID
    pub hints_bound: Vec<String>,
    pub duration_ms: u64,
}

impl ScanReport {
    pub fn severity_counts(&self) -> SeverityCounts {
        let mut counts = SeverityCounts::default();
        for problem in &self.problems {
            match problem.severity {
                Severity::Error => counts.errors += 1,
                Severity::Warning => counts.warnings += 1,
                Severity::Off => {}
            }
        }
        counts
    }

    /// `threshold` 이상의 문제가 있는지 확인합니다. `Off`는 항상 `false`입니다.
    pub fn has_problems_at(&self, threshold: Severity) -> bool {
        threshold.is_enabled() && self.problems.iter().any(|p| p.severity >= threshold)
    }

    /// 표시 순서로 정렬된 문제 목록
    pub fn sorted_problems(&self) -> Vec<Problem> {
        let mut problems = self.problems.clone();
        sort_problems(&mut problems);
        problems
    }

    /// 핸들러 장애 진단만
    pub fn handler_faults(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, Diagnostic::HandlerFault { .. }))
    }

    /// 대상 문서를 가져오지 못했는지
    pub fn target_failed(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::TargetFetch { .. }))
    }
}
