//! 메트릭 상수 및 설명 등록
//!
//! 스캔 엔진이 기록하는 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 엔진은 이 상수로 `metrics::counter!()`, `metrics::histogram!()`을 호출하며,
//! recorder가 설치되지 않으면 기록은 no-op입니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `pagehint_`
//! - 접미어: `_total` (counter), `_seconds` (histogram)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(pagehint_core::metrics::BUS_EVENTS_EMITTED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 심각도 레이블 키 (warning, error)
pub const LABEL_SEVERITY: &str = "severity";

/// 힌트 레이블 키
pub const LABEL_HINT: &str = "hint";

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

// ─── Event Bus 메트릭 ──────────────────────────────────────────────

/// Bus: 발행된 이벤트 수 (counter)
pub const BUS_EVENTS_EMITTED_TOTAL: &str = "pagehint_bus_events_emitted_total";

/// Bus: 격리된 핸들러 장애 수 (counter, label: hint)
pub const BUS_HANDLER_FAULTS_TOTAL: &str = "pagehint_bus_handler_faults_total";

// ─── Traversal 메트릭 ──────────────────────────────────────────────

/// Traversal: 순회한 요소 수 (counter)
pub const TRAVERSAL_ELEMENTS_TOTAL: &str = "pagehint_traversal_elements_total";

// ─── Scan 메트릭 ───────────────────────────────────────────────────

/// Scan: 보고된 Problem 수 (counter, label: severity)
pub const SCAN_PROBLEMS_REPORTED_TOTAL: &str = "pagehint_scan_problems_reported_total";

/// Scan: 완료된 스캔 수 (counter, label: result)
pub const SCAN_COMPLETED_TOTAL: &str = "pagehint_scan_completed_total";

/// Scan: 스캔 소요 시간 (histogram, 초)
pub const SCAN_DURATION_SECONDS: &str = "pagehint_scan_duration_seconds";

/// Scan: 바인딩된 힌트 수 (histogram)
pub const SCAN_HINTS_BOUND: &str = "pagehint_scan_hints_bound";

/// 모든 메트릭의 설명을 등록합니다.
///
/// recorder 설치 직후 한 번 호출합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_histogram};

    // Event Bus
    describe_counter!(
        BUS_EVENTS_EMITTED_TOTAL,
        "Total number of events dispatched through the event bus"
    );
    describe_counter!(
        BUS_HANDLER_FAULTS_TOTAL,
        "Handler errors and panics isolated by the event bus"
    );

    // Traversal
    describe_counter!(
        TRAVERSAL_ELEMENTS_TOTAL,
        "Total number of elements visited by document traversal"
    );

    // Scan
    describe_counter!(
        SCAN_PROBLEMS_REPORTED_TOTAL,
        "Problems reported by hints per severity"
    );
    describe_counter!(SCAN_COMPLETED_TOTAL, "Scans completed per result");
    describe_histogram!(SCAN_DURATION_SECONDS, "Scan wall-clock duration in seconds");
    describe_histogram!(SCAN_HINTS_BOUND, "Number of hints bound per scan");
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_METRIC_NAMES: &[&str] = &[
        BUS_EVENTS_EMITTED_TOTAL,
        BUS_HANDLER_FAULTS_TOTAL,
        TRAVERSAL_ELEMENTS_TOTAL,
        SCAN_PROBLEMS_REPORTED_TOTAL,
        SCAN_COMPLETED_TOTAL,
        SCAN_DURATION_SECONDS,
        SCAN_HINTS_BOUND,
    ];

    #[test]
    fn all_metrics_start_with_pagehint_prefix() {
        for name in ALL_METRIC_NAMES {
            assert!(
                name.starts_with("pagehint_"),
                "Metric '{}' does not start with 'pagehint_' prefix",
                name
            );
        }
    }

    #[test]
    fn metric_names_are_unique() {
        let mut names = ALL_METRIC_NAMES.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ALL_METRIC_NAMES.len());
    }

    #[test]
    fn counters_use_total_suffix() {
        for name in [
            BUS_EVENTS_EMITTED_TOTAL,
            BUS_HANDLER_FAULTS_TOTAL,
            TRAVERSAL_ELEMENTS_TOTAL,
            SCAN_PROBLEMS_REPORTED_TOTAL,
            SCAN_COMPLETED_TOTAL,
        ] {
            assert!(name.ends_with("_total"), "counter '{name}' lacks _total");
        }
    }

    #[test]
    fn describe_all_without_recorder_is_noop() {
        describe_all();
    }
}
