//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 크레이트는 이 상수를 사용하여 `metrics::counter!()`, `metrics::histogram!()`
//! 매크로를 호출합니다. 레코더가 설치되지 않으면 호출은 아무 일도 하지 않습니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `rawsig_`
//! - 영역: `process_`, `run_`, `validation_`
//! - 접미어: `_total` (counter), `_seconds` (histogram), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(rawsig_core::metrics::PROCESS_EVENTS_TOTAL, "process" => "veto").increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 처리 단계 이름 레이블 키
pub const LABEL_PROCESS: &str = "process";

/// 검증 시나리오 레이블 키 (noise, veto)
pub const LABEL_SCENARIO: &str = "scenario";

/// 결과 레이블 키 (pass, fail)
pub const LABEL_RESULT: &str = "result";

// ─── 처리 단계 메트릭 ────────────────────────────────────────────

/// 처리 단계에 들어간 이벤트 수 (counter, label: process)
pub const PROCESS_EVENTS_TOTAL: &str = "rawsig_process_events_total";

/// 처리 단계가 버린 이벤트 수 (counter, label: process)
pub const PROCESS_EVENTS_DROPPED_TOTAL: &str = "rawsig_process_events_dropped_total";

/// 처리 단계가 제거한 신호 수 (counter, label: process)
pub const PROCESS_SIGNALS_REMOVED_TOTAL: &str = "rawsig_process_signals_removed_total";

/// 처리 단계가 에러를 낸 이벤트 수 (counter, label: process)
pub const PROCESS_ERRORS_TOTAL: &str = "rawsig_process_errors_total";

/// 처리 단계별 이벤트 처리 시간 (histogram, 초, label: process)
pub const PROCESS_DURATION_SECONDS: &str = "rawsig_process_duration_seconds";

// ─── 런 메트릭 ────────────────────────────────────────────

/// 분석 트리에 기록된 엔트리 수 (counter)
pub const RUN_ENTRIES_FILLED_TOTAL: &str = "rawsig_run_entries_filled_total";

// ─── 검증 메트릭 ────────────────────────────────────────────

/// 실행된 검증 시나리오 수 (counter, label: scenario, result)
pub const VALIDATION_RUNS_TOTAL: &str = "rawsig_validation_runs_total";

/// 모든 메트릭의 설명을 등록합니다.
///
/// 레코더를 설치한 직후 한 번 호출합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_histogram};

    describe_counter!(
        PROCESS_EVENTS_TOTAL,
        "Total number of events handed to a processing stage"
    );
    describe_counter!(
        PROCESS_EVENTS_DROPPED_TOTAL,
        "Total number of events dropped by a processing stage"
    );
    describe_counter!(
        PROCESS_SIGNALS_REMOVED_TOTAL,
        "Total number of signals removed by a processing stage"
    );
    describe_counter!(
        PROCESS_ERRORS_TOTAL,
        "Total number of events on which a processing stage returned an error"
    );
    describe_histogram!(
        PROCESS_DURATION_SECONDS,
        "Time spent processing a single event in one stage in seconds"
    );
    describe_counter!(
        RUN_ENTRIES_FILLED_TOTAL,
        "Total number of analysis tree entries filled during runs"
    );
    describe_counter!(
        VALIDATION_RUNS_TOTAL,
        "Total number of validation scenario runs by outcome"
    );
}
