//! 검증 결과 에러 타입
//!
//! - [`ValidationFailure`]: 이름 붙은 검증 조건 위반. 종류와 상관없이 종료 코드는 202입니다.
//! - [`ValidationError`]: 검증 실패와 하위 라이브러리 에러(설정 오류, 파일 읽기 실패 등)를
//!   구분합니다. 하위 에러는 202가 아닌 코드로 보고됩니다.

use std::fmt;

use metrics::counter;
use serde::Serialize;

use rawsig_core::error::RawsigError;
use rawsig_core::metrics as m;

/// 검증 실패 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// 베이스라인 sigma가 허용 대역 밖
    SigmaOutOfRange,
    /// 비토 신호가 처리 후에도 남아 있음
    VetoSignalRetained,
    /// 비토가 아닌 신호가 제거됨
    NonVetoSignalRemoved,
    /// 트리에 필요한 관측량 컬럼이 없음
    MissingObservable,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SigmaOutOfRange => "SigmaOutOfRange",
            Self::VetoSignalRetained => "VetoSignalRetained",
            Self::NonVetoSignalRemoved => "NonVetoSignalRemoved",
            Self::MissingObservable => "MissingObservable",
        };
        f.write_str(name)
    }
}

/// 이름 붙은 검증 조건 위반
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationFailure {
    /// sigma가 (min, max) 열린 구간 밖
    #[error("baseline sigma {sigma:.3} is outside the open interval ({min}, {max})")]
    SigmaOutOfRange {
        /// 계산된 sigma
        sigma: f64,
        /// 하한 (미포함)
        min: f64,
        /// 상한 (미포함)
        max: f64,
    },

    /// 비토 신호가 제거되지 않음
    #[error("veto signal {id} is still present after veto analysis")]
    VetoSignalRetained {
        /// 신호 ID
        id: i32,
    },

    /// 비토가 아닌 신호가 제거됨
    #[error("non-veto signal {id} was removed by veto analysis")]
    NonVetoSignalRemoved {
        /// 신호 ID
        id: i32,
    },

    /// 관측량 컬럼 누락
    #[error("observable '{name}' does not exist in the analysis tree")]
    MissingObservable {
        /// 컬럼 이름
        name: String,
    },
}

impl ValidationFailure {
    /// 모든 검증 실패가 사용하는 프로세스 종료 코드
    pub const EXIT_CODE: i32 = 202;

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::SigmaOutOfRange { .. } => FailureKind::SigmaOutOfRange,
            Self::VetoSignalRetained { .. } => FailureKind::VetoSignalRetained,
            Self::NonVetoSignalRemoved { .. } => FailureKind::NonVetoSignalRemoved,
            Self::MissingObservable { .. } => FailureKind::MissingObservable,
        }
    }

    pub fn exit_code(&self) -> i32 {
        Self::EXIT_CODE
    }
}

/// 검증 시나리오 실행 에러
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// 검증 조건 위반
    #[error("validation failed: {0}")]
    Failed(#[from] ValidationFailure),

    /// 처리 단계, 설정, 저장소 등 하위 라이브러리 에러
    #[error("stage error: {0}")]
    Stage(#[from] RawsigError),

    /// 처리 단계가 이벤트를 버렸거나 빈 이벤트를 돌려줌
    #[error("stage '{stage}' returned no signal to validate")]
    EmptyOutput {
        /// 처리 단계 이름
        stage: String,
    },
}

impl ValidationError {
    /// 검증 조건 위반이면 해당 실패를 돌려줍니다.
    pub fn as_failure(&self) -> Option<&ValidationFailure> {
        match self {
            Self::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// 시나리오 실행 결과의 메트릭 라벨: `pass`, `fail`, `error`
pub(crate) fn outcome_label<T>(result: &Result<T, ValidationError>) -> &'static str {
    match result {
        Ok(_) => "pass",
        Err(ValidationError::Failed(_)) => "fail",
        Err(_) => "error",
    }
}

/// 시나리오 실행 결과를 `rawsig_validation_runs_total`에 기록합니다.
pub(crate) fn record_result<T>(scenario: &'static str, result: &Result<T, ValidationError>) {
    counter!(
        m::VALIDATION_RUNS_TOTAL,
        m::LABEL_SCENARIO => scenario,
        m::LABEL_RESULT => outcome_label(result)
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_label_separates_failures_from_errors() {
        let ok: Result<(), ValidationError> = Ok(());
        assert_eq!(outcome_label(&ok), "pass");

        let failed: Result<(), ValidationError> =
            Err(ValidationFailure::VetoSignalRetained { id: 4688 }.into());
        assert_eq!(outcome_label(&failed), "fail");

        let empty: Result<(), ValidationError> = Err(ValidationError::EmptyOutput {
            stage: "addNoise".to_owned(),
        });
        assert_eq!(outcome_label(&empty), "error");

        record_result("noise", &failed);
    }

    #[test]
    fn every_kind_uses_exit_code_202() {
        let failures = [
            ValidationFailure::SigmaOutOfRange {
                sigma: 30.0,
                min: 15.0,
                max: 25.0,
            },
            ValidationFailure::VetoSignalRetained { id: 4688 },
            ValidationFailure::NonVetoSignalRemoved { id: 4 },
            ValidationFailure::MissingObservable {
                name: "veto_PeakTime_top".to_owned(),
            },
        ];
        for failure in &failures {
            assert_eq!(failure.exit_code(), 202);
        }
        let kinds: Vec<_> = failures.iter().map(ValidationFailure::kind).collect();
        assert_eq!(
            kinds,
            vec![
                FailureKind::SigmaOutOfRange,
                FailureKind::VetoSignalRetained,
                FailureKind::NonVetoSignalRemoved,
                FailureKind::MissingObservable,
            ]
        );
    }

    #[test]
    fn display_names_the_assertion() {
        let failure = ValidationFailure::SigmaOutOfRange {
            sigma: 30.0,
            min: 15.0,
            max: 25.0,
        };
        assert_eq!(
            failure.to_string(),
            "baseline sigma 30.000 is outside the open interval (15, 25)"
        );
        assert_eq!(failure.kind().to_string(), "SigmaOutOfRange");
    }

    #[test]
    fn failure_serializes_with_kind_tag() {
        let failure = ValidationFailure::VetoSignalRetained { id: 4705 };
        let json = serde_json::to_string(&failure).unwrap();
        assert_eq!(json, r#"{"kind":"veto_signal_retained","id":4705}"#);
    }

    #[test]
    fn stage_errors_are_not_failures() {
        let err = ValidationError::EmptyOutput {
            stage: "addNoise".to_owned(),
        };
        assert!(err.as_failure().is_none());
        let err: ValidationError = ValidationFailure::NonVetoSignalRemoved { id: 4 }.into();
        assert_eq!(
            err.as_failure().map(ValidationFailure::kind),
            Some(FailureKind::NonVetoSignalRemoved)
        );
    }
}
