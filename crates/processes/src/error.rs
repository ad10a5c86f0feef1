//! 처리 단계 크레이트 에러 타입
//!
//! [`ProcessesError`]는 처리 단계 설정 로딩, 생성, 체인 구성 중 발생하는 에러를 표현합니다.
//! `From<ProcessesError> for RawsigError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.
//! 이벤트 처리 중의 에러는 trait 시그니처대로 [`RawsigError`]로 바로 반환합니다.

use rawsig_core::error::{ConfigError, ProcessError, RawsigError};

/// 처리 단계 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum ProcessesError {
    /// 설정 파일이 없음
    #[error("config file not found: {path}")]
    ConfigNotFound {
        /// 설정 파일 경로
        path: String,
    },

    /// 설정 파일 로딩 실패
    #[error("config load error: {path}: {reason}")]
    ConfigLoad {
        /// 설정 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 설정 섹션 역직렬화 실패
    #[error("section [{section}] parse error: {reason}")]
    SectionParse {
        /// 섹션 이름
        section: String,
        /// 실패 사유
        reason: String,
    },

    /// 설정 값 검증 실패
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명 (섹션.필드)
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 등록되지 않은 처리 단계 종류
    #[error("unknown process kind: {0}")]
    UnknownProcess(String),

    /// 처리 단계가 하나도 없는 체인
    #[error("process chain is empty")]
    EmptyChain,

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ProcessesError> for RawsigError {
    fn from(err: ProcessesError) -> Self {
        match err {
            ProcessesError::ConfigNotFound { path } => {
                RawsigError::Config(ConfigError::FileNotFound { path })
            }
            ProcessesError::ConfigLoad { path, reason } => {
                RawsigError::Config(ConfigError::ParseFailed {
                    reason: format!("{path}: {reason}"),
                })
            }
            ProcessesError::SectionParse { section, reason } => {
                RawsigError::Config(ConfigError::ParseFailed {
                    reason: format!("[{section}]: {reason}"),
                })
            }
            ProcessesError::Config { field, reason } => {
                RawsigError::Config(ConfigError::InvalidValue { field, reason })
            }
            ProcessesError::UnknownProcess(kind) => {
                RawsigError::Process(ProcessError::UnknownKind(kind))
            }
            ProcessesError::EmptyChain => RawsigError::Process(ProcessError::InitFailed {
                name: "chain".to_owned(),
                reason: "no processes configured".to_owned(),
            }),
            ProcessesError::Io(e) => RawsigError::Io(e),
        }
    }
}
