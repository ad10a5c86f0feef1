//! 분석 트리 저장소 에러 타입
//!
//! `From<TreeError> for RawsigError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 전파할 수 있습니다.

use rawsig_core::error::{RawsigError, StorageError};

/// 런 파일 / 분석 트리 에러
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// 런 파일이 없음
    #[error("run file not found: {path}")]
    FileNotFound {
        /// 파일 경로
        path: String,
    },

    /// 런 파일 읽기/쓰기 실패
    #[error("run file io error: {path}: {reason}")]
    FileAccess {
        /// 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 런 파일 크기 초과
    #[error("run file too large: {size} bytes (max: {max})")]
    TooLarge {
        /// 파일 크기
        size: u64,
        /// 최대 허용 크기
        max: u64,
    },

    /// JSON 파싱 실패
    #[error("run file parse error: {0}")]
    Parse(String),

    /// JSON 직렬화 실패
    #[error("run file serialize error: {0}")]
    Serialize(String),

    /// 요청한 트리가 없음
    #[error("tree '{0}' not found in run file")]
    TreeNotFound(String),
}

impl From<TreeError> for RawsigError {
    fn from(err: TreeError) -> Self {
        match err {
            TreeError::FileNotFound { path } => RawsigError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("run file not found: {path}"),
            )),
            TreeError::FileAccess { path, reason } => {
                RawsigError::Io(std::io::Error::other(format!("{path}: {reason}")))
            }
            TreeError::TooLarge { size, max } => StorageError::TooLarge { size, max }.into(),
            TreeError::Parse(reason) => StorageError::Deserialize(reason).into(),
            TreeError::Serialize(reason) => StorageError::Serialize(reason).into(),
            TreeError::TreeNotFound(name) => StorageError::TreeNotFound(name).into(),
        }
    }
}
