//! 에러 타입 -- 도메인별 에러 정의

/// rawsig 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum RawsigError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 신호 연산 에러
    #[error("signal error: {0}")]
    Signal(#[from] SignalError),

    /// 이벤트 조작 에러
    #[error("event error: {0}")]
    Event(#[from] EventError),

    /// 처리 단계 에러
    #[error("process error: {0}")]
    Process(#[from] ProcessError),

    /// 분석 트리 저장소 에러
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 신호 연산 에러
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// 샘플이 없는 신호에 대한 연산
    #[error("signal {id} has no samples")]
    EmptySignal { id: i32 },

    /// 구간이 신호 길이를 벗어남
    #[error("range [{start}, {end}] out of bounds for signal {id} with {len} samples")]
    RangeOutOfBounds {
        id: i32,
        start: usize,
        end: usize,
        len: usize,
    },

    /// 시작 bin이 끝 bin보다 큼
    #[error("invalid range: start {start} > end {end}")]
    InvalidRange { start: usize, end: usize },

    /// 길이가 다른 신호끼리의 연산
    #[error("length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },
}

/// 이벤트 조작 에러
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// 같은 ID의 신호가 이미 존재
    #[error("signal id {id} already exists in event")]
    DuplicateSignalId { id: i32 },

    /// bin 인덱스가 신호 길이를 벗어남
    #[error("bin {bin} out of bounds for signal {id} with {len} samples")]
    BinOutOfBounds { id: i32, bin: usize, len: usize },
}

/// 처리 단계 에러
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// 처리 단계 초기화 실패
    #[error("process '{name}' init failed: {reason}")]
    InitFailed { name: String, reason: String },

    /// 이벤트 처리 실패
    #[error("process '{name}' failed: {reason}")]
    Failed { name: String, reason: String },

    /// 등록되지 않은 처리 단계
    #[error("unknown process kind: {0}")]
    UnknownKind(String),
}

/// 분석 트리 저장소 에러
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// 요청한 트리가 파일에 없음
    #[error("tree '{0}' not found")]
    TreeNotFound(String),

    /// 직렬화 실패
    #[error("serialize failed: {0}")]
    Serialize(String),

    /// 역직렬화 실패
    #[error("deserialize failed: {0}")]
    Deserialize(String),

    /// 파일 크기 초과
    #[error("file too large: {size} bytes (max: {max})")]
    TooLarge { size: u64, max: u64 },
}
