#![doc = include_str!("../README.md")]

pub mod config;
pub mod error;
pub mod event;
pub mod metrics;
pub mod observable;
pub mod process;
pub mod signal;
pub mod types;

// --- 주요 타입 re-export ---
// 각 모듈의 핵심 타입을 크레이트 루트에서 바로 사용할 수 있도록 합니다.

// 에러
pub use error::{ConfigError, EventError, ProcessError, RawsigError, SignalError, StorageError};

// 설정
pub use config::RawsigConfig;

// 신호와 이벤트
pub use event::{EventMetadata, SignalEvent};
pub use signal::{DEFAULT_SIGNAL_ID, DEFAULT_SIGNAL_POINTS, RawSignal};

// 관측량
pub use observable::{AnalysisSink, ObservableCatalog, ObservableSet, ObservableValue};

// 처리 단계 trait
pub use process::EventProcess;

// 도메인 타입
pub use types::{Baseline, BaselineMethod, BinRange};
