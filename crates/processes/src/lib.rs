#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`noise`]: 백색 잡음 주입 (`add_noise`)
//! - [`veto`]: 비토 신호 분석 및 제거 (`veto_analysis`)
//! - [`remove_channels`]: ID/ID 구간 채널 제거 (`remove_channels`)
//! - [`analysis`]: 신호별 베이스라인/피크/적분 관측량 (`signal_analysis`)
//! - [`registry`]: 종류 이름 → 처리 단계 생성
//! - [`chain`]: 처리 단계 순차 실행과 관측량 수집
//! - [`source`]: 합성 이벤트 소스
//! - [`loader`]: TOML 설정 문서 로딩
//! - [`config`]: 처리 단계별 설정 섹션
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! SyntheticEventSource -> ProcessChain [add_noise -> veto_analysis -> ...] -> AnalysisSink
//!                               |
//!                     ProcessRegistry + ProcessConfigDocument
//! ```

pub mod analysis;
pub mod chain;
pub mod config;
pub mod error;
pub mod loader;
pub mod noise;
pub mod registry;
pub mod remove_channels;
pub mod source;
pub mod veto;

// --- 주요 타입 re-export ---

// 처리 단계
pub use analysis::SignalAnalysisProcess;
pub use noise::AddNoiseProcess;
pub use remove_channels::RemoveChannelsProcess;
pub use veto::VetoAnalysisProcess;

// 체인과 레지스트리
pub use chain::{ChainOutput, ChainStats, ProcessChain, ProcessChainBuilder};
pub use registry::{ProcessFactory, ProcessRegistry};

// 입력
pub use source::SyntheticEventSource;

// 설정
pub use config::{
    AddNoiseConfig, PipelineSection, RemoveChannelsConfig, SignalAnalysisConfig,
    VetoAnalysisConfig, VetoGroup,
};
pub use loader::ProcessConfigDocument;

// 에러
pub use error::ProcessesError;
