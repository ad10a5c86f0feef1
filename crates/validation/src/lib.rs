#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`noise`]: 잡음 주입 후 베이스라인 sigma 대역 검증
//! - [`veto`]: 비토 신호 제거/유지와 파생 관측량 컬럼 존재 검증
//! - [`error`]: 검증 실패 종류와 에러 타입

pub mod error;
pub mod noise;
pub mod veto;

// --- 주요 타입 re-export ---

pub use error::{FailureKind, ValidationError, ValidationFailure};
pub use noise::{NoiseReport, NoiseScenario};
pub use veto::{VetoReport, VetoScenario};
