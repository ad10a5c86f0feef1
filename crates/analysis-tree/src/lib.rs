#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`tree`]: 이벤트별 관측량을 쌓는 분석 트리 ([`ObservableCatalog`](rawsig_core::ObservableCatalog), [`AnalysisSink`](rawsig_core::AnalysisSink) 구현)
//! - [`run_file`]: 런 결과 JSON 파일 저장/열기
//! - [`error`]: 도메인 에러 타입

pub mod error;
pub mod run_file;
pub mod tree;

// --- 주요 타입 re-export ---

pub use error::TreeError;
pub use run_file::{ProcessInfo, RunFile};
pub use tree::{AnalysisTree, TreeEntry};
