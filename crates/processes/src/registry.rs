//! 처리 단계 레지스트리 -- 종류 이름으로 처리 단계를 생성합니다.
//!
//! 설정 파일의 `[pipeline] processes` 목록에 적힌 이름은 처리 단계 종류이자
//! 그 단계가 읽을 설정 섹션 이름입니다. [`ProcessRegistry`]는 종류 이름을
//! 생성 함수에 연결합니다.
//!
//! # 사용 예시
//! ```ignore
//! let registry = ProcessRegistry::with_builtin();
//! let process = registry.build("veto_analysis", &doc)?;
//! ```

use std::collections::BTreeMap;

use rawsig_core::process::EventProcess;

use crate::analysis::SignalAnalysisProcess;
use crate::error::ProcessesError;
use crate::loader::ProcessConfigDocument;
use crate::noise::AddNoiseProcess;
use crate::remove_channels::RemoveChannelsProcess;
use crate::veto::VetoAnalysisProcess;

/// 처리 단계 생성 함수
pub type ProcessFactory =
    fn(&ProcessConfigDocument) -> Result<Box<dyn EventProcess>, ProcessesError>;

/// 처리 단계 종류 레지스트리
pub struct ProcessRegistry {
    factories: BTreeMap<&'static str, ProcessFactory>,
}

impl ProcessRegistry {
    /// 빈 레지스트리를 생성합니다.
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// 기본 제공 처리 단계가 등록된 레지스트리를 생성합니다.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(AddNoiseProcess::KIND, |doc| {
            Ok(Box::new(AddNoiseProcess::from_document(doc)?))
        });
        registry.register(VetoAnalysisProcess::KIND, |doc| {
            Ok(Box::new(VetoAnalysisProcess::from_document(doc)?))
        });
        registry.register(RemoveChannelsProcess::KIND, |doc| {
            Ok(Box::new(RemoveChannelsProcess::from_document(doc)?))
        });
        registry.register(SignalAnalysisProcess::KIND, |doc| {
            Ok(Box::new(SignalAnalysisProcess::from_document(doc)?))
        });
        registry
    }

    /// 처리 단계 종류를 등록합니다. 같은 종류가 있으면 교체합니다.
    pub fn register(&mut self, kind: &'static str, factory: ProcessFactory) {
        if self.factories.insert(kind, factory).is_some() {
            tracing::debug!(kind, "process factory replaced");
        }
    }

    /// 등록된 종류인지 확인합니다.
    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// 등록된 종류 이름 (정렬됨)
    pub fn kinds(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }

    /// 설정 문서로 처리 단계를 생성합니다.
    ///
    /// # Errors
    /// - 등록되지 않은 종류면 [`ProcessesError::UnknownProcess`]
    /// - 섹션 역직렬화나 검증 실패 시 해당 에러
    pub fn build(
        &self,
        kind: &str,
        doc: &ProcessConfigDocument,
    ) -> Result<Box<dyn EventProcess>, ProcessesError> {
        let factory = self
            .factories
            .get(kind)
            .ok_or_else(|| ProcessesError::UnknownProcess(kind.to_owned()))?;
        factory(doc)
    }
}

impl Default for ProcessRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}
