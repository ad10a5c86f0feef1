//! 분석 트리 -- 이벤트별 관측량을 행(entry)으로 쌓는 표 형태 저장소
//!
//! 컬럼은 처음 기록된 순서대로 유지됩니다. 어떤 이벤트에 특정 관측량이 없으면
//! 그 행의 해당 컬럼 값은 비어 있습니다 ([`AnalysisTree::value`]가 `None`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use rawsig_core::event::EventMetadata;
use rawsig_core::observable::{AnalysisSink, ObservableCatalog, ObservableSet, ObservableValue};

/// 분석 트리의 한 행
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEntry {
    /// 이벤트 번호
    pub event_id: u64,
    /// 런 번호
    pub run_number: u32,
    /// 컬럼 이름 → 값
    pub values: BTreeMap<String, ObservableValue>,
}

/// 관측량 분석 트리
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisTree {
    name: String,
    columns: Vec<String>,
    entries: Vec<TreeEntry>,
}

impl AnalysisTree {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            entries: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 관측량 컬럼을 등록합니다. 이미 있으면 아무것도 하지 않고 `false`를 반환합니다.
    pub fn register_observable(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.columns.contains(&name) {
            return false;
        }
        tracing::debug!(tree = %self.name, column = %name, "observable registered");
        self.columns.push(name);
        true
    }

    /// 관측량 집합을 새 행으로 추가합니다. 처음 보는 관측량은 컬럼으로 등록됩니다.
    pub fn fill_entry(&mut self, event_id: u64, run_number: u32, observables: &ObservableSet) {
        let mut values = BTreeMap::new();
        for (name, value) in observables.iter() {
            self.register_observable(name);
            values.insert(name.to_owned(), value.clone());
        }
        self.entries.push(TreeEntry {
            event_id,
            run_number,
            values,
        });
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn entry(&self, index: usize) -> Option<&TreeEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// `index`번째 행의 `column` 값
    pub fn value(&self, index: usize, column: &str) -> Option<&ObservableValue> {
        self.entries.get(index)?.values.get(column)
    }
}

impl ObservableCatalog for AnalysisTree {
    fn observable_exists(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    fn observable_names(&self) -> Vec<String> {
        self.columns.clone()
    }
}

impl AnalysisSink for AnalysisTree {
    fn fill(&mut self, metadata: &EventMetadata, observables: &ObservableSet) {
        self.fill_entry(metadata.event_id, metadata.run_number, observables);
    }
}
