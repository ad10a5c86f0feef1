//! 관측량 -- 처리 단계가 이벤트마다 기록하는 파생 값
//!
//! 관측량 이름은 `<처리 단계 이름>_<관측량>` 형식입니다 (예: `veto_PeakTime_top`).
//! 값은 스칼라이거나 신호 ID별 맵입니다.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::event::EventMetadata;

/// 관측량 값
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservableValue {
    /// 단일 값
    Scalar(f64),
    /// 신호 ID별 값
    Map(BTreeMap<i32, f64>),
}

impl ObservableValue {
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(v) => Some(*v),
            Self::Map(_) => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<i32, f64>> {
        match self {
            Self::Scalar(_) => None,
            Self::Map(m) => Some(m),
        }
    }
}

impl From<f64> for ObservableValue {
    fn from(v: f64) -> Self {
        Self::Scalar(v)
    }
}

impl From<BTreeMap<i32, f64>> for ObservableValue {
    fn from(m: BTreeMap<i32, f64>) -> Self {
        Self::Map(m)
    }
}

impl fmt::Display for ObservableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(v) => write!(f, "{v}"),
            Self::Map(m) => {
                write!(f, "{{")?;
                for (i, (id, v)) in m.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{id}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// 관측량 이름을 만듭니다.
pub fn observable_name(process: &str, observable: &str) -> String {
    format!("{process}_{observable}")
}

/// 한 이벤트에서 기록된 관측량 모음 (이름 순 정렬)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObservableSet {
    values: BTreeMap<String, ObservableValue>,
}

impl ObservableSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// `<process>_<observable>` 이름으로 값을 기록합니다. 같은 이름이면 덮어씁니다.
    pub fn insert(&mut self, process: &str, observable: &str, value: impl Into<ObservableValue>) {
        self.values
            .insert(observable_name(process, observable), value.into());
    }

    /// 전체 이름으로 값을 조회합니다.
    pub fn get(&self, name: &str) -> Option<&ObservableValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ObservableValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 다른 모음의 값을 합칩니다. 이름이 겹치면 `other`가 우선합니다.
    pub fn merge(&mut self, other: ObservableSet) {
        self.values.extend(other.values);
    }
}

/// 관측량 컬럼 이름을 조회할 수 있는 저장소
///
/// 검증 시나리오는 구체 저장소 대신 이 trait을 주입받습니다.
pub trait ObservableCatalog {
    /// 해당 이름의 관측량 컬럼이 존재하는지 확인
    fn observable_exists(&self, name: &str) -> bool;

    /// 등록된 관측량 이름 목록
    fn observable_names(&self) -> Vec<String>;
}

/// 이벤트별 관측량을 받아 저장하는 싱크
pub trait AnalysisSink {
    /// 이벤트 하나의 관측량을 기록
    fn fill(&mut self, metadata: &EventMetadata, observables: &ObservableSet);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_builds_prefixed_name() {
        let mut set = ObservableSet::new();
        set.insert("veto", "PeakTime_top", BTreeMap::from([(4688, 12.0)]));
        assert!(set.contains("veto_PeakTime_top"));
        let value = set.get("veto_PeakTime_top").unwrap();
        assert_eq!(value.as_map().and_then(|m| m.get(&4688)), Some(&12.0));
    }

    #[test]
    fn merge_overrides_existing() {
        let mut a = ObservableSet::new();
        a.insert("rawAna", "NumberOfSignals", 4.0);
        let mut b = ObservableSet::new();
        b.insert("rawAna", "NumberOfSignals", 1.0);
        b.insert("veto", "MaxPeakAmplitude", BTreeMap::new());
        a.merge(b);
        assert_eq!(a.len(), 2);
        assert_eq!(
            a.get("rawAna_NumberOfSignals").and_then(ObservableValue::as_scalar),
            Some(1.0)
        );
    }

    #[test]
    fn tagged_json_roundtrip() {
        let mut set = ObservableSet::new();
        set.insert("rawAna", "BaseLineMean", 2.5);
        set.insert("veto", "PeakTime", BTreeMap::from([(4676, 40.0)]));
        let json = serde_json::to_string(&set).unwrap();
        assert!(json.contains(r#""rawAna_BaseLineMean":{"scalar":2.5}"#));
        let parsed: ObservableSet = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, set);
    }

    #[test]
    fn display_map_value() {
        let value = ObservableValue::Map(BTreeMap::from([(1, 2.0), (3, 4.5)]));
        assert_eq!(value.to_string(), "{1: 2, 3: 4.5}");
    }
}
