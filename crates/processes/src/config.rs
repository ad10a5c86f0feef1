//! 처리 단계 설정 섹션
//!
//! 각 구조체는 설정 파일의 한 섹션에 대응합니다.
//! 모든 필드는 `#[serde(default)]`로 선언되어 일부만 적어도 나머지는 기본값이 적용됩니다.
//!
//! ```toml
//! [veto_analysis]
//! name = "veto"
//! baseline_range = [5, 55]
//! range = [10, 500]
//!
//! [[veto_analysis.groups]]
//! name = "top"
//! signal_ids = [4688, 4705]
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use rawsig_core::types::{BaselineMethod, BinRange};

use crate::error::ProcessesError;

fn config_error(field: String, reason: impl Into<String>) -> ProcessesError {
    ProcessesError::Config {
        field,
        reason: reason.into(),
    }
}

fn check_name(section: &str, name: &str) -> Result<(), ProcessesError> {
    if name.is_empty() {
        return Err(config_error(format!("{section}.name"), "must not be empty"));
    }
    if name.contains(char::is_whitespace) {
        return Err(config_error(
            format!("{section}.name"),
            format!("'{name}' must not contain whitespace"),
        ));
    }
    Ok(())
}

fn check_range(field: String, range: BinRange) -> Result<(), ProcessesError> {
    if range.is_inverted() {
        return Err(config_error(
            field,
            format!("start must not exceed end, got {range}"),
        ));
    }
    Ok(())
}

/// `[add_noise]` -- 백색 잡음 주입
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddNoiseConfig {
    /// 인스턴스 이름
    pub name: String,
    /// 가우시안 잡음 표준편차 (ADC)
    pub noise_level: f64,
    /// 난수 시드 (없으면 엔트로피에서 시드)
    pub seed: Option<u64>,
}

impl Default for AddNoiseConfig {
    fn default() -> Self {
        Self {
            name: "rawSignalAddNoise".to_owned(),
            noise_level: 10.0,
            seed: None,
        }
    }
}

impl AddNoiseConfig {
    pub fn validate(&self) -> Result<(), ProcessesError> {
        check_name("add_noise", &self.name)?;
        if !self.noise_level.is_finite() || self.noise_level < 0.0 {
            return Err(config_error(
                "add_noise.noise_level".to_owned(),
                format!("must be finite and >= 0, got {}", self.noise_level),
            ));
        }
        Ok(())
    }
}

/// 비토 채널 그룹 (검출기 영역)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VetoGroup {
    /// 그룹 이름 (관측량 접미어, 예: "top")
    pub name: String,
    /// 그룹에 속한 신호 ID
    pub signal_ids: Vec<i32>,
}

/// `[veto_analysis]` -- 비토 신호 분석 및 제거
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VetoAnalysisConfig {
    /// 인스턴스 이름 (관측량 접두어)
    pub name: String,
    /// 그룹 없이 지정하는 비토 신호 ID
    pub veto_signal_ids: Vec<i32>,
    /// 베이스라인 계산 구간
    pub baseline_range: BinRange,
    /// 피크 탐색 구간
    pub range: BinRange,
    /// 비토 그룹 (있으면 그룹별 관측량 기록)
    pub groups: Vec<VetoGroup>,
}

impl Default for VetoAnalysisConfig {
    fn default() -> Self {
        Self {
            name: "veto".to_owned(),
            veto_signal_ids: Vec::new(),
            baseline_range: BinRange::new(5, 55),
            range: BinRange::new(10, 500),
            groups: Vec::new(),
        }
    }
}

impl VetoAnalysisConfig {
    pub fn validate(&self) -> Result<(), ProcessesError> {
        check_name("veto_analysis", &self.name)?;
        check_range("veto_analysis.baseline_range".to_owned(), self.baseline_range)?;
        check_range("veto_analysis.range".to_owned(), self.range)?;

        let mut seen = BTreeSet::new();
        for group in &self.groups {
            check_name("veto_analysis.groups", &group.name)?;
            if !seen.insert(group.name.as_str()) {
                return Err(config_error(
                    "veto_analysis.groups".to_owned(),
                    format!("duplicate group name '{}'", group.name),
                ));
            }
        }

        if self.veto_ids().is_empty() {
            tracing::warn!(
                process = %self.name,
                "no veto signal ids configured, veto analysis will not remove anything"
            );
        }
        Ok(())
    }

    /// 비토 신호 ID 전체 (직접 지정 + 그룹, 정렬/중복 제거)
    pub fn veto_ids(&self) -> Vec<i32> {
        let mut ids: BTreeSet<i32> = self.veto_signal_ids.iter().copied().collect();
        for group in &self.groups {
            ids.extend(group.signal_ids.iter().copied());
        }
        ids.into_iter().collect()
    }
}

/// `[remove_channels]` -- ID 또는 ID 구간으로 채널 제거
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoveChannelsConfig {
    /// 인스턴스 이름
    pub name: String,
    /// 제거할 신호 ID
    pub signal_ids: Vec<i32>,
    /// 제거할 신호 ID 구간 (양 끝 포함)
    pub signal_ranges: Vec<[i32; 2]>,
}

impl Default for RemoveChannelsConfig {
    fn default() -> Self {
        Self {
            name: "removeChannels".to_owned(),
            signal_ids: Vec::new(),
            signal_ranges: Vec::new(),
        }
    }
}

impl RemoveChannelsConfig {
    pub fn validate(&self) -> Result<(), ProcessesError> {
        check_name("remove_channels", &self.name)?;
        for [start, end] in &self.signal_ranges {
            if start > end {
                return Err(config_error(
                    "remove_channels.signal_ranges".to_owned(),
                    format!("start must not exceed end, got [{start}, {end}]"),
                ));
            }
        }
        Ok(())
    }

    /// 해당 ID가 제거 대상인지 확인합니다.
    pub fn matches(&self, id: i32) -> bool {
        self.signal_ids.contains(&id)
            || self
                .signal_ranges
                .iter()
                .any(|[start, end]| id >= *start && id <= *end)
    }
}

/// `[signal_analysis]` -- 신호별 베이스라인/피크/적분 관측량
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalAnalysisConfig {
    /// 인스턴스 이름
    pub name: String,
    /// 베이스라인 계산 구간
    pub baseline_range: BinRange,
    /// 피크/적분 구간
    pub range: BinRange,
    /// 베이스라인 계산 방식
    pub baseline_method: BaselineMethod,
}

impl Default for SignalAnalysisConfig {
    fn default() -> Self {
        Self {
            name: "rawAna".to_owned(),
            baseline_range: BinRange::new(20, 150),
            range: BinRange::new(0, 511),
            baseline_method: BaselineMethod::Standard,
        }
    }
}

impl SignalAnalysisConfig {
    pub fn validate(&self) -> Result<(), ProcessesError> {
        check_name("signal_analysis", &self.name)?;
        check_range("signal_analysis.baseline_range".to_owned(), self.baseline_range)?;
        check_range("signal_analysis.range".to_owned(), self.range)?;
        Ok(())
    }
}

/// `[pipeline]` -- 전체 런에서 실행할 처리 단계 순서
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSection {
    /// 섹션 이름 목록 (실행 순서)
    pub processes: Vec<String>,
}
