//! 비토 분석 처리 단계
//!
//! 비토 채널로 지정된 신호마다 최대 피크 진폭과 피크 시각(bin)을 기록한 뒤
//! 이벤트에서 제거합니다. 비토가 아닌 신호는 건드리지 않습니다.
//!
//! # 관측량
//! - 그룹 없음: `<name>_PeakTime`, `<name>_MaxPeakAmplitude` (신호 ID별 맵)
//! - 그룹 있음: 그룹마다 `<name>_PeakTime_<group>`, `<name>_MaxPeakAmplitude_<group>`
//!
//! 이벤트에 그룹 채널이 하나도 없어도 빈 맵을 기록하여 컬럼이 항상 존재하게 합니다.

use std::collections::BTreeMap;
use std::path::Path;

use rawsig_core::error::RawsigError;
use rawsig_core::event::SignalEvent;
use rawsig_core::observable::ObservableSet;
use rawsig_core::process::EventProcess;

use crate::config::VetoAnalysisConfig;
use crate::error::ProcessesError;
use crate::loader::ProcessConfigDocument;

/// 피크 시각 관측량 이름
pub const OBS_PEAK_TIME: &str = "PeakTime";
/// 최대 피크 진폭 관측량 이름
pub const OBS_MAX_PEAK_AMPLITUDE: &str = "MaxPeakAmplitude";

/// 비토 분석 처리 단계
pub struct VetoAnalysisProcess {
    config: VetoAnalysisConfig,
    /// 직접 지정 + 그룹의 비토 ID (정렬됨)
    veto_ids: Vec<i32>,
}

impl VetoAnalysisProcess {
    /// 설정 섹션 이름
    pub const KIND: &'static str = "veto_analysis";

    pub fn new(config: VetoAnalysisConfig) -> Result<Self, ProcessesError> {
        config.validate()?;
        let veto_ids = config.veto_ids();
        tracing::debug!(
            process = %config.name,
            veto_ids = ?veto_ids,
            groups = config.groups.len(),
            "veto analysis process created"
        );
        Ok(Self { config, veto_ids })
    }

    /// 설정 문서의 `[veto_analysis]` 섹션으로 생성합니다.
    pub fn from_document(doc: &ProcessConfigDocument) -> Result<Self, ProcessesError> {
        Self::new(doc.section(Self::KIND)?)
    }

    /// 설정 파일 경로로 생성합니다.
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self, ProcessesError> {
        Self::from_document(&ProcessConfigDocument::load(path)?)
    }

    pub fn config(&self) -> &VetoAnalysisConfig {
        &self.config
    }

    /// 제거 대상 비토 신호 ID
    pub fn veto_ids(&self) -> &[i32] {
        &self.veto_ids
    }

    /// 이 단계가 기록하는 관측량 이름 (접두어 포함)
    pub fn observable_names(&self) -> Vec<String> {
        let name = &self.config.name;
        if self.config.groups.is_empty() {
            return vec![
                format!("{name}_{OBS_PEAK_TIME}"),
                format!("{name}_{OBS_MAX_PEAK_AMPLITUDE}"),
            ];
        }
        self.config
            .groups
            .iter()
            .flat_map(|g| {
                [
                    format!("{name}_{OBS_PEAK_TIME}_{}", g.name),
                    format!("{name}_{OBS_MAX_PEAK_AMPLITUDE}_{}", g.name),
                ]
            })
            .collect()
    }

    fn record(
        &self,
        peak_time: &BTreeMap<i32, f64>,
        amplitude: &BTreeMap<i32, f64>,
        observables: &mut ObservableSet,
    ) {
        let name = self.config.name.as_str();
        if self.config.groups.is_empty() {
            observables.insert(name, OBS_PEAK_TIME, peak_time.clone());
            observables.insert(name, OBS_MAX_PEAK_AMPLITUDE, amplitude.clone());
            return;
        }

        for group in &self.config.groups {
            let pick = |values: &BTreeMap<i32, f64>| -> BTreeMap<i32, f64> {
                values
                    .iter()
                    .filter(|(id, _)| group.signal_ids.contains(*id))
                    .map(|(&id, &v)| (id, v))
                    .collect()
            };
            observables.insert(
                name,
                &format!("{OBS_PEAK_TIME}_{}", group.name),
                pick(peak_time),
            );
            observables.insert(
                name,
                &format!("{OBS_MAX_PEAK_AMPLITUDE}_{}", group.name),
                pick(amplitude),
            );
        }
    }
}

impl EventProcess for VetoAnalysisProcess {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn process_event(
        &mut self,
        mut event: SignalEvent,
        observables: &mut ObservableSet,
    ) -> Result<Option<SignalEvent>, RawsigError> {
        event.set_baseline_range(self.config.baseline_range);
        event.set_range(self.config.range);

        let mut peak_time = BTreeMap::new();
        let mut amplitude = BTreeMap::new();

        for &id in &self.veto_ids {
            let Some(signal) = event.remove_signal_with_id(id) else {
                continue;
            };
            if let (Some(bin), Some(value)) = (signal.max_peak_bin(), signal.max_peak_value()) {
                peak_time.insert(id, bin as f64);
                amplitude.insert(id, value);
            }
            tracing::trace!(
                process = %self.config.name,
                signal_id = id,
                "veto signal analysed and removed"
            );
        }

        self.record(&peak_time, &amplitude, observables);

        Ok(Some(event))
    }
}
