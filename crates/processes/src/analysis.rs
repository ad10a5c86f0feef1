//! 신호 분석 처리 단계
//!
//! 각 신호의 베이스라인, 최대 피크, 적분을 계산하여 이벤트 단위 관측량으로 기록합니다.
//! 이벤트는 (베이스라인과 구간이 갱신된 채로) 그대로 다음 단계로 넘어갑니다.

use std::collections::BTreeMap;
use std::path::Path;

use rawsig_core::error::RawsigError;
use rawsig_core::event::SignalEvent;
use rawsig_core::observable::ObservableSet;
use rawsig_core::process::EventProcess;

use crate::config::SignalAnalysisConfig;
use crate::error::ProcessesError;
use crate::loader::ProcessConfigDocument;

/// 신호 분석 처리 단계
pub struct SignalAnalysisProcess {
    config: SignalAnalysisConfig,
}

impl SignalAnalysisProcess {
    /// 설정 섹션 이름
    pub const KIND: &'static str = "signal_analysis";

    pub fn new(config: SignalAnalysisConfig) -> Result<Self, ProcessesError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn from_document(doc: &ProcessConfigDocument) -> Result<Self, ProcessesError> {
        Self::new(doc.section(Self::KIND)?)
    }

    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self, ProcessesError> {
        Self::from_document(&ProcessConfigDocument::load(path)?)
    }

    pub fn config(&self) -> &SignalAnalysisConfig {
        &self.config
    }
}

impl EventProcess for SignalAnalysisProcess {
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
        event.set_range(self.config.range);

        let mut amplitude = BTreeMap::new();
        let mut sigma = BTreeMap::new();
        let mut baseline_sum = 0.0;
        let mut sigma_sum = 0.0;
        let mut max_amplitude: Option<f64> = None;
        let mut total_integral = 0.0;

        for index in 0..event.len() {
            let Some(signal) = event.signal_mut(index) else {
                break;
            };
            if let Err(e) =
                signal.calculate_baseline(self.config.baseline_range, self.config.baseline_method)
            {
                tracing::warn!(
                    process = %self.config.name,
                    signal_id = signal.id(),
                    error = %e,
                    "baseline calculation failed, using zero baseline"
                );
                signal.reset_baseline();
            }

            baseline_sum += signal.baseline();
            sigma_sum += signal.baseline_sigma();
            sigma.insert(signal.id(), signal.baseline_sigma());
            total_integral += signal.integral();

            if let Some(peak) = signal.max_peak_value() {
                amplitude.insert(signal.id(), peak);
                max_amplitude = Some(max_amplitude.map_or(peak, |m| m.max(peak)));
            }
        }

        let n = event.len();
        let mean = |sum: f64| if n == 0 { 0.0 } else { sum / n as f64 };
        let name = self.config.name.as_str();

        observables.insert(name, "NumberOfSignals", n as f64);
        observables.insert(name, "BaseLineMean", mean(baseline_sum));
        observables.insert(name, "BaseLineSigmaMean", mean(sigma_sum));
        observables.insert(name, "MaxPeakAmplitudeMax", max_amplitude.unwrap_or(0.0));
        observables.insert(name, "TotalIntegral", total_integral);
        observables.insert(name, "MaxPeakAmplitude", amplitude);
        observables.insert(name, "BaseLineSigma", sigma);

        Ok(Some(event))
    }
}
