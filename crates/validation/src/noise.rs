//! 잡음 주입 검증 시나리오
//!
//! 0으로 채운 신호 하나를 잡음 처리 단계에 통과시킨 뒤, 지정 구간(양 끝 포함)의
//! 베이스라인 표준편차가 `(sigma_min, sigma_max)` 열린 구간 안에 있는지 확인합니다.

use serde::Serialize;

use rawsig_core::config::NoiseValidationConfig;
use rawsig_core::error::RawsigError;
use rawsig_core::event::SignalEvent;
use rawsig_core::observable::ObservableSet;
use rawsig_core::process::EventProcess;
use rawsig_core::signal::{DEFAULT_SIGNAL_ID, RawSignal};
use rawsig_core::types::{BaselineMethod, BinRange};

use crate::error::{ValidationError, ValidationFailure, record_result};

/// 시나리오 레이블 값
pub const SCENARIO: &str = "noise";

/// 잡음 주입 검증 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoiseReport {
    /// 검증한 처리 단계 이름
    pub stage: String,
    /// 베이스라인 구간
    pub baseline_range: BinRange,
    /// 베이스라인 평균
    pub mean: f64,
    /// 베이스라인 표준편차
    pub sigma: f64,
    /// 허용 하한 (미포함)
    pub sigma_min: f64,
    /// 허용 상한 (미포함)
    pub sigma_max: f64,
}

/// 잡음 주입 검증 시나리오
#[derive(Debug, Clone)]
pub struct NoiseScenario {
    samples: usize,
    baseline_range: BinRange,
    sigma_min: f64,
    sigma_max: f64,
}

impl NoiseScenario {
    pub fn from_config(config: &NoiseValidationConfig) -> Self {
        Self {
            samples: config.samples,
            baseline_range: config.baseline_range,
            sigma_min: config.sigma_min,
            sigma_max: config.sigma_max,
        }
    }

    /// 입력 이벤트: 기본 ID, 0으로 채운 신호 하나
    pub fn fixture(&self) -> SignalEvent {
        let mut event = SignalEvent::new();
        // 빈 이벤트에 첫 신호를 넣는 것이므로 ID 중복은 일어나지 않는다
        if let Err(e) = event.add_signal(RawSignal::zeros(DEFAULT_SIGNAL_ID, self.samples)) {
            tracing::warn!(error = %e, "failed to build noise fixture");
        }
        event
    }

    /// sigma가 열린 구간 안에 있는지 확인합니다.
    pub fn check_sigma(&self, sigma: f64) -> Result<(), ValidationFailure> {
        if sigma > self.sigma_min && sigma < self.sigma_max {
            Ok(())
        } else {
            Err(ValidationFailure::SigmaOutOfRange {
                sigma,
                min: self.sigma_min,
                max: self.sigma_max,
            })
        }
    }

    /// 처리 단계를 실행하고 검증합니다.
    ///
    /// # Errors
    /// - sigma가 대역 밖이면 [`ValidationError::Failed`]
    /// - 처리 단계가 이벤트를 버리거나 신호가 없으면 [`ValidationError::EmptyOutput`]
    /// - 처리 단계 에러나 베이스라인 계산 에러는 [`ValidationError::Stage`]
    pub fn run(&self, stage: &mut dyn EventProcess) -> Result<NoiseReport, ValidationError> {
        let result = self.evaluate(stage);
        record_result(SCENARIO, &result);
        result
    }

    fn evaluate(&self, stage: &mut dyn EventProcess) -> Result<NoiseReport, ValidationError> {
        let stage_name = stage.name().to_owned();
        let mut observables = ObservableSet::new();

        let output = stage
            .process_event(self.fixture(), &mut observables)?
            .ok_or_else(|| ValidationError::EmptyOutput {
                stage: stage_name.clone(),
            })?;
        let mut signal = output
            .signal(0)
            .cloned()
            .ok_or_else(|| ValidationError::EmptyOutput {
                stage: stage_name.clone(),
            })?;

        let baseline = signal
            .calculate_baseline(self.baseline_range, BaselineMethod::Standard)
            .map_err(RawsigError::from)?;

        tracing::info!(
            stage = %stage_name,
            range = %self.baseline_range,
            mean = baseline.mean,
            sigma = baseline.sigma,
            "noise baseline computed"
        );

        self.check_sigma(baseline.sigma)?;

        Ok(NoiseReport {
            stage: stage_name,
            baseline_range: self.baseline_range,
            mean: baseline.mean,
            sigma: baseline.sigma,
            sigma_min: self.sigma_min,
            sigma_max: self.sigma_max,
        })
    }
}

impl Default for NoiseScenario {
    fn default() -> Self {
        Self::from_config(&NoiseValidationConfig::default())
    }
}
