//! 비토 분석 검증 시나리오
//!
//! 두 가지를 독립적으로 확인합니다.
//!
//! 1. 처리 단계 검사: 비토 ID 신호는 모두 제거되고 나머지 ID 신호는 남아야 합니다.
//! 2. 카탈로그 검사: 전체 런 결과 트리에 필요한 관측량 컬럼이 있어야 합니다.
//!
//! 검사는 위 순서대로 진행하며 첫 번째 실패에서 멈춥니다.

use serde::Serialize;

use rawsig_core::config::VetoValidationConfig;
use rawsig_core::event::SignalEvent;
use rawsig_core::observable::{ObservableCatalog, ObservableSet};
use rawsig_core::process::EventProcess;
use rawsig_core::signal::RawSignal;

use crate::error::{ValidationError, ValidationFailure, record_result};

/// 시나리오 레이블 값
pub const SCENARIO: &str = "veto";

/// 비토 분석 검증 결과
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VetoReport {
    /// 검증한 처리 단계 이름
    pub stage: String,
    /// 제거가 확인된 비토 ID
    pub removed_ids: Vec<i32>,
    /// 유지가 확인된 ID
    pub kept_ids: Vec<i32>,
    /// 존재가 확인된 관측량 컬럼
    pub observables: Vec<String>,
}

/// 비토 분석 검증 시나리오
#[derive(Debug, Clone)]
pub struct VetoScenario {
    samples: usize,
    veto_ids: Vec<i32>,
    kept_ids: Vec<i32>,
    required_observables: Vec<String>,
}

impl VetoScenario {
    pub fn from_config(config: &VetoValidationConfig) -> Self {
        Self {
            samples: config.samples,
            veto_ids: config.veto_ids.clone(),
            kept_ids: config.kept_ids.clone(),
            required_observables: config.required_observables.clone(),
        }
    }

    /// 입력 이벤트: 비토 ID와 유지 ID마다 0으로 채운 신호
    pub fn fixture(&self) -> SignalEvent {
        let mut event = SignalEvent::new();
        for &id in self.veto_ids.iter().chain(&self.kept_ids) {
            if let Err(e) = event.add_signal(RawSignal::zeros(id, self.samples)) {
                tracing::warn!(signal_id = id, error = %e, "skipping fixture signal");
            }
        }
        event
    }

    /// 처리 단계를 실행하고 신호 제거/유지를 검사합니다.
    pub fn check_stage(&self, stage: &mut dyn EventProcess) -> Result<VetoReport, ValidationError> {
        let stage_name = stage.name().to_owned();
        let mut observables = ObservableSet::new();

        let output = stage
            .process_event(self.fixture(), &mut observables)?
            .ok_or_else(|| ValidationError::EmptyOutput {
                stage: stage_name.clone(),
            })?;

        for &id in &self.veto_ids {
            if let Some(index) = output.signal_index(id) {
                tracing::debug!(signal_id = id, index, "veto signal retained");
                return Err(ValidationFailure::VetoSignalRetained { id }.into());
            }
        }
        for &id in &self.kept_ids {
            if output.signal_index(id).is_none() {
                return Err(ValidationFailure::NonVetoSignalRemoved { id }.into());
            }
        }

        tracing::info!(
            stage = %stage_name,
            removed = ?self.veto_ids,
            kept = ?self.kept_ids,
            "veto stage removed every veto signal"
        );

        Ok(VetoReport {
            stage: stage_name,
            removed_ids: self.veto_ids.clone(),
            kept_ids: self.kept_ids.clone(),
            observables: Vec::new(),
        })
    }

    /// 카탈로그에 필요한 관측량 컬럼이 모두 있는지 검사합니다.
    pub fn check_catalog<C>(&self, catalog: &C) -> Result<Vec<String>, ValidationFailure>
    where
        C: ObservableCatalog + ?Sized,
    {
        for name in &self.required_observables {
            if !catalog.observable_exists(name) {
                tracing::debug!(
                    observable = %name,
                    available = ?catalog.observable_names(),
                    "required observable missing"
                );
                return Err(ValidationFailure::MissingObservable { name: name.clone() });
            }
        }
        Ok(self.required_observables.clone())
    }

    /// 처리 단계 검사와 카탈로그 검사를 순서대로 실행합니다.
    pub fn run(
        &self,
        stage: &mut dyn EventProcess,
        catalog: &dyn ObservableCatalog,
    ) -> Result<VetoReport, ValidationError> {
        self.run_with(stage, || Ok(catalog))
    }

    /// 처리 단계 검사가 통과한 뒤에만 `catalog`로 카탈로그를 가져옵니다.
    ///
    /// 런 파일 열기처럼 실패할 수 있는 준비 작업을 검사 순서에 맞게 미룰 때 씁니다.
    pub fn run_with<'c, C, F>(
        &self,
        stage: &mut dyn EventProcess,
        catalog: F,
    ) -> Result<VetoReport, ValidationError>
    where
        C: ObservableCatalog + ?Sized + 'c,
        F: FnOnce() -> Result<&'c C, ValidationError>,
    {
        let result = self.check_stage(stage).and_then(|mut report| {
            let catalog = catalog()?;
            report.observables = self.check_catalog(catalog)?;
            Ok(report)
        });
        record_result(SCENARIO, &result);
        result
    }
}

impl Default for VetoScenario {
    fn default() -> Self {
        Self::from_config(&VetoValidationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use rawsig_core::error::RawsigError;

    /// 지정한 ID만 제거하는 단계
    struct RemoveIds(Vec<i32>);

    impl EventProcess for RemoveIds {
        fn name(&self) -> &str {
            "removeIds"
        }

        fn kind(&self) -> &'static str {
            "stub"
        }

        fn process_event(
            &mut self,
            mut event: SignalEvent,
            _observables: &mut ObservableSet,
        ) -> Result<Option<SignalEvent>, RawsigError> {
            event.remove_signals_where(|s| self.0.contains(&s.id()));
            Ok(Some(event))
        }
    }

    struct Columns(Vec<&'static str>);

    impl ObservableCatalog for Columns {
        fn observable_exists(&self, name: &str) -> bool {
            self.0.iter().any(|c| *c == name)
        }

        fn observable_names(&self) -> Vec<String> {
            self.0.iter().map(|s| (*s).to_owned()).collect()
        }
    }

    fn full_catalog() -> Columns {
        Columns(vec!["veto_PeakTime_top", "veto_MaxPeakAmplitude_back"])
    }

    #[test]
    fn fixture_has_veto_and_kept_ids() {
        let event = VetoScenario::default().fixture();
        assert_eq!(event.signal_ids(), vec![4688, 4705, 4676, 4]);
        assert!(event.signals().iter().all(|s| s.len() == 512));
    }

    #[test]
    fn correct_stage_and_catalog_pass() {
        let report = VetoScenario::default()
            .run(&mut RemoveIds(vec![4688, 4705, 4676]), &full_catalog())
            .unwrap();
        assert_eq!(report.removed_ids, vec![4688, 4705, 4676]);
        assert_eq!(report.kept_ids, vec![4]);
        assert_eq!(report.observables.len(), 2);
    }

    #[test]
    fn retained_veto_signal_fails() {
        let err = VetoScenario::default()
            .run(&mut RemoveIds(vec![4688, 4676]), &full_catalog())
            .unwrap_err();
        assert_eq!(
            err.as_failure(),
            Some(&ValidationFailure::VetoSignalRetained { id: 4705 })
        );
    }

    #[test]
    fn removed_non_veto_signal_fails() {
        let err = VetoScenario::default()
            .run(&mut RemoveIds(vec![4688, 4705, 4676, 4]), &full_catalog())
            .unwrap_err();
        assert_eq!(
            err.as_failure().map(ValidationFailure::kind),
            Some(FailureKind::NonVetoSignalRemoved)
        );
    }

    #[test]
    fn missing_column_fails() {
        let err = VetoScenario::default()
            .run(
                &mut RemoveIds(vec![4688, 4705, 4676]),
                &Columns(vec!["veto_PeakTime_top"]),
            )
            .unwrap_err();
        assert_eq!(
            err.as_failure(),
            Some(&ValidationFailure::MissingObservable {
                name: "veto_MaxPeakAmplitude_back".to_owned()
            })
        );
    }

    #[test]
    fn first_failure_short_circuits() {
        // 비토 신호 유지와 컬럼 누락이 모두 있어도 첫 검사 실패만 보고한다
        let empty = Columns(Vec::new());
        let mut opened = false;
        let err = VetoScenario::default()
            .run_with(&mut RemoveIds(Vec::new()), || {
                opened = true;
                Ok(&empty)
            })
            .unwrap_err();
        assert_eq!(
            err.as_failure().map(ValidationFailure::kind),
            Some(FailureKind::VetoSignalRetained)
        );
        assert!(!opened, "catalog must not be loaded after a stage failure");
    }

    #[test]
    fn catalog_loading_error_is_not_a_failure() {
        let err = VetoScenario::default()
            .run_with::<Columns, _>(&mut RemoveIds(vec![4688, 4705, 4676]), || {
                Err(ValidationError::Stage(RawsigError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "R01208_output.json",
                ))))
            })
            .unwrap_err();
        assert!(err.as_failure().is_none());
    }
}
