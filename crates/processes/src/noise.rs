//! 백색 잡음 주입 처리 단계
//!
//! 이벤트의 모든 신호에 N(0, `noise_level`) 가우시안 잡음을 더한 새 이벤트를 만듭니다.
//! 신호 ID와 이벤트 메타데이터는 그대로 유지됩니다.
//! 신호가 없는 이벤트는 버립니다.

use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;

use rawsig_core::error::RawsigError;
use rawsig_core::event::SignalEvent;
use rawsig_core::observable::ObservableSet;
use rawsig_core::process::EventProcess;

use crate::config::AddNoiseConfig;
use crate::error::ProcessesError;
use crate::loader::ProcessConfigDocument;

/// 백색 잡음 주입 처리 단계
pub struct AddNoiseProcess {
    config: AddNoiseConfig,
    rng: StdRng,
}

impl AddNoiseProcess {
    /// 설정 섹션 이름
    pub const KIND: &'static str = "add_noise";

    /// 검증된 설정으로 처리 단계를 생성합니다.
    pub fn new(config: AddNoiseConfig) -> Result<Self, ProcessesError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        tracing::debug!(
            process = %config.name,
            noise_level = config.noise_level,
            seeded = config.seed.is_some(),
            "add noise process created"
        );
        Ok(Self { config, rng })
    }

    /// 설정 문서의 `[add_noise]` 섹션으로 생성합니다.
    pub fn from_document(doc: &ProcessConfigDocument) -> Result<Self, ProcessesError> {
        Self::new(doc.section(Self::KIND)?)
    }

    /// 설정 파일 경로로 생성합니다.
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self, ProcessesError> {
        Self::from_document(&ProcessConfigDocument::load(path)?)
    }

    pub fn config(&self) -> &AddNoiseConfig {
        &self.config
    }
}

impl EventProcess for AddNoiseProcess {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn process_event(
        &mut self,
        event: SignalEvent,
        _observables: &mut ObservableSet,
    ) -> Result<Option<SignalEvent>, RawsigError> {
        if event.is_empty() {
            tracing::debug!(event = %event.metadata(), "event has no signals, dropping");
            return Ok(None);
        }

        let noise_level = self.config.noise_level;
        let signals = event
            .signals()
            .iter()
            .map(|signal| signal.white_noise(noise_level, &mut self.rng))
            .collect();

        Ok(Some(event.with_signals_like(signals)))
    }
}
