//! 채널 제거 처리 단계
//!
//! ID 목록이나 ID 구간에 해당하는 신호를 이벤트에서 제거합니다.

use std::path::Path;

use rawsig_core::error::RawsigError;
use rawsig_core::event::SignalEvent;
use rawsig_core::observable::ObservableSet;
use rawsig_core::process::EventProcess;

use crate::config::RemoveChannelsConfig;
use crate::error::ProcessesError;
use crate::loader::ProcessConfigDocument;

/// 채널 제거 처리 단계
pub struct RemoveChannelsProcess {
    config: RemoveChannelsConfig,
}

impl RemoveChannelsProcess {
    /// 설정 섹션 이름
    pub const KIND: &'static str = "remove_channels";

    pub fn new(config: RemoveChannelsConfig) -> Result<Self, ProcessesError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn from_document(doc: &ProcessConfigDocument) -> Result<Self, ProcessesError> {
        Self::new(doc.section(Self::KIND)?)
    }

    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self, ProcessesError> {
        Self::from_document(&ProcessConfigDocument::load(path)?)
    }

    pub fn config(&self) -> &RemoveChannelsConfig {
        &self.config
    }
}

impl EventProcess for RemoveChannelsProcess {
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
        let removed = event.remove_signals_where(|signal| self.config.matches(signal.id()));
        if !removed.is_empty() {
            tracing::trace!(
                process = %self.config.name,
                removed = removed.len(),
                "channels removed"
            );
        }
        observables.insert(&self.config.name, "RemovedSignals", removed.len() as f64);
        Ok(Some(event))
    }
}
