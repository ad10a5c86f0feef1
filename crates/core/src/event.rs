//! 신호 이벤트 -- 처리 단계 사이를 오가는 기본 단위
//!
//! [`SignalEvent`]는 같은 트리거로 함께 기록된 [`RawSignal`]들의 묶음입니다.
//! 신호는 위치 인덱스나 ID로 조회하며, ID 조회는 `Option`으로 부재를 표현합니다.
//! 처리 단계는 이벤트의 소유권을 넘겨받고 (새) 이벤트를 돌려줍니다.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{EventError, SignalError};
use crate::signal::{DEFAULT_SIGNAL_POINTS, RawSignal};
use crate::types::{BaselineMethod, BinRange};

/// 이벤트 메타데이터 -- 이벤트 번호, 런 번호, 기록 시각
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// 런 내 이벤트 번호
    pub event_id: u64,
    /// 런 번호
    pub run_number: u32,
    /// 기록 시각
    pub timestamp: SystemTime,
}

impl EventMetadata {
    pub fn new(event_id: u64, run_number: u32) -> Self {
        Self {
            event_id,
            run_number,
            timestamp: SystemTime::now(),
        }
    }
}

impl Default for EventMetadata {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl fmt::Display for EventMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self
            .timestamp
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        write!(
            f,
            "[{secs}] run={} event={}",
            self.run_number, self.event_id
        )
    }
}

/// 한 트리거에서 기록된 신호들의 묶음
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    /// 이벤트 메타데이터
    metadata: EventMetadata,
    /// 신호 목록 (삽입 순서 유지)
    signals: Vec<RawSignal>,
    /// 신호 추가 시 적용할 베이스라인 구간
    #[serde(default)]
    baseline_range: Option<BinRange>,
    /// 신호 추가 시 적용할 분석 구간
    #[serde(default)]
    range: Option<BinRange>,
}

impl SignalEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metadata(metadata: EventMetadata) -> Self {
        Self {
            metadata,
            ..Self::default()
        }
    }

    pub fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }

    pub fn set_metadata(&mut self, metadata: EventMetadata) {
        self.metadata = metadata;
    }

    /// 신호 수
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    pub fn signals(&self) -> &[RawSignal] {
        &self.signals
    }

    /// 신호를 추가합니다.
    ///
    /// 이벤트에 베이스라인 구간이 설정되어 있으면 추가 시 베이스라인을 계산하고,
    /// 분석 구간이 설정되어 있으면 신호에 적용합니다.
    ///
    /// # Errors
    /// 같은 ID의 신호가 이미 있으면 [`EventError::DuplicateSignalId`]
    pub fn add_signal(&mut self, mut signal: RawSignal) -> Result<(), EventError> {
        if self.signal_index(signal.id()).is_some() {
            tracing::warn!(signal_id = signal.id(), "signal id already exists, rejecting");
            return Err(EventError::DuplicateSignalId { id: signal.id() });
        }

        if let Some(range) = self.baseline_range {
            apply_baseline(&mut signal, range);
        }
        if let Some(range) = self.range {
            signal.set_range(range);
        }

        self.signals.push(signal);
        Ok(())
    }

    /// 위치 인덱스로 신호를 조회합니다.
    pub fn signal(&self, index: usize) -> Option<&RawSignal> {
        self.signals.get(index)
    }

    pub fn signal_mut(&mut self, index: usize) -> Option<&mut RawSignal> {
        self.signals.get_mut(index)
    }

    /// ID에 해당하는 신호의 위치 인덱스
    pub fn signal_index(&self, id: i32) -> Option<usize> {
        self.signals.iter().position(|s| s.id() == id)
    }

    /// ID로 신호를 조회합니다.
    pub fn signal_by_id(&self, id: i32) -> Option<&RawSignal> {
        self.signals.iter().find(|s| s.id() == id)
    }

    pub fn signal_by_id_mut(&mut self, id: i32) -> Option<&mut RawSignal> {
        self.signals.iter_mut().find(|s| s.id() == id)
    }

    /// 해당 ID의 신호가 있는지 확인합니다.
    pub fn contains_signal(&self, id: i32) -> bool {
        self.signal_index(id).is_some()
    }

    /// ID로 신호를 제거하고 돌려줍니다.
    pub fn remove_signal_with_id(&mut self, id: i32) -> Option<RawSignal> {
        match self.signal_index(id) {
            Some(index) => Some(self.signals.remove(index)),
            None => {
                tracing::debug!(signal_id = id, "signal id not found, nothing removed");
                None
            }
        }
    }

    /// 조건을 만족하는 신호를 모두 제거하고 제거된 신호를 돌려줍니다.
    pub fn remove_signals_where<F>(&mut self, mut predicate: F) -> Vec<RawSignal>
    where
        F: FnMut(&RawSignal) -> bool,
    {
        let (removed, kept): (Vec<_>, Vec<_>) =
            self.signals.drain(..).partition(|s| predicate(s));
        self.signals = kept;
        removed
    }

    /// 신호 ID 목록 (삽입 순서)
    pub fn signal_ids(&self) -> Vec<i32> {
        self.signals.iter().map(RawSignal::id).collect()
    }

    pub fn baseline_range(&self) -> Option<BinRange> {
        self.baseline_range
    }

    /// 베이스라인 구간을 설정하고 모든 신호의 베이스라인을 다시 계산합니다.
    ///
    /// 구간보다 짧은 신호는 베이스라인 0으로 두고 경고를 남깁니다.
    pub fn set_baseline_range(&mut self, range: BinRange) {
        self.baseline_range = Some(range);
        for signal in &mut self.signals {
            apply_baseline(signal, range);
        }
    }

    pub fn range(&self) -> Option<BinRange> {
        self.range
    }

    /// 분석 구간을 설정하고 모든 신호에 적용합니다.
    pub fn set_range(&mut self, range: BinRange) {
        self.range = Some(range);
        for signal in &mut self.signals {
            signal.set_range(range);
        }
    }

    /// `id` 신호의 `bin` 샘플에 값을 더합니다.
    ///
    /// 해당 ID의 신호가 없으면 기본 길이의 0 신호를 만들어 추가합니다.
    /// 실패하면 이벤트는 바뀌지 않습니다.
    pub fn add_charge_to_signal(&mut self, id: i32, bin: usize, value: i16) -> Result<(), EventError> {
        if let Some(signal) = self.signal_by_id_mut(id) {
            let len = signal.len();
            if !signal.increase_bin_by(bin, value) {
                return Err(EventError::BinOutOfBounds { id, bin, len });
            }
            return Ok(());
        }

        if bin >= DEFAULT_SIGNAL_POINTS {
            return Err(EventError::BinOutOfBounds {
                id,
                bin,
                len: DEFAULT_SIGNAL_POINTS,
            });
        }
        self.add_signal(RawSignal::zeros(id, DEFAULT_SIGNAL_POINTS))?;
        if let Some(signal) = self.signal_by_id_mut(id) {
            signal.increase_bin_by(bin, value);
        }
        Ok(())
    }

    /// 새 신호 목록으로 같은 메타데이터/구간 설정의 이벤트를 만듭니다.
    pub fn with_signals_like(&self, signals: Vec<RawSignal>) -> Self {
        Self {
            metadata: self.metadata.clone(),
            signals,
            baseline_range: self.baseline_range,
            range: self.range,
        }
    }
}

impl fmt::Display for SignalEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} signals={}", self.metadata, self.signals.len())
    }
}

fn apply_baseline(signal: &mut RawSignal, range: BinRange) {
    match signal.calculate_baseline(range, BaselineMethod::Standard) {
        Ok(_) => {}
        Err(SignalError::RangeOutOfBounds { .. } | SignalError::EmptySignal { .. }) => {
            tracing::warn!(
                signal_id = signal.id(),
                len = signal.len(),
                range = %range,
                "baseline range exceeds signal length, baseline reset"
            );
            signal.reset_baseline();
        }
        Err(e) => {
            tracing::warn!(signal_id = signal.id(), error = %e, "baseline calculation failed");
            signal.reset_baseline();
        }
    }
}
