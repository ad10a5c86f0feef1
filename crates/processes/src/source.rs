//! 합성 이벤트 소스
//!
//! 런 설정의 신호 ID마다 가우시안 펄스 하나를 담은 이벤트를 만들어냅니다.
//! 펄스 위치는 (신호 ID, 이벤트 번호)로 정해지는 결정적 오프셋만큼 흔들리므로
//! 같은 설정이면 항상 같은 이벤트열이 나옵니다.

use std::collections::BTreeSet;

use rawsig_core::config::RunConfig;
use rawsig_core::event::{EventMetadata, SignalEvent};
use rawsig_core::signal::RawSignal;

use crate::error::ProcessesError;

/// 펄스 중심 오프셋 범위 (±bin)
const PULSE_JITTER: i64 = 20;

/// 런 설정으로 정의되는 합성 이벤트 소스
#[derive(Debug, Clone)]
pub struct SyntheticEventSource {
    run_number: u32,
    events: usize,
    samples: usize,
    signal_ids: Vec<i32>,
    pulse_amplitude: f64,
    pulse_bin: usize,
    pulse_width: f64,
    next: usize,
}

impl SyntheticEventSource {
    /// 런 설정으로 소스를 생성합니다.
    ///
    /// # Errors
    /// 신호 ID가 중복되거나 펄스 파라미터가 잘못되면 [`ProcessesError::Config`]
    pub fn new(config: &RunConfig) -> Result<Self, ProcessesError> {
        let mut seen = BTreeSet::new();
        for &id in &config.signal_ids {
            if !seen.insert(id) {
                return Err(ProcessesError::Config {
                    field: "run.signal_ids".to_owned(),
                    reason: format!("duplicate signal id {id}"),
                });
            }
        }
        if config.samples == 0 || config.pulse_bin >= config.samples {
            return Err(ProcessesError::Config {
                field: "run.pulse_bin".to_owned(),
                reason: format!(
                    "must be below samples ({}), got {}",
                    config.samples, config.pulse_bin
                ),
            });
        }
        if !(config.pulse_width > 0.0) || !config.pulse_amplitude.is_finite() {
            return Err(ProcessesError::Config {
                field: "run.pulse_width".to_owned(),
                reason: "pulse width must be positive and amplitude finite".to_owned(),
            });
        }

        Ok(Self {
            run_number: config.run_number,
            events: config.events,
            samples: config.samples,
            signal_ids: config.signal_ids.clone(),
            pulse_amplitude: config.pulse_amplitude,
            pulse_bin: config.pulse_bin,
            pulse_width: config.pulse_width,
            next: 0,
        })
    }

    /// 이벤트 `event_id`의 신호 `id` 펄스 중심 bin
    pub fn pulse_center(&self, id: i32, event_id: usize) -> usize {
        let mix = (i64::from(id) * 31 + event_id as i64 * 17).rem_euclid(2 * PULSE_JITTER + 1);
        let center = self.pulse_bin as i64 + mix - PULSE_JITTER;
        center.clamp(0, self.samples as i64 - 1) as usize
    }

    fn make_signal(&self, id: i32, event_id: usize) -> RawSignal {
        let center = self.pulse_center(id, event_id) as f64;
        let two_w2 = 2.0 * self.pulse_width * self.pulse_width;
        let mut signal = RawSignal::new(id);
        for bin in 0..self.samples {
            let x = bin as f64 - center;
            signal.add_point_f64(self.pulse_amplitude * (-x * x / two_w2).exp());
        }
        signal
    }

    fn make_event(&self, event_id: usize) -> SignalEvent {
        let mut event =
            SignalEvent::with_metadata(EventMetadata::new(event_id as u64, self.run_number));
        for &id in &self.signal_ids {
            // ID 중복은 생성 시 검사했으므로 실패하지 않는다
            if let Err(e) = event.add_signal(self.make_signal(id, event_id)) {
                tracing::warn!(error = %e, "synthetic signal rejected");
            }
        }
        event
    }
}

impl Iterator for SyntheticEventSource {
    type Item = SignalEvent;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.events {
            return None;
        }
        let event = self.make_event(self.next);
        self.next += 1;
        Some(event)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.events.saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SyntheticEventSource {}
