//! 처리 체인 -- 여러 처리 단계를 순서대로 실행합니다.
//!
//! [`ProcessChain`]은 이벤트 하나를 모든 단계에 차례로 통과시키고,
//! 각 단계가 기록한 관측량을 하나의 [`ObservableSet`]으로 모읍니다.
//! 어떤 단계가 이벤트를 버리면(`Ok(None)`) 이후 단계는 실행하지 않습니다.
//!
//! # 흐름
//! ```text
//! SignalEvent -> stage 1 -> stage 2 -> ... -> (SignalEvent, ObservableSet) -> AnalysisSink
//! ```

use std::time::Instant;

use metrics::{counter, histogram};

use rawsig_core::error::RawsigError;
use rawsig_core::event::SignalEvent;
use rawsig_core::metrics as m;
use rawsig_core::observable::{AnalysisSink, ObservableSet};
use rawsig_core::process::EventProcess;

use crate::error::ProcessesError;
use crate::loader::ProcessConfigDocument;
use crate::registry::ProcessRegistry;

/// 체인 실행 통계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChainStats {
    /// 입력 이벤트 수
    pub events_in: u64,
    /// 모든 단계를 통과한 이벤트 수
    pub events_out: u64,
    /// 중간에 버려진 이벤트 수
    pub dropped: u64,
    /// 단계 에러로 중단된 이벤트 수
    pub errors: u64,
}

/// 이벤트 하나의 체인 처리 결과
#[derive(Debug)]
pub struct ChainOutput {
    /// 마지막 단계의 출력 이벤트 (버려졌으면 None)
    pub event: Option<SignalEvent>,
    /// 모든 단계가 기록한 관측량
    pub observables: ObservableSet,
}

/// 처리 단계 체인
pub struct ProcessChain {
    processes: Vec<Box<dyn EventProcess>>,
    stats: ChainStats,
}

impl ProcessChain {
    /// 빌더를 생성합니다.
    pub fn builder() -> ProcessChainBuilder {
        ProcessChainBuilder::new()
    }

    /// 설정 문서의 `[pipeline] processes` 순서대로 체인을 구성합니다.
    ///
    /// # Errors
    /// - 목록이 비어 있으면 [`ProcessesError::EmptyChain`]
    /// - 등록되지 않은 종류가 있으면 [`ProcessesError::UnknownProcess`]
    pub fn from_document(
        doc: &ProcessConfigDocument,
        registry: &ProcessRegistry,
    ) -> Result<Self, ProcessesError> {
        let mut builder = Self::builder();
        for kind in doc.pipeline_processes()? {
            builder = builder.add_boxed(registry.build(&kind, doc)?);
        }
        builder.build()
    }

    /// 처리 단계 이름 (실행 순서)
    pub fn process_names(&self) -> Vec<&str> {
        self.processes.iter().map(|p| p.name()).collect()
    }

    /// 처리 단계 (이름, 종류) 목록
    pub fn process_kinds(&self) -> Vec<(&str, &'static str)> {
        self.processes.iter().map(|p| (p.name(), p.kind())).collect()
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    /// 누적 실행 통계
    pub fn stats(&self) -> ChainStats {
        self.stats
    }

    /// 이벤트 하나를 모든 단계에 통과시킵니다.
    ///
    /// 단계 에러는 그대로 전파하며 이벤트는 버려집니다.
    /// 에러로 끝난 이벤트도 [`ChainStats::errors`]에 집계되므로
    /// `events_in == events_out + dropped + errors`가 항상 성립합니다.
    pub fn process_event(&mut self, event: SignalEvent) -> Result<ChainOutput, RawsigError> {
        self.stats.events_in += 1;
        let mut observables = ObservableSet::new();
        let mut current = Some(event);

        for process in &mut self.processes {
            let Some(event) = current.take() else {
                break;
            };
            let name = process.name().to_owned();
            let signals_before = event.len();
            let started = Instant::now();

            let output = match process.process_event(event, &mut observables) {
                Ok(output) => output,
                Err(e) => {
                    self.stats.errors += 1;
                    counter!(m::PROCESS_ERRORS_TOTAL, m::LABEL_PROCESS => name.clone())
                        .increment(1);
                    tracing::warn!(process = %name, error = %e, "process failed on event");
                    return Err(e);
                }
            };

            histogram!(m::PROCESS_DURATION_SECONDS, m::LABEL_PROCESS => name.clone())
                .record(started.elapsed().as_secs_f64());
            counter!(m::PROCESS_EVENTS_TOTAL, m::LABEL_PROCESS => name.clone()).increment(1);

            match output {
                Some(event) => {
                    let removed = signals_before.saturating_sub(event.len());
                    if removed > 0 {
                        counter!(m::PROCESS_SIGNALS_REMOVED_TOTAL, m::LABEL_PROCESS => name)
                            .increment(removed as u64);
                    }
                    current = Some(event);
                }
                None => {
                    counter!(m::PROCESS_EVENTS_DROPPED_TOTAL, m::LABEL_PROCESS => name.clone())
                        .increment(1);
                    tracing::debug!(process = %name, "event dropped by process");
                }
            }
        }

        match current {
            Some(_) => self.stats.events_out += 1,
            None => self.stats.dropped += 1,
        }

        Ok(ChainOutput {
            event: current,
            observables,
        })
    }

    /// 이벤트 전체를 처리하고, 끝까지 살아남은 이벤트의 관측량을 `sink`에 기록합니다.
    ///
    /// 이번 실행분의 통계를 반환합니다.
    pub fn run<I, S>(&mut self, events: I, sink: &mut S) -> Result<ChainStats, RawsigError>
    where
        I: IntoIterator<Item = SignalEvent>,
        S: AnalysisSink + ?Sized,
    {
        let before = self.stats;
        for event in events {
            let output = self.process_event(event)?;
            if let Some(event) = output.event {
                sink.fill(event.metadata(), &output.observables);
                counter!(m::RUN_ENTRIES_FILLED_TOTAL).increment(1);
            }
        }

        let stats = ChainStats {
            events_in: self.stats.events_in - before.events_in,
            events_out: self.stats.events_out - before.events_out,
            dropped: self.stats.dropped - before.dropped,
            errors: self.stats.errors - before.errors,
        };
        tracing::info!(
            events_in = stats.events_in,
            events_out = stats.events_out,
            dropped = stats.dropped,
            "process chain run finished"
        );
        Ok(stats)
    }
}

/// 처리 체인 빌더
pub struct ProcessChainBuilder {
    processes: Vec<Box<dyn EventProcess>>,
}

impl ProcessChainBuilder {
    pub fn new() -> Self {
        Self {
            processes: Vec::new(),
        }
    }

    /// 처리 단계를 체인 끝에 추가합니다.
    pub fn add_process<P>(self, process: P) -> Self
    where
        P: EventProcess + 'static,
    {
        self.add_boxed(Box::new(process))
    }

    pub fn add_boxed(mut self, process: Box<dyn EventProcess>) -> Self {
        self.processes.push(process);
        self
    }

    /// 체인을 빌드합니다.
    ///
    /// # Errors
    /// 단계가 하나도 없으면 [`ProcessesError::EmptyChain`]
    pub fn build(self) -> Result<ProcessChain, ProcessesError> {
        if self.processes.is_empty() {
            return Err(ProcessesError::EmptyChain);
        }
        tracing::debug!(
            processes = ?self.processes.iter().map(|p| p.name()).collect::<Vec<_>>(),
            "process chain built"
        );
        Ok(ProcessChain {
            processes: self.processes,
            stats: ChainStats::default(),
        })
    }
}

impl Default for ProcessChainBuilder {
    fn default() -> Self {
        Self::new()
    }
}
