//! 원시 신호 -- 한 채널의 고정 길이 정수 샘플 파형
//!
//! [`RawSignal`]은 검출기 채널 하나에서 읽은 ADC 샘플 열을 담습니다.
//! 베이스라인 계산 결과(평균, 표준편차)와 분석 구간을 함께 보관하며,
//! 피크 탐색과 적분은 베이스라인을 뺀 값([`RawSignal::data`])을 기준으로 합니다.
//!
//! # 사용 예시
//! ```
//! use rawsig_core::signal::RawSignal;
//! use rawsig_core::types::{BaselineMethod, BinRange};
//!
//! let mut signal = RawSignal::zeros(4, 512);
//! let baseline = signal
//!     .calculate_baseline(BinRange::new(50, 450), BaselineMethod::Standard)
//!     .unwrap();
//! assert_eq!(baseline.sigma, 0.0);
//! ```

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::error::SignalError;
use crate::types::{Baseline, BaselineMethod, BinRange};

/// ID가 지정되지 않은 신호의 기본 ID
pub const DEFAULT_SIGNAL_ID: i32 = -1;

/// 채널당 기본 샘플 수
pub const DEFAULT_SIGNAL_POINTS: usize = 512;

/// IQR을 정규분포 표준편차로 환산하는 계수
const IQR_TO_SIGMA: f64 = 1.349;

/// 한 채널의 원시 파형
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSignal {
    /// 신호 ID (이벤트 내에서 유일)
    id: i32,
    /// ADC 샘플
    samples: Vec<i16>,
    /// 마지막으로 계산된 베이스라인
    #[serde(default)]
    baseline: Baseline,
    /// 분석 구간 (없으면 전체)
    #[serde(default)]
    range: Option<BinRange>,
}

impl Default for RawSignal {
    fn default() -> Self {
        Self::new(DEFAULT_SIGNAL_ID)
    }
}

impl RawSignal {
    /// 샘플이 없는 신호를 생성합니다.
    pub fn new(id: i32) -> Self {
        Self {
            id,
            samples: Vec::with_capacity(DEFAULT_SIGNAL_POINTS),
            baseline: Baseline::default(),
            range: None,
        }
    }

    /// 주어진 샘플로 신호를 생성합니다.
    pub fn with_samples(id: i32, samples: Vec<i16>) -> Self {
        Self {
            id,
            samples,
            baseline: Baseline::default(),
            range: None,
        }
    }

    /// 0으로 채운 `points`개 샘플의 신호를 생성합니다.
    pub fn zeros(id: i32, points: usize) -> Self {
        Self::with_samples(id, vec![0; points])
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn set_id(&mut self, id: i32) {
        self.id = id;
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// 원시 샘플 슬라이스
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// 샘플을 하나 뒤에 추가합니다.
    pub fn add_point(&mut self, value: i16) {
        self.samples.push(value);
    }

    /// 실수 값을 0 방향으로 자르고 i16 범위로 포화시켜 추가합니다.
    pub fn add_point_f64(&mut self, value: f64) {
        // `as`는 0 방향 절삭 + 포화 변환 (NaN은 0)
        self.samples.push(value as i16);
    }

    /// n번째 원시 샘플
    pub fn raw_data(&self, n: usize) -> Option<i16> {
        self.samples.get(n).copied()
    }

    /// n번째 샘플에서 베이스라인을 뺀 값
    pub fn data(&self, n: usize) -> Option<f64> {
        self.samples
            .get(n)
            .map(|&s| f64::from(s) - self.baseline.mean)
    }

    /// 마지막으로 계산된 베이스라인 평균
    pub fn baseline(&self) -> f64 {
        self.baseline.mean
    }

    /// 마지막으로 계산된 베이스라인 표준편차
    pub fn baseline_sigma(&self) -> f64 {
        self.baseline.sigma
    }

    /// 베이스라인 값을 초기화합니다.
    pub fn reset_baseline(&mut self) {
        self.baseline = Baseline::default();
    }

    /// `range` 구간(양 끝 포함)에서 베이스라인을 계산하고 저장합니다.
    ///
    /// # Errors
    /// - 샘플이 없는 경우 [`SignalError::EmptySignal`]
    /// - 역전된 구간인 경우 [`SignalError::InvalidRange`]
    /// - 끝 bin이 신호 길이를 넘는 경우 [`SignalError::RangeOutOfBounds`]
    pub fn calculate_baseline(
        &mut self,
        range: BinRange,
        method: BaselineMethod,
    ) -> Result<Baseline, SignalError> {
        let window = self.window(range)?;

        let baseline = match method {
            BaselineMethod::Standard => standard_baseline(window),
            BaselineMethod::Robust => robust_baseline(window),
        };

        tracing::trace!(
            signal_id = self.id,
            range = %range,
            method = %method,
            mean = baseline.mean,
            sigma = baseline.sigma,
            "baseline calculated"
        );

        self.baseline = baseline;
        Ok(baseline)
    }

    /// 분석 구간을 설정합니다. 신호 길이를 넘는 부분은 조회 시 잘립니다.
    pub fn set_range(&mut self, range: BinRange) {
        self.range = Some(range);
    }

    /// 설정된 분석 구간
    pub fn range(&self) -> Option<BinRange> {
        self.range
    }

    /// 실제 적용되는 분석 구간 (설정이 없으면 전체 신호)
    pub fn effective_range(&self) -> Option<BinRange> {
        match self.range {
            Some(range) => range.clamp_to(self.len()),
            None if self.is_empty() => None,
            None => Some(BinRange::new(0, self.len() - 1)),
        }
    }

    /// 분석 구간에서 베이스라인을 뺀 값의 합
    pub fn integral(&self) -> f64 {
        let Some(range) = self.effective_range() else {
            return 0.0;
        };
        (range.start..=range.end).filter_map(|i| self.data(i)).sum()
    }

    /// 분석 구간에서 베이스라인 보정 값이 최대인 bin. 같은 값이면 앞쪽 bin이 우선합니다.
    pub fn max_peak_bin(&self) -> Option<usize> {
        let range = self.effective_range()?;
        let mut best: Option<(usize, f64)> = None;
        for bin in range.start..=range.end {
            let Some(value) = self.data(bin) else {
                break;
            };
            match best {
                Some((_, current)) if value <= current => {}
                _ => best = Some((bin, value)),
            }
        }
        best.map(|(bin, _)| bin)
    }

    /// 분석 구간에서 베이스라인 보정 최댓값
    pub fn max_peak_value(&self) -> Option<f64> {
        self.max_peak_bin().and_then(|bin| self.data(bin))
    }

    /// 최대 원시 샘플이 `flat_bins`개 이상 연속되면 ADC 포화로 판단합니다.
    pub fn is_adc_saturated(&self, flat_bins: usize) -> bool {
        let Some(&max) = self.samples.iter().max() else {
            return false;
        };
        let mut run = 0usize;
        for &sample in &self.samples {
            if sample == max {
                run += 1;
                if run >= flat_bins {
                    return true;
                }
            } else {
                run = 0;
            }
        }
        false
    }

    /// 모든 샘플에 오프셋을 더합니다 (포화 연산).
    pub fn add_offset(&mut self, offset: i16) {
        for sample in &mut self.samples {
            *sample = sample.saturating_add(offset);
        }
    }

    /// 모든 샘플에 배율을 곱합니다 (0 방향 절삭, 포화).
    pub fn scale(&mut self, factor: f64) {
        for sample in &mut self.samples {
            *sample = (f64::from(*sample) * factor) as i16;
        }
    }

    /// 같은 길이의 신호를 샘플 단위로 더합니다 (포화 연산).
    pub fn add_signal(&mut self, other: &RawSignal) -> Result<(), SignalError> {
        if self.len() != other.len() {
            return Err(SignalError::LengthMismatch {
                left: self.len(),
                right: other.len(),
            });
        }
        for (sample, &add) in self.samples.iter_mut().zip(&other.samples) {
            *sample = sample.saturating_add(add);
        }
        Ok(())
    }

    /// `bin` 샘플에 값을 더합니다 (포화 연산).
    pub fn increase_bin_by(&mut self, bin: usize, value: i16) -> bool {
        match self.samples.get_mut(bin) {
            Some(sample) => {
                *sample = sample.saturating_add(value);
                true
            }
            None => false,
        }
    }

    /// 가우시안 백색 잡음을 더한 새 신호를 반환합니다.
    ///
    /// 각 샘플은 `data(i) + trunc(N(0, noise_level))`이며 ID는 유지됩니다.
    /// `noise_level`이 양의 유한값이 아니면 잡음 없이 `data(i)`만 복사합니다.
    pub fn white_noise<R: Rng + ?Sized>(&self, noise_level: f64, rng: &mut R) -> RawSignal {
        let normal = if noise_level.is_finite() && noise_level > 0.0 {
            Normal::new(0.0, noise_level).ok()
        } else {
            None
        };

        let mut noisy = RawSignal::new(self.id);
        noisy.samples.reserve(self.len());
        for i in 0..self.len() {
            let data = self.data(i).unwrap_or_default();
            let noise = match normal {
                Some(normal) => normal.sample(rng).trunc(),
                None => 0.0,
            };
            noisy.add_point_f64(data + noise);
        }
        noisy
    }

    fn window(&self, range: BinRange) -> Result<&[i16], SignalError> {
        if self.is_empty() {
            return Err(SignalError::EmptySignal { id: self.id });
        }
        if range.is_inverted() {
            return Err(SignalError::InvalidRange {
                start: range.start,
                end: range.end,
            });
        }
        if range.end >= self.len() {
            return Err(SignalError::RangeOutOfBounds {
                id: self.id,
                start: range.start,
                end: range.end,
                len: self.len(),
            });
        }
        Ok(&self.samples[range.start..=range.end])
    }
}

fn standard_baseline(window: &[i16]) -> Baseline {
    let n = window.len() as f64;
    let mean = window.iter().map(|&s| f64::from(s)).sum::<f64>() / n;
    let variance = window
        .iter()
        .map(|&s| {
            let d = f64::from(s) - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    Baseline {
        mean,
        sigma: variance.sqrt(),
    }
}

fn robust_baseline(window: &[i16]) -> Baseline {
    let mut sorted: Vec<f64> = window.iter().map(|&s| f64::from(s)).collect();
    sorted.sort_by(f64::total_cmp);
    let median = quantile(&sorted, 0.5);
    let iqr = quantile(&sorted, 0.75) - quantile(&sorted, 0.25);
    Baseline {
        mean: median,
        sigma: iqr / IQR_TO_SIGMA,
    }
}

/// 정렬된 표본의 선형 보간 분위수
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
