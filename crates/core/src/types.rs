//! 도메인 타입 -- 신호 연산에서 공통으로 쓰는 값 타입
//!
//! bin 구간, 베이스라인 계산 방식과 결과를 정의합니다.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SignalError;

/// 양 끝을 포함하는 bin 구간 `[start, end]`
///
/// 설정 파일에서는 `[50, 450]` 형태의 2원소 배열로 표현됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct BinRange {
    /// 시작 bin (포함)
    pub start: usize,
    /// 끝 bin (포함)
    pub end: usize,
}

impl BinRange {
    /// 새 구간을 생성합니다. 순서 검증은 [`BinRange::checked`]에서 합니다.
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// `start <= end`인 경우에만 구간을 생성합니다.
    pub fn checked(start: usize, end: usize) -> Result<Self, SignalError> {
        if start > end {
            return Err(SignalError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// 구간에 포함된 bin 수
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start) + 1
    }

    /// 역전된 구간이면 true
    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }

    /// bin이 구간 안에 있는지 확인합니다.
    pub fn contains(&self, bin: usize) -> bool {
        bin >= self.start && bin <= self.end
    }

    /// 길이 `len`인 신호에 맞게 끝 bin을 잘라냅니다.
    ///
    /// 시작 bin부터 이미 범위를 벗어나면 `None`을 반환합니다.
    pub fn clamp_to(&self, len: usize) -> Option<Self> {
        if len == 0 || self.start >= len || self.is_inverted() {
            return None;
        }
        Some(Self {
            start: self.start,
            end: self.end.min(len - 1),
        })
    }
}

impl From<(usize, usize)> for BinRange {
    fn from((start, end): (usize, usize)) -> Self {
        Self { start, end }
    }
}

impl From<BinRange> for (usize, usize) {
    fn from(range: BinRange) -> Self {
        (range.start, range.end)
    }
}

impl fmt::Display for BinRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// 베이스라인 계산 방식
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineMethod {
    /// 평균과 (모집단) 표준편차
    #[default]
    Standard,
    /// 중앙값과 IQR 기반 표준편차 추정 (IQR / 1.349)
    Robust,
}

impl fmt::Display for BaselineMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Robust => write!(f, "robust"),
        }
    }
}

/// 베이스라인 계산 결과
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    /// 구간 평균 (Robust 방식에서는 중앙값)
    pub mean: f64,
    /// 구간 표준편차
    pub sigma: f64,
}

impl fmt::Display for Baseline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mean={:.3} sigma={:.3}", self.mean, self.sigma)
    }
}
