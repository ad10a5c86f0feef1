//! 설정 관리 -- rawsig.toml 파싱 및 런타임 설정
//!
//! [`RawsigConfig`]는 로깅, 검증 시나리오, 전체 런 설정을 담는 최상위 구조체입니다.
//! 처리 단계 자체의 파라미터는 각 단계의 설정 파일(`metadata.toml`, `veto.toml` 등)에 있으며
//! 여기서는 그 경로만 가리킵니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`RAWSIG_GENERAL_LOG_LEVEL=debug` 형식)
//! 3. 설정 파일 (`rawsig.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # fn example() -> Result<(), rawsig_core::error::RawsigError> {
//! use rawsig_core::config::RawsigConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = RawsigConfig::load("rawsig.toml")?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = RawsigConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, RawsigError};
use crate::signal::DEFAULT_SIGNAL_POINTS;
use crate::types::BinRange;

/// rawsig 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawsigConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 검증 시나리오 설정
    #[serde(default)]
    pub validation: ValidationConfig,
    /// 전체 파이프라인 런 설정
    #[serde(default)]
    pub run: RunConfig,
}

impl RawsigConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RawsigError> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 파일 없이 기본값에 환경변수 오버라이드만 적용합니다.
    pub fn from_env() -> Result<Self, RawsigError> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RawsigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RawsigError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                RawsigError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, RawsigError> {
        toml::from_str(toml_str).map_err(|e| {
            RawsigError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `RAWSIG_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "RAWSIG_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "RAWSIG_GENERAL_LOG_FORMAT");

        // Run
        override_u32(&mut self.run.run_number, "RAWSIG_RUN_RUN_NUMBER");
        override_usize(&mut self.run.events, "RAWSIG_RUN_EVENTS");
        override_string(&mut self.run.output_file, "RAWSIG_RUN_OUTPUT_FILE");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), RawsigError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        self.validation.noise.validate()?;
        self.validation.veto.validate()?;
        self.run.validate()?;

        Ok(())
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> RawsigError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason: reason.into(),
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 검증 시나리오 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// 잡음 주입 검증
    pub noise: NoiseValidationConfig,
    /// 비토 분석 검증
    pub veto: VetoValidationConfig,
}

/// 잡음 주입 검증 설정
///
/// 기본값은 교정된 고정 기준값입니다. 재교정할 때만 바꿉니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseValidationConfig {
    /// 잡음 처리 단계 설정 파일
    pub config_path: String,
    /// 설정 파일에서 읽을 섹션
    pub process_section: String,
    /// 신호 샘플 수
    pub samples: usize,
    /// 베이스라인 계산 구간 (양 끝 포함)
    pub baseline_range: BinRange,
    /// sigma 하한 (미포함)
    pub sigma_min: f64,
    /// sigma 상한 (미포함)
    pub sigma_max: f64,
}

impl Default for NoiseValidationConfig {
    fn default() -> Self {
        Self {
            config_path: "metadata.toml".to_owned(),
            process_section: "add_noise".to_owned(),
            samples: DEFAULT_SIGNAL_POINTS,
            baseline_range: BinRange::new(50, 450),
            sigma_min: 15.0,
            sigma_max: 25.0,
        }
    }
}

impl NoiseValidationConfig {
    fn validate(&self) -> Result<(), RawsigError> {
        if self.samples == 0 {
            return Err(invalid("validation.noise.samples", "must be greater than 0"));
        }
        if self.baseline_range.is_inverted() {
            return Err(invalid(
                "validation.noise.baseline_range",
                format!("start must not exceed end, got {}", self.baseline_range),
            ));
        }
        if self.baseline_range.end >= self.samples {
            return Err(invalid(
                "validation.noise.baseline_range",
                format!(
                    "end {} must be below samples {}",
                    self.baseline_range.end, self.samples
                ),
            ));
        }
        if !(self.sigma_min < self.sigma_max) {
            return Err(invalid(
                "validation.noise.sigma_min",
                format!(
                    "sigma_min ({}) must be below sigma_max ({})",
                    self.sigma_min, self.sigma_max
                ),
            ));
        }
        Ok(())
    }
}

/// 비토 분석 검증 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VetoValidationConfig {
    /// 비토 처리 단계 설정 파일
    pub config_path: String,
    /// 설정 파일에서 읽을 섹션
    pub process_section: String,
    /// 신호 샘플 수
    pub samples: usize,
    /// 제거되어야 하는 비토 채널 ID
    pub veto_ids: Vec<i32>,
    /// 남아 있어야 하는 채널 ID
    pub kept_ids: Vec<i32>,
    /// 전체 런 결과 파일
    pub run_file: String,
    /// 조회할 트리 이름
    pub tree_name: String,
    /// 트리에 있어야 하는 관측량 컬럼
    pub required_observables: Vec<String>,
}

impl Default for VetoValidationConfig {
    fn default() -> Self {
        Self {
            config_path: "veto.toml".to_owned(),
            process_section: "veto_analysis".to_owned(),
            samples: DEFAULT_SIGNAL_POINTS,
            veto_ids: vec![4688, 4705, 4676],
            kept_ids: vec![4],
            run_file: "R01208_output.json".to_owned(),
            tree_name: "AnalysisTree".to_owned(),
            required_observables: vec![
                "veto_PeakTime_top".to_owned(),
                "veto_MaxPeakAmplitude_back".to_owned(),
            ],
        }
    }
}

impl VetoValidationConfig {
    fn validate(&self) -> Result<(), RawsigError> {
        if self.samples == 0 {
            return Err(invalid("validation.veto.samples", "must be greater than 0"));
        }
        if self.veto_ids.is_empty() {
            return Err(invalid("validation.veto.veto_ids", "must not be empty"));
        }
        if let Some(id) = self.kept_ids.iter().find(|id| self.veto_ids.contains(id)) {
            return Err(invalid(
                "validation.veto.kept_ids",
                format!("id {id} is also listed in veto_ids"),
            ));
        }
        if self.tree_name.is_empty() {
            return Err(invalid("validation.veto.tree_name", "must not be empty"));
        }
        Ok(())
    }
}

/// 전체 파이프라인 런 설정 (합성 입력 이벤트 정의 포함)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// 파이프라인 처리 단계 설정 파일
    pub pipeline_path: String,
    /// 결과 런 파일 경로
    pub output_file: String,
    /// 런 번호
    pub run_number: u32,
    /// 생성할 이벤트 수
    pub events: usize,
    /// 신호 샘플 수
    pub samples: usize,
    /// 이벤트마다 생성할 신호 ID
    pub signal_ids: Vec<i32>,
    /// 펄스 최대 진폭 (ADC)
    pub pulse_amplitude: f64,
    /// 펄스 중심 bin
    pub pulse_bin: usize,
    /// 펄스 폭 (가우시안 sigma, bin 단위)
    pub pulse_width: f64,
    /// 관측량을 기록할 트리 이름
    pub tree_name: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            pipeline_path: "pipeline.toml".to_owned(),
            output_file: "R01208_output.json".to_owned(),
            run_number: 1208,
            events: 50,
            samples: DEFAULT_SIGNAL_POINTS,
            signal_ids: vec![4, 5, 6, 4676, 4688, 4705],
            pulse_amplitude: 800.0,
            pulse_bin: 250,
            pulse_width: 8.0,
            tree_name: "AnalysisTree".to_owned(),
        }
    }
}

impl RunConfig {
    fn validate(&self) -> Result<(), RawsigError> {
        if self.samples == 0 {
            return Err(invalid("run.samples", "must be greater than 0"));
        }
        if self.pulse_bin >= self.samples {
            return Err(invalid(
                "run.pulse_bin",
                format!("must be below samples ({})", self.samples),
            ));
        }
        if !(self.pulse_width > 0.0) {
            return Err(invalid("run.pulse_width", "must be positive"));
        }
        if self.tree_name.is_empty() {
            return Err(invalid("run.tree_name", "must not be empty"));
        }
        Ok(())
    }
}

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u32(target: &mut u32, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u32>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u32 from env var, ignoring"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn default_config_has_calibrated_values() {
        let config = RawsigConfig::default();
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.validation.noise.baseline_range, BinRange::new(50, 450));
        assert_eq!(config.validation.noise.sigma_min, 15.0);
        assert_eq!(config.validation.noise.sigma_max, 25.0);
        assert_eq!(config.validation.veto.veto_ids, vec![4688, 4705, 4676]);
        assert_eq!(config.validation.veto.kept_ids, vec![4]);
        assert_eq!(config.validation.veto.tree_name, "AnalysisTree");
        config.validate().unwrap();
    }

    #[test]
    fn parse_partial_config_fills_defaults() {
        let toml = r#"
[general]
log_level = "debug"

[validation.noise]
config_path = "demos/metadata.toml"
"#;
        let config = RawsigConfig::parse(toml).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.general.log_format, "pretty");
        assert_eq!(config.validation.noise.config_path, "demos/metadata.toml");
        assert_eq!(config.validation.noise.samples, 512);
        assert_eq!(config.run.run_number, 1208);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[general]
log_level = "info"
log_format = "json"

[validation.noise]
baseline_range = [40, 400]
sigma_min = 10.0
sigma_max = 30.0

[validation.veto]
veto_ids = [1, 2]
kept_ids = [3]
required_observables = ["veto_PeakTime"]

[run]
events = 5
signal_ids = [1, 2, 3]
pulse_bin = 100
"#;
        let config = RawsigConfig::parse(toml).unwrap();
        assert_eq!(config.validation.noise.baseline_range, BinRange::new(40, 400));
        assert_eq!(config.validation.veto.veto_ids, vec![1, 2]);
        assert_eq!(config.validation.veto.required_observables, vec!["veto_PeakTime"]);
        assert_eq!(config.run.events, 5);
        assert_eq!(config.run.pulse_bin, 100);
        config.validate().unwrap();
    }

    #[test]
    fn parse_invalid_toml_returns_error() {
        let err = RawsigConfig::parse("invalid = [[[toml").unwrap_err();
        assert!(matches!(
            err,
            RawsigError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = RawsigConfig::default();
        config.general.log_level = "verbose".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn validate_rejects_invalid_log_format() {
        let mut config = RawsigConfig::default();
        config.general.log_format = "xml".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_format"));
    }

    #[test]
    fn validate_rejects_inverted_sigma_band() {
        let mut config = RawsigConfig::default();
        config.validation.noise.sigma_min = 25.0;
        config.validation.noise.sigma_max = 15.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("sigma_min"));
    }

    #[test]
    fn validate_rejects_baseline_range_past_samples() {
        let mut config = RawsigConfig::default();
        config.validation.noise.baseline_range = BinRange::new(50, 512);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("baseline_range"));
    }

    #[test]
    fn validate_rejects_inverted_baseline_range() {
        let mut config = RawsigConfig::default();
        config.validation.noise.baseline_range = BinRange::new(450, 50);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("baseline_range"));
    }

    #[test]
    fn validate_rejects_overlapping_veto_and_kept_ids() {
        let mut config = RawsigConfig::default();
        config.validation.veto.kept_ids = vec![4, 4688];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("4688"));
    }

    #[test]
    fn validate_rejects_zero_samples() {
        let mut config = RawsigConfig::default();
        config.validation.veto.samples = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_pulse_outside_signal() {
        let mut config = RawsigConfig::default();
        config.run.pulse_bin = 512;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("pulse_bin"));
    }

    #[test]
    #[serial]
    fn env_override_string() {
        let mut val = "original".to_owned();
        // SAFETY: serial 테스트로 실행되어 다른 스레드가 환경변수를 읽지 않습니다.
        unsafe { std::env::set_var("TEST_RAWSIG_STR", "overridden") };
        override_string(&mut val, "TEST_RAWSIG_STR");
        assert_eq!(val, "overridden");
        unsafe { std::env::remove_var("TEST_RAWSIG_STR") };
    }

    #[test]
    #[serial]
    fn env_override_usize_invalid_keeps_original() {
        let mut val = 50usize;
        // SAFETY: serial 테스트로 실행되어 다른 스레드가 환경변수를 읽지 않습니다.
        unsafe { std::env::set_var("TEST_RAWSIG_USIZE_BAD", "fifty") };
        override_usize(&mut val, "TEST_RAWSIG_USIZE_BAD");
        assert_eq!(val, 50);
        unsafe { std::env::remove_var("TEST_RAWSIG_USIZE_BAD") };
    }

    #[test]
    #[serial]
    fn env_override_u32_valid() {
        let mut val = 1u32;
        // SAFETY: serial 테스트로 실행되어 다른 스레드가 환경변수를 읽지 않습니다.
        unsafe { std::env::set_var("TEST_RAWSIG_U32", "1208") };
        override_u32(&mut val, "TEST_RAWSIG_U32");
        assert_eq!(val, 1208);
        unsafe { std::env::remove_var("TEST_RAWSIG_U32") };
    }

    #[test]
    fn env_override_missing_var_keeps_original() {
        let mut val = "original".to_owned();
        override_string(&mut val, "TEST_RAWSIG_NONEXISTENT_12345");
        assert_eq!(val, "original");
    }

    #[test]
    fn config_serialize_roundtrip() {
        let config = RawsigConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = RawsigConfig::parse(&toml_str).unwrap();
        assert_eq!(config.general.log_level, parsed.general.log_level);
        assert_eq!(
            config.validation.noise.baseline_range,
            parsed.validation.noise.baseline_range
        );
        assert_eq!(config.run.signal_ids, parsed.run.signal_ids);
    }

    #[test]
    fn from_file_not_found() {
        let err = RawsigConfig::from_file("/nonexistent/path/rawsig.toml").unwrap_err();
        assert!(matches!(
            err,
            RawsigError::Config(ConfigError::FileNotFound { .. })
        ));
    }
}
