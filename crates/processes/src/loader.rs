//! 처리 단계 설정 파일 로더 -- TOML 메타데이터 파일을 디스크에서 로드합니다.
//!
//! 한 파일에 여러 처리 단계 섹션(`[add_noise]`, `[veto_analysis]` 등)이 들어갈 수 있으며,
//! 각 처리 단계는 자기 섹션만 읽어 사용합니다.
//! 섹션이 없으면 경고 로그를 남기고 해당 단계의 기본 설정을 사용합니다.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::error::ProcessesError;

/// 설정 파일 최대 크기
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024; // 1MB

/// 파이프라인 순서를 정의하는 섹션 이름
pub const PIPELINE_SECTION: &str = "pipeline";

/// 로드된 처리 단계 설정 문서
#[derive(Debug, Clone, Default)]
pub struct ProcessConfigDocument {
    /// 원본 파일 경로 (문자열에서 파싱한 경우 없음)
    path: Option<PathBuf>,
    /// 최상위 TOML 테이블
    table: toml::Table,
}

impl ProcessConfigDocument {
    /// 파일에서 설정 문서를 로드합니다.
    ///
    /// # Errors
    /// - 파일이 없으면 [`ProcessesError::ConfigNotFound`]
    /// - 파일 크기가 `MAX_CONFIG_FILE_SIZE`를 넘거나 TOML 파싱에 실패하면 [`ProcessesError::ConfigLoad`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProcessesError> {
        let path = path.as_ref();

        // 파일 크기 검증
        let metadata = std::fs::metadata(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ProcessesError::ConfigNotFound {
                    path: path.display().to_string(),
                }
            } else {
                ProcessesError::ConfigLoad {
                    path: path.display().to_string(),
                    reason: format!("failed to read file metadata: {e}"),
                }
            }
        })?;

        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ProcessesError::ConfigLoad {
                path: path.display().to_string(),
                reason: format!(
                    "file too large: {} bytes (max: {MAX_CONFIG_FILE_SIZE})",
                    metadata.len()
                ),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ProcessesError::ConfigLoad {
            path: path.display().to_string(),
            reason: format!("failed to read file: {e}"),
        })?;

        let mut document = Self::parse(&content).map_err(|e| match e {
            ProcessesError::ConfigLoad { reason, .. } => ProcessesError::ConfigLoad {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })?;
        document.path = Some(path.to_path_buf());

        tracing::debug!(
            path = %path.display(),
            sections = document.table.len(),
            "loaded process config document"
        );

        Ok(document)
    }

    /// TOML 문자열에서 설정 문서를 파싱합니다.
    pub fn parse(content: &str) -> Result<Self, ProcessesError> {
        let table: toml::Table = toml::from_str(content).map_err(|e| ProcessesError::ConfigLoad {
            path: "<inline>".to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self { path: None, table })
    }

    /// 원본 파일 경로
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// 섹션이 있는지 확인합니다.
    pub fn has_section(&self, section: &str) -> bool {
        self.table.get(section).is_some_and(toml::Value::is_table)
    }

    /// 문서에 있는 섹션 이름 목록
    pub fn section_names(&self) -> Vec<&str> {
        self.table.keys().map(String::as_str).collect()
    }

    /// 섹션을 설정 타입으로 역직렬화합니다.
    ///
    /// 섹션이 없으면 경고 로그를 남기고 `T::default()`를 반환합니다.
    pub fn section<T>(&self, section: &str) -> Result<T, ProcessesError>
    where
        T: DeserializeOwned + Default,
    {
        match self.table.get(section) {
            Some(value) if value.is_table() => {
                value
                    .clone()
                    .try_into()
                    .map_err(|e: toml::de::Error| ProcessesError::SectionParse {
                        section: section.to_owned(),
                        reason: e.to_string(),
                    })
            }
            Some(_) => Err(ProcessesError::SectionParse {
                section: section.to_owned(),
                reason: "expected a table".to_owned(),
            }),
            None => {
                tracing::warn!(
                    section,
                    path = ?self.path,
                    "config section not found, using defaults"
                );
                Ok(T::default())
            }
        }
    }

    /// `[pipeline] processes` 목록을 읽습니다.
    pub fn pipeline_processes(&self) -> Result<Vec<String>, ProcessesError> {
        let section: crate::config::PipelineSection = self.section(PIPELINE_SECTION)?;
        Ok(section.processes)
    }
}
