//! 런 파일 -- 전체 파이프라인 실행 결과의 JSON 영속화
//!
//! [`RunFile`]은 한 번의 런에서 만들어진 분석 트리와 실행된 처리 단계 목록을 담습니다.
//! 검증 단계는 [`RunFile::open`]으로 파일을 읽기 전용으로 열고 트리를 조회만 합니다.
//!
//! # JSON 형식
//!
//! ```json
//! {
//!   "run_id": "6f1c...",
//!   "run_number": 1208,
//!   "created_at": "2026-01-15T12:00:00Z",
//!   "processes": [{ "name": "veto", "kind": "veto_analysis" }],
//!   "trees": {
//!     "AnalysisTree": { "name": "AnalysisTree", "columns": [...], "entries": [...] }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TreeError;
use crate::tree::AnalysisTree;

/// 런 파일 최대 크기 (256 MB)
const MAX_RUN_FILE_SIZE: u64 = 256 * 1024 * 1024;

/// 런에서 실행된 처리 단계
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessInfo {
    /// 인스턴스 이름
    pub name: String,
    /// 처리 단계 종류
    pub kind: String,
}

/// 런 결과 파일
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunFile {
    /// 런 고유 ID
    pub run_id: Uuid,
    /// 런 번호
    pub run_number: u32,
    /// 생성 시각
    pub created_at: DateTime<Utc>,
    /// 실행된 처리 단계 (실행 순서)
    #[serde(default)]
    pub processes: Vec<ProcessInfo>,
    /// 트리 이름 → 트리
    #[serde(default)]
    trees: BTreeMap<String, AnalysisTree>,
}

impl RunFile {
    pub fn new(run_number: u32) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            run_number,
            created_at: Utc::now(),
            processes: Vec::new(),
            trees: BTreeMap::new(),
        }
    }

    /// 처리 단계 정보를 추가합니다.
    pub fn add_process(&mut self, name: impl Into<String>, kind: impl Into<String>) {
        self.processes.push(ProcessInfo {
            name: name.into(),
            kind: kind.into(),
        });
    }

    /// 트리를 추가합니다. 같은 이름의 트리가 있으면 교체하고 이전 트리를 돌려줍니다.
    pub fn insert_tree(&mut self, tree: AnalysisTree) -> Option<AnalysisTree> {
        self.trees.insert(tree.name().to_owned(), tree)
    }

    pub fn tree(&self, name: &str) -> Option<&AnalysisTree> {
        self.trees.get(name)
    }

    pub fn tree_mut(&mut self, name: &str) -> Option<&mut AnalysisTree> {
        self.trees.get_mut(name)
    }

    /// 트리 이름 목록
    pub fn tree_names(&self) -> Vec<&str> {
        self.trees.keys().map(String::as_str).collect()
    }

    /// JSON 문자열에서 파싱합니다.
    pub fn from_json(json: &str) -> Result<Self, TreeError> {
        serde_json::from_str(json).map_err(|e| TreeError::Parse(e.to_string()))
    }

    /// 런 파일을 읽기 전용으로 엽니다.
    ///
    /// # Errors
    /// - 파일이 없으면 [`TreeError::FileNotFound`]
    /// - 256MB를 넘으면 [`TreeError::TooLarge`]
    /// - JSON이 잘못되면 [`TreeError::Parse`]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TreeError> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let metadata = match std::fs::metadata(path) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TreeError::FileNotFound { path: path_str });
            }
            Err(e) => {
                return Err(TreeError::FileAccess {
                    path: path_str,
                    reason: e.to_string(),
                });
            }
        };

        let size = metadata.len();
        if size > MAX_RUN_FILE_SIZE {
            return Err(TreeError::TooLarge {
                size,
                max: MAX_RUN_FILE_SIZE,
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| TreeError::FileAccess {
            path: path_str.clone(),
            reason: e.to_string(),
        })?;
        let run = Self::from_json(&content)?;

        tracing::debug!(
            path = %path_str,
            run_number = run.run_number,
            trees = run.trees.len(),
            "run file opened"
        );
        Ok(run)
    }

    /// JSON으로 저장합니다.
    ///
    /// 같은 디렉토리의 임시 파일에 먼저 쓴 뒤 이름을 바꾸므로
    /// 중간에 실패해도 기존 파일이 깨지지 않습니다.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TreeError> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let json =
            serde_json::to_string_pretty(self).map_err(|e| TreeError::Serialize(e.to_string()))?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| TreeError::FileAccess {
                path: path_str.clone(),
                reason: "path has no file name".to_owned(),
            })?;
        let tmp_path = path.with_file_name(format!(".{file_name}.tmp"));

        let access = |e: std::io::Error| TreeError::FileAccess {
            path: path_str.clone(),
            reason: e.to_string(),
        };
        std::fs::write(&tmp_path, json).map_err(access)?;
        if let Err(e) = std::fs::rename(&tmp_path, path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(access(e));
        }

        tracing::info!(path = %path_str, run_id = %self.run_id, "run file saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rawsig_core::observable::{ObservableCatalog, ObservableSet};

    fn sample_run() -> RunFile {
        let mut tree = AnalysisTree::new("AnalysisTree");
        let mut obs = ObservableSet::new();
        obs.insert("veto", "PeakTime_top", std::collections::BTreeMap::from([(4688, 250.0)]));
        obs.insert("veto", "MaxPeakAmplitude_back", std::collections::BTreeMap::new());
        tree.fill_entry(0, 1208, &obs);

        let mut run = RunFile::new(1208);
        run.add_process("veto", "veto_analysis");
        run.insert_tree(tree);
        run
    }

    #[test]
    fn save_then_open_keeps_tree() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("R01208_output.json");
        let run = sample_run();
        run.save(&path).unwrap();

        let opened = RunFile::open(&path).unwrap();
        assert_eq!(opened.run_id, run.run_id);
        assert_eq!(opened.processes, run.processes);
        let tree = opened.tree("AnalysisTree").unwrap();
        assert!(tree.observable_exists("veto_PeakTime_top"));
        assert!(tree.observable_exists("veto_MaxPeakAmplitude_back"));
        assert_eq!(tree.entry_count(), 1);
    }

    #[test]
    fn save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        sample_run().save(&path).unwrap();
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("run.json")]);
    }

    #[derive(Clone, Default)]
    struct CapturedLog(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn save_and_open_log_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("R01208_output.json");
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            sample_run().save(&path).unwrap();
            RunFile::open(&path).unwrap();
        });

        let output = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("run file saved"));
        assert!(output.contains("run file opened"));
        assert!(output.contains("R01208_output.json"));
    }

    #[test]
    fn open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = RunFile::open(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, TreeError::FileNotFound { .. }));
    }

    #[test]
    fn open_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(RunFile::open(&path), Err(TreeError::Parse(_))));
    }

    #[test]
    fn missing_tree_is_none() {
        assert!(sample_run().tree("Other").is_none());
        assert_eq!(sample_run().tree_names(), vec!["AnalysisTree"]);
    }

    #[test]
    fn insert_tree_replaces_same_name() {
        let mut run = sample_run();
        let previous = run.insert_tree(AnalysisTree::new("AnalysisTree"));
        assert!(previous.is_some());
        assert_eq!(run.tree("AnalysisTree").map(|t| t.entry_count()), Some(0));
    }
}
