//! 키-값 영속화 백엔드
//!
//! 선택 저장소는 문자열 키 하나에 문자열 값을 저장하는 단순한 백엔드만 요구합니다.
//!
//! - [`MemoryKvStore`]: 프로세스 메모리 (테스트, 임시 세션)
//! - [`FileKvStore`]: 모든 키를 담은 JSON 문서 하나를 디스크에 저장
//!
//! # FileKvStore 문서 형식
//!
//! ```json
//! {
//!   "composerSelections": "[{\"name\":\"redis\",\"tag\":\"7.2\"}]"
//! }
//! ```
//!
//! 쓰기는 같은 디렉토리의 임시 파일에 기록한 뒤 rename하므로
//! 중간에 중단되어도 이전 문서가 남습니다.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use tracing::{debug, warn};

use composegenie_core::error::StorageError;

/// 문자열 키-값 백엔드
///
/// 모든 메서드는 동기적이며, 구현체는 내부 가변성으로 동시 접근을 처리합니다.
pub trait KeyValueStore: Send + Sync {
    /// 키의 값을 읽습니다. 키가 없으면 `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// 키에 값을 기록합니다 (기존 값 덮어쓰기).
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// 키를 제거합니다. 키가 없어도 성공합니다.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// 메모리 백엔드
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| StorageError::Read(format!("lock error: {e}")))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StorageError::Write(format!("lock error: {e}")))?;
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StorageError::Write(format!("lock error: {e}")))?;
        entries.remove(key);
        Ok(())
    }
}

/// 파일 백엔드
///
/// 동일 프로세스 안의 쓰기는 내부 락으로 직렬화되지만,
/// 프로세스 간 잠금은 하지 않습니다 (마지막 쓰기가 이김).
#[derive(Debug)]
pub struct FileKvStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileKvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// 문서 파일 경로
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "store document not found");
                return Ok(BTreeMap::new());
            }
            Err(e) => {
                return Err(StorageError::Read(format!(
                    "{}: {e}",
                    self.path.display()
                )));
            }
        };

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            StorageError::Read(format!("{}: malformed document: {e}", self.path.display()))
        })
    }

    fn write_document(&self, document: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::Write(format!("{}: {e}", parent.display())))?;
        }

        let json = serde_json::to_string_pretty(document)
            .map_err(|e| StorageError::Write(format!("serialize failed: {e}")))?;

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        std::fs::write(&tmp_path, json)
            .map_err(|e| StorageError::Write(format!("{}: {e}", tmp_path.display())))?;
        std::fs::rename(&tmp_path, &self.path)
            .map_err(|e| StorageError::Write(format!("{}: {e}", self.path.display())))?;
        Ok(())
    }

    /// 읽기-수정-쓰기를 락 안에서 수행합니다.
    ///
    /// 기존 문서를 읽을 수 없으면 경고 후 빈 문서에서 시작합니다.
    fn update<F>(&self, mutate: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| StorageError::Write(format!("lock error: {e}")))?;

        let mut document = match self.read_document() {
            Ok(document) => document,
            Err(e) => {
                warn!(error = %e, "replacing unreadable store document");
                BTreeMap::new()
            }
        };
        mutate(&mut document);
        self.write_document(&document)
    }
}

impl KeyValueStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_document()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|doc| {
            doc.insert(key.to_owned(), value.to_owned());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.update(|doc| {
            doc.remove(key);
        })
    }
}
