//! 선택 저장소 -- 중복 없는 `(name, tag)` 목록의 write-through 영속화
//!
//! [`SelectionStore`]는 잘 알려진 키 하나(기본값 `"composerSelections"`) 아래에
//! 선택 엔트리 배열을 JSON으로 저장합니다.
//!
//! # 규칙
//!
//! - 삽입 순서를 유지하며 재정렬하지 않습니다.
//! - 같은 `(name, tag)`는 한 번만 저장됩니다. 중복 추가는 조용히 무시됩니다.
//! - 없는 엔트리 제거는 조용히 무시됩니다.
//! - 저장 값이 없거나 손상되었으면 빈 목록으로 읽습니다 (에러를 반환하지 않음).
//! - 모든 변경은 즉시 백엔드에 기록됩니다.
//! - 기록 실패는 "변경 없음"으로 보고되며, 마지막 실패는
//!   [`SelectionStore::take_write_error`]로 꺼낼 수 있습니다.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

use composegenie_core::config::{DEFAULT_STORAGE_KEY, SelectionConfig};
use composegenie_core::error::StorageError;
use composegenie_core::metrics as m;
use composegenie_core::types::SelectionEntry;

use crate::kv::{FileKvStore, KeyValueStore, MemoryKvStore};

/// 영속 선택 저장소
///
/// 복제본은 같은 백엔드를 공유하므로, 리스너가 알림을 받은 뒤
/// 자신의 복제본으로 [`load`](Self::load)를 호출해 최신 상태를 읽을 수 있습니다.
#[derive(Clone)]
pub struct SelectionStore {
    backend: Arc<dyn KeyValueStore>,
    key: String,
    write_error: Arc<Mutex<Option<StorageError>>>,
}

impl std::fmt::Debug for SelectionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionStore")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl SelectionStore {
    /// 주어진 백엔드와 키로 저장소를 생성합니다.
    pub fn new(backend: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
            write_error: Arc::new(Mutex::new(None)),
        }
    }

    /// 기본 키를 사용하는 메모리 저장소
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryKvStore::new()), DEFAULT_STORAGE_KEY)
    }

    /// 설정에 따라 파일 또는 메모리 저장소를 생성합니다.
    pub fn from_config(config: &SelectionConfig) -> Self {
        match config.resolved_store_path() {
            Some(path) => {
                debug!(path = %path.display(), key = %config.storage_key, "using file-backed selection store");
                Self::new(Arc::new(FileKvStore::new(path)), config.storage_key.clone())
            }
            None => {
                debug!(key = %config.storage_key, "using in-memory selection store");
                Self::new(Arc::new(MemoryKvStore::new()), config.storage_key.clone())
            }
        }
    }

    /// 저장 키
    pub fn key(&self) -> &str {
        &self.key
    }

    /// 마지막 기록 실패를 꺼냅니다. 꺼낸 뒤에는 `None`으로 초기화됩니다.
    ///
    /// `add`/`remove`/`clear`는 중복과 기록 실패를 모두 "변경 없음"으로 보고하므로,
    /// 둘을 구분해야 하는 호출자가 사용합니다.
    pub fn take_write_error(&self) -> Option<StorageError> {
        self.write_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    fn record_write_error(&self, err: StorageError) {
        metrics::counter!(m::SELECTION_PERSIST_FAILURES_TOTAL).increment(1);
        *self
            .write_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(err);
    }

    /// 저장된 선택 목록을 삽입 순서대로 읽습니다.
    ///
    /// 읽기 실패, 값 없음, 손상된 값은 모두 빈 목록이 됩니다.
    pub fn load(&self) -> Vec<SelectionEntry> {
        let raw = match self.backend.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(key = %self.key, error = %e, "failed to read selections, treating as empty");
                return Vec::new();
            }
        };

        let entries: Vec<SelectionEntry> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(key = %self.key, error = %e, "malformed persisted selections, treating as empty");
                return Vec::new();
            }
        };

        dedup_preserving_order(entries)
    }

    /// `(name, tag)`가 선택되어 있는지 여부
    pub fn contains(&self, name: &str, tag: &str) -> bool {
        self.load().iter().any(|e| e.matches(name, tag))
    }

    /// 엔트리를 목록 끝에 추가합니다.
    ///
    /// 이미 있으면 아무것도 하지 않습니다. 백엔드 기록에 성공해 상태가 실제로
    /// 바뀌었을 때만 `true`를 반환합니다.
    pub fn add(&self, entry: SelectionEntry) -> bool {
        let mut entries = self.load();
        if entries.iter().any(|e| e.matches(&entry.name, &entry.tag)) {
            debug!(name = %entry.name, tag = %entry.tag, "selection already present");
            return false;
        }

        entries.push(entry);
        self.save(&entries)
    }

    /// `(name, tag)`와 일치하는 엔트리를 제거합니다.
    ///
    /// 없으면 아무것도 하지 않습니다. 상태가 실제로 바뀌었을 때만 `true`를 반환합니다.
    pub fn remove(&self, name: &str, tag: &str) -> bool {
        let mut entries = self.load();
        let before = entries.len();
        entries.retain(|e| !e.matches(name, tag));
        if entries.len() == before {
            debug!(name, tag, "selection not present");
            return false;
        }

        self.save(&entries)
    }

    /// 모든 선택을 제거하고, 제거된 엔트리를 저장 순서대로 반환합니다.
    ///
    /// 백엔드 기록에 실패하면 빈 목록을 반환합니다.
    pub fn clear(&self) -> Vec<SelectionEntry> {
        let entries = self.load();
        if entries.is_empty() {
            return entries;
        }

        match self.backend.remove(&self.key) {
            Ok(()) => {
                metrics::gauge!(m::SELECTION_ENTRIES).set(0.0);
                entries
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "failed to clear selections");
                self.record_write_error(e);
                Vec::new()
            }
        }
    }

    fn save(&self, entries: &[SelectionEntry]) -> bool {
        let json = match serde_json::to_string(entries) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "failed to serialize selections");
                self.record_write_error(StorageError::Write(e.to_string()));
                return false;
            }
        };

        match self.backend.set(&self.key, &json) {
            Ok(()) => {
                metrics::gauge!(m::SELECTION_ENTRIES).set(entries.len() as f64);
                true
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "failed to persist selections");
                self.record_write_error(e);
                false
            }
        }
    }
}

/// 외부에서 편집되어 중복이 생긴 목록은 첫 번째 항목만 남깁니다.
fn dedup_preserving_order(entries: Vec<SelectionEntry>) -> Vec<SelectionEntry> {
    let mut unique: Vec<SelectionEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        if !unique.contains(&entry) {
            unique.push(entry);
        }
    }
    unique
}
