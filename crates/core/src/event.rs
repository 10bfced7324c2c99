//! 이벤트 시스템: 선택 변경 알림의 기본 단위
//!
//! 선택 저장소의 상태 변경은 [`SelectionEvent`]로 브로드캐스트됩니다.
//! [`EventMetadata`]는 모든 이벤트에 공통으로 포함되는 메타데이터이며,
//! [`Event`] trait은 모든 이벤트 타입이 구현해야 하는 인터페이스입니다.

use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::types::SelectionEntry;

// --- 모듈명 상수 ---

/// 선택 저장소 모듈명
pub const MODULE_SELECTION: &str = "selection";

// --- 이벤트 타입 상수 ---

/// 선택 변경 이벤트 타입
pub const EVENT_TYPE_SELECTION: &str = "selection";

/// 이벤트 메타데이터: 모든 이벤트에 공통으로 포함되는 추적 정보
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMetadata {
    /// 이벤트 발생 시각
    pub timestamp: SystemTime,
    /// 이벤트를 생성한 모듈명
    pub source_module: String,
    /// 추적 ID: 같은 흐름의 이벤트를 연결합니다
    pub trace_id: String,
}

impl EventMetadata {
    /// 기존 trace_id를 사용하여 새 메타데이터를 생성합니다.
    pub fn new(source_module: impl Into<String>, trace_id: impl Into<String>) -> Self {
        Self {
            timestamp: SystemTime::now(),
            source_module: source_module.into(),
            trace_id: trace_id.into(),
        }
    }

    /// 새로운 UUID v4 trace_id를 생성하여 메타데이터를 만듭니다.
    pub fn with_new_trace(source_module: impl Into<String>) -> Self {
        Self {
            timestamp: SystemTime::now(),
            source_module: source_module.into(),
            trace_id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

impl fmt::Display for EventMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] source={} trace={}",
            unix_timestamp_str(self.timestamp),
            self.source_module,
            self.trace_id,
        )
    }
}

/// 모든 이벤트가 구현해야 하는 기본 trait
pub trait Event: Send + Sync + 'static {
    /// 이벤트 고유 ID (UUID v4)
    fn event_id(&self) -> &str;

    /// 이벤트 메타데이터
    fn metadata(&self) -> &EventMetadata;

    /// 이벤트 타입명 (로깅에 사용)
    fn event_type(&self) -> &str;
}

/// 선택 변경 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionChange {
    /// 엔트리 추가됨
    Added,
    /// 엔트리 제거됨
    Removed,
}

impl fmt::Display for SelectionChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => write!(f, "added"),
            Self::Removed => write!(f, "removed"),
        }
    }
}

/// 선택 변경 이벤트
///
/// 변경된 엔트리의 `(name, tag)`와 추가/제거 구분자를 담습니다.
/// 재생(replay)은 없으므로 구독자는 시작 시 저장소를 직접 읽어야 합니다.
#[derive(Debug, Clone)]
pub struct SelectionEvent {
    /// 이벤트 고유 ID
    pub id: String,
    /// 이벤트 메타데이터
    pub metadata: EventMetadata,
    /// 변경된 엔트리
    pub entry: SelectionEntry,
    /// 변경 종류
    pub change: SelectionChange,
}

impl SelectionEvent {
    /// 새로운 trace를 시작하는 선택 이벤트를 생성합니다.
    pub fn new(entry: SelectionEntry, change: SelectionChange) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            metadata: EventMetadata::with_new_trace(MODULE_SELECTION),
            entry,
            change,
        }
    }

    /// 기존 trace에 연결된 선택 이벤트를 생성합니다.
    ///
    /// 저장소 전체 비우기처럼 여러 이벤트가 한 동작에서 나올 때 사용합니다.
    pub fn with_trace(
        entry: SelectionEntry,
        change: SelectionChange,
        trace_id: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            metadata: EventMetadata::new(MODULE_SELECTION, trace_id),
            entry,
            change,
        }
    }

    /// 추가 이벤트인지 여부
    pub fn is_added(&self) -> bool {
        self.change == SelectionChange::Added
    }
}

impl Event for SelectionEvent {
    fn event_id(&self) -> &str {
        &self.id
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }

    fn event_type(&self) -> &str {
        EVENT_TYPE_SELECTION
    }
}

impl fmt::Display for SelectionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SelectionEvent[{}] {} {}",
            &self.id[..8.min(self.id.len())],
            self.change,
            self.entry,
        )
    }
}

fn unix_timestamp_str(time: SystemTime) -> String {
    match time.duration_since(SystemTime::UNIX_EPOCH) {
        Ok(duration) => format!("{}", duration.as_secs()),
        Err(_) => "unknown".to_owned(),
    }
}
