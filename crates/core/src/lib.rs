//! ComposeGenie 공통 크레이트
//!
//! 카탈로그, 선택 저장소, compose 합성, 보안 점수 크레이트가 공유하는
//! 도메인 타입, 에러, 설정, 이벤트, 디바운스 프리미티브를 정의합니다.
//!
//! # 모듈 구조
//!
//! - [`types`]: 도메인 타입 (`CatalogImage`, `SelectionEntry`, `ServiceConfig`, `VulnerabilitySummary`)
//! - [`error`]: 에러 타입 (`ComposeGenieError` 및 도메인별 에러)
//! - [`config`]: `composegenie.toml` 설정 로딩 및 환경변수 오버라이드
//! - [`event`]: 선택 변경 이벤트 (`SelectionEvent`)
//! - [`debounce`]: 입력 정지 후에만 값을 전달하는 [`Debouncer`]
//! - [`metrics`]: 메트릭 이름 상수

pub mod config;
pub mod debounce;
pub mod error;
pub mod event;
pub mod metrics;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ComposeGenieError, ConfigError, DatasetError, StorageError};

// 설정
pub use config::ComposeGenieConfig;

// 이벤트
pub use event::{Event, EventMetadata, SelectionChange, SelectionEvent};

// 디바운스
pub use debounce::{DebouncedReceiver, Debouncer};

// 도메인 타입
pub use types::{
    CatalogImage, Category, EnvVar, HealthCheck, PortMapping, ResourceSpec, Resources,
    SelectionEntry, ServiceConfig, Severity, VolumeKind, VolumeMount, VulnerabilitySummary,
};
