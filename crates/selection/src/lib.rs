//! ComposeGenie 선택 저장소
//!
//! 사용자가 고른 `(서비스, 태그)` 쌍을 중복 없이 영속화하고,
//! 변경을 독립적으로 동작하는 여러 뷰에 알립니다.
//!
//! # 모듈 구조
//!
//! - [`kv`]: 키-값 백엔드 trait과 메모리/파일 구현
//! - [`store`]: write-through 선택 저장소
//! - [`bus`]: 동기 fan-out 이벤트 버스와 RAII 구독 핸들
//! - [`service`]: 저장소 + 버스 파사드
//!
//! # 사용 예시
//!
//! ```
//! use composegenie_core::SelectionEntry;
//! use composegenie_selection::SelectionService;
//!
//! let service = SelectionService::in_memory();
//! let view = service.store().clone();
//! let _sub = service.subscribe(move |event| {
//!     println!("{event}: now {} selected", view.load().len());
//! });
//!
//! service.add(SelectionEntry::new("redis", "7.2"));
//! assert_eq!(service.load().len(), 1);
//! ```

pub mod bus;
pub mod kv;
pub mod service;
pub mod store;

pub use bus::{SelectionBus, Subscription};
pub use kv::{FileKvStore, KeyValueStore, MemoryKvStore};
pub use service::SelectionService;
pub use store::SelectionStore;
