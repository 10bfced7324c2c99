//! ComposeGenie compose 문서 합성
//!
//! 해석된 서비스 설정 목록을 docker-compose 텍스트로 직렬화합니다.
//! 합성은 순수 함수이며 파일을 쓰지 않습니다. 출력 기록은 호출자(CLI)의 몫입니다.
//!
//! # 모듈 구조
//!
//! - [`synthesizer`]: 결정적 compose 텍스트 생성
//! - [`resolver`]: 선택 엔트리를 내장 프리셋 또는 기본 설정으로 해석
//!
//! # 사용 예시
//!
//! ```
//! use composegenie_compose::{ServiceResolver, synthesize};
//! use composegenie_core::SelectionEntry;
//!
//! let services = ServiceResolver::default().resolve_all(&[SelectionEntry::new("redis", "7.2")]);
//! let yaml = synthesize(&services);
//! assert!(yaml.contains("image: redis:7.2"));
//! ```

pub mod resolver;
pub mod synthesizer;
mod yaml;

pub use resolver::{DEFAULT_RESTART, ServiceResolver};
pub use synthesizer::{DEFAULT_COMPOSE_VERSION, Synthesizer, synthesize};
