//! ComposeGenie 이미지 카탈로그
//!
//! 불변 카탈로그 데이터셋과 그 위에서 동작하는 필터/정렬 엔진을 제공합니다.
//!
//! # 모듈 구조
//!
//! - [`dataset`]: 내장 JSON 픽스처 및 외부 JSON 로딩, 별칭 필드 정규화
//! - [`search`]: 카테고리 + 텍스트 필터와 결정적 정렬, 숫자 표기
//! - [`template`]: 내장 compose 템플릿 메타데이터와 ID 조회
//! - [`error`]: 데이터셋 로딩 에러
//!
//! # 사용 예시
//!
//! ```
//! use composegenie_catalog::{Catalog, SearchQuery};
//! use composegenie_core::Category;
//!
//! let catalog = Catalog::builtin().expect("embedded dataset is valid");
//! let results = catalog.search(&SearchQuery::new(Category::Databases, ""));
//! assert_eq!(results[0].name, "mysql");
//! ```

pub mod dataset;
pub mod error;
pub mod search;
pub mod template;

pub use dataset::{Catalog, RawCatalogImage};
pub use error::CatalogError;
pub use search::{SearchQuery, format_count, search};
pub use template::{Template, TemplateCatalog};
