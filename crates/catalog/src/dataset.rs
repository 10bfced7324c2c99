//! 카탈로그 데이터셋 -- 내장 JSON 픽스처 및 외부 JSON 로딩
//!
//! [`Catalog`]는 세션 시작 시 한 번 로드되는 불변 이미지 컬렉션입니다.
//!
//! # JSON 형식
//!
//! 외부 레코드는 [`RawCatalogImage`] 형태로 역직렬화된 뒤 경계에서 한 번만
//! [`CatalogImage`]로 정규화됩니다.
//!
//! ```json
//! [
//!   {
//!     "id": "3",
//!     "name": "redis",
//!     "description": "Redis is an open source key-value store",
//!     "official": true,
//!     "verified": true,
//!     "pulls": 1200000000,
//!     "stars": 11200,
//!     "category": "Databases",
//!     "tags": ["latest", "7.2"],
//!     "latestTag": "7.2",
//!     "imageUrl": "https://example.invalid/redis.svg"
//!   }
//! ]
//! ```
//!
//! - 로고는 `logo` 또는 레거시 별칭 `imageUrl`로 제공될 수 있습니다 (`logo` 우선).
//! - `latestTag`가 없으면 첫 번째 태그를 사용합니다.
//! - 태그 목록이 비어 있는 레코드는 거부됩니다.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info, warn};

use composegenie_core::config::CatalogConfig;
use composegenie_core::metrics as m;
use composegenie_core::types::{CatalogImage, Category};

use crate::error::CatalogError;
use crate::search::{SearchQuery, search};

/// 카탈로그 파일 최대 크기 (10 MB)
const MAX_DATASET_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// 표시 순서대로 정렬된 고정 카테고리
static CATEGORIES: [Category; 10] = Category::FIXED;

/// 내장 데이터셋
const BUILTIN_DATASET: &str = include_str!("../data/images.json");

/// 외부 JSON 레코드 형태
///
/// 별칭 필드와 선택 필드를 그대로 받아들이며,
/// [`into_image`](Self::into_image)로 정규화합니다.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCatalogImage {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub official: bool,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub pulls: u64,
    #[serde(default)]
    pub stars: u64,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub latest_tag: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    /// `logo`의 레거시 별칭
    #[serde(default)]
    pub image_url: Option<String>,
}

impl RawCatalogImage {
    /// 경계 검증 후 정규화된 [`CatalogImage`]로 변환합니다.
    pub fn into_image(self) -> Result<CatalogImage, CatalogError> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::InvalidRecord {
                id: self.id,
                reason: "name must not be empty".to_owned(),
            });
        }

        let Some(first_tag) = self.tags.first().cloned() else {
            return Err(CatalogError::InvalidRecord {
                id: self.id,
                reason: "tags must not be empty".to_owned(),
            });
        };

        let latest_tag = match self.latest_tag {
            Some(tag) if !tag.is_empty() => {
                if !self.tags.contains(&tag) {
                    warn!(
                        id = %self.id,
                        name = %self.name,
                        latest_tag = %tag,
                        "latest tag is not listed in tags"
                    );
                }
                tag
            }
            _ => first_tag,
        };

        let logo = self
            .logo
            .filter(|l| !l.is_empty())
            .or(self.image_url.filter(|l| !l.is_empty()));

        Ok(CatalogImage {
            id: self.id,
            name: self.name,
            description: self.description,
            official: self.official,
            verified: self.verified,
            pulls: self.pulls,
            stars: self.stars,
            category: Category::from_name(&self.category),
            tags: self.tags,
            latest_tag,
            logo,
        })
    }
}

/// 불변 이미지 카탈로그
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    images: Vec<CatalogImage>,
}

impl Catalog {
    /// 내장 데이터셋을 로드합니다.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_DATASET)
    }

    /// 설정에 따라 데이터셋을 로드합니다.
    ///
    /// `dataset_path`가 비어 있으면 내장 데이터셋을 사용합니다.
    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        if config.dataset_path.is_empty() {
            Self::builtin()
        } else {
            Self::load_from_file(Path::new(&config.dataset_path))
        }
    }

    /// 정규화된 이미지 목록으로 카탈로그를 생성합니다.
    pub fn from_images(images: Vec<CatalogImage>) -> Self {
        metrics::gauge!(m::CATALOG_IMAGES_LOADED).set(images.len() as f64);
        Self { images }
    }

    /// JSON 문자열에서 카탈로그를 파싱합니다.
    ///
    /// JSON 형식: [`RawCatalogImage`] 배열
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let raw: Vec<RawCatalogImage> = serde_json::from_str(json)
            .map_err(|e| CatalogError::Parse(format!("failed to parse catalog JSON: {e}")))?;

        let mut seen = HashSet::new();
        let mut images = Vec::with_capacity(raw.len());
        for record in raw {
            if !seen.insert(record.id.clone()) {
                warn!(id = %record.id, "duplicate catalog record id");
            }
            images.push(record.into_image()?);
        }

        debug!(images = images.len(), "catalog parsed");
        Ok(Self::from_images(images))
    }

    /// JSON 파일에서 카탈로그를 로드합니다.
    ///
    /// # Note
    ///
    /// 이 함수는 동기 I/O를 수행합니다. async 컨텍스트에서 호출할 때는
    /// `tokio::task::spawn_blocking`으로 감싸세요.
    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        let metadata = std::fs::metadata(path).map_err(|e| CatalogError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        if metadata.len() > MAX_DATASET_FILE_SIZE {
            return Err(CatalogError::FileTooBig {
                path: path.display().to_string(),
                size: metadata.len(),
                max: MAX_DATASET_FILE_SIZE,
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CatalogError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        let catalog = Self::from_json(&content)?;
        info!(
            path = %path.display(),
            images = catalog.len(),
            "loaded catalog file"
        );
        Ok(catalog)
    }

    /// 전체 이미지 (로드 순서)
    pub fn images(&self) -> &[CatalogImage] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// 정확한 이름으로 이미지를 찾습니다.
    pub fn find(&self, name: &str) -> Option<&CatalogImage> {
        self.images.iter().find(|img| img.name == name)
    }

    /// 표시 순서대로 정렬된 고정 카테고리 목록
    pub fn categories(&self) -> &'static [Category] {
        &CATEGORIES
    }

    /// 질의에 맞는 이미지를 정렬된 순서로 반환합니다.
    pub fn search(&self, query: &SearchQuery) -> Vec<&CatalogImage> {
        search(&self.images, &query.category, &query.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_dataset_loads() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.len(), 10);
        assert!(catalog.images().iter().all(|img| !img.tags.is_empty()));
    }

    #[test]
    fn builtin_dataset_categories_are_known() {
        let catalog = Catalog::builtin().unwrap();
        for img in catalog.images() {
            assert!(
                !matches!(img.category, Category::Other(_)),
                "{} has unknown category",
                img.name
            );
        }
    }

    #[test]
    fn find_by_exact_name() {
        let catalog = Catalog::builtin().unwrap();
        let redis = catalog.find("redis").unwrap();
        assert_eq!(redis.latest_tag, "7.2");
        assert_eq!(redis.category, Category::Databases);
        assert!(catalog.find("Redis").is_none());
    }

    #[test]
    fn categories_start_with_all() {
        let catalog = Catalog::default();
        let categories = catalog.categories();
        assert_eq!(categories.len(), 10);
        assert!(categories[0].is_all());
    }

    #[test]
    fn image_url_alias_resolves_to_logo() {
        let json = r#"[{
            "id": "1", "name": "nginx", "category": "Web Servers",
            "tags": ["latest"], "imageUrl": "nginx.svg"
        }]"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert_eq!(catalog.images()[0].logo.as_deref(), Some("nginx.svg"));
    }

    #[test]
    fn logo_takes_precedence_over_alias() {
        let json = r#"[{
            "id": "1", "name": "nginx", "category": "Web Servers",
            "tags": ["latest"], "logo": "primary.svg", "imageUrl": "legacy.svg"
        }]"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert_eq!(catalog.images()[0].logo.as_deref(), Some("primary.svg"));
    }

    #[test]
    fn missing_latest_tag_defaults_to_first_tag() {
        let json = r#"[{
            "id": "1", "name": "node", "category": "Programming Languages",
            "tags": ["20", "18"]
        }]"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert_eq!(catalog.images()[0].latest_tag, "20");
    }

    #[test]
    fn empty_tags_rejected() {
        let json = r#"[{ "id": "7", "name": "ghost", "category": "Databases", "tags": [] }]"#;
        let err = Catalog::from_json(json).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidRecord { ref id, .. } if id == "7"));
    }

    #[test]
    fn unknown_category_preserved() {
        let json = r#"[{ "id": "1", "name": "x", "category": "Games", "tags": ["1"] }]"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert_eq!(
            catalog.images()[0].category,
            Category::Other("Games".to_owned())
        );
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = Catalog::from_json("[{").unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[test]
    fn load_from_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Catalog::load_from_file(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }

    #[test]
    fn load_from_file_reads_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("images.json");
        std::fs::write(&path, BUILTIN_DATASET).unwrap();

        let catalog = Catalog::load_from_file(&path).unwrap();
        assert_eq!(catalog.len(), 10);
    }

    #[test]
    fn from_config_empty_path_uses_builtin() {
        let config = CatalogConfig::default();
        let catalog = Catalog::from_config(&config).unwrap();
        assert_eq!(catalog.len(), 10);
    }
}
