//! compose 템플릿 카탈로그
//!
//! 미리 구성된 서비스 묶음(LAMP, ELK 등)의 메타데이터입니다. 템플릿 본문은
//! 담지 않으며, 목록 화면과 ID 조회에 필요한 정보만 제공합니다.
//!
//! # 로드 시 검사
//!
//! - `id`, `name`은 비어 있을 수 없습니다.
//! - `id`는 유일해야 합니다 ([`TemplateCatalog::find`]가 하나만 돌려주기 때문).
//! - `services`는 1 이상이어야 합니다.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use composegenie_core::metrics as m;

use crate::error::CatalogError;

const BUILTIN_TEMPLATES: &str = include_str!("../data/templates.json");

/// 템플릿 하나의 메타데이터
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    pub description: String,
    /// 자유 형식 분류 (`Web Applications`, `CMS`, ...)
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub icon: Option<String>,
    /// 템플릿이 만드는 서비스 수
    pub services: u32,
    pub popularity: u64,
    pub version: String,
    pub last_updated: String,
    pub author: String,
}

impl Template {
    fn validate(&self) -> Result<(), CatalogError> {
        let invalid = |reason: &str| CatalogError::InvalidRecord {
            id: self.id.clone(),
            reason: reason.to_owned(),
        };
        if self.id.trim().is_empty() {
            return Err(invalid("template id must not be empty"));
        }
        if self.name.trim().is_empty() {
            return Err(invalid("template name must not be empty"));
        }
        if self.services == 0 {
            return Err(invalid("template must contain at least one service"));
        }
        Ok(())
    }
}

/// 불변 템플릿 모음
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    templates: Vec<Template>,
}

impl TemplateCatalog {
    /// 내장 템플릿 8종
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_TEMPLATES)
    }

    /// JSON 배열에서 템플릿을 읽고 검사합니다.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let templates: Vec<Template> = serde_json::from_str(json)
            .map_err(|e| CatalogError::Parse(format!("failed to parse template JSON: {e}")))?;

        let mut seen = HashSet::new();
        for template in &templates {
            template.validate()?;
            if !seen.insert(template.id.as_str()) {
                return Err(CatalogError::InvalidRecord {
                    id: template.id.clone(),
                    reason: "duplicate template id".to_owned(),
                });
            }
        }

        Ok(Self::from_templates(templates))
    }

    pub fn from_templates(templates: Vec<Template>) -> Self {
        metrics::gauge!(m::CATALOG_TEMPLATES_LOADED).set(templates.len() as f64);
        debug!(templates = templates.len(), "template catalog loaded");
        Self { templates }
    }

    /// 로드 순서 그대로
    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// ID로 템플릿을 찾습니다.
    pub fn find(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// 등장 순서대로 중복 없는 분류 목록
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.templates
            .iter()
            .map(|t| t.category.as_str())
            .filter(|c| seen.insert(*c))
            .collect()
    }

    /// 분류(대소문자 무시)로 거른 뒤 popularity desc, name asc로 정렬합니다.
    ///
    /// `None`이면 전체를 정렬해 돌려줍니다.
    pub fn list(&self, category: Option<&str>) -> Vec<&Template> {
        let mut listed: Vec<&Template> = self
            .templates
            .iter()
            .filter(|t| category.is_none_or(|c| t.category.eq_ignore_ascii_case(c.trim())))
            .collect();
        listed.sort_by(|a, b| popularity_order(a, b));
        listed
    }
}

fn popularity_order(a: &Template, b: &Template) -> Ordering {
    b.popularity
        .cmp(&a.popularity)
        .then_with(|| a.name.cmp(&b.name))
}
