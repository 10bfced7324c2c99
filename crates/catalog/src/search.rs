//! 필터/정렬 엔진
//!
//! `(dataset, category, query)`를 정렬된 결과 목록으로 바꾸는 순수 함수입니다.
//!
//! # 규칙
//!
//! 1. 카테고리가 `All`이면 카테고리 필터를 적용하지 않고, 그 외에는 정확히 일치해야 합니다.
//! 2. 질의는 앞뒤 공백을 제거합니다. 비어 있으면 텍스트 필터를 적용하지 않습니다.
//! 3. 소문자 질의가 이름, 설명, 태그 중 하나의 소문자 부분 문자열이면 통과합니다.
//! 4. 두 필터는 AND로 결합됩니다.
//! 5. 정렬: 별 개수 내림차순, pull 수 내림차순, 이름 오름차순.
//!
//! 결과는 항상 `search(dataset, All, "")`의 부분 수열입니다.

use std::cmp::Ordering;

use composegenie_core::metrics as m;
use composegenie_core::types::{CatalogImage, Category};

/// 검색 질의 `(category, text)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub category: Category,
    pub text: String,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            category: Category::All,
            text: String::new(),
        }
    }
}

impl SearchQuery {
    pub fn new(category: Category, text: impl Into<String>) -> Self {
        Self {
            category,
            text: text.into(),
        }
    }

    /// 사용자 입력 카테고리를 고정 집합에서 대소문자 구분 없이 찾습니다.
    ///
    /// `"databases"`, `"web-servers"`, `"ci/cd"` 모두 허용됩니다.
    pub fn parse_category(input: &str) -> Option<Category> {
        Category::from_str_loose(input)
    }

    /// 텍스트만 바꾼 새 질의를 반환합니다.
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            category: self.category.clone(),
            text: text.into(),
        }
    }
}

/// 데이터셋을 필터링하고 정렬합니다.
///
/// 부수 효과가 없으며 같은 입력에 대해 항상 같은 순서를 반환합니다.
pub fn search<'a>(
    dataset: &'a [CatalogImage],
    category: &Category,
    query: &str,
) -> Vec<&'a CatalogImage> {
    metrics::counter!(m::CATALOG_SEARCHES_TOTAL).increment(1);

    let needle = query.trim().to_lowercase();

    let mut results: Vec<&CatalogImage> = dataset
        .iter()
        .filter(|img| category.is_all() || img.category == *category)
        .filter(|img| needle.is_empty() || matches_text(img, &needle))
        .collect();

    results.sort_by(|a, b| catalog_order(a, b));

    tracing::trace!(
        category = %category,
        query = %needle,
        results = results.len(),
        "catalog search"
    );

    results
}

/// 소문자 질의가 이름, 설명, 태그 중 하나에 포함되는지 확인합니다.
fn matches_text(img: &CatalogImage, needle: &str) -> bool {
    img.name.to_lowercase().contains(needle)
        || img.description.to_lowercase().contains(needle)
        || img.tags.iter().any(|t| t.to_lowercase().contains(needle))
}

/// 카탈로그 표시 순서: stars desc, pulls desc, name asc
fn catalog_order(a: &CatalogImage, b: &CatalogImage) -> Ordering {
    b.stars
        .cmp(&a.stars)
        .then_with(|| b.pulls.cmp(&a.pulls))
        .then_with(|| a.name.cmp(&b.name))
}

/// 카탈로그 카드의 숫자 표기 (`1.5B`, `12.3K`)
///
/// 10^9, 10^6, 10^3 임계값에서 소수점 한 자리로 축약하며,
/// 1000 미만은 그대로 출력합니다.
pub fn format_count(n: u64) -> String {
    const BILLION: u64 = 1_000_000_000;
    const MILLION: u64 = 1_000_000;
    const THOUSAND: u64 = 1_000;

    if n >= BILLION {
        format!("{:.1}B", n as f64 / BILLION as f64)
    } else if n >= MILLION {
        format!("{:.1}M", n as f64 / MILLION as f64)
    } else if n >= THOUSAND {
        format!("{:.1}K", n as f64 / THOUSAND as f64)
    } else {
        n.to_string()
    }
}
