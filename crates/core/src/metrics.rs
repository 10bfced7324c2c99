//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 크레이트는 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`
//! 매크로를 호출합니다. 레코더가 설치되지 않았으면 기록은 무시됩니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `composegenie_`
//! - 모듈명: `catalog_`, `selection_`, `compose_`, `security_`, `validation_`
//! - 접미어: `_total` (counter), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(composegenie_core::metrics::CATALOG_SEARCHES_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 변경 종류 레이블 키 (added, removed)
pub const LABEL_CHANGE: &str = "change";

/// 심각도 레이블 키 (취약점: low..critical, 검증 이슈: blocker, warning, suggestion)
pub const LABEL_SEVERITY: &str = "severity";

/// 권고 레이블 키 (block, warn, allow)
pub const LABEL_RECOMMENDATION: &str = "recommendation";

// ─── Catalog 메트릭 ────────────────────────────────────────────────

/// Catalog: 실행된 검색 수 (counter)
pub const CATALOG_SEARCHES_TOTAL: &str = "composegenie_catalog_searches_total";

/// Catalog: 로드된 이미지 수 (gauge)
pub const CATALOG_IMAGES_LOADED: &str = "composegenie_catalog_images_loaded";

/// Catalog: 로드된 compose 템플릿 수 (gauge)
pub const CATALOG_TEMPLATES_LOADED: &str = "composegenie_catalog_templates_loaded";

// ─── Selection 메트릭 ──────────────────────────────────────────────

/// Selection: 상태를 바꾼 변경 수 (counter, label: change)
pub const SELECTION_CHANGES_TOTAL: &str = "composegenie_selection_changes_total";

/// Selection: 현재 선택된 엔트리 수 (gauge)
pub const SELECTION_ENTRIES: &str = "composegenie_selection_entries";

/// Selection: 영속화 실패 수 (counter)
pub const SELECTION_PERSIST_FAILURES_TOTAL: &str = "composegenie_selection_persist_failures_total";

/// Selection: 실패한 리스너 호출 수 (counter)
pub const SELECTION_LISTENER_FAILURES_TOTAL: &str =
    "composegenie_selection_listener_failures_total";

// ─── Compose 메트릭 ────────────────────────────────────────────────

/// Compose: 생성된 문서 수 (counter)
pub const COMPOSE_DOCUMENTS_TOTAL: &str = "composegenie_compose_documents_total";

/// Compose: 문서에 포함된 서비스 수 (counter)
pub const COMPOSE_SERVICES_TOTAL: &str = "composegenie_compose_services_total";

// ─── Security 메트릭 ───────────────────────────────────────────────

/// Security: 계산된 점수 수 (counter, label: recommendation)
pub const SECURITY_SCORES_TOTAL: &str = "composegenie_security_scores_total";

/// Security: 로드된 스캔 리포트의 취약점 수 (gauge, label: severity)
pub const SECURITY_FINDINGS_LOADED: &str = "composegenie_security_findings_loaded";

// ─── Validation 메트릭 ─────────────────────────────────────────────

/// Validation: 로드된 검증 결과의 이슈 수 (gauge, label: severity)
pub const VALIDATION_ISSUES_LOADED: &str = "composegenie_validation_issues_loaded";

/// 모든 메트릭의 설명을 등록합니다.
///
/// 레코더 설치 직후 한 번 호출합니다.
/// `metrics::describe_counter!()`, `describe_gauge!()`를 사용합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge};

    // Catalog
    describe_counter!(
        CATALOG_SEARCHES_TOTAL,
        "Total number of catalog searches executed"
    );
    describe_gauge!(
        CATALOG_IMAGES_LOADED,
        "Number of images in the loaded catalog"
    );
    describe_gauge!(
        CATALOG_TEMPLATES_LOADED,
        "Number of compose templates in the loaded template catalog"
    );

    // Selection
    describe_counter!(
        SELECTION_CHANGES_TOTAL,
        "Selection mutations that changed state, by change kind"
    );
    describe_gauge!(SELECTION_ENTRIES, "Current number of selected entries");
    describe_counter!(
        SELECTION_PERSIST_FAILURES_TOTAL,
        "Failed writes to the selection backend"
    );
    describe_counter!(
        SELECTION_LISTENER_FAILURES_TOTAL,
        "Selection listeners that panicked during notification"
    );

    // Compose
    describe_counter!(
        COMPOSE_DOCUMENTS_TOTAL,
        "Total number of compose documents synthesized"
    );
    describe_counter!(
        COMPOSE_SERVICES_TOTAL,
        "Total number of services emitted into compose documents"
    );

    // Security
    describe_counter!(
        SECURITY_SCORES_TOTAL,
        "Security scores computed, by recommendation"
    );
    describe_gauge!(
        SECURITY_FINDINGS_LOADED,
        "Vulnerabilities listed in loaded scan reports, by severity"
    );

    // Validation
    describe_gauge!(
        VALIDATION_ISSUES_LOADED,
        "Issues listed in loaded validation results, by severity"
    );
}
