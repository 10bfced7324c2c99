//! ComposeGenie 보안 점수
//!
//! 취약점 요약을 점수와 권고로 변환하고, 미리 기록된 스캔 리포트, compose
//! 검증 결과, 사용 통계를 제공합니다.
//!
//! # 모듈 구조
//!
//! - [`score`]: 점수 계산, 등급, 권고 유도
//! - [`report`]: 스캔 리포트 픽스처와 `(image, tag)` 조회
//! - [`validation`]: compose 검증 결과 픽스처와 ID 조회
//! - [`stats`]: 사용 통계 스냅샷과 취약점 추이
//! - [`error`]: 픽스처 로딩 에러
//!
//! # 사용 예시
//!
//! ```
//! use composegenie_core::VulnerabilitySummary;
//! use composegenie_security::score;
//!
//! assert_eq!(score(&VulnerabilitySummary::new(2, 5, 12, 8)), 23);
//! assert_eq!(score(&VulnerabilitySummary::default()), 100);
//! ```

pub mod error;
pub mod report;
pub mod score;
pub mod stats;
pub mod validation;

pub use error::SecurityError;
pub use report::{RecordedRecommendation, ScanFixtures, ScanReport, ScanStatus, Vulnerability};
pub use score::{
    MAX_SCORE, Recommendation, RecommendationAction, SecurityAssessment, SecurityGrade, penalty,
    score,
};
pub use stats::{ImageScanCount, TrendPoint, UsageStats};
pub use validation::{
    IssueCategory, IssueCounts, IssueSeverity, ValidationFixtures, ValidationIssue,
    ValidationOverall, ValidationResult,
};
