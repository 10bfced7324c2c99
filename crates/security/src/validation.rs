//! compose 파일 검증 결과 픽스처
//!
//! 검증기 자체는 없습니다. 미리 기록된 검증 결과를 읽어 ID로 조회하고,
//! 이슈를 심각도별로 나눠 볼 수 있게 합니다.
//!
//! `overall`에 기록된 blocker/warning/suggestion 개수는 참고용입니다.
//! 실제 개수는 [`ValidationResult::issue_counts`]가 이슈 목록에서 다시 셉니다.
//! 둘이 다르면 로드 시 경고만 남깁니다.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use composegenie_core::metrics as m;

use crate::error::SecurityError;

const BUILTIN_VALIDATIONS: &str = include_str!("../data/validations.json");

/// 이슈 심각도
///
/// `Suggestion < Warning < Blocker` 순으로 비교됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Suggestion,
    Warning,
    Blocker,
}

impl IssueSeverity {
    pub const ALL: [IssueSeverity; 3] = [Self::Blocker, Self::Warning, Self::Suggestion];

    /// 대소문자 구분 없이 파싱합니다. 복수형도 받습니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "blocker" | "blockers" => Some(Self::Blocker),
            "warning" | "warnings" | "warn" => Some(Self::Warning),
            "suggestion" | "suggestions" => Some(Self::Suggestion),
            _ => None,
        }
    }
}

impl fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blocker => write!(f, "blocker"),
            Self::Warning => write!(f, "warning"),
            Self::Suggestion => write!(f, "suggestion"),
        }
    }
}

/// 이슈 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    PortConflict,
    Environment,
    Resource,
    Volume,
    Network,
    Security,
    BestPractice,
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::PortConflict => "port_conflict",
            Self::Environment => "environment",
            Self::Resource => "resource",
            Self::Volume => "volume",
            Self::Network => "network",
            Self::Security => "security",
            Self::BestPractice => "best_practice",
        };
        f.write_str(s)
    }
}

/// 검증 이슈 하나
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub id: String,
    pub severity: IssueSeverity,
    pub category: IssueCategory,
    #[serde(default)]
    pub service: Option<String>,
    pub message: String,
    /// compose 파일 내 줄 번호 (1부터)
    #[serde(default)]
    pub line: Option<u32>,
    pub suggestion: String,
    #[serde(default)]
    pub auto_fix: bool,
    #[serde(default)]
    pub documentation: Option<String>,
}

/// 심각도별 이슈 개수
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCounts {
    pub blockers: u32,
    pub warnings: u32,
    pub suggestions: u32,
}

impl IssueCounts {
    pub fn get(&self, severity: IssueSeverity) -> u32 {
        match severity {
            IssueSeverity::Blocker => self.blockers,
            IssueSeverity::Warning => self.warnings,
            IssueSeverity::Suggestion => self.suggestions,
        }
    }

    pub fn total(&self) -> u32 {
        self.blockers + self.warnings + self.suggestions
    }

    fn bump(&mut self, severity: IssueSeverity) {
        match severity {
            IssueSeverity::Blocker => self.blockers += 1,
            IssueSeverity::Warning => self.warnings += 1,
            IssueSeverity::Suggestion => self.suggestions += 1,
        }
    }
}

impl fmt::Display for IssueCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} blockers, {} warnings, {} suggestions",
            self.blockers, self.warnings, self.suggestions
        )
    }
}

/// 검증 결과 요약
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOverall {
    pub valid: bool,
    /// 0..=100
    pub score: u32,
    /// 기록된 개수 (다시 계산하지 않음)
    #[serde(flatten)]
    pub recorded: IssueCounts,
}

/// compose 파일 하나에 대한 검증 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub validation_id: String,
    pub timestamp: String,
    pub overall: ValidationOverall,
    #[serde(default)]
    pub issues: Vec<ValidationIssue>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl ValidationResult {
    /// 이슈 목록에서 다시 센 개수
    pub fn issue_counts(&self) -> IssueCounts {
        let mut counts = IssueCounts::default();
        for issue in &self.issues {
            counts.bump(issue.severity);
        }
        counts
    }

    pub fn issues_with(&self, severity: IssueSeverity) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |i| i.severity == severity)
    }

    pub fn has_blockers(&self) -> bool {
        self.issues
            .iter()
            .any(|i| i.severity == IssueSeverity::Blocker)
    }

    /// 자동 수정 가능한 이슈
    pub fn auto_fixable(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.auto_fix)
    }

    fn validate(&self) -> Result<(), SecurityError> {
        let invalid = |reason: String| SecurityError::InvalidRecord {
            id: self.validation_id.clone(),
            reason,
        };
        if self.validation_id.trim().is_empty() {
            return Err(invalid("validation id must not be empty".to_owned()));
        }
        if self.overall.score > 100 {
            return Err(invalid(format!(
                "score {} is out of range 0..=100",
                self.overall.score
            )));
        }

        let mut seen = HashSet::new();
        for issue in &self.issues {
            if issue.id.trim().is_empty() {
                return Err(invalid("issue id must not be empty".to_owned()));
            }
            if !seen.insert(issue.id.as_str()) {
                return Err(invalid(format!("duplicate issue id '{}'", issue.id)));
            }
        }

        if self.overall.valid && self.has_blockers() {
            return Err(invalid("marked valid but has blocker issues".to_owned()));
        }

        let counted = self.issue_counts();
        if counted != self.overall.recorded {
            warn!(
                validation_id = %self.validation_id,
                recorded = %self.overall.recorded,
                counted = %counted,
                "recorded issue counts disagree with issue list"
            );
        }
        Ok(())
    }
}

/// 불변 검증 결과 모음
#[derive(Debug, Clone)]
pub struct ValidationFixtures {
    results: Vec<ValidationResult>,
}

impl ValidationFixtures {
    /// 내장 검증 결과 (val_001)
    pub fn builtin() -> Result<Self, SecurityError> {
        Self::from_json(BUILTIN_VALIDATIONS)
    }

    pub fn from_json(json: &str) -> Result<Self, SecurityError> {
        let results: Vec<ValidationResult> = serde_json::from_str(json)
            .map_err(|e| SecurityError::Parse(format!("validation results: {e}")))?;

        let mut seen = HashSet::new();
        for result in &results {
            result.validate()?;
            if !seen.insert(result.validation_id.as_str()) {
                return Err(SecurityError::InvalidRecord {
                    id: result.validation_id.clone(),
                    reason: "duplicate validation id".to_owned(),
                });
            }
        }
        Ok(Self::from_results(results))
    }

    pub fn from_results(results: Vec<ValidationResult>) -> Self {
        let mut totals = IssueCounts::default();
        for issue in results.iter().flat_map(|r| &r.issues) {
            totals.bump(issue.severity);
        }
        for severity in IssueSeverity::ALL {
            metrics::gauge!(
                m::VALIDATION_ISSUES_LOADED,
                m::LABEL_SEVERITY => severity.to_string()
            )
            .set(f64::from(totals.get(severity)));
        }

        debug!(results = results.len(), issues = totals.total(), "validation fixtures loaded");
        Self { results }
    }

    pub fn results(&self) -> &[ValidationResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn find(&self, validation_id: &str) -> Option<&ValidationResult> {
        self.results
            .iter()
            .find(|r| r.validation_id == validation_id)
    }

    /// 가장 나중에 기록된 결과 (RFC 3339 문자열 비교)
    pub fn latest(&self) -> Option<&ValidationResult> {
        self.results.iter().max_by(|a, b| a.timestamp.cmp(&b.timestamp))
    }
}
