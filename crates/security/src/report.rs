//! 스캔 리포트 픽스처
//!
//! 실제 이미지 스캔은 하지 않습니다. 미리 기록된 스캔 결과를 JSON으로 읽어
//! `(image, tag)`로 조회할 수 있게 합니다.
//!
//! 리포트에 기록된 `summary.total`은 읽지 않고 심각도별 개수에서 다시 계산합니다.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use composegenie_core::metrics as m;
use composegenie_core::types::{Severity, VulnerabilitySummary};

use crate::error::SecurityError;
use crate::score::{Recommendation, RecommendationAction, SecurityAssessment};

const BUILTIN_SCANS: &str = include_str!("../data/scans.json");

/// 스캔 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Completed,
    Scanning,
    Failed,
}

/// 리포트에 기록된 개별 취약점
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vulnerability {
    pub cve: String,
    pub severity: Severity,
    /// CVSS 점수
    pub score: f32,
    pub package: String,
    pub installed_version: String,
    #[serde(default)]
    pub fixed_version: Option<String>,
    pub description: String,
    #[serde(default)]
    pub published_date: Option<String>,
    #[serde(default)]
    pub references: Vec<String>,
}

/// 리포트에 기록된 권고 (대안 이미지 포함)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedRecommendation {
    pub action: RecommendationAction,
    pub reason: String,
    #[serde(default)]
    pub alternatives: Vec<String>,
}

/// 이미지 하나의 스캔 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub scan_id: String,
    pub image: String,
    pub tag: String,
    pub status: ScanStatus,
    pub timestamp: String,
    pub summary: VulnerabilitySummary,
    #[serde(default)]
    pub vulnerabilities: Vec<Vulnerability>,
    pub recommendation: RecordedRecommendation,
}

impl ScanReport {
    pub fn image_ref(&self) -> String {
        format!("{}:{}", self.image, self.tag)
    }

    /// 요약 기반 점수/등급/권고
    pub fn assess(&self) -> SecurityAssessment {
        SecurityAssessment::assess(self.summary)
    }

    /// 기록된 취약점 중 해당 심각도만
    pub fn vulnerabilities_with(&self, severity: Severity) -> impl Iterator<Item = &Vulnerability> {
        self.vulnerabilities
            .iter()
            .filter(move |v| v.severity == severity)
    }

    fn validate(&self) -> Result<(), SecurityError> {
        let invalid = |reason: &str| SecurityError::InvalidRecord {
            id: self.scan_id.clone(),
            reason: reason.to_owned(),
        };
        if self.image.trim().is_empty() {
            return Err(invalid("image must not be empty"));
        }
        if self.tag.trim().is_empty() {
            return Err(invalid("tag must not be empty"));
        }

        let derived = Recommendation::derive(&self.summary);
        if derived.action != self.recommendation.action {
            warn!(
                scan_id = %self.scan_id,
                recorded = %self.recommendation.action,
                derived = %derived.action,
                "recorded recommendation disagrees with summary"
            );
        }
        Ok(())
    }
}

/// 불변 스캔 리포트 모음
#[derive(Debug, Clone)]
pub struct ScanFixtures {
    reports: Vec<ScanReport>,
}

impl ScanFixtures {
    /// 내장 스캔 결과 (nginx:1.21.0, postgres:13, redis:7.2)
    pub fn builtin() -> Result<Self, SecurityError> {
        Self::from_json(BUILTIN_SCANS)
    }

    /// JSON 배열에서 리포트를 읽습니다.
    pub fn from_json(json: &str) -> Result<Self, SecurityError> {
        let reports: Vec<ScanReport> = serde_json::from_str(json)
            .map_err(|e| SecurityError::Parse(format!("scan reports: {e}")))?;
        for report in &reports {
            report.validate()?;
        }
        Ok(Self::from_reports(reports))
    }

    pub fn from_reports(reports: Vec<ScanReport>) -> Self {
        let mut by_severity: BTreeMap<Severity, usize> = BTreeMap::new();
        for v in reports.iter().flat_map(|r| &r.vulnerabilities) {
            *by_severity.entry(v.severity).or_default() += 1;
        }
        for (severity, count) in by_severity {
            metrics::gauge!(
                m::SECURITY_FINDINGS_LOADED,
                m::LABEL_SEVERITY => severity.to_string().to_lowercase()
            )
            .set(count as f64);
        }

        debug!(reports = reports.len(), "scan fixtures loaded");
        Self { reports }
    }

    pub fn reports(&self) -> &[ScanReport] {
        &self.reports
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// `(image, tag)`로 리포트를 찾습니다.
    pub fn find(&self, image: &str, tag: &str) -> Option<&ScanReport> {
        self.reports
            .iter()
            .find(|r| r.image == image && r.tag == tag)
    }

    /// 이미지 이름이 같은 모든 리포트
    pub fn for_image<'a>(&'a self, image: &'a str) -> impl Iterator<Item = &'a ScanReport> + 'a {
        self.reports.iter().filter(move |r| r.image == image)
    }
}
