//! 사용 통계 스냅샷
//!
//! 대시보드용 집계 수치와 일별 취약점 추이입니다. 수집기는 없고, 기록된
//! 스냅샷 하나를 읽어 파생 수치(차단 비율, 추이 변화량)를 계산합니다.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use composegenie_core::types::VulnerabilitySummary;

use crate::error::SecurityError;
use crate::score::score;

const BUILTIN_USAGE: &str = include_str!("../data/usage.json");

/// 이미지별 스캔 횟수
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageScanCount {
    pub image: String,
    pub count: u64,
}

/// 하루치 취약점 개수
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// `YYYY-MM-DD`
    pub date: String,
    #[serde(flatten)]
    pub summary: VulnerabilitySummary,
}

impl TrendPoint {
    /// 그날 개수를 점수 공식에 넣은 값
    pub fn score(&self) -> u8 {
        score(&self.summary)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    pub total_scans: u64,
    pub scans_today: u64,
    /// 초
    pub average_scan_time: f64,
    pub blocked_downloads: u64,
    pub total_validations: u64,
    pub validations_today: u64,
    #[serde(default)]
    pub most_scanned_images: Vec<ImageScanCount>,
    /// 날짜 오름차순
    #[serde(default)]
    pub vulnerability_trends: Vec<TrendPoint>,
}

impl UsageStats {
    /// 내장 스냅샷 (2025-10-01 기준)
    pub fn builtin() -> Result<Self, SecurityError> {
        Self::from_json(BUILTIN_USAGE)
    }

    pub fn from_json(json: &str) -> Result<Self, SecurityError> {
        let stats: UsageStats = serde_json::from_str(json)
            .map_err(|e| SecurityError::Parse(format!("usage stats: {e}")))?;
        stats.validate()?;
        debug!(
            total_scans = stats.total_scans,
            trend_days = stats.vulnerability_trends.len(),
            "usage stats loaded"
        );
        Ok(stats)
    }

    /// 전체 스캔 중 차단된 비율 (0.0..=1.0). 스캔이 없으면 0.
    pub fn block_rate(&self) -> f64 {
        if self.total_scans == 0 {
            return 0.0;
        }
        self.blocked_downloads as f64 / self.total_scans as f64
    }

    /// 가장 많이 스캔된 이미지부터 최대 `n`개
    pub fn top_images(&self, n: usize) -> Vec<&ImageScanCount> {
        let mut images: Vec<&ImageScanCount> = self.most_scanned_images.iter().collect();
        images.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.image.cmp(&b.image)));
        images.truncate(n);
        images
    }

    pub fn latest_trend(&self) -> Option<&TrendPoint> {
        self.vulnerability_trends.last()
    }

    /// 첫날 대비 마지막 날의 전체 취약점 증감. 추이가 없으면 `None`.
    pub fn trend_change(&self) -> Option<i64> {
        let first = self.vulnerability_trends.first()?;
        let last = self.vulnerability_trends.last()?;
        Some(last.summary.total() as i64 - first.summary.total() as i64)
    }

    fn validate(&self) -> Result<(), SecurityError> {
        let invalid = |id: &str, reason: String| SecurityError::InvalidRecord {
            id: id.to_owned(),
            reason,
        };
        if self.scans_today > self.total_scans {
            return Err(invalid(
                "scansToday",
                format!("{} exceeds totalScans {}", self.scans_today, self.total_scans),
            ));
        }
        if self.validations_today > self.total_validations {
            return Err(invalid(
                "validationsToday",
                format!(
                    "{} exceeds totalValidations {}",
                    self.validations_today, self.total_validations
                ),
            ));
        }
        if self.blocked_downloads > self.total_scans {
            return Err(invalid(
                "blockedDownloads",
                format!(
                    "{} exceeds totalScans {}",
                    self.blocked_downloads, self.total_scans
                ),
            ));
        }
        if !self.average_scan_time.is_finite() || self.average_scan_time < 0.0 {
            return Err(invalid(
                "averageScanTime",
                format!("{} is not a valid duration", self.average_scan_time),
            ));
        }

        let mut seen = HashSet::new();
        for entry in &self.most_scanned_images {
            if entry.image.trim().is_empty() {
                return Err(invalid("mostScannedImages", "image must not be empty".to_owned()));
            }
            if !seen.insert(entry.image.as_str()) {
                return Err(invalid(&entry.image, "image listed twice".to_owned()));
            }
        }

        // ISO 날짜는 문자열 순서가 곧 날짜 순서
        for pair in self.vulnerability_trends.windows(2) {
            if pair[0].date >= pair[1].date {
                return Err(invalid(
                    &pair[1].date,
                    format!("trend dates must be strictly ascending (after {})", pair[0].date),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builtin() -> UsageStats {
        UsageStats::builtin().expect("embedded usage stats are valid")
    }

    fn stats_json(extra: &str) -> String {
        format!(
            r#"{{"totalScans": 10, "scansToday": 1, "averageScanTime": 3.0,
                "blockedDownloads": 2, "totalValidations": 5, "validationsToday": 0
                {extra}}}"#
        )
    }

    #[test]
    fn builtin_snapshot() {
        let stats = builtin();
        assert_eq!(stats.total_scans, 15234);
        assert_eq!(stats.validations_today, 142);
        assert_eq!(stats.most_scanned_images.len(), 5);
        assert_eq!(stats.vulnerability_trends.len(), 7);
        assert!((stats.average_scan_time - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn block_rate() {
        let rate = builtin().block_rate();
        assert!((rate - 1847.0 / 15234.0).abs() < 1e-9);

        let empty = UsageStats::from_json(
            r#"{"totalScans": 0, "scansToday": 0, "averageScanTime": 0,
                "blockedDownloads": 0, "totalValidations": 0, "validationsToday": 0}"#,
        )
        .unwrap();
        assert_eq!(empty.block_rate(), 0.0);
        assert_eq!(empty.trend_change(), None);
    }

    #[test]
    fn trend_points_flatten_counts() {
        let stats = builtin();
        let latest = stats.latest_trend().unwrap();
        assert_eq!(latest.date, "2025-10-01");
        assert_eq!(latest.summary, VulnerabilitySummary::new(28, 102, 310, 855));
        assert_eq!(latest.score(), 0);
        assert_eq!(stats.trend_change(), Some(-100));
    }

    #[test]
    fn top_images_sorted_and_truncated() {
        let stats = builtin();
        let top: Vec<&str> = stats.top_images(3).iter().map(|i| i.image.as_str()).collect();
        assert_eq!(top, vec!["nginx", "postgres", "redis"]);
        assert_eq!(stats.top_images(50).len(), 5);
    }

    #[test]
    fn rejects_today_above_total() {
        let json = stats_json("").replace("\"scansToday\": 1", "\"scansToday\": 11");
        let err = UsageStats::from_json(&json).unwrap_err();
        assert!(matches!(err, SecurityError::InvalidRecord { ref id, .. } if id == "scansToday"));
    }

    #[test]
    fn rejects_unordered_trend_dates() {
        let json = stats_json(
            r#", "vulnerabilityTrends": [
                {"date": "2025-09-26", "critical": 1, "high": 0, "medium": 0, "low": 0},
                {"date": "2025-09-26", "critical": 1, "high": 0, "medium": 0, "low": 0}]"#,
        );
        let err = UsageStats::from_json(&json).unwrap_err();
        assert!(err.to_string().contains("strictly ascending"));
    }

    #[test]
    fn rejects_duplicate_image() {
        let json = stats_json(
            r#", "mostScannedImages": [{"image": "nginx", "count": 2}, {"image": "nginx", "count": 1}]"#,
        );
        assert!(UsageStats::from_json(&json).is_err());
    }

    #[test]
    fn rejects_negative_scan_time() {
        let json = stats_json("").replace("3.0", "-1.0");
        assert!(UsageStats::from_json(&json).is_err());
    }
}
