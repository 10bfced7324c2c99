//! `composegenie security` command handler

use std::io::Write;

use serde::Serialize;

use composegenie_catalog::format_count;
use composegenie_core::types::VulnerabilitySummary;
use composegenie_security::{
    ImageScanCount, RecommendationAction, ScanFixtures, ScanReport, SecurityAssessment,
    SecurityGrade, TrendPoint, UsageStats,
};

use crate::cli::{SecurityAction, SecurityArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `security` command.
pub async fn execute(args: SecurityArgs, writer: &OutputWriter) -> Result<(), CliError> {
    match args.action {
        SecurityAction::Score {
            critical,
            high,
            medium,
            low,
        } => {
            let summary = VulnerabilitySummary::new(critical, high, medium, low);
            writer.render(&ScoreReport::from(SecurityAssessment::assess(summary)))
        }
        SecurityAction::Report { image, tag } => {
            let fixtures = ScanFixtures::builtin()?;
            let report = ReportList::build(&fixtures, image.as_deref(), tag.as_deref())?;
            writer.render(&report)
        }
        SecurityAction::Stats { top } => {
            let stats = UsageStats::builtin()?;
            writer.render(&StatsReport::build(&stats, top))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ScoreReport {
    #[serde(flatten)]
    pub assessment: SecurityAssessment,
    pub total: u64,
}

impl From<SecurityAssessment> for ScoreReport {
    fn from(assessment: SecurityAssessment) -> Self {
        let total = assessment.summary.total();
        Self { assessment, total }
    }
}

impl Render for ScoreReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        let a = &self.assessment;
        writeln!(
            w,
            "Score: {}/100 (grade {})",
            a.score,
            colored_grade(a.grade)
        )?;
        writeln!(w, "Vulnerabilities: {}", a.summary)?;
        writeln!(
            w,
            "Recommendation: {} -- {}",
            colored_action(a.recommendation.action),
            a.recommendation.reason
        )?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct ReportRow {
    pub scan_id: String,
    pub image: String,
    pub tag: String,
    pub timestamp: String,
    pub score: u8,
    pub grade: SecurityGrade,
    pub summary: VulnerabilitySummary,
    pub action: RecommendationAction,
    pub reason: String,
    pub cves: Vec<String>,
    pub alternatives: Vec<String>,
}

impl From<&ScanReport> for ReportRow {
    fn from(report: &ScanReport) -> Self {
        let assessment = report.assess();
        Self {
            scan_id: report.scan_id.clone(),
            image: report.image.clone(),
            tag: report.tag.clone(),
            timestamp: report.timestamp.clone(),
            score: assessment.score,
            grade: assessment.grade,
            summary: report.summary,
            action: report.recommendation.action,
            reason: report.recommendation.reason.clone(),
            cves: report.vulnerabilities.iter().map(|v| v.cve.clone()).collect(),
            alternatives: report.recommendation.alternatives.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReportList {
    pub reports: Vec<ReportRow>,
}

impl ReportList {
    /// Select fixtures by image and optional tag. A filter that matches nothing is an error.
    pub fn build(
        fixtures: &ScanFixtures,
        image: Option<&str>,
        tag: Option<&str>,
    ) -> Result<Self, CliError> {
        let reports: Vec<ReportRow> = fixtures
            .reports()
            .iter()
            .filter(|r| image.is_none_or(|i| r.image == i))
            .filter(|r| tag.is_none_or(|t| r.tag == t))
            .map(ReportRow::from)
            .collect();

        if reports.is_empty() {
            if let Some(image) = image {
                let target = match tag {
                    Some(tag) => format!("{image}:{tag}"),
                    None => image.to_owned(),
                };
                return Err(CliError::Command(format!(
                    "no recorded scan for '{target}'"
                )));
            }
        }
        Ok(Self { reports })
    }
}

impl Render for ReportList {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if self.reports.is_empty() {
            writeln!(w, "No recorded scans.")?;
            return Ok(());
        }

        for report in &self.reports {
            writeln!(
                w,
                "{} {}:{}  score {}/100 (grade {})  {}",
                report.scan_id.dimmed(),
                report.image.bold(),
                report.tag,
                report.score,
                colored_grade(report.grade),
                colored_action(report.action)
            )?;
            writeln!(w, "  {}", report.summary)?;
            writeln!(w, "  {}", report.reason)?;
            if !report.cves.is_empty() {
                writeln!(w, "  CVEs: {}", report.cves.join(", "))?;
            }
            if !report.alternatives.is_empty() {
                writeln!(w, "  Alternatives: {}", report.alternatives.join(", "))?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct TrendRow {
    pub date: String,
    pub summary: VulnerabilitySummary,
    pub total: u64,
}

impl From<&TrendPoint> for TrendRow {
    fn from(point: &TrendPoint) -> Self {
        Self {
            date: point.date.clone(),
            summary: point.summary,
            total: point.summary.total(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatsReport {
    pub total_scans: u64,
    pub scans_today: u64,
    pub average_scan_time: f64,
    pub blocked_downloads: u64,
    /// Percentage of scans that ended in a block, one decimal.
    pub block_rate_percent: f64,
    pub total_validations: u64,
    pub validations_today: u64,
    pub top_images: Vec<ImageScanCount>,
    pub trend: Vec<TrendRow>,
    pub trend_change: Option<i64>,
}

impl StatsReport {
    pub fn build(stats: &UsageStats, top: usize) -> Self {
        Self {
            total_scans: stats.total_scans,
            scans_today: stats.scans_today,
            average_scan_time: stats.average_scan_time,
            blocked_downloads: stats.blocked_downloads,
            block_rate_percent: (stats.block_rate() * 1000.0).round() / 10.0,
            total_validations: stats.total_validations,
            validations_today: stats.validations_today,
            top_images: stats.top_images(top).into_iter().cloned().collect(),
            trend: stats.vulnerability_trends.iter().map(TrendRow::from).collect(),
            trend_change: stats.trend_change(),
        }
    }
}

impl Render for StatsReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "Scans: {} total, {} today (avg {:.1}s)",
            format_count(self.total_scans),
            self.scans_today,
            self.average_scan_time
        )?;
        writeln!(
            w,
            "Blocked downloads: {} ({:.1}%)",
            format_count(self.blocked_downloads),
            self.block_rate_percent
        )?;
        writeln!(
            w,
            "Validations: {} total, {} today",
            format_count(self.total_validations),
            self.validations_today
        )?;

        if !self.top_images.is_empty() {
            writeln!(w, "Most scanned:")?;
            for entry in &self.top_images {
                writeln!(w, "  {:<12} {}", entry.image.bold(), format_count(entry.count))?;
            }
        }

        if !self.trend.is_empty() {
            writeln!(w, "Vulnerability trend:")?;
            for row in &self.trend {
                writeln!(w, "  {}  {}", row.date, row.summary)?;
            }
        }
        if let Some(change) = self.trend_change {
            let label = format!("{change:+}");
            let label = if change <= 0 { label.green() } else { label.red() };
            writeln!(w, "Change over period: {label}")?;
        }
        Ok(())
    }
}

fn colored_grade(grade: SecurityGrade) -> colored::ColoredString {
    use colored::Colorize;

    let letter = grade.to_string();
    match grade {
        SecurityGrade::A | SecurityGrade::B => letter.green(),
        SecurityGrade::C => letter.yellow(),
        SecurityGrade::D | SecurityGrade::F => letter.red(),
    }
}

fn colored_action(action: RecommendationAction) -> colored::ColoredString {
    use colored::Colorize;

    let label = action.to_string().to_uppercase();
    match action {
        RecommendationAction::Allow => label.green(),
        RecommendationAction::Warn => label.yellow(),
        RecommendationAction::Block => label.red().bold(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures() -> ScanFixtures {
        ScanFixtures::builtin().expect("embedded fixtures are valid")
    }

    #[test]
    fn test_score_report_json_shape() {
        let report =
            ScoreReport::from(SecurityAssessment::assess(VulnerabilitySummary::new(2, 5, 12, 8)));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["score"], 23);
        assert_eq!(json["grade"], "F");
        assert_eq!(json["total"], 27);
        assert_eq!(json["recommendation"]["action"], "block");
    }

    #[test]
    fn test_report_list_all() {
        let list = ReportList::build(&fixtures(), None, None).unwrap();
        assert_eq!(list.reports.len(), 3);
    }

    #[test]
    fn test_report_list_by_image_and_tag() {
        let list = ReportList::build(&fixtures(), Some("postgres"), Some("13")).unwrap();
        assert_eq!(list.reports.len(), 1);
        assert_eq!(list.reports[0].score, 54);
        assert_eq!(list.reports[0].cves, vec!["CVE-2023-2454"]);
    }

    #[test]
    fn test_report_list_unknown_image_is_error() {
        let err = ReportList::build(&fixtures(), Some("nginx"), Some("9.9")).unwrap_err();
        assert!(err.to_string().contains("nginx:9.9"));
    }

    #[test]
    fn test_stats_report_from_builtin() {
        let stats = UsageStats::builtin().unwrap();
        let report = StatsReport::build(&stats, 2);
        assert_eq!(report.total_scans, 15234);
        assert_eq!(report.block_rate_percent, 12.1);
        assert_eq!(report.top_images.len(), 2);
        assert_eq!(report.top_images[0].image, "nginx");
        assert_eq!(report.trend.len(), 7);
        assert_eq!(report.trend[0].total, 1395);
        assert_eq!(report.trend_change, Some(-100));
    }

    #[test]
    fn test_stats_text_shows_trend() {
        let stats = UsageStats::builtin().unwrap();
        let mut buffer = Vec::new();
        StatsReport::build(&stats, 5).render_text(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("12.1%"));
        assert!(text.contains("2025-10-01"));
        assert!(text.contains("-100"));
    }

    #[test]
    fn test_report_text_lists_alternatives() {
        let list = ReportList::build(&fixtures(), Some("nginx"), None).unwrap();
        let mut buffer = Vec::new();
        list.render_text(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("nginx:1.25.3"));
        assert!(text.contains("CVE-2021-44228"));
    }
}
