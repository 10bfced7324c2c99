//! 보안 점수 속성 테스트
//!
//! - 점수 범위 (0~100)
//! - 단조성: 어떤 심각도의 개수가 늘어도 점수가 오르지 않음
//! - 권고와 점수의 일관성

use composegenie_core::types::{Severity, VulnerabilitySummary};
use composegenie_security::{
    Recommendation, RecommendationAction, ScanFixtures, SecurityAssessment, SecurityGrade, score,
};

const SEVERITIES: [Severity; 4] = [
    Severity::Critical,
    Severity::High,
    Severity::Medium,
    Severity::Low,
];

fn bump(summary: VulnerabilitySummary, severity: Severity) -> VulnerabilitySummary {
    let mut next = summary;
    match severity {
        Severity::Critical => next.critical = next.critical.saturating_add(1),
        Severity::High => next.high = next.high.saturating_add(1),
        Severity::Medium => next.medium = next.medium.saturating_add(1),
        Severity::Low => next.low = next.low.saturating_add(1),
    }
    next
}

fn sample_summaries() -> Vec<VulnerabilitySummary> {
    let counts = [0u32, 1, 3, 9, 40, u32::MAX - 1];
    let mut out = Vec::new();
    for &c in &counts {
        for &h in &counts {
            out.push(VulnerabilitySummary::new(c, h, h / 2, c / 3));
        }
    }
    out
}

#[test]
fn score_is_always_within_bounds() {
    for summary in sample_summaries() {
        assert!(score(&summary) <= 100, "{summary}");
    }
}

#[test]
fn score_never_increases_when_counts_grow() {
    for summary in sample_summaries() {
        let before = score(&summary);
        for severity in SEVERITIES {
            let after = score(&bump(summary, severity));
            assert!(after <= before, "{summary} + {severity}: {before} -> {after}");
        }
    }
}

#[test]
fn scenario_mixed_summary() {
    let summary = VulnerabilitySummary::new(2, 5, 12, 8);
    let assessment = SecurityAssessment::assess(summary);
    assert_eq!(assessment.score, 23);
    assert_eq!(assessment.grade, SecurityGrade::F);
    assert_eq!(assessment.recommendation.action, RecommendationAction::Block);
}

#[test]
fn clean_summary_is_allowed_with_full_marks() {
    let assessment = SecurityAssessment::assess(VulnerabilitySummary::default());
    assert_eq!(assessment.score, 100);
    assert_eq!(assessment.grade, SecurityGrade::A);
    assert_eq!(
        assessment.recommendation,
        Recommendation::derive(&VulnerabilitySummary::default())
    );
}

#[test]
fn block_always_outranks_warn() {
    for summary in sample_summaries() {
        let action = Recommendation::derive(&summary).action;
        match (summary.critical, summary.high) {
            (c, _) if c > 0 => assert_eq!(action, RecommendationAction::Block),
            (0, h) if h > 0 => assert_eq!(action, RecommendationAction::Warn),
            _ => assert_eq!(action, RecommendationAction::Allow),
        }
    }
}

#[test]
fn fixture_scores() {
    let fixtures = ScanFixtures::builtin().unwrap();
    let scores: Vec<(String, u8)> = fixtures
        .reports()
        .iter()
        .map(|r| (r.image_ref(), r.assess().score))
        .collect();
    assert_eq!(
        scores,
        vec![
            ("nginx:1.21.0".to_owned(), 23),
            ("postgres:13".to_owned(), 54),
            ("redis:7.2".to_owned(), 91),
        ]
    );
}

#[test]
fn assessment_serializes_for_reports() {
    let json = serde_json::to_value(SecurityAssessment::assess(VulnerabilitySummary::new(
        0, 3, 8, 15,
    )))
    .unwrap();
    assert_eq!(json["score"], 54);
    assert_eq!(json["grade"], "C");
    assert_eq!(json["recommendation"]["action"], "warn");
}
