//! 보안 점수 계산
//!
//! 취약점 요약을 0~100 사이의 점수로 변환합니다.
//!
//! ```text
//! raw   = critical*10 + high*5 + medium*2 + low
//! score = max(0, 100 - raw)
//! ```
//!
//! 점수는 어떤 심각도의 개수가 늘어나도 올라가지 않으며, 0 아래로 내려가지 않습니다.
//! 큰 입력에서도 산술이 넘치지 않도록 포화 연산을 사용합니다.

use std::fmt;

use serde::Serialize;

use composegenie_core::metrics as m;
use composegenie_core::types::VulnerabilitySummary;

/// 만점
pub const MAX_SCORE: u8 = 100;

const CRITICAL_WEIGHT: u64 = 10;
const HIGH_WEIGHT: u64 = 5;
const MEDIUM_WEIGHT: u64 = 2;
const LOW_WEIGHT: u64 = 1;

/// 가중 감점 합계
pub fn penalty(summary: &VulnerabilitySummary) -> u64 {
    [
        (summary.critical, CRITICAL_WEIGHT),
        (summary.high, HIGH_WEIGHT),
        (summary.medium, MEDIUM_WEIGHT),
        (summary.low, LOW_WEIGHT),
    ]
    .iter()
    .fold(0u64, |acc, &(count, weight)| {
        acc.saturating_add(u64::from(count).saturating_mul(weight))
    })
}

/// 취약점 요약의 보안 점수 (0~100)
pub fn score(summary: &VulnerabilitySummary) -> u8 {
    let remaining = u64::from(MAX_SCORE).saturating_sub(penalty(summary));
    u8::try_from(remaining).unwrap_or(0)
}

/// 표시용 등급
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SecurityGrade {
    A,
    B,
    C,
    D,
    F,
}

impl SecurityGrade {
    /// A ≥ 90, B ≥ 75, C ≥ 50, D ≥ 25, 나머지 F
    pub fn from_score(score: u8) -> Self {
        match score {
            90.. => Self::A,
            75..=89 => Self::B,
            50..=74 => Self::C,
            25..=49 => Self::D,
            _ => Self::F,
        }
    }
}

impl fmt::Display for SecurityGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        };
        f.write_str(letter)
    }
}

/// 권고 동작
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationAction {
    Allow,
    Warn,
    Block,
}

impl fmt::Display for RecommendationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => write!(f, "allow"),
            Self::Warn => write!(f, "warn"),
            Self::Block => write!(f, "block"),
        }
    }
}

/// 요약에서 유도한 권고
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub action: RecommendationAction,
    pub reason: String,
}

impl Recommendation {
    /// critical이 있으면 block, high가 있으면 warn, 그 외에는 allow
    pub fn derive(summary: &VulnerabilitySummary) -> Self {
        if summary.critical > 0 {
            Self {
                action: RecommendationAction::Block,
                reason: format!(
                    "Contains {} critical {}",
                    summary.critical,
                    plural(summary.critical)
                ),
            }
        } else if summary.high > 0 {
            Self {
                action: RecommendationAction::Warn,
                reason: format!(
                    "Contains {} high severity {}",
                    summary.high,
                    plural(summary.high)
                ),
            }
        } else {
            Self {
                action: RecommendationAction::Allow,
                reason: "No critical or high vulnerabilities found".to_owned(),
            }
        }
    }
}

fn plural(count: u32) -> &'static str {
    if count == 1 {
        "vulnerability"
    } else {
        "vulnerabilities"
    }
}

/// 점수, 등급, 권고를 한 번에 담은 평가 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityAssessment {
    pub summary: VulnerabilitySummary,
    pub score: u8,
    pub grade: SecurityGrade,
    pub recommendation: Recommendation,
}

impl SecurityAssessment {
    pub fn assess(summary: VulnerabilitySummary) -> Self {
        let score = score(&summary);
        let recommendation = Recommendation::derive(&summary);
        metrics::counter!(
            m::SECURITY_SCORES_TOTAL,
            m::LABEL_RECOMMENDATION => recommendation.action.to_string()
        )
        .increment(1);

        Self {
            summary,
            score,
            grade: SecurityGrade::from_score(score),
            recommendation,
        }
    }
}
