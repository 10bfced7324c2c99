//! 도메인 타입: 시스템 전역에서 사용되는 공통 타입
//!
//! 카탈로그 이미지, 선택 엔트리, 서비스 설정, 취약점 요약 등
//! 모든 크레이트가 공유하는 데이터 구조를 정의합니다.

use std::fmt;

use serde::{Deserialize, Serialize};

// ─── Catalog ─────────────────────────────────────────────────────────

/// 카탈로그 카테고리
///
/// 고정된 카테고리 집합입니다. `All`은 필터링하지 않음을 뜻하는 센티넬이며,
/// 외부 데이터에 알 수 없는 카테고리가 있으면 `Other`로 보존합니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    /// 필터 센티넬: 모든 카테고리
    All,
    WebServers,
    Databases,
    ProgrammingLanguages,
    Networking,
    MessageQueues,
    SearchEngines,
    Monitoring,
    CiCd,
    DevelopmentTools,
    /// 고정 집합에 없는 카테고리
    Other(String),
}

impl Category {
    /// 표시 순서대로 정렬된 고정 카테고리 목록 (`All` 포함)
    pub const FIXED: [Category; 10] = [
        Category::All,
        Category::WebServers,
        Category::Databases,
        Category::ProgrammingLanguages,
        Category::Networking,
        Category::MessageQueues,
        Category::SearchEngines,
        Category::Monitoring,
        Category::CiCd,
        Category::DevelopmentTools,
    ];

    /// 카테고리 표시 이름
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => "All",
            Self::WebServers => "Web Servers",
            Self::Databases => "Databases",
            Self::ProgrammingLanguages => "Programming Languages",
            Self::Networking => "Networking",
            Self::MessageQueues => "Message Queues",
            Self::SearchEngines => "Search Engines",
            Self::Monitoring => "Monitoring",
            Self::CiCd => "CI/CD",
            Self::DevelopmentTools => "Development Tools",
            Self::Other(name) => name,
        }
    }

    /// 정확한 표시 이름으로 카테고리를 만듭니다.
    ///
    /// 고정 집합에 없으면 `Other`가 됩니다.
    pub fn from_name(name: &str) -> Self {
        Self::FIXED
            .iter()
            .find(|c| c.as_str() == name)
            .cloned()
            .unwrap_or_else(|| Self::Other(name.to_owned()))
    }

    /// 사용자 입력에서 고정 카테고리를 파싱합니다 (대소문자 구분 없음).
    ///
    /// `web-servers`, `ci/cd`, `cicd` 같은 입력도 허용합니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        let wanted = normalize(s);
        if wanted.is_empty() {
            return None;
        }
        Self::FIXED
            .iter()
            .find(|c| normalize(c.as_str()) == wanted)
            .cloned()
    }

    /// 필터 센티넬인지 여부
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        Self::from_name(&s)
    }
}

impl From<Category> for String {
    fn from(c: Category) -> Self {
        c.as_str().to_owned()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 카탈로그 이미지 레코드
///
/// 세션 시작 시 한 번 로드되며 이후 변경되지 않습니다.
/// 외부 JSON 형식(별칭 필드 포함)은 카탈로그 크레이트의 경계에서 이 타입으로 정규화됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogImage {
    /// 레코드 ID
    pub id: String,
    /// 이미지 이름 (예: `nginx`)
    pub name: String,
    /// 설명
    pub description: String,
    /// Docker 공식 이미지 여부
    pub official: bool,
    /// 검증된 퍼블리셔 여부
    pub verified: bool,
    /// 누적 pull 수
    pub pulls: u64,
    /// 별 개수
    pub stars: u64,
    /// 카테고리
    pub category: Category,
    /// 태그 목록 (비어 있지 않음)
    pub tags: Vec<String>,
    /// 대표 태그
    pub latest_tag: String,
    /// 로고 참조
    pub logo: Option<String>,
}

impl CatalogImage {
    /// `docker.io/{name}:{latest_tag}` 형식의 참조를 반환합니다.
    pub fn reference(&self) -> String {
        format!("docker.io/{}:{}", self.name, self.latest_tag)
    }

    /// 이미지가 해당 태그를 제공하는지 여부
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

impl fmt::Display for CatalogImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} ({}, stars={}, pulls={})",
            self.name, self.latest_tag, self.category, self.stars, self.pulls,
        )
    }
}

// ─── Selection ───────────────────────────────────────────────────────

/// 선택 엔트리: 특정 태그의 카탈로그 이미지 하나
///
/// 저장소 안에서 `(name, tag)` 쌍은 유일합니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectionEntry {
    pub name: String,
    pub tag: String,
}

impl SelectionEntry {
    pub fn new(name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: tag.into(),
        }
    }

    /// 같은 `(name, tag)`를 가리키는지 여부
    pub fn matches(&self, name: &str, tag: &str) -> bool {
        self.name == name && self.tag == tag
    }
}

impl fmt::Display for SelectionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.tag)
    }
}

// ─── Service configuration ───────────────────────────────────────────

/// 포트 매핑 `(host, container, protocol)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortMapping {
    pub host: u16,
    pub container: u16,
    #[serde(default = "default_protocol")]
    pub protocol: String,
}

fn default_protocol() -> String {
    "tcp".to_owned()
}

impl PortMapping {
    /// TCP 포트 매핑을 생성합니다.
    pub fn tcp(host: u16, container: u16) -> Self {
        Self {
            host,
            container,
            protocol: default_protocol(),
        }
    }
}

/// 환경변수 키/값 쌍
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    pub key: String,
    pub value: String,
}

impl EnvVar {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// 볼륨 마운트 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeKind {
    /// 호스트 경로 바인드 마운트
    Bind,
    /// 이름 있는 볼륨
    Volume,
}

/// 볼륨 마운트 `(kind, source, target)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeMount {
    #[serde(rename = "type")]
    pub kind: VolumeKind,
    pub source: String,
    pub target: String,
}

/// 헬스체크 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheck {
    pub test: Vec<String>,
    pub interval: String,
    pub timeout: String,
    pub retries: u32,
}

/// 리소스 한도 (memory, cpus)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSpec {
    pub memory: String,
    pub cpus: String,
}

/// 리소스 limits / reservations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    pub limits: ResourceSpec,
    pub reservations: ResourceSpec,
}

/// 완전히 해석된 서비스 설정
///
/// compose 합성기의 입력입니다. `SelectionEntry`를 이 타입으로 해석하는 일은
/// 외부 협력자(리졸버)의 책임이며, 합성기는 값이 올바르다고 가정합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// 서비스 이름 (compose 블록 키)
    pub name: String,
    /// 이미지 이름
    pub image: String,
    /// 이미지 태그
    pub tag: String,
    #[serde(default)]
    pub ports: Vec<PortMapping>,
    /// 서비스 안에서 키는 유일합니다.
    #[serde(default)]
    pub environment: Vec<EnvVar>,
    #[serde(default)]
    pub volumes: Vec<VolumeMount>,
    #[serde(default)]
    pub networks: Vec<String>,
    #[serde(default)]
    pub depends_on: Vec<String>,
    /// 재시작 정책 (예: `unless-stopped`)
    pub restart: String,
    #[serde(default)]
    pub healthcheck: Option<HealthCheck>,
    #[serde(default)]
    pub resources: Option<Resources>,
}

impl ServiceConfig {
    /// 포트/환경변수/볼륨 없이 최소 설정을 생성합니다.
    pub fn new(
        name: impl Into<String>,
        image: impl Into<String>,
        tag: impl Into<String>,
        restart: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            tag: tag.into(),
            ports: Vec::new(),
            environment: Vec::new(),
            volumes: Vec::new(),
            networks: Vec::new(),
            depends_on: Vec::new(),
            restart: restart.into(),
            healthcheck: None,
            resources: None,
        }
    }

    /// `image:tag` 참조
    pub fn image_ref(&self) -> String {
        format!("{}:{}", self.image, self.tag)
    }
}

// ─── Vulnerability ───────────────────────────────────────────────────

/// 취약점 심각도
///
/// `Ord` 구현으로 비교가 가능합니다 (`Low < Medium < High < Critical`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// 문자열에서 심각도를 파싱합니다 (대소문자 구분 없음).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" | "med" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" | "crit" => Some(Self::Critical),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// 심각도별 취약점 개수 요약
///
/// 합계는 저장하지 않고 [`total`](Self::total)로 계산합니다.
/// 외부 데이터에 `total` 필드가 있어도 무시됩니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VulnerabilitySummary {
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

impl VulnerabilitySummary {
    pub fn new(critical: u32, high: u32, medium: u32, low: u32) -> Self {
        Self {
            critical,
            high,
            medium,
            low,
        }
    }

    /// 전체 취약점 수
    pub fn total(&self) -> u64 {
        u64::from(self.critical) + u64::from(self.high) + u64::from(self.medium) + u64::from(self.low)
    }

    /// 심각도별 개수
    pub fn count(&self, severity: Severity) -> u32 {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }
}

impl fmt::Display for VulnerabilitySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} total (C:{} H:{} M:{} L:{})",
            self.total(),
            self.critical,
            self.high,
            self.medium,
            self.low,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_through_name() {
        for category in Category::FIXED.iter() {
            assert_eq!(&Category::from_name(category.as_str()), category);
        }
    }

    #[test]
    fn category_unknown_name_is_preserved() {
        let category = Category::from_name("Storage");
        assert_eq!(category, Category::Other("Storage".to_owned()));
        assert_eq!(category.to_string(), "Storage");
    }

    #[test]
    fn category_from_str_loose() {
        assert_eq!(Category::from_str_loose("databases"), Some(Category::Databases));
        assert_eq!(Category::from_str_loose("web-servers"), Some(Category::WebServers));
        assert_eq!(Category::from_str_loose("CI/CD"), Some(Category::CiCd));
        assert_eq!(Category::from_str_loose("cicd"), Some(Category::CiCd));
        assert_eq!(Category::from_str_loose("all"), Some(Category::All));
        assert_eq!(Category::from_str_loose("storage"), None);
        assert_eq!(Category::from_str_loose(""), None);
    }

    #[test]
    fn category_serializes_as_display_name() {
        let json = serde_json::to_string(&Category::MessageQueues).unwrap();
        assert_eq!(json, "\"Message Queues\"");
        let parsed: Category = serde_json::from_str("\"Search Engines\"").unwrap();
        assert_eq!(parsed, Category::SearchEngines);
    }

    #[test]
    fn selection_entry_json_shape() {
        let entry = SelectionEntry::new("redis", "7.2");
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"name":"redis","tag":"7.2"}"#);
        assert!(entry.matches("redis", "7.2"));
        assert!(!entry.matches("redis", "7.0"));
        assert_eq!(entry.to_string(), "redis:7.2");
    }

    #[test]
    fn port_mapping_protocol_defaults_to_tcp() {
        let port: PortMapping = serde_json::from_str(r#"{"host":80,"container":80}"#).unwrap();
        assert_eq!(port, PortMapping::tcp(80, 80));
    }

    #[test]
    fn volume_mount_uses_type_field() {
        let mount: VolumeMount =
            serde_json::from_str(r#"{"type":"bind","source":"./a","target":"/a"}"#).unwrap();
        assert_eq!(mount.kind, VolumeKind::Bind);
    }

    #[test]
    fn service_config_image_ref() {
        let svc = ServiceConfig::new("web", "nginx", "1.25.3", "unless-stopped");
        assert_eq!(svc.image_ref(), "nginx:1.25.3");
        assert!(svc.ports.is_empty());
    }

    #[test]
    fn severity_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::High < Severity::Critical);
        assert_eq!(Severity::from_str_loose("CRIT"), Some(Severity::Critical));
        assert_eq!(Severity::from_str_loose("info"), None);
    }

    #[test]
    fn vulnerability_summary_total_ignores_external_total() {
        let summary: VulnerabilitySummary = serde_json::from_str(
            r#"{"critical":2,"high":5,"medium":12,"low":8,"total":99}"#,
        )
        .unwrap();
        assert_eq!(summary.total(), 27);
        assert_eq!(summary.count(Severity::Medium), 12);
        assert_eq!(summary.to_string(), "27 total (C:2 H:5 M:12 L:8)");
    }
}
