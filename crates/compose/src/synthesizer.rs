//! Compose 합성기 -- 해석된 서비스 목록을 compose 파일 텍스트로 직렬화
//!
//! 같은 입력에 대해 항상 바이트 단위로 같은 출력을 만듭니다.
//! 입력 검증은 하지 않으며 실패하지 않습니다.
//!
//! # 출력 형식
//!
//! ```text
//! version: '3.8'
//!
//! services:
//!   web:
//!     image: nginx:1.25.3
//!     ports:
//!       - "80:80"
//!     restart: unless-stopped
//! ```
//!
//! 서비스 블록 안의 키 순서는 고정입니다:
//! image, ports, environment, volumes, networks, depends_on, restart,
//! healthcheck, deploy. 비어 있는 선택 항목은 생략됩니다.
//! 이름 있는 볼륨과 네트워크는 처음 등장한 순서대로 최상위 섹션에 한 번씩 선언됩니다.

use std::fmt::Write as _;

use tracing::debug;

use composegenie_core::config::ComposeConfig;
use composegenie_core::metrics as m;
use composegenie_core::types::{ResourceSpec, ServiceConfig, VolumeKind};

use crate::yaml::{double_quoted, scalar, single_quoted};

/// 기본 version 마커
pub const DEFAULT_COMPOSE_VERSION: &str = "3.8";

/// 서비스 목록을 기본 version 마커로 합성합니다.
pub fn synthesize(services: &[ServiceConfig]) -> String {
    Synthesizer::default().render(services)
}

/// version 마커를 설정할 수 있는 합성기
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synthesizer {
    version: String,
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self::new(DEFAULT_COMPOSE_VERSION)
    }
}

impl Synthesizer {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }

    pub fn from_config(config: &ComposeConfig) -> Self {
        Self::new(config.version.clone())
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// 서비스 목록을 입력 순서대로 compose 텍스트로 렌더링합니다.
    pub fn render(&self, services: &[ServiceConfig]) -> String {
        let mut out = String::new();
        out.push_str(&format!("version: {}\n\n", single_quoted(&self.version)));
        out.push_str("services:\n");

        for (i, service) in services.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            write_service(&mut out, service);
        }

        let volumes = named_volumes(services);
        if !volumes.is_empty() {
            out.push_str("\nvolumes:\n");
            for name in volumes {
                let _ = writeln!(out, "  {}:", scalar(name));
            }
        }

        let networks = networks(services);
        if !networks.is_empty() {
            out.push_str("\nnetworks:\n");
            for name in networks {
                let _ = writeln!(out, "  {}:", scalar(name));
            }
        }

        metrics::counter!(m::COMPOSE_DOCUMENTS_TOTAL).increment(1);
        metrics::counter!(m::COMPOSE_SERVICES_TOTAL).increment(services.len() as u64);
        debug!(
            services = services.len(),
            bytes = out.len(),
            "compose document synthesized"
        );

        out
    }
}

fn write_service(out: &mut String, service: &ServiceConfig) {
    let _ = writeln!(out, "  {}:", scalar(&service.name));
    let _ = writeln!(out, "    image: {}", scalar(&service.image_ref()));

    if !service.ports.is_empty() {
        out.push_str("    ports:\n");
        for port in &service.ports {
            let mapping = if port.protocol.eq_ignore_ascii_case("tcp") {
                format!("{}:{}", port.host, port.container)
            } else {
                format!(
                    "{}:{}/{}",
                    port.host,
                    port.container,
                    port.protocol.to_ascii_lowercase()
                )
            };
            let _ = writeln!(out, "      - {}", double_quoted(&mapping));
        }
    }

    if !service.environment.is_empty() {
        out.push_str("    environment:\n");
        for env in &service.environment {
            let _ = writeln!(out, "      {}: {}", scalar(&env.key), scalar(&env.value));
        }
    }

    if !service.volumes.is_empty() {
        out.push_str("    volumes:\n");
        for volume in &service.volumes {
            let mount = format!("{}:{}", volume.source, volume.target);
            let _ = writeln!(out, "      - {}", scalar(&mount));
        }
    }

    write_list(out, "networks", &service.networks);
    write_list(out, "depends_on", &service.depends_on);

    let _ = writeln!(out, "    restart: {}", scalar(&service.restart));

    if let Some(health) = &service.healthcheck {
        out.push_str("    healthcheck:\n");
        let test = health
            .test
            .iter()
            .map(|t| double_quoted(t))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(out, "      test: [{test}]");
        let _ = writeln!(out, "      interval: {}", scalar(&health.interval));
        let _ = writeln!(out, "      timeout: {}", scalar(&health.timeout));
        let _ = writeln!(out, "      retries: {}", health.retries);
    }

    if let Some(resources) = &service.resources {
        out.push_str("    deploy:\n");
        out.push_str("      resources:\n");
        write_resource_spec(out, "limits", &resources.limits);
        write_resource_spec(out, "reservations", &resources.reservations);
    }
}

fn write_list(out: &mut String, key: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "    {key}:");
    for item in items {
        let _ = writeln!(out, "      - {}", scalar(item));
    }
}

fn write_resource_spec(out: &mut String, key: &str, spec: &ResourceSpec) {
    let _ = writeln!(out, "        {key}:");
    let _ = writeln!(out, "          memory: {}", scalar(&spec.memory));
    let _ = writeln!(out, "          cpus: {}", single_quoted(&spec.cpus));
}

/// 이름 있는 볼륨 (처음 등장 순서, 중복 제거)
fn named_volumes(services: &[ServiceConfig]) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for volume in services.iter().flat_map(|s| &s.volumes) {
        if volume.kind == VolumeKind::Volume && !names.contains(&volume.source.as_str()) {
            names.push(&volume.source);
        }
    }
    names
}

/// 참조된 네트워크 (처음 등장 순서, 중복 제거)
fn networks(services: &[ServiceConfig]) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for network in services.iter().flat_map(|s| &s.networks) {
        if !names.contains(&network.as_str()) {
            names.push(network);
        }
    }
    names
}
