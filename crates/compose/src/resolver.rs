//! 선택 엔트리 → 서비스 설정 해석
//!
//! [`ServiceResolver`]는 합성기 바깥의 협력자입니다. 잘 알려진 이미지(nginx, postgres,
//! redis)는 내장 프리셋으로, 나머지는 포트/환경변수 없는 기본 설정으로 해석합니다.
//! 태그는 항상 선택 엔트리의 태그를 따릅니다.

use tracing::debug;

use composegenie_core::config::ComposeConfig;
use composegenie_core::types::{
    EnvVar, HealthCheck, PortMapping, ResourceSpec, Resources, SelectionEntry, ServiceConfig,
    VolumeKind, VolumeMount,
};

/// 기본 재시작 정책
pub const DEFAULT_RESTART: &str = "unless-stopped";

/// 선택 엔트리를 완전한 서비스 설정으로 해석
#[derive(Debug, Clone)]
pub struct ServiceResolver {
    default_restart: String,
}

impl Default for ServiceResolver {
    fn default() -> Self {
        Self::new(DEFAULT_RESTART)
    }
}

impl ServiceResolver {
    /// 프리셋이 없는 이미지에 쓸 재시작 정책을 지정합니다.
    pub fn new(default_restart: impl Into<String>) -> Self {
        Self {
            default_restart: default_restart.into(),
        }
    }

    pub fn from_config(config: &ComposeConfig) -> Self {
        Self::new(config.default_restart.clone())
    }

    /// 이미지 이름에 내장 프리셋이 있는지 확인합니다.
    pub fn has_preset(name: &str) -> bool {
        preset(name, "latest").is_some()
    }

    /// 엔트리 하나를 해석합니다. 서비스 이름은 이미지 이름입니다.
    pub fn resolve(&self, entry: &SelectionEntry) -> ServiceConfig {
        match preset(&entry.name, &entry.tag) {
            Some(config) => {
                debug!(image = %entry, "resolved from preset");
                config
            }
            None => ServiceConfig::new(
                entry.name.clone(),
                entry.name.clone(),
                entry.tag.clone(),
                self.default_restart.clone(),
            ),
        }
    }

    /// 선택 목록 전체를 순서대로 해석합니다.
    ///
    /// 같은 이미지가 여러 태그로 선택되면 두 번째부터 `-2`, `-3`, … 접미사를 붙여
    /// 서비스 이름을 유일하게 만듭니다.
    pub fn resolve_all(&self, entries: &[SelectionEntry]) -> Vec<ServiceConfig> {
        let mut services: Vec<ServiceConfig> = Vec::with_capacity(entries.len());

        for entry in entries {
            let mut service = self.resolve(entry);
            let base = service.name.clone();
            let mut n = 2;
            while services.iter().any(|s| s.name == service.name) {
                service.name = format!("{base}-{n}");
                n += 1;
            }
            services.push(service);
        }

        services
    }
}

fn preset(name: &str, tag: &str) -> Option<ServiceConfig> {
    let config = match name {
        "nginx" => {
            let mut svc = ServiceConfig::new("nginx", "nginx", tag, DEFAULT_RESTART);
            svc.ports = vec![PortMapping::tcp(80, 80), PortMapping::tcp(443, 443)];
            svc.environment = vec![
                EnvVar::new("NGINX_HOST", "localhost"),
                EnvVar::new("NGINX_PORT", "80"),
            ];
            svc.volumes = vec![
                mount(VolumeKind::Bind, "./nginx.conf", "/etc/nginx/nginx.conf"),
                mount(VolumeKind::Volume, "nginx_logs", "/var/log/nginx"),
            ];
            svc.networks = vec!["frontend".to_owned()];
            svc.healthcheck = Some(health(
                &["CMD", "curl", "-f", "http://localhost"],
                "30s",
                "10s",
                3,
            ));
            svc.resources = Some(resources(("512M", "0.5"), ("256M", "0.25")));
            svc
        }
        "postgres" => {
            let mut svc = ServiceConfig::new("postgres", "postgres", tag, DEFAULT_RESTART);
            svc.ports = vec![PortMapping::tcp(5432, 5432)];
            svc.environment = vec![
                EnvVar::new("POSTGRES_DB", "myapp"),
                EnvVar::new("POSTGRES_USER", "admin"),
                EnvVar::new("POSTGRES_PASSWORD", "${POSTGRES_PASSWORD}"),
            ];
            svc.volumes = vec![mount(
                VolumeKind::Volume,
                "postgres_data",
                "/var/lib/postgresql/data",
            )];
            svc.networks = vec!["backend".to_owned()];
            svc.healthcheck = Some(health(
                &["CMD-SHELL", "pg_isready -U admin"],
                "10s",
                "5s",
                5,
            ));
            svc.resources = Some(resources(("1G", "1.0"), ("512M", "0.5")));
            svc
        }
        "redis" => {
            let mut svc = ServiceConfig::new("redis", "redis", tag, DEFAULT_RESTART);
            svc.ports = vec![PortMapping::tcp(6379, 6379)];
            svc.volumes = vec![mount(VolumeKind::Volume, "redis_data", "/data")];
            svc.networks = vec!["backend".to_owned()];
            svc.healthcheck = Some(health(&["CMD", "redis-cli", "ping"], "5s", "3s", 3));
            svc.resources = Some(resources(("256M", "0.25"), ("128M", "0.1")));
            svc
        }
        _ => return None,
    };
    Some(config)
}

fn mount(kind: VolumeKind, source: &str, target: &str) -> VolumeMount {
    VolumeMount {
        kind,
        source: source.to_owned(),
        target: target.to_owned(),
    }
}

fn health(test: &[&str], interval: &str, timeout: &str, retries: u32) -> HealthCheck {
    HealthCheck {
        test: test.iter().map(|s| (*s).to_owned()).collect(),
        interval: interval.to_owned(),
        timeout: timeout.to_owned(),
        retries,
    }
}

fn resources(limits: (&str, &str), reservations: (&str, &str)) -> Resources {
    Resources {
        limits: ResourceSpec {
            memory: limits.0.to_owned(),
            cpus: limits.1.to_owned(),
        },
        reservations: ResourceSpec {
            memory: reservations.0.to_owned(),
            cpus: reservations.1.to_owned(),
        },
    }
}
