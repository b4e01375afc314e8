//! 모니터링 스냅샷 모델.
//!
//! `GET /api/current-data` 응답과 `monitoring_update` 푸시 페이로드가 같은 형태를 가진다.
//! 메트릭 값은 백분율이지만 상류 이상치로 100을 넘을 수 있으며 클램핑하지 않는다.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 서버 메트릭 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    CpuUsage,
    MemoryUsage,
    DiskUsage,
    NetworkTraffic,
}

impl MetricKind {
    /// 카드/대시보드 표시 순서
    pub const ALL: [MetricKind; 4] = [
        MetricKind::CpuUsage,
        MetricKind::MemoryUsage,
        MetricKind::DiskUsage,
        MetricKind::NetworkTraffic,
    ];

    /// 와이어 이름 (`cpu_usage`)
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::CpuUsage => "cpu_usage",
            MetricKind::MemoryUsage => "memory_usage",
            MetricKind::DiskUsage => "disk_usage",
            MetricKind::NetworkTraffic => "network_traffic",
        }
    }

    /// 알림 문구용 라벨 (`cpu usage`)
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }

    /// 카드용 짧은 라벨
    pub fn short_label(&self) -> &'static str {
        match self {
            MetricKind::CpuUsage => "CPU",
            MetricKind::MemoryUsage => "Memory",
            MetricKind::DiskUsage => "Disk",
            MetricKind::NetworkTraffic => "Network",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 서버 한 대의 메트릭 (각 값은 백분율)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerMetrics {
    #[serde(default)]
    pub cpu_usage: f64,
    #[serde(default)]
    pub memory_usage: f64,
    #[serde(default)]
    pub disk_usage: f64,
    #[serde(default)]
    pub network_traffic: f64,
}

impl ServerMetrics {
    pub fn get(&self, kind: MetricKind) -> f64 {
        match kind {
            MetricKind::CpuUsage => self.cpu_usage,
            MetricKind::MemoryUsage => self.memory_usage,
            MetricKind::DiskUsage => self.disk_usage,
            MetricKind::NetworkTraffic => self.network_traffic,
        }
    }

    /// `(종류, 값)` 쌍을 표시 순서대로 순회
    pub fn iter(&self) -> impl Iterator<Item = (MetricKind, f64)> + '_ {
        MetricKind::ALL.into_iter().map(move |k| (k, self.get(k)))
    }
}

/// 모니터링 대상 호스트
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoredHost {
    /// 백엔드가 ID를 주지 않으면 `name`이 식별자 역할을 한다
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default = "default_host_status")]
    pub status: String,
    #[serde(default)]
    pub metrics: ServerMetrics,
}

fn default_host_status() -> String {
    "online".to_string()
}

/// 알림 심각도
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Warning,
    Critical,
}

/// 임계값 초과 알림 (백엔드가 판정/보고)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(with = "crate::models::timestamp")]
    pub timestamp: NaiveDateTime,
    /// 대상 서버 이름
    pub server: String,
    pub metric: MetricKind,
    pub value: f64,
    pub threshold: f64,
    pub severity: AlertSeverity,
}

impl Alert {
    pub fn is_critical(&self) -> bool {
        self.severity == AlertSeverity::Critical
    }
}

/// 모니터링 스냅샷 (서버 목록 + 이번 주기에 발생한 알림)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringSnapshot {
    #[serde(with = "crate::models::timestamp")]
    pub timestamp: NaiveDateTime,
    #[serde(default)]
    pub servers: Vec<MonitoredHost>,
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

impl MonitoringSnapshot {
    /// 이번 스냅샷의 critical 알림 수
    pub fn critical_alert_count(&self) -> usize {
        self.alerts.iter().filter(|a| a.is_critical()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT_JSON: &str = r#"{
        "timestamp": "2025-01-15 10:00:00",
        "servers": [
            {"name": "laptop-01", "status": "online",
             "metrics": {"cpu_usage": 91.5, "memory_usage": 40.0, "disk_usage": 55.2, "network_traffic": 12.0}},
            {"name": "laptop-02",
             "metrics": {"cpu_usage": 20.0, "memory_usage": 30.0, "disk_usage": 104.0, "network_traffic": 10.0}}
        ],
        "alerts": [
            {"timestamp": "2025-01-15 10:00:00", "server": "laptop-01", "metric": "cpu_usage",
             "value": 91.5, "threshold": 80, "severity": "critical"},
            {"timestamp": "2025-01-15 10:00:00", "server": "laptop-02", "metric": "disk_usage",
             "value": 104.0, "threshold": 90, "severity": "warning"}
        ]
    }"#;

    #[test]
    fn deserialize_snapshot() {
        let snap: MonitoringSnapshot = serde_json::from_str(SNAPSHOT_JSON).unwrap();
        assert_eq!(snap.servers.len(), 2);
        assert_eq!(snap.servers[1].status, "online");
        // 100 초과 값도 그대로 유지
        assert_eq!(snap.servers[1].metrics.disk_usage, 104.0);
        assert_eq!(snap.critical_alert_count(), 1);
        assert_eq!(snap.alerts[0].metric, MetricKind::CpuUsage);
    }

    #[test]
    fn metric_labels() {
        assert_eq!(MetricKind::NetworkTraffic.label(), "network traffic");
        assert_eq!(MetricKind::MemoryUsage.short_label(), "Memory");
    }
}
