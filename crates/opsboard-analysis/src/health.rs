//! 건강 점수/알림 상태 평가기.
//!
//! 세 가지 판정은 각각 다른 임계값 테이블을 사용한다.
//!
//! - 건강 점수: [`ScoreTable`] (2단 감점, 구간 비누적)
//! - 상태 분류: [`BucketingTable`] (critical 검사가 warning 검사보다 먼저)
//! - 카드 경고 표시: `card_alert` [`MetricThresholds`]

use opsboard_core::config::{BucketingTable, MetricThresholds, ScoreTable};
use opsboard_core::models::monitoring::{MetricKind, MonitoredHost, ServerMetrics};
use serde::Serialize;

/// 서버 점수 시작값
pub const FULL_SCORE: u32 = 100;

/// 리소스 사용률 막대: 이 값을 초과하면 높음
pub const UTILIZATION_HIGH: f64 = 80.0;

/// 리소스 사용률 막대: 이 값을 초과하면 주의
pub const UTILIZATION_ELEVATED: f64 = 70.0;

/// 카드 메트릭: 임계값 아래 이 폭 안이면 주의
pub const CARD_ELEVATED_MARGIN: f64 = 10.0;

/// 서버 한 대의 점수 (0 ~ 100)
///
/// 메트릭별로 해당하는 단일 구간의 감점만 적용하며, 0 아래로 내려가지 않는다.
pub fn server_score(metrics: &ServerMetrics, table: &ScoreTable) -> u32 {
    let deduction: u32 = MetricKind::ALL
        .iter()
        .filter_map(|&kind| table.get(kind).map(|b| b.penalty(metrics.get(kind))))
        .sum();
    FULL_SCORE.saturating_sub(deduction)
}

/// 전체 건강 점수 (0 ~ 100)
///
/// 서버별 점수의 산술 평균을 반올림한다. 서버가 없으면 100을 반환한다
/// ("완전히 건강함"으로 간주하는 정책).
pub fn health_score(servers: &[MonitoredHost], table: &ScoreTable) -> u8 {
    if servers.is_empty() {
        return FULL_SCORE as u8;
    }
    let total: u32 = servers
        .iter()
        .map(|s| server_score(&s.metrics, table))
        .sum();
    let mean = f64::from(total) / servers.len() as f64;
    mean.round().clamp(0.0, f64::from(FULL_SCORE)) as u8
}

/// 서버 상태 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    Healthy,
    Warning,
    Critical,
}

impl ServerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerStatus::Healthy => "healthy",
            ServerStatus::Warning => "warning",
            ServerStatus::Critical => "critical",
        }
    }
}

fn any_exceeds(metrics: &ServerMetrics, thresholds: &MetricThresholds) -> bool {
    metrics
        .iter()
        .any(|(kind, value)| value > thresholds.get(kind))
}

/// 서버 상태 분류
///
/// 어느 메트릭이든 critical 임계값을 넘으면 critical,
/// 아니면 어느 메트릭이든 warning 임계값을 넘으면 warning, 그 외 healthy.
pub fn bucket_server(metrics: &ServerMetrics, table: &BucketingTable) -> ServerStatus {
    if any_exceeds(metrics, &table.critical) {
        ServerStatus::Critical
    } else if any_exceeds(metrics, &table.warning) {
        ServerStatus::Warning
    } else {
        ServerStatus::Healthy
    }
}

/// 상태별 서버 수
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub healthy: usize,
    pub warning: usize,
    pub critical: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.healthy + self.warning + self.critical
    }
}

pub fn bucket_counts(servers: &[MonitoredHost], table: &BucketingTable) -> StatusCounts {
    servers
        .iter()
        .fold(StatusCounts::default(), |mut counts, server| {
            match bucket_server(&server.metrics, table) {
                ServerStatus::Healthy => counts.healthy += 1,
                ServerStatus::Warning => counts.warning += 1,
                ServerStatus::Critical => counts.critical += 1,
            }
            counts
        })
}

/// 단일 메트릭 카드 경고 여부
pub fn metric_alert(kind: MetricKind, value: f64, card_alert: &MetricThresholds) -> bool {
    value > card_alert.get(kind)
}

/// 호스트 카드 경고 여부 (어느 메트릭이든)
pub fn has_card_alert(metrics: &ServerMetrics, card_alert: &MetricThresholds) -> bool {
    any_exceeds(metrics, card_alert)
}

/// 카드 메트릭 표시 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricLevel {
    Normal,
    Elevated,
    Alert,
}

/// 카드 메트릭 표시 단계
///
/// 임계값 초과 → Alert, 임계값 - 10 초과 → Elevated, 그 외 Normal.
pub fn metric_level(value: f64, threshold: f64) -> MetricLevel {
    if value > threshold {
        MetricLevel::Alert
    } else if value > threshold - CARD_ELEVATED_MARGIN {
        MetricLevel::Elevated
    } else {
        MetricLevel::Normal
    }
}

/// 전체 서버 평균 리소스 사용률
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResourceAverages {
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub disk_usage: f64,
    pub network_traffic: f64,
}

impl ResourceAverages {
    pub fn get(&self, kind: MetricKind) -> f64 {
        match kind {
            MetricKind::CpuUsage => self.cpu_usage,
            MetricKind::MemoryUsage => self.memory_usage,
            MetricKind::DiskUsage => self.disk_usage,
            MetricKind::NetworkTraffic => self.network_traffic,
        }
    }
}

/// 서버가 없으면 `None`
pub fn resource_averages(servers: &[MonitoredHost]) -> Option<ResourceAverages> {
    if servers.is_empty() {
        return None;
    }
    let n = servers.len() as f64;
    let mean = |kind| servers.iter().map(|s| s.metrics.get(kind)).sum::<f64>() / n;
    Some(ResourceAverages {
        cpu_usage: mean(MetricKind::CpuUsage),
        memory_usage: mean(MetricKind::MemoryUsage),
        disk_usage: mean(MetricKind::DiskUsage),
        network_traffic: mean(MetricKind::NetworkTraffic),
    })
}

/// 리소스 사용률 막대 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UtilizationLevel {
    Normal,
    Elevated,
    High,
}

pub fn utilization_level(value: f64) -> UtilizationLevel {
    if value > UTILIZATION_HIGH {
        UtilizationLevel::High
    } else if value > UTILIZATION_ELEVATED {
        UtilizationLevel::Elevated
    } else {
        UtilizationLevel::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::host;
    use opsboard_core::config::{DeductionBracket, ThresholdConfig};

    fn metrics(cpu: f64, mem: f64, disk: f64, net: f64) -> ServerMetrics {
        ServerMetrics {
            cpu_usage: cpu,
            memory_usage: mem,
            disk_usage: disk,
            network_traffic: net,
        }
    }

    #[test]
    fn empty_fleet_scores_100() {
        let t = ThresholdConfig::default();
        assert_eq!(health_score(&[], &t.score), 100);
    }

    #[test]
    fn nominal_server_scores_100() {
        let t = ThresholdConfig::default();
        assert_eq!(server_score(&metrics(10.0, 10.0, 10.0, 99.0), &t.score), 100);
    }

    #[test]
    fn brackets_do_not_stack_per_metric() {
        let t = ThresholdConfig::default();
        // cpu 95: 상위 구간 -20만 적용 (-10 추가 없음)
        assert_eq!(server_score(&metrics(95.0, 0.0, 0.0, 0.0), &t.score), 80);
        // cpu 75: 하위 구간 -10
        assert_eq!(server_score(&metrics(75.0, 0.0, 0.0, 0.0), &t.score), 90);
        // 경계값은 초과가 아니다
        assert_eq!(server_score(&metrics(70.0, 75.0, 80.0, 0.0), &t.score), 100);
    }

    #[test]
    fn deductions_apply_independently_per_metric() {
        let t = ThresholdConfig::default();
        // cpu -20, memory -10, disk -20
        assert_eq!(server_score(&metrics(81.0, 80.0, 91.0, 0.0), &t.score), 50);
    }

    #[test]
    fn network_not_scored_by_default() {
        let t = ThresholdConfig::default();
        assert_eq!(server_score(&metrics(0.0, 0.0, 0.0, 100.0), &t.score), 100);
    }

    #[test]
    fn server_score_floors_at_zero() {
        let mut table = ThresholdConfig::default().score;
        let heavy = DeductionBracket {
            elevated: 10.0,
            high: 20.0,
            elevated_penalty: 30,
            high_penalty: 60,
        };
        table.cpu_usage = Some(heavy);
        table.memory_usage = Some(heavy);
        assert_eq!(server_score(&metrics(50.0, 50.0, 0.0, 0.0), &table), 0);
    }

    #[test]
    fn aggregate_is_rounded_mean() {
        let t = ThresholdConfig::default();
        let servers = vec![
            host("a", 0.0, 0.0, 0.0, 0.0),    // 100
            host("b", 75.0, 0.0, 0.0, 0.0),   // 90
            host("c", 95.0, 0.0, 0.0, 0.0),   // 80
        ];
        assert_eq!(health_score(&servers, &t.score), 90);

        let servers = vec![
            host("a", 0.0, 0.0, 0.0, 0.0),    // 100
            host("b", 75.0, 0.0, 0.0, 0.0),   // 90
        ];
        // 95.0 → 95
        assert_eq!(health_score(&servers, &t.score), 95);

        let servers = vec![
            host("a", 0.0, 0.0, 0.0, 0.0),    // 100
            host("b", 0.0, 0.0, 0.0, 0.0),    // 100
            host("c", 75.0, 0.0, 0.0, 0.0),   // 90
        ];
        // 96.67 → 97
        assert_eq!(health_score(&servers, &t.score), 97);
    }

    #[test]
    fn score_is_deterministic_and_bounded() {
        let t = ThresholdConfig::default();
        let servers: Vec<_> = (0..20)
            .map(|i| {
                let v = f64::from(i) * 7.5;
                host(&format!("h{i}"), v, 150.0 - v, v, v)
            })
            .collect();
        let first = health_score(&servers, &t.score);
        assert_eq!(first, health_score(&servers, &t.score));
        assert!(first <= 100);
    }

    #[test]
    fn cpu_95_is_critical_regardless_of_others() {
        let t = ThresholdConfig::default();
        assert_eq!(
            bucket_server(&metrics(95.0, 0.0, 0.0, 0.0), &t.bucketing),
            ServerStatus::Critical
        );
        assert_eq!(
            bucket_server(&metrics(95.0, 80.0, 85.0, 72.0), &t.bucketing),
            ServerStatus::Critical
        );
    }

    #[test]
    fn cpu_72_alone_is_warning() {
        let t = ThresholdConfig::default();
        assert_eq!(
            bucket_server(&metrics(72.0, 10.0, 10.0, 10.0), &t.bucketing),
            ServerStatus::Warning
        );
    }

    #[test]
    fn below_every_warning_is_healthy() {
        let t = ThresholdConfig::default();
        assert_eq!(
            bucket_server(&metrics(70.0, 75.0, 80.0, 70.0), &t.bucketing),
            ServerStatus::Healthy
        );
    }

    #[test]
    fn critical_check_precedes_warning() {
        let t = ThresholdConfig::default();
        // network 86: warning(70)과 critical(85)을 모두 넘으면 critical
        assert_eq!(
            bucket_server(&metrics(0.0, 0.0, 0.0, 86.0), &t.bucketing),
            ServerStatus::Critical
        );
    }

    #[test]
    fn counts_by_bucket() {
        let t = ThresholdConfig::default();
        let servers = vec![
            host("a", 10.0, 10.0, 10.0, 10.0),
            host("b", 72.0, 10.0, 10.0, 10.0),
            host("c", 10.0, 10.0, 96.0, 10.0),
            host("d", 10.0, 76.0, 10.0, 10.0),
        ];
        let counts = bucket_counts(&servers, &t.bucketing);
        assert_eq!(
            counts,
            StatusCounts {
                healthy: 1,
                warning: 2,
                critical: 1
            }
        );
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn card_alert_uses_its_own_table() {
        let t = ThresholdConfig::default();
        // cpu 85: 카드 경고(80) O, 분류상 critical(90) X
        let m = metrics(85.0, 0.0, 0.0, 0.0);
        assert!(has_card_alert(&m, &t.card_alert));
        assert_eq!(bucket_server(&m, &t.bucketing), ServerStatus::Warning);
        // network 76: 카드 경고(75) O
        assert!(metric_alert(MetricKind::NetworkTraffic, 76.0, &t.card_alert));
        assert!(!metric_alert(MetricKind::DiskUsage, 90.0, &t.card_alert));
    }

    #[test]
    fn metric_level_bands() {
        assert_eq!(metric_level(81.0, 80.0), MetricLevel::Alert);
        assert_eq!(metric_level(80.0, 80.0), MetricLevel::Elevated);
        assert_eq!(metric_level(70.5, 80.0), MetricLevel::Elevated);
        assert_eq!(metric_level(70.0, 80.0), MetricLevel::Normal);
    }

    #[test]
    fn averages_and_utilization() {
        assert!(resource_averages(&[]).is_none());

        let servers = vec![
            host("a", 60.0, 80.0, 90.0, 10.0),
            host("b", 100.0, 70.0, 80.0, 20.0),
        ];
        let avg = resource_averages(&servers).unwrap();
        assert_eq!(avg.cpu_usage, 80.0);
        assert_eq!(avg.memory_usage, 75.0);
        assert_eq!(avg.get(MetricKind::DiskUsage), 85.0);
        assert_eq!(avg.network_traffic, 15.0);

        assert_eq!(utilization_level(avg.cpu_usage), UtilizationLevel::Elevated);
        assert_eq!(utilization_level(avg.disk_usage), UtilizationLevel::High);
        assert_eq!(utilization_level(avg.network_traffic), UtilizationLevel::Normal);
    }
}
