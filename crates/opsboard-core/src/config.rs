//! 애플리케이션 설정 구조체.
//!
//! 서버 URL, 동기화 주기, 임계값 테이블 등 런타임 설정을 정의한다.
//! `ConfigManager`를 통해 JSON 파일에서 로드.
//!
//! 임계값은 용도별로 분리된 세 개의 테이블로 관리한다.
//! 점수 감점(`score`), 상태 분류(`bucketing`), 카드 경고 표시(`card_alert`)는
//! 서로 다른 기준점을 쓰며 호출자가 섞어 쓰지 않는다.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::CoreError;
use crate::models::monitoring::MetricKind;

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// 서버 연결 설정
    pub server: ServerConfig,
    /// 동기화 설정
    #[serde(default)]
    pub sync: SyncConfig,
    /// 임계값 테이블
    #[serde(default)]
    pub thresholds: ThresholdConfig,
}

// ============================================================
// 서버/동기화 설정
// ============================================================

/// 서버 연결 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// API 서버 기본 URL (예: "http://localhost:5000")
    pub base_url: String,
    /// 요청 타임아웃 (밀리초)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// 푸시 채널 재연결 최대 지연 (초)
    #[serde(default = "default_push_reconnect_max_secs")]
    pub push_reconnect_max_secs: u64,
}

/// 동기화 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// 이벤트 목록 폴링 주기 (초, 0이면 푸시만 사용)
    #[serde(default)]
    pub events_poll_interval_secs: u64,
    /// 모니터링 스냅샷 폴링 주기 (초, 0이면 푸시만 사용)
    #[serde(default = "default_monitoring_poll_interval_secs")]
    pub monitoring_poll_interval_secs: u64,
    /// 알림 배너 자동 닫힘 지연 (밀리초)
    #[serde(default = "default_banner_dismiss_ms")]
    pub banner_dismiss_ms: u64,
    /// 대시보드에 표시할 최근 알림 수
    #[serde(default = "default_recent_alerts_limit")]
    pub recent_alerts_limit: usize,
    /// 활동 피드 최대 항목 수
    #[serde(default = "default_activity_feed_limit")]
    pub activity_feed_limit: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            events_poll_interval_secs: 0,
            monitoring_poll_interval_secs: default_monitoring_poll_interval_secs(),
            banner_dismiss_ms: default_banner_dismiss_ms(),
            recent_alerts_limit: default_recent_alerts_limit(),
            activity_feed_limit: default_activity_feed_limit(),
        }
    }
}

// ============================================================
// 임계값 테이블
// ============================================================

/// 메트릭별 단일 임계값 (값이 이를 "초과"하면 해당)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricThresholds {
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub disk_usage: f64,
    pub network_traffic: f64,
}

impl MetricThresholds {
    pub fn get(&self, kind: MetricKind) -> f64 {
        match kind {
            MetricKind::CpuUsage => self.cpu_usage,
            MetricKind::MemoryUsage => self.memory_usage,
            MetricKind::DiskUsage => self.disk_usage,
            MetricKind::NetworkTraffic => self.network_traffic,
        }
    }
}

/// 2단 감점 구간
///
/// `value > high`이면 `high_penalty`, 그렇지 않고 `value > elevated`이면 `elevated_penalty`.
/// 구간은 누적되지 않는다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeductionBracket {
    pub elevated: f64,
    pub high: f64,
    #[serde(default = "default_elevated_penalty")]
    pub elevated_penalty: u32,
    #[serde(default = "default_high_penalty")]
    pub high_penalty: u32,
}

impl DeductionBracket {
    pub const fn new(elevated: f64, high: f64) -> Self {
        Self {
            elevated,
            high,
            elevated_penalty: 10,
            high_penalty: 20,
        }
    }

    /// 값에 해당하는 단일 구간의 감점
    pub fn penalty(&self, value: f64) -> u32 {
        if value > self.high {
            self.high_penalty
        } else if value > self.elevated {
            self.elevated_penalty
        } else {
            0
        }
    }
}

/// 건강 점수 감점 테이블 (`None`이면 해당 메트릭은 점수에 반영하지 않음)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreTable {
    pub cpu_usage: Option<DeductionBracket>,
    pub memory_usage: Option<DeductionBracket>,
    pub disk_usage: Option<DeductionBracket>,
    #[serde(default)]
    pub network_traffic: Option<DeductionBracket>,
}

impl ScoreTable {
    pub fn get(&self, kind: MetricKind) -> Option<&DeductionBracket> {
        match kind {
            MetricKind::CpuUsage => self.cpu_usage.as_ref(),
            MetricKind::MemoryUsage => self.memory_usage.as_ref(),
            MetricKind::DiskUsage => self.disk_usage.as_ref(),
            MetricKind::NetworkTraffic => self.network_traffic.as_ref(),
        }
    }
}

impl Default for ScoreTable {
    fn default() -> Self {
        Self {
            cpu_usage: Some(DeductionBracket::new(70.0, 80.0)),
            memory_usage: Some(DeductionBracket::new(75.0, 85.0)),
            disk_usage: Some(DeductionBracket::new(80.0, 90.0)),
            network_traffic: None,
        }
    }
}

/// 서버 상태 분류 테이블 (healthy / warning / critical)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BucketingTable {
    pub warning: MetricThresholds,
    pub critical: MetricThresholds,
}

impl Default for BucketingTable {
    fn default() -> Self {
        Self {
            warning: MetricThresholds {
                cpu_usage: 70.0,
                memory_usage: 75.0,
                disk_usage: 80.0,
                network_traffic: 70.0,
            },
            critical: MetricThresholds {
                cpu_usage: 90.0,
                memory_usage: 90.0,
                disk_usage: 95.0,
                network_traffic: 85.0,
            },
        }
    }
}

/// 임계값 설정: 용도별 세 테이블
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// 건강 점수 감점
    #[serde(default)]
    pub score: ScoreTable,
    /// 상태 분류 (요약 카운트)
    #[serde(default)]
    pub bucketing: BucketingTable,
    /// 호스트 카드 경고 표시
    #[serde(default = "default_card_alert")]
    pub card_alert: MetricThresholds,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            score: ScoreTable::default(),
            bucketing: BucketingTable::default(),
            card_alert: default_card_alert(),
        }
    }
}

impl ThresholdConfig {
    /// 테이블 일관성 검증
    ///
    /// 감점 구간은 `elevated < high`, 분류 테이블은 `warning < critical`이어야 한다.
    pub fn validate(&self) -> Result<(), CoreError> {
        for kind in MetricKind::ALL {
            if let Some(bracket) = self.score.get(kind) {
                if !bracket.elevated.is_finite()
                    || !bracket.high.is_finite()
                    || bracket.elevated >= bracket.high
                {
                    return Err(CoreError::Config(format!(
                        "감점 구간 순서 오류 ({kind}): {} >= {}",
                        bracket.elevated, bracket.high
                    )));
                }
            }

            let warning = self.bucketing.warning.get(kind);
            let critical = self.bucketing.critical.get(kind);
            if !warning.is_finite() || !critical.is_finite() || warning >= critical {
                return Err(CoreError::Config(format!(
                    "분류 임계값 순서 오류 ({kind}): warning={warning}, critical={critical}"
                )));
            }

            if !self.card_alert.get(kind).is_finite() {
                return Err(CoreError::Config(format!("카드 임계값 오류 ({kind})")));
            }
        }
        Ok(())
    }
}

fn default_card_alert() -> MetricThresholds {
    MetricThresholds {
        cpu_usage: 80.0,
        memory_usage: 85.0,
        disk_usage: 90.0,
        network_traffic: 75.0,
    }
}

fn default_elevated_penalty() -> u32 {
    10
}

fn default_high_penalty() -> u32 {
    20
}

// ============================================================
// AppConfig impl
// ============================================================

impl AppConfig {
    /// 기본 설정값 반환
    pub fn default_config() -> Self {
        Self {
            server: ServerConfig {
                base_url: "http://localhost:5000".to_string(),
                request_timeout_ms: default_request_timeout_ms(),
                push_reconnect_max_secs: default_push_reconnect_max_secs(),
            },
            sync: SyncConfig::default(),
            thresholds: ThresholdConfig::default(),
        }
    }

    /// 설정값 검증
    pub fn validate(&self) -> Result<(), CoreError> {
        let base_url = self.server.base_url.trim();
        if base_url.is_empty() {
            return Err(CoreError::Config("server.base_url이 비어 있습니다".to_string()));
        }
        let parsed = Url::parse(base_url).map_err(|e| {
            CoreError::Config(format!("server.base_url 파싱 실패: {base_url}: {e}"))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(CoreError::Config(format!(
                "server.base_url은 http(s) URL이어야 합니다: {base_url}"
            )));
        }
        if self.server.request_timeout_ms == 0 {
            return Err(CoreError::Config(
                "server.request_timeout_ms는 0보다 커야 합니다".to_string(),
            ));
        }
        self.thresholds.validate()
    }
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_push_reconnect_max_secs() -> u64 {
    30
}

fn default_monitoring_poll_interval_secs() -> u64 {
    60
}

fn default_banner_dismiss_ms() -> u64 {
    5_000
}

fn default_recent_alerts_limit() -> usize {
    5
}

fn default_activity_feed_limit() -> usize {
    5
}
