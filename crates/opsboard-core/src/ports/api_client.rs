//! 백엔드 API 포트.
//!
//! 구현: `opsboard-network` crate (reqwest, tokio-tungstenite)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::asset::Asset;
use crate::models::event::{Event, EventUpdate, NewEvent};
use crate::models::monitoring::{Alert, MonitoringSnapshot};
use crate::models::settings::{Acknowledgement, GrafanaSettings, GrafanaTestResult};

/// 대시보드 REST API 클라이언트
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// 자산 전체 목록 (`GET /api/assets`)
    async fn fetch_assets(&self) -> Result<Vec<Asset>, CoreError>;

    /// 이벤트 전체 목록 (`GET /api/events`)
    async fn fetch_events(&self) -> Result<Vec<Event>, CoreError>;

    /// 이벤트 생성 (`POST /api/events`)
    async fn create_event(&self, new_event: &NewEvent) -> Result<Event, CoreError>;

    /// 이벤트 부분 업데이트 (`PUT /api/events/{id}`)
    async fn update_event(&self, id: &str, update: &EventUpdate) -> Result<Event, CoreError>;

    /// 이벤트 삭제 (`DELETE /api/events/{id}`)
    async fn delete_event(&self, id: &str) -> Result<Acknowledgement, CoreError>;

    /// 현재 모니터링 스냅샷 (`GET /api/current-data`)
    async fn fetch_current_data(&self) -> Result<MonitoringSnapshot, CoreError>;

    /// 최근 알림 이력 (`GET /api/alerts`, 최신순)
    async fn fetch_alerts(&self) -> Result<Vec<Alert>, CoreError>;

    /// Grafana 연동 설정 조회
    async fn fetch_grafana_settings(&self) -> Result<GrafanaSettings, CoreError>;

    /// Grafana 연동 설정 저장
    async fn save_grafana_settings(
        &self,
        settings: &GrafanaSettings,
    ) -> Result<Acknowledgement, CoreError>;

    /// Grafana 연동 설정 초기화
    async fn reset_grafana_settings(&self) -> Result<Acknowledgement, CoreError>;

    /// Grafana 연결 테스트
    async fn test_grafana_connection(
        &self,
        settings: &GrafanaSettings,
    ) -> Result<GrafanaTestResult, CoreError>;
}

/// 푸시 채널 이벤트
///
/// 이벤트 컬렉션 관련 알림은 증분 패치가 아니라 "무효화 후 재조회" 신호로만 쓰이므로
/// 페이로드는 불투명 JSON으로 유지한다.
#[derive(Debug, Clone)]
pub enum PushEvent {
    /// 채널 연결 수립
    Connected,
    /// 채널 연결 끊김 (재연결 전)
    Disconnected,
    /// 주기적 전체 모니터링 스냅샷
    MonitoringUpdate(Box<MonitoringSnapshot>),
    /// 이벤트 생성됨
    EventCreated(serde_json::Value),
    /// 이벤트 변경됨
    EventUpdated(serde_json::Value),
    /// 이벤트 삭제됨
    EventDeleted { id: String },
}

impl PushEvent {
    /// 이벤트 컬렉션을 무효화해야 하는지
    pub fn invalidates_events(&self) -> bool {
        matches!(
            self,
            PushEvent::EventCreated(_) | PushEvent::EventUpdated(_) | PushEvent::EventDeleted { .. }
        )
    }
}

/// 푸시 알림 채널
#[async_trait]
pub trait PushChannel: Send + Sync {
    /// 채널 연결 및 이벤트 수신
    ///
    /// 수신된 이벤트를 `tx` 채널로 전송한다.
    /// 연결이 끊기면 자동 재연결을 시도하며, `tx`가 닫히면 반환한다.
    async fn connect(&self, tx: tokio::sync::mpsc::Sender<PushEvent>) -> Result<(), CoreError>;
}
