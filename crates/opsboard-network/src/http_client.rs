//! HTTP REST API 클라이언트.
//!
//! `DashboardApi` 포트 구현. 실패한 요청은 재시도하지 않고 그대로 호출자에게 돌려준다.

use async_trait::async_trait;
use opsboard_core::error::CoreError;
use opsboard_core::models::asset::Asset;
use opsboard_core::models::event::{Event, EventUpdate, NewEvent};
use opsboard_core::models::monitoring::{Alert, MonitoringSnapshot};
use opsboard_core::models::settings::{Acknowledgement, GrafanaSettings, GrafanaTestResult};
use opsboard_core::ports::api_client::DashboardApi;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::connectivity::SharedConnectivityManager;

const EVENTS_PATH: &str = "/api/events";
const GRAFANA_SETTINGS_PATH: &str = "/api/settings/grafana";

/// REST API 클라이언트
pub struct HttpDashboardApi {
    client: reqwest::Client,
    base_url: String,
    connectivity: Option<SharedConnectivityManager>,
}

impl HttpDashboardApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::Network(format!("HTTP 클라이언트 빌드 실패: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            connectivity: None,
        })
    }

    /// 요청 성공/실패를 연결 상태 관리자에 기록
    pub fn with_connectivity(mut self, connectivity: SharedConnectivityManager) -> Self {
        self.connectivity = Some(connectivity);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.request(method, &url)
    }

    /// 단일 이벤트 URL. ID는 경로 세그먼트 하나로 퍼센트 인코딩한다.
    ///
    /// `path_segments_mut`는 `.`/`..` 세그먼트를 버리므로 그런 ID는 거부한다.
    fn event_url(&self, id: &str) -> Result<Url, CoreError> {
        if matches!(id.trim(), "" | "." | "..") {
            return Err(CoreError::validation("id", format!("잘못된 이벤트 ID: {id:?}")));
        }
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| CoreError::Config(format!("잘못된 백엔드 URL: {}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| CoreError::Config(format!("경로를 붙일 수 없는 URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["api", "events", id]);
        Ok(url)
    }

    /// 요청 전송 + 상태 코드 확인 + JSON 본문 파싱
    ///
    /// `resource`는 404 응답을 `NotFound`로 바꿀 때 쓰는 (종류, 식별자) 쌍.
    async fn execute<T: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
        resource: (&str, &str),
    ) -> Result<T, CoreError> {
        let resp = match req.send().await {
            Ok(resp) => resp,
            Err(e) => {
                if let Some(c) = &self.connectivity {
                    c.record_failure();
                }
                return Err(CoreError::Network(format!("요청 실패: {e}")));
            }
        };
        if let Some(c) = &self.connectivity {
            c.record_success();
        }

        let resp = Self::check_response(resp, resource).await?;
        let body = resp
            .text()
            .await
            .map_err(|e| CoreError::Network(format!("응답 본문 읽기 실패: {e}")))?;
        Ok(serde_json::from_str(&body)?)
    }

    /// 응답 상태 코드 확인 및 에러 매핑
    async fn check_response(
        resp: reqwest::Response,
        (resource_type, id): (&str, &str),
    ) -> Result<reqwest::Response, CoreError> {
        let status = resp.status();

        if status.is_success() {
            return Ok(resp);
        }

        let text = resp.text().await.unwrap_or_else(|e| {
            warn!("응답 본문 읽기 실패: {e}");
            String::new()
        });

        match status.as_u16() {
            404 => Err(CoreError::NotFound {
                resource_type: resource_type.to_string(),
                id: id.to_string(),
            }),
            400 | 422 => Err(CoreError::validation("request", text)),
            503 => Err(CoreError::ServiceUnavailable(text)),
            _ => Err(CoreError::Internal(format!("API 에러 ({status}): {text}"))),
        }
    }
}

#[async_trait]
impl DashboardApi for HttpDashboardApi {
    async fn fetch_assets(&self) -> Result<Vec<Asset>, CoreError> {
        let req = self.request(reqwest::Method::GET, "/api/assets");
        let assets: Vec<Asset> = self.execute(req, ("Asset", "*")).await?;
        debug!("자산 {}건 수신", assets.len());
        Ok(assets)
    }

    async fn fetch_events(&self) -> Result<Vec<Event>, CoreError> {
        let req = self.request(reqwest::Method::GET, EVENTS_PATH);
        let events: Vec<Event> = self.execute(req, ("Event", "*")).await?;
        debug!("이벤트 {}건 수신", events.len());
        Ok(events)
    }

    async fn create_event(&self, new_event: &NewEvent) -> Result<Event, CoreError> {
        debug!("이벤트 생성 요청: {}", new_event.title);
        let req = self
            .request(reqwest::Method::POST, EVENTS_PATH)
            .json(new_event);
        self.execute(req, ("Event", "new")).await
    }

    async fn update_event(&self, id: &str, update: &EventUpdate) -> Result<Event, CoreError> {
        debug!("이벤트 업데이트 요청: {id}");
        let req = self
            .client
            .request(reqwest::Method::PUT, self.event_url(id)?)
            .json(update);
        self.execute(req, ("Event", id)).await
    }

    async fn delete_event(&self, id: &str) -> Result<Acknowledgement, CoreError> {
        debug!("이벤트 삭제 요청: {id}");
        let req = self
            .client
            .request(reqwest::Method::DELETE, self.event_url(id)?);
        self.execute(req, ("Event", id)).await
    }

    async fn fetch_current_data(&self) -> Result<MonitoringSnapshot, CoreError> {
        let req = self.request(reqwest::Method::GET, "/api/current-data");
        self.execute(req, ("MonitoringSnapshot", "current")).await
    }

    async fn fetch_alerts(&self) -> Result<Vec<Alert>, CoreError> {
        let req = self.request(reqwest::Method::GET, "/api/alerts");
        self.execute(req, ("Alert", "*")).await
    }

    async fn fetch_grafana_settings(&self) -> Result<GrafanaSettings, CoreError> {
        let req = self.request(reqwest::Method::GET, GRAFANA_SETTINGS_PATH);
        self.execute(req, ("GrafanaSettings", "grafana")).await
    }

    async fn save_grafana_settings(
        &self,
        settings: &GrafanaSettings,
    ) -> Result<Acknowledgement, CoreError> {
        let req = self
            .request(reqwest::Method::POST, GRAFANA_SETTINGS_PATH)
            .json(settings);
        self.execute(req, ("GrafanaSettings", "grafana")).await
    }

    async fn reset_grafana_settings(&self) -> Result<Acknowledgement, CoreError> {
        let req = self.request(reqwest::Method::DELETE, GRAFANA_SETTINGS_PATH);
        self.execute(req, ("GrafanaSettings", "grafana")).await
    }

    async fn test_grafana_connection(
        &self,
        settings: &GrafanaSettings,
    ) -> Result<GrafanaTestResult, CoreError> {
        let path = format!("{GRAFANA_SETTINGS_PATH}/test");
        let req = self.request(reqwest::Method::POST, &path).json(settings);
        self.execute(req, ("GrafanaSettings", "grafana")).await
    }
}
