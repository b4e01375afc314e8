//! Socket.IO 푸시 채널 클라이언트.
//!
//! `PushChannel` 포트 구현. `tokio-tungstenite` 위에서 Engine.IO v4 텍스트 프레임을
//! 직접 해석하며, 연결이 끊기면 exponential backoff로 재연결한다.
//!
//! 처리하는 프레임:
//! - `0{...}` open → `40` (네임스페이스 연결) 전송
//! - `2` ping → `3` pong 응답
//! - `40` 연결 수립, `41` 연결 해제
//! - `42["event", data]` 이벤트

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use opsboard_core::error::CoreError;
use opsboard_core::models::monitoring::MonitoringSnapshot;
use opsboard_core::ports::api_client::{PushChannel, PushEvent};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::connectivity::SharedConnectivityManager;

const SOCKET_IO_PATH: &str = "/socket.io/?EIO=4&transport=websocket";

/// Engine.IO/Socket.IO 텍스트 프레임
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Frame {
    Open,
    Close,
    Ping,
    Connect,
    Disconnect,
    Event { name: String, data: Value },
    Other,
}

impl Frame {
    pub(crate) fn parse(text: &str) -> Frame {
        let mut chars = text.chars();
        match chars.next() {
            Some('0') => Frame::Open,
            Some('1') => Frame::Close,
            Some('2') => Frame::Ping,
            Some('4') => Self::parse_message(chars.as_str()),
            _ => Frame::Other,
        }
    }

    /// Engine.IO message 페이로드 (Socket.IO 패킷)
    fn parse_message(packet: &str) -> Frame {
        let mut chars = packet.chars();
        match chars.next() {
            Some('0') => Frame::Connect,
            Some('1') => Frame::Disconnect,
            Some('2') => Self::parse_event(chars.as_str()),
            _ => Frame::Other,
        }
    }

    /// `[/namespace,][ack_id]["name", data]`
    fn parse_event(body: &str) -> Frame {
        let Some(start) = body.find('[') else {
            return Frame::Other;
        };
        let args: Vec<Value> = match serde_json::from_str(&body[start..]) {
            Ok(args) => args,
            Err(e) => {
                warn!("Socket.IO 이벤트 파싱 실패: {e}");
                return Frame::Other;
            }
        };
        let mut args = args.into_iter();
        match args.next() {
            Some(Value::String(name)) => Frame::Event {
                name,
                data: args.next().unwrap_or(Value::Null),
            },
            _ => Frame::Other,
        }
    }
}

/// 세션 종료 사유
enum SessionEnd {
    /// 수신 채널이 닫힘: 재연결하지 않는다
    ReceiverClosed,
    /// 서버/전송 계층이 연결을 끊음
    Dropped { was_connected: bool },
}

/// Socket.IO 푸시 클라이언트
pub struct SocketIoPushClient {
    base_url: String,
    max_retry_secs: u64,
    connectivity: Option<SharedConnectivityManager>,
}

impl SocketIoPushClient {
    pub fn new(base_url: &str, max_retry_secs: u64) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retry_secs: max_retry_secs.max(1),
            connectivity: None,
        }
    }

    /// 연결/끊김을 연결 상태 관리자에 기록
    pub fn with_connectivity(mut self, connectivity: SharedConnectivityManager) -> Self {
        self.connectivity = Some(connectivity);
        self
    }

    /// `http(s)://host` → `ws(s)://host/socket.io/?EIO=4&transport=websocket`
    pub fn socket_url(&self) -> Result<String, CoreError> {
        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| CoreError::Config(format!("잘못된 서버 주소: {}: {e}", self.base_url)))?;
        let ws_base = match parsed.scheme() {
            "http" => self.base_url.replacen("http://", "ws://", 1),
            "https" => self.base_url.replacen("https://", "wss://", 1),
            "ws" | "wss" => self.base_url.clone(),
            other => {
                return Err(CoreError::Config(format!(
                    "지원하지 않는 스킴: {other}"
                )))
            }
        };
        Ok(format!("{ws_base}{SOCKET_IO_PATH}"))
    }

    /// Socket.IO 이벤트를 `PushEvent`로 변환
    pub(crate) fn parse_event(name: &str, data: Value) -> Option<PushEvent> {
        match name {
            "monitoring_update" => match serde_json::from_value::<MonitoringSnapshot>(data) {
                Ok(snapshot) => Some(PushEvent::MonitoringUpdate(Box::new(snapshot))),
                Err(e) => {
                    warn!("monitoring_update 페이로드 파싱 실패: {e}");
                    None
                }
            },
            "event_created" => Some(PushEvent::EventCreated(data)),
            "event_updated" => Some(PushEvent::EventUpdated(data)),
            "event_deleted" => {
                let id = data
                    .get("id")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                Some(PushEvent::EventDeleted { id })
            }
            _ => {
                debug!("알 수 없는 Socket.IO 이벤트: {name}");
                None
            }
        }
    }

    /// 한 번의 WebSocket 세션
    async fn run_session(
        &self,
        url: &str,
        tx: &mpsc::Sender<PushEvent>,
        retry_delay: &mut u64,
    ) -> Result<SessionEnd, CoreError> {
        let (ws_stream, _) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| CoreError::PushChannel(format!("WebSocket 연결 실패: {e}")))?;
        let (mut write, mut read) = ws_stream.split();
        let mut connected = false;

        while let Some(msg) = read.next().await {
            let text = match msg {
                Ok(Message::Text(text)) => text,
                Ok(Message::Close(_)) => break,
                Ok(_) => continue,
                Err(e) => {
                    warn!("WebSocket 수신 에러: {e}");
                    break;
                }
            };

            let reply = match Frame::parse(&text) {
                Frame::Open => Some("40"),
                Frame::Ping => Some("3"),
                Frame::Connect => {
                    connected = true;
                    *retry_delay = 1;
                    if let Some(c) = &self.connectivity {
                        c.record_success();
                    }
                    info!("푸시 채널 연결됨");
                    if tx.send(PushEvent::Connected).await.is_err() {
                        return Ok(SessionEnd::ReceiverClosed);
                    }
                    None
                }
                Frame::Event { name, data } => {
                    if let Some(event) = Self::parse_event(&name, data) {
                        if tx.send(event).await.is_err() {
                            return Ok(SessionEnd::ReceiverClosed);
                        }
                    }
                    None
                }
                Frame::Close | Frame::Disconnect => break,
                Frame::Other => None,
            };

            if let Some(reply) = reply {
                write
                    .send(Message::text(reply.to_string()))
                    .await
                    .map_err(|e| CoreError::PushChannel(format!("WebSocket 전송 실패: {e}")))?;
            }
        }

        Ok(SessionEnd::Dropped {
            was_connected: connected,
        })
    }
}

#[async_trait]
impl PushChannel for SocketIoPushClient {
    async fn connect(&self, tx: mpsc::Sender<PushEvent>) -> Result<(), CoreError> {
        let url = self.socket_url()?;
        info!("푸시 채널 연결 시작: {url}");

        let mut retry_delay = 1u64;

        loop {
            match self.run_session(&url, &tx, &mut retry_delay).await {
                Ok(SessionEnd::ReceiverClosed) => {
                    info!("푸시 이벤트 채널 닫힘, 연결 종료");
                    return Ok(());
                }
                Ok(SessionEnd::Dropped { was_connected }) => {
                    if was_connected {
                        if let Some(c) = &self.connectivity {
                            c.mark_disconnected();
                        }
                        if tx.send(PushEvent::Disconnected).await.is_err() {
                            return Ok(());
                        }
                    }
                }
                Err(e) => {
                    warn!("푸시 채널 에러: {e}");
                    if let Some(c) = &self.connectivity {
                        c.record_failure();
                    }
                }
            }

            if tx.is_closed() {
                return Ok(());
            }

            warn!("푸시 채널 재연결 대기: {retry_delay}초");
            tokio::time::sleep(Duration::from_secs(retry_delay)).await;
            retry_delay = (retry_delay * 2).min(self.max_retry_secs);
        }
    }
}
