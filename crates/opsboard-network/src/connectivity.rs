//! 백엔드 연결 상태 관리.
//!
//! REST 요청 결과와 푸시 채널 연결/끊김을 기록해 상태 표시기에 반영한다.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// 연결 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// 연결됨
    Connected,
    /// 연결 끊김
    Disconnected,
    /// 재연결 시도 중
    Reconnecting,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionStatus::Connected => write!(f, "Connected"),
            ConnectionStatus::Disconnected => write!(f, "Disconnected"),
            ConnectionStatus::Reconnecting => write!(f, "Reconnecting"),
        }
    }
}

/// 연결 상태 관리자
///
/// 연속 실패가 임계값에 도달하면 `Disconnected`로 전환하고,
/// 성공 한 번이면 `Connected`로 복구한다.
pub struct ConnectivityManager {
    is_online: AtomicBool,
    failure_count: AtomicU64,
    status_tx: watch::Sender<ConnectionStatus>,
    status_rx: watch::Receiver<ConnectionStatus>,
    offline_threshold: u64,
}

impl ConnectivityManager {
    /// `offline_threshold`: 이 횟수만큼 연속 실패하면 끊김으로 전환
    pub fn new(offline_threshold: u64) -> Self {
        let (status_tx, status_rx) = watch::channel(ConnectionStatus::Connected);
        Self {
            is_online: AtomicBool::new(true),
            failure_count: AtomicU64::new(0),
            status_tx,
            status_rx,
            offline_threshold: offline_threshold.max(1),
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        *self.status_rx.borrow()
    }

    /// 상태 변경 수신기 생성
    pub fn subscribe(&self) -> watch::Receiver<ConnectionStatus> {
        self.status_rx.clone()
    }

    /// 성공 기록: 온라인 전환 + 실패 카운터 리셋
    pub fn record_success(&self) {
        let was_offline = !self.is_online.swap(true, Ordering::Relaxed);
        let had_failures = self.failure_count.swap(0, Ordering::Relaxed) > 0;

        if was_offline {
            info!("백엔드 연결 복구됨");
        }
        if was_offline || had_failures {
            self.set_status(ConnectionStatus::Connected);
        }
    }

    /// 실패 기록: 임계값 도달 시 끊김 전환
    pub fn record_failure(&self) {
        let count = self.failure_count.fetch_add(1, Ordering::Relaxed) + 1;
        debug!("연결 실패 기록 (연속 {}회)", count);

        if count >= self.offline_threshold {
            let was_online = self.is_online.swap(false, Ordering::Relaxed);
            if was_online {
                warn!("연속 {}회 실패: 백엔드 연결 끊김", count);
                self.set_status(ConnectionStatus::Disconnected);
            }
        } else {
            self.set_status(ConnectionStatus::Reconnecting);
        }
    }

    /// 푸시 채널이 끊겼을 때 즉시 끊김 상태로 전환
    pub fn mark_disconnected(&self) {
        self.failure_count
            .fetch_max(self.offline_threshold, Ordering::Relaxed);
        if self.is_online.swap(false, Ordering::Relaxed) {
            self.set_status(ConnectionStatus::Disconnected);
        }
    }

    /// 값이 바뀔 때만 구독자에게 알린다
    fn set_status(&self, status: ConnectionStatus) {
        self.status_tx.send_if_modified(|current| {
            if *current == status {
                return false;
            }
            *current = status;
            true
        });
    }
}

impl Default for ConnectivityManager {
    fn default() -> Self {
        Self::new(3)
    }
}

pub type SharedConnectivityManager = Arc<ConnectivityManager>;
