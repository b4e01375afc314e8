//! 메모리 내 DataStore.
//!
//! 컬렉션별로 마지막 서버 응답 전체를 보관한다. 부분 병합은 없다.
//! 요청마다 [`RequestToken`]을 발급하고, 더 늦게 시작된 요청이 이미 반영된 뒤
//! 도착한 응답은 [`ApplyOutcome::Stale`]로 버린다.

use opsboard_core::models::asset::Asset;
use opsboard_core::models::event::Event;
use opsboard_core::models::monitoring::{Alert, MonitoringSnapshot};
use std::fmt;
use tracing::{debug, warn};

/// 저장소가 관리하는 컬렉션
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Assets,
    Events,
    Monitoring,
    Alerts,
}

impl Collection {
    const COUNT: usize = 4;

    fn index(self) -> usize {
        match self {
            Collection::Assets => 0,
            Collection::Events => 1,
            Collection::Monitoring => 2,
            Collection::Alerts => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Assets => "assets",
            Collection::Events => "events",
            Collection::Monitoring => "monitoring",
            Collection::Alerts => "alerts",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 컬렉션별 단조 증가 요청 순번
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken {
    collection: Collection,
    seq: u64,
}

impl RequestToken {
    pub fn collection(&self) -> Collection {
        self.collection
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// 응답 반영 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// 더 새로운 요청의 결과가 이미 반영됨
    Stale,
}

impl ApplyOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ApplyOutcome::Applied)
    }
}

/// 마지막으로 반영된 요청 순번과 함께 보관되는 값
#[derive(Debug, Clone, Default)]
pub struct Versioned<T> {
    value: T,
    /// 0이면 아직 한 번도 반영되지 않음
    applied_seq: u64,
}

impl<T> Versioned<T> {
    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn applied_seq(&self) -> u64 {
        self.applied_seq
    }

    pub fn is_loaded(&self) -> bool {
        self.applied_seq > 0
    }

    fn apply(&mut self, seq: u64, value: T) -> ApplyOutcome {
        if seq <= self.applied_seq {
            return ApplyOutcome::Stale;
        }
        self.value = value;
        self.applied_seq = seq;
        ApplyOutcome::Applied
    }
}

/// 컬렉션 저장소
#[derive(Debug, Default)]
pub struct DataStore {
    issued: [u64; Collection::COUNT],
    assets: Versioned<Vec<Asset>>,
    events: Versioned<Vec<Event>>,
    monitoring: Versioned<Option<MonitoringSnapshot>>,
    alerts: Versioned<Vec<Alert>>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 요청 시작: 새 토큰 발급
    pub fn begin(&mut self, collection: Collection) -> RequestToken {
        let slot = &mut self.issued[collection.index()];
        *slot += 1;
        RequestToken {
            collection,
            seq: *slot,
        }
    }

    fn check(token: RequestToken, expected: Collection) -> bool {
        if token.collection != expected {
            warn!(
                "토큰 컬렉션 불일치: {} 토큰으로 {} 반영 시도",
                token.collection, expected
            );
            return false;
        }
        true
    }

    fn log_outcome(token: RequestToken, outcome: ApplyOutcome) -> ApplyOutcome {
        match outcome {
            ApplyOutcome::Applied => debug!("{} 반영 (seq={})", token.collection, token.seq),
            ApplyOutcome::Stale => warn!(
                "늦게 도착한 {} 응답 무시 (seq={})",
                token.collection, token.seq
            ),
        }
        outcome
    }

    pub fn apply_assets(&mut self, token: RequestToken, assets: Vec<Asset>) -> ApplyOutcome {
        if !Self::check(token, Collection::Assets) {
            return ApplyOutcome::Stale;
        }
        Self::log_outcome(token, self.assets.apply(token.seq, assets))
    }

    pub fn apply_events(&mut self, token: RequestToken, events: Vec<Event>) -> ApplyOutcome {
        if !Self::check(token, Collection::Events) {
            return ApplyOutcome::Stale;
        }
        Self::log_outcome(token, self.events.apply(token.seq, events))
    }

    pub fn apply_monitoring(
        &mut self,
        token: RequestToken,
        snapshot: MonitoringSnapshot,
    ) -> ApplyOutcome {
        if !Self::check(token, Collection::Monitoring) {
            return ApplyOutcome::Stale;
        }
        Self::log_outcome(token, self.monitoring.apply(token.seq, Some(snapshot)))
    }

    pub fn apply_alerts(&mut self, token: RequestToken, alerts: Vec<Alert>) -> ApplyOutcome {
        if !Self::check(token, Collection::Alerts) {
            return ApplyOutcome::Stale;
        }
        Self::log_outcome(token, self.alerts.apply(token.seq, alerts))
    }

    pub fn assets(&self) -> &Versioned<Vec<Asset>> {
        &self.assets
    }

    pub fn events(&self) -> &Versioned<Vec<Event>> {
        &self.events
    }

    pub fn monitoring(&self) -> &Versioned<Option<MonitoringSnapshot>> {
        &self.monitoring
    }

    /// 알림 이력 (최신순)
    pub fn alerts(&self) -> &Versioned<Vec<Alert>> {
        &self.alerts
    }

    pub fn find_event(&self, id: &str) -> Option<&Event> {
        self.events.value.iter().find(|e| e.id == id)
    }
}
