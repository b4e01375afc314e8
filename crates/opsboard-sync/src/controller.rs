//! 동기화 컨트롤러.
//!
//! REST 조회와 푸시 알림을 받아 [`DataStore`]를 갱신한다.
//!
//! - 조회 실패는 `warn!` 로그만 남기고 이전 상태를 유지한다 (재시도 없음)
//! - 이벤트 생성/변경/삭제 알림은 증분 반영 없이 전체 재조회로 처리한다
//! - 사용자 변경 요청은 입력 검증 → API 호출 → 전체 재조회 순서이며,
//!   이 경우에만 에러를 호출자에게 돌려준다

use opsboard_core::config::SyncConfig;
use opsboard_core::error::CoreError;
use opsboard_core::models::asset::Asset;
use opsboard_core::models::event::{Event, EventStatus, EventUpdate, NewEvent};
use opsboard_core::models::monitoring::{Alert, MonitoringSnapshot};
use opsboard_core::models::settings::Acknowledgement;
use opsboard_core::ports::api_client::{DashboardApi, PushEvent};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::banner::{AlertBanner, BannerNotice};
use crate::feed::{ActivityEntry, ActivityFeed};
use crate::store::{ApplyOutcome, Collection, DataStore, RequestToken};

/// 컨트롤러가 내보내는 상태 변경 알림
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// 컬렉션이 새 응답으로 교체됨
    Reloaded(Collection),
    /// 조회 실패 (이전 상태 유지)
    FetchFailed { collection: Collection, error: String },
    /// 푸시 채널 연결 상태 변경
    ConnectionChanged(bool),
    BannerRaised(BannerNotice),
    BannerDismissed { generation: u64 },
    Activity(ActivityEntry),
}

pub struct SyncController {
    api: Arc<dyn DashboardApi>,
    config: SyncConfig,
    store: Arc<Mutex<DataStore>>,
    banner: Arc<Mutex<AlertBanner>>,
    feed: Arc<Mutex<ActivityFeed>>,
    event_tx: Option<broadcast::Sender<SyncEvent>>,
}

impl SyncController {
    pub fn new(api: Arc<dyn DashboardApi>, config: SyncConfig) -> Self {
        let feed = ActivityFeed::new(config.activity_feed_limit);
        Self {
            api,
            config,
            store: Arc::new(Mutex::new(DataStore::new())),
            banner: Arc::new(Mutex::new(AlertBanner::new())),
            feed: Arc::new(Mutex::new(feed)),
            event_tx: None,
        }
    }

    /// 상태 변경 브로드캐스트 채널 설정
    pub fn with_event_tx(mut self, event_tx: broadcast::Sender<SyncEvent>) -> Self {
        self.event_tx = Some(event_tx);
        self
    }

    fn publish(&self, event: SyncEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event);
        }
    }

    // ── 조회 ──────────────────────────────────────────────

    /// 토큰 발급 → 조회 → 토큰 순서 검사 후 반영
    ///
    /// 실패하면 `None`. 상태는 건드리지 않는다.
    async fn reload<T, Fut>(
        &self,
        collection: Collection,
        fetch: Fut,
        apply: impl FnOnce(&mut DataStore, RequestToken, T) -> ApplyOutcome,
    ) -> Option<ApplyOutcome>
    where
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let token = self.store.lock().begin(collection);
        match fetch.await {
            Ok(data) => {
                let outcome = {
                    let mut store = self.store.lock();
                    apply(&mut *store, token, data)
                };
                if outcome.is_applied() {
                    self.publish(SyncEvent::Reloaded(collection));
                }
                Some(outcome)
            }
            Err(e) => {
                warn!("{collection} 조회 실패, 이전 상태 유지: {e}");
                self.publish(SyncEvent::FetchFailed {
                    collection,
                    error: e.to_string(),
                });
                None
            }
        }
    }

    pub async fn reload_events(&self) -> Option<ApplyOutcome> {
        self.reload(
            Collection::Events,
            self.api.fetch_events(),
            DataStore::apply_events,
        )
        .await
    }

    pub async fn reload_assets(&self) -> Option<ApplyOutcome> {
        self.reload(
            Collection::Assets,
            self.api.fetch_assets(),
            DataStore::apply_assets,
        )
        .await
    }

    pub async fn reload_alerts(&self) -> Option<ApplyOutcome> {
        self.reload(
            Collection::Alerts,
            self.api.fetch_alerts(),
            DataStore::apply_alerts,
        )
        .await
    }

    /// 현재 스냅샷 조회 + 알림 이력 갱신
    pub async fn refresh_monitoring(&self) -> Option<ApplyOutcome> {
        let token = self.store.lock().begin(Collection::Monitoring);
        let snapshot = match self.api.fetch_current_data().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("monitoring 조회 실패, 이전 상태 유지: {e}");
                self.publish(SyncEvent::FetchFailed {
                    collection: Collection::Monitoring,
                    error: e.to_string(),
                });
                return None;
            }
        };
        let outcome = self.apply_snapshot(token, snapshot);
        if outcome.is_applied() {
            self.reload_alerts().await;
        }
        Some(outcome)
    }

    /// 초기 전체 로드
    pub async fn initial_load(&self) {
        info!("초기 데이터 로드");
        tokio::join!(
            self.reload_assets(),
            self.reload_events(),
            self.refresh_monitoring(),
        );
    }

    /// 스냅샷 반영 + 배너/활동 피드 갱신
    ///
    /// 늦게 도착한 스냅샷은 배너/피드에도 반영하지 않는다.
    fn apply_snapshot(&self, token: RequestToken, snapshot: MonitoringSnapshot) -> ApplyOutcome {
        let (notice, entry) = {
            let mut store = self.store.lock();
            if !store.apply_monitoring(token, snapshot).is_applied() {
                return ApplyOutcome::Stale;
            }
            match store.monitoring().value() {
                Some(current) => (
                    self.banner.lock().observe(current),
                    self.feed.lock().record(current),
                ),
                None => (None, None),
            }
        };

        self.publish(SyncEvent::Reloaded(Collection::Monitoring));
        if let Some(entry) = entry {
            self.publish(SyncEvent::Activity(entry));
        }
        if let Some(notice) = notice {
            info!("{}", notice.message);
            self.schedule_dismiss(notice.generation);
            self.publish(SyncEvent::BannerRaised(notice));
        }
        ApplyOutcome::Applied
    }

    /// 배너 자동 닫힘 타이머
    fn schedule_dismiss(&self, generation: u64) {
        let banner = self.banner.clone();
        let event_tx = self.event_tx.clone();
        let delay = Duration::from_millis(self.config.banner_dismiss_ms);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if banner.lock().dismiss(generation) {
                debug!("배너 자동 닫힘 (generation={generation})");
                if let Some(tx) = event_tx {
                    let _ = tx.send(SyncEvent::BannerDismissed { generation });
                }
            }
        });
    }

    // ── 푸시 ──────────────────────────────────────────────

    pub async fn handle_push(&self, event: PushEvent) {
        match event {
            PushEvent::Connected => self.publish(SyncEvent::ConnectionChanged(true)),
            PushEvent::Disconnected => self.publish(SyncEvent::ConnectionChanged(false)),
            PushEvent::MonitoringUpdate(snapshot) => {
                let token = self.store.lock().begin(Collection::Monitoring);
                if self.apply_snapshot(token, *snapshot).is_applied() {
                    self.reload_alerts().await;
                }
            }
            other => {
                if other.invalidates_events() {
                    debug!("이벤트 변경 알림 수신, 전체 재조회");
                    self.reload_events().await;
                }
            }
        }
    }

    /// 푸시 이벤트/주기 조회 루프
    ///
    /// `shutdown`이 `true`가 되거나 푸시 채널이 닫히면 반환한다.
    pub async fn run(
        &self,
        mut push_rx: mpsc::Receiver<PushEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut monitoring_tick = poll_interval(self.config.monitoring_poll_interval_secs);
        let mut events_tick = poll_interval(self.config.events_poll_interval_secs);

        loop {
            tokio::select! {
                event = push_rx.recv() => match event {
                    Some(event) => self.handle_push(event).await,
                    None => {
                        info!("푸시 채널 종료, 동기화 루프 종료");
                        break;
                    }
                },
                _ = tick(&mut monitoring_tick) => {
                    self.refresh_monitoring().await;
                }
                _ = tick(&mut events_tick) => {
                    self.reload_events().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("동기화 루프 종료");
                        break;
                    }
                }
            }
        }
    }

    // ── 사용자 변경 ───────────────────────────────────────

    pub async fn create_event(&self, new_event: NewEvent) -> Result<Event, CoreError> {
        new_event.validate()?;
        let created = self.api.create_event(&new_event).await?;
        info!("이벤트 생성: {}", created.id);
        self.reload_events().await;
        Ok(created)
    }

    /// 상태 변경. 전이 규칙은 백엔드가 판단한다.
    pub async fn update_status(&self, id: &str, status: EventStatus) -> Result<Event, CoreError> {
        self.update_event(id, EventUpdate::status(status)).await
    }

    pub async fn add_note(&self, id: &str, text: &str) -> Result<Event, CoreError> {
        self.update_event(id, EventUpdate::note(text)).await
    }

    async fn update_event(&self, id: &str, update: EventUpdate) -> Result<Event, CoreError> {
        update.validate()?;
        let updated = self.api.update_event(id, &update).await?;
        info!("이벤트 업데이트: {id}");
        self.reload_events().await;
        Ok(updated)
    }

    pub async fn delete_event(&self, id: &str) -> Result<Acknowledgement, CoreError> {
        let ack = self.api.delete_event(id).await?;
        info!("이벤트 삭제: {id}");
        self.reload_events().await;
        Ok(ack)
    }

    // ── 조회용 접근자 (복제본) ─────────────────────────────

    pub fn events(&self) -> Vec<Event> {
        self.store.lock().events().value().clone()
    }

    pub fn event(&self, id: &str) -> Option<Event> {
        self.store.lock().find_event(id).cloned()
    }

    pub fn assets(&self) -> Vec<Asset> {
        self.store.lock().assets().value().clone()
    }

    pub fn monitoring(&self) -> Option<MonitoringSnapshot> {
        self.store.lock().monitoring().value().clone()
    }

    /// 최근 알림 (설정된 개수만큼, 최신순)
    pub fn recent_alerts(&self) -> Vec<Alert> {
        self.store
            .lock()
            .alerts()
            .value()
            .iter()
            .take(self.config.recent_alerts_limit)
            .cloned()
            .collect()
    }

    pub fn is_loaded(&self, collection: Collection) -> bool {
        let store = self.store.lock();
        match collection {
            Collection::Assets => store.assets().is_loaded(),
            Collection::Events => store.events().is_loaded(),
            Collection::Monitoring => store.monitoring().is_loaded(),
            Collection::Alerts => store.alerts().is_loaded(),
        }
    }

    pub fn banner(&self) -> Option<BannerNotice> {
        self.banner.lock().current().cloned()
    }

    pub fn dismiss_banner(&self) -> Option<BannerNotice> {
        self.banner.lock().dismiss_current()
    }

    pub fn activity(&self) -> Vec<ActivityEntry> {
        self.feed.lock().entries().cloned().collect()
    }
}

/// 0초이거나 첫 시각을 표현할 수 없을 만큼 크면 주기 조회 없음
fn poll_interval(secs: u64) -> Option<Interval> {
    if secs == 0 {
        return None;
    }
    let period = Duration::from_secs(secs);
    let Some(start) = tokio::time::Instant::now().checked_add(period) else {
        warn!("조회 주기 {}초가 너무 커서 주기 조회를 끕니다", secs);
        return None;
    };
    let mut interval = tokio::time::interval_at(start, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    Some(interval)
}

async fn tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
