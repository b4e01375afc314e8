//! 서브커맨드 실행.
//!
//! 설정 로드 → 어댑터/컨트롤러 배선 → 조회 또는 변경 → 렌더링.
//! 각 명령은 출력할 문자열을 돌려주며 `main`이 stdout에 쓴다.

use anyhow::{bail, Result};
use opsboard_analysis::filter::{filter_assets, filter_events, filter_hosts, AssetCriteria};
use opsboard_analysis::query::EventQuery;
use opsboard_analysis::stats::EventStats;
use opsboard_core::config::{AppConfig, ThresholdConfig};
use opsboard_core::config_manager::ConfigManager;
use opsboard_core::error::CoreError;
use opsboard_core::models::event::NewEvent;
use opsboard_core::models::settings::GrafanaSettings;
use opsboard_core::models::timestamp;
use opsboard_core::ports::api_client::{DashboardApi, PushChannel};
use opsboard_network::connectivity::{
    ConnectionStatus, ConnectivityManager, SharedConnectivityManager,
};
use opsboard_network::http_client::HttpDashboardApi;
use opsboard_network::ws_client::SocketIoPushClient;
use opsboard_sync::controller::{SyncController, SyncEvent};
use opsboard_sync::store::Collection;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::cli::{
    AssetArgs, Cli, Command, DashboardArgs, EventCommand, EventListArgs, GrafanaCommand,
    SettingsCommand,
};
use crate::event_bus::EventBus;
use crate::lifecycle::LifecycleManager;
use crate::render::{self, DashboardView};

/// 설정 파일 로드 후 CLI 재정의를 적용한다
///
/// 설정 파일을 읽지 못하면 경고 후 기본값을 쓴다. 최종 설정이 유효하지 않으면 에러.
pub fn load_config(config_path: Option<&Path>, server_override: Option<&str>) -> Result<AppConfig> {
    let manager = match config_path {
        Some(path) => ConfigManager::with_path(path.to_path_buf()),
        None => ConfigManager::new(),
    };
    let mut config = match manager {
        Ok(manager) => {
            debug!("설정 파일: {}", manager.config_path().display());
            manager.get().clone()
        }
        Err(e) => {
            warn!("설정 로드 실패, 기본값 사용: {e}");
            AppConfig::default_config()
        }
    };

    if let Some(server) = server_override {
        config.server.base_url = server.trim_end_matches('/').to_string();
    }
    config.validate()?;
    Ok(config)
}

/// 명령 실행에 필요한 어댑터 묶음
pub struct AppContext {
    pub config: AppConfig,
    pub api: Arc<HttpDashboardApi>,
    pub connectivity: SharedConnectivityManager,
}

impl AppContext {
    pub fn new(config: AppConfig) -> Result<Self> {
        let connectivity: SharedConnectivityManager = Arc::new(ConnectivityManager::default());
        let api = HttpDashboardApi::new(
            &config.server.base_url,
            Duration::from_millis(config.server.request_timeout_ms),
        )?
        .with_connectivity(connectivity.clone());

        Ok(Self {
            config,
            api: Arc::new(api),
            connectivity,
        })
    }

    pub fn controller(&self) -> SyncController {
        SyncController::new(self.api.clone(), self.config.sync.clone())
    }
}

/// CLI 진입점
pub async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref(), cli.server.as_deref())?;
    info!("백엔드: {}", config.server.base_url);
    let ctx = AppContext::new(config)?;
    let ctrl = ctx.controller();

    let output = match cli.command {
        Command::Assets(args) => list_assets(&ctrl, &args).await?,
        Command::Events(args) => list_events(&ctrl, &args).await?,
        Command::Event(cmd) => event_command(&ctrl, cmd).await?,
        Command::Dashboard(args) if args.watch => {
            return watch_dashboard(&ctx, &args).await;
        }
        Command::Dashboard(args) => dashboard(&ctrl, &args, &ctx.config.thresholds).await?,
        Command::Settings(SettingsCommand::Grafana(cmd)) => {
            grafana_command(ctx.api.as_ref(), cmd).await?
        }
    };
    println!("{output}");
    Ok(())
}

// ── 자산/이벤트 ─────────────────────────────────────────

pub async fn list_assets(ctrl: &SyncController, args: &AssetArgs) -> Result<String> {
    if ctrl.reload_assets().await.is_none() {
        bail!("자산 목록을 가져오지 못했습니다");
    }
    let criteria = AssetCriteria {
        status: args.status.clone(),
        brand: args.brand.clone(),
        asset_type: args.asset_type.clone(),
        search: args.search.clone(),
    };
    let assets = ctrl.assets();
    let filtered = filter_assets(&assets, &criteria);
    debug!("자산 {}건 중 {}건 표시", assets.len(), filtered.len());
    Ok(render::render_assets(&filtered))
}

/// 이벤트 목록
///
/// `--query` 파라미터를 먼저 적용하고, 개별 플래그가 있으면 그 값이 우선한다.
/// 단 `status=unresolved`는 `--status`보다 우선한다.
pub async fn list_events(ctrl: &SyncController, args: &EventListArgs) -> Result<String> {
    if ctrl.reload_events().await.is_none() {
        bail!("이벤트 목록을 가져오지 못했습니다");
    }

    let query = args
        .query
        .as_deref()
        .map(EventQuery::parse)
        .unwrap_or_default();
    let mut criteria = query.to_criteria();
    if args.status.is_some() {
        criteria.status = args.status;
    }
    if args.severity.is_some() {
        criteria.severity = args.severity;
    }
    if args.priority.is_some() {
        criteria.priority = args.priority;
    }
    criteria.search = args.search.clone();

    let events = ctrl.events();
    let filtered = filter_events(&events, &criteria);
    let stats = EventStats::from_events(&events);
    Ok(render::render_events(
        &filtered,
        query.describe().as_deref(),
        &stats,
    ))
}

pub async fn event_command(ctrl: &SyncController, cmd: EventCommand) -> Result<String> {
    match cmd {
        EventCommand::Create(args) => {
            let mut new_event = NewEvent::new(args.title, args.description);
            if let Some(source) = args.source {
                new_event.source = source;
            }
            if let Some(category) = args.category {
                new_event.category = category;
            }
            if let Some(severity) = args.severity {
                new_event.severity = severity;
            }
            if let Some(priority) = args.priority {
                new_event.priority = priority;
            }
            if let Some(assigned_to) = args.assigned_to {
                new_event.assigned_to = assigned_to;
            }
            let created = ctrl.create_event(new_event).await?;
            Ok(format!("Created event {} ({})", created.number, created.id))
        }
        EventCommand::Status { id, status } => {
            let updated = ctrl.update_status(&id, status).await?;
            Ok(format!(
                "Event {} status set to {}",
                updated.id,
                updated.status.label()
            ))
        }
        EventCommand::Note { id, text } => {
            let updated = ctrl.add_note(&id, &text).await?;
            Ok(format!(
                "Note added to event {} ({} notes)",
                updated.id,
                updated.notes.len()
            ))
        }
        EventCommand::Delete { id } => {
            let ack = ctrl.delete_event(&id).await?;
            if !ack.success {
                bail!(
                    "이벤트 삭제 실패: {}",
                    ack.error.as_deref().unwrap_or("알 수 없는 오류")
                );
            }
            Ok(format!("Deleted event {id}"))
        }
        EventCommand::Show { id } => {
            if ctrl.reload_events().await.is_none() {
                bail!("이벤트 목록을 가져오지 못했습니다");
            }
            let event = ctrl.event(&id).ok_or_else(|| CoreError::NotFound {
                resource_type: "Event".to_string(),
                id: id.clone(),
            })?;
            Ok(render::render_event_detail(&event))
        }
    }
}

// ── 대시보드 ────────────────────────────────────────────

/// 한 번 조회 후 대시보드 출력
pub async fn dashboard(
    ctrl: &SyncController,
    args: &DashboardArgs,
    thresholds: &ThresholdConfig,
) -> Result<String> {
    if ctrl.refresh_monitoring().await.is_none() {
        bail!("모니터링 데이터를 가져오지 못했습니다");
    }
    Ok(dashboard_screen(ctrl, args, thresholds))
}

/// 컨트롤러 현재 상태로 대시보드 화면 구성
pub fn dashboard_screen(
    ctrl: &SyncController,
    args: &DashboardArgs,
    thresholds: &ThresholdConfig,
) -> String {
    let snapshot = ctrl.monitoring();
    let recent_alerts = ctrl.recent_alerts();
    let banner = ctrl.banner();
    let activity = ctrl.activity();
    let hosts = snapshot
        .as_ref()
        .map(|s| {
            filter_hosts(
                &s.servers,
                args.view.into(),
                args.search.as_deref().unwrap_or(""),
                &thresholds.card_alert,
            )
        })
        .unwrap_or_default();

    render::render_dashboard(&DashboardView {
        snapshot: snapshot.as_ref(),
        hosts,
        thresholds,
        recent_alerts: &recent_alerts,
        banner: banner.as_ref(),
        activity: &activity,
    })
}

/// 감시 모드: 푸시 채널과 주기 조회를 따라가며 변경을 출력한다
///
/// SIGINT/SIGTERM 또는 푸시 채널 종료 시 반환한다.
pub async fn watch_dashboard(ctx: &AppContext, args: &DashboardArgs) -> Result<()> {
    let bus = EventBus::default();
    let mut events = bus.subscribe();
    let ctrl = ctx.controller().with_event_tx(bus.sender());
    let lifecycle = LifecycleManager::new();
    let thresholds = ctx.config.thresholds;

    if ctrl.refresh_monitoring().await.is_none() {
        warn!("초기 모니터링 조회 실패, 푸시 대기");
    }
    // 초기 조회에서 나온 알림은 이미 화면에 포함된다
    while events.try_recv().is_ok() {}
    println!("{}", render::render_connection(ctx.connectivity.status()));
    println!("{}", dashboard_screen(&ctrl, args, &thresholds));
    let connection_rx = ctx.connectivity.subscribe();

    let (push_tx, push_rx) = mpsc::channel(64);
    let push = SocketIoPushClient::new(
        &ctx.config.server.base_url,
        ctx.config.server.push_reconnect_max_secs,
    )
    .with_connectivity(ctx.connectivity.clone());
    let push_task = tokio::spawn(async move {
        if let Err(e) = push.connect(push_tx).await {
            error!("푸시 채널 종료: {e}");
        }
    });

    let printer = async {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Some(text) = describe_sync_event(&ctrl, &event, args, &thresholds) {
                        println!("{text}");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("화면 갱신 {n}건 누락");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    tokio::select! {
        _ = ctrl.run(push_rx, lifecycle.subscribe()) => {}
        _ = printer => {}
        _ = print_connection_changes(connection_rx) => {}
        _ = lifecycle.wait_for_signal() => {}
    }

    push_task.abort();
    info!("감시 모드 종료");
    Ok(())
}

/// REST 요청과 푸시 채널이 기록한 연결 상태가 바뀔 때마다 표시줄 출력
async fn print_connection_changes(mut rx: watch::Receiver<ConnectionStatus>) {
    while rx.changed().await.is_ok() {
        let status = *rx.borrow_and_update();
        println!("{}", render::render_connection(status));
    }
}

/// 감시 모드에서 상태 변경 하나를 출력 문자열로
pub fn describe_sync_event(
    ctrl: &SyncController,
    event: &SyncEvent,
    args: &DashboardArgs,
    thresholds: &ThresholdConfig,
) -> Option<String> {
    match event {
        SyncEvent::Reloaded(Collection::Monitoring) => {
            Some(dashboard_screen(ctrl, args, thresholds))
        }
        SyncEvent::Reloaded(Collection::Alerts) => {
            Some(render::render_recent_alerts(&ctrl.recent_alerts()))
        }
        SyncEvent::Reloaded(_) | SyncEvent::BannerDismissed { .. } => None,
        SyncEvent::FetchFailed { collection, error } => {
            Some(format!("{collection} refresh failed: {error}"))
        }
        SyncEvent::ConnectionChanged(true) => Some("Push channel connected".to_string()),
        SyncEvent::ConnectionChanged(false) => {
            Some("Push channel disconnected, reconnecting".to_string())
        }
        SyncEvent::BannerRaised(notice) => Some(render::render_banner(notice)),
        SyncEvent::Activity(entry) => Some(format!(
            "[{}] {}",
            timestamp::format(&entry.timestamp),
            entry.text
        )),
    }
}

// ── 설정 ────────────────────────────────────────────────

pub async fn grafana_command(api: &dyn DashboardApi, cmd: GrafanaCommand) -> Result<String> {
    match cmd {
        GrafanaCommand::Show => {
            let settings = api.fetch_grafana_settings().await?;
            Ok(render::render_grafana_settings(&settings))
        }
        GrafanaCommand::Save { url, api_key } => {
            let settings = GrafanaSettings::new(url, api_key);
            settings.validate()?;
            let ack = api.save_grafana_settings(&settings).await?;
            if !ack.success {
                bail!(
                    "Grafana 설정 저장 실패: {}",
                    ack.error.as_deref().unwrap_or("알 수 없는 오류")
                );
            }
            Ok("Grafana settings saved".to_string())
        }
        GrafanaCommand::Reset => {
            let ack = api.reset_grafana_settings().await?;
            if !ack.success {
                bail!(
                    "Grafana 설정 초기화 실패: {}",
                    ack.error.as_deref().unwrap_or("알 수 없는 오류")
                );
            }
            Ok("Grafana settings reset".to_string())
        }
        GrafanaCommand::Test { url, api_key } => {
            let settings = match (url, api_key) {
                (Some(url), Some(api_key)) => GrafanaSettings::new(url, api_key),
                _ => api.fetch_grafana_settings().await?,
            };
            settings.validate()?;
            let result = api.test_grafana_connection(&settings).await?;
            Ok(render::render_grafana_test(&result))
        }
    }
}
