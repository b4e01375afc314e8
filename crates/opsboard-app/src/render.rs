//! 터미널 텍스트 렌더링.
//!
//! 필터링/집계가 끝난 데이터를 받아 문자열로 만든다. 상태는 갖지 않는다.

use opsboard_analysis::health::{self, MetricLevel, ServerStatus, UtilizationLevel};
use opsboard_analysis::stats::EventStats;
use opsboard_core::config::ThresholdConfig;
use opsboard_core::models::asset::Asset;
use opsboard_core::models::event::Event;
use opsboard_core::models::monitoring::{
    Alert, AlertSeverity, MetricKind, MonitoredHost, MonitoringSnapshot,
};
use opsboard_core::models::settings::{GrafanaSettings, GrafanaTestResult};
use opsboard_core::models::timestamp;
use opsboard_network::connectivity::ConnectionStatus;
use opsboard_sync::banner::BannerNotice;
use opsboard_sync::feed::ActivityEntry;

/// 빈 필터 결과 문구
pub const NO_RESULTS: &str = "No results found";

/// 최근 알림이 없을 때 문구
pub const NO_ALERTS: &str = "No alerts to display";

/// 고정폭 텍스트 테이블
#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 행이 없으면 [`NO_RESULTS`]
    pub fn render(&self) -> String {
        if self.rows.is_empty() {
            return NO_RESULTS.to_string();
        }

        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let len = cell.chars().count();
                match widths.get_mut(i) {
                    Some(w) => *w = (*w).max(len),
                    None => widths.push(len),
                }
            }
        }

        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        lines.push(format_row(&self.headers, &widths));
        lines.push(
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("  "),
        );
        for row in &self.rows {
            lines.push(format_row(row, &widths));
        }
        lines.join("\n")
    }
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}

// ── 자산 ────────────────────────────────────────────────

pub fn render_assets(assets: &[&Asset]) -> String {
    let mut table = Table::new([
        "ID", "NAME", "TYPE", "BRAND", "MODEL", "STATUS", "LOCATION", "ASSIGNED",
    ]);
    for asset in assets {
        table.push_row(vec![
            asset.id.clone(),
            asset.name.clone(),
            asset.asset_type.clone(),
            asset.brand.clone(),
            asset.model.clone(),
            asset.status.clone(),
            asset.location.clone(),
            asset.assigned_to.clone(),
        ]);
    }
    table.render()
}

// ── 이벤트 ──────────────────────────────────────────────

/// 이벤트 목록. 활성 쿼리 필터가 있으면 배너를 먼저 출력한다.
pub fn render_events(events: &[&Event], active_filters: Option<&str>, stats: &EventStats) -> String {
    let mut sections = Vec::new();
    if let Some(banner) = active_filters {
        sections.push(banner.to_string());
    }
    sections.push(format!(
        "Total: {}  New: {}  In Progress: {}  Resolved: {}  Closed: {}",
        stats.total, stats.new, stats.in_progress, stats.resolved, stats.closed
    ));

    let mut table = Table::new([
        "NUMBER", "TITLE", "SOURCE", "SEVERITY", "PRIORITY", "STATUS", "ASSIGNED", "CREATED",
    ]);
    for event in events {
        table.push_row(vec![
            event.number.clone(),
            event.title.clone(),
            event.source.clone(),
            event.severity.to_string(),
            event.priority.to_string(),
            event.status.label(),
            event.assigned_to.clone(),
            timestamp::format(&event.created_at),
        ]);
    }
    sections.push(table.render());
    sections.join("\n\n")
}

pub fn render_event_detail(event: &Event) -> String {
    let mut lines = vec![
        format!("{} {}", event.number, event.title),
        format!("ID:          {}", event.id),
        format!("Status:      {}", event.status.label()),
        format!("Severity:    {}", event.severity),
        format!("Priority:    {}", event.priority),
        format!("Source:      {}", event.source),
        format!("Category:    {}", event.category),
        format!("Assigned to: {}", event.assigned_to),
        format!("Created:     {}", timestamp::format(&event.created_at)),
        format!("Updated:     {}", timestamp::format(&event.updated_at)),
    ];
    if let Some(resolved_at) = &event.resolved_at {
        lines.push(format!("Resolved:    {}", timestamp::format(resolved_at)));
    }
    lines.push(String::new());
    lines.push(event.description.clone());
    lines.push(String::new());
    if event.notes.is_empty() {
        lines.push("No notes".to_string());
    } else {
        lines.push(format!("Notes ({})", event.notes.len()));
        for note in &event.notes {
            lines.push(format!("  [{}] {}", timestamp::format(&note.timestamp), note.text));
        }
    }
    lines.join("\n")
}

// ── 대시보드 ────────────────────────────────────────────

/// 대시보드 한 화면에 필요한 입력
#[derive(Debug)]
pub struct DashboardView<'a> {
    pub snapshot: Option<&'a MonitoringSnapshot>,
    /// 보기 필터/검색이 적용된 호스트 카드
    pub hosts: Vec<&'a MonitoredHost>,
    pub thresholds: &'a ThresholdConfig,
    pub recent_alerts: &'a [Alert],
    pub banner: Option<&'a BannerNotice>,
    pub activity: &'a [ActivityEntry],
}

pub fn render_dashboard(view: &DashboardView<'_>) -> String {
    let mut sections = Vec::new();

    if let Some(banner) = view.banner {
        sections.push(render_banner(banner));
    }

    let Some(snapshot) = view.snapshot else {
        sections.push("Monitoring data not loaded".to_string());
        return sections.join("\n\n");
    };

    sections.push(render_kpis(snapshot, view.thresholds));
    sections.push(render_resource_averages(&snapshot.servers));
    sections.push(render_status_counts(&snapshot.servers, view.thresholds));
    sections.push(render_host_cards(&view.hosts, view.thresholds));
    sections.push(render_recent_alerts(view.recent_alerts));
    if !view.activity.is_empty() {
        sections.push(render_activity(view.activity));
    }
    sections.push(format!(
        "Last updated: {}",
        timestamp::format(&snapshot.timestamp)
    ));
    sections.join("\n\n")
}

pub fn render_banner(notice: &BannerNotice) -> String {
    format!("*** {} ***", notice.message)
}

/// 연결 상태 표시줄
pub fn render_connection(status: ConnectionStatus) -> String {
    format!("Backend: {status}")
}

fn render_kpis(snapshot: &MonitoringSnapshot, thresholds: &ThresholdConfig) -> String {
    let critical = snapshot.critical_alert_count();
    let issues = if critical > 0 {
        format!("{critical} Issues")
    } else {
        "No Issues".to_string()
    };
    let score = health::health_score(&snapshot.servers, &thresholds.score);
    format!(
        "Total Servers: {}  |  Critical Alerts: {}  |  Health Score: {}%",
        snapshot.servers.len(),
        issues,
        score
    )
}

fn render_resource_averages(servers: &[MonitoredHost]) -> String {
    let Some(averages) = health::resource_averages(servers) else {
        return format!("Resource Usage\n{NO_RESULTS}");
    };
    let mut lines = vec!["Resource Usage".to_string()];
    for kind in MetricKind::ALL {
        let value = averages.get(kind);
        lines.push(format!(
            "  {:<8} {:>5.1}% {} {}",
            kind.short_label(),
            value,
            bar(value),
            utilization_marker(health::utilization_level(value))
        ));
    }
    lines.join("\n")
}

fn render_status_counts(servers: &[MonitoredHost], thresholds: &ThresholdConfig) -> String {
    let counts = health::bucket_counts(servers, &thresholds.bucketing);
    format!(
        "Servers: {} {}  {} {}  {} {}",
        ServerStatus::Healthy.as_str(),
        counts.healthy,
        ServerStatus::Warning.as_str(),
        counts.warning,
        ServerStatus::Critical.as_str(),
        counts.critical
    )
}

fn render_host_cards(hosts: &[&MonitoredHost], thresholds: &ThresholdConfig) -> String {
    let mut table = Table::new(["", "SERVER", "STATUS", "CPU", "MEMORY", "DISK", "NETWORK"]);
    for host in hosts {
        let flag = if health::has_card_alert(&host.metrics, &thresholds.card_alert) {
            "!"
        } else {
            ""
        };
        let mut row = vec![flag.to_string(), host.name.clone(), host.status.clone()];
        for (kind, value) in host.metrics.iter() {
            let level = health::metric_level(value, thresholds.card_alert.get(kind));
            row.push(format!("{value:.1}%{}", level_marker(level)));
        }
        table.push_row(row);
    }
    format!("Servers\n{}", table.render())
}

pub fn render_recent_alerts(alerts: &[Alert]) -> String {
    if alerts.is_empty() {
        return format!("Recent Alerts\n{NO_ALERTS}");
    }
    let mut lines = vec!["Recent Alerts".to_string()];
    for alert in alerts {
        lines.push(format!(
            "  [{}] {:<8} {} {} at {:.1}% (Threshold: {}%)",
            timestamp::format(&alert.timestamp),
            severity_tag(alert.severity),
            alert.server,
            alert.metric.label(),
            alert.value,
            alert.threshold
        ));
    }
    lines.join("\n")
}

pub fn render_activity(entries: &[ActivityEntry]) -> String {
    let mut lines = vec!["Recent Activity".to_string()];
    for entry in entries {
        lines.push(format!(
            "  [{}] {}",
            timestamp::format(&entry.timestamp),
            entry.text
        ));
    }
    lines.join("\n")
}

fn severity_tag(severity: AlertSeverity) -> &'static str {
    match severity {
        AlertSeverity::Warning => "WARNING",
        AlertSeverity::Critical => "CRITICAL",
    }
}

/// 10칸 막대. 100을 넘는 값은 가득 찬 막대로 그린다.
fn bar(value: f64) -> String {
    let filled = (value / 10.0).round().clamp(0.0, 10.0) as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(10 - filled))
}

fn utilization_marker(level: UtilizationLevel) -> &'static str {
    match level {
        UtilizationLevel::Normal => "",
        UtilizationLevel::Elevated => "(elevated)",
        UtilizationLevel::High => "(high)",
    }
}

fn level_marker(level: MetricLevel) -> &'static str {
    match level {
        MetricLevel::Normal => "",
        MetricLevel::Elevated => " ~",
        MetricLevel::Alert => " !",
    }
}

// ── 설정 ────────────────────────────────────────────────

pub fn render_grafana_settings(settings: &GrafanaSettings) -> String {
    if settings.url.is_empty() && settings.api_key.is_empty() {
        return "Grafana: not configured".to_string();
    }
    format!(
        "Grafana URL: {}\nAPI key:     {}\nConnected:   {}",
        settings.url,
        settings.masked_api_key(),
        if settings.connected { "yes" } else { "no" }
    )
}

pub fn render_grafana_test(result: &GrafanaTestResult) -> String {
    if !result.success {
        return format!(
            "Connection failed: {}",
            result.error.as_deref().unwrap_or("unknown error")
        );
    }
    let mut line = "Connection successful".to_string();
    if let Some(info) = &result.info {
        if let Some(version) = &info.version {
            line.push_str(&format!(" (Grafana {version}"));
            if let Some(org) = &info.org {
                line.push_str(&format!(", org: {org}"));
            }
            line.push(')');
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsboard_core::models::event::{EventNote, EventStatus, Priority, Severity};
    use opsboard_core::models::monitoring::ServerMetrics;
    use opsboard_core::models::settings::GrafanaInfo;

    fn ts(s: &str) -> chrono::NaiveDateTime {
        timestamp::parse(s).unwrap()
    }

    fn host(name: &str, cpu: f64, mem: f64, disk: f64, net: f64) -> MonitoredHost {
        MonitoredHost {
            id: None,
            name: name.to_string(),
            status: "online".to_string(),
            metrics: ServerMetrics {
                cpu_usage: cpu,
                memory_usage: mem,
                disk_usage: disk,
                network_traffic: net,
            },
        }
    }

    fn alert(server: &str, severity: AlertSeverity) -> Alert {
        Alert {
            timestamp: ts("2024-05-01 09:30:00"),
            server: server.to_string(),
            metric: MetricKind::CpuUsage,
            value: 92.34,
            threshold: 90.0,
            severity,
        }
    }

    fn sample_event() -> Event {
        Event {
            id: "EVT1001".to_string(),
            number: "1001".to_string(),
            title: "Disk full".to_string(),
            description: "Root volume at 99%".to_string(),
            source: "server-02".to_string(),
            category: "Storage".to_string(),
            severity: Severity::High,
            priority: Priority::Critical,
            status: EventStatus::InProgress,
            assigned_to: "kim".to_string(),
            created_at: ts("2024-05-01 08:00:00"),
            updated_at: ts("2024-05-01 08:10:00"),
            resolved_at: None,
            notes: vec![EventNote {
                text: "Cleaning /var/log".to_string(),
                timestamp: ts("2024-05-01 08:05:00"),
            }],
        }
    }

    #[test]
    fn empty_table_renders_no_results() {
        let table = Table::new(["A", "B"]);
        assert!(table.is_empty());
        assert_eq!(table.render(), NO_RESULTS);
        assert_eq!(render_assets(&[]), NO_RESULTS);
    }

    #[test]
    fn table_aligns_columns() {
        let mut table = Table::new(["ID", "NAME"]);
        table.push_row(vec!["1".into(), "alpha".into()]);
        table.push_row(vec!["100".into(), "b".into()]);
        let rendered = table.render();
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines[0], "ID   NAME");
        assert_eq!(lines[1], "---  -----");
        assert_eq!(lines[2], "1    alpha");
        assert_eq!(lines[3], "100  b");
    }

    #[test]
    fn events_with_filter_banner_and_stats() {
        let event = sample_event();
        let stats = EventStats::from_events([&event]);
        let out = render_events(
            &[&event],
            Some("Active Filters: Status: Unresolved (New & In Progress)"),
            &stats,
        );
        assert!(out.starts_with("Active Filters: Status: Unresolved (New & In Progress)"));
        assert!(out.contains("Total: 1  New: 0  In Progress: 1"));
        assert!(out.contains("in progress"));
        assert!(out.contains("2024-05-01 08:00:00"));
    }

    #[test]
    fn events_without_matches_still_show_stats() {
        let out = render_events(&[], None, &EventStats::default());
        assert!(out.contains("Total: 0"));
        assert!(out.ends_with(NO_RESULTS));
    }

    #[test]
    fn event_detail_lists_notes_in_order() {
        let out = render_event_detail(&sample_event());
        assert!(out.starts_with("1001 Disk full"));
        assert!(out.contains("Notes (1)"));
        assert!(out.contains("[2024-05-01 08:05:00] Cleaning /var/log"));
        assert!(!out.contains("Resolved:"));
    }

    #[test]
    fn dashboard_kpis_and_cards() {
        let thresholds = ThresholdConfig::default();
        let snapshot = MonitoringSnapshot {
            timestamp: ts("2024-05-01 09:30:00"),
            servers: vec![
                host("web-01", 95.0, 50.0, 40.0, 10.0),
                host("db-01", 20.0, 30.0, 40.0, 10.0),
            ],
            alerts: vec![alert("web-01", AlertSeverity::Critical)],
        };
        let recent = vec![alert("web-01", AlertSeverity::Critical)];
        let view = DashboardView {
            snapshot: Some(&snapshot),
            hosts: snapshot.servers.iter().collect(),
            thresholds: &thresholds,
            recent_alerts: &recent,
            banner: None,
            activity: &[],
        };
        let out = render_dashboard(&view);
        assert!(out.contains("Total Servers: 2"));
        assert!(out.contains("Critical Alerts: 1 Issues"));
        assert!(out.contains("95.0% !"));
        assert!(out.contains("web-01 cpu usage at 92.3% (Threshold: 90%)"));
        assert!(!out.contains("Recent Activity"));
        assert!(out.ends_with("Last updated: 2024-05-01 09:30:00"));
    }

    #[test]
    fn dashboard_without_alerts() {
        let thresholds = ThresholdConfig::default();
        let snapshot = MonitoringSnapshot {
            timestamp: ts("2024-05-01 09:30:00"),
            servers: Vec::new(),
            alerts: Vec::new(),
        };
        let view = DashboardView {
            snapshot: Some(&snapshot),
            hosts: Vec::new(),
            thresholds: &thresholds,
            recent_alerts: &[],
            banner: None,
            activity: &[],
        };
        let out = render_dashboard(&view);
        assert!(out.contains("Critical Alerts: No Issues"));
        assert!(out.contains("Health Score: 100%"));
        assert!(out.contains(NO_ALERTS));
    }

    #[test]
    fn dashboard_before_first_snapshot() {
        let thresholds = ThresholdConfig::default();
        let view = DashboardView {
            snapshot: None,
            hosts: Vec::new(),
            thresholds: &thresholds,
            recent_alerts: &[],
            banner: None,
            activity: &[],
        };
        assert_eq!(render_dashboard(&view), "Monitoring data not loaded");
    }

    #[test]
    fn bar_is_clamped() {
        assert_eq!(bar(0.0), "[..........]");
        assert_eq!(bar(54.0), "[#####.....]");
        assert_eq!(bar(130.0), "[##########]");
        assert_eq!(bar(-5.0), "[..........]");
    }

    #[test]
    fn grafana_settings_masks_key() {
        let settings = GrafanaSettings::new("http://grafana:3000", "abcdef123");
        let out = render_grafana_settings(&settings);
        assert!(out.contains("abcd****"));
        assert!(!out.contains("abcdef123"));
        assert_eq!(
            render_grafana_settings(&GrafanaSettings::default()),
            "Grafana: not configured"
        );
    }

    #[test]
    fn grafana_test_outcomes() {
        let ok = GrafanaTestResult {
            success: true,
            error: None,
            info: Some(GrafanaInfo {
                version: Some("10.2.0".to_string()),
                org: Some("Main Org.".to_string()),
            }),
        };
        assert_eq!(
            render_grafana_test(&ok),
            "Connection successful (Grafana 10.2.0, org: Main Org.)"
        );

        let failed = GrafanaTestResult {
            success: false,
            error: Some("401 Unauthorized".to_string()),
            info: None,
        };
        assert_eq!(render_grafana_test(&failed), "Connection failed: 401 Unauthorized");
    }

    #[test]
    fn connection_indicator_line() {
        assert_eq!(render_connection(ConnectionStatus::Connected), "Backend: Connected");
        assert_eq!(
            render_connection(ConnectionStatus::Reconnecting),
            "Backend: Reconnecting"
        );
    }
}
