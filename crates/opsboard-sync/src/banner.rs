//! 신규 critical 알림 배너.
//!
//! 스냅샷의 critical 알림 수가 직전 스냅샷보다 늘었을 때만 배너를 띄운다.
//! 배너마다 세대 번호를 붙이고, 자동 닫힘 타이머는 자기 세대일 때만 닫는다.
//! 새 배너가 먼저 떠 있으면 이전 타이머는 아무 일도 하지 않는다.

use opsboard_core::models::monitoring::{Alert, MonitoringSnapshot};

/// 표시 중인 배너
#[derive(Debug, Clone, PartialEq)]
pub struct BannerNotice {
    pub generation: u64,
    pub message: String,
    pub alert: Alert,
}

/// `Alert: {server} - {metric} at {value}% (Threshold: {threshold}%)`
pub fn notice_message(alert: &Alert) -> String {
    format!(
        "Alert: {} - {} at {:.1}% (Threshold: {}%)",
        alert.server,
        alert.metric.label(),
        alert.value,
        alert.threshold
    )
}

#[derive(Debug, Default)]
pub struct AlertBanner {
    last_critical_count: usize,
    generation: u64,
    current: Option<BannerNotice>,
}

impl AlertBanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// 스냅샷 반영. 새 배너를 띄웠으면 그 배너를 반환한다.
    ///
    /// 배너 내용은 스냅샷의 첫 번째 알림에서 가져온다.
    pub fn observe(&mut self, snapshot: &MonitoringSnapshot) -> Option<BannerNotice> {
        let critical = snapshot.critical_alert_count();
        let increased = critical > self.last_critical_count;
        self.last_critical_count = critical;

        if !increased {
            return None;
        }
        let alert = snapshot.alerts.first()?;

        self.generation += 1;
        let notice = BannerNotice {
            generation: self.generation,
            message: notice_message(alert),
            alert: alert.clone(),
        };
        self.current = Some(notice.clone());
        Some(notice)
    }

    /// 해당 세대의 배너가 아직 떠 있으면 닫는다. 닫았으면 `true`.
    pub fn dismiss(&mut self, generation: u64) -> bool {
        match &self.current {
            Some(notice) if notice.generation == generation => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    /// 사용자가 직접 닫기
    pub fn dismiss_current(&mut self) -> Option<BannerNotice> {
        self.current.take()
    }

    pub fn current(&self) -> Option<&BannerNotice> {
        self.current.as_ref()
    }

    pub fn last_critical_count(&self) -> usize {
        self.last_critical_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsboard_core::models::monitoring::{AlertSeverity, MetricKind};
    use opsboard_core::models::timestamp;

    fn alert(server: &str, severity: AlertSeverity) -> Alert {
        Alert {
            timestamp: timestamp::parse("2024-05-01 09:30:00").unwrap(),
            server: server.to_string(),
            metric: MetricKind::CpuUsage,
            value: 93.456,
            threshold: 90.0,
            severity,
        }
    }

    fn snapshot(alerts: Vec<Alert>) -> MonitoringSnapshot {
        MonitoringSnapshot {
            timestamp: timestamp::parse("2024-05-01 09:30:00").unwrap(),
            servers: Vec::new(),
            alerts,
        }
    }

    #[test]
    fn message_format() {
        let a = alert("server-03", AlertSeverity::Critical);
        assert_eq!(
            notice_message(&a),
            "Alert: server-03 - cpu usage at 93.5% (Threshold: 90%)"
        );
    }

    #[test]
    fn raises_only_when_critical_count_increases() {
        let mut banner = AlertBanner::new();

        let first = banner.observe(&snapshot(vec![alert("a", AlertSeverity::Critical)]));
        assert!(first.is_some());

        // 같은 수 → 배너 없음
        assert!(banner
            .observe(&snapshot(vec![alert("b", AlertSeverity::Critical)]))
            .is_none());

        // warning만 늘어남 → 배너 없음
        assert!(banner
            .observe(&snapshot(vec![
                alert("b", AlertSeverity::Critical),
                alert("c", AlertSeverity::Warning),
            ]))
            .is_none());

        // 감소 후 다시 증가 → 배너
        assert!(banner.observe(&snapshot(Vec::new())).is_none());
        assert_eq!(banner.last_critical_count(), 0);
        let again = banner.observe(&snapshot(vec![alert("d", AlertSeverity::Critical)]));
        assert_eq!(again.map(|n| n.generation), Some(2));
    }

    #[test]
    fn notice_uses_first_alert_of_snapshot() {
        let mut banner = AlertBanner::new();
        let notice = banner
            .observe(&snapshot(vec![
                alert("warn-host", AlertSeverity::Warning),
                alert("crit-host", AlertSeverity::Critical),
            ]))
            .unwrap();
        assert_eq!(notice.alert.server, "warn-host");
    }

    #[test]
    fn stale_timer_dismiss_is_noop() {
        let mut banner = AlertBanner::new();
        let first = banner
            .observe(&snapshot(vec![alert("a", AlertSeverity::Critical)]))
            .unwrap();
        let second = banner
            .observe(&snapshot(vec![
                alert("a", AlertSeverity::Critical),
                alert("b", AlertSeverity::Critical),
            ]))
            .unwrap();

        // 첫 배너의 타이머가 늦게 발화해도 두 번째 배너는 유지
        assert!(!banner.dismiss(first.generation));
        assert_eq!(banner.current().map(|n| n.generation), Some(second.generation));

        assert!(banner.dismiss(second.generation));
        assert!(banner.current().is_none());
        // 이중 닫기도 무해
        assert!(!banner.dismiss(second.generation));
    }

    #[test]
    fn manual_dismiss() {
        let mut banner = AlertBanner::new();
        banner.observe(&snapshot(vec![alert("a", AlertSeverity::Critical)]));
        assert!(banner.dismiss_current().is_some());
        assert!(banner.dismiss_current().is_none());
    }
}
