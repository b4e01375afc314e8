//! 최근 활동 피드 (최신순, 개수 제한)

use chrono::NaiveDateTime;
use opsboard_core::models::monitoring::MonitoringSnapshot;
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEntry {
    pub text: String,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug)]
pub struct ActivityFeed {
    entries: VecDeque<ActivityEntry>,
    limit: usize,
}

impl ActivityFeed {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(limit),
            limit,
        }
    }

    /// 스냅샷에 알림이 있으면 첫 알림으로 항목을 하나 추가한다
    pub fn record(&mut self, snapshot: &MonitoringSnapshot) -> Option<ActivityEntry> {
        let alert = snapshot.alerts.first()?;
        let entry = ActivityEntry {
            text: format!("Alert triggered on {}", alert.server),
            timestamp: alert.timestamp,
        };
        self.entries.push_front(entry.clone());
        self.entries.truncate(self.limit);
        Some(entry)
    }

    pub fn entries(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
