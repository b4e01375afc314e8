//! 이벤트 상태별 집계 (목록 상단 요약 타일)

use opsboard_core::models::event::{Event, EventStatus};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EventStats {
    pub total: usize,
    pub new: usize,
    pub in_progress: usize,
    pub resolved: usize,
    pub closed: usize,
}

impl EventStats {
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a Event>) -> Self {
        events.into_iter().fold(Self::default(), |mut stats, event| {
            stats.total += 1;
            match event.status {
                EventStatus::New => stats.new += 1,
                EventStatus::InProgress => stats.in_progress += 1,
                EventStatus::Resolved => stats.resolved += 1,
                EventStatus::Closed => stats.closed += 1,
            }
            stats
        })
    }

    /// resolved도 closed도 아닌 이벤트 수
    pub fn unresolved(&self) -> usize {
        self.new + self.in_progress
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::event;
    use opsboard_core::models::event::{Priority, Severity};

    #[test]
    fn counts_by_status() {
        let events = vec![
            event("E1", EventStatus::New, Severity::Low, Priority::Low),
            event("E2", EventStatus::New, Severity::High, Priority::Low),
            event("E3", EventStatus::InProgress, Severity::Low, Priority::Low),
            event("E4", EventStatus::Resolved, Severity::Low, Priority::Low),
            event("E5", EventStatus::Closed, Severity::Low, Priority::Low),
        ];
        let stats = EventStats::from_events(&events);
        assert_eq!(
            stats,
            EventStats {
                total: 5,
                new: 2,
                in_progress: 1,
                resolved: 1,
                closed: 1,
            }
        );
        assert_eq!(stats.unresolved(), 3);
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(EventStats::from_events(&[]), EventStats::default());
    }
}
