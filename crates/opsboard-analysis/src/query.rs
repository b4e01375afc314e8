//! 이벤트 목록 쿼리 파라미터 (`severity`, `status`, `priority`).
//!
//! 프로세스 시작 시 한 번만 적용된다. `status=unresolved`는 일반 상태 값이
//! 아니라 `resolved`/`closed`를 제외하는 복합 조건으로 해석된다.

use std::str::FromStr;

use opsboard_core::models::event::{EventStatus, Priority, Severity};
use tracing::warn;

use crate::filter::EventCriteria;

/// 복합 미해결 조건을 나타내는 `status` 값
pub const UNRESOLVED: &str = "unresolved";

/// 파싱된 쿼리 파라미터 (원문 값 유지)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventQuery {
    pub severity: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
}

impl EventQuery {
    /// `severity=high&status=unresolved` 형식 파싱. 앞의 `?`는 무시한다.
    ///
    /// 같은 키가 여러 번 나오면 첫 값이 이긴다. 빈 값은 없는 것으로 본다.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut parsed = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            if value.is_empty() {
                continue;
            }
            let slot = match key.as_ref() {
                "severity" => &mut parsed.severity,
                "status" => &mut parsed.status,
                "priority" => &mut parsed.priority,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        parsed
    }

    pub fn is_empty(&self) -> bool {
        self.severity.is_none() && self.status.is_none() && self.priority.is_none()
    }

    pub fn is_unresolved(&self) -> bool {
        self.status.as_deref() == Some(UNRESOLVED)
    }

    /// 필터 조건에 반영
    ///
    /// 알 수 없는 값은 경고 로그만 남기고 해당 조건을 건너뛴다.
    pub fn apply_to(&self, criteria: &mut EventCriteria) {
        if let Some(severity) = lenient::<Severity>("severity", self.severity.as_deref()) {
            criteria.severity = Some(severity);
        }
        if self.is_unresolved() {
            criteria.unresolved = true;
            criteria.status = None;
        } else if let Some(status) = lenient::<EventStatus>("status", self.status.as_deref()) {
            criteria.status = Some(status);
        }
        if let Some(priority) = lenient::<Priority>("priority", self.priority.as_deref()) {
            criteria.priority = Some(priority);
        }
    }

    /// 활성 필터 배너 텍스트. 파라미터가 없으면 `None`.
    pub fn describe(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let mut parts = Vec::new();
        if let Some(severity) = &self.severity {
            parts.push(format!("Severity: {}", capitalize(severity)));
        }
        if self.is_unresolved() {
            parts.push("Status: Unresolved (New & In Progress)".to_string());
        } else if let Some(status) = &self.status {
            parts.push(format!("Status: {}", capitalize(status)));
        }
        if let Some(priority) = &self.priority {
            parts.push(format!("Priority: {}", capitalize(priority)));
        }
        Some(format!("Active Filters: {}", parts.join(" | ")))
    }

    /// 파라미터로 조건을 만든 새 필터
    pub fn to_criteria(&self) -> EventCriteria {
        let mut criteria = EventCriteria::default();
        self.apply_to(&mut criteria);
        criteria
    }
}

fn lenient<T: FromStr>(field: &str, raw: Option<&str>) -> Option<T> {
    let raw = raw?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(field, value = raw, "알 수 없는 쿼리 파라미터 값 무시");
            None
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::StatusCriterion;

    #[test]
    fn parses_known_keys_and_ignores_others() {
        let q = EventQuery::parse("?severity=high&status=unresolved&page=2");
        assert_eq!(q.severity.as_deref(), Some("high"));
        assert_eq!(q.status.as_deref(), Some("unresolved"));
        assert!(q.priority.is_none());
    }

    #[test]
    fn empty_values_are_absent() {
        let q = EventQuery::parse("severity=&priority=low");
        assert!(q.severity.is_none());
        assert_eq!(q.priority.as_deref(), Some("low"));
        assert!(EventQuery::parse("").is_empty());
    }

    #[test]
    fn first_value_wins_and_is_decoded() {
        let q = EventQuery::parse("status=in%2Dprogress&status=new");
        assert_eq!(q.status.as_deref(), Some("in-progress"));
    }

    #[test]
    fn unresolved_overrides_plain_status() {
        let mut criteria = EventCriteria {
            status: Some(EventStatus::New),
            ..Default::default()
        };
        EventQuery::parse("status=unresolved").apply_to(&mut criteria);
        assert!(criteria.unresolved);
        assert_eq!(criteria.status_criterion(), StatusCriterion::Unresolved);
    }

    #[test]
    fn apply_sets_typed_criteria() {
        let criteria = EventQuery::parse("severity=critical&status=resolved&priority=high")
            .to_criteria();
        assert_eq!(criteria.severity, Some(Severity::Critical));
        assert_eq!(criteria.status, Some(EventStatus::Resolved));
        assert_eq!(criteria.priority, Some(Priority::High));
        assert!(!criteria.unresolved);
    }

    #[test]
    fn unknown_values_are_skipped() {
        let criteria = EventQuery::parse("severity=catastrophic&priority=low").to_criteria();
        assert!(criteria.severity.is_none());
        assert_eq!(criteria.priority, Some(Priority::Low));
    }

    #[test]
    fn describe_banner_text() {
        assert!(EventQuery::parse("").describe().is_none());
        assert_eq!(
            EventQuery::parse("severity=high&status=unresolved").describe().unwrap(),
            "Active Filters: Severity: High | Status: Unresolved (New & In Progress)"
        );
        assert_eq!(
            EventQuery::parse("status=in-progress&priority=low").describe().unwrap(),
            "Active Filters: Status: In-progress | Priority: Low"
        );
    }
}
