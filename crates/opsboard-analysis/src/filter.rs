//! 필터/검색 엔진.
//!
//! `(컬렉션, 조건, 검색어) → 원래 순서를 유지한 부분 수열`.
//! 모든 조건은 AND로 결합되며, 비어 있는 조건은 항상 참이다.
//! 입력 컬렉션은 변경하지 않고, 빈 결과도 정상 상태로 취급한다.

use opsboard_core::config::MetricThresholds;
use opsboard_core::models::asset::Asset;
use opsboard_core::models::event::{Event, EventStatus, Priority, Severity};
use opsboard_core::models::monitoring::MonitoredHost;

use crate::health::has_card_alert;

/// 자유 텍스트 검색 대상
pub trait Searchable {
    /// 검색에 쓰이는 필드들을 공백으로 이어 붙인 문자열
    fn search_haystack(&self) -> String;

    /// 대소문자 무시 부분 문자열 검색. 빈 검색어는 항상 일치.
    fn matches_search(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        self.search_haystack()
            .to_lowercase()
            .contains(&query.to_lowercase())
    }
}

impl Searchable for Asset {
    fn search_haystack(&self) -> String {
        format!(
            "{} {} {} {} {} {}",
            self.id, self.name, self.model, self.serial_number, self.assigned_to, self.location
        )
    }
}

impl Searchable for Event {
    fn search_haystack(&self) -> String {
        format!(
            "{} {} {} {}",
            self.number, self.title, self.description, self.source
        )
    }
}

/// 빈 문자열 조건은 "제약 없음"으로 본다
fn active(criterion: &Option<String>) -> Option<&str> {
    criterion.as_deref().filter(|s| !s.is_empty())
}

/// 자산 필터 조건
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetCriteria {
    pub status: Option<String>,
    pub brand: Option<String>,
    pub asset_type: Option<String>,
    pub search: Option<String>,
}

impl AssetCriteria {
    pub fn matches(&self, asset: &Asset) -> bool {
        if let Some(status) = active(&self.status) {
            if asset.status != status {
                return false;
            }
        }
        if let Some(brand) = active(&self.brand) {
            if asset.brand != brand {
                return false;
            }
        }
        if let Some(asset_type) = active(&self.asset_type) {
            if asset.asset_type != asset_type {
                return false;
            }
        }
        active(&self.search).map_or(true, |q| asset.matches_search(q))
    }

    pub fn is_empty(&self) -> bool {
        active(&self.status).is_none()
            && active(&self.brand).is_none()
            && active(&self.asset_type).is_none()
            && active(&self.search).is_none()
    }
}

/// 이벤트 상태 조건의 실제 적용 형태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCriterion {
    Any,
    Exactly(EventStatus),
    /// `status ∉ {resolved, closed}`
    Unresolved,
}

impl StatusCriterion {
    pub fn matches(&self, status: EventStatus) -> bool {
        match self {
            StatusCriterion::Any => true,
            StatusCriterion::Exactly(expected) => status == *expected,
            StatusCriterion::Unresolved => status.is_unresolved(),
        }
    }
}

/// 이벤트 필터 조건
///
/// `unresolved`는 외부 쿼리 파라미터(`status=unresolved`)로만 켜지며,
/// 켜져 있으면 일반 `status` 조건을 덮어쓴다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventCriteria {
    pub status: Option<EventStatus>,
    pub unresolved: bool,
    pub severity: Option<Severity>,
    pub priority: Option<Priority>,
    pub search: Option<String>,
}

impl EventCriteria {
    pub fn status_criterion(&self) -> StatusCriterion {
        if self.unresolved {
            StatusCriterion::Unresolved
        } else {
            self.status
                .map_or(StatusCriterion::Any, StatusCriterion::Exactly)
        }
    }

    pub fn matches(&self, event: &Event) -> bool {
        if !self.status_criterion().matches(event.status) {
            return false;
        }
        if self.severity.is_some_and(|s| event.severity != s) {
            return false;
        }
        if self.priority.is_some_and(|p| event.priority != p) {
            return false;
        }
        active(&self.search).map_or(true, |q| event.matches_search(q))
    }
}

/// 술어를 만족하는 항목만 원래 순서대로 남긴다
pub fn filter_by<'a, T, F>(items: &'a [T], predicate: F) -> Vec<&'a T>
where
    F: Fn(&T) -> bool,
{
    items.iter().filter(|&item| predicate(item)).collect()
}

pub fn filter_assets<'a>(assets: &'a [Asset], criteria: &AssetCriteria) -> Vec<&'a Asset> {
    filter_by(assets, |a| criteria.matches(a))
}

pub fn filter_events<'a>(events: &'a [Event], criteria: &EventCriteria) -> Vec<&'a Event> {
    filter_by(events, |e| criteria.matches(e))
}

/// 대시보드 호스트 카드 보기 필터
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HostView {
    #[default]
    All,
    /// 카드 경고가 있는 호스트만
    AlertOnly,
    /// 카드 경고가 없는 호스트만
    HealthyOnly,
}

/// 이름 검색 + 보기 필터로 호스트 카드를 거른다
pub fn filter_hosts<'a>(
    hosts: &'a [MonitoredHost],
    view: HostView,
    name_query: &str,
    card_alert: &MetricThresholds,
) -> Vec<&'a MonitoredHost> {
    let needle = name_query.to_lowercase();
    filter_by(hosts, |host| {
        if !host.name.to_lowercase().contains(&needle) {
            return false;
        }
        let alert = has_card_alert(&host.metrics, card_alert);
        match view {
            HostView::All => true,
            HostView::AlertOnly => alert,
            HostView::HealthyOnly => !alert,
        }
    })
}
