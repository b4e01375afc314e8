//! 이벤트(인시던트 티켓) 모델.
//!
//! 생성은 `POST /api/events`, 상태 변경/노트 추가는 `PUT /api/events/{id}`,
//! 삭제는 `DELETE /api/events/{id}`. 클라이언트는 권위 있는 상태를 소유하지 않으며
//! 모든 변경 뒤 전체 목록을 다시 가져온다.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// 이벤트 상태
///
/// `new → in-progress → resolved → closed`. 전이 규칙은 백엔드가 결정하며
/// 클라이언트는 어떤 전이도 막지 않는다 (종료 상태 강제 없음).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventStatus {
    New,
    InProgress,
    Resolved,
    Closed,
}

impl EventStatus {
    /// 상태 변경 컨트롤에서 선택 가능한 값. `closed`는 백엔드에서 읽기만 한다.
    pub const SETTABLE: [EventStatus; 3] =
        [EventStatus::New, EventStatus::InProgress, EventStatus::Resolved];

    /// 와이어 표현
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::New => "new",
            EventStatus::InProgress => "in-progress",
            EventStatus::Resolved => "resolved",
            EventStatus::Closed => "closed",
        }
    }

    /// 표시용 라벨 (`in-progress` → `in progress`)
    pub fn label(&self) -> String {
        self.as_str().replace('-', " ")
    }

    /// 미해결 여부: resolved도 closed도 아님
    pub fn is_unresolved(&self) -> bool {
        !matches!(self, EventStatus::Resolved | EventStatus::Closed)
    }

    /// 상태 변경 컨트롤에서 설정 가능한지
    pub fn is_settable(&self) -> bool {
        Self::SETTABLE.contains(self)
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(EventStatus::New),
            "in-progress" => Ok(EventStatus::InProgress),
            "resolved" => Ok(EventStatus::Resolved),
            "closed" => Ok(EventStatus::Closed),
            other => Err(CoreError::validation(
                "status",
                format!("알 수 없는 상태: {other}"),
            )),
        }
    }
}

/// 이벤트 심각도
///
/// 백엔드가 보낸 모르는 값은 `Unknown`으로 받는다. `Unknown`은 필터 입력으로 쓸 수 없다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Warning,
    Critical,
    #[serde(other)]
    Unknown,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
            Severity::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "warning" => Ok(Severity::Warning),
            "critical" => Ok(Severity::Critical),
            other => Err(CoreError::validation(
                "severity",
                format!("알 수 없는 심각도: {other}"),
            )),
        }
    }
}

/// 이벤트 우선순위 (모르는 값은 `Unknown`, 가장 낮게 정렬)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low = 1,
    Medium = 2,
    High = 3,
    Critical = 4,
    #[serde(other)]
    Unknown = 0,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
            Priority::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "critical" => Ok(Priority::Critical),
            other => Err(CoreError::validation(
                "priority",
                format!("알 수 없는 우선순위: {other}"),
            )),
        }
    }
}

/// 이벤트에 첨부된 노트 (추가 순서 유지)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventNote {
    pub text: String,
    #[serde(with = "crate::models::timestamp")]
    pub timestamp: NaiveDateTime,
}

/// 인시던트/티켓 레코드
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// 이벤트 ID (예: "EVT1001")
    pub id: String,
    /// 표시용 순번
    pub number: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// 발생 출처 (서버명 또는 "Manual")
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub category: String,
    pub severity: Severity,
    pub priority: Priority,
    pub status: EventStatus,
    #[serde(default)]
    pub assigned_to: String,
    #[serde(with = "crate::models::timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(with = "crate::models::timestamp")]
    pub updated_at: NaiveDateTime,
    /// resolved/closed 전이 시 백엔드가 기록
    #[serde(default, with = "crate::models::timestamp::option")]
    pub resolved_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub notes: Vec<EventNote>,
}

/// 이벤트 생성 요청 (`POST /api/events` 본문)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub source: String,
    pub category: String,
    pub severity: Severity,
    pub priority: Priority,
    pub assigned_to: String,
}

impl NewEvent {
    /// 백엔드 기본값을 채운 생성 요청
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            source: "Manual".to_string(),
            category: "Other".to_string(),
            severity: Severity::Low,
            priority: Priority::Low,
            assigned_to: "Unassigned".to_string(),
        }
    }

    /// 필수 입력 검증 (제목, 설명)
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.title.trim().is_empty() {
            return Err(CoreError::validation("title", "필수 입력 항목입니다"));
        }
        if self.description.trim().is_empty() {
            return Err(CoreError::validation("description", "필수 입력 항목입니다"));
        }
        Ok(())
    }
}

/// 이벤트 부분 업데이트 (`PUT /api/events/{id}` 본문)
///
/// 상태 변경과 노트 추가는 서로 독립적이다. 노트 추가는 상태를 바꾸지 않는다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EventStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl EventUpdate {
    /// 상태만 변경
    pub fn status(status: EventStatus) -> Self {
        Self {
            status: Some(status),
            note: None,
        }
    }

    /// 노트만 추가 (앞뒤 공백 제거)
    pub fn note(text: impl Into<String>) -> Self {
        Self {
            status: None,
            note: Some(text.into().trim().to_string()),
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.status.is_none() && self.note.is_none() {
            return Err(CoreError::validation("update", "변경할 항목이 없습니다"));
        }
        if let Some(note) = &self.note {
            if note.trim().is_empty() {
                return Err(CoreError::validation("note", "노트를 입력하세요"));
            }
        }
        Ok(())
    }
}
