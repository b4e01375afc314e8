//! Grafana 연동 설정 모델.
//!
//! `/api/settings/grafana` 계열 엔드포인트가 주고받는 불투명 설정.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// 저장된 Grafana 연동 설정
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrafanaSettings {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub api_key: String,
    /// 마지막 연결 테스트 결과 (백엔드가 제공하는 경우)
    #[serde(default, skip_serializing)]
    pub connected: bool,
}

impl GrafanaSettings {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            connected: false,
        }
    }

    /// 저장/테스트 전 필수 입력 검증
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.url.trim().is_empty() {
            return Err(CoreError::validation("url", "필수 입력 항목입니다"));
        }
        if self.api_key.trim().is_empty() {
            return Err(CoreError::validation("api_key", "필수 입력 항목입니다"));
        }
        Ok(())
    }

    /// API 키를 가린 표시용 문자열
    pub fn masked_api_key(&self) -> String {
        let visible: String = self.api_key.chars().take(4).collect();
        if self.api_key.chars().count() <= 4 {
            "****".to_string()
        } else {
            format!("{visible}****")
        }
    }
}

/// Grafana 서버 정보 (연결 테스트 성공 시)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrafanaInfo {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub org: Option<String>,
}

/// 연결 테스트 결과
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrafanaTestResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub info: Option<GrafanaInfo>,
}

/// 단순 성공/실패 응답 (`{"success": true}`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}
