//! 자산(인벤토리) 모델.
//!
//! `GET /api/assets` 응답 항목. 가져온 뒤에는 불변이며, 새로고침 시 통째로 교체된다.

use serde::{Deserialize, Serialize};

/// 관리 대상 IT 장비 인벤토리 레코드
///
/// `status`/`asset_type`/`brand`의 값 집합은 백엔드가 정하므로 문자열로 유지한다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// 자산 고유 ID
    pub id: String,
    /// 표시 이름 (호스트명 등)
    pub name: String,
    /// 장비 유형 (Laptop, Server, ...)
    #[serde(rename = "type", default)]
    pub asset_type: String,
    /// 제조사
    #[serde(default)]
    pub brand: String,
    /// 모델명
    #[serde(default)]
    pub model: String,
    /// 시리얼 번호
    #[serde(default)]
    pub serial_number: String,
    /// 상태 (active / inactive / maintenance / retired ...)
    #[serde(default)]
    pub status: String,
    /// 설치 위치
    #[serde(default)]
    pub location: String,
    /// 담당자
    #[serde(default)]
    pub assigned_to: String,
    /// 운영체제
    #[serde(default)]
    pub os: String,
    /// IP 주소
    #[serde(default)]
    pub ip_address: String,
    /// 구매일
    #[serde(default)]
    pub purchase_date: String,
    /// 보증 만료일
    #[serde(default)]
    pub warranty_expiry: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_with_type_field_and_missing_optionals() {
        let json = r#"{
            "id": "AST-001",
            "name": "srv-01",
            "type": "Server",
            "brand": "Dell",
            "status": "active"
        }"#;
        let asset: Asset = serde_json::from_str(json).unwrap();
        assert_eq!(asset.asset_type, "Server");
        assert_eq!(asset.brand, "Dell");
        assert!(asset.serial_number.is_empty());
        assert!(asset.warranty_expiry.is_empty());
    }
}
