//! OPSBOARD 도메인 모델.
//!
//! 백엔드 REST/푸시 채널이 주고받는 JSON 구조체를 정의한다.
//! 모든 모델은 `serde` Serialize/Deserialize를 구현한다.

pub mod asset;
pub mod event;
pub mod monitoring;
pub mod settings;
pub mod timestamp;
