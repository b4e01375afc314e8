//! # opsboard-sync
//!
//! 동기화 계층.
//!
//! - [`store`]: 요청 순번으로 보호되는 메모리 내 컬렉션 저장소
//! - [`controller`]: REST 조회/푸시 알림 처리, 사용자 변경 요청
//! - [`banner`]: 신규 critical 알림 배너와 자동 닫힘
//! - [`feed`]: 최근 활동 피드

pub mod banner;
pub mod controller;
pub mod feed;
pub mod store;
