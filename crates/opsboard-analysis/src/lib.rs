//! # opsboard-analysis
//!
//! 메모리 내 컬렉션에 대한 순수 동기 함수 모음.
//!
//! - [`filter`]: 자산/이벤트/호스트 필터 및 자유 텍스트 검색
//! - [`health`]: 건강 점수, 상태 분류, 카드 경고 판정
//! - [`query`]: 이벤트 목록 쿼리 파라미터 파싱
//! - [`stats`]: 이벤트 상태별 집계

pub mod filter;
pub mod health;
pub mod query;
pub mod stats;
