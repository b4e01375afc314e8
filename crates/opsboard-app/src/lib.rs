//! # opsboard-app
//!
//! OPSBOARD 터미널 클라이언트.
//! CLI 파싱, 어댑터/컨트롤러 배선, 텍스트 렌더링, 감시 모드 라이프사이클.

pub mod cli;
pub mod commands;
pub mod event_bus;
pub mod lifecycle;
pub mod render;
