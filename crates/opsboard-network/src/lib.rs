//! # opsboard-network
//!
//! 백엔드 네트워크 어댑터.
//! REST API(`/api/*`)와 Socket.IO 푸시 채널을 담당하며,
//! 두 어댑터가 공유하는 연결 상태 추적을 제공한다.
//!
//! ## 사용 예시
//!
//! ```rust,ignore
//! use opsboard_network::http_client::HttpDashboardApi;
//! use opsboard_network::ws_client::SocketIoPushClient;
//!
//! let api = HttpDashboardApi::new("http://localhost:5000", Duration::from_secs(10))?;
//! let push = SocketIoPushClient::new("http://localhost:5000", 30);
//! ```

pub mod connectivity;
pub mod http_client;
pub mod ws_client;
