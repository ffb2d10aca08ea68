//! Web API 层。
//!
//! 提供 Axum 路由，将 HTTP / WebSocket 请求委托给应用层的用例服务。

mod auth;
mod error;
mod routes;
mod session;
mod state;
mod ws_connection;

pub use auth::{JwtAuthenticator, JwtService, LoginResponse};
pub use config::JwtConfig;
pub use error::ApiError;
pub use routes::router;
pub use session::{ConnectionSession, SessionState};
pub use state::AppState;
