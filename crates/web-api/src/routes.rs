use axum::{
    extract::{State, WebSocketUpgrade},
    http::{HeaderMap, StatusCode},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;

use application::{
    AuthenticateUserRequest, RegisterUserRequest,
};
use domain::Message;

use crate::auth::{bearer_token, LoginResponse};
use crate::error::ApiError;
use crate::state::AppState;
use crate::ws_connection;

#[derive(Debug, Deserialize)]
struct RegisterPayload {
    username: String,
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct LoginPayload {
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct SendMessagePayload {
    content: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register_user))
        .route("/auth/login", post(login_user))
        .route("/messages", get(get_messages).post(post_message))
        .route("/ws", get(websocket_upgrade))
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<(StatusCode, Json<LoginResponse>), ApiError> {
    let user = state
        .user_service
        .register(RegisterUserRequest {
            username: payload.username,
            email: payload.email,
            password: payload.password,
        })
        .await?;

    let token = state.jwt_service.generate_token(user.id)?;
    Ok((StatusCode::CREATED, Json(LoginResponse { user, token })))
}

async fn login_user(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state
        .user_service
        .authenticate(AuthenticateUserRequest {
            email: payload.email,
            password: payload.password,
        })
        .await?;

    let token = state.jwt_service.generate_token(user.id)?;
    Ok(Json(LoginResponse { user, token }))
}

async fn get_messages(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Message>>, ApiError> {
    let token = bearer_token(&headers)?;
    state
        .authenticator
        .validate(token)
        .await
        .map_err(|err| ApiError::unauthorized(err.to_string()))?;

    let items = state.message_service.list().await?;
    Ok(Json(items))
}

/// REST 发帖与 WebSocket 发帖共用同一条持久化加广播路径
async fn post_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SendMessagePayload>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    let token = bearer_token(&headers)?;
    let identity = state
        .authenticator
        .validate(token)
        .await
        .map_err(|err| ApiError::unauthorized(err.to_string()))?;

    let message = state.message_service.post(payload.content, identity).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

async fn websocket_upgrade(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| ws_connection::handle_socket(socket, state))
}
