//! JWT 认证和授权模块
//!
//! 提供 JWT token 生成、验证，以及基于 token 的连接认证实现。

use std::sync::Arc;

use application::{AuthError, Authenticator};
use async_trait::async_trait;
use axum::http::HeaderMap;
use config::JwtConfig;
use domain::{Identity, UserId, UserRepository};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// JWT Claims 结构
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: Uuid,
    pub exp: i64, // 过期时间 (Unix timestamp)
}

/// JWT Token 服务
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_ref());
        let decoding_key = DecodingKey::from_secret(config.secret.as_ref());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// 生成 JWT token
    pub fn generate_token(&self, user_id: UserId) -> Result<String, ApiError> {
        let now = chrono::Utc::now();
        let exp = now + chrono::Duration::hours(self.config.expiration_hours);

        let claims = Claims {
            user_id: Uuid::from(user_id),
            exp: exp.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|err| {
            ApiError::internal_server_error(format!("Token generation failed: {}", err))
        })
    }

    /// 验证并解析 JWT token
    pub fn verify_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|token_data| token_data.claims)
    }
}

/// 从 headers 中提取 bearer token
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("Missing authorization header"))?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::unauthorized("Invalid authorization header format"))
}

/// 基于 JWT 的连接认证器。
///
/// 校验 token 签名后按 claims 里的用户 ID 加载用户，解析出连接身份。
/// token 可以带可选的 "Bearer " 前缀（WebSocket 的 auth 帧会原样携带）。
pub struct JwtAuthenticator {
    jwt: JwtService,
    users: Arc<dyn UserRepository>,
}

impl JwtAuthenticator {
    pub fn new(jwt: JwtService, users: Arc<dyn UserRepository>) -> Self {
        Self { jwt, users }
    }
}

#[async_trait]
impl Authenticator for JwtAuthenticator {
    async fn validate(&self, credential: &str) -> Result<Identity, AuthError> {
        let token = credential.strip_prefix("Bearer ").unwrap_or(credential);

        let claims = self.jwt.verify_token(token).map_err(|err| {
            tracing::debug!(error = %err, "token 验证失败");
            AuthError::InvalidCredential
        })?;

        let user = self
            .users
            .find_by_id(UserId::from(claims.user_id))
            .await
            .map_err(|err| AuthError::backend(err.to_string()))?
            .ok_or(AuthError::InvalidCredential)?;

        Ok(Identity::from(&user))
    }
}

/// 登录响应结构
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: domain::User,
    pub token: String,
}
