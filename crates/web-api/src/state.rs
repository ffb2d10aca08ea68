use std::sync::Arc;

use application::{Authenticator, MessageService, UserService};
use infrastructure::ConnectionRegistry;

use crate::JwtService;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub message_service: Arc<MessageService>,
    pub registry: Arc<ConnectionRegistry>,
    pub authenticator: Arc<dyn Authenticator>,
    pub jwt_service: Arc<JwtService>,
}

impl AppState {
    pub fn new(
        user_service: Arc<UserService>,
        message_service: Arc<MessageService>,
        registry: Arc<ConnectionRegistry>,
        authenticator: Arc<dyn Authenticator>,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        Self {
            user_service,
            message_service,
            registry,
            authenticator,
            jwt_service,
        }
    }
}
