//! 每连接协议状态机。
//!
//! 与传输层解耦：状态机只消费入站帧文本，回帧通过连接自己的出站
//! 通道发出，套接字的读写由 `ws_connection` 负责。同一连接内的帧
//! 由单个任务严格按到达顺序驱动，状态机内部无需加锁。

use std::sync::Arc;

use application::{
    ApplicationError, Authenticator, ClientFrame, MessageService, ServerFrame,
};
use domain::Identity;
use infrastructure::{ConnectionId, ConnectionRegistry, ConnectionSender};

/// 会话状态。`Unauthenticated` 为初始态，`Closed` 为终态。
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated(Identity),
    Closed,
}

pub struct ConnectionSession {
    id: ConnectionId,
    state: SessionState,
    /// 本连接的出站通道；认证成功后同一个发送端进入注册表
    reply: ConnectionSender,
    registry: Arc<ConnectionRegistry>,
    authenticator: Arc<dyn Authenticator>,
    messages: Arc<MessageService>,
}

impl ConnectionSession {
    pub fn new(
        id: ConnectionId,
        reply: ConnectionSender,
        registry: Arc<ConnectionRegistry>,
        authenticator: Arc<dyn Authenticator>,
        messages: Arc<MessageService>,
    ) -> Self {
        Self {
            id,
            state: SessionState::Unauthenticated,
            reply,
            registry,
            authenticator,
            messages,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// 处理一条入站帧文本。
    ///
    /// 无法解析的帧（包括未知 `type`）静默忽略，不回帧、不改状态。
    pub async fn handle_text(&mut self, text: &str) {
        if self.state == SessionState::Closed {
            return;
        }

        let frame = match serde_json::from_str::<ClientFrame>(text) {
            Ok(frame) => frame,
            Err(err) => {
                tracing::debug!(connection_id = %self.id, error = %err, "忽略无法解析的帧");
                return;
            }
        };

        match frame {
            ClientFrame::Auth { token } => self.handle_auth(&token).await,
            ClientFrame::Message { content } => self.handle_message(content).await,
        }
    }

    /// 认证帧。失败时停留在当前状态，客户端可以换凭证重试；
    /// 已认证连接重复认证会重新校验，注册表按连接键幂等覆盖。
    async fn handle_auth(&mut self, token: &str) {
        match self.authenticator.validate(token).await {
            Ok(identity) => {
                self.registry
                    .add(self.id, identity.clone(), self.reply.clone())
                    .await;
                tracing::info!(
                    connection_id = %self.id,
                    user_id = %identity.id,
                    username = %identity.username,
                    "连接认证成功"
                );
                self.send(ServerFrame::Authenticated(identity.clone()));
                self.state = SessionState::Authenticated(identity);
            }
            Err(err) => {
                tracing::debug!(connection_id = %self.id, error = %err, "连接认证失败");
                self.send(ServerFrame::error("invalid credential"));
            }
        }
    }

    /// 消息帧。持久化成功后广播入队，发送方不收直接回执，
    /// 它和其他连接一样通过广播收到自己的消息。
    async fn handle_message(&mut self, content: String) {
        let identity = match &self.state {
            SessionState::Authenticated(identity) => identity.clone(),
            _ => {
                self.send(ServerFrame::error("not authenticated"));
                return;
            }
        };

        match self.messages.post(content, identity).await {
            Ok(message) => {
                tracing::debug!(connection_id = %self.id, message_id = %message.id, "消息已入队广播");
            }
            Err(ApplicationError::Domain(_)) => {
                self.send(ServerFrame::error("empty content"));
            }
            Err(err) => {
                tracing::warn!(connection_id = %self.id, error = %err, "消息保存失败");
                self.send(ServerFrame::error("failed to save message"));
            }
        }
    }

    /// 关闭会话：移除注册表条目并进入终态。可重复调用。
    pub async fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.registry.remove(self.id).await;
        self.state = SessionState::Closed;
        tracing::info!(connection_id = %self.id, "会话已关闭");
    }

    fn send(&self, frame: ServerFrame) {
        let payload = match frame.to_json() {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!(connection_id = %self.id, error = %err, "回帧序列化失败");
                return;
            }
        };
        // 发送失败说明写端任务已退出，交给传输层的关闭路径处理
        if self.reply.send(payload).is_err() {
            tracing::debug!(connection_id = %self.id, "回帧投递失败，连接即将关闭");
        }
    }
}
