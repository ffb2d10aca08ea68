use std::sync::Arc;

use domain::{Identity, Message, MessageContent, MessageId, MessageRepository};
use uuid::Uuid;

use crate::{
    broadcaster::MessageBroadcaster, clock::Clock, error::ApplicationError, frames::ServerFrame,
};

pub struct MessageServiceDependencies {
    pub message_repository: Arc<dyn MessageRepository>,
    pub broadcaster: Arc<dyn MessageBroadcaster>,
    pub clock: Arc<dyn Clock>,
}

/// 消息用例服务。
///
/// REST 发帖和 WebSocket 发帖都走 `post`，保证两条路径共用同一个
/// 持久化加广播流程，每条消息恰好触发一次广播。
pub struct MessageService {
    deps: MessageServiceDependencies,
}

impl MessageService {
    pub fn new(deps: MessageServiceDependencies) -> Self {
        Self { deps }
    }

    /// 校验并持久化一条消息，成功后入队广播。
    ///
    /// 广播入队失败不影响操作结果：消息已落库，丢失的只是实时通知。
    pub async fn post(
        &self,
        content: impl Into<String>,
        author: Identity,
    ) -> Result<Message, ApplicationError> {
        let content = MessageContent::parse(content)?;

        let message = Message::new(
            MessageId::from(Uuid::new_v4()),
            content,
            author,
            self.deps.clock.now(),
        );
        let stored = self.deps.message_repository.create(message).await?;

        if let Err(err) = self
            .deps
            .broadcaster
            .broadcast(ServerFrame::NewMessage(stored.clone()))
            .await
        {
            tracing::warn!(error = %err, message_id = %stored.id, "消息广播入队失败");
        }

        Ok(stored)
    }

    /// 按创建时间倒序返回全部消息。
    pub async fn list(&self) -> Result<Vec<Message>, ApplicationError> {
        Ok(self.deps.message_repository.list().await?)
    }
}
