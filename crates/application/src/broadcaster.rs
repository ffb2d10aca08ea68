use async_trait::async_trait;
use thiserror::Error;

use crate::frames::ServerFrame;

#[derive(Debug, Error)]
pub enum BroadcastError {
    #[error("broadcast failed: {0}")]
    Failed(String),
}

impl BroadcastError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// 消息广播的抽象。
///
/// 入队一个出站帧，由单消费者的广播循环投递给所有已注册连接。
/// 入队不阻塞调用方；溢出策略由实现决定并记录日志。
#[async_trait]
pub trait MessageBroadcaster: Send + Sync {
    async fn broadcast(&self, frame: ServerFrame) -> Result<(), BroadcastError>;
}
