//! 消息广播：有界出站队列加单消费者投递循环。
//!
//! 入队端在会话任务中执行，使用 `try_send`，永不阻塞；队列满时丢弃
//! 新条目并告警（消息已落库，丢的只是一次实时通知）。出队端是唯一
//! 消费者，天然保证投递顺序与入队顺序一致。

use std::sync::Arc;

use application::{BroadcastError, MessageBroadcaster, ServerFrame};
use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::registry::ConnectionRegistry;

/// 出站队列的生产端。帧在入队时完成序列化。
#[derive(Clone)]
pub struct QueuedBroadcaster {
    queue: mpsc::Sender<String>,
}

impl QueuedBroadcaster {
    /// 创建生产端和交给 [`BroadcastLoop`] 的消费端。
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (queue, rx) = mpsc::channel(capacity);
        (Self { queue }, rx)
    }
}

#[async_trait]
impl MessageBroadcaster for QueuedBroadcaster {
    async fn broadcast(&self, frame: ServerFrame) -> Result<(), BroadcastError> {
        let payload = frame
            .to_json()
            .map_err(|err| BroadcastError::failed(err.to_string()))?;

        match self.queue.try_send(payload) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                // 丢新策略：入队不允许阻塞会话
                tracing::warn!("广播队列已满，丢弃本次实时通知");
                Ok(())
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                Err(BroadcastError::failed("broadcast loop stopped"))
            }
        }
    }
}

/// 单消费者广播循环。
///
/// 每取出一条负载，先对注册表做时点快照，再逐个向快照内的连接做
/// 非阻塞写；写失败视为断开，将该连接从注册表移除。慢的或已死的
/// 接收者不会影响其他接收者。
pub struct BroadcastLoop {
    registry: Arc<ConnectionRegistry>,
    queue: mpsc::Receiver<String>,
}

impl BroadcastLoop {
    pub fn new(registry: Arc<ConnectionRegistry>, queue: mpsc::Receiver<String>) -> Self {
        Self { registry, queue }
    }

    /// 运行直到所有生产端关闭（进程关闭时）。
    pub async fn run(mut self) {
        while let Some(payload) = self.queue.recv().await {
            let snapshot = self.registry.snapshot().await;
            tracing::debug!(recipients = snapshot.len(), "广播一条消息");

            for (connection_id, entry) in snapshot {
                if entry.sender.send(payload.clone()).is_err() {
                    tracing::info!(
                        connection_id = %connection_id,
                        user_id = %entry.identity.id,
                        "投递失败，视为断开并移除连接"
                    );
                    self.registry.remove(connection_id).await;
                }
            }
        }

        tracing::info!("广播循环已停止");
    }
}
