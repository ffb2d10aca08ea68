//! 在线连接注册表。
//!
//! 记录所有已认证的活跃连接及其身份，是会话任务与广播循环之间
//! 唯一的共享可变状态。读写采用共享读/独占写约束：快照在读锁下
//! 克隆后立即释放锁，任何网络写入都不在持锁状态下进行。

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use domain::Identity;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

/// 连接唯一标识，升级成功时分配。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 连接的出站通道。写端交给注册表，读端由该连接的写套接字任务持有。
/// 无界发送不会阻塞广播循环；发送失败即视为连接已断开。
pub type ConnectionSender = mpsc::UnboundedSender<String>;

#[derive(Clone)]
pub struct RegistryEntry {
    pub identity: Identity,
    pub sender: ConnectionSender,
}

pub struct ConnectionRegistry {
    entries: RwLock<HashMap<ConnectionId, RegistryEntry>>,
}

impl ConnectionRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            entries: RwLock::new(HashMap::new()),
        })
    }

    /// 登记一个已认证连接。同一连接重复登记时覆盖旧身份，不产生重复条目。
    pub async fn add(&self, id: ConnectionId, identity: Identity, sender: ConnectionSender) {
        let mut entries = self.entries.write().await;
        let replaced = entries
            .insert(
                id,
                RegistryEntry {
                    identity: identity.clone(),
                    sender,
                },
            )
            .is_some();

        if replaced {
            tracing::debug!(connection_id = %id, user_id = %identity.id, "连接重新登记");
        } else {
            tracing::info!(connection_id = %id, user_id = %identity.id, "连接已登记");
        }
    }

    /// 移除一个连接。条目不存在时为空操作，可重复调用。
    pub async fn remove(&self, id: ConnectionId) {
        let mut entries = self.entries.write().await;
        if entries.remove(&id).is_some() {
            tracing::info!(connection_id = %id, "连接已移除");
        }
    }

    /// 当前所有条目的时点快照，迭代期间不受并发增删影响。
    pub async fn snapshot(&self) -> Vec<(ConnectionId, RegistryEntry)> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .map(|(id, entry)| (*id, entry.clone()))
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
