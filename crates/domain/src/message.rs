use serde::{Deserialize, Serialize};

use crate::identity::Identity;
use crate::value_objects::{MessageContent, MessageId, Timestamp};

/// 聊天消息。只能通过仓储创建，创建后不可变。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub content: MessageContent,
    pub author: Identity,
    pub created_at: Timestamp,
}

impl Message {
    pub fn new(
        id: MessageId,
        content: MessageContent,
        author: Identity,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            content,
            author,
            created_at,
        }
    }
}
