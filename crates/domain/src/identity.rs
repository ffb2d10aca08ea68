use serde::{Deserialize, Serialize};

use crate::user::User;
use crate::value_objects::{UserId, Username};

/// 连接认证成功后固定下来的身份信息。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub username: Username,
}

impl Identity {
    pub fn new(id: UserId, username: Username) -> Self {
        Self { id, username }
    }
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}
