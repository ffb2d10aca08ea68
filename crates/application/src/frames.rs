//! WebSocket 线上帧定义。
//!
//! 入站与出站帧都以 `type` 字段区分；出站帧的负载统一放在 `data` 字段。
//! 无法识别的入站帧由调用方静默忽略，不是协议错误。

use domain::{Identity, Message};
use serde::{Deserialize, Serialize};

/// 客户端发来的帧。
///
/// - `{"type":"auth","token":"..."}`
/// - `{"type":"message","content":"..."}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    Auth { token: String },
    Message { content: String },
}

/// 服务端推送的帧。
///
/// - `{"type":"authenticated","data":{...identity...}}`
/// - `{"type":"error","data":"reason"}`
/// - `{"type":"new_message","data":{...message...}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerFrame {
    Authenticated(Identity),
    Error(String),
    NewMessage(Message),
}

impl ServerFrame {
    pub fn error(reason: impl Into<String>) -> Self {
        Self::Error(reason.into())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{UserId, Username};
    use uuid::Uuid;

    #[test]
    fn parses_auth_frame() {
        let frame: ClientFrame =
            serde_json::from_str(r#"{"type":"auth","token":"Bearer abc"}"#).unwrap();
        assert_eq!(
            frame,
            ClientFrame::Auth {
                token: "Bearer abc".to_string()
            }
        );
    }

    #[test]
    fn parses_message_frame() {
        let frame: ClientFrame =
            serde_json::from_str(r#"{"type":"message","content":"hi"}"#).unwrap();
        assert_eq!(
            frame,
            ClientFrame::Message {
                content: "hi".to_string()
            }
        );
    }

    #[test]
    fn unknown_type_is_a_parse_error() {
        // 会话层靠这个错误来静默忽略未知帧
        assert!(serde_json::from_str::<ClientFrame>(r#"{"type":"typing"}"#).is_err());
    }

    #[test]
    fn error_frame_carries_plain_string_reason() {
        let json = ServerFrame::error("empty content").to_json().unwrap();
        assert_eq!(json, r#"{"type":"error","data":"empty content"}"#);
    }

    #[test]
    fn authenticated_frame_wraps_identity_in_data() {
        let identity = Identity::new(
            UserId::from(Uuid::nil()),
            Username::parse("alice").unwrap(),
        );
        let value: serde_json::Value =
            serde_json::from_str(&ServerFrame::Authenticated(identity).to_json().unwrap()).unwrap();
        assert_eq!(value["type"], "authenticated");
        assert_eq!(value["data"]["username"], "alice");
    }
}
