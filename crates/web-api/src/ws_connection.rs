//! WebSocket 连接的传输层胶水。
//!
//! 拆分套接字后由两部分协作：写端任务排空本连接的出站通道，
//! 读端循环把帧文本交给会话状态机。任一端结束即进入清理路径。

use axum::extract::ws::{Message as WsMessage, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::session::ConnectionSession;
use crate::state::AppState;
use infrastructure::ConnectionId;

pub async fn handle_socket(socket: WebSocket, state: AppState) {
    let connection_id = ConnectionId::new();
    tracing::info!(connection_id = %connection_id, "WebSocket 连接已建立");

    let (mut sink, mut incoming) = socket.split();

    // 本连接的出站通道。写端交给会话（认证后同一发送端进注册表），
    // 读端由写套接字任务独占
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<String>();

    let mut session = ConnectionSession::new(
        connection_id,
        reply_tx,
        state.registry.clone(),
        state.authenticator.clone(),
        state.message_service.clone(),
    );

    // 写任务：唯一向套接字写入的地方
    let send_task = tokio::spawn(async move {
        while let Some(payload) = reply_rx.recv().await {
            if sink.send(WsMessage::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    // 读循环：同一连接内的帧严格按到达顺序驱动状态机
    while let Some(message) = incoming.next().await {
        match message {
            Ok(WsMessage::Text(text)) => {
                session.handle_text(text.as_str()).await;
            }
            Ok(WsMessage::Close(_)) => {
                tracing::debug!(connection_id = %connection_id, "客户端请求关闭");
                break;
            }
            // ping/pong 由底层自动应答，二进制帧不在协议内
            Ok(_) => {}
            Err(err) => {
                tracing::debug!(connection_id = %connection_id, error = %err, "读取失败，按断开处理");
                break;
            }
        }
    }

    session.close().await;
    send_task.abort();
    tracing::info!(connection_id = %connection_id, "WebSocket 连接已断开");
}
