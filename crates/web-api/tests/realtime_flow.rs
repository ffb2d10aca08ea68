//! 端到端实时链路测试：会话状态机 + 注册表 + 广播循环 + JWT 认证，
//! 仓储使用内存实现，不依赖数据库和真实套接字。

use std::sync::{Arc, Mutex};
use std::time::Duration;

use application::{
    MessageService, MessageServiceDependencies, RegisterUserRequest, SystemClock, UserService,
    UserServiceDependencies,
};
use domain::{
    Message, MessageRepository, RepositoryFuture, User, UserEmail, UserId, UserRepository,
};
use infrastructure::{
    BcryptPasswordHasher, BroadcastLoop, ConnectionId, ConnectionRegistry, QueuedBroadcaster,
};
use tokio::sync::mpsc;
use web_api::{ConnectionSession, JwtAuthenticator, JwtConfig, JwtService};

#[derive(Default)]
struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl UserRepository for InMemoryUserRepository {
    fn create(&self, user: User) -> RepositoryFuture<User> {
        self.users.lock().unwrap().push(user.clone());
        Box::pin(async move { Ok(user) })
    }

    fn find_by_id(&self, id: UserId) -> RepositoryFuture<Option<User>> {
        let found = self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|user| user.id == id)
            .cloned();
        Box::pin(async move { Ok(found) })
    }

    fn find_by_email(&self, email: UserEmail) -> RepositoryFuture<Option<User>> {
        let found = self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|user| user.email == email)
            .cloned();
        Box::pin(async move { Ok(found) })
    }
}

#[derive(Default)]
struct InMemoryMessageRepository {
    messages: Mutex<Vec<Message>>,
}

impl MessageRepository for InMemoryMessageRepository {
    fn create(&self, message: Message) -> RepositoryFuture<Message> {
        self.messages.lock().unwrap().push(message.clone());
        Box::pin(async move { Ok(message) })
    }

    fn list(&self) -> RepositoryFuture<Vec<Message>> {
        let mut items = self.messages.lock().unwrap().clone();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Box::pin(async move { Ok(items) })
    }
}

struct TestServer {
    users: Arc<UserService>,
    messages: Arc<MessageService>,
    registry: Arc<ConnectionRegistry>,
    authenticator: Arc<JwtAuthenticator>,
    jwt: JwtService,
}

struct TestClient {
    session: ConnectionSession,
    replies: mpsc::UnboundedReceiver<String>,
}

impl TestServer {
    fn start() -> Self {
        let user_repository = Arc::new(InMemoryUserRepository::default());
        let message_repository = Arc::new(InMemoryMessageRepository::default());
        let registry = ConnectionRegistry::new();

        let (broadcaster, queue) = QueuedBroadcaster::new(64);
        tokio::spawn(BroadcastLoop::new(registry.clone(), queue).run());

        let jwt = JwtService::new(JwtConfig {
            secret: "integration-test-secret".to_string(),
            expiration_hours: 1,
        });
        let authenticator = Arc::new(JwtAuthenticator::new(jwt.clone(), user_repository.clone()));

        let users = Arc::new(UserService::new(UserServiceDependencies {
            user_repository,
            // 低 cost 让测试保持快速
            password_hasher: Arc::new(BcryptPasswordHasher::new(Some(4))),
            clock: Arc::new(SystemClock),
        }));
        let messages = Arc::new(MessageService::new(MessageServiceDependencies {
            message_repository,
            broadcaster: Arc::new(broadcaster),
            clock: Arc::new(SystemClock),
        }));

        Self {
            users,
            messages,
            registry,
            authenticator,
            jwt,
        }
    }

    async fn register_user(&self, username: &str) -> (domain::User, String) {
        let user = self
            .users
            .register(RegisterUserRequest {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password: "secret".to_string(),
            })
            .await
            .unwrap();
        let token = self.jwt.generate_token(user.id).unwrap();
        (user, token)
    }

    fn connect(&self) -> TestClient {
        let (reply_tx, replies) = mpsc::unbounded_channel();
        TestClient {
            session: ConnectionSession::new(
                ConnectionId::new(),
                reply_tx,
                self.registry.clone(),
                self.authenticator.clone(),
                self.messages.clone(),
            ),
            replies,
        }
    }
}

impl TestClient {
    async fn authenticate(&mut self, token: &str) -> serde_json::Value {
        self.session
            .handle_text(&format!(r#"{{"type":"auth","token":"{token}"}}"#))
            .await;
        self.next_frame().await
    }

    async fn send_message(&mut self, content: &str) {
        self.session
            .handle_text(&format!(r#"{{"type":"message","content":"{content}"}}"#))
            .await;
    }

    async fn next_frame(&mut self) -> serde_json::Value {
        let payload = tokio::time::timeout(Duration::from_secs(2), self.replies.recv())
            .await
            .expect("timed out waiting for frame")
            .expect("reply channel closed");
        serde_json::from_str(&payload).unwrap()
    }

    fn no_pending_frames(&mut self) -> bool {
        self.replies.try_recv().is_err()
    }
}

#[tokio::test]
async fn two_clients_auth_and_broadcast() {
    let server = TestServer::start();
    let (_, alice_token) = server.register_user("alice").await;
    let (_, bob_token) = server.register_user("bob").await;

    let mut alice = server.connect();
    let mut bob = server.connect();

    let frame = alice.authenticate(&alice_token).await;
    assert_eq!(frame["type"], "authenticated");
    assert_eq!(frame["data"]["username"], "alice");

    let frame = bob.authenticate(&bob_token).await;
    assert_eq!(frame["type"], "authenticated");

    alice.send_message("hi").await;

    // 双方（包括发送者自己）都通过广播收到消息，且中间没有别的帧
    for client in [&mut alice, &mut bob] {
        let frame = client.next_frame().await;
        assert_eq!(frame["type"], "new_message");
        assert_eq!(frame["data"]["content"], "hi");
        assert_eq!(frame["data"]["author"]["username"], "alice");
    }
    assert!(alice.no_pending_frames());
    assert!(bob.no_pending_frames());
}

#[tokio::test]
async fn broadcast_order_follows_enqueue_order() {
    let server = TestServer::start();
    let (_, alice_token) = server.register_user("alice").await;
    let (_, bob_token) = server.register_user("bob").await;

    let mut alice = server.connect();
    let mut bob = server.connect();
    alice.authenticate(&alice_token).await;
    bob.authenticate(&bob_token).await;

    for content in ["one", "two", "three"] {
        alice.send_message(content).await;
    }

    for client in [&mut alice, &mut bob] {
        for expected in ["one", "two", "three"] {
            let frame = client.next_frame().await;
            assert_eq!(frame["data"]["content"], expected);
        }
    }
}

#[tokio::test]
async fn rest_and_session_paths_share_store_and_broadcast() {
    let server = TestServer::start();
    let (_, alice_token) = server.register_user("alice").await;
    let (bob, _) = server.register_user("bob").await;

    let mut alice = server.connect();
    alice.authenticate(&alice_token).await;

    // 会话路径发一条
    alice.send_message("from websocket").await;
    // REST 路径发一条（路由处理器走的就是这个服务方法）
    server
        .messages
        .post("from rest", domain::Identity::from(&bob))
        .await
        .unwrap();

    // 两条消息都可以查询到，最新的在前
    let listed = server.messages.list().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].content.as_str(), "from rest");
    assert_eq!(listed[1].content.as_str(), "from websocket");

    // 两条路径各触发一次广播
    let first = alice.next_frame().await;
    assert_eq!(first["data"]["content"], "from websocket");
    let second = alice.next_frame().await;
    assert_eq!(second["data"]["content"], "from rest");
    assert!(alice.no_pending_frames());
}

#[tokio::test]
async fn closed_connection_stops_receiving_broadcasts() {
    let server = TestServer::start();
    let (_, alice_token) = server.register_user("alice").await;
    let (_, bob_token) = server.register_user("bob").await;

    let mut alice = server.connect();
    let mut bob = server.connect();
    alice.authenticate(&alice_token).await;
    bob.authenticate(&bob_token).await;
    assert_eq!(server.registry.len().await, 2);

    bob.session.close().await;
    assert_eq!(server.registry.len().await, 1);

    alice.send_message("still here").await;
    let frame = alice.next_frame().await;
    assert_eq!(frame["data"]["content"], "still here");
    assert!(bob.no_pending_frames());
}
