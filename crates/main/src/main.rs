//! 主应用程序入口
//!
//! 启动广播循环和 Axum Web API 服务。

use std::sync::Arc;

use application::{
    MessageService, MessageServiceDependencies, SystemClock, UserService, UserServiceDependencies,
};
use config::AppConfig;
use infrastructure::{
    create_pg_pool, BcryptPasswordHasher, BroadcastLoop, ConnectionRegistry, PgMessageRepository,
    PgUserRepository, QueuedBroadcaster,
};
use tracing_subscriber::EnvFilter;
use web_api::{router, AppState, JwtAuthenticator, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = AppConfig::from_env_with_defaults();

    tracing::info!(
        "连接数据库: {}",
        config.database.url.split('@').next_back().unwrap_or("unknown")
    );
    let pg_pool = create_pg_pool(&config.database.url, config.database.max_connections).await?;

    // 运行迁移
    sqlx::migrate!("../../migrations").run(&pg_pool).await?;

    let user_repository = Arc::new(PgUserRepository::new(pg_pool.clone()));
    let message_repository = Arc::new(PgMessageRepository::new(pg_pool));

    // 连接注册表与广播循环：唯一消费者在独立任务上运行
    let registry = ConnectionRegistry::new();
    let (broadcaster, queue) = QueuedBroadcaster::new(config.broadcast.capacity);
    tokio::spawn(BroadcastLoop::new(registry.clone(), queue).run());

    let clock = Arc::new(SystemClock);
    let password_hasher = Arc::new(BcryptPasswordHasher::new(config.server.bcrypt_cost));

    let user_service = Arc::new(UserService::new(UserServiceDependencies {
        user_repository: user_repository.clone(),
        password_hasher,
        clock: clock.clone(),
    }));
    let message_service = Arc::new(MessageService::new(MessageServiceDependencies {
        message_repository,
        broadcaster: Arc::new(broadcaster),
        clock,
    }));

    let jwt_service = Arc::new(JwtService::new(config.jwt.clone()));
    let authenticator = Arc::new(JwtAuthenticator::new(
        (*jwt_service).clone(),
        user_repository,
    ));

    let state = AppState::new(
        user_service,
        message_service,
        registry,
        authenticator,
        jwt_service,
    );

    let app = router(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("聊天服务器启动在 http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
