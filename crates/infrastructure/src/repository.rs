use chrono::{DateTime, Utc};
use domain::{
    Identity, Message, MessageContent, MessageId, MessageRepository, RepositoryError,
    RepositoryFuture, User, UserEmail, UserId, UserRepository, Username,
};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use uuid::Uuid;

pub async fn create_pg_pool(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await
}

fn map_sqlx_err(err: sqlx::Error) -> RepositoryError {
    RepositoryError::storage(err.to_string())
}

fn invalid_data(message: impl Into<String>) -> RepositoryError {
    RepositoryError::storage(message)
}

#[derive(Debug, FromRow)]
struct UserRecord {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRecord> for User {
    type Error = RepositoryError;

    fn try_from(value: UserRecord) -> Result<Self, Self::Error> {
        let username =
            Username::parse(value.username).map_err(|err| invalid_data(err.to_string()))?;
        let email = UserEmail::parse(value.email).map_err(|err| invalid_data(err.to_string()))?;
        let password = domain::PasswordHash::new(value.password_hash)
            .map_err(|err| invalid_data(err.to_string()))?;

        Ok(User {
            id: UserId::from(value.id),
            username,
            email,
            password,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

/// 消息行带上作者用户名，单次联查即可还原作者身份
#[derive(Debug, FromRow)]
struct MessageRecord {
    id: Uuid,
    content: String,
    author_id: Uuid,
    author_username: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<MessageRecord> for Message {
    type Error = RepositoryError;

    fn try_from(value: MessageRecord) -> Result<Self, Self::Error> {
        let content =
            MessageContent::parse(value.content).map_err(|err| invalid_data(err.to_string()))?;
        let author_username =
            Username::parse(value.author_username).map_err(|err| invalid_data(err.to_string()))?;

        Ok(Message::new(
            MessageId::from(value.id),
            content,
            Identity::new(UserId::from(value.author_id), author_username),
            value.created_at,
        ))
    }
}

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl UserRepository for PgUserRepository {
    fn create(&self, user: User) -> RepositoryFuture<User> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, UserRecord>(
                r#"
                INSERT INTO users (id, username, email, password_hash, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id, username, email, password_hash, created_at, updated_at
                "#,
            )
            .bind(Uuid::from(user.id))
            .bind(user.username.as_str())
            .bind(user.email.as_str())
            .bind(user.password.as_str())
            .bind(user.created_at)
            .bind(user.updated_at)
            .fetch_one(&pool)
            .await
            .map_err(map_sqlx_err)?;

            User::try_from(record)
        })
    }

    fn find_by_id(&self, id: UserId) -> RepositoryFuture<Option<User>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, UserRecord>(
                r#"SELECT id, username, email, password_hash, created_at, updated_at FROM users WHERE id = $1"#,
            )
            .bind(Uuid::from(id))
            .fetch_optional(&pool)
            .await
            .map_err(map_sqlx_err)?;

            record.map(User::try_from).transpose()
        })
    }

    fn find_by_email(&self, email: UserEmail) -> RepositoryFuture<Option<User>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, UserRecord>(
                r#"SELECT id, username, email, password_hash, created_at, updated_at FROM users WHERE email = $1"#,
            )
            .bind(email.as_str())
            .fetch_optional(&pool)
            .await
            .map_err(map_sqlx_err)?;

            record.map(User::try_from).transpose()
        })
    }
}

#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl MessageRepository for PgMessageRepository {
    fn create(&self, message: Message) -> RepositoryFuture<Message> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, MessageRecord>(
                r#"
                WITH inserted AS (
                    INSERT INTO messages (id, content, author_id, created_at)
                    VALUES ($1, $2, $3, $4)
                    RETURNING id, content, author_id, created_at
                )
                SELECT inserted.id, inserted.content, inserted.author_id,
                       users.username AS author_username, inserted.created_at
                FROM inserted
                JOIN users ON users.id = inserted.author_id
                "#,
            )
            .bind(Uuid::from(message.id))
            .bind(message.content.as_str())
            .bind(Uuid::from(message.author.id))
            .bind(message.created_at)
            .fetch_one(&pool)
            .await
            .map_err(map_sqlx_err)?;

            Message::try_from(record)
        })
    }

    fn list(&self) -> RepositoryFuture<Vec<Message>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let records = sqlx::query_as::<_, MessageRecord>(
                r#"
                SELECT messages.id, messages.content, messages.author_id,
                       users.username AS author_username, messages.created_at
                FROM messages
                JOIN users ON users.id = messages.author_id
                ORDER BY messages.created_at DESC
                "#,
            )
            .fetch_all(&pool)
            .await
            .map_err(map_sqlx_err)?;

            records.into_iter().map(Message::try_from).collect()
        })
    }
}
