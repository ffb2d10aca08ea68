//! 基础设施层实现。
//!
//! 提供数据库仓储、密码哈希、连接注册表和广播循环等适配器，
//! 实现应用/领域层定义的接口。

pub mod broadcast;
pub mod password;
pub mod registry;
pub mod repository;

pub use broadcast::{BroadcastLoop, QueuedBroadcaster};
pub use password::BcryptPasswordHasher;
pub use registry::{ConnectionId, ConnectionRegistry, ConnectionSender, RegistryEntry};
pub use repository::{create_pg_pool, PgMessageRepository, PgUserRepository};
