pub mod memory;
pub mod postgres;
pub mod redis;
mod repository;

pub use memory::InMemoryTasteRepository;
pub use postgres::{create_pool, PgTasteRepository};
pub use self::redis::create_redis_client;
pub use self::redis::Cache;
pub use self::redis::CacheKey;
pub use repository::TasteRepository;

#[cfg(test)]
pub use repository::MockTasteRepository;
