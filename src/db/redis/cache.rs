use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use tokio::sync::mpsc;

use crate::error::AppError;
use crate::error::AppResult;
use crate::models::Category;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Compatibility explanation for an unordered pair of users
    Compatibility { first: String, second: String },
    /// Taste-graph insights for one seed entity
    Insights {
        entity_id: String,
        filter: Category,
        take: u32,
    },
    /// Free-text entity search; `query` is stored normalized
    Search { query: String, take: u32 },
}

impl CacheKey {
    /// Key for a pair of users; `(a, b)` and `(b, a)` produce the same key
    pub fn compatibility(user_a: &str, user_b: &str) -> Self {
        let (first, second) = if user_a <= user_b {
            (user_a, user_b)
        } else {
            (user_b, user_a)
        };
        CacheKey::Compatibility {
            first: first.to_string(),
            second: second.to_string(),
        }
    }

    /// Key for a search; queries differing only in case or outer whitespace share it
    pub fn search(query: &str, take: u32) -> Self {
        CacheKey::Search {
            query: query.trim().to_lowercase(),
            take,
        }
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Compatibility { first, second } => write!(f, "compat:{}:{}", first, second),
            CacheKey::Insights {
                entity_id,
                filter,
                take,
            } => write!(f, "insights:{}:{}:{}", filter, entity_id, take),
            CacheKey::Search { query, take } => write!(f, "search:{}:{}", take, query),
        }
    }
}

/// Creates a Redis client for caching
///
/// Establishes a connection to Redis for fast data caching.
/// Uses connection pooling via the connection-manager feature.
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Message for asynchronous cache writes
struct CacheWriteMessage {
    key: String,
    value: String,
    ttl: u64,
}

/// Redis-backed JSON cache with a background writer
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
    write_tx: mpsc::UnboundedSender<CacheWriteMessage>,
}

/// Handle for gracefully shutting down the cache writer
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl CacheWriterHandle {
    /// Signals the writer and waits until pending writes are flushed
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Cache writer shutdown signal sent");
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Cache writer task failed");
        }
    }
}

impl Cache {
    /// Creates a new Cache and spawns its background write task
    ///
    /// Writes never block request handling; failures are logged by the writer.
    pub fn new(redis_client: Client) -> (Self, CacheWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let client = redis_client.clone();
        let task = tokio::spawn(async move {
            Self::cache_writer_task(client, write_rx, shutdown_rx).await;
        });

        let cache = Self {
            redis_client,
            write_tx,
        };

        (cache, CacheWriterHandle { shutdown_tx, task })
    }

    async fn cache_writer_task(
        client: Client,
        mut write_rx: mpsc::UnboundedReceiver<CacheWriteMessage>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!("Cache writer task started");
        let mut failed_writes: u64 = 0;

        loop {
            tokio::select! {
                Some(msg) = write_rx.recv() => {
                    if let Err(e) = Self::write_to_redis(&client, msg).await {
                        failed_writes += 1;
                        tracing::warn!(error = %e, failed_writes, "Failed to write to Redis cache");
                    }
                }
                _ = shutdown_rx.recv() => {
                    // Drain whatever is already queued, without waiting for new senders
                    write_rx.close();
                    let mut flushed = 0;
                    while let Some(msg) = write_rx.recv().await {
                        match Self::write_to_redis(&client, msg).await {
                            Ok(()) => flushed += 1,
                            Err(e) => tracing::warn!(error = %e, "Failed to flush cache write during shutdown"),
                        }
                    }

                    tracing::info!(flushed, failed_writes, "Cache writer task stopped");
                    break;
                }
            }
        }
    }

    async fn write_to_redis(client: &Client, msg: CacheWriteMessage) -> AppResult<()> {
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(msg.key, msg.value, msg.ttl).await?;
        Ok(())
    }

    /// Reads and deserializes a cached value, `None` on a miss
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(key.to_string()).await?;

        cached
            .map(|json| {
                serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })
            })
            .transpose()
    }

    /// Queues a value for writing without waiting for Redis
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, key = %key, "Cache serialization error");
                return;
            }
        };

        let msg = CacheWriteMessage {
            key: key.to_string(),
            value: json,
            ttl,
        };

        if let Err(e) = self.write_tx.send(msg) {
            tracing::error!(error = %e, "Failed to send cache write message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compatibility_key_is_order_independent() {
        let forward = CacheKey::compatibility("user_b", "user_a");
        let backward = CacheKey::compatibility("user_a", "user_b");
        assert_eq!(forward, backward);
        assert_eq!(forward.to_string(), "compat:user_a:user_b");
    }

    #[test]
    fn test_compatibility_key_same_user() {
        let key = CacheKey::compatibility("user_a", "user_a");
        assert_eq!(key.to_string(), "compat:user_a:user_a");
    }

    #[test]
    fn test_insights_key_display() {
        let key = CacheKey::Insights {
            entity_id: "B8B2BDC1".to_string(),
            filter: Category::TvShow,
            take: 10,
        };
        assert_eq!(key.to_string(), "insights:tv_show:B8B2BDC1:10");
    }

    #[test]
    fn test_search_key_normalizes_query() {
        let key = CacheKey::search("  Kendrick LAMAR ", 20);
        assert_eq!(key, CacheKey::search("kendrick lamar", 20));
        assert_eq!(key.to_string(), "search:20:kendrick lamar");
    }

    #[tokio::test]
    async fn test_set_in_background_does_not_block_without_redis() {
        // Nothing listens on this port; the write fails inside the writer task only.
        let client = create_redis_client("redis://127.0.0.1:1").unwrap();
        let (cache, handle) = Cache::new(client);

        cache.set_in_background(&CacheKey::compatibility("a", "b"), &vec!["x"], 60);
        handle.shutdown().await;
    }
}
