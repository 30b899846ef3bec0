use super::{Cache, CacheKey};
use crate::{error::AppResult, models::Explanation, services::providers::ExplanationCache};

/// Stores compatibility explanations in Redis under an unordered user-pair key
///
/// The viewer is not part of the key. A blurb generated when `user_a` asked about
/// `user_b` is returned as-is when `user_b` later asks about `user_a`.
#[derive(Clone)]
pub struct RedisExplanationCache {
    cache: Cache,
    ttl: u64,
}

impl RedisExplanationCache {
    pub fn new(cache: Cache, ttl: u64) -> Self {
        Self { cache, ttl }
    }
}

#[async_trait::async_trait]
impl ExplanationCache for RedisExplanationCache {
    async fn get(&self, user_a: &str, user_b: &str) -> AppResult<Option<Explanation>> {
        self.cache
            .get_from_cache(&CacheKey::compatibility(user_a, user_b))
            .await
    }

    async fn put(&self, user_a: &str, user_b: &str, explanation: &Explanation) -> AppResult<()> {
        self.cache
            .set_in_background(&CacheKey::compatibility(user_a, user_b), explanation, self.ttl);
        Ok(())
    }
}
