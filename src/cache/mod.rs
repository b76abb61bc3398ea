use async_trait::async_trait;
use redis::{Client, RedisError, RedisResult, Script, aio::ConnectionManager};
use serde::{Serialize, de::DeserializeOwned};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{ConfigError, env_or};

/// Writes `ARGV[2]` to `KEYS[2]` only while the generation counter in
/// `KEYS[1]` still reads `ARGV[1]`.
const SET_IF_GENERATION: &str = r"
local current = redis.call('GET', KEYS[1]) or '0'
if current == ARGV[1] then
    redis.call('SET', KEYS[2], ARGV[2], 'EX', ARGV[3])
    return 1
end
return 0
";

/// String-level operations the read-through cache needs.
///
/// Every cached view is paired with a generation counter. Invalidation bumps
/// the counter before deleting, and a reader only stores what it loaded if
/// the counter has not moved since before the load.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    async fn get_raw(&self, key: &str) -> RedisResult<Option<String>>;

    async fn generation(&self, key: &str) -> RedisResult<u64>;

    async fn bump_generation(&self, key: &str) -> RedisResult<()>;

    /// Returns `false` (and writes nothing) if `generation_key` moved past `expected`.
    async fn set_raw_if_generation(
        &self,
        generation_key: &str,
        expected: u64,
        key: &str,
        value: String,
        ttl: Duration,
    ) -> RedisResult<bool>;

    async fn delete(&self, key: &str) -> RedisResult<()>;

    /// Delete every key matching a glob pattern
    async fn delete_pattern(&self, pattern: &str) -> RedisResult<()>;
}

/// JSON values in redis, used to front the unauthenticated read endpoints.
#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
}

impl RedisCache {
    pub async fn new(redis_url: &str) -> Result<Self, RedisError> {
        let client = Client::open(redis_url)?;
        let connection = ConnectionManager::new(client).await?;
        Ok(Self { connection })
    }
}

#[async_trait]
impl ResponseCache for RedisCache {
    async fn get_raw(&self, key: &str) -> RedisResult<Option<String>> {
        redis::cmd("GET")
            .arg(key)
            .query_async(&mut self.connection.clone())
            .await
    }

    async fn generation(&self, key: &str) -> RedisResult<u64> {
        let value: Option<u64> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut self.connection.clone())
            .await?;
        Ok(value.unwrap_or(0))
    }

    async fn bump_generation(&self, key: &str) -> RedisResult<()> {
        let _: u64 = redis::cmd("INCR")
            .arg(key)
            .query_async(&mut self.connection.clone())
            .await?;
        Ok(())
    }

    async fn set_raw_if_generation(
        &self,
        generation_key: &str,
        expected: u64,
        key: &str,
        value: String,
        ttl: Duration,
    ) -> RedisResult<bool> {
        let written: i32 = Script::new(SET_IF_GENERATION)
            .key(generation_key)
            .key(key)
            .arg(expected)
            .arg(value)
            .arg(ttl.as_secs().max(1))
            .invoke_async(&mut self.connection.clone())
            .await?;
        Ok(written == 1)
    }

    async fn delete(&self, key: &str) -> RedisResult<()> {
        redis::cmd("DEL")
            .arg(key)
            .query_async(&mut self.connection.clone())
            .await
    }

    async fn delete_pattern(&self, pattern: &str) -> RedisResult<()> {
        let keys: Vec<String> = redis::cmd("KEYS")
            .arg(pattern)
            .query_async(&mut self.connection.clone())
            .await?;

        if !keys.is_empty() {
            let _: () = redis::cmd("DEL")
                .arg(&keys)
                .query_async(&mut self.connection.clone())
                .await?;
        }

        Ok(())
    }
}

fn serde_error(what: &'static str, e: serde_json::Error) -> RedisError {
    RedisError::from((redis::ErrorKind::TypeError, what, e.to_string()))
}

/// Serve `key` from the cache, or load it and populate the cache.
///
/// The loaded value is only stored if `generation_key` is unchanged since
/// before the load, so a copy read just before an invalidation is never
/// written back after it. Cache failures are logged and fall through to `load`.
pub async fn read_through<C, T, E, F, Fut>(
    cache: &C,
    key: &str,
    generation_key: &str,
    ttl: Duration,
    load: F,
) -> Result<T, E>
where
    C: ResponseCache + ?Sized,
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    match cache.get_raw(key).await {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(hit) => return Ok(hit),
            Err(e) => tracing::warn!("Cache error: {}", serde_error("Deserialization error", e)),
        },
        Ok(None) => {}
        Err(e) => tracing::warn!("Cache error: {}", e),
    }

    let generation = match cache.generation(generation_key).await {
        Ok(generation) => Some(generation),
        Err(e) => {
            tracing::warn!("Cache error: {}", e);
            None
        }
    };

    let value = load().await?;

    let Some(generation) = generation else {
        return Ok(value);
    };
    let stored = match serde_json::to_string(&value) {
        Ok(raw) => {
            cache
                .set_raw_if_generation(generation_key, generation, key, raw, ttl)
                .await
        }
        Err(e) => Err(serde_error("Serialization error", e)),
    };
    match stored {
        Ok(true) => {}
        Ok(false) => tracing::debug!(key, "skipped caching a value invalidated during load"),
        Err(e) => tracing::warn!("Cache error: {}", e),
    }
    Ok(value)
}

/// Drop every cached view that could show a stale copy of portfolio `id`.
pub async fn invalidate_portfolio<C: ResponseCache + ?Sized>(cache: &C, id: uuid::Uuid) {
    let results = [
        cache.bump_generation(&keys::portfolio_generation(id)).await,
        cache.bump_generation(keys::gallery_generation()).await,
        cache.delete(&keys::public_portfolio(id)).await,
        cache.delete(&keys::comments(id)).await,
        cache.delete_pattern(keys::gallery_pattern()).await,
    ];
    for e in results.into_iter().filter_map(Result::err) {
        tracing::warn!(portfolio_id = %id, "Cache invalidation failed: {}", e);
    }
}

/// Drop the cached comment list of portfolio `id`.
pub async fn invalidate_comments<C: ResponseCache + ?Sized>(cache: &C, id: uuid::Uuid) {
    let results = [
        cache.bump_generation(&keys::portfolio_generation(id)).await,
        cache.delete(&keys::comments(id)).await,
    ];
    for e in results.into_iter().filter_map(Result::err) {
        tracing::warn!(portfolio_id = %id, "Cache invalidation failed: {}", e);
    }
}

/// Cache key generators
pub mod keys {
    use uuid::Uuid;

    /// One page of the public gallery
    pub fn gallery_page(page: u64, limit: u64) -> String {
        format!("gallery:page:{page}:{limit}")
    }

    /// Matches every cached gallery page
    pub fn gallery_pattern() -> &'static str {
        "gallery:*"
    }

    /// Generation counter guarding every gallery page.
    /// Kept outside `gallery:*` so page invalidation never resets it.
    pub fn gallery_generation() -> &'static str {
        "gen:gallery"
    }

    /// A published portfolio
    pub fn public_portfolio(id: Uuid) -> String {
        format!("portfolio:{id}:public")
    }

    /// Comments on a published portfolio
    pub fn comments(portfolio_id: Uuid) -> String {
        format!("portfolio:{portfolio_id}:comments")
    }

    /// Generation counter guarding a portfolio's public view and comments
    pub fn portfolio_generation(id: Uuid) -> String {
        format!("gen:portfolio:{id}")
    }
}

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub public_ttl: Duration,
    pub gallery_ttl: Duration,
    pub identity_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            public_ttl: Duration::from_secs(300),  // 5 minutes
            gallery_ttl: Duration::from_secs(120), // 2 minutes
            identity_ttl: Duration::from_secs(60), // 1 minute
        }
    }
}

impl CacheConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            public_ttl: secs("CACHE_TTL_PUBLIC", defaults.public_ttl)?,
            gallery_ttl: secs("CACHE_TTL_GALLERY", defaults.gallery_ttl)?,
            identity_ttl: secs("CACHE_TTL_IDENTITY", defaults.identity_ttl)?,
        })
    }
}

fn secs(name: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    env_or(name, default.as_secs()).map(Duration::from_secs)
}

/// Wrapper type for Actix-web app data
pub type CacheData = Arc<RedisCache>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokio::sync::Mutex;
    use uuid::Uuid;

    /// Single-process stand-in for redis with the same generation semantics.
    #[derive(Default)]
    struct MemoryCache {
        entries: Mutex<HashMap<String, String>>,
    }

    impl MemoryCache {
        async fn contains(&self, key: &str) -> bool {
            self.entries.lock().await.contains_key(key)
        }
    }

    #[async_trait]
    impl ResponseCache for MemoryCache {
        async fn get_raw(&self, key: &str) -> RedisResult<Option<String>> {
            Ok(self.entries.lock().await.get(key).cloned())
        }

        async fn generation(&self, key: &str) -> RedisResult<u64> {
            let entries = self.entries.lock().await;
            Ok(entries.get(key).and_then(|v| v.parse().ok()).unwrap_or(0))
        }

        async fn bump_generation(&self, key: &str) -> RedisResult<()> {
            let mut entries = self.entries.lock().await;
            let next = entries
                .get(key)
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(0)
                + 1;
            entries.insert(key.to_string(), next.to_string());
            Ok(())
        }

        async fn set_raw_if_generation(
            &self,
            generation_key: &str,
            expected: u64,
            key: &str,
            value: String,
            _ttl: Duration,
        ) -> RedisResult<bool> {
            let mut entries = self.entries.lock().await;
            let current = entries
                .get(generation_key)
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(0);
            if current != expected {
                return Ok(false);
            }
            entries.insert(key.to_string(), value);
            Ok(true)
        }

        async fn delete(&self, key: &str) -> RedisResult<()> {
            self.entries.lock().await.remove(key);
            Ok(())
        }

        async fn delete_pattern(&self, pattern: &str) -> RedisResult<()> {
            let prefix = pattern.trim_end_matches('*');
            self.entries
                .lock()
                .await
                .retain(|k, _| !k.starts_with(prefix));
            Ok(())
        }
    }

    const TTL: Duration = Duration::from_secs(60);

    #[test]
    fn portfolio_keys_share_a_prefix() {
        let id = Uuid::nil();
        assert_eq!(
            keys::public_portfolio(id),
            "portfolio:00000000-0000-0000-0000-000000000000:public"
        );
        assert!(keys::comments(id).starts_with("portfolio:00000000"));
    }

    #[test]
    fn gallery_pages_match_the_invalidation_pattern() {
        let key = keys::gallery_page(2, 20);
        assert_eq!(key, "gallery:page:2:20");
        let prefix = keys::gallery_pattern().trim_end_matches('*');
        assert!(key.starts_with(prefix));
        assert!(!keys::gallery_generation().starts_with(prefix));
    }

    #[tokio::test]
    async fn loads_once_then_serves_from_cache() {
        let cache = MemoryCache::default();
        let id = Uuid::new_v4();
        let key = keys::public_portfolio(id);
        let generation = keys::portfolio_generation(id);

        let first: Result<String, ()> =
            read_through(&cache, &key, &generation, TTL, || async { Ok("v1".to_string()) })
                .await;
        assert_eq!(first.unwrap(), "v1");

        let second: Result<String, ()> =
            read_through(&cache, &key, &generation, TTL, || async { Ok("v2".to_string()) })
                .await;
        assert_eq!(second.unwrap(), "v1");
    }

    #[tokio::test]
    async fn invalidation_during_load_is_not_undone() {
        let cache = MemoryCache::default();
        let id = Uuid::new_v4();
        let key = keys::public_portfolio(id);
        let generation = keys::portfolio_generation(id);

        // The owner hides the portfolio after the reader loaded it but before
        // the reader's cache write.
        let served: Result<String, ()> = read_through(&cache, &key, &generation, TTL, || async {
            invalidate_portfolio(&cache, id).await;
            Ok("public copy".to_string())
        })
        .await;

        assert_eq!(served.unwrap(), "public copy");
        assert!(!cache.contains(&key).await);
    }

    #[tokio::test]
    async fn gallery_pages_loaded_across_an_invalidation_are_dropped() {
        let cache = MemoryCache::default();
        let id = Uuid::new_v4();
        let key = keys::gallery_page(1, 20);

        let _: Result<Vec<Uuid>, ()> =
            read_through(&cache, &key, keys::gallery_generation(), TTL, || async {
                invalidate_portfolio(&cache, id).await;
                Ok(vec![id])
            })
            .await;
        assert!(!cache.contains(&key).await);

        let _: Result<Vec<Uuid>, ()> =
            read_through(&cache, &key, keys::gallery_generation(), TTL, || async {
                Ok(vec![])
            })
            .await;
        assert!(cache.contains(&key).await);
    }

    #[tokio::test]
    async fn new_comments_invalidate_the_cached_list() {
        let cache = MemoryCache::default();
        let id = Uuid::new_v4();
        let key = keys::comments(id);
        let generation = keys::portfolio_generation(id);

        let _: Result<Vec<String>, ()> =
            read_through(&cache, &key, &generation, TTL, || async { Ok(vec![]) }).await;
        assert!(cache.contains(&key).await);

        invalidate_comments(&cache, id).await;
        assert!(!cache.contains(&key).await);
    }

    #[tokio::test]
    async fn load_errors_are_returned_and_not_cached() {
        let cache = MemoryCache::default();
        let id = Uuid::new_v4();
        let key = keys::public_portfolio(id);

        let result: Result<String, &str> = read_through(
            &cache,
            &key,
            &keys::portfolio_generation(id),
            TTL,
            || async { Err("not found") },
        )
        .await;

        assert_eq!(result.unwrap_err(), "not found");
        assert!(!cache.contains(&key).await);
    }
}
