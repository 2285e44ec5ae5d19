use crate::cache::CachePolicy;
use crate::config::HttpCacheStorageConfig;
use crate::error::{HttpError, HttpResult};
use crate::types::{HttpRequest, HttpResponse};
use async_trait::async_trait;
use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use moka::Expiry;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A cached response together with the policy that governs it.
#[derive(Clone, Debug, PartialEq)]
pub struct CacheEntry {
    pub policy: CachePolicy,
    pub response: HttpResponse,
}

/// Identifies a cached response: the upper-case method and the URL without fragment.
///
/// Responses that vary on request headers share a key. Whether a stored response fits a request
/// is decided by [CachePolicy::satisfies_without_revalidation].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Returns the key of `request`.
    pub fn of(request: &HttpRequest) -> Self {
        let mut url = request.url.clone();
        url.set_fragment(None);
        Self(format!(
            "{} {url}",
            request.method.as_str().to_ascii_uppercase()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A store for cached responses.
///
/// Implementations must be safe to share between concurrently running actors. Concurrent writes
/// to the same key are last-writer-wins.
#[async_trait]
pub trait HttpCacheStorage: Debug + Send + Sync {
    /// Returns the entry stored for `request`.
    async fn get(&self, request: &HttpRequest) -> Option<CacheEntry>;

    /// Stores `entry` for `request`. The entry expires from the storage after `ttl`; a zero `ttl`
    /// keeps it until it is evicted or deleted.
    ///
    /// Fails with [HttpError::NotStorable] if the policy of the entry forbids storing it.
    async fn set(&self, request: &HttpRequest, entry: CacheEntry, ttl: Duration)
        -> HttpResult<()>;

    /// Deletes the entry stored for `request`. Returns whether an entry existed.
    async fn delete(&self, request: &HttpRequest) -> bool;

    /// Deletes all entries.
    async fn clear(&self);

    /// Returns whether an entry is stored for `request`.
    async fn has(&self, request: &HttpRequest) -> bool;
}

/// A reference to an [HttpCacheStorage].
pub type HttpCacheStorageRef = Arc<dyn HttpCacheStorage>;

#[derive(Clone)]
struct StoredEntry {
    entry: Arc<CacheEntry>,
    ttl: Option<Duration>,
}

struct TimeToLive;

impl Expiry<CacheKey, StoredEntry> for TimeToLive {
    fn expire_after_create(
        &self,
        _key: &CacheKey,
        value: &StoredEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &CacheKey,
        value: &StoredEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl
    }
}

/// An in-memory [HttpCacheStorage] that evicts the least recently used entries once
/// `max_entries` is exceeded. A newly stored entry is always admitted.
#[derive(Clone)]
pub struct LruHttpCacheStorage {
    cache: Cache<CacheKey, StoredEntry>,
}

impl LruHttpCacheStorage {
    /// Creates a new empty [LruHttpCacheStorage].
    pub fn new(config: HttpCacheStorageConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_entries)
            .eviction_policy(EvictionPolicy::lru())
            .expire_after(TimeToLive)
            .build();
        Self { cache }
    }

    /// Returns the number of stored entries.
    pub fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }
}

impl Default for LruHttpCacheStorage {
    fn default() -> Self {
        Self::new(HttpCacheStorageConfig::default())
    }
}

impl Debug for LruHttpCacheStorage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LruHttpCacheStorage")
            .field("entry_count", &self.cache.entry_count())
            .finish()
    }
}

#[async_trait]
impl HttpCacheStorage for LruHttpCacheStorage {
    async fn get(&self, request: &HttpRequest) -> Option<CacheEntry> {
        self.cache
            .get(&CacheKey::of(request))
            .map(|stored| CacheEntry::clone(&stored.entry))
    }

    async fn set(
        &self,
        request: &HttpRequest,
        entry: CacheEntry,
        ttl: Duration,
    ) -> HttpResult<()> {
        if !entry.policy.storable() {
            return Err(HttpError::NotStorable(request.url.to_string()));
        }

        let key = CacheKey::of(request);
        tracing::trace!(%key, ?ttl, "Storing response");
        self.cache.insert(
            key,
            StoredEntry {
                entry: Arc::new(entry),
                ttl: (!ttl.is_zero()).then_some(ttl),
            },
        );
        Ok(())
    }

    async fn delete(&self, request: &HttpRequest) -> bool {
        self.cache.remove(&CacheKey::of(request)).is_some()
    }

    async fn clear(&self) {
        self.cache.invalidate_all();
    }

    async fn has(&self, request: &HttpRequest) -> bool {
        self.cache.contains_key(&CacheKey::of(request))
    }
}
