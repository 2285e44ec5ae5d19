use std::time::Duration;

/// The configuration of a [FetchActor](crate::FetchActor).
#[derive(Clone, Debug)]
pub struct FetchConfig {
    /// The `User-Agent` header that is sent if the request does not carry one.
    pub user_agent: String,
    /// The timeout used if the context of an action does not specify one.
    pub default_timeout: Option<Duration>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: format!(
                "sparql-bus/{} ({})",
                env!("CARGO_PKG_VERSION"),
                std::env::consts::OS
            ),
            default_timeout: None,
        }
    }
}

/// The configuration of an [LruHttpCacheStorage](crate::LruHttpCacheStorage).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HttpCacheStorageConfig {
    /// The maximum number of stored responses. Least recently used entries are evicted first.
    pub max_entries: u64,
}

impl Default for HttpCacheStorageConfig {
    fn default() -> Self {
        Self { max_entries: 1000 }
    }
}
