#![doc(test(attr(deny(warnings))))]

//! The HTTP bus of SPARQL Bus.
//!
//! Remote sources are accessed by publishing an [HttpAction] on an [HttpBus]. This crate provides
//! the [FetchActor], which performs the request over the network, and the [HttpCacheActor],
//! which answers requests from an [HttpCacheStorage] if possible and otherwise delegates to a
//! fetch actor. Cached state can be discarded system-wide through the [HttpInvalidator].

mod cache;
mod config;
mod error;
mod fetch;
mod invalidate;
mod types;

pub use cache::{
    CacheEntry, CacheKey, CachePolicy, HttpCacheActor, HttpCacheStorage, HttpCacheStorageRef,
    LruHttpCacheStorage, Revalidated,
};
pub use config::{FetchConfig, HttpCacheStorageConfig};
pub use error::{HttpError, HttpResult};
pub use fetch::FetchActor;
pub use invalidate::{
    HttpInvalidateAction, HttpInvalidator, InvalidateListener, InvalidateListenerHandle,
};
pub use types::{
    headers_to_hash, HttpAction, HttpActorRef, HttpBus, HttpMediator, HttpRequest, HttpResponse,
};

// Re-export the HTTP vocabulary types.
pub use reqwest::header;
pub use reqwest::{Method, StatusCode, Url};
