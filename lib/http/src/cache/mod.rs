mod actor;
mod policy;
mod storage;

pub use actor::HttpCacheActor;
pub use policy::{CachePolicy, Revalidated};
pub use storage::{
    CacheEntry, CacheKey, HttpCacheStorage, HttpCacheStorageRef, LruHttpCacheStorage,
};
