use crate::cache::{CacheEntry, CachePolicy, HttpCacheStorageRef};
use crate::error::{HttpError, HttpResult};
use crate::invalidate::{
    HttpInvalidateAction, HttpInvalidator, InvalidateListener, InvalidateListenerHandle,
};
use crate::types::{HttpAction, HttpActorRef, HttpRequest, HttpResponse};
use async_trait::async_trait;
use sparql_bus_common::ActorResult;
use sparql_bus_core::{Actor, MediatorTypeTime};
use std::sync::Arc;

/// Answers HTTP requests from an [HttpCacheStorage](crate::HttpCacheStorage).
///
/// Requests that can not be answered from the storage are delegated to a fetch actor. Stale
/// entries are revalidated with a conditional request.
#[derive(Debug)]
pub struct HttpCacheActor {
    storage: HttpCacheStorageRef,
    invalidator: Arc<HttpInvalidator>,
    fetch: HttpActorRef,
    _listener: InvalidateListenerHandle,
}

/// Deletes storage entries on invalidation.
#[derive(Debug)]
struct StorageInvalidateListener {
    storage: HttpCacheStorageRef,
}

#[async_trait]
impl InvalidateListener for StorageInvalidateListener {
    async fn on_invalidate(&self, action: &HttpInvalidateAction) {
        match &action.url {
            Some(url) => match HttpRequest::get(url) {
                Ok(request) => {
                    self.storage.delete(&request).await;
                }
                Err(error) => tracing::warn!("Ignoring invalidation: {error}"),
            },
            None => self.storage.clear().await,
        }
    }
}

impl HttpCacheActor {
    /// Creates a new [HttpCacheActor] and registers it with `invalidator`. The registration ends
    /// when the actor is dropped.
    pub fn new(
        storage: HttpCacheStorageRef,
        invalidator: Arc<HttpInvalidator>,
        fetch: HttpActorRef,
    ) -> Self {
        let listener = invalidator.add_listener(Arc::new(StorageInvalidateListener {
            storage: Arc::clone(&storage),
        }));
        Self {
            storage,
            invalidator,
            fetch,
            _listener: listener,
        }
    }

    /// Stores `response` as the answer to `request`.
    ///
    /// Fails with [HttpError::NotStorable] if the response must not be cached.
    pub async fn put(&self, request: &HttpRequest, response: HttpResponse) -> HttpResult<()> {
        let policy = CachePolicy::new(request, &response);
        if !policy.storable() {
            return Err(HttpError::NotStorable(request.url.to_string()));
        }
        let ttl = policy.time_to_live();
        self.storage
            .set(request, CacheEntry { policy, response }, ttl)
            .await
    }

    /// Returns whether a stored response can answer `request` without revalidation.
    pub async fn has(&self, request: &HttpRequest) -> bool {
        self.storage
            .get(request)
            .await
            .is_some_and(|entry| entry.policy.satisfies_without_revalidation(request))
    }

    async fn fetch_with_cache(&self, action: HttpAction) -> ActorResult<HttpResponse> {
        let Some(cached) = self.storage.get(&action.request).await else {
            tracing::debug!(url = %action.request.url, "Cache miss");
            let request = action.request.clone();
            let response = self.fetch.run(action).await?;
            if let Err(error) = self.put(&request, response.clone()).await {
                tracing::debug!("Not caching response: {error}");
            }
            return Ok(response);
        };

        if cached
            .policy
            .satisfies_without_revalidation(&action.request)
        {
            tracing::debug!(url = %action.request.url, "Cache hit");
            return Ok(cached.response);
        }

        tracing::debug!(url = %action.request.url, "Revalidating stale response");
        self.invalidator
            .invalidate(&HttpInvalidateAction::url(
                action.request.url.as_str(),
                action.context.clone(),
            ))
            .await;

        let mut request = action.request;
        request.headers = cached.policy.revalidation_headers(&request);
        let response = self
            .fetch
            .run(HttpAction::new(request.clone(), action.context))
            .await?;

        let revalidated = cached.policy.revalidated_policy(&request, &response);
        let response = if revalidated.modified {
            response
        } else {
            cached.response
        };
        let ttl = revalidated.policy.time_to_live();
        let entry = CacheEntry {
            policy: revalidated.policy,
            response: response.clone(),
        };
        if let Err(error) = self.storage.set(&request, entry, ttl).await {
            tracing::debug!("Not caching revalidated response: {error}");
        }
        Ok(response)
    }
}

#[async_trait]
impl Actor<HttpAction, MediatorTypeTime, HttpResponse> for HttpCacheActor {
    fn name(&self) -> &str {
        "actor-http-cache"
    }

    async fn test(&self, action: &HttpAction) -> ActorResult<MediatorTypeTime> {
        if self.has(&action.request).await {
            return Ok(MediatorTypeTime::new(1.0));
        }
        self.fetch.test(action).await
    }

    async fn run(&self, action: HttpAction) -> ActorResult<HttpResponse> {
        self.fetch_with_cache(action).await
    }
}
