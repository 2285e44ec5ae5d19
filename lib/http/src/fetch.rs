use crate::config::FetchConfig;
use crate::error::{HttpError, HttpResult};
use crate::types::{headers_to_hash, HttpAction, HttpResponse};
use async_trait::async_trait;
use reqwest::header::{HeaderValue, USER_AGENT};
use reqwest::Client;
use sparql_bus_common::{ActorResult, KeysHttp};
use sparql_bus_core::{Actor, MediatorTypeTime};

/// Performs HTTP requests over the network.
///
/// The fetch actor reports an infinite cost, so that any other actor on the bus that can answer
/// a request (e.g., a cache) is preferred.
#[derive(Debug)]
pub struct FetchActor {
    client: Client,
    config: FetchConfig,
}

impl FetchActor {
    /// Creates a new [FetchActor] with its own HTTP client.
    pub fn try_new(config: FetchConfig) -> HttpResult<Self> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(client, config))
    }

    /// Creates a new [FetchActor] that performs requests with `client`.
    pub fn with_client(client: Client, config: FetchConfig) -> Self {
        Self { client, config }
    }

    async fn send(&self, action: HttpAction) -> HttpResult<HttpResponse> {
        let HttpAction { request, context } = action;

        let mut headers = request.headers;
        if !headers.contains_key(USER_AGENT) {
            let user_agent = HeaderValue::try_from(self.config.user_agent.as_str())
                .map_err(|error| HttpError::InvalidHeader(error.to_string()))?;
            headers.insert(USER_AGENT, user_agent);
        }

        tracing::info!(
            method = %request.method,
            headers = ?headers_to_hash(&headers),
            include_credentials = context
                .get(&KeysHttp::INCLUDE_CREDENTIALS)
                .copied()
                .unwrap_or(false),
            "Requesting {}",
            request.url
        );

        let mut builder = self
            .client
            .request(request.method, request.url.clone())
            .headers(headers);
        if let Some(auth) = context.get(&KeysHttp::AUTH) {
            builder = match auth.split_once(':') {
                Some((user, password)) => builder.basic_auth(user, Some(password)),
                None => builder.basic_auth(auth, None::<&str>),
            };
        }

        let request_url = request.url;
        let perform = async {
            let response = builder.send().await?;
            let url = response.url().clone();
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await?;
            Ok::<_, HttpError>(HttpResponse::new(url, status, headers, body))
        };

        match context
            .get(&KeysHttp::TIMEOUT)
            .copied()
            .or(self.config.default_timeout)
        {
            // Dropping the request future on expiry aborts the request.
            Some(timeout) => tokio::time::timeout(timeout, perform)
                .await
                .map_err(|_| HttpError::TimeoutAborted {
                    url: request_url.to_string(),
                    timeout,
                })?,
            None => perform.await,
        }
    }
}

#[async_trait]
impl Actor<HttpAction, MediatorTypeTime, HttpResponse> for FetchActor {
    fn name(&self) -> &str {
        "actor-http-fetch"
    }

    async fn test(&self, _action: &HttpAction) -> ActorResult<MediatorTypeTime> {
        Ok(MediatorTypeTime::new(f64::INFINITY))
    }

    async fn run(&self, action: HttpAction) -> ActorResult<HttpResponse> {
        Ok(self.send(action).await?)
    }
}
