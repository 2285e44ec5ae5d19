use crate::error::{HttpError, HttpResult};
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode, Url};
use sparql_bus_common::ActionContext;
use sparql_bus_core::{Action, ActorRef, Bus, MediatorRef, MediatorTypeTime};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// The bus on which HTTP actors are registered.
pub type HttpBus = Bus<HttpAction, MediatorTypeTime, HttpResponse>;
/// A reference to an HTTP actor.
pub type HttpActorRef = ActorRef<HttpAction, MediatorTypeTime, HttpResponse>;
/// A mediator that performs an [HttpAction].
pub type HttpMediator = MediatorRef<HttpAction, HttpResponse>;

/// An HTTP request without a body.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
}

impl HttpRequest {
    /// Creates a new [HttpRequest] without headers.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
        }
    }

    /// Creates a new `GET` request for `url`.
    pub fn get(url: &str) -> HttpResult<Self> {
        let url = Url::parse(url).map_err(|error| HttpError::InvalidUrl {
            url: url.to_owned(),
            reason: error.to_string(),
        })?;
        Ok(Self::new(Method::GET, url))
    }

    /// Returns this request with an additional header.
    pub fn with_header(mut self, name: &str, value: &str) -> HttpResult<Self> {
        let name = HeaderName::try_from(name)
            .map_err(|error| HttpError::InvalidHeader(error.to_string()))?;
        let value = HeaderValue::try_from(value)
            .map_err(|error| HttpError::InvalidHeader(error.to_string()))?;
        self.headers.append(name, value);
        Ok(self)
    }
}

/// A fully received HTTP response.
///
/// The body is held in memory. Cloning a response yields an independent handle to the same
/// immutable body, so the cache and the caller can both read it.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpResponse {
    /// The final URL after following redirects.
    pub url: Url,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl HttpResponse {
    /// Creates a new [HttpResponse].
    pub fn new(url: Url, status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            url,
            status,
            headers,
            body: body.into(),
        }
    }
}

/// Requests performing an HTTP request.
#[derive(Clone, Debug)]
pub struct HttpAction {
    pub request: HttpRequest,
    pub context: ActionContext,
}

impl HttpAction {
    /// Creates a new [HttpAction].
    pub fn new(request: HttpRequest, context: ActionContext) -> Self {
        Self { request, context }
    }
}

impl Action for HttpAction {
    fn context(&self) -> &ActionContext {
        &self.context
    }
}

/// Converts `headers` into a map from header name to the comma-separated header values.
///
/// Header names are lower-case. Values that are not valid UTF-8 are converted lossily.
pub fn headers_to_hash(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut hash = BTreeMap::<String, String>::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        match hash.entry(name.as_str().to_owned()) {
            Entry::Occupied(mut entry) => {
                let existing = entry.get_mut();
                existing.push_str(", ");
                existing.push_str(&value);
            }
            Entry::Vacant(entry) => {
                entry.insert(value.into_owned());
            }
        }
    }
    hash
}
