use crate::ContextKey;
use sparql_bus_model::GraphPattern;
use std::time::Duration;

/// Context keys that configure HTTP actors.
pub struct KeysHttp;

impl KeysHttp {
    /// The timeout of a single HTTP request. On expiry the request is aborted.
    pub const TIMEOUT: ContextKey<Duration> = ContextKey::new("sparql-bus:http:timeout");
    /// Credentials (`user:password`) used for HTTP basic authentication.
    pub const AUTH: ContextKey<String> = ContextKey::new("sparql-bus:http:auth");
    /// Whether cross-origin requests should include credentials.
    pub const INCLUDE_CREDENTIALS: ContextKey<bool> =
        ContextKey::new("sparql-bus:http:include-credentials");
}

/// Context keys that are maintained while evaluating the operation tree.
pub struct KeysQueryOperation;

impl KeysQueryOperation {
    /// The operation that is currently evaluated.
    pub const OPERATION: ContextKey<GraphPattern> =
        ContextKey::new("sparql-bus:query-operation:operation");
    /// The operation that caused the evaluation of the current operation.
    pub const PARENT_OPERATION: ContextKey<GraphPattern> =
        ContextKey::new("sparql-bus:query-operation:parent-operation");
}
