use sparql_bus_common::ActorError;

/// The result of a query-level operation.
pub type QueryResult<T> = Result<T, QueryError>;

/// An error raised while producing or consuming query results.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum QueryError {
    #[error("The bindings stream has already been consumed.")]
    StreamConsumed,
    #[error("The metadata of the bindings stream is no longer available.")]
    MetadataUnavailable,
    #[error("Expected a bindings result but got a boolean result.")]
    NotBindings,
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    #[error(transparent)]
    Actor(#[from] ActorError),
}

impl From<QueryError> for ActorError {
    fn from(error: QueryError) -> Self {
        match error {
            QueryError::Actor(error) => error,
            error => ActorError::run(error),
        }
    }
}
