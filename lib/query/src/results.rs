use crate::error::{QueryError, QueryResult};
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::{FutureExt, StreamExt, TryStreamExt};
use sparql_bus_model::{Bindings, Variable};
use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::sync::{Mutex, PoisonError};
use tokio::sync::OnceCell;

/// A finite, single-pass stream of solutions.
pub type BindingsStream = BoxStream<'static, QueryResult<Bindings>>;

type MetadataProducer = BoxFuture<'static, QueryResult<Metadata>>;

/// Statistics about a bindings stream.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Metadata {
    /// The (estimated) number of solutions.
    pub cardinality: u64,
    /// The number of solutions per page if the source is paged.
    pub page_size: Option<u64>,
    /// The time it takes to request a single page (or the whole result if not paged).
    pub request_time: Option<f64>,
    /// Whether a solution may leave some of the stream's variables unbound.
    pub can_contain_undefs: bool,
}

impl Metadata {
    /// Creates a new [Metadata] without paging information.
    pub fn new(cardinality: u64, can_contain_undefs: bool) -> Self {
        Self {
            cardinality,
            page_size: None,
            request_time: None,
            can_contain_undefs,
        }
    }

    /// Returns a copy of this metadata with the given page size.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Returns a copy of this metadata with the given request time.
    #[must_use]
    pub fn with_request_time(mut self, request_time: f64) -> Self {
        self.request_time = Some(request_time);
        self
    }
}

/// A bindings result that is exchanged between operators.
///
/// The stream can be taken exactly once. Afterward, [QueryResultBindings::take_stream] fails with
/// [QueryError::StreamConsumed]. The metadata is produced lazily on first request and every
/// subsequent request observes the same value.
pub struct QueryResultBindings {
    /// The solutions. `None` once consumed.
    stream: Mutex<Option<BindingsStream>>,
    /// The variables of the solutions in first-seen order.
    variables: Vec<Variable>,
    /// The resolved metadata.
    metadata: OnceCell<Metadata>,
    /// Produces the metadata. `None` once it has been started.
    metadata_producer: Mutex<Option<MetadataProducer>>,
}

impl QueryResultBindings {
    /// Creates a new [QueryResultBindings] with lazily produced metadata.
    pub fn new(
        stream: BindingsStream,
        variables: Vec<Variable>,
        metadata: impl Future<Output = QueryResult<Metadata>> + Send + 'static,
    ) -> Self {
        Self {
            stream: Mutex::new(Some(stream)),
            variables,
            metadata: OnceCell::new(),
            metadata_producer: Mutex::new(Some(metadata.boxed())),
        }
    }

    /// Creates a new [QueryResultBindings] with already known metadata.
    pub fn with_metadata(
        stream: BindingsStream,
        variables: Vec<Variable>,
        metadata: Metadata,
    ) -> Self {
        Self {
            stream: Mutex::new(Some(stream)),
            variables,
            metadata: OnceCell::new_with(Some(metadata)),
            metadata_producer: Mutex::new(None),
        }
    }

    /// Creates a new [QueryResultBindings] from materialized solutions.
    pub fn from_bindings(
        bindings: Vec<Bindings>,
        variables: Vec<Variable>,
        metadata: Metadata,
    ) -> Self {
        let stream = futures::stream::iter(bindings.into_iter().map(Ok)).boxed();
        Self::with_metadata(stream, variables, metadata)
    }

    /// Returns the variables of this result.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Returns whether the stream has already been taken.
    pub fn is_consumed(&self) -> bool {
        self.stream
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Takes the stream out of this result.
    pub fn take_stream(&self) -> QueryResult<BindingsStream> {
        self.stream
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(QueryError::StreamConsumed)
    }

    /// Consumes this result and collects all solutions.
    pub async fn collect(self) -> QueryResult<Vec<Bindings>> {
        self.take_stream()?.try_collect().await
    }

    /// Returns the metadata of this result, producing it if necessary.
    pub async fn metadata(&self) -> QueryResult<Metadata> {
        self.metadata
            .get_or_try_init(|| async {
                let producer = self
                    .metadata_producer
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .take();
                match producer {
                    Some(producer) => producer.await,
                    None => Err(QueryError::MetadataUnavailable),
                }
            })
            .await
            .copied()
    }

    /// Transforms the stream of this result while keeping its metadata.
    ///
    /// The metadata of the new result is forwarded from this result when requested.
    pub fn map_stream(
        self,
        variables: Vec<Variable>,
        map: impl FnOnce(BindingsStream) -> BindingsStream,
    ) -> QueryResult<Self> {
        let stream = map(self.take_stream()?);
        Ok(Self::new(stream, variables, async move {
            self.metadata().await
        }))
    }
}

impl Debug for QueryResultBindings {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryResultBindings")
            .field("variables", &self.variables)
            .field("metadata", &self.metadata.get())
            .field("consumed", &self.is_consumed())
            .finish()
    }
}

/// The output of evaluating a query operation.
#[derive(Debug)]
pub enum QueryOutput {
    /// A stream of solutions.
    Bindings(QueryResultBindings),
    /// The answer of an `ASK` query.
    Boolean(bool),
}

impl QueryOutput {
    /// Returns the contained [QueryResultBindings] or [QueryError::NotBindings].
    pub fn into_bindings(self) -> QueryResult<QueryResultBindings> {
        match self {
            QueryOutput::Bindings(bindings) => Ok(bindings),
            QueryOutput::Boolean(_) => Err(QueryError::NotBindings),
        }
    }
}

impl From<QueryResultBindings> for QueryOutput {
    fn from(value: QueryResultBindings) -> Self {
        QueryOutput::Bindings(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparql_bus_model::NamedNode;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn solution(value: &str) -> Bindings {
        Bindings::new().set(
            Variable::new_unchecked("a"),
            NamedNode::new_unchecked(format!("http://example.com/{value}")),
        )
    }

    #[tokio::test]
    async fn stream_can_only_be_taken_once() {
        let result = QueryResultBindings::from_bindings(
            vec![solution("1"), solution("2")],
            vec![Variable::new_unchecked("a")],
            Metadata::new(2, false),
        );

        assert!(!result.is_consumed(), "stream must be available");
        let stream = result.take_stream().unwrap();
        assert_eq!(stream.count().await, 2);
        assert!(result.is_consumed(), "stream must be consumed");
        assert!(matches!(
            result.take_stream(),
            Err(QueryError::StreamConsumed)
        ));
    }

    #[tokio::test]
    async fn metadata_is_produced_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let producer_calls = Arc::clone(&calls);
        let result = QueryResultBindings::new(
            futures::stream::empty().boxed(),
            vec![],
            async move {
                producer_calls.fetch_add(1, Ordering::SeqCst);
                Ok(Metadata::new(7, true))
            },
        );

        let (first, second) = futures::join!(result.metadata(), result.metadata());
        let third = result.metadata().await;

        assert_eq!(first.unwrap(), Metadata::new(7, true));
        assert_eq!(second.unwrap(), Metadata::new(7, true));
        assert_eq!(third.unwrap(), Metadata::new(7, true));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn map_stream_forwards_metadata() {
        let result = QueryResultBindings::from_bindings(
            vec![solution("1"), solution("2"), solution("3")],
            vec![Variable::new_unchecked("a")],
            Metadata::new(3, false).with_page_size(10),
        );

        let mapped = result
            .map_stream(vec![Variable::new_unchecked("a")], |stream| {
                stream.skip(1).boxed()
            })
            .unwrap();

        assert_eq!(
            mapped.metadata().await.unwrap(),
            Metadata::new(3, false).with_page_size(10)
        );
        assert_eq!(mapped.collect().await.unwrap(), vec![solution("2"), solution("3")]);
    }

    #[test]
    fn boolean_output_is_not_bindings() {
        assert!(matches!(
            QueryOutput::Boolean(true).into_bindings(),
            Err(QueryError::NotBindings)
        ));
    }
}
