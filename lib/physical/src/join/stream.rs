use futures::{ready, Stream, StreamExt};
use rustc_hash::FxHashMap;
use sparql_bus_model::{Bindings, Variable};
use sparql_bus_query::{BindingsStream, QueryResult};
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Joins two bindings streams by building a hash table over one of them.
///
/// The build side is drained completely before the first solution of the probe side is polled.
/// Afterward, the output is produced lazily in the order of the probe side.
pub struct HashJoinStream {
    /// The variables that both sides have in common.
    join_variables: Vec<Variable>,
    /// The side that is materialized.
    build: BindingsStream,
    /// The side that is streamed.
    probe: BindingsStream,
    /// The build side, keyed by the hash of the join variables.
    table: FxHashMap<u64, Vec<Bindings>>,
    /// Matches of the current probe solution that have not been emitted yet.
    pending: VecDeque<Bindings>,
    /// Current state of the stream.
    state: HashJoinStreamState,
}

enum HashJoinStreamState {
    /// The stream is consuming the build side.
    Building,
    /// The stream is consuming the probe side.
    Probing,
    /// The stream is finished.
    Finished,
}

impl HashJoinStream {
    /// Creates a new [HashJoinStream].
    pub fn new(
        join_variables: Vec<Variable>,
        build: BindingsStream,
        probe: BindingsStream,
    ) -> Self {
        Self {
            join_variables,
            build,
            probe,
            table: FxHashMap::default(),
            pending: VecDeque::new(),
            state: HashJoinStreamState::Building,
        }
    }
}

impl Stream for HashJoinStream {
    type Item = QueryResult<Bindings>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            match this.state {
                HashJoinStreamState::Building => match ready!(this.build.poll_next_unpin(cx)) {
                    Some(Ok(bindings)) => {
                        let key = bindings.hash_values(&this.join_variables);
                        this.table.entry(key).or_default().push(bindings);
                    }
                    Some(Err(error)) => {
                        this.state = HashJoinStreamState::Finished;
                        return Poll::Ready(Some(Err(error)));
                    }
                    None => {
                        tracing::trace!(
                            buckets = this.table.len(),
                            "Hash join build side complete"
                        );
                        this.state = HashJoinStreamState::Probing;
                    }
                },
                HashJoinStreamState::Probing => {
                    if let Some(bindings) = this.pending.pop_front() {
                        return Poll::Ready(Some(Ok(bindings)));
                    }

                    match ready!(this.probe.poll_next_unpin(cx)) {
                        Some(Ok(probe)) => {
                            let key = probe.hash_values(&this.join_variables);
                            if let Some(bucket) = this.table.get(&key) {
                                // Equal hashes do not imply compatible solutions.
                                this.pending
                                    .extend(bucket.iter().filter_map(|build| probe.merge(build)));
                            }
                        }
                        Some(Err(error)) => {
                            this.state = HashJoinStreamState::Finished;
                            return Poll::Ready(Some(Err(error)));
                        }
                        None => {
                            this.state = HashJoinStreamState::Finished;
                        }
                    }
                }
                HashJoinStreamState::Finished => return Poll::Ready(None),
            }
        }
    }
}
