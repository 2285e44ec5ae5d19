use crate::join::HashJoinStream;
use async_trait::async_trait;
use futures::future::try_join_all;
use futures::StreamExt;
use itertools::Itertools;
use sparql_bus_common::{ActorError, ActorResult};
use sparql_bus_core::Actor;
use sparql_bus_model::Variable;
use sparql_bus_query::{
    JoinAction, JoinCoefficients, JoinEntry, JoinType, Metadata, QueryResultBindings,
};

/// Computes the inner join of two bindings streams with a hash join.
///
/// The input with the smaller cardinality becomes the build side and is materialized into a hash
/// table. The other input is streamed against it. Inputs that may contain unbound variables are
/// rejected, as the hash of a solution would not be defined for them.
#[derive(Debug, Default)]
pub struct HashJoinActor;

impl HashJoinActor {
    /// Creates a new [HashJoinActor].
    pub fn new() -> Self {
        Self
    }

    fn check(&self, action: &JoinAction) -> ActorResult<()> {
        if action.join_type != JoinType::Inner {
            return Err(ActorError::rejected(
                self.name(),
                format!("Can only handle inner joins, got {}", action.join_type),
            ));
        }
        if action.entries.len() != 2 {
            return Err(ActorError::rejected(
                self.name(),
                format!(
                    "Can only join exactly two entries, got {}",
                    action.entries.len()
                ),
            ));
        }
        Ok(())
    }

    async fn entry_metadata(&self, entries: &[JoinEntry]) -> ActorResult<(Metadata, Metadata)> {
        let metadata = try_join_all(entries.iter().map(|entry| entry.output.metadata())).await?;
        match metadata.as_slice() {
            [left, right] => Ok((*left, *right)),
            _ => Err(ActorError::rejected(
                self.name(),
                "Can only join exactly two entries",
            )),
        }
    }
}

/// Returns whether `right` should be the build side. Ties go to the first entry.
fn build_right(left: &Metadata, right: &Metadata) -> bool {
    right.cardinality < left.cardinality
}

/// Returns the time spent requesting all pages of an input.
#[allow(clippy::cast_precision_loss)]
fn side_request_time(metadata: &Metadata) -> f64 {
    let request_time = metadata.request_time.unwrap_or(0.0);
    match metadata.page_size {
        Some(page_size) if page_size > 0 => {
            metadata.cardinality as f64 * request_time / page_size as f64
        }
        _ => request_time,
    }
}

#[async_trait]
impl Actor<JoinAction, JoinCoefficients, QueryResultBindings> for HashJoinActor {
    fn name(&self) -> &str {
        "actor-rdf-join-inner-hash"
    }

    #[allow(clippy::cast_precision_loss)]
    async fn test(&self, action: &JoinAction) -> ActorResult<JoinCoefficients> {
        self.check(action)?;
        let (left, right) = self.entry_metadata(&action.entries).await?;
        if left.can_contain_undefs || right.can_contain_undefs {
            return Err(ActorError::rejected(
                self.name(),
                "Can not join entries that may contain undefined values",
            ));
        }

        let build = if build_right(&left, &right) {
            right
        } else {
            left
        };
        Ok(JoinCoefficients {
            iterations: left.cardinality.saturating_add(right.cardinality) as f64,
            persisted_items: build.cardinality as f64,
            blocking_items: build.cardinality as f64,
            request_time: side_request_time(&left) + side_request_time(&right),
        })
    }

    async fn run(&self, action: JoinAction) -> ActorResult<QueryResultBindings> {
        self.check(&action)?;
        let (left_metadata, right_metadata) = self.entry_metadata(&action.entries).await?;

        let mut entries = action.entries.into_iter();
        let (Some(left), Some(right)) = (entries.next(), entries.next()) else {
            return Err(ActorError::rejected(
                self.name(),
                "Can only join exactly two entries",
            ));
        };

        let variables = left
            .output
            .variables()
            .iter()
            .chain(right.output.variables())
            .unique()
            .cloned()
            .collect::<Vec<Variable>>();
        let join_variables = left
            .output
            .variables()
            .iter()
            .filter(|variable| right.output.variables().contains(variable))
            .cloned()
            .collect::<Vec<_>>();
        let cardinality = left_metadata
            .cardinality
            .saturating_mul(right_metadata.cardinality);

        let (build, probe) = if build_right(&left_metadata, &right_metadata) {
            (right, left)
        } else {
            (left, right)
        };
        tracing::debug!(
            build = %build.operation,
            probe = %probe.operation,
            join_variables = join_variables.len(),
            "Running hash join"
        );

        let stream = HashJoinStream::new(
            join_variables,
            build.output.take_stream()?,
            probe.output.take_stream()?,
        );
        Ok(QueryResultBindings::with_metadata(
            stream.boxed(),
            variables,
            Metadata::new(cardinality, false),
        ))
    }
}
