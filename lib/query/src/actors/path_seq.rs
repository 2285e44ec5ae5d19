use crate::error::QueryError;
use crate::join::{JoinAction, JoinEntry, JoinMediator, JoinType};
use crate::operation::{
    OperationType, QueryOperationAction, QueryOperationMediator, TypedOperationActor,
};
use crate::results::QueryOutput;
use crate::variables::fresh_variable;
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use sparql_bus_common::{ActionContext, ActorResult};
use sparql_bus_model::{GraphPattern, PropertyPathExpression, TermPattern};

/// Evaluates a property path sequence (`?s p1/p2 ?o`).
///
/// The sequence is split into two paths that are connected through a generated variable. Both
/// paths are evaluated on the query operation bus and joined on the join bus. The generated
/// variable is removed from the result.
#[derive(Debug)]
pub struct PathSeqActor {
    mediator_query_operation: QueryOperationMediator,
    mediator_join: JoinMediator,
}

impl PathSeqActor {
    /// Creates a new [PathSeqActor].
    pub fn new(
        mediator_query_operation: QueryOperationMediator,
        mediator_join: JoinMediator,
    ) -> Self {
        Self {
            mediator_query_operation,
            mediator_join,
        }
    }
}

#[async_trait]
impl TypedOperationActor for PathSeqActor {
    fn name(&self) -> &str {
        "actor-query-operation-path-seq"
    }

    fn operation_type(&self) -> OperationType {
        OperationType::PathSeq
    }

    async fn run_operation(
        &self,
        operation: GraphPattern,
        context: ActionContext,
    ) -> ActorResult<QueryOutput> {
        let joiner = fresh_variable("seq_join", &operation);
        let (subject, first, second, object) = match operation {
            GraphPattern::Path {
                subject,
                path: PropertyPathExpression::Sequence(first, second),
                object,
            } => (subject, first, second, object),
            operation => {
                return Err(QueryError::InvalidOperation(format!(
                    "Expected a path sequence, got {operation}"
                ))
                .into())
            }
        };

        let left = GraphPattern::Path {
            subject,
            path: *first,
            object: TermPattern::Variable(joiner.clone()),
        };
        let right = GraphPattern::Path {
            subject: TermPattern::Variable(joiner.clone()),
            path: *second,
            object,
        };

        let (left_output, right_output) = futures::try_join!(
            self.mediator_query_operation
                .mediate(QueryOperationAction::new(left.clone(), context.clone())),
            self.mediator_query_operation
                .mediate(QueryOperationAction::new(right.clone(), context.clone())),
        )?;
        let entries = vec![
            JoinEntry::new(left_output.into_bindings()?, left),
            JoinEntry::new(right_output.into_bindings()?, right),
        ];
        let joined = self
            .mediator_join
            .mediate(JoinAction::new(JoinType::Inner, entries, context))
            .await?;

        let variables = joined
            .variables()
            .iter()
            .filter(|variable| **variable != joiner)
            .cloned()
            .collect();
        let result = joined.map_stream(variables, move |stream| {
            stream
                .map_ok(move |bindings| bindings.delete(&joiner))
                .boxed()
        })?;
        Ok(result.into())
    }
}
