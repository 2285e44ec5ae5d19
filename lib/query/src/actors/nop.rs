use crate::operation::{OperationType, TypedOperationActor};
use crate::results::{Metadata, QueryOutput, QueryResultBindings};
use async_trait::async_trait;
use sparql_bus_common::{ActionContext, ActorResult};
use sparql_bus_model::{Bindings, GraphPattern};

/// Evaluates the empty basic graph pattern.
///
/// The result is a single solution that binds no variable.
#[derive(Debug, Default)]
pub struct NopActor;

#[async_trait]
impl TypedOperationActor for NopActor {
    fn name(&self) -> &str {
        "actor-query-operation-nop"
    }

    fn operation_type(&self) -> OperationType {
        OperationType::Nop
    }

    async fn run_operation(
        &self,
        _operation: GraphPattern,
        _context: ActionContext,
    ) -> ActorResult<QueryOutput> {
        Ok(QueryResultBindings::from_bindings(
            vec![Bindings::new()],
            Vec::new(),
            Metadata::new(1, false),
        )
        .into())
    }
}
