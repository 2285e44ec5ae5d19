use crate::operation::{OperationTest, OperationType, QueryOperationAction, QueryOperationActorRef};
use crate::results::QueryOutput;
use async_trait::async_trait;
use sparql_bus_common::{ActionContext, ActorError, ActorResult, KeysQueryOperation};
use sparql_bus_core::Actor;
use sparql_bus_model::GraphPattern;
use std::fmt::Debug;
use std::sync::Arc;

/// A query operation actor that only handles operations of a single [OperationType].
///
/// Wrap implementations in a [TypedOperationAdapter] to subscribe them to a
/// [QueryOperationBus](crate::QueryOperationBus).
#[async_trait]
pub trait TypedOperationActor: Debug + Send + Sync {
    /// Returns the name of the actor.
    fn name(&self) -> &str;

    /// Returns the type of operations this actor handles.
    fn operation_type(&self) -> OperationType;

    /// Tests whether this actor can evaluate `operation`. The operation type is already checked.
    async fn test_operation(
        &self,
        _operation: &GraphPattern,
        _context: &ActionContext,
    ) -> ActorResult<OperationTest> {
        Ok(OperationTest)
    }

    /// Evaluates `operation`. `context` already references `operation` as the current operation.
    async fn run_operation(
        &self,
        operation: GraphPattern,
        context: ActionContext,
    ) -> ActorResult<QueryOutput>;
}

/// Implements [Actor] for a [TypedOperationActor].
#[derive(Debug)]
pub struct TypedOperationAdapter<T> {
    inner: T,
}

impl<T: TypedOperationActor + 'static> TypedOperationAdapter<T> {
    /// Creates a new [TypedOperationAdapter].
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Creates a new adapter that can be subscribed to a bus.
    pub fn shared(inner: T) -> QueryOperationActorRef {
        Arc::new(Self::new(inner))
    }

    /// Returns the wrapped actor.
    pub fn inner(&self) -> &T {
        &self.inner
    }
}

/// Returns `context` with `operation` as the current operation. A previous current operation
/// becomes the parent operation.
fn enter_operation(context: &ActionContext, operation: &GraphPattern) -> ActionContext {
    let context = match context.get(&KeysQueryOperation::OPERATION) {
        Some(parent) => context.set(&KeysQueryOperation::PARENT_OPERATION, parent.clone()),
        None => context.clone(),
    };
    context.set(&KeysQueryOperation::OPERATION, operation.clone())
}

#[async_trait]
impl<T: TypedOperationActor + 'static> Actor<QueryOperationAction, OperationTest, QueryOutput>
    for TypedOperationAdapter<T>
{
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn test(&self, action: &QueryOperationAction) -> ActorResult<OperationTest> {
        let actual = OperationType::of(&action.operation);
        let expected = self.inner.operation_type();
        if actual != expected {
            return Err(ActorError::rejected(
                self.inner.name(),
                format!("Only supports {expected} operations, but got {actual}"),
            ));
        }
        self.inner
            .test_operation(&action.operation, &action.context)
            .await
    }

    async fn run(&self, action: QueryOperationAction) -> ActorResult<QueryOutput> {
        let context = enter_operation(&action.context, &action.operation);
        self.inner.run_operation(action.operation, context).await
    }
}
