mod typed;

use crate::results::QueryOutput;
use sparql_bus_common::ActionContext;
use sparql_bus_core::{Action, ActorRef, Bus, MediatorRef, PickBest};
use sparql_bus_model::{GraphPattern, PropertyPathExpression};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
pub use typed::{TypedOperationActor, TypedOperationAdapter};

/// The bus on which query operation actors are registered.
pub type QueryOperationBus = Bus<QueryOperationAction, OperationTest, QueryOutput>;
/// A reference to a query operation actor.
pub type QueryOperationActorRef = ActorRef<QueryOperationAction, OperationTest, QueryOutput>;
/// A mediator that evaluates a [QueryOperationAction].
pub type QueryOperationMediator = MediatorRef<QueryOperationAction, QueryOutput>;

/// Requests the evaluation of a single operation of the query.
#[derive(Clone, Debug)]
pub struct QueryOperationAction {
    pub operation: GraphPattern,
    pub context: ActionContext,
}

impl QueryOperationAction {
    /// Creates a new [QueryOperationAction].
    pub fn new(operation: GraphPattern, context: ActionContext) -> Self {
        Self { operation, context }
    }
}

impl Action for QueryOperationAction {
    fn context(&self) -> &ActionContext {
        &self.context
    }
}

/// The test outcome of a query operation actor.
///
/// Query operation actors only report whether they can evaluate an operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OperationTest;

/// Creates a mediator for `bus` that evaluates every operation with the first capable actor.
pub fn query_operation_mediator(bus: Arc<QueryOperationBus>) -> QueryOperationMediator {
    Arc::new(PickBest::new(bus, |_: &OperationTest, _: &OperationTest| {
        Ordering::Equal
    }))
}

/// The type of an operation, used to route operations to typed actors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationType {
    /// A basic graph pattern without triple patterns.
    Nop,
    /// A basic graph pattern.
    Bgp,
    /// A property path sequence (`p1/p2`).
    PathSeq,
    /// A negated property set (`!(p1|p2)`).
    PathNps,
    /// Any other property path.
    Path,
    /// A join of two operations.
    Join,
    /// Any other operation.
    Other(&'static str),
}

impl OperationType {
    /// Returns the type of `operation`.
    pub fn of(operation: &GraphPattern) -> Self {
        match operation {
            GraphPattern::Bgp { patterns } if patterns.is_empty() => OperationType::Nop,
            GraphPattern::Bgp { .. } => OperationType::Bgp,
            GraphPattern::Path { path, .. } => match path {
                PropertyPathExpression::Sequence(_, _) => OperationType::PathSeq,
                PropertyPathExpression::NegatedPropertySet(_) => OperationType::PathNps,
                _ => OperationType::Path,
            },
            GraphPattern::Join { .. } => OperationType::Join,
            GraphPattern::LeftJoin { .. } => OperationType::Other("left-join"),
            GraphPattern::Filter { .. } => OperationType::Other("filter"),
            GraphPattern::Union { .. } => OperationType::Other("union"),
            GraphPattern::Graph { .. } => OperationType::Other("graph"),
            GraphPattern::Extend { .. } => OperationType::Other("extend"),
            GraphPattern::Minus { .. } => OperationType::Other("minus"),
            GraphPattern::Values { .. } => OperationType::Other("values"),
            GraphPattern::Project { .. } => OperationType::Other("project"),
            GraphPattern::Distinct { .. } => OperationType::Other("distinct"),
            GraphPattern::Slice { .. } => OperationType::Other("slice"),
            _ => OperationType::Other("other"),
        }
    }
}

impl Display for OperationType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationType::Nop => f.write_str("nop"),
            OperationType::Bgp => f.write_str("bgp"),
            OperationType::PathSeq => f.write_str("path-seq"),
            OperationType::PathNps => f.write_str("path-nps"),
            OperationType::Path => f.write_str("path"),
            OperationType::Join => f.write_str("join"),
            OperationType::Other(name) => f.write_str(name),
        }
    }
}
