use crate::results::QueryResultBindings;
use sparql_bus_common::ActionContext;
use sparql_bus_core::{Action, ActorRef, Bus, MediatorRef};
use sparql_bus_model::GraphPattern;
use std::fmt::{Display, Formatter};

/// The bus on which join actors are registered.
pub type JoinBus = Bus<JoinAction, JoinCoefficients, QueryResultBindings>;
/// A reference to a join actor.
pub type JoinActorRef = ActorRef<JoinAction, JoinCoefficients, QueryResultBindings>;
/// A mediator that selects the join actor for a [JoinAction].
pub type JoinMediator = MediatorRef<JoinAction, QueryResultBindings>;

/// The kind of join that is requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JoinType {
    /// Emits all compatible combinations of solutions.
    Inner,
    /// Emits all compatible combinations and keeps unmatched solutions of the first entry.
    Optional,
    /// Emits the solutions of the first entry that are not compatible with any other solution.
    Minus,
}

impl Display for JoinType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            JoinType::Inner => f.write_str("inner"),
            JoinType::Optional => f.write_str("optional"),
            JoinType::Minus => f.write_str("minus"),
        }
    }
}

/// A single input of a join.
#[derive(Debug)]
pub struct JoinEntry {
    /// The solutions of this input.
    pub output: QueryResultBindings,
    /// The operation that produced `output`.
    pub operation: GraphPattern,
}

impl JoinEntry {
    /// Creates a new [JoinEntry].
    pub fn new(output: QueryResultBindings, operation: GraphPattern) -> Self {
        Self { output, operation }
    }
}

/// Requests joining multiple bindings streams.
#[derive(Debug)]
pub struct JoinAction {
    pub join_type: JoinType,
    pub entries: Vec<JoinEntry>,
    pub context: ActionContext,
}

impl JoinAction {
    /// Creates a new [JoinAction].
    pub fn new(join_type: JoinType, entries: Vec<JoinEntry>, context: ActionContext) -> Self {
        Self {
            join_type,
            entries,
            context,
        }
    }
}

impl Action for JoinAction {
    fn context(&self) -> &ActionContext {
        &self.context
    }
}

/// The cost estimate of a join actor.
///
/// All coefficients are lower-is-better.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct JoinCoefficients {
    /// The number of iterations needed to produce the result.
    pub iterations: f64,
    /// The number of solutions that must be held in memory.
    pub persisted_items: f64,
    /// The number of solutions that must be consumed before the first result is emitted.
    pub blocking_items: f64,
    /// The time spent waiting on remote sources.
    pub request_time: f64,
}
