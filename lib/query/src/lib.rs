#![doc(test(attr(deny(warnings))))]

//! Query-level buses of SPARQL Bus.
//!
//! This crate defines the streaming [QueryResultBindings] that flow between operators, the query
//! operation bus that evaluates [GraphPattern](sparql_bus_model::GraphPattern)s, and the join bus
//! that combines multiple bindings streams. It also contains a few operators that are implemented
//! entirely in terms of these buses.

pub mod actors;
mod error;
mod join;
mod operation;
mod results;
#[cfg(test)]
mod test_utils;
mod variables;

pub use error::{QueryError, QueryResult};
pub use join::{
    JoinAction, JoinActorRef, JoinBus, JoinCoefficients, JoinEntry, JoinMediator, JoinType,
};
pub use operation::{
    query_operation_mediator, OperationTest, OperationType, QueryOperationAction,
    QueryOperationActorRef, QueryOperationBus, QueryOperationMediator, TypedOperationActor,
    TypedOperationAdapter,
};
pub use results::{BindingsStream, Metadata, QueryOutput, QueryResultBindings};
pub use variables::fresh_variable;
