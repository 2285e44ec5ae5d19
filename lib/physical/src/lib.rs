#![doc(test(attr(deny(warnings))))]

//! Physical operators of SPARQL Bus.
//!
//! Currently, this crate provides the join actors that can be subscribed to a
//! [JoinBus](sparql_bus_query::JoinBus).

pub mod join;

pub use join::{join_mediator, HashJoinActor, HashJoinStream, JoinCostWeights};
