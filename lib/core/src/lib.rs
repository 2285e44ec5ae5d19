#![doc(test(attr(deny(warnings))))]

//! The extension mechanism of SPARQL Bus.
//!
//! An operation (e.g., joining two streams or fetching a document) is not implemented by a single
//! component. Instead, an [Action] is published on a [Bus] and every [Actor] subscribed to the bus
//! is asked to [test](Actor::test) whether it can handle the action and at which cost. A
//! [Mediator] then decides which actors [run](Actor::run):
//!
//! - [PickBest] runs the single actor with the lowest cost.
//! - [CombinePipeline] runs all actors in sequence, each one consuming the output of its
//!   predecessor.

mod action;
mod actor;
mod bus;
pub mod mediator;

pub use action::Action;
pub use actor::{Actor, ActorRef, MediatorTypeTime};
pub use bus::{ActorReply, Bus};
pub use mediator::{CombinePipeline, CostComparator, Mediator, MediatorRef, PickBest};

// Re-export the common types such that actors only need a single import.
pub use sparql_bus_common::{ActionContext, ActorError, ActorResult, ContextKey, Rejections};
