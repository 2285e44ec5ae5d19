use async_trait::async_trait;
use sparql_bus_common::ActorResult;
use std::fmt::Debug;
use std::sync::Arc;

/// A reference-counted pointer to an [Actor].
pub type ActorRef<A, T, O> = Arc<dyn Actor<A, T, O>>;

/// A unit that can handle actions of type `A`.
///
/// Handling an action is split into two phases:
/// - [Actor::test] checks whether the actor can handle the action and estimates the cost of doing
///   so. Testing must not have side effects, as every actor on a bus is tested while at most a few
///   are run.
/// - [Actor::run] performs the operation. Errors are propagated to the caller. Actors never retry
///   on their own.
#[async_trait]
pub trait Actor<A, T, O>: Debug + Send + Sync
where
    A: Send + Sync + 'static,
    T: Send + 'static,
    O: Send + 'static,
{
    /// Returns the name of this actor. The name is used for logging and for unsubscribing.
    fn name(&self) -> &str;

    /// Tests whether this actor can handle `action`.
    ///
    /// Returns a cost descriptor on success and an [ActorError::Rejected](crate::ActorError)
    /// if the actor cannot or will not handle the action.
    async fn test(&self, action: &A) -> ActorResult<T>;

    /// Runs this actor on `action`.
    async fn run(&self, action: A) -> ActorResult<O>;
}

/// A test result that estimates the time required to run an actor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MediatorTypeTime {
    /// The estimated time. Lower is better.
    pub time: f64,
}

impl MediatorTypeTime {
    /// Creates a new [MediatorTypeTime].
    pub fn new(time: f64) -> Self {
        Self { time }
    }
}
