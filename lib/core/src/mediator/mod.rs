mod combine_pipeline;
mod pick_best;

use async_trait::async_trait;
pub use combine_pipeline::CombinePipeline;
pub use pick_best::{CostComparator, PickBest};
use sparql_bus_common::ActorResult;
use std::fmt::Debug;
use std::sync::Arc;

/// A reference-counted pointer to a [Mediator].
pub type MediatorRef<A, O> = Arc<dyn Mediator<A, O>>;

/// Decides which actors of a bus run for a given action.
///
/// Callers never address actors directly. They hand the action to a mediator, which publishes it
/// on its bus, inspects the test outcomes, and runs the selected actors.
#[async_trait]
pub trait Mediator<A, O>: Debug + Send + Sync
where
    A: Send + 'static,
    O: Send + 'static,
{
    /// Mediates `action` and returns the output of the selected actor(s).
    async fn mediate(&self, action: A) -> ActorResult<O>;
}
