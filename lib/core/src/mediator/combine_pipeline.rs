use crate::bus::Bus;
use crate::mediator::Mediator;
use async_trait::async_trait;
use futures::future::join_all;
use sparql_bus_common::ActorResult;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// A mediator that runs every actor of its bus in sequence.
///
/// Each actor consumes the output of its predecessor, so the bus must map a handle `H` to a new
/// handle of the same type. All actors are tested before any actor runs. If a single test fails,
/// the mediation fails with the error of the first failing actor in registration order and no
/// actor runs. On an empty bus the action is returned unchanged.
pub struct CombinePipeline<H, T> {
    bus: Arc<Bus<H, T, H>>,
}

impl<H, T> CombinePipeline<H, T>
where
    H: Send + Sync + 'static,
    T: Send + 'static,
{
    /// Creates a new [CombinePipeline].
    pub fn new(bus: Arc<Bus<H, T, H>>) -> Self {
        Self { bus }
    }

    /// Returns the bus of this mediator.
    pub fn bus(&self) -> &Arc<Bus<H, T, H>> {
        &self.bus
    }
}

#[async_trait]
impl<H, T> Mediator<H, H> for CombinePipeline<H, T>
where
    H: Send + Sync + 'static,
    T: Send + 'static,
{
    async fn mediate(&self, action: H) -> ActorResult<H> {
        let (actors, replies): (Vec<_>, Vec<_>) = self
            .bus
            .publish(&action)
            .into_iter()
            .map(|reply| (reply.actor, reply.reply))
            .unzip();
        join_all(replies)
            .await
            .into_iter()
            .collect::<ActorResult<Vec<_>>>()?;

        let mut handle = action;
        for actor in actors {
            tracing::trace!(bus = self.bus.name(), actor = actor.name(), "Running pipeline step");
            handle = actor.run(handle).await?;
        }
        Ok(handle)
    }
}

impl<H, T> Debug for CombinePipeline<H, T>
where
    H: Send + Sync + 'static,
    T: Send + 'static,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombinePipeline")
            .field("bus", &self.bus)
            .finish()
    }
}
