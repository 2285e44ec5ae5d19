use crate::actor::{ActorRef, MediatorTypeTime};
use crate::bus::Bus;
use crate::mediator::Mediator;
use async_trait::async_trait;
use futures::future::join_all;
use sparql_bus_common::{ActorError, ActorResult, Rejections};
use std::cmp::Ordering;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Orders two test outcomes. [Ordering::Less] means that the first outcome is cheaper.
pub type CostComparator<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// A mediator that runs the single actor with the lowest cost.
///
/// All actors are tested concurrently. Rejections are collected and only reported if no actor
/// passed its test. If multiple actors report the same cost, the one that subscribed first wins.
pub struct PickBest<A, T, O> {
    bus: Arc<Bus<A, T, O>>,
    comparator: CostComparator<T>,
}

impl<A, T, O> PickBest<A, T, O>
where
    A: Send + Sync + 'static,
    T: Send + 'static,
    O: Send + 'static,
{
    /// Creates a new [PickBest] that orders the test outcomes using `comparator`.
    pub fn new(
        bus: Arc<Bus<A, T, O>>,
        comparator: impl Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    ) -> Self {
        Self {
            bus,
            comparator: Arc::new(comparator),
        }
    }

    /// Creates a new [PickBest] that minimizes a single scalar extracted from the test outcome.
    pub fn by_scalar(
        bus: Arc<Bus<A, T, O>>,
        cost: impl Fn(&T) -> f64 + Send + Sync + 'static,
    ) -> Self {
        Self::new(bus, move |lhs, rhs| cost(lhs).total_cmp(&cost(rhs)))
    }

    /// Creates a new [PickBest] that compares the extracted cost vectors lexicographically.
    ///
    /// The first component is the most significant one. Later components only break ties.
    pub fn lexicographic(
        bus: Arc<Bus<A, T, O>>,
        costs: impl Fn(&T) -> Vec<f64> + Send + Sync + 'static,
    ) -> Self {
        Self::new(bus, move |lhs, rhs| {
            let lhs = costs(lhs);
            let rhs = costs(rhs);
            lhs.iter()
                .zip(rhs.iter())
                .map(|(lhs, rhs)| lhs.total_cmp(rhs))
                .find(|ordering| ordering.is_ne())
                .unwrap_or_else(|| lhs.len().cmp(&rhs.len()))
        })
    }

    /// Returns the bus of this mediator.
    pub fn bus(&self) -> &Arc<Bus<A, T, O>> {
        &self.bus
    }

    /// Selects the actor that handles `action` without running it.
    ///
    /// Returns [ActorError::NoActorFound] with all collected rejections if no actor passed its
    /// test. This includes the case of an empty bus.
    pub async fn mediate_actor(&self, action: &A) -> ActorResult<ActorRef<A, T, O>> {
        let (actors, replies): (Vec<_>, Vec<_>) = self
            .bus
            .publish(action)
            .into_iter()
            .map(|reply| (reply.actor, reply.reply))
            .unzip();
        let outcomes = join_all(replies).await;

        let mut best: Option<(ActorRef<A, T, O>, T)> = None;
        let mut rejections = Vec::new();
        for (actor, outcome) in actors.into_iter().zip(outcomes) {
            match outcome {
                Ok(cost) => {
                    let is_better = best
                        .as_ref()
                        .map_or(true, |(_, best)| (self.comparator)(&cost, best).is_lt());
                    if is_better {
                        best = Some((actor, cost));
                    }
                }
                Err(error) => {
                    tracing::trace!(
                        bus = self.bus.name(),
                        actor = actor.name(),
                        %error,
                        "Actor rejected action"
                    );
                    rejections.push(error);
                }
            }
        }

        match best {
            Some((actor, _)) => {
                tracing::debug!(bus = self.bus.name(), actor = actor.name(), "Picked actor");
                Ok(actor)
            }
            None => {
                let rejections = Rejections(rejections);
                tracing::debug!(bus = self.bus.name(), %rejections, "No actor could handle action");
                Err(ActorError::NoActorFound {
                    bus: self.bus.name().to_owned(),
                    rejections,
                })
            }
        }
    }
}

impl<A, O> PickBest<A, MediatorTypeTime, O>
where
    A: Send + Sync + 'static,
    O: Send + 'static,
{
    /// Creates a new [PickBest] that picks the actor with the lowest estimated time.
    pub fn by_time(bus: Arc<Bus<A, MediatorTypeTime, O>>) -> Self {
        Self::by_scalar(bus, |cost| cost.time)
    }
}

#[async_trait]
impl<A, T, O> Mediator<A, O> for PickBest<A, T, O>
where
    A: Send + Sync + 'static,
    T: Send + 'static,
    O: Send + 'static,
{
    async fn mediate(&self, action: A) -> ActorResult<O> {
        let actor = self.mediate_actor(&action).await?;
        actor.run(action).await
    }
}

impl<A, T, O> Debug for PickBest<A, T, O>
where
    A: Send + Sync + 'static,
    T: Send + 'static,
    O: Send + 'static,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PickBest").field("bus", &self.bus).finish()
    }
}
