use crate::actor::ActorRef;
use futures::future::BoxFuture;
use futures::FutureExt;
use sparql_bus_common::ActorResult;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, PoisonError, RwLock};

/// The reply of a single actor to a published action.
///
/// The test outcome is not resolved yet. Resolving (and waiting for) the outcomes is the job of
/// the mediator.
pub struct ActorReply<'action, A, T, O> {
    /// The actor that was tested.
    pub actor: ActorRef<A, T, O>,
    /// The pending test outcome.
    pub reply: BoxFuture<'action, ActorResult<T>>,
}

/// A registry of actors that handle the same kind of action.
///
/// The bus does not decide which actor handles an action. It only publishes the action to all
/// subscribed actors and collects their replies.
pub struct Bus<A, T, O> {
    /// The name of the bus.
    name: String,
    /// The subscribed actors, in registration order.
    actors: RwLock<Vec<ActorRef<A, T, O>>>,
}

impl<A, T, O> Bus<A, T, O>
where
    A: Send + Sync + 'static,
    T: Send + 'static,
    O: Send + 'static,
{
    /// Creates a new empty [Bus].
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actors: RwLock::new(Vec::new()),
        }
    }

    /// Creates a new [Bus] that is already wrapped in an [Arc], as required by mediators.
    pub fn new_shared(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::new(name))
    }

    /// Returns the name of the bus.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Subscribes `actor` to this bus. Actors are published to in registration order.
    pub fn subscribe(&self, actor: ActorRef<A, T, O>) {
        tracing::debug!(bus = %self.name, actor = actor.name(), "Subscribing actor");
        self.actors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(actor);
    }

    /// Unsubscribes all actors with the given `name`. Returns whether an actor was removed.
    pub fn unsubscribe(&self, name: &str) -> bool {
        let mut actors = self.actors.write().unwrap_or_else(PoisonError::into_inner);
        let len = actors.len();
        actors.retain(|actor| actor.name() != name);
        len != actors.len()
    }

    /// Returns the subscribed actors, in registration order.
    pub fn actors(&self) -> Vec<ActorRef<A, T, O>> {
        self.actors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of subscribed actors.
    pub fn len(&self) -> usize {
        self.actors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns whether no actor is subscribed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Publishes `action` to all subscribed actors.
    ///
    /// Returns one [ActorReply] per actor without waiting for any test. The tests are independent
    /// of each other: a failing test does not affect the others.
    pub fn publish<'action>(&self, action: &'action A) -> Vec<ActorReply<'action, A, T, O>> {
        self.actors()
            .into_iter()
            .map(|actor| {
                tracing::trace!(bus = %self.name, actor = actor.name(), "Testing actor");
                let tested = Arc::clone(&actor);
                let reply = async move { tested.test(action).await }.boxed();
                ActorReply { actor, reply }
            })
            .collect()
    }
}

impl<A, T, O> Debug for Bus<A, T, O>
where
    A: Send + Sync + 'static,
    T: Send + 'static,
    O: Send + 'static,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let names = self
            .actors()
            .iter()
            .map(|actor| actor.name().to_owned())
            .collect::<Vec<_>>();
        f.debug_struct("Bus")
            .field("name", &self.name)
            .field("actors", &names)
            .finish()
    }
}
