use std::error::Error;
use std::fmt::{Display, Formatter};

/// The result of testing or running an actor.
pub type ActorResult<T> = Result<T, ActorError>;

/// An error raised by an actor or by a mediator.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ActorError {
    /// The actor declined the action during its test.
    ///
    /// This is an expected outcome. Mediators that pick a single actor filter these out.
    #[error("Actor {actor} rejected the action: {reason}")]
    Rejected {
        /// The name of the rejecting actor.
        actor: String,
        /// Why the actor rejected the action.
        reason: String,
    },
    /// No actor on the bus accepted the action.
    #[error("No actor on bus {bus} is able to handle the action. Rejections: {rejections}")]
    NoActorFound {
        /// The name of the bus.
        bus: String,
        /// The rejections of all actors on the bus.
        rejections: Rejections,
    },
    /// An error raised while running an actor.
    #[error("{0}")]
    Run(#[source] Box<dyn Error + Send + Sync + 'static>),
}

impl ActorError {
    /// Creates an [ActorError::Rejected].
    pub fn rejected(actor: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rejected {
            actor: actor.into(),
            reason: reason.into(),
        }
    }

    /// Creates an [ActorError::Run] from any error.
    pub fn run(error: impl Into<Box<dyn Error + Send + Sync + 'static>>) -> Self {
        Self::Run(error.into())
    }

    /// Returns whether this error is a rejection of a single actor.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// Returns the cause of an [ActorError::Run] if it is an `E`.
    pub fn downcast_ref<E: Error + 'static>(&self) -> Option<&E> {
        match self {
            Self::Run(error) => error.downcast_ref::<E>(),
            _ => None,
        }
    }
}

/// The collected test failures of a mediation.
#[derive(Debug, Default)]
pub struct Rejections(pub Vec<ActorError>);

impl Rejections {
    /// Returns the number of rejections.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether there are no rejections (i.e., the bus was empty).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for Rejections {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("[")?;
        for (i, rejection) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{rejection}")?;
        }
        f.write_str("]")
    }
}
