mod hash_join;
mod stream;
mod weights;

pub use hash_join::HashJoinActor;
pub use stream::HashJoinStream;
pub use weights::{join_mediator, JoinCostWeights};
