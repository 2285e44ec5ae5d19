//! Query operation actors that are implemented on top of the query operation and join buses.

mod nop;
mod path_nps;
mod path_seq;

pub use nop::NopActor;
pub use path_nps::PathNpsActor;
pub use path_seq::PathSeqActor;
