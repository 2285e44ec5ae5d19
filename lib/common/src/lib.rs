mod context;
pub mod error;
mod keys;

pub use context::{ActionContext, ContextKey};
pub use error::{ActorError, ActorResult, Rejections};
pub use keys::{KeysHttp, KeysQueryOperation};
