pub mod model;
pub mod protocol;

pub use model::{Database, Definition, MatchingStrategy};
pub use protocol::{ConnectionConfig, DictConnection, DictError};
