pub mod config;
pub mod deferred;
pub mod description;
pub mod dispatch;
pub mod error;
pub mod events;

pub use config::{DebugConfig, NegotiationConfig, PipelineConfig, SessionConfig};
pub use deferred::{Completer, Deferred, DeferredError, Status};
pub use dispatch::HandlerTable;
pub use error::{Error, Result};
pub use events::{Event, EventKind, Handler, CREATE_OFFER, SET_LOCAL_DESCRIPTION};
