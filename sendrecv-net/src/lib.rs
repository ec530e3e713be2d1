pub mod handlers;
pub mod negotiation;
pub mod pipeline;
pub mod runtime;
pub mod signals;
pub mod webrtc;

pub use handlers::logging_handlers;
pub use negotiation::{NegotiationOptions, OfferNegotiator, RoundOutcome, RoundReport};
pub use runtime::Runtime;
pub use signals::{SignalBinding, WebRtcEvent, WebRtcHandlers};
pub use webrtc::{Finished, SendRecvSession, ShutdownHandle};
