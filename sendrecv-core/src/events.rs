use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Action signal that asks webrtcbin for an SDP offer.
pub const CREATE_OFFER: &str = "create-offer";
/// Action signal that installs a session description as the local one.
pub const SET_LOCAL_DESCRIPTION: &str = "set-local-description";

/// The webrtcbin signals this crate knows how to dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    NegotiationNeeded,
    IceCandidate,
    PadAdded,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [
        EventKind::NegotiationNeeded,
        EventKind::IceCandidate,
        EventKind::PadAdded,
    ];

    /// Signal name as declared by the element.
    pub fn signal_name(self) -> &'static str {
        match self {
            EventKind::NegotiationNeeded => "on-negotiation-needed",
            EventKind::IceCandidate => "on-ice-candidate",
            EventKind::PadAdded => "pad-added",
        }
    }

    /// Argument tuple the signal delivers.
    pub fn signature(self) -> &'static str {
        match self {
            EventKind::NegotiationNeeded => "(element)",
            EventKind::IceCandidate => "(element, u32, string)",
            EventKind::PadAdded => "(element, pad)",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            EventKind::NegotiationNeeded => 1,
            EventKind::IceCandidate => 3,
            EventKind::PadAdded => 2,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.signal_name())
    }
}

impl FromStr for EventKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.signal_name() == s)
            .ok_or_else(|| Error::UnknownEvent(s.to_string()))
    }
}

/// A decoded signal emission. `E` is the element handle, `P` the pad handle.
#[derive(Debug, Clone)]
pub enum Event<E, P> {
    NegotiationNeeded {
        element: E,
    },
    IceCandidate {
        element: E,
        mline_index: u32,
        candidate: String,
    },
    PadAdded {
        element: E,
        pad: P,
    },
}

impl<E, P> Event<E, P> {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::NegotiationNeeded { .. } => EventKind::NegotiationNeeded,
            Event::IceCandidate { .. } => EventKind::IceCandidate,
            Event::PadAdded { .. } => EventKind::PadAdded,
        }
    }

    pub fn element(&self) -> &E {
        match self {
            Event::NegotiationNeeded { element }
            | Event::IceCandidate { element, .. }
            | Event::PadAdded { element, .. } => element,
        }
    }
}

pub type NegotiationFn<E> = dyn Fn(&E) + Send + Sync;
pub type IceCandidateFn<E> = dyn Fn(&E, u32, &str) + Send + Sync;
pub type PadAddedFn<E, P> = dyn Fn(&E, &P) + Send + Sync;

/// A callback tagged with the signal signature it accepts.
pub enum Handler<E, P> {
    NegotiationNeeded(Box<NegotiationFn<E>>),
    IceCandidate(Box<IceCandidateFn<E>>),
    PadAdded(Box<PadAddedFn<E, P>>),
}

impl<E, P> Handler<E, P> {
    pub fn negotiation_needed<F>(f: F) -> Self
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        Handler::NegotiationNeeded(Box::new(f))
    }

    pub fn ice_candidate<F>(f: F) -> Self
    where
        F: Fn(&E, u32, &str) + Send + Sync + 'static,
    {
        Handler::IceCandidate(Box::new(f))
    }

    pub fn pad_added<F>(f: F) -> Self
    where
        F: Fn(&E, &P) + Send + Sync + 'static,
    {
        Handler::PadAdded(Box::new(f))
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Handler::NegotiationNeeded(_) => EventKind::NegotiationNeeded,
            Handler::IceCandidate(_) => EventKind::IceCandidate,
            Handler::PadAdded(_) => EventKind::PadAdded,
        }
    }

    /// Runs the handler if `event` has the matching shape. Returns whether it ran.
    pub fn call(&self, event: &Event<E, P>) -> bool {
        match (self, event) {
            (Handler::NegotiationNeeded(f), Event::NegotiationNeeded { element }) => {
                f(element);
                true
            }
            (
                Handler::IceCandidate(f),
                Event::IceCandidate {
                    element,
                    mline_index,
                    candidate,
                },
            ) => {
                f(element, *mline_index, candidate.as_str());
                true
            }
            (Handler::PadAdded(f), Event::PadAdded { element, pad }) => {
                f(element, pad);
                true
            }
            _ => false,
        }
    }
}

impl<E, P> fmt::Debug for Handler<E, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handler").field(&self.kind()).finish()
    }
}
