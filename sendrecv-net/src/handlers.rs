use std::sync::Arc;

use gstreamer::prelude::*;
use tracing::{error, info};

use crate::negotiation::OfferNegotiator;
use crate::signals::WebRtcHandlers;

/// The stock handler set: offers on negotiation-needed, and log-only
/// observers for ICE candidates and incoming pads.
///
/// Candidates would normally be sent to the remote peer and new pads linked
/// into a playback branch; there is no signalling channel here, so they are
/// only logged.
pub fn logging_handlers(negotiator: Arc<OfferNegotiator>) -> WebRtcHandlers {
    let mut handlers = WebRtcHandlers::new();
    handlers
        .on_negotiation_needed(move |element| {
            if let Err(err) = negotiator.negotiate(element) {
                error!("Negotiation on [{}] failed: {:#}", element.name(), err);
            }
        })
        .on_ice_candidate(|element, line, candidate| {
            info!(
                "on-ice-candidate called!! [{}] [{}] [{}]",
                element.name(),
                line,
                candidate
            );
        })
        .on_pad_added(|element, pad| {
            info!(
                "PadAdded called!! [{}] [{}] caps {:?}",
                element.name(),
                pad.name(),
                pad.current_caps()
            );
        });
    handlers
}
