use std::sync::Arc;

use anyhow::{bail, Context, Result};
use gstreamer as gst;
use gstreamer::glib;
use gstreamer::prelude::*;
use sendrecv_core::{Event, EventKind, HandlerTable};

pub type WebRtcEvent = Event<gst::Element, gst::Pad>;
pub type WebRtcHandlers = HandlerTable<gst::Element, gst::Pad>;

/// Live connection between a webrtcbin's signals and a handler table.
///
/// Detaches on drop.
pub struct SignalBinding {
    webrtcbin: gst::Element,
    ids: Vec<(EventKind, glib::SignalHandlerId)>,
}

impl SignalBinding {
    /// Connects one signal per kind that has handlers in `handlers`.
    ///
    /// Fails when the element does not declare one of the signals; whatever
    /// was connected before the failure is disconnected again.
    pub fn bind(webrtcbin: &gst::Element, handlers: Arc<WebRtcHandlers>) -> Result<Self> {
        let mut binding = Self {
            webrtcbin: webrtcbin.clone(),
            ids: Vec::new(),
        };

        for kind in handlers.kinds() {
            tracing::info!("Setting {}", kind);
            let id = connect(webrtcbin, kind, handlers.clone()).with_context(|| {
                format!("element '{}' has no {} signal", webrtcbin.name(), kind)
            })?;
            binding.ids.push((kind, id));
        }

        Ok(binding)
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.ids.iter().map(|(kind, _)| *kind).collect()
    }

    pub fn is_attached(&self) -> bool {
        !self.ids.is_empty()
    }

    pub fn detach(&mut self) {
        for (kind, id) in self.ids.drain(..) {
            self.webrtcbin.disconnect(id);
            tracing::debug!("Detached {}", kind);
        }
    }
}

impl Drop for SignalBinding {
    fn drop(&mut self) {
        self.detach();
    }
}

fn connect(
    webrtcbin: &gst::Element,
    kind: EventKind,
    handlers: Arc<WebRtcHandlers>,
) -> Result<glib::SignalHandlerId, glib::BoolError> {
    match kind {
        EventKind::PadAdded => Ok(webrtcbin.connect_pad_added(move |element, pad| {
            handlers.dispatch(&Event::PadAdded {
                element: element.clone(),
                pad: pad.clone(),
            });
        })),
        _ => webrtcbin.try_connect(kind.signal_name(), false, move |values| {
            match decode(kind, values) {
                Ok(event) => {
                    handlers.dispatch(&event);
                }
                Err(err) => tracing::error!("Dropping {} emission: {:#}", kind, err),
            }
            None
        }),
    }
}

/// Turns raw signal arguments into a typed event.
pub fn decode(kind: EventKind, values: &[glib::Value]) -> Result<WebRtcEvent> {
    if values.len() != kind.arity() {
        bail!(
            "{} delivered {} arguments, expected {} {}",
            kind,
            values.len(),
            kind.arity(),
            kind.signature()
        );
    }

    let element = values[0]
        .get::<gst::Element>()
        .with_context(|| format!("{}: argument 0 is not an element", kind))?;

    let event = match kind {
        EventKind::NegotiationNeeded => Event::NegotiationNeeded { element },
        EventKind::IceCandidate => Event::IceCandidate {
            element,
            mline_index: values[1]
                .get::<u32>()
                .with_context(|| format!("{}: argument 1 is not a u32", kind))?,
            candidate: values[2]
                .get::<String>()
                .with_context(|| format!("{}: argument 2 is not a string", kind))?,
        },
        EventKind::PadAdded => Event::PadAdded {
            element,
            pad: values[1]
                .get::<gst::Pad>()
                .with_context(|| format!("{}: argument 1 is not a pad", kind))?,
        },
    };

    Ok(event)
}
