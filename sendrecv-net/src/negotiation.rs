//! Offer creation for `on-negotiation-needed`.
//!
//! The signal fires on a GStreamer thread that must not block, so the
//! negotiator only emits `create-offer` there. The promise reply is handed to a
//! dedicated worker thread which waits for it, logs it and optionally installs
//! the offer as the local description.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_sdp as gst_sdp;
use gstreamer_webrtc as gst_webrtc;
use sendrecv_core::deferred::{self, Deferred, Status};
use sendrecv_core::{NegotiationConfig, CREATE_OFFER, SET_LOCAL_DESCRIPTION};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// What a `gst::Promise` change function receives, owned.
pub type PromiseReply = std::result::Result<Option<gst::Structure>, gst::PromiseError>;

#[derive(Debug, Clone, Default)]
pub struct NegotiationOptions {
    /// Emit `set-local-description` with the created offer.
    pub apply_local_offer: bool,
    /// How long the worker waits for a reply. `None` waits forever.
    pub reply_timeout: Option<Duration>,
}

impl From<&NegotiationConfig> for NegotiationOptions {
    fn from(config: &NegotiationConfig) -> Self {
        Self {
            apply_local_offer: config.apply_local_offer,
            reply_timeout: config.reply_timeout(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RoundOutcome {
    Replied {
        reply: gst::Structure,
        offer_sdp: Option<String>,
    },
    /// The promise was answered without a structure.
    Empty,
    Failed(String),
    TimedOut,
}

/// What happened to one create-offer round.
#[derive(Debug, Clone)]
pub struct RoundReport {
    pub round: Uuid,
    pub webrtcbin: String,
    pub outcome: RoundOutcome,
}

pub type ReplyObserver = Box<dyn Fn(&RoundReport) + Send>;

struct OfferJob {
    round: Uuid,
    webrtcbin: gst::Element,
    reply: Deferred<PromiseReply>,
}

pub struct OfferNegotiator {
    jobs: mpsc::Sender<OfferJob>,
    rounds: AtomicUsize,
}

impl OfferNegotiator {
    /// Starts the reply worker. It exits once the negotiator is dropped and
    /// every queued round has settled.
    pub fn spawn(options: NegotiationOptions, observer: Option<ReplyObserver>) -> Result<Self> {
        let (tx, rx) = mpsc::channel::<OfferJob>();

        thread::Builder::new()
            .name("offer-worker".into())
            .spawn(move || {
                debug!("Offer worker started");
                while let Ok(job) = rx.recv() {
                    let report = settle(job.round, &job.webrtcbin, job.reply, &options);
                    if let Some(observer) = &observer {
                        observer(&report);
                    }
                }
                debug!("Offer worker stopped");
            })
            .context("failed to spawn offer worker")?;

        Ok(Self {
            jobs: tx,
            rounds: AtomicUsize::new(0),
        })
    }

    /// Emits `create-offer` on `webrtcbin` and queues the reply for the worker.
    /// Never blocks on the reply.
    pub fn negotiate(&self, webrtcbin: &gst::Element) -> Result<Uuid> {
        let round = Uuid::new_v4();
        self.rounds.fetch_add(1, Ordering::SeqCst);
        info!(%round, "on-negotiation-needed called with element [{}]", webrtcbin.name());

        let (completer, reply) = deferred::channel::<PromiseReply>();
        debug!(%round, "Creating promise");
        let promise = gst::Promise::with_change_func(move |reply| {
            completer.complete(reply.map(|s| s.map(ToOwned::to_owned)));
        });

        info!(%round, "Sending {}", CREATE_OFFER);
        webrtcbin.emit_by_name::<()>(CREATE_OFFER, &[&None::<gst::Structure>, &promise]);

        self.jobs
            .send(OfferJob {
                round,
                webrtcbin: webrtcbin.clone(),
                reply,
            })
            .map_err(|_| anyhow!("offer worker has stopped"))?;

        Ok(round)
    }

    /// Number of rounds started so far.
    pub fn rounds(&self) -> usize {
        self.rounds.load(Ordering::SeqCst)
    }
}

/// Waits for one round's reply, bounded by the reply timeout, and turns it
/// into a report. Runs on the worker thread.
pub fn settle(
    round: Uuid,
    webrtcbin: &gst::Element,
    reply: Deferred<PromiseReply>,
    options: &NegotiationOptions,
) -> RoundReport {
    debug!(%round, "Waiting for {} reply", CREATE_OFFER);
    let waited = match options.reply_timeout {
        Some(timeout) => match reply.wait_timeout(timeout) {
            Ok(Status::Ready(value)) => Ok(value),
            Ok(Status::Pending(_)) => {
                warn!(%round, "No {} reply within {:?}", CREATE_OFFER, timeout);
                return report(round, webrtcbin, RoundOutcome::TimedOut);
            }
            Err(err) => Err(err),
        },
        None => reply.wait(),
    };

    let outcome = match waited {
        Err(err) => RoundOutcome::Failed(err.to_string()),
        Ok(Err(err)) => RoundOutcome::Failed(format!("promise {:?}", err)),
        Ok(Ok(None)) => {
            warn!(%round, "Promise replied without a structure");
            RoundOutcome::Empty
        }
        Ok(Ok(Some(reply))) => {
            info!(%round, "Reply response [{}]", reply);
            if let Ok(err) = reply.get::<gst::glib::Error>("error") {
                RoundOutcome::Failed(err.to_string())
            } else {
                let offer_sdp = offer_sdp(webrtcbin, &reply, options.apply_local_offer);
                RoundOutcome::Replied { reply, offer_sdp }
            }
        }
    };

    if let RoundOutcome::Failed(reason) = &outcome {
        error!(%round, "{} failed: {}", CREATE_OFFER, reason);
    }
    report(round, webrtcbin, outcome)
}

fn offer_sdp(webrtcbin: &gst::Element, reply: &gst::StructureRef, apply: bool) -> Option<String> {
    let offer = match reply.get::<gst_webrtc::WebRTCSessionDescription>("offer") {
        Ok(offer) => offer,
        Err(err) => {
            warn!("Reply carries no offer: {}", err);
            return None;
        }
    };

    let text = sdp_text(&offer.sdp())?;

    if apply {
        webrtcbin.emit_by_name::<()>(SET_LOCAL_DESCRIPTION, &[&offer, &None::<gst::Promise>]);
        info!("Offer installed as local description");
    }

    Some(text)
}

fn sdp_text(sdp: &gst_sdp::SDPMessageRef) -> Option<String> {
    match sdp.as_text() {
        Ok(text) => {
            info!("Offer with {} media section(s):\n{}", sdp.medias_len(), text);
            Some(text)
        }
        Err(err) => {
            warn!("Offer SDP cannot be serialized: {}", err);
            None
        }
    }
}

fn report(round: Uuid, webrtcbin: &gst::Element, outcome: RoundOutcome) -> RoundReport {
    RoundReport {
        round,
        webrtcbin: webrtcbin.name().to_string(),
        outcome,
    }
}
