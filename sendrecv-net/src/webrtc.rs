use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use gstreamer as gst;
use gstreamer::prelude::*;
use sendrecv_core::{description, SessionConfig};

use crate::pipeline;
use crate::runtime::Runtime;
use crate::signals::{SignalBinding, WebRtcHandlers};

const SHUTDOWN_MESSAGE: &str = "sendrecv-shutdown";

/// How [`SendRecvSession::wait`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finished {
    Eos,
    Shutdown,
    TimedOut,
}

/// A webrtcbin pipeline with its signal handlers attached.
pub struct SendRecvSession {
    pipeline: gst::Pipeline,
    webrtcbin: gst::Element,
    binding: SignalBinding,
    description: String,
}

impl SendRecvSession {
    /// Builds the pipeline, finds the webrtcbin and attaches `handlers`.
    /// The pipeline stays in NULL until [`start`](Self::start).
    pub fn new(runtime: &Runtime, config: &SessionConfig, handlers: WebRtcHandlers) -> Result<Self> {
        config.validate()?;

        let description = description::render(&config.pipeline);
        tracing::info!("[{}] Creating Pipeline", runtime.app_name());
        let pipeline = pipeline::launch(runtime, &description)?;

        tracing::info!("Fetching {}", config.pipeline.webrtcbin_name);
        let webrtcbin = match pipeline::webrtcbin(&pipeline, &config.pipeline.webrtcbin_name) {
            Ok(element) => element,
            Err(err) => {
                let _ = pipeline.set_state(gst::State::Null);
                return Err(err);
            }
        };

        let binding = match SignalBinding::bind(&webrtcbin, Arc::new(handlers)) {
            Ok(binding) => binding,
            Err(err) => {
                let _ = pipeline.set_state(gst::State::Null);
                return Err(err);
            }
        };

        Ok(Self {
            pipeline,
            webrtcbin,
            binding,
            description,
        })
    }

    pub fn start(&self) -> Result<()> {
        tracing::info!("Pipeline play!");
        self.pipeline
            .set_state(gst::State::Playing)
            .context("failed to set pipeline to PLAYING")?;
        Ok(())
    }

    /// Detaches the handlers and sets the pipeline to NULL.
    pub fn stop(&mut self) -> Result<()> {
        self.binding.detach();
        self.pipeline
            .set_state(gst::State::Null)
            .context("failed to set pipeline to NULL")?;
        Ok(())
    }

    /// Blocks on the bus until EOS, an error, a shutdown request or `timeout`.
    pub fn wait(&self, timeout: Option<Duration>) -> Result<Finished> {
        let bus = self.pipeline.bus().context("pipeline has no bus")?;
        let timeout = timeout.map(clock_time);

        loop {
            let Some(msg) = bus.timed_pop_filtered(
                timeout,
                &[
                    gst::MessageType::Eos,
                    gst::MessageType::Error,
                    gst::MessageType::Application,
                ],
            ) else {
                return Ok(Finished::TimedOut);
            };

            match msg.view() {
                gst::MessageView::Eos(..) => return Ok(Finished::Eos),
                gst::MessageView::Error(err) => {
                    return Err(anyhow!(
                        "error from {}: {} ({})",
                        msg.src()
                            .map(|s| s.path_string().to_string())
                            .unwrap_or_else(|| "pipeline".to_string()),
                        err.error(),
                        err.debug().map(|d| d.to_string()).unwrap_or_default()
                    ));
                }
                gst::MessageView::Application(..) => {
                    if msg.structure().is_some_and(|s| s.has_name(SHUTDOWN_MESSAGE)) {
                        return Ok(Finished::Shutdown);
                    }
                }
                _ => {}
            }
        }
    }

    pub fn shutdown_handle(&self) -> Result<ShutdownHandle> {
        let bus = self.pipeline.bus().context("pipeline has no bus")?;
        Ok(ShutdownHandle { bus })
    }

    pub fn pipeline(&self) -> &gst::Pipeline {
        &self.pipeline
    }

    pub fn webrtcbin(&self) -> &gst::Element {
        &self.webrtcbin
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_attached(&self) -> bool {
        self.binding.is_attached()
    }
}

impl Drop for SendRecvSession {
    fn drop(&mut self) {
        if let Err(err) = self.stop() {
            tracing::warn!("Stopping session on drop: {:#}", err);
        }
    }
}

/// Converts to a clock time, saturating at the largest representable one.
fn clock_time(duration: Duration) -> gst::ClockTime {
    u64::try_from(duration.as_nanos())
        .ok()
        .filter(|ns| *ns <= gst::ClockTime::MAX.nseconds())
        .map_or(gst::ClockTime::MAX, gst::ClockTime::from_nseconds)
}

/// Wakes a blocked [`SendRecvSession::wait`] from another thread.
#[derive(Clone)]
pub struct ShutdownHandle {
    bus: gst::Bus,
}

impl ShutdownHandle {
    pub fn request(&self) -> Result<()> {
        let msg = gst::message::Application::new(gst::Structure::new_empty(SHUTDOWN_MESSAGE));
        self.bus.post(msg).context("failed to post shutdown message")?;
        Ok(())
    }
}
