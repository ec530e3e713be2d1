use anyhow::{Context, Result};
use gstreamer as gst;
use gstreamer::prelude::*;
use sendrecv_core::Error;

use crate::runtime::Runtime;

/// Builds a pipeline from a launch description.
///
/// Nothing is left running on failure: a description whose top level is a
/// lone element is shut down before the error is returned.
pub fn launch(_runtime: &Runtime, description: &str) -> Result<gst::Pipeline> {
    tracing::debug!("Launching: {}", description);

    let element = gst::parse::launch(description)
        .with_context(|| format!("failed to parse pipeline description '{}'", description))?;

    match element.downcast::<gst::Pipeline>() {
        Ok(pipeline) => Ok(pipeline),
        Err(element) => {
            let _ = element.set_state(gst::State::Null);
            Err(Error::NotAPipeline.into())
        }
    }
}

/// Looks up the webrtcbin by name.
pub fn webrtcbin(pipeline: &gst::Pipeline, name: &str) -> Result<gst::Element> {
    let element = pipeline
        .by_name(name)
        .ok_or_else(|| Error::ElementNotFound(name.to_string()))?;

    let factory = element.factory().map(|f| f.name().to_string());
    if factory.as_deref() != Some("webrtcbin") {
        tracing::warn!(
            "Element '{}' is a {:?}, not a webrtcbin; its signals may not match",
            name,
            factory
        );
    }

    Ok(element)
}
