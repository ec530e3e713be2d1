use anyhow::{Context, Result};
use gstreamer as gst;
use sendrecv_core::DebugConfig;

/// Proof that GStreamer has been initialised with our debug settings.
///
/// Pipelines are only launched through a `&Runtime`, so nothing can touch the
/// framework before `init` ran.
#[derive(Debug)]
pub struct Runtime {
    app_name: String,
}

impl Runtime {
    pub fn init(app_name: &str, debug: &DebugConfig) -> Result<Self> {
        gst::init().context("failed to initialize GStreamer")?;
        if gst::glib::application_name().is_none() {
            gst::glib::set_application_name(app_name);
        }
        gst::log::set_default_threshold(debug_level(debug.level));
        gst::log::set_colored(debug.color);

        let level = debug.level;
        tracing::info!(
            "GStreamer initialized ({}), debug level {}",
            gst::version_string(),
            level
        );

        Ok(Self {
            app_name: app_name.to_string(),
        })
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Whether an element factory is available in the registry.
    pub fn has_element(&self, factory: &str) -> bool {
        gst::ElementFactory::find(factory).is_some()
    }
}

fn debug_level(level: u8) -> gst::DebugLevel {
    match level {
        0 => gst::DebugLevel::None,
        1 => gst::DebugLevel::Error,
        2 => gst::DebugLevel::Warning,
        3 => gst::DebugLevel::Fixme,
        4 => gst::DebugLevel::Info,
        5 => gst::DebugLevel::Debug,
        6 => gst::DebugLevel::Log,
        7 => gst::DebugLevel::Trace,
        _ => gst::DebugLevel::Memdump,
    }
}
