use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_APP_NAME: &str = "SendRecv";
pub const DEFAULT_WEBRTCBIN_NAME: &str = "sendrecv";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub app_name: String,
    pub debug: DebugConfig,
    pub pipeline: PipelineConfig,
    pub negotiation: NegotiationConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            debug: DebugConfig::default(),
            pipeline: PipelineConfig::default(),
            negotiation: NegotiationConfig::default(),
        }
    }
}

/// Framework debug output. `level` follows GStreamer's 0 (none) to 9 (memdump).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub level: u8,
    pub color: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            level: 2,
            color: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub webrtcbin_name: String,
    pub wave: String,
    pub is_live: bool,
    pub payload_type: u8,
    pub stun_server: Option<String>,
    pub bundle_policy: Option<String>,
    /// Used verbatim instead of the rendered description when set.
    pub description: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            webrtcbin_name: DEFAULT_WEBRTCBIN_NAME.to_string(),
            wave: "red-noise".to_string(),
            is_live: false,
            payload_type: 97,
            stun_server: None,
            bundle_policy: None,
            description: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NegotiationConfig {
    pub apply_local_offer: bool,
    pub reply_timeout_ms: Option<u64>,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            apply_local_offer: false,
            reply_timeout_ms: Some(10_000),
        }
    }
}

impl NegotiationConfig {
    pub fn reply_timeout(&self) -> Option<Duration> {
        self.reply_timeout_ms.map(Duration::from_millis)
    }
}

impl SessionConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: SessionConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.app_name.trim().is_empty() {
            return Err(Error::invalid("app_name", "must not be empty"));
        }
        if self.debug.level > 9 {
            return Err(Error::invalid(
                "debug.level",
                format!("{} is outside 0..=9", self.debug.level),
            ));
        }

        let pipeline = &self.pipeline;
        let name = &pipeline.webrtcbin_name;
        if name.is_empty() || name.chars().any(|c| c.is_whitespace() || c == '!' || c == '.') {
            return Err(Error::invalid(
                "pipeline.webrtcbin_name",
                format!("'{}' is not a usable element name", name),
            ));
        }
        if !(96..=127).contains(&pipeline.payload_type) {
            return Err(Error::invalid(
                "pipeline.payload_type",
                format!("{} is not a dynamic payload type (96..=127)", pipeline.payload_type),
            ));
        }
        if pipeline.wave.is_empty() || pipeline.wave.contains(char::is_whitespace) {
            return Err(Error::invalid("pipeline.wave", "must be a single token"));
        }
        if let Some(stun) = &pipeline.stun_server {
            if !is_launch_token(stun) {
                return Err(Error::invalid(
                    "pipeline.stun_server",
                    format!("'{}' must not contain whitespace or '!'", stun),
                ));
            }
            if !stun.starts_with("stun://") {
                return Err(Error::invalid(
                    "pipeline.stun_server",
                    format!("'{}' must start with stun://", stun),
                ));
            }
        }
        if let Some(policy) = &pipeline.bundle_policy {
            if !is_launch_token(policy) {
                return Err(Error::invalid(
                    "pipeline.bundle_policy",
                    format!("'{}' must not contain whitespace or '!'", policy),
                ));
            }
        }
        if let Some(desc) = &pipeline.description {
            if desc.trim().is_empty() {
                return Err(Error::invalid("pipeline.description", "must not be empty"));
            }
        }
        if self.negotiation.reply_timeout_ms == Some(0) {
            return Err(Error::invalid(
                "negotiation.reply_timeout_ms",
                "use null to wait forever",
            ));
        }
        Ok(())
    }
}

/// A property value that cannot splice extra elements into a launch line.
fn is_launch_token(value: &str) -> bool {
    !value.is_empty() && !value.chars().any(|c| c.is_whitespace() || c == '!')
}
