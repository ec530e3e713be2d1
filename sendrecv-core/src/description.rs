use crate::config::PipelineConfig;

/// Renders the textual launch description for the send/receive pipeline.
///
/// Audio test source, Opus encoder and RTP payloader feed the named webrtcbin.
/// A raw description in the config is returned untouched.
pub fn render(config: &PipelineConfig) -> String {
    if let Some(raw) = &config.description {
        return raw.clone();
    }

    let name = &config.webrtcbin_name;
    let mut webrtcbin = format!("webrtcbin name={}", name);
    if let Some(stun) = &config.stun_server {
        webrtcbin.push_str(&format!(" stun-server={}", stun));
    }
    if let Some(policy) = &config.bundle_policy {
        webrtcbin.push_str(&format!(" bundle-policy={}", policy));
    }

    let live = if config.is_live { "is-live=true " } else { "" };

    format!(
        "{webrtcbin} \
         audiotestsrc {live}wave={wave} ! audioconvert ! audioresample ! queue ! opusenc ! rtpopuspay ! \
         queue ! application/x-rtp,media=audio,encoding-name=OPUS,payload={pt} ! {name}.",
        wave = config.wave,
        pt = config.payload_type,
    )
}
