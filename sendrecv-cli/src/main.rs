use anyhow::{Context, Result};
use clap::Parser;
use sendrecv_core::{description, SessionConfig};
use sendrecv_net::{
    logging_handlers, Finished, NegotiationOptions, OfferNegotiator, RoundOutcome, RoundReport,
    Runtime, SendRecvSession,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about = "Send/receive audio through a GStreamer webrtcbin", long_about = None)]
struct Args {
    /// JSON session config; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// GStreamer debug level (0-9)
    #[arg(long)]
    debug_level: Option<u8>,

    /// Colour GStreamer debug output
    #[arg(long)]
    debug_color: bool,

    /// audiotestsrc waveform
    #[arg(long)]
    wave: Option<String>,

    /// STUN server, e.g. stun://stun.l.google.com:19302
    #[arg(long)]
    stun_server: Option<String>,

    /// Run the test source in live mode
    #[arg(long)]
    live: bool,

    /// Install each created offer as the local description
    #[arg(long)]
    apply_offer: bool,

    /// Stop after this many seconds instead of waiting for Ctrl+C
    #[arg(long)]
    run_for: Option<u64>,

    /// Print the pipeline description and exit
    #[arg(long)]
    print_description: bool,
}

impl Args {
    fn session_config(&self) -> Result<SessionConfig> {
        let mut config = match &self.config {
            Some(path) => SessionConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => SessionConfig::default(),
        };

        if let Some(level) = self.debug_level {
            config.debug.level = level;
        }
        if self.debug_color {
            config.debug.color = true;
        }
        if let Some(wave) = &self.wave {
            config.pipeline.wave = wave.clone();
        }
        if let Some(stun) = &self.stun_server {
            config.pipeline.stun_server = Some(stun.clone());
        }
        if self.live {
            config.pipeline.is_live = true;
        }
        if self.apply_offer {
            config.negotiation.apply_local_offer = true;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();
    let config = args.session_config()?;
    tracing::debug!(?config, "Session config");

    if args.print_description {
        println!("{}", description::render(&config.pipeline));
        return Ok(());
    }

    println!("Initializing Gst");
    let runtime = Runtime::init(&config.app_name, &config.debug)?;

    let negotiator = Arc::new(OfferNegotiator::spawn(
        NegotiationOptions::from(&config.negotiation),
        Some(Box::new(|report: &RoundReport| match &report.outcome {
            RoundOutcome::Replied { offer_sdp, .. } => println!(
                "Offer round {} on {}: {}",
                report.round,
                report.webrtcbin,
                if offer_sdp.is_some() { "offer ready" } else { "no offer in reply" }
            ),
            other => println!("Offer round {} on {}: {:?}", report.round, report.webrtcbin, other),
        })),
    )?);

    println!("Creating Pipeline");
    let session = SendRecvSession::new(&runtime, &config, logging_handlers(negotiator.clone()))?;
    tracing::info!("Pipeline: {}", session.description());
    println!("Pipeline play!\n");
    session.start()?;

    let shutdown = session.shutdown_handle()?;
    let run_for = args.run_for.map(Duration::from_secs);
    let mut watcher = tokio::task::spawn_blocking(move || {
        let finished = session.wait(run_for);
        (session, finished)
    });

    let (mut session, finished) = tokio::select! {
        joined = &mut watcher => joined?,
        _ = tokio::signal::ctrl_c() => {
            println!("\nCtrl+C received, stopping");
            shutdown.request()?;
            watcher.await?
        }
    };

    session.stop()?;
    println!("Negotiation rounds: {}", negotiator.rounds());

    match finished? {
        Finished::Eos => println!("End of stream"),
        Finished::TimedOut => println!("Run time elapsed"),
        Finished::Shutdown => {}
    }
    Ok(())
}
