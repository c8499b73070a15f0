//! cc-hui - MIDI CC to HUI fader bridge
//!
//! Reads fader CCs from a controller and writes HUI fader touch/move/release
//! messages to the virtual port a DAW listens on.

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cc_hui::config::AppConfig;
use cc_hui::midi::{format_hex, InboundEvent};
use cc_hui::ports::{self, HuiPort, InputListener, EVENT_QUEUE_CAPACITY};
use cc_hui::{Error, TranslationEngine};

/// cc-hui - Write CC fader moves as HUI automation
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Controller input port (substring match), overrides the config file
    #[arg(short, long, env = "CC_HUI_INPUT")]
    input_port: Option<String>,

    /// HUI output port (substring match), overrides the config file
    #[arg(short, long, env = "CC_HUI_OUTPUT")]
    output_port: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// List available MIDI ports
    #[arg(long)]
    list_ports: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_level)?;

    if args.list_ports {
        ports::print_ports().context("Failed to enumerate MIDI ports")?;
        return Ok(());
    }

    info!("Starting cc-hui...");
    info!("Configuration file: {}", args.config);

    let mut config = AppConfig::load_or_default(&args.config).await?;
    config.apply_overrides(args.input_port, args.output_port);
    config.validate().context("Invalid configuration")?;

    let engine = TranslationEngine::new(config.zone_mapper()?, config.inactivity_timeout());

    // Output first so no input is lost before there is somewhere to send it
    let output = HuiPort::connect(&config.midi.output_port)
        .context("Failed to open HUI output port")?;

    let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
    let input = InputListener::connect(&config.midi.input_port, config.channel_filter(), event_tx)
        .context("Failed to open controller input port")?;

    print_summary(&config, &engine, input.port_name(), output.port_name());

    run_bridge(
        engine,
        output,
        event_rx,
        config.tick_interval(),
        shutdown_signal(),
    )
    .await;

    drop(input);
    info!("cc-hui stopped");
    Ok(())
}

/// Main event loop: inbound CCs, inactivity ticks and shutdown.
///
/// The loop owns the engine, so events and ticks never interleave inside a
/// state transition.
async fn run_bridge(
    mut engine: TranslationEngine,
    mut output: HuiPort,
    mut event_rx: mpsc::Receiver<InboundEvent>,
    tick_interval: Duration,
    shutdown: impl std::future::Future<Output = ()>,
) {
    let mut ticker = tokio::time::interval(tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tokio::pin!(shutdown);

    info!("Ready to translate CC to HUI!");

    loop {
        tokio::select! {
            Some(inbound) = event_rx.recv() => {
                debug!("Received: {} | {}", format_hex(&inbound.raw_data), inbound.event);

                match engine.on_cc_event(&inbound.event, inbound.timestamp, &mut output) {
                    Ok(()) => {}
                    Err(e @ Error::OutOfRange { .. }) => {
                        warn!("Dropping malformed event {}: {}", format_hex(&inbound.raw_data), e);
                    }
                    Err(e) => warn!("Failed to forward {}: {}", inbound.event, e),
                }
            }

            _ = ticker.tick() => {
                if let Err(e) = engine.on_clock_tick(Instant::now(), &mut output) {
                    warn!("Failed to send fader release: {}", e);
                }
            }

            _ = &mut shutdown => {
                info!("Shutdown signal received, stopping event loop");
                break;
            }
        }
    }

    // Leave no fader touched, otherwise the DAW keeps writing
    let touched = engine.active_faders();
    if touched > 0 {
        info!("Releasing {} touched fader(s)", touched);
    }
    if let Err(e) = engine.release_all(&mut output) {
        warn!("Failed to release faders on shutdown: {}", e);
    }

    output.close();
}

fn print_summary(config: &AppConfig, engine: &TranslationEngine, input: &str, output: &str) {
    println!("{}", "CC->HUI running".bold().green());
    println!("Input   : {}", input.cyan());
    println!("Output  : {}", output.cyan());
    println!(
        "Timeout : {} ms (tick {} ms)",
        config.faders.inactivity_timeout_ms,
        config.tick_interval().as_millis()
    );
    println!("Mapping :");
    for (cc, zone) in engine.mapper().entries() {
        println!("  CC {:>3} -> fader {}", cc, zone.index() + 1);
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
