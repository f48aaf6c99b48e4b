//! Lens reader daemon
//!
//! Reads tag ids from the reader process, tracks tap sessions, drives the LED
//! indicator and announces every tap on to the remote service.

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lensreader_hardware::{AnyLedSink, LedAnimator};
use lensreader_network::{NotificationClient, identity};
use lensreader_session::{TagLineReader, TapSessionMachine};

mod args;
mod reader;

use crate::args::Args;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_logging(args.log_level())?;

    info!(version = lensreader_core::VERSION, "Starting lens reader");

    let led_config = args.led_config()?;
    let session_config = args.session_config()?;
    let notification_config = args.notification_config()?;

    let identity = identity::detect(
        args.network_interface.as_deref(),
        args.reader_model.clone(),
        args.device_name.clone(),
    );
    info!(
        name = %identity.reader_name,
        ip = %identity.ip_address,
        mac = %identity.mac_address,
        "Reader identity"
    );

    let client = NotificationClient::new(notification_config, identity)
        .context("invalid notification configuration")?;
    info!(endpoint = %client.endpoint(), "Notifications enabled");

    let animator = LedAnimator::new(AnyLedSink::logging(), led_config);
    let mut machine = TapSessionMachine::new(session_config, animator, client);

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    match &args.reader_cmd {
        Some(command) => {
            let (mut child, stdout) = reader::spawn(command, args.reader_dir.as_deref())?;
            let mut source = TagLineReader::new(stdout);
            machine.run(&mut source, shutdown).await;
            reader::stop(&mut child).await;
        }
        None => {
            info!("Reading tags from stdin");
            let mut source = reader::stdin_tags();
            machine.run(&mut source, shutdown).await;
        }
    }

    info!("Lens reader stopped");
    Ok(())
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
        .try_init()
        .context("failed to install log subscriber")?;

    Ok(())
}

/// Cancel `shutdown` on Ctrl+C or SIGTERM.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => info!("Ctrl+C received"),
        () = terminate() => info!("SIGTERM received"),
    }
    shutdown.cancel();
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            warn!(error = %e, "Failed to listen for SIGTERM");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}
