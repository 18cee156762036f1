use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::Parser;
use console_core::{
    ConsoleEvent, ConsoleSession, HttpCommandChannel, SessionOptions, SharedCalibrationPanel,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::{self, error::RecvError},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod shell;

use config::load_settings;
use shell::{format_ranges, Reply, Shell};

/// Operator console for the boat/rover controller. Reads one command per line
/// from stdin; try `help`.
#[derive(Parser, Debug)]
struct Args {
    /// TOML settings file (defaults to ./console.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    controller_url: Option<String>,
    /// Treat the host as having no position fix source.
    #[arg(long)]
    no_geolocation: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(url) = args.controller_url {
        settings.controller_url = url;
    }
    if args.no_geolocation {
        settings.geolocation_available = false;
    }

    let channel = HttpCommandChannel::new(
        &settings.controller_url,
        &settings.endpoint,
        settings.request_timeout(),
    )?;
    info!(endpoint = %channel.endpoint(), "console ready");

    let panel = Arc::new(SharedCalibrationPanel::default());
    let session = ConsoleSession::new(
        Arc::new(channel),
        panel.clone(),
        SessionOptions {
            geolocation_available: settings.geolocation_available,
        },
    );
    let renderer = tokio::spawn(render_events(session.subscribe_events()));
    let mut shell = Shell::new(session, panel);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match shell.execute_line(&line).await {
            Reply::Quiet => {}
            Reply::Note(note) => println!("{note}"),
            Reply::Quit => break,
        }
    }

    drop(shell);
    let _ = renderer.await;
    Ok(())
}

async fn render_events(mut events: broadcast::Receiver<ConsoleEvent>) {
    loop {
        match events.recv().await {
            Ok(ConsoleEvent::Response { action, text }) => println!("[{action}] {text}"),
            Ok(ConsoleEvent::CameraModeChanged { code, label }) => {
                println!("camera mode: {label} ({code})")
            }
            Ok(ConsoleEvent::CalibrationUpdated(ranges)) => {
                println!("calibration: {}", format_ranges(&ranges))
            }
            Ok(ConsoleEvent::Error(message)) => eprintln!("error: {message}"),
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "status display fell behind"),
            Err(RecvError::Closed) => break,
        }
    }
}
