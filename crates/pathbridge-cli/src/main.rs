//! pathbridge stdio server
//!
//! Reads JSON requests from stdin and writes one JSON response per line to
//! stdout until stdin is closed.
//!
//! Usage:
//!   pathbridge                       Serve with defaults
//!   pathbridge --workdir /srv        Serve from another working directory
//!   pathbridge --reject-unknown      Answer unknown operations with an error

use std::io;
use std::path::PathBuf;

use clap::Parser;
use pathbridge::{DispatchOptions, Dispatcher, UnknownOperation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// pathbridge - host path and filesystem primitives over JSON stdio
#[derive(Parser, Debug)]
#[command(name = "pathbridge")]
#[command(about = "Serve path and filesystem primitives as JSON over stdio")]
struct Args {
    /// Change to this directory before serving
    #[arg(long)]
    workdir: Option<PathBuf>,

    /// Answer unknown operations with an error response instead of exiting
    #[arg(long)]
    reject_unknown: bool,

    /// Default log level; per-target RUST_LOG directives still apply
    #[arg(long, default_value = "warn")]
    log_level: tracing::Level,
}

fn run(args: Args) -> anyhow::Result<()> {
    if let Some(dir) = &args.workdir {
        std::env::set_current_dir(dir)
            .map_err(|e| anyhow::anyhow!("cannot change to {}: {}", dir.display(), e))?;
    }

    let options = DispatchOptions {
        unknown_operation: if args.reject_unknown {
            UnknownOperation::Reject
        } else {
            UnknownOperation::Fatal
        },
    };
    tracing::info!(?options, "Starting pathbridge");

    let dispatcher = Dispatcher::new(options);

    let stats = dispatcher.serve(io::stdin().lock(), io::stdout().lock())?;

    tracing::info!(
        requests = stats.requests,
        responses = stats.responses,
        "Input closed, shutting down"
    );
    Ok(())
}

fn main() {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the protocol.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(args.log_level.into()))
        .init();

    if let Err(e) = run(args) {
        eprintln!("pathbridge: {}", e);
        std::process::exit(1);
    }
}
