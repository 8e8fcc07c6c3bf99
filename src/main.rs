use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use image_classify::config::ClassifyConfig;
use image_classify::config::config::DEFAULT_ENDPOINT;
use image_classify::error::ErrorSeverity;
use image_classify::{
    HasRecoverySuggestion, HasSeverity, HttpClassifier, Settlement, SourceImage,
    SubmissionSession, SubmissionState,
};
use img_scale::presets::DEFAULT_MAX_DIMENSION;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};
use tracing_subscriber::EnvFilter;

/// Downscale an image and ask a remote service to classify it.
#[derive(Parser, Debug)]
#[command(name = "classify")]
#[command(about = "📷 Send a photo to an image classifier and print what it sees")]
#[command(long_about = "Downscale a photo locally, upload it to an image classification service and print the result.
Without an IMAGE argument, reads image paths from stdin: each line submits a new image,
'reset' (or an empty line) clears the result, 'quit' exits.")]
struct Args {
    /// Image to classify (omit for interactive mode)
    #[arg(help = "Image file to classify (JPEG, PNG, GIF, BMP, WebP, ...)")]
    image: Option<PathBuf>,

    /// Classification service base URL
    #[arg(short, long, env = "CLASSIFY_ENDPOINT", default_value = DEFAULT_ENDPOINT,
          help = "Base URL of the classification service")]
    endpoint: String,

    /// Longest edge of the uploaded image
    #[arg(short, long, default_value_t = DEFAULT_MAX_DIMENSION,
          help = "Images larger than this (in pixels, longest edge) are downscaled before upload")]
    max_dimension: u32,

    /// Debug logging
    #[arg(short, long, help = "Log resize and upload details to stderr (overridden by RUST_LOG)")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = ClassifyConfig::new(args.endpoint, args.max_dimension);
    config.validate().map_err(anyhow::Error::msg)?;

    let classifier = HttpClassifier::new(&config.endpoint)?;
    let session = Arc::new(SubmissionSession::new(classifier, config.max_dimension));

    match args.image {
        Some(path) => run_once(&session, path).await,
        None => run_interactive(session).await,
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// Submit one file and print the final panels.
async fn run_once(session: &SubmissionSession<HttpClassifier>, path: PathBuf) -> Result<ExitCode> {
    let source = SourceImage::from_path(&path).await?;
    let ticket = session.begin(source.clone());
    print!("{}", session.panels());

    let settlement = session.run(ticket, source).await;
    print!("{}", session.panels());

    match settlement {
        Settlement::Current(SubmissionState::Succeeded { .. }) => Ok(ExitCode::SUCCESS),
        Settlement::Current(SubmissionState::Failed { error, .. }) => {
            if error.severity() >= ErrorSeverity::Fatal {
                error!(category = error.category(), "{}", error);
            } else {
                warn!(category = error.category(), "{}", error);
            }
            if let Some(hint) = error.recovery_suggestion() {
                eprintln!("hint: {}", hint);
            }
            Ok(ExitCode::FAILURE)
        }
        _ => Ok(ExitCode::FAILURE),
    }
}

/// Read commands from stdin until EOF or `quit`. Each path starts a new
/// submission in the background; the latest one owns the panels.
async fn run_interactive(session: Arc<SubmissionSession<HttpClassifier>>) -> Result<ExitCode> {
    print!("{}", session.panels());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut in_flight: Option<JoinHandle<()>> = None;

    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "quit" | "exit" => break,
            "" | "reset" => {
                session.reset();
                print!("{}", session.panels());
            }
            path => {
                let source = match SourceImage::from_path(path).await {
                    Ok(source) => source,
                    Err(e) => {
                        eprintln!("{}", e);
                        continue;
                    }
                };
                let ticket = session.begin(source.clone());
                print!("{}", session.panels());

                let session = Arc::clone(&session);
                in_flight = Some(tokio::spawn(async move {
                    match session.run(ticket, source).await {
                        Settlement::Current(_) => print!("{}", session.panels()),
                        Settlement::Superseded => {
                            debug!(generation = ticket.generation(), "submission superseded")
                        }
                    }
                }));
            }
        }
    }

    wait_for_last(in_flight).await?;
    Ok(ExitCode::SUCCESS)
}

/// Let the latest submission settle and print before exiting.
async fn wait_for_last(in_flight: Option<JoinHandle<()>>) -> Result<()> {
    if let Some(handle) = in_flight {
        handle.await?;
    }
    Ok(())
}
