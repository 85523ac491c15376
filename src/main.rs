#![deny(clippy::all)]

mod clipboard;
mod error;
mod export;
mod host;
mod locator;
mod presenter;
mod session;
mod transcript_service;

use crate::error::AppError;
use crate::session::{ActivationOutcome, ControllerSettings, CopyOutcome, TranscriptController};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Environment variable overriding the transcript service base URL
const SERVICE_URL_ENV: &str = "VIDSCRIPT_SERVICE_URL";

/// Fetch the transcript of the YouTube video on a page
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Page URL: a YouTube watch/shorts/youtu.be link or a page embedding a player
    url: String,

    /// Switch to this transcript language once the default one is loaded
    #[arg(short, long)]
    lang: Option<String>,

    /// Copy title and transcript to the clipboard
    #[arg(short, long)]
    copy: bool,

    /// Save title and transcript as markdown (default: Documents/vidscript/transcripts)
    #[arg(short, long, num_args = 0..=1, value_name = "DIR")]
    export: Option<Option<PathBuf>>,

    /// Keep reading language selections and commands from stdin
    #[arg(short, long)]
    interactive: bool,
}

/// Application configuration
#[derive(Debug, serde::Deserialize)]
struct Config {
    service: ServiceConfig,
    probe: ProbeConfig,
    ui: UiConfig,
}

#[derive(Debug, serde::Deserialize)]
struct ServiceConfig {
    base_url: String,
    endpoint: String,
    request_timeout_secs: u64,
    connect_timeout_secs: u64,
}

#[derive(Debug, serde::Deserialize)]
struct ProbeConfig {
    timeout_secs: u64,
}

#[derive(Debug, serde::Deserialize)]
struct UiConfig {
    copy_ack_millis: u64,
}

impl Config {
    fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            fetch_timeout: Duration::from_secs(self.service.request_timeout_secs),
            probe_timeout: Duration::from_secs(self.probe.timeout_secs),
            copy_ack_delay: Duration::from_millis(self.ui.copy_ack_millis),
        }
    }
}

/// Load configuration from embedded config.toml
fn load_config() -> Result<Config, AppError> {
    const CONFIG_TOML: &str = include_str!("../config.toml");
    let mut config = parse_config(CONFIG_TOML)?;

    if let Ok(url) = std::env::var(SERVICE_URL_ENV) {
        info!("Using transcript service from {}: {}", SERVICE_URL_ENV, url);
        config.service.base_url = url;
    }
    Ok(config)
}

fn parse_config(contents: &str) -> Result<Config, AppError> {
    let config: Config = toml::from_str(contents).map_err(|e| AppError::Config(e.to_string()))?;

    if config.service.request_timeout_secs == 0 || config.probe.timeout_secs == 0 {
        return Err(AppError::Config("timeouts must be greater than zero".into()));
    }
    Ok(config)
}

/// A line typed in interactive mode
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Select(String),
    Copy,
    Save,
    Quit,
}

/// Numbers pick from the rendered selector, anything else is a language code.
fn parse_command(input: &str, codes: &[String]) -> Option<Command> {
    match input {
        "" => None,
        "q" | "quit" => Some(Command::Quit),
        "c" | "copy" => Some(Command::Copy),
        "s" | "save" => Some(Command::Save),
        _ => match input.parse::<usize>() {
            Ok(index) => codes.get(index).cloned().map(Command::Select),
            Err(_) => Some(Command::Select(input.to_string())),
        },
    }
}

async fn copy(controller: &TranscriptController) {
    match controller.copy_transcript().await {
        CopyOutcome::Copied => {}
        CopyOutcome::Disabled => println!("No transcript to copy."),
        CopyOutcome::ClipboardFailed => warn!("Transcript was not copied"),
    }
}

fn export(controller: &TranscriptController, dir: Option<&std::path::Path>) {
    match controller.export_transcript(dir) {
        Ok(path) => println!("Saved transcript to {}", path.display()),
        Err(e) => println!("Could not save transcript: {}", e),
    }
}

async fn run_interactive<R: AsyncBufRead + Unpin>(
    controller: &TranscriptController,
    export_dir: Option<PathBuf>,
    input: R,
) -> anyhow::Result<()> {
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await? {
        let codes: Vec<String> = controller
            .snapshot()
            .language_choices()
            .into_iter()
            .map(|choice| choice.code)
            .collect();

        match parse_command(line.trim(), &codes) {
            Some(Command::Quit) => break,
            Some(Command::Copy) => copy(controller).await,
            Some(Command::Save) => export(controller, export_dir.as_deref()),
            Some(Command::Select(code)) => {
                // Not awaited: a newer selection may overtake this one
                let controller = controller.clone();
                tokio::spawn(async move { controller.on_language_selected(&code).await });
            }
            None => {}
        }
    }
    Ok(())
}

/// Read commands unless activation found no video, then let the presenter
/// print everything emitted so far before returning.
async fn interactive_session<R: AsyncBufRead + Unpin>(
    controller: &TranscriptController,
    outcome: ActivationOutcome,
    export_dir: Option<PathBuf>,
    input: R,
    event_handler: presenter::EventHandler,
) -> anyhow::Result<()> {
    let result = match outcome {
        ActivationOutcome::NoVideo => Ok(()),
        ActivationOutcome::Fetched(_) => run_interactive(controller, export_dir, input).await,
    };
    event_handler.finish().await;
    result
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout carries only the transcript
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config()?;

    let service = transcript_service::TranscriptApiClient::new(
        &config.service.base_url,
        &config.service.endpoint,
        Duration::from_secs(config.service.connect_timeout_secs),
    )?;
    info!("Transcript service: {}", service.endpoint_url());

    let clipboard = Arc::new(clipboard::SystemClipboard::new());
    let controller = TranscriptController::new(
        Arc::new(service),
        clipboard.clone(),
        config.controller_settings(),
    );
    let host = host::WebPageHost::new(args.url, Duration::from_secs(config.probe.timeout_secs))?;

    let event_handler = args.interactive.then(|| {
        presenter::spawn_event_handler(
            controller.subscribe(),
            controller.clone(),
            true,
            std::io::stdout(),
        )
    });

    let outcome = controller.activate(&host).await;
    if outcome != ActivationOutcome::NoVideo {
        if let Some(lang) = args.lang.as_deref() {
            controller.on_language_selected(lang).await;
        }
        if args.copy {
            copy(&controller).await;
        }
        if let Some(dir) = args.export.as_ref() {
            export(&controller, dir.as_deref());
        }
    }

    match event_handler {
        Some(event_handler) => {
            let stdin = BufReader::new(tokio::io::stdin());
            let export_dir = args.export.flatten();
            interactive_session(&controller, outcome, export_dir, stdin, event_handler).await?;
        }
        None => println!("{}", presenter::render(&controller.snapshot(), false)),
    }

    clipboard.hold_until_replaced().await;
    Ok(())
}
