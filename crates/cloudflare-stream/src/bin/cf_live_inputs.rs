use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cloudflare_stream::{
    CloudflareClient, CreateLiveInputParams, ListLiveInputsParams, LiveInputParams,
    LiveInputSettings, RecordingMode, RecordingSettings, Settings, UpdateLiveInputParams,
};

#[derive(Parser, Debug)]
#[clap(version, about = "Manage Cloudflare Stream live inputs")]
struct Args {
    /// Config file, APP__* environment variables override it
    #[clap(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Account to use instead of cloudflare.account_id from the config
    #[clap(long)]
    account_id: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List live inputs
    List {
        #[clap(long)]
        include_counts: bool,
    },
    /// Create a live input
    Create(InputArgs),
    /// Show a live input
    Get { id: String },
    /// Update a live input
    Update {
        id: String,
        #[clap(flatten)]
        input: InputArgs,
    },
    /// Delete a live input
    Delete { id: String },
    /// List the recordings of a live input
    Videos { id: String },
}

#[derive(clap::Args, Debug)]
struct InputArgs {
    /// Creator assigned to recordings of this input
    #[clap(long)]
    creator: Option<String>,

    #[clap(long)]
    delete_recording_after_days: Option<u32>,

    /// key=value, value is parsed as JSON if possible
    #[clap(long = "meta", value_parser = parse_meta)]
    meta: Vec<(String, Value)>,

    #[clap(long, value_enum)]
    recording_mode: Option<Mode>,

    #[clap(long)]
    require_signed_urls: Option<bool>,

    #[clap(long = "allowed-origin")]
    allowed_origins: Vec<String>,

    /// Seconds to wait for a reconnect before ending the recording
    #[clap(long)]
    recording_timeout: Option<u32>,

    #[clap(long)]
    hide_live_viewer_count: Option<bool>,

    #[clap(long)]
    prefer_low_latency: Option<bool>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Mode {
    Off,
    Automatic,
}

impl From<Mode> for RecordingMode {
    fn from(m: Mode) -> Self {
        match m {
            Mode::Off => RecordingMode::Off,
            Mode::Automatic => RecordingMode::Automatic,
        }
    }
}

fn parse_meta(s: &str) -> Result<(String, Value), String> {
    let Some((k, v)) = s.split_once('=') else {
        return Err(format!("expected key=value, got '{s}'"));
    };
    let v = serde_json::from_str(v).unwrap_or_else(|_| Value::String(v.to_string()));
    Ok((k.to_string(), v))
}

impl InputArgs {
    fn into_settings(self) -> LiveInputSettings {
        let recording = RecordingSettings {
            mode: self.recording_mode.map(Into::into),
            require_signed_urls: self.require_signed_urls,
            allowed_origins: (!self.allowed_origins.is_empty()).then_some(self.allowed_origins),
            timeout_seconds: self.recording_timeout,
            hide_live_viewer_count: self.hide_live_viewer_count,
        };
        LiveInputSettings {
            default_creator: self.creator,
            delete_recording_after_days: self.delete_recording_after_days,
            meta: (!self.meta.is_empty()).then(|| self.meta.into_iter().collect::<HashMap<_, _>>()),
            recording: (recording != RecordingSettings::default()).then_some(recording),
            prefer_low_latency: self.prefer_low_latency,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let settings = Settings::load(&args.config)?;

    let Some(account_id) = args.account_id.or(settings.cloudflare.account_id.clone()) else {
        bail!("No account id, use --account-id or set cloudflare.account_id");
    };

    let shutdown = CancellationToken::new();
    let shutdown_sig = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested!");
            shutdown_sig.cancel();
        }
    });

    let client = CloudflareClient::new(&settings.cloudflare)?.with_cancellation(shutdown);

    let output = match args.command {
        Command::List { include_counts } => serde_json::to_value(
            client
                .list_live_inputs(&ListLiveInputsParams {
                    account_id,
                    include_counts,
                })
                .await?,
        )?,
        Command::Create(input) => serde_json::to_value(
            client
                .create_live_input(&CreateLiveInputParams::new(
                    account_id,
                    input.into_settings(),
                ))
                .await?,
        )?,
        Command::Get { id } => serde_json::to_value(
            client
                .get_live_input(&LiveInputParams::new(account_id, id))
                .await?,
        )?,
        Command::Update { id, input } => serde_json::to_value(
            client
                .update_live_input(&UpdateLiveInputParams::new(
                    account_id,
                    id,
                    input.into_settings(),
                ))
                .await?,
        )?,
        Command::Delete { id } => {
            client
                .delete_live_input(&LiveInputParams::new(account_id, id))
                .await?;
            return Ok(());
        }
        Command::Videos { id } => serde_json::to_value(
            client
                .list_live_input_videos(&LiveInputParams::new(account_id, id))
                .await?,
        )?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
