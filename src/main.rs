use anyhow::{Context, Result};
use asset_capture::ingest::{DirectorySource, FileSource};
use asset_capture::{
    AssetGrid, CaptureDevice, Config, ContentStore, DeviceConfig, DeviceFactory, FileCaptureDevice, IngestionPipeline, MemoryVault,
    RecorderConfig, RecordingController, SessionState,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "asset-capture", about = "Record voice notes and ingest assets into a vault")]
struct Cli {
    /// Configuration file (extension optional)
    #[arg(long, default_value = "config/asset-capture")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record a voice note
    Record {
        /// WAV file to use as the capture device instead of the configured one
        #[arg(long)]
        input: Option<PathBuf>,

        /// How long to record
        #[arg(long, default_value_t = 5)]
        seconds: u64,

        /// Write the finalized clip here
        #[arg(long)]
        out: Option<PathBuf>,

        /// Play the clip back before saving
        #[arg(long)]
        play: bool,
    },
    /// Ingest the files of a directory
    Ingest {
        dir: PathBuf,

        /// Media type prefix to accept (defaults to the configured one)
        #[arg(long)]
        filter: Option<String>,

        /// Print the asset grid as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    info!("Asset Capture v{}", env!("CARGO_PKG_VERSION"));

    let store = ContentStore::new();
    let mut vault = MemoryVault::new(store.clone());

    match cli.command {
        Command::Record {
            input,
            seconds,
            out,
            play,
        } => {
            let device_config = DeviceConfig {
                sample_rate: cfg.capture.sample_rate,
                channels: cfg.capture.channels,
                buffer_duration_ms: cfg.capture.buffer_duration_ms,
            };
            let device: Arc<dyn CaptureDevice> = match input {
                Some(path) => Arc::new(FileCaptureDevice::new(path, device_config)),
                None => DeviceFactory::create(&cfg.capture.device, device_config),
            };

            let mut recorder = RecordingController::new(device, store.clone(), RecorderConfig::from(&cfg));

            let cancel = CancellationToken::new();
            let ctrl_c = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    ctrl_c.cancel();
                }
            });

            if let Err(e) = recorder.start(cancel.clone()).await {
                warn!("Could not start recording: {}", e);
                return Ok(());
            }

            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(seconds)) => {}
                _ = cancel.cancelled() => info!("Interrupted, stopping early"),
            }
            recorder.stop().await?;
            info!("Recorded {}", recorder.elapsed_display());

            if play {
                recorder.play();
                while recorder.state() == SessionState::PlayingBack {
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    info!("Playing {} / {}", recorder.playback_display(), recorder.elapsed_display());
                }
            }

            if let (Some(path), Some(clip)) = (out, recorder.pending_clip()) {
                clip.write_to(&path)
                    .with_context(|| format!("Failed to write clip to {}", path.display()))?;
                info!("Wrote clip to {}", path.display());
            }

            recorder.save(&mut vault)?;
        }
        Command::Ingest { dir, filter, json } => {
            let prefix = filter.unwrap_or_else(|| cfg.ingest.accepted_prefix.clone());
            let mut pipeline = IngestionPipeline::new(prefix, store.clone());

            let files = DirectorySource::new(&dir).files()?;
            let batch = pipeline.pick(files);
            info!(
                "{} accepted, {} skipped from {}",
                batch.accepted.len(),
                batch.rejected_count,
                dir.display()
            );

            pipeline.commit(&mut vault)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&vault.grid())?);
                return Ok(());
            }
        }
    }

    print_grid(&vault.grid());
    Ok(())
}

fn print_grid(grid: &AssetGrid) {
    match grid {
        AssetGrid::Empty => println!("{}", asset_capture::display::EMPTY_MESSAGE),
        AssetGrid::Cards(cards) => {
            for card in cards {
                println!("{:<40} {:>10}  {}", card.title, card.subtitle, card.date);
            }
        }
    }
}
