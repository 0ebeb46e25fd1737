/// Audiometer - tone sequencing and calibration runner
use audiometer::{calibrate, run_playlist, AppConfig, RunOptions};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "audiometer")]
#[command(about = "Play audiometry tone sequences on a simulated output", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "AUDIOMETER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play the configured tone playlist once
    Run {
        /// Ear to play on (left/right)
        #[arg(short, long)]
        channel: Option<String>,
        /// Silence between tones in milliseconds
        #[arg(short, long)]
        gap_ms: Option<u64>,
        /// Calibration offset added to every tone volume
        #[arg(short, long, allow_hyphen_values = true)]
        adjust: Option<f64>,
    },
    /// Loop the calibration tone
    Calibrate {
        /// How long to keep the tone looping
        #[arg(short, long, default_value_t = 10)]
        seconds: u64,
        /// Sink volume, overriding the configured one
        #[arg(short, long)]
        volume: Option<f64>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "audiometer=info,audiometer_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    config.validate()?;

    match cli.command {
        Commands::Run {
            channel,
            gap_ms,
            adjust,
        } => {
            let options = RunOptions {
                channel,
                gap_ms,
                volume_adjustment: adjust,
            };
            tokio::select! {
                result = run_playlist(&config, options) => {
                    let events = result?;
                    info!("Run complete, {} events", events.len());
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted");
                }
            }
        }
        Commands::Calibrate { seconds, volume } => {
            tokio::select! {
                result = calibrate(&config, Duration::from_secs(seconds), volume) => {
                    result?;
                    info!("Calibration complete");
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted");
                }
            }
        }
    }

    Ok(())
}
