use anyhow::{anyhow, Context};
use bms_reader::{ble, plugins, BmsConnection, PollConfig};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::time::{sleep, Duration};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Read status data from BLE battery management systems")]
struct Cli {
    /// JSON file with polling settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List nearby devices and the decoder each one maps to
    Scan,
    /// Connect to a device by name and print a sample every interval
    Poll {
        name: String,
        #[arg(long, default_value_t = 5)]
        interval_secs: u64,
        /// Stop after this many samples
        #[arg(long)]
        count: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => PollConfig::from_path(path)?,
        None => PollConfig::default(),
    };
    let registry = plugins::builtin_registry()?;
    let adapter = ble::default_adapter().await?;

    match cli.command {
        Command::Scan => {
            info!("Scanning for {:?}", config.scan_timeout());
            for found in ble::scan(&adapter, &registry, config.scan_timeout()).await? {
                let decoder = found.decoder.as_ref().map_or("unsupported", |d| d.name());
                println!(
                    "{:<24} rssi {:>4} {}",
                    found.record.display_name(),
                    found.record.rssi().map_or_else(|| "-".to_string(), |r| r.to_string()),
                    decoder
                );
            }
        }
        Command::Poll { name, interval_secs, count } => {
            let device = ble::find_device(&adapter, &name, config.scan_timeout()).await?;
            let decoder = registry
                .select(&(&device).into())?
                .ok_or_else(|| anyhow!("no decoder supports '{name}'"))?;
            let transport = ble::BleTransport::connect(&adapter, device.device, decoder.as_ref())
                .await
                .with_context(|| format!("connecting to '{name}'"))?;
            let connection = BmsConnection::open(decoder, transport, &config).await?;

            let mut polled = 0;
            while count.map_or(true, |c| polled < c) {
                match connection.update().await {
                    Ok(sample) => println!("{}", serde_json::to_string(&sample)?),
                    Err(err) if err.is_recoverable() => warn!(%err, "poll failed"),
                    Err(err) => return Err(err.into()),
                }
                polled += 1;
                sleep(Duration::from_secs(interval_secs)).await;
            }
            connection.disconnect().await?;
        }
    }

    Ok(())
}
