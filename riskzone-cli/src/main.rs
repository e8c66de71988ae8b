use anyhow::Result;
use clap::{Parser, Subcommand};
use riskzone_core::client::{ClientViewModel, ZoneClient, ZoneViewer};
use riskzone_core::config::Config;
use riskzone_core::logging::{init_logging_with_config, LogConfig};
use riskzone_core::metrics::init_metrics;
use riskzone_core::server::start_server;
use riskzone_core::shutdown::{install_signal_handlers, ShutdownCoordinator};
use riskzone_core::sync::ServerEvent;
use riskzone_core::zones::ZoneCandidate;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

const DEFAULT_URL: &str = "http://127.0.0.1:5000";

#[derive(Parser, Debug)]
#[command(name = "riskzone")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Set the log level (trace, debug, info, warn, error); overrides config
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable JSON formatted logging
    #[arg(long)]
    json_logs: bool,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the zone server
    Serve {
        /// Listen address, overrides server.bind_address
        #[arg(long)]
        bind: Option<SocketAddr>,
    },

    /// Follow a server's zones live
    Watch {
        #[arg(long, default_value = DEFAULT_URL)]
        url: String,
    },

    /// Print the current zone list as JSON
    Snapshot {
        #[arg(long, default_value = DEFAULT_URL)]
        url: String,
    },

    /// Submit a polygon zone
    Submit {
        #[arg(long, default_value = DEFAULT_URL)]
        url: String,

        /// low, medium or high
        #[arg(long)]
        risk: String,

        /// Polygon vertex as lat,lng; repeat for each vertex
        #[arg(long = "point", value_parser = parse_point, required = true, allow_hyphen_values = true)]
        points: Vec<(f64, f64)>,
    },

    /// Clear every zone on the server
    Reset {
        #[arg(long, default_value = DEFAULT_URL)]
        url: String,
    },
}

fn parse_point(s: &str) -> Result<(f64, f64), String> {
    let (lat, lng) = s
        .split_once(',')
        .ok_or_else(|| format!("expected lat,lng but got '{}'", s))?;
    let lat = lat.trim().parse::<f64>().map_err(|e| format!("bad latitude: {}", e))?;
    let lng = lng.trim().parse::<f64>().map_err(|e| format!("bad longitude: {}", e))?;
    Ok((lat, lng))
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => {
            let mut config = Config::from_file(path)?;
            config.apply_env()?;
            config.validate()?;
            config
        }
        None => Config::from_env()?,
    };

    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    if args.json_logs {
        config.logging.json_format = true;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    init_logging_with_config(LogConfig::try_from(&config.logging)?)?;

    match args.command {
        Command::Serve { bind } => serve(config, bind).await,
        Command::Watch { url } => watch(&url).await,
        Command::Snapshot { url } => {
            let zones = ZoneClient::new(&url)?.fetch_snapshot().await?;
            println!("{}", serde_json::to_string_pretty(&zones)?);
            Ok(())
        }
        Command::Submit { url, risk, points } => {
            let zone = ZoneClient::new(&url)?
                .submit(&ZoneCandidate::polygon(&points, risk))
                .await?;
            println!("{}", serde_json::to_string_pretty(&zone)?);
            Ok(())
        }
        Command::Reset { url } => {
            let cleared = ZoneClient::new(&url)?.reset().await?;
            println!("Cleared {} zone(s)", cleared);
            Ok(())
        }
    }
}

async fn serve(mut config: Config, bind: Option<SocketAddr>) -> Result<()> {
    if let Some(bind) = bind {
        config.server.bind_address = bind;
    }

    init_metrics();
    let shutdown = Arc::new(ShutdownCoordinator::new());
    install_signal_handlers(shutdown.clone());

    info!(version = env!("CARGO_PKG_VERSION"), "RiskZone server starting");
    start_server(config, shutdown).await
}

async fn watch(url: &str) -> Result<()> {
    let shutdown = Arc::new(ShutdownCoordinator::new());
    install_signal_handlers(shutdown.clone());

    let mut viewer = ZoneViewer::new(ZoneClient::new(url)?);

    tokio::select! {
        result = viewer.watch(print_event) => result?,
        _ = shutdown.wait_for_shutdown() => info!("Stopped watching"),
    }
    Ok(())
}

fn print_event(view: &ClientViewModel, event: &ServerEvent) {
    match event {
        ServerEvent::HighRiskAlert(alert) => println!("ALERT: {}", alert.message),
        ServerEvent::ZoneRejected(notice) => {
            println!("rejected ({}): {}", notice.reason, notice.message)
        }
        _ => {
            let summary = view.risk_summary();
            println!(
                "{:<16} zones={} low={} medium={} high={}",
                event.name(),
                summary.total(),
                summary.low,
                summary.medium,
                summary.high
            );
        }
    }
}
