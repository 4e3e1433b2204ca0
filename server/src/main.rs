use clap::Parser;
use log::info;
use server::config::{load_config, Overrides};
use server::{DedicatedServer, Server, TransportEvent};
use std::path::PathBuf;

/// Main-method of the dedicated authority.
/// Parses command-line arguments, loads the game config and runs the event loop
/// until Ctrl+C.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Command line arguments
    #[derive(Parser, Debug)]
    #[clap(author, version, about)]
    struct Args {
        /// Server IP address to bind to
        #[clap(short = 'H', long, default_value = "127.0.0.1")]
        host: String,
        /// Server port to listen on
        #[clap(short, long, default_value = "8080")]
        port: u16,
        /// Tick rate (updates per second); overrides the config file
        #[clap(short, long)]
        tick_rate: Option<u32>,
        /// Maximum number of simultaneous connections
        #[clap(short, long, default_value = "64")]
        max_clients: usize,
        /// JSON file with game tuning overrides
        #[clap(short, long)]
        config: Option<PathBuf>,
        /// Seed for food and spawn placement
        #[clap(long)]
        seed: Option<u64>,
    }

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Tip: Set RUST_LOG=info for detailed logs");
    }
    env_logger::init();

    let args = Args::parse();

    let config = load_config(
        args.config.as_deref(),
        Overrides {
            tick_rate: args.tick_rate,
            seed: args.seed,
        },
    )?;
    let tick_duration = config.tick_duration();
    info!(
        "Map {}x{}, {} food, {} Hz",
        config.map_size, config.map_size, config.food_target, config.tick_rate
    );

    let address = format!("{}:{}", args.host, args.port);
    let server = Server::bind(
        &address,
        DedicatedServer::new(config, args.max_clients),
        tick_duration,
    )
    .await?;

    let events = server.events();
    let server_handle = tokio::spawn(server.run());

    tokio::select! {
        result = server_handle => {
            result??;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully...");
            let _ = events.send(TransportEvent::Shutdown);
        }
    }

    Ok(())
}
