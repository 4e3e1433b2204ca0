use clap::{Parser, Subcommand};
use client::network::{
    finish_host, host_locally, Client, ClientOptions, Intent, Link, CONNECT_ATTEMPTS, CONNECT_DELAY,
};
use client::services::{name_or_fallback, OfflineFlavor};
use log::info;
use shared::{sanitize_name, GameConfig};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Authority to connect to (create/join)
    #[arg(short = 's', long, default_value = "ws://127.0.0.1:8080")]
    server: String,

    /// Player name; a suggested one is used when omitted
    #[arg(short = 'n', long)]
    name: Option<String>,

    /// Start the match once this many players are in the lobby (hosts only)
    #[arg(long)]
    start_at: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a room on a dedicated server
    Create {
        #[arg(long)]
        room: Option<String>,
    },
    /// Join an existing room
    Join {
        #[arg(long)]
        room: String,
    },
    /// Host a match in this process and accept peers on the given address
    Host {
        #[arg(long, default_value = "0.0.0.0:9000")]
        listen: String,
        #[arg(long, default_value = "16")]
        max_peers: usize,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    let mut flavor = OfflineFlavor::new(rand::thread_rng());
    let name = match args.name.as_deref() {
        Some(name) => sanitize_name(name, "Player"),
        None => name_or_fallback(&mut flavor),
    };
    info!("Playing as {}", name);

    let mut host_loop = None;
    let (link, intent) = match args.command {
        Command::Create { room } => (
            Link::connect(&args.server, CONNECT_ATTEMPTS, CONNECT_DELAY).await?,
            Intent::Create { room_id: room },
        ),
        Command::Join { room } => (
            Link::connect(&args.server, CONNECT_ATTEMPTS, CONNECT_DELAY).await?,
            Intent::Join { room_id: room },
        ),
        Command::Host { listen, max_peers } => {
            let (link, addr, handle) =
                host_locally(&listen, &name, GameConfig::peer_hosted(), max_peers).await?;
            info!("Accepting peers on ws://{}", addr);
            host_loop = Some(handle);
            (link, Intent::Host)
        }
    };

    let options = ClientOptions {
        name,
        intent,
        start_at: args.start_at,
    };
    let mut client = Client::new(link, options, flavor);

    let outcome = client.run().await;
    if let Some(handle) = host_loop {
        finish_host(handle, Duration::from_millis(200)).await?;
    }
    println!("{}", outcome?);

    Ok(())
}
