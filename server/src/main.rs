use clap::Parser;
use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use server::config::ServerConfig;
use server::generator::PuzzleGenerator;
use server::network::Server;
use shared::{DEFAULT_HEIGHT, DEFAULT_PORT, DEFAULT_WIDTH};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Board width in cells
    #[arg(short, long, default_value_t = DEFAULT_WIDTH)]
    width: usize,

    /// Board height in cells (no short flag to avoid conflict with --help)
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    height: usize,

    /// Number of random obstacles
    #[arg(short, long, default_value = "30")]
    obstacles: usize,

    /// Drop a session after this many idle seconds
    #[arg(short, long, default_value = "300")]
    timeout_secs: u64,

    /// How long a status message stays visible
    #[arg(long, default_value = "5")]
    message_expiry_secs: u64,

    /// Seed for a reproducible board
    #[arg(long)]
    seed: Option<u64>,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        ServerConfig {
            host: args.host,
            port: args.port,
            width: args.width,
            height: args.height,
            obstacles: args.obstacles,
            recv_timeout: Duration::from_secs(args.timeout_secs),
            message_expiry: Duration::from_secs(args.message_expiry_secs),
            seed: args.seed,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let config = ServerConfig::from(Args::parse());

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let state = PuzzleGenerator::from_config(&config).initialize(&mut rng)?;
    state.log_board();

    let server = Server::bind(&config.address(), state, &config).await?;

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                error!("Server stopped: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
