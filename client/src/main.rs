use clap::Parser;
use client::network::Client;
use log::info;
use shared::{FrameLayout, DEFAULT_HEIGHT, DEFAULT_PORT, DEFAULT_WIDTH};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value_t = format!("127.0.0.1:{}", DEFAULT_PORT))]
    server: String,

    /// Board width the server was started with
    #[arg(short = 'w', long, default_value_t = DEFAULT_WIDTH)]
    width: usize,

    /// Board height the server was started with (no short flag to avoid conflict with --help)
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    height: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();
    let layout = FrameLayout::new(args.width, args.height)?;

    info!("Connecting to: {}", args.server);
    info!("Controls: W/A/S/D or arrows to move, Q to quit");

    let client = Client::connect(&args.server, layout).await?;
    client.run().await?;

    Ok(())
}
