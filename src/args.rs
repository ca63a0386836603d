use clap::Parser;

/// HTTP API serving block rewards and sync committee duties of beacon chain slots.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Address to listen on, overrides SERVER_ADDRESS
    #[arg(short, long)]
    pub server_address: Option<String>,

    /// Upstream requests per second, overrides RPC_RATE_LIMITER_NUMBER
    #[arg(short, long)]
    pub requests_per_second: Option<f64>,
}
