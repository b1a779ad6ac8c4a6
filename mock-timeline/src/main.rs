use clap::Parser;
use mock_timeline::{run, Behavior};
use std::net::SocketAddr;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(about = "Standalone mock of the timeline endpoint")]
struct Cli {
    #[arg(long, default_value = "127.0.0.1:3500")]
    addr: SocketAddr,

    /// Base service time in milliseconds.
    #[arg(long, default_value_t = 25)]
    delay_ms: u64,

    /// Jitter standard deviation in milliseconds.
    #[arg(long, default_value_t = 0)]
    jitter_ms: u64,

    /// Answer every request with a 500.
    #[arg(long)]
    fail: bool,
}

#[tokio::main]
async fn main() {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mock_timeline=debug,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let mut behavior =
        Behavior::delay_ms(cli.delay_ms).with_jitter(Duration::from_millis(cli.jitter_ms));
    behavior.fail = cli.fail;

    run(cli.addr, behavior).await;
}
