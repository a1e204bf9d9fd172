// a broken counter should degrade to error responses, not take the process down
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::panic)]

use {
    tracing::Level,
    tracing_subscriber::FmtSubscriber,
    clap::Parser,
    tally_server::{TallyServer, StoreProvider},
};

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    #[arg(long, default_value_t = 8080)]
    port: u16,

    #[arg(long)]
    metrics_port: Option<u16>,
}

#[tokio::main]
async fn main() {
    FmtSubscriber::builder().with_max_level(Level::INFO).init();
    let args = Args::parse();

    let server = TallyServer::new(StoreProvider::from_env());

    if let Some(metrics_port) = args.metrics_port {
        let server = server.clone();
        tokio::spawn(async move { server.run_metrics(metrics_port).await });
    }

    server.run_http(args.port).await;
}
