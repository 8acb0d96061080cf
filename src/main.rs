mod api;
mod cli;
mod config;
mod error;
mod git;
mod guard;
mod mcp;
mod model;
mod sdk;
mod views;

use api::ApiClient;
use sdk::Kaiten;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Diagnostics go to stderr; stdout belongs to command output and the
    // tool server protocol.
    let filter = EnvFilter::try_from_env("KAITEN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() || args[0] == "help" || args[0] == "--help" || args[0] == "-h" {
        cli::print_help();
        return;
    }

    if let Err(err) = run(&args).await {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

async fn run(args: &[String]) -> error::Result<()> {
    let config = config::load_config();
    let api = ApiClient::new(&config)?;
    let kaiten = Kaiten::new(Box::new(api), &config);
    cli::run(&kaiten, args).await
}
