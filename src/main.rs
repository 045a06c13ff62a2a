use clap::Parser;

use trolley::cli::{run, Cli};
use trolley::logging::init_tracing;

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
