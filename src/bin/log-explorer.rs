use clap::Parser;
use log_explorer::{Result, cli::LogExplorer};

use std::process;

fn main() {
    // a missing .env is fine, the process environment still applies
    let _ = dotenvy::dotenv();
    if let Err(error) = run() {
        tracing::debug!(?error);
        eprintln!("error: {error:#}");
        process::exit(1)
    } else {
        process::exit(0)
    }
}

fn run() -> Result<()> {
    let app = LogExplorer::parse();
    lumber::init(app.log_level);
    tracing::trace!(command_structure = ?app);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(app.run())
}
