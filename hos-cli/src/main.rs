//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use hos_cli::CliError;
use tracing_subscriber::EnvFilter;

fn main() {
    // `init` also forwards `log` records from the library crates.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = hos_cli::run() {
        if let CliError::ArgumentParsing(clap_err) = &err {
            clap_err.exit();
        }
        eprintln!("hos: {err}");
        std::process::exit(1);
    }
}
