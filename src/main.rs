use std::env;
use std::process;

use broadside::cli;
use tracing_subscriber::EnvFilter;

fn main() {
    // Logs go to stderr so JSON and CSV on stdout stay machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("broadside=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    process::exit(cli::run_with_args(&args));
}
