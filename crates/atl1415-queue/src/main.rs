use atl1415_queue::cli::Args;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match atl1415_queue::run(&args) {
        Ok(queue_file) => {
            println!("Wrote commands to {}", queue_file.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            // Written directly so it survives any RUST_LOG filter
            eprintln!("make-1415-queue: {e}");
            ExitCode::from(1)
        }
    }
}
