// src/main.rs

use anyhow::Result;
use clap::Parser;
use repo_explorer::cli::Cli;
use repo_explorer::config::ConfigBuilder;
use repo_explorer::errors::Error;
#[cfg(feature = "progress")]
use repo_explorer::progress::IndicatifProgress;
use repo_explorer::progress::ProgressReporter;
use repo_explorer::signal::setup_signal_handler;
use repo_explorer::{run, RepositoryService, RunRequest};
use std::sync::Arc;

fn main() -> Result<()> {
    // Initialize logging. RUST_LOG adds to the crate default.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(
                if cfg!(debug_assertions) {
                    "repo_explorer=debug".parse()?
                } else {
                    "repo_explorer=info".parse()?
                },
            ),
        )
        .init();

    log::info!("Starting repo-explorer v{}...", env!("CARGO_PKG_VERSION"));

    // --- Setup ---
    let cli = Cli::parse();

    // Show a progress bar only if stderr is a TTY.
    let progress_reporter: Option<Arc<dyn ProgressReporter>> = {
        #[cfg(feature = "progress")]
        {
            if atty::is(atty::Stream::Stderr) {
                Some(Arc::new(IndicatifProgress::new()))
            } else {
                None
            }
        }
        #[cfg(not(feature = "progress"))]
        {
            None
        }
    };

    // --- Configuration & Execution ---
    let config = ConfigBuilder::from_cli(&cli).build()?;
    let request = RunRequest::from_cli(&cli);
    let token = setup_signal_handler()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(async {
        let service = RepositoryService::new(config)?;
        run(&service, &request, &token, progress_reporter).await
    });

    // --- Error Handling ---
    if let Err(e) = result {
        match e.downcast_ref::<Error>() {
            Some(Error::Interrupted) => {
                eprintln!("\nOperation cancelled.");
                std::process::exit(130);
            }
            Some(err) => {
                eprintln!("Error: {}", err);
                eprintln!("Hint: {}", err.remedy());
                std::process::exit(1);
            }
            None => {
                eprintln!("Error: {:#}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
