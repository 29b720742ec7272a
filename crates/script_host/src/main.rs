//! Headless cubolt script host.
//!
//! Loads the configured scripts into a simulated world, ticks them at a
//! fixed interval and reads operator input from stdin. See [`console`] for
//! the accepted input.

mod app;
mod cli;
mod config;
mod console;
mod logging;
mod signals;

use app::Application;
use cli::CliArgs;
use tracing::error;

// ============================================================================
// Entry Point
// ============================================================================

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    match Application::new(args).await {
        Ok(app) => {
            if let Err(e) = app.run().await {
                error!("Application error: {:?}", e);
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Failed to start script host: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
