//! Console host for the messaging plugin.
//!
//! Reads operator lines from stdin, runs them against an in-memory player
//! roster and prints every delivered chat line until stdin closes or a
//! shutdown signal arrives.

mod cli;
mod config;
mod console;
mod logging;
mod signals;

use anyhow::{anyhow, Result};
use cli::CliArgs;
use config::AppConfig;
use console::ConsoleHost;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

/// Main application struct
pub struct Application {
    host: ConsoleHost,
}

impl Application {
    pub async fn new(args: CliArgs) -> Result<Self> {
        // Load configuration first (before logging setup)
        let mut config = AppConfig::load_from_file(&args.config_path).await?;

        if let Some(log_level) = args.log_level {
            config.logging.level = log_level;
        }
        if args.json_logs {
            config.logging.json_format = true;
        }

        config
            .validate()
            .map_err(|e| anyhow!("Configuration validation failed: {e}"))?;

        logging::setup_logging(&config.logging)?;

        info!("🚀 Horizon Messaging Server v{}", env!("CARGO_PKG_VERSION"));
        info!("📂 Config: {}", args.config_path.display());

        let host = ConsoleHost::new(&config, args.config_path)?;
        Ok(Self { host })
    }

    pub async fn run(mut self) -> Result<()> {
        info!("⌨️ Type 'join <name>' to connect a player, or any command as the console");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let shutdown = signals::wait_for_shutdown();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                result = &mut shutdown => {
                    if let Err(e) = result {
                        error!("❌ Signal handling failed: {}", e);
                    }
                    info!("🛑 Shutdown signal received");
                    break;
                }
                line = lines.next_line() => {
                    match line? {
                        Some(line) => {
                            for output in self.host.handle_line(&line).await {
                                println!("{output}");
                            }
                        }
                        None => {
                            info!("📭 Input closed");
                            break;
                        }
                    }
                }
            }
        }

        let stats = self.host.event_stats();
        info!("📊 Final Event System State:");
        info!("  - Handlers registered: {}", stats.total_handlers);
        info!("  - Events emitted: {}", stats.events_emitted);
        info!("  - Chat events: {}", stats.chat_events);
        info!("  - Handler failures: {}", stats.handler_failures);
        info!("✅ Messaging server shutdown complete");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    let app = Application::new(args).await?;
    app.run().await
}
