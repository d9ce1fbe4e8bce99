use crate::demo::demo_app;
use crate::logging::{init_logging, LogConfig};
use crate::runtime_config::RuntimeConfig;
use crate::server::HttpServer;
use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "routegate")]
#[command(about = "Regex request router over a gateway-style host", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Development logging: pretty output at debug level with source locations
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the demo application over HTTP
    Serve {
        /// Address to bind (overrides ROUTEGATE_ADDR)
        #[arg(long)]
        addr: Option<String>,

        /// Number of worker threads (overrides ROUTEGATE_WORKERS)
        #[arg(long)]
        workers: Option<usize>,

        /// Default charset for request bodies (overrides ROUTEGATE_CHARSET)
        #[arg(long)]
        charset: Option<String>,
    },
    /// Print the demo route table in match order
    Routes,
}

/// Logging preset for the process: `--pretty` selects the development preset,
/// otherwise the environment decides
fn log_config(pretty: bool) -> LogConfig {
    if pretty {
        LogConfig::default_dev()
    } else {
        LogConfig::from_env()
    }
}

/// Parse arguments and run the selected command
///
/// # Errors
///
/// Returns an error if logging cannot be initialized, the demo routes fail to
/// compile, or the server cannot bind.
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(&log_config(cli.pretty))?;

    let mut config = RuntimeConfig::from_env();
    match cli.command {
        Commands::Serve {
            addr,
            workers,
            charset,
        } => {
            if let Some(addr) = addr {
                config.addr = addr;
            }
            if let Some(workers) = workers {
                config.workers = workers;
            }
            if let Some(charset) = charset {
                config.charset = charset;
            }

            let app = demo_app(config.app_config())?;
            let handle = HttpServer::new(app)
                .workers(config.workers)
                .start(config.addr.as_str())
                .with_context(|| format!("failed to bind {}", config.addr))?;
            info!(addr = %handle.addr(), charset = %config.charset, "routegate serving demo routes");
            handle
                .join()
                .map_err(|e| anyhow::anyhow!("worker thread panicked: {e:?}"))?;
            Ok(())
        }
        Commands::Routes => {
            let app = demo_app(config.app_config())?;
            app.router().dump_routes();
            Ok(())
        }
    }
}
