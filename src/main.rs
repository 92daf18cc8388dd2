//! content-mcp: MCP server for AI-assisted CMS content management
//!
//! Serves the content tools over stdio so an AI assistant can list, create,
//! update and delete pages, posts and categories in the content database.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use content_mcp::config;
use content_mcp::mcp::dispatcher::Dispatcher;
use content_mcp::mcp::registry::ToolRegistry;
use content_mcp::mcp::server::McpServer;
use content_mcp::store::SqliteStore;

/// MCP server for AI-assisted CMS content management.
///
/// Exposes pages, posts and categories as MCP tools over stdio.
#[derive(Parser, Debug)]
#[command(name = "content-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Path to the content database (overrides the configuration file)
    #[arg(long, env = "CONTENT_MCP_DATABASE", value_name = "PATH")]
    database: Option<PathBuf>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
///
/// Logs go to stderr; stdout carries protocol traffic only.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Entry point for the content-mcp server.
fn main() -> ExitCode {
    let args = Args::parse();

    // Load configuration
    let config_path = args.config.as_deref();
    let cfg = match config::load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialise logging
    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting content-mcp server"
    );

    let database_path = args.database.unwrap_or_else(|| cfg.database_path.clone());
    let store = match SqliteStore::open(&database_path) {
        Ok(store) => store,
        Err(e) => {
            error!(path = %database_path.display(), error = %e, "Failed to open content database");
            return ExitCode::FAILURE;
        }
    };

    info!(database = %store.path().display(), "Content database opened");

    let dispatcher = Dispatcher::new(ToolRegistry::full(), Arc::new(store), cfg.tool_settings());
    info!(tools = dispatcher.registry().len(), "Tool registry built");

    let mut server = McpServer::stdio(dispatcher);

    info!("MCP server ready, waiting for client connection...");

    // Run the server
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create Tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(server.run()) {
        Ok(()) => {
            info!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}
