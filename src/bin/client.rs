//! content-mcp-client: command-line client for a remote content MCP endpoint
//!
//! Sends one JSON-RPC request per invocation over HTTP and prints the
//! decoded response envelope.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use content_mcp::config;
use content_mcp::mcp::client::{ClientError, McpClient};
use content_mcp::mcp::protocol::JsonRpcResponse;

/// Command-line client for a remote content MCP endpoint.
#[derive(Parser, Debug)]
#[command(name = "content-mcp-client")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(long, value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Base URL of the CMS (overrides the configuration file)
    #[arg(long, env = "CONTENT_MCP_URL", value_name = "URL")]
    base_url: Option<String>,

    /// Bearer token for the MCP endpoint
    #[arg(long, env = "CONTENT_MCP_TOKEN", hide_env_values = true)]
    token: String,

    /// Increase logging verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List published pages
    ListPages {
        /// Maximum number of pages to return
        #[arg(long)]
        limit: Option<u64>,
    },
    /// Create a page
    CreatePage {
        title: String,
        slug: String,
        content: String,
    },
    /// List published posts
    ListPosts {
        /// Maximum number of posts to return
        #[arg(long)]
        limit: Option<u64>,
    },
    /// Create a post
    CreatePost {
        title: String,
        slug: String,
        content: String,
    },
    /// List categories
    ListCategories {
        /// Maximum number of categories to return
        #[arg(long)]
        limit: Option<u64>,
    },
    /// Create a category
    CreateCategory {
        title: String,
        /// Slug for the category (derived from the title when omitted)
        #[arg(long)]
        slug: Option<String>,
    },
    /// Send an initialize request
    Initialize,
    /// List the tools offered by the server
    Tools,
    /// Call any tool with raw JSON arguments
    Call {
        /// Tool name
        name: String,
        /// Tool arguments as a JSON object
        #[arg(value_name = "ARGS_JSON", default_value = "{}")]
        arguments: String,
    },
}

/// The request a subcommand sends.
#[derive(Debug, PartialEq)]
enum Request {
    Initialize,
    ListTools,
    CallTool(String, Value),
}

impl Command {
    /// Maps a subcommand to the request it sends.
    fn request(self) -> Result<Request, serde_json::Error> {
        let (name, arguments) = match self {
            Self::ListPages { limit } => ("list_pages".to_string(), limit_arguments(limit)),
            Self::CreatePage {
                title,
                slug,
                content,
            } => (
                "create_page".to_string(),
                json!({ "title": title, "slug": slug, "content": content }),
            ),
            Self::ListPosts { limit } => ("list_posts".to_string(), limit_arguments(limit)),
            Self::CreatePost {
                title,
                slug,
                content,
            } => (
                "create_post".to_string(),
                json!({ "title": title, "slug": slug, "content": content }),
            ),
            Self::ListCategories { limit } => {
                ("list_categories".to_string(), limit_arguments(limit))
            }
            Self::CreateCategory { title, slug } => {
                let mut arguments = json!({ "title": title });
                if let Some(slug) = slug {
                    arguments["slug"] = Value::String(slug);
                }
                ("create_category".to_string(), arguments)
            }
            Self::Initialize => return Ok(Request::Initialize),
            Self::Tools => return Ok(Request::ListTools),
            Self::Call { name, arguments } => (name, serde_json::from_str(&arguments)?),
        };
        Ok(Request::CallTool(name, arguments))
    }
}

fn limit_arguments(limit: Option<u64>) -> Value {
    limit.map_or_else(|| json!({}), |limit| json!({ "limit": limit }))
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn send(client: &McpClient, request: Request) -> Result<JsonRpcResponse, ClientError> {
    match request {
        Request::Initialize => client.initialize().await,
        Request::ListTools => client.list_tools().await,
        Request::CallTool(name, arguments) => client.call_tool(&name, arguments).await,
    }
}

/// Entry point for the content-mcp client.
fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let cfg = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let base_url = args.base_url.unwrap_or(cfg.client.base_url);
    let client = McpClient::new(&base_url, args.token);

    let request = match args.command.request() {
        Ok(request) => request,
        Err(e) => {
            eprintln!("Error: invalid ARGS_JSON: {e}");
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to create Tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let response = match runtime.block_on(send(&client, request)) {
        Ok(response) => response,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&response) {
        Ok(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
