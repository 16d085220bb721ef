//! CLI argument parsing using clap.

use clap::{ Parser, Subcommand };
use serde_json::{ Map, Value };
use std::path::PathBuf;

/// Manual testing console for the Tides agent service and MCP tool server.
///
/// Without a subcommand the interactive console starts.
#[derive(Parser, Debug)]
#[command(name = "tides-console", version, about, long_about = None)]
pub struct Args {
    /// TOML configuration file
    #[arg(long, short = 'c', value_name = "FILE", env = "TIDES_CONFIG")]
    pub config: Option<PathBuf>,

    /// Agent base URL
    #[arg(long, value_name = "URL")]
    pub agent_url: Option<String>,

    /// MCP JSON-RPC endpoint URL
    #[arg(long, value_name = "URL")]
    pub mcp_url: Option<String>,

    /// API key for both backends
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Tide id used when a command does not name one
    #[arg(long, value_name = "ID", global = true)]
    pub tide: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Route `chat` to the deprecated /chat endpoint instead of /coordinator
    #[arg(long)]
    pub legacy_endpoints: bool,

    /// Log requests and responses to stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the MCP tools
    Tools,
    /// Run one MCP tool
    Tool {
        /// Tool name, e.g. tide_list
        name: String,

        /// Arguments as a JSON object; overrides the form flags
        #[arg(long, value_name = "JSON", value_parser = parse_json_object)]
        args: Option<Map<String, Value>>,

        /// tide_list filter: All, Active or Completed
        #[arg(long)]
        filter: Option<String>,

        /// Title for create tools
        #[arg(long)]
        title: Option<String>,

        /// Description for create tools
        #[arg(long)]
        description: Option<String>,

        /// Energy level for energy tools
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=10))]
        energy: Option<u8>,
    },
    /// List the agent services
    Services,
    /// Call one agent service
    Service {
        /// Service name, e.g. insights
        name: String,

        /// Service parameter as key=value; repeatable
        #[arg(long = "param", short = 'p', value_name = "KEY=VALUE", value_parser = parse_key_value)]
        params: Vec<(String, String)>,

        /// Print the full response body
        #[arg(long)]
        raw: bool,
    },
    /// Send free text to the agent and let it route the request
    Chat {
        /// Message text
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,

        /// Print the full response body
        #[arg(long)]
        raw: bool,
    },
    /// Check that the agent answers
    Ping,
    /// Run the quick test suite
    Suite,
    /// Start the interactive console
    Console,
}

/// Parse a `key=value` pair
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s.split_once('=').ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Parse a JSON object argument
pub fn parse_json_object(s: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(s) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("expected a JSON object".to_string()),
        Err(e) => Err(format!("invalid JSON: {}", e)),
    }
}
