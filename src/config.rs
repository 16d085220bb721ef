//! Console configuration
//!
//! Configuration is layered: built-in defaults, an optional TOML file,
//! `TIDES_*` environment variables, then command-line flags. The resulting
//! [`ConsoleConfig`] is fixed for the life of the clients built from it.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::errors::Error;

/// Default agent (coordinator) base URL
pub const DEFAULT_AGENT_URL: &str = "https://tides-agent-102.mpazbot.workers.dev";
/// Default MCP JSON-RPC endpoint
pub const DEFAULT_MCP_URL: &str = "https://tides-006.mpazbot.workers.dev/mcp";
/// Tide used when the caller supplies none
pub const DEFAULT_TIDE_ID: &str = "daily-tide-default";
/// User id sent with free-text chat requests
pub const DEFAULT_USER_ID: &str = "demo_user";
/// Default request timeout in seconds
const DEFAULT_REQUEST_TIMEOUT: u64 = 30;

/// How service calls are routed to agent endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointPolicy {
    /// Every service goes to `/coordinator`
    #[default]
    Coordinator,
    /// Deprecated: `chat` goes to `/chat`, everything else to `/coordinator`.
    /// Kept only to test agents that predate coordinator routing.
    Legacy,
}

impl EndpointPolicy {
    /// Endpoint suffix for the given service name
    pub fn endpoint_for(&self, service: &str) -> &'static str {
        match (self, service) {
            (EndpointPolicy::Legacy, "chat") => "/chat",
            _ => "/coordinator",
        }
    }
}

/// Configuration shared by the service and tool clients
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Base URL of the agent service
    pub agent_url: String,
    /// Full URL of the MCP JSON-RPC endpoint
    pub mcp_url: String,
    /// API key used for both backends (may be empty)
    pub api_key: String,
    /// Tide id used when none is given per call
    pub tide_id: String,
    /// User id sent with free-text chat
    pub user_id: String,
    /// Timeout applied to every request
    pub request_timeout: Duration,
    /// Service endpoint routing
    pub endpoint_policy: EndpointPolicy,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            agent_url: DEFAULT_AGENT_URL.to_string(),
            mcp_url: DEFAULT_MCP_URL.to_string(),
            api_key: String::new(),
            tide_id: DEFAULT_TIDE_ID.to_string(),
            user_id: DEFAULT_USER_ID.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT),
            endpoint_policy: EndpointPolicy::default(),
        }
    }
}

/// On-disk form of the configuration; every field is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    agent_url: Option<String>,
    mcp_url: Option<String>,
    api_key: Option<String>,
    tide_id: Option<String>,
    user_id: Option<String>,
    timeout_secs: Option<u64>,
    endpoint_policy: Option<EndpointPolicy>,
}

impl ConsoleConfig {
    /// Create a configuration builder starting from the defaults
    pub fn builder() -> ConsoleConfigBuilder {
        ConsoleConfigBuilder::new()
    }

    /// Load defaults overlaid with the contents of a TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Load defaults overlaid with TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, Error> {
        let file: ConfigFile = toml
            ::from_str(text)
            .map_err(|e| Error::Config(format!("invalid config file: {}", e)))?;

        let mut config = Self::default();
        if let Some(v) = file.agent_url {
            config.agent_url = v;
        }
        if let Some(v) = file.mcp_url {
            config.mcp_url = v;
        }
        if let Some(v) = file.api_key {
            config.api_key = v;
        }
        if let Some(v) = file.tide_id {
            config.tide_id = v;
        }
        if let Some(v) = file.user_id {
            config.user_id = v;
        }
        if let Some(secs) = file.timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(policy) = file.endpoint_policy {
            config.endpoint_policy = policy;
        }
        config.validate()?;
        Ok(config)
    }

    /// Override fields from `TIDES_*` environment variables
    pub fn apply_env(self) -> Result<Self, Error> {
        self.apply_vars(|name| std::env::var(name).ok())
    }

    /// Override fields using an arbitrary variable lookup
    pub fn apply_vars<F>(mut self, lookup: F) -> Result<Self, Error>
        where F: Fn(&str) -> Option<String>
    {
        if let Some(v) = lookup("TIDES_AGENT_URL") {
            self.agent_url = v;
        }
        if let Some(v) = lookup("TIDES_MCP_URL") {
            self.mcp_url = v;
        }
        if let Some(v) = lookup("TIDES_API_KEY") {
            self.api_key = v;
        }
        if let Some(v) = lookup("TIDES_TIDE_ID") {
            self.tide_id = v;
        }
        if let Some(v) = lookup("TIDES_USER_ID") {
            self.user_id = v;
        }
        if let Some(v) = lookup("TIDES_TIMEOUT_SECS") {
            let secs: u64 = v
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("TIDES_TIMEOUT_SECS is not a number: {}", v)))?;
            self.request_timeout = Duration::from_secs(secs);
        }
        self.validate()?;
        Ok(self)
    }

    /// Check that both URLs parse, a fallback tide is set and the timeout is non-zero
    pub fn validate(&self) -> Result<(), Error> {
        Url::parse(&self.agent_url)?;
        Url::parse(&self.mcp_url)?;
        if self.tide_id.trim().is_empty() {
            return Err(Error::Config("tide id must not be empty".to_string()));
        }
        if self.request_timeout.is_zero() {
            return Err(Error::Config("request timeout must be greater than zero".to_string()));
        }
        Ok(())
    }
}

/// Builder for creating ConsoleConfig instances with custom settings
#[derive(Debug, Clone, Default)]
pub struct ConsoleConfigBuilder {
    config: ConsoleConfig,
}

impl ConsoleConfigBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration
    pub fn from_config(config: ConsoleConfig) -> Self {
        Self { config }
    }

    /// Set the agent base URL
    pub fn with_agent_url(mut self, url: impl Into<String>) -> Self {
        self.config.agent_url = url.into();
        self
    }

    /// Set the MCP endpoint URL
    pub fn with_mcp_url(mut self, url: impl Into<String>) -> Self {
        self.config.mcp_url = url.into();
        self
    }

    /// Set the API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.api_key = api_key.into();
        self
    }

    /// Set the default tide id
    pub fn with_tide_id(mut self, tide_id: impl Into<String>) -> Self {
        self.config.tide_id = tide_id.into();
        self
    }

    /// Set the user id for chat requests
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.config.user_id = user_id.into();
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Set the endpoint routing policy
    pub fn with_endpoint_policy(mut self, policy: EndpointPolicy) -> Self {
        self.config.endpoint_policy = policy;
        self
    }

    /// Validate and build the configuration
    pub fn build(self) -> Result<ConsoleConfig, Error> {
        self.config.validate()?;
        Ok(self.config)
    }
}
