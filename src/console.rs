//! Interactive console
//!
//! The presentation layer. It owns the two clients and the [`Session`], turns
//! commands into client calls one at a time, and renders the outcomes as
//! text. The four areas of the original tabbed tool map onto command groups:
//! tools, services, chat and status.

use serde_json::{ Map, Value };
use std::time::Instant;
use tokio::io::{ AsyncBufReadExt, AsyncWriteExt, BufReader };

use crate::client::services::{ catalog as service_catalog, tools as tool_catalog };
use crate::client::{ ServiceClient, ServiceParams, ServiceResponse, ToolClient, ToolResult, summarize };
use crate::config::ConsoleConfig;
use crate::errors::Error;
use crate::session::{ MonitoringSnapshot, Role, Session };
use crate::suite::{ quick_suite, run_suite };
use crate::utils::auth::mask_key;
use crate::utils::json::to_pretty_string;

/// Text produced by a command and whether it succeeded
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    /// Output to print
    pub text: String,
    /// False when the underlying call failed
    pub ok: bool,
}

impl Rendered {
    fn ok(text: impl Into<String>) -> Self {
        Self { text: text.into(), ok: true }
    }

    fn failed(text: impl Into<String>) -> Self {
        Self { text: text.into(), ok: false }
    }
}

/// A command typed into the interactive console
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    /// Free text for the agent
    Chat(String),
    /// `/service <name> [key=value ...]`
    Service {
        name: String,
        params: ServiceParams,
    },
    /// `/tool <name> [json-object]`
    Tool {
        name: String,
        arguments: Map<String, Value>,
    },
    /// `/tools`
    ListTools,
    /// `/services`
    ListServices,
    /// `/suite`
    Suite,
    /// `/ping`
    Ping,
    /// `/tide <id>`
    SetTide(String),
    /// `/status`
    Status,
    /// `/clear`
    Clear,
    /// `/help`
    Help,
    /// `/quit`
    Quit,
    /// Blank line
    Empty,
}

const HELP: &str = "\
Commands:
  <text>                      chat with the agent
  /service <name> [k=v ...]   call one service
  /services                   list services
  /tool <name> [json]         run an MCP tool
  /tools                      list MCP tools
  /suite                      run the quick test suite
  /ping                       test the agent connection
  /tide <id>                  switch the current tide
  /status                     session monitoring
  /clear                      clear chat history and test results
  /quit                       exit";

/// Parse one input line
pub fn parse_line(line: &str) -> Result<ConsoleCommand, Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ConsoleCommand::Empty);
    }
    let Some(command) = line.strip_prefix('/') else {
        return Ok(ConsoleCommand::Chat(line.to_string()));
    };

    let (verb, rest) = command.split_once(char::is_whitespace).unwrap_or((command, ""));
    let rest = rest.trim();

    match verb {
        "service" | "s" => {
            let (name, pairs) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            if name.is_empty() {
                return Err(Error::Validation("usage: /service <name> [key=value ...]".into()));
            }
            Ok(ConsoleCommand::Service { name: name.to_string(), params: parse_params(pairs)? })
        }
        "tool" | "t" => {
            let (name, json) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            if name.is_empty() {
                return Err(Error::Validation("usage: /tool <name> [json-object]".into()));
            }
            let arguments = if json.trim().is_empty() {
                Map::new()
            } else {
                match serde_json::from_str::<Value>(json)? {
                    Value::Object(map) => map,
                    _ => {
                        return Err(Error::Validation("tool arguments must be a JSON object".into()));
                    }
                }
            };
            Ok(ConsoleCommand::Tool { name: name.to_string(), arguments })
        }
        "tools" => Ok(ConsoleCommand::ListTools),
        "services" => Ok(ConsoleCommand::ListServices),
        "suite" => Ok(ConsoleCommand::Suite),
        "ping" => Ok(ConsoleCommand::Ping),
        "tide" => {
            if rest.is_empty() {
                return Err(Error::Validation("usage: /tide <id>".into()));
            }
            Ok(ConsoleCommand::SetTide(rest.to_string()))
        }
        "status" => Ok(ConsoleCommand::Status),
        "clear" => Ok(ConsoleCommand::Clear),
        "help" | "?" => Ok(ConsoleCommand::Help),
        "quit" | "exit" | "q" => Ok(ConsoleCommand::Quit),
        other => Err(Error::Validation(format!("unknown command '/{}', try /help", other))),
    }
}

/// Parse `key=value` pairs where a value runs until the next `word=` token,
/// so `question=How can I focus? timeframe=7d` yields two parameters.
fn parse_params(text: &str) -> Result<ServiceParams, Error> {
    let mut pairs: Vec<(String, Vec<&str>)> = Vec::new();
    for word in text.split_whitespace() {
        match word.split_once('=') {
            Some((key, value)) if is_param_key(key) => {
                pairs.push((key.to_string(), vec![value]));
            }
            _ =>
                match pairs.last_mut() {
                    Some((_, words)) => words.push(word),
                    None => {
                        return Err(Error::Validation(format!("expected key=value, got '{}'", word)));
                    }
                }
        }
    }

    Ok(
        pairs
            .into_iter()
            .map(|(key, words)| (key, Value::String(words.join(" "))))
            .collect()
    )
}

fn is_param_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// The console: configuration, clients and session
pub struct Console {
    /// Active configuration
    config: ConsoleConfig,
    /// Agent client
    services: ServiceClient,
    /// MCP client
    tools: ToolClient,
    /// Session state
    session: Session,
    /// Tide used by service and chat commands
    tide_id: String,
}

impl Console {
    /// Build the clients and an empty session
    pub fn new(config: ConsoleConfig) -> Result<Self, Error> {
        Ok(Self {
            services: ServiceClient::new(&config)?,
            tools: ToolClient::new(&config)?,
            session: Session::new(config.user_id.clone()),
            tide_id: config.tide_id.clone(),
            config,
        })
    }

    /// Session state
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Tide currently used by service and chat commands
    pub fn tide_id(&self) -> &str {
        &self.tide_id
    }

    /// List the MCP tools
    pub fn list_tools(&self) -> Rendered {
        let lines: Vec<String> = tool_catalog
            ::catalog()
            .iter()
            .map(|tool| format!("  {:<24} {}", tool.name, tool.description))
            .collect();
        Rendered::ok(format!("MCP tools ({}):\n{}", self.tools.endpoint(), lines.join("\n")))
    }

    /// List the agent services
    pub fn list_services(&self) -> Rendered {
        let lines: Vec<String> = service_catalog
            ::catalog()
            .iter()
            .map(|info| {
                let params = if info.params.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", info.params.join(", "))
                };
                format!("  {:<12} {}{}", info.service.as_str(), info.description, params)
            })
            .collect();
        Rendered::ok(format!("Agent services ({}):\n{}", self.services.base_url(), lines.join("\n")))
    }

    /// Run one MCP tool
    pub async fn run_tool(&mut self, name: &str, arguments: Map<String, Value>) -> Rendered {
        let started = Instant::now();
        let result = self.tools.call(name, arguments, &self.config.api_key).await;
        self.session.record_call(result.is_success(), started.elapsed());

        match result {
            ToolResult::Success { payload: Value::Null } => {
                Rendered::ok(format!("{} executed successfully; no data returned", name))
            }
            ToolResult::Success { payload } => {
                let body = to_pretty_string(&payload).unwrap_or_else(|_| payload.to_string());
                Rendered::ok(format!("{} executed successfully\n{}", name, body))
            }
            ToolResult::Failure { message } => {
                Rendered::failed(format!("Error executing {}:\n{}", name, message))
            }
        }
    }

    /// Call one service against the current tide
    pub async fn run_service(&mut self, name: &str, params: ServiceParams, raw: bool) -> Rendered {
        let started = Instant::now();
        let response = self.services.invoke(name, &self.config.api_key, &self.tide_id, params.clone()).await;
        let elapsed = started.elapsed();

        let mut text = format!(
            "{} [{}] {}ms\n{}",
            name,
            status_label(&response),
            elapsed.as_millis(),
            summarize(&response)
        );
        if let Some(metadata) = response.metadata() {
            text.push_str(&format!("\nmetadata: {}", metadata));
        }
        if raw {
            let body = to_pretty_string(&response.to_json()).unwrap_or_default();
            text.push_str(&format!("\n{}", body));
        }

        let ok = response.is_success();
        self.session.record_test(name, params, &self.tide_id, response, elapsed);
        Rendered { text, ok }
    }

    /// Send free text to the agent
    pub async fn run_chat(&mut self, message: &str, raw: bool) -> Rendered {
        self.session.push_user(message);
        let started = Instant::now();
        let response = self.services.chat(
            message,
            &self.config.api_key,
            &self.tide_id,
            Some(self.session.user_id())
        ).await;
        let reply = self.session.push_assistant(&response, started.elapsed());

        let service = response.routed_service().unwrap_or("unknown");
        let mut text = format!(
            "{}\n[{} | {}ms | service: {}]",
            reply.content,
            status_label(&response),
            reply.processing_time_ms.unwrap_or_default(),
            service
        );
        if raw {
            let body = to_pretty_string(&response.to_json()).unwrap_or_default();
            text.push_str(&format!("\n{}", body));
        }
        Rendered { text, ok: response.is_success() }
    }

    /// Test the agent connection
    pub async fn run_ping(&mut self) -> Rendered {
        let started = Instant::now();
        let response = self.services.test_connection(&self.config.api_key).await;
        self.session.record_call(response.is_success(), started.elapsed());
        if response.is_success() {
            Rendered::ok("Connection successful!")
        } else {
            Rendered::failed(format!("Connection failed: {}", summarize(&response)))
        }
    }

    /// Run the quick test suite and report every step
    pub async fn run_suite(&mut self) -> Rendered {
        let steps = quick_suite();
        let mut lines = Vec::new();
        let outcomes = run_suite(
            &self.services,
            &steps,
            &self.config.api_key,
            &self.tide_id,
            |index, total, outcome| {
                let mark = if outcome.passed() { "OK" } else { "FAILED" };
                lines.push(
                    format!(
                        "[{}/{}] {} {} ({}ms)",
                        index + 1,
                        total,
                        outcome.service,
                        mark,
                        outcome.elapsed.as_millis()
                    )
                );
                lines.push(outcome.digest.clone());
            }
        ).await;

        for outcome in &outcomes {
            self.session.record_call(outcome.passed(), outcome.elapsed);
        }
        let passed = outcomes.iter().filter(|o| o.passed()).count();
        lines.push(format!("Quick test suite completed: {}/{} passed", passed, outcomes.len()));
        Rendered { text: lines.join("\n"), ok: passed == outcomes.len() }
    }

    /// Render the monitoring view
    pub fn status(&self) -> Rendered {
        Rendered::ok(render_monitoring(&self.session.monitoring(), &self.config, &self.tide_id))
    }

    /// Execute one parsed command. Returns `None` when the console should exit.
    pub async fn execute(&mut self, command: ConsoleCommand) -> Option<Rendered> {
        let rendered = match command {
            ConsoleCommand::Chat(message) => self.run_chat(&message, false).await,
            ConsoleCommand::Service { name, params } => self.run_service(&name, params, false).await,
            ConsoleCommand::Tool { name, arguments } => self.run_tool(&name, arguments).await,
            ConsoleCommand::ListTools => self.list_tools(),
            ConsoleCommand::ListServices => self.list_services(),
            ConsoleCommand::Suite => self.run_suite().await,
            ConsoleCommand::Ping => self.run_ping().await,
            ConsoleCommand::SetTide(tide) => {
                self.tide_id = tide;
                Rendered::ok(format!("Tide set to {}", self.tide_id))
            }
            ConsoleCommand::Status => self.status(),
            ConsoleCommand::Clear => {
                self.session.clear_messages();
                self.session.clear_results();
                Rendered::ok("Cleared chat history and test results")
            }
            ConsoleCommand::Help => Rendered::ok(HELP),
            ConsoleCommand::Empty => Rendered::ok(""),
            ConsoleCommand::Quit => {
                return None;
            }
        };
        Some(rendered)
    }

    /// Read commands from stdin until EOF or `/quit`
    pub async fn interactive(&mut self) -> Result<(), Error> {
        let mut stdout = tokio::io::stdout();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        stdout.write_all(self.banner().as_bytes()).await?;
        loop {
            stdout.write_all(b"tides> ").await?;
            stdout.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let rendered = match parse_line(&line) {
                Ok(command) =>
                    match self.execute(command).await {
                        Some(rendered) => rendered,
                        None => {
                            break;
                        }
                    }
                Err(e) => Rendered::failed(e.to_string()),
            };
            if !rendered.text.is_empty() {
                stdout.write_all(format!("{}\n", rendered.text).as_bytes()).await?;
            }
        }
        Ok(())
    }

    fn banner(&self) -> String {
        let key = if self.config.api_key.is_empty() {
            "not set".to_string()
        } else {
            mask_key(&self.config.api_key)
        };
        format!(
            "Tides Console\n  agent: {}\n  mcp:   {}\n  key:   {}\n  tide:  {}\nType /help for commands.\n",
            self.config.agent_url,
            self.config.mcp_url,
            key,
            self.tide_id
        )
    }
}

fn status_label(response: &ServiceResponse) -> &'static str {
    if response.is_success() { "success" } else { "failed" }
}

/// Render a monitoring snapshot as text
pub fn render_monitoring(snapshot: &MonitoringSnapshot, config: &ConsoleConfig, tide_id: &str) -> String {
    let mut lines = vec![
        format!("Session {}", snapshot.session_id),
        format!("  user:     {}", snapshot.user_id),
        format!("  tide:     {}", tide_id),
        format!("  agent:    {}", config.agent_url),
        format!("  mcp:      {}", config.mcp_url),
        format!("  api key:  {}", if config.api_key.is_empty() { "not set" } else { "set" }),
        format!("  messages: {}", snapshot.message_count)
    ];

    lines.push(format!("Calls: {} ({} succeeded)", snapshot.total_calls, snapshot.successful_calls));
    if let (Some(rate), Some(avg)) = (snapshot.success_rate, snapshot.average_response_ms) {
        lines.push(format!("  success rate: {:.1}%  avg response: {:.0}ms", rate, avg));
    }

    match &snapshot.last_test {
        Some(test) =>
            lines.push(
                format!(
                    "Last API test: {} {} {}ms at {}",
                    test.service,
                    if test.succeeded { "success" } else { "failed" },
                    test.processing_time_ms,
                    test.timestamp.format("%Y-%m-%d %H:%M:%S")
                )
            ),
        None => lines.push("Last API test: none".to_string()),
    }

    if snapshot.recent_activity.is_empty() {
        lines.push("No activity yet.".to_string());
    } else {
        lines.push("Recent activity:".to_string());
        for entry in &snapshot.recent_activity {
            let who = match entry.role {
                Role::User => "User",
                Role::Assistant => "Agent",
            };
            lines.push(format!("  [{}] {}: {}", entry.timestamp.format("%H:%M:%S"), who, entry.preview));
        }
    }

    lines.join("\n")
}
