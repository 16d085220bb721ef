use anyhow::{ Context, Result };
use clap::Parser;
use serde_json::Value;
use std::process::ExitCode;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use tides_console::cli::{ Args, Command };
use tides_console::client::ToolForm;
use tides_console::client::services::tools::default_arguments;
use tides_console::config::{ ConsoleConfigBuilder, EndpointPolicy };
use tides_console::utils::auth::mask_key;
use tides_console::{ Console, ConsoleConfig };

fn init_tracing(verbose: bool) {
    let default = if verbose { "tides_console=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

/// Defaults, then the config file, then `TIDES_*` variables, then flags
fn load_config(args: &Args) -> Result<ConsoleConfig> {
    let config = match &args.config {
        Some(path) =>
            ConsoleConfig::from_toml_file(path).with_context(||
                format!("failed to load {}", path.display())
            )?,
        None => ConsoleConfig::default(),
    };
    let config = config.apply_env()?;

    let mut builder = ConsoleConfigBuilder::from_config(config);
    if let Some(url) = &args.agent_url {
        builder = builder.with_agent_url(url);
    }
    if let Some(url) = &args.mcp_url {
        builder = builder.with_mcp_url(url);
    }
    if let Some(key) = &args.api_key {
        builder = builder.with_api_key(key);
    }
    if let Some(tide) = &args.tide {
        builder = builder.with_tide_id(tide);
    }
    if let Some(secs) = args.timeout {
        builder = builder.with_request_timeout(Duration::from_secs(secs));
    }
    if args.legacy_endpoints {
        builder = builder.with_endpoint_policy(EndpointPolicy::Legacy);
    }
    Ok(builder.build()?)
}

async fn run(args: Args) -> Result<bool> {
    let config = load_config(&args)?;
    debug!(
        "Config: agent={} mcp={} key={} tide={}",
        config.agent_url,
        config.mcp_url,
        mask_key(&config.api_key),
        config.tide_id
    );
    let mut console = Console::new(config)?;

    let rendered = match args.command.unwrap_or(Command::Console) {
        Command::Console => {
            console.interactive().await?;
            return Ok(true);
        }
        Command::Tools => console.list_tools(),
        Command::Services => console.list_services(),
        Command::Tool { name, args, filter, title, description, energy } => {
            let arguments = match args {
                Some(map) => map,
                None => {
                    let form = ToolForm { filter, title, description, energy_level: energy };
                    default_arguments(&name, &form)
                }
            };
            console.run_tool(&name, arguments).await
        }
        Command::Service { name, params, raw } => {
            let params = params
                .into_iter()
                .map(|(key, value)| (key, Value::String(value)))
                .collect();
            console.run_service(&name, params, raw).await
        }
        Command::Chat { message, raw } => console.run_chat(&message.join(" "), raw).await,
        Command::Ping => console.run_ping().await,
        Command::Suite => console.run_suite().await,
    };

    println!("{}", rendered.text);
    Ok(rendered.ok)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
