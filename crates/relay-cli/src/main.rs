//! Relay CLI - Definition management and execution
//!
//! Simple CLI for interacting with the Relay API from a terminal.

mod api;
mod config;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dialoguer::{Confirm, Password};
use reqwest::Method;
use serde_json::{Map, Value};
use std::fs;

use api::{ApiDefinition, ApiPayload, LogEntry, RelayClient};
use config::Config;

#[derive(Parser)]
#[command(name = "relay")]
#[command(about = "Relay CLI - API definition registry and execution proxy", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a session token (and optionally an execution key)
    Login {
        /// Session token (will prompt if not provided)
        #[arg(short, long)]
        token: Option<String>,
        /// API key for the execute route
        #[arg(short = 'k', long)]
        api_key: Option<String>,
    },

    /// Manage stored API definitions
    Api {
        #[command(subcommand)]
        action: ApiAction,
    },

    /// Execute a stored API definition through the proxy
    Exec {
        /// Definition ID
        id: String,
        /// Method used on the proxy route (the stored method is used upstream)
        #[arg(short = 'X', long, default_value = "GET")]
        method: String,
        /// Query parameter override (key=value, repeatable)
        #[arg(short = 'q', long = "query")]
        query: Vec<String>,
        /// JSON body to forward
        #[arg(short, long)]
        data: Option<String>,
        /// Read the JSON body from a file
        #[arg(short, long)]
        file: Option<String>,
    },

    /// Inspect the execution log
    Logs {
        #[command(subcommand)]
        action: LogAction,
    },

    /// Show or change configuration
    Config {
        /// Set the server base URL
        #[arg(long)]
        base_url: Option<String>,
    },
}

#[derive(Subcommand)]
enum ApiAction {
    /// List your definitions
    List {
        #[arg(long, default_value = "1")]
        page: u32,
        #[arg(short, long, default_value = "10")]
        limit: u32,
    },
    /// Show one definition
    Get { id: String },
    /// Create a definition
    Create {
        /// Display name
        name: String,
        /// Absolute http(s) URL
        endpoint: String,
        #[arg(short = 'X', long, default_value = "GET")]
        method: String,
        #[arg(short, long)]
        description: Option<String>,
        /// Header sent upstream (Name=Value, repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
        /// Default query parameter (key=value, repeatable)
        #[arg(short = 'p', long = "param")]
        params: Vec<String>,
    },
    /// Update a definition
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        endpoint: Option<String>,
        #[arg(short = 'X', long)]
        method: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        /// Replace all headers (Name=Value, repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
        /// Replace all default params (key=value, repeatable)
        #[arg(short = 'p', long = "param")]
        params: Vec<String>,
    },
    /// Allow execution
    Enable { id: String },
    /// Block execution
    Disable { id: String },
    /// Delete a definition
    Delete {
        id: String,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum LogAction {
    /// List recent executions
    List {
        /// Only show one definition
        #[arg(short, long)]
        api: Option<String>,
        #[arg(long, default_value = "1")]
        page: u32,
        #[arg(short, long, default_value = "10")]
        limit: u32,
    },
    /// Show one log entry
    Show { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Login { token, api_key } => cmd_login(token, api_key).await,
        Commands::Api { action } => cmd_api(action).await,
        Commands::Exec {
            id,
            method,
            query,
            data,
            file,
        } => cmd_exec(id, method, query, data, file).await,
        Commands::Logs { action } => cmd_logs(action).await,
        Commands::Config { base_url } => cmd_config(base_url),
    }
}

// ============================================
// Command Implementations
// ============================================

async fn cmd_login(token: Option<String>, api_key: Option<String>) -> Result<()> {
    let mut config = Config::load()?;

    let token = match token {
        Some(t) => t,
        None => Password::new()
            .with_prompt("Session token")
            .interact()
            .context("Failed to read session token")?,
    };

    let client = RelayClient::new(&config.base_url);
    print!("Testing connection... ");

    match client.check_session(&token).await {
        Ok(true) => println!("{}", "OK".green()),
        _ => {
            println!("{}", "Failed".red());
            bail!("Could not authenticate with Relay API. Check your session token.");
        }
    }

    config.session_token = Some(token);
    if api_key.is_some() {
        config.api_key = api_key;
    }
    config.save()?;

    println!("{} Credentials saved to {:?}", "✓".green(), Config::config_path()?);

    if config.api_key.is_none() {
        println!("\n{}", "Tip: store an execution key to use 'relay exec':".yellow());
        println!("  relay login --api-key <KEY>");
    }

    Ok(())
}

async fn cmd_api(action: ApiAction) -> Result<()> {
    let config = Config::load()?;
    let token = config.require_session()?;
    let client = RelayClient::new(&config.base_url);

    match action {
        ApiAction::List { page, limit } => {
            let list = client.list_apis(token, page, limit).await?;

            if list.apis.is_empty() {
                println!("No APIs found.");
                println!("\n{}", "Create one with:".dimmed());
                println!("  relay api create <name> <endpoint>");
                return Ok(());
            }

            println!(
                "{} (page {}/{}, {} total)",
                "APIs:".bold(),
                list.page,
                list.pages.max(1),
                list.total
            );
            for def in &list.apis {
                print_api_line(def);
            }
        }

        ApiAction::Get { id } => {
            let def = client.get_api(token, &id).await?;
            print_api_detail(&def);
        }

        ApiAction::Create {
            name,
            endpoint,
            method,
            description,
            headers,
            params,
        } => {
            let payload = ApiPayload {
                name: Some(name),
                description,
                endpoint: Some(endpoint),
                method: Some(method.to_ascii_uppercase()),
                headers: Some(Value::Object(parse_pairs(&headers)?)),
                params: Some(Value::Object(parse_pairs(&params)?)),
                status: None,
            };
            let def = client.create_api(token, &payload).await?;
            println!("{} API created", "✓".green());
            print_api_line(&def);
        }

        ApiAction::Update {
            id,
            name,
            endpoint,
            method,
            description,
            headers,
            params,
        } => {
            let payload = ApiPayload {
                name,
                description,
                endpoint,
                method: method.map(|m| m.to_ascii_uppercase()),
                headers: non_empty_pairs(&headers)?,
                params: non_empty_pairs(&params)?,
                status: None,
            };
            let def = client.update_api(token, &id, &payload).await?;
            println!("{} API updated", "✓".green());
            print_api_line(&def);
        }

        ApiAction::Enable { id } => {
            let def = client.update_api(token, &id, &status_payload("active")).await?;
            println!("{} {} is now {}", "✓".green(), def.name.cyan(), "active".green());
        }

        ApiAction::Disable { id } => {
            let def = client
                .update_api(token, &id, &status_payload("inactive"))
                .await?;
            println!("{} {} is now {}", "✓".green(), def.name.cyan(), "inactive".red());
        }

        ApiAction::Delete { id, yes } => {
            let confirmed = yes
                || Confirm::new()
                    .with_prompt(format!("Delete API {}? This cannot be undone", id))
                    .default(false)
                    .interact()
                    .context("Failed to read confirmation")?;
            if !confirmed {
                println!("Aborted.");
                return Ok(());
            }

            client.delete_api(token, &id).await?;
            println!("{} API {} deleted", "✓".green(), id);
        }
    }

    Ok(())
}

async fn cmd_exec(
    id: String,
    method: String,
    query: Vec<String>,
    data: Option<String>,
    file: Option<String>,
) -> Result<()> {
    let config = Config::load()?;
    let client = RelayClient::new(&config.base_url);

    let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .with_context(|| format!("Invalid method: {}", method))?;

    let raw_body = match (data, file) {
        (Some(d), None) => Some(d),
        (None, Some(f)) => Some(
            fs::read_to_string(&f).with_context(|| format!("Failed to read file: {}", f))?,
        ),
        (Some(_), Some(_)) => bail!("Cannot specify both --data and --file"),
        (None, None) => None,
    };
    let body = raw_body
        .map(|raw| serde_json::from_str::<Value>(&raw).context("Body is not valid JSON"))
        .transpose()?;

    let query = query
        .iter()
        .map(|pair| split_pair(pair).map(|(k, v)| (k.to_string(), v.to_string())))
        .collect::<Result<Vec<_>>>()?;

    let outcome = client
        .execute(config.api_key.as_deref(), &id, method, &query, body.as_ref())
        .await?;

    let status = outcome.status.to_string();
    let status = if outcome.status < 400 {
        status.green()
    } else {
        status.red()
    };

    match outcome.body.get("response") {
        Some(response) => {
            let time = outcome
                .body
                .get("response_time")
                .and_then(Value::as_f64)
                .unwrap_or_default();
            eprintln!("{} {} ({:.2} ms)", "Status".dimmed(), status, time);
            println!("{}", pretty(response));
        }
        None => {
            eprintln!("{} {}", "Status".dimmed(), status);
            let message = outcome
                .body
                .get("error")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| pretty(&outcome.body));
            println!("{}", message.red());
        }
    }

    Ok(())
}

async fn cmd_logs(action: LogAction) -> Result<()> {
    let config = Config::load()?;
    let token = config.require_session()?;
    let client = RelayClient::new(&config.base_url);

    match action {
        LogAction::List { api, page, limit } => {
            let list = client.list_logs(token, api.as_deref(), page, limit).await?;

            if list.logs.is_empty() {
                println!("No executions logged.");
                return Ok(());
            }

            println!(
                "{} (page {}/{}, {} total)",
                "Executions:".bold(),
                list.page,
                list.pages.max(1),
                list.total
            );
            for entry in &list.logs {
                print_log_line(entry);
            }
        }

        LogAction::Show { id } => {
            let entry = client.get_log(token, &id).await?;
            print_log_line(&entry);
            println!("  {} {}", "API:".dimmed(), entry.api_id);
            println!("  {} {}", "At:".dimmed(), entry.created_at);
            if let Some(error) = &entry.error {
                println!("  {} {}", "Error:".dimmed(), error.red());
            }
            if let Some(data) = &entry.response_data {
                println!("  {}", "Response (first 1000 chars):".dimmed());
                println!("{}", data);
            }
        }
    }

    Ok(())
}

fn cmd_config(base_url: Option<String>) -> Result<()> {
    let mut config = Config::load()?;

    if let Some(url) = base_url {
        config.set_base_url(&url);
        config.save()?;
        println!("{} Base URL set to {}", "✓".green(), config.base_url);
        return Ok(());
    }

    println!("{}", "Configuration:".bold());
    println!("  Path: {:?}", Config::config_path()?);
    println!("  Base URL: {}", config.base_url);
    println!(
        "  Session: {}",
        if config.session_token.is_some() {
            "Set".green()
        } else {
            "Not set".red()
        }
    );
    println!(
        "  API Key: {}",
        if config.api_key.is_some() {
            "Set".green()
        } else {
            "Not set".red()
        }
    );

    Ok(())
}

// ============================================
// Helpers
// ============================================

fn status_payload(status: &str) -> ApiPayload {
    ApiPayload {
        status: Some(status.to_string()),
        ..Default::default()
    }
}

fn split_pair(pair: &str) -> Result<(&str, &str)> {
    match pair.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value)),
        _ => bail!("Expected key=value, got '{}'", pair),
    }
}

fn parse_pairs(pairs: &[String]) -> Result<Map<String, Value>> {
    pairs
        .iter()
        .map(|pair| split_pair(pair).map(|(k, v)| (k.to_string(), Value::String(v.to_string()))))
        .collect()
}

fn non_empty_pairs(pairs: &[String]) -> Result<Option<Value>> {
    if pairs.is_empty() {
        return Ok(None);
    }
    parse_pairs(pairs).map(|map| Some(Value::Object(map)))
}

fn pretty(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

fn print_api_line(def: &ApiDefinition) {
    let status = if def.status == "active" {
        def.status.green()
    } else {
        def.status.red()
    };
    println!(
        "  {} {} {} {} [{}]",
        def.id.to_string().dimmed(),
        def.name.cyan().bold(),
        def.method.yellow(),
        def.endpoint,
        status
    );
}

fn print_api_detail(def: &ApiDefinition) {
    print_api_line(def);
    if !def.description.is_empty() {
        println!("  {} {}", "Description:".dimmed(), def.description);
    }
    println!("  {} {}", "Headers:".dimmed(), pretty(&def.headers));
    println!("  {} {}", "Params:".dimmed(), pretty(&def.params));
}

fn print_log_line(entry: &LogEntry) {
    let status = entry.status_code.to_string();
    let status = if entry.error.is_some() || entry.status_code >= 400 {
        status.red()
    } else {
        status.green()
    };
    println!(
        "  {} {} {} {} ({:.2} ms)",
        entry.id.to_string().dimmed(),
        status,
        entry.method.yellow(),
        entry.endpoint,
        entry.response_time
    );
}
