use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::time::Duration;

use crate::clients::quickitquote::QuickItQuoteRemote;
use crate::infra::config::Config;

#[derive(Parser)]
#[command(name = "quickitquote-mcp")]
#[command(about = "QuickItQuote MCP proxy - runs the service when no subcommand is given")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Health check a running service
    Health {
        /// Service URL to check
        #[arg(short, long, default_value = "http://localhost:3000")]
        url: String,
    },
    /// Validate configuration
    Config {
        /// Validate config without starting service
        #[arg(long)]
        validate: bool,
    },
    /// Show service status and configuration
    Status {
        /// Service URL to check
        #[arg(short, long, default_value = "http://localhost:3000")]
        url: String,
    },
    /// Run one search against the upstream API
    Search {
        /// Upstream base URL (defaults to the configured one)
        #[arg(short, long)]
        url: Option<String>,
        /// Query to send
        #[arg(short, long, default_value = "router")]
        q: String,
    },
}

pub async fn run_commands(command: Commands) -> ExitCode {
    match command {
        Commands::Health { url } => match health_check(&url).await {
            Ok(_) => {
                println!("✅ Service is healthy");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Health check failed: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Config { validate: _ } => match validate_config() {
            Ok(_) => {
                println!("✅ Configuration is valid");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Configuration validation failed: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Status { url } => match show_status(&url).await {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("❌ Status check failed: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Search { url, q } => match test_search(url, &q).await {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("❌ Search failed: {}", e);
                ExitCode::FAILURE
            }
        },
    }
}

async fn health_check(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/api/health", url.trim_end_matches('/')))
        .timeout(Duration::from_secs(2))
        .send()
        .await?;

    if response.status().is_success() {
        Ok(())
    } else {
        Err(format!("HTTP {}", response.status()).into())
    }
}

fn validate_config() -> Result<Config, Box<dyn std::error::Error>> {
    Ok(Config::from_env()?)
}

async fn show_status(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let base = url.trim_end_matches('/');
    let client = reqwest::Client::new();

    let health_response = client
        .get(format!("{}/api/health", base))
        .timeout(Duration::from_secs(5))
        .send()
        .await?;

    println!(
        "🏥 Health Status: {}",
        if health_response.status().is_success() {
            "✅ Healthy"
        } else {
            "❌ Unhealthy"
        }
    );

    let tools_response = client
        .post(format!("{}/api/mcp/rpc", base))
        .header("content-type", "application/json")
        .json(&serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/list",
            "params": {}
        }))
        .timeout(Duration::from_secs(2))
        .send()
        .await;

    match tools_response {
        Ok(resp) if resp.status().is_success() => {
            println!("🔧 Tools: ✅ Available");
        }
        Ok(resp) => {
            println!("🔧 Tools: ❌ HTTP {}", resp.status());
        }
        Err(_) => {
            println!("🔧 Tools: ❌ Unavailable");
        }
    }

    println!("\n📋 Configuration:");
    match Config::from_env() {
        Ok(cfg) => {
            println!("  Mode: {}", cfg.mode);
            println!("  Port: {}", cfg.port);
            println!("  Upstream: {}", cfg.search_base_url);
            println!("  Root transport: {:?}", cfg.root_transport);
            println!("  Heartbeat: {}s", cfg.heartbeat_secs);
        }
        Err(e) => println!("  ❌ {}", e),
    }
    println!(
        "  Log Level: {}",
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into())
    );

    Ok(())
}

async fn test_search(url: Option<String>, q: &str) -> Result<(), Box<dyn std::error::Error>> {
    let q = q.trim();
    if q.is_empty() {
        return Err("q parameter required".into());
    }
    let cfg = Config::from_env()?;
    let base = url.unwrap_or(cfg.search_base_url.clone());

    let client = QuickItQuoteRemote::new(base, cfg.upstream_timeout())?;
    let payload = client.search(q).await?;

    println!("🔍 Search for \"{}\" via {}", q, client.base_url());
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}
