use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use league_stats::api::state::AppState;
use league_stats::api::{build_router, cors_layer};
use league_stats::calculate::League;
use league_stats::commands::{CommandRegistry, Invocation};
use league_stats::config::AppConfig;
use league_stats::fetch::{acquire_snapshot, build_source};
use league_stats::render::{render_error, render_output};

#[derive(Parser)]
#[command(name = "league-stats")]
#[command(about = "Standings, streaks and head-to-head stats for a spreadsheet league")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run one chat command against a fresh snapshot, e.g. `query !stats Alice`
    Query {
        /// Command text
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        text: Vec<String>,

        /// Print the structured result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List available commands
    Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;

    // Initialize tracing
    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(cli.json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!cli.json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!("Starting league-stats v{}", env!("CARGO_PKG_VERSION"));

    let registry = CommandRegistry::standard();

    match cli.command {
        Commands::Serve { host, port } => {
            let source = build_source(&config.source)?;
            let state = AppState {
                source,
                league: std::sync::Arc::new(config.league.clone()),
                registry: std::sync::Arc::new(registry),
            };
            let app = build_router(state).layer(cors_layer(&config.server.cors_origin));

            let host = host.unwrap_or(config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Query { text, json } => {
            let text = text.join(" ");
            let invocation = match Invocation::parse(&text) {
                Ok(invocation) => invocation,
                Err(e) => {
                    eprintln!("{}", render_error(&e));
                    std::process::exit(2);
                }
            };

            let source = build_source(&config.source)?;
            tracing::info!("Fetching snapshot from {}", source.name());
            let snapshot = acquire_snapshot(source.as_ref()).await?;
            let league = League::from_snapshot(&snapshot, config.league.settings())?;

            match registry.dispatch(&invocation, &league) {
                Ok(output) if json => println!("{}", serde_json::to_string_pretty(&output)?),
                Ok(output) => println!("{}", render_output(&output, &config.league.name)),
                Err(e) => {
                    eprintln!("{}", render_error(&e));
                    std::process::exit(1);
                }
            }
        }
        Commands::Commands => {
            for spec in registry.specs() {
                println!("!{:<12} {}", spec.name, spec.description);
                println!("  usage: {}", spec.usage);
                for arg in &spec.arguments {
                    let required = if arg.required { "required" } else { "optional" };
                    print!("  - {} ({}): {}", arg.name, required, arg.description);
                    if !arg.choices.is_empty() {
                        print!(" [{}]", arg.choices.join(", "));
                    }
                    println!();
                }
            }
        }
    }

    Ok(())
}
