//! Rollbook CLI - serve and browse student records

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::Overrides;

#[derive(Parser)]
#[command(name = "rollbook")]
#[command(version)]
#[command(about = "Student records service - REST API over a SQLite table")]
#[command(long_about = r#"
Rollbook keeps a single table of student records and exposes it over HTTP:
  GET    /students
  GET    /students/{id}
  POST   /students
  PUT    /students/{id}
  DELETE /students/{id}

Example usage:
  rollbook init
  rollbook serve --port 5287
  rollbook list
  rollbook list --url http://127.0.0.1:5287
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file (defaults to ./rollbook.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the student REST API
    Serve {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory of static display-client files served for unmatched paths
        #[arg(long)]
        ui_dir: Option<PathBuf>,

        /// Disable the permissive CORS policy
        #[arg(long)]
        no_cors: bool,
    },

    /// Show every student as a table
    List {
        /// Server to read from (defaults to the configured host and port)
        #[arg(short, long)]
        url: Option<String>,

        /// Read an existing database file directly instead of a server
        #[arg(short, long, conflicts_with = "url")]
        database: Option<PathBuf>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Write a rollbook.toml with default settings
    Init {
        /// Database path to record in the config
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config_path = cli.config.as_deref();

    let result = match cli.command {
        Commands::Serve { database, host, port, ui_dir, no_cors } => {
            let overrides = Overrides { database, host, port, ui_dir, no_cors };
            let config = commands::resolve_config(config_path, overrides)?;
            commands::run_serve(config).await
        }
        Commands::List { url, database, json } => {
            let config = commands::resolve_config(config_path, Overrides::default())?;
            let source = commands::ListSource::choose(&config, url, database)?;
            commands::run_list(source, json).await
        }
        Commands::Init { database, force } => commands::run_init(config_path, database, force),
    };

    if let Err(e) = &result {
        rollbook::ui::error(&e.to_string());
    }
    result
}
