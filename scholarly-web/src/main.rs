//! Scholarly Web Server
//!
//! Serves the research chatbot and contact form API.

use clap::Parser;
use scholarly_core::{init_logging, AppConfig, LogFormat, LoggingConfig};
use scholarly_web::ScholarlyServerBuilder;
use tracing::{error, info};

/// Scholarly Web Server - research chatbot and contact form API
#[derive(Parser)]
#[command(name = "scholarly-web")]
#[command(about = "HTTP API for the scholarly website")]
#[command(version)]
struct Args {
    /// Server host to bind to (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Server port to listen on (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,

    /// Log output format (pretty, compact, json)
    #[arg(long)]
    log_format: Option<String>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Load environment variables
    dotenvy::dotenv().ok();

    let mut logging = LoggingConfig::from_env();
    if let Some(level) = args.log_level {
        logging.level = level;
    }
    if let Some(format) = args.log_format.as_deref() {
        match LogFormat::parse(format) {
            Some(format) => logging.format = format,
            None => eprintln!("Unknown log format '{}', keeping {:?}", format, logging.format),
        }
    }
    if let Err(e) = init_logging(&logging) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            e.log();
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let mut builder = ScholarlyServerBuilder::new(config);
    if let Some(host) = args.host {
        builder = builder.host(host);
    }
    if let Some(port) = args.port {
        builder = builder.port(port);
    }

    let server = match builder.build().await {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to initialize server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.start().await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    info!("Server stopped");
}
