// src/main.rs

//! The main entry point for the homeserve application.

use anyhow::Result;
use homeserve::config::Config;
use homeserve::{client, server};
use std::env;
use tracing::{error, info};
use tracing_subscriber::filter::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    run_app().await
}

async fn run_app() -> Result<()> {
    // Define version information.
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    // Collect command-line arguments to decide the execution mode.
    let args: Vec<String> = env::args().collect();

    // Handle the --version flag.
    if args.contains(&"--version".to_string()) {
        println!("homeserve version {VERSION}");
        return Ok(());
    }

    // Check if the --client flag is present to start in client mode.
    if args.len() > 1 && args[1] == "--client" {
        // --- Client Mode ---

        // Validate that a host and port are provided.
        if args.len() != 4 {
            eprintln!("Usage: homeserve --client <host> <port>");
            std::process::exit(1);
        }
        let host = &args[2];
        let port: u16 = match args[3].parse() {
            Ok(p) => p,
            Err(_) => {
                eprintln!("Invalid port number: {}", args[3]);
                std::process::exit(1);
            }
        };

        // Initialize logging for client mode. Client output goes to stdout,
        // so logging defaults to warnings only.
        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
        tracing_subscriber::fmt()
            .with_env_filter(log_level)
            .compact()
            .with_ansi(true)
            .init();

        if let Err(e) = client::run(host, port).await {
            error!("Client runtime error: {}", e);
            return Err(e);
        }
    } else {
        // --- Server Mode ---

        // Determine the configuration path.
        // It can be provided via a --config flag; otherwise, it defaults to "config.toml".
        let config_path = args
            .iter()
            .position(|arg| arg == "--config")
            .and_then(|i| args.get(i + 1))
            .map(|s| s.as_str())
            .unwrap_or("config.toml");

        // Load the server configuration from the determined path. A missing
        // file falls back to built-in defaults; a present-but-invalid file is
        // fatal, as the server cannot run with a half-read configuration.
        let mut config = if std::path::Path::new(config_path).exists() {
            match Config::from_file(config_path) {
                Ok(cfg) => cfg,
                Err(e) => {
                    eprintln!("Failed to load configuration from \"{config_path}\": {e}");
                    std::process::exit(1);
                }
            }
        } else {
            Config::default()
        };

        // Override port if provided as a command-line argument
        if let Some(port_index) = args.iter().position(|arg| arg == "--port") {
            if let Some(port_str) = args.get(port_index + 1) {
                match port_str.parse::<u16>() {
                    Ok(port) => config.port = port,
                    Err(_) => {
                        eprintln!("Invalid port number: {port_str}");
                        std::process::exit(1);
                    }
                }
            } else {
                eprintln!("--port flag requires a value");
                std::process::exit(1);
            }
        }

        // Setup logging. Get the log level from the env var or the config.
        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone());
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(log_level))
            .compact()
            .with_ansi(true)
            .init();

        if !std::path::Path::new(config_path).exists() {
            info!(
                "No configuration file at \"{}\", using built-in defaults.",
                config_path
            );
        }

        if let Err(e) = server::run(config).await {
            error!("Server runtime error: {}", e);
            return Err(e);
        }
    }

    Ok(())
}
