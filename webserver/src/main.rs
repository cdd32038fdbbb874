//! WebServer entry point
//!
//! Credentials are validated before the listener is bound; a missing key
//! stops startup with a configuration error.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use designer::services::{GeminiDesignGenerator, UnsplashImageSearch};
use designer::DesignerConfig;
use shared::logging::{self, Component};

use webserver::{SessionLimits, WebServer, WebServerState};

#[derive(Parser, Debug)]
#[command(name = "webserver")]
#[command(about = "Home design assistant web server")]
struct Args {
    /// Port for HTTP server (browser connections)
    #[arg(long, default_value = "8080")]
    port: u16,

    /// Interface to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Optional .env file to read credentials from
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Per-call timeout for the generator and image search, at least one second
    #[arg(long, default_value = "30", value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: u64,

    /// Number of inspiration images per design
    #[arg(long, default_value = "3")]
    max_images: usize,

    /// Cached designs kept per session
    #[arg(long, default_value = "64")]
    cache_capacity: usize,

    /// Close sessions idle for this many seconds
    #[arg(long, default_value = "1800", value_parser = clap::value_parser!(u64).range(1..))]
    session_ttl_secs: u64,

    /// Most sessions held at once; the least recently used is evicted beyond this
    #[arg(long, default_value = "1000", value_parser = parse_max_sessions)]
    max_sessions: usize,
}

fn parse_max_sessions(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

impl Args {
    fn session_limits(&self) -> SessionLimits {
        SessionLimits {
            idle_ttl: Duration::from_secs(self.session_ttl_secs),
            max_sessions: self.max_sessions,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logging::init_tracing(Component::WebServer, Some(&args.log_level));
    logging::log_startup(&format!("web server on port {}", args.port));

    let config = match &args.env_file {
        Some(path) => DesignerConfig::from_env_file(path),
        None => DesignerConfig::from_env(),
    };
    let config = match config {
        Ok(config) => config
            .with_request_timeout(Duration::from_secs(args.timeout_secs))
            .with_max_images(args.max_images)
            .with_cache_capacity(args.cache_capacity),
        Err(e) => {
            logging::log_error(None, "Configuration", &e);
            return Err(e.into());
        }
    };
    tracing::debug!(?config, "Configuration loaded");

    let bind_address: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .map_err(|e| webserver::WebServerError::ServerStartup(format!("Invalid bind address: {e}")))?;

    let generator = Arc::new(GeminiDesignGenerator::from_config(&config)?);
    let search = Arc::new(UnsplashImageSearch::from_config(&config)?);
    let state = WebServerState::new(generator, search, config.session_settings())
        .with_limits(args.session_limits());

    let webserver = WebServer::new(state);
    webserver.run(bind_address).await?;

    logging::log_shutdown("WebServer stopped gracefully");
    Ok(())
}
