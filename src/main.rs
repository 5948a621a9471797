//! route-tree demo server.
//!
//! # Route Tree
//!
//! ```text
//! root            [request_id, log_requests]
//! ├── GET /hello
//! ├── group       [set_header(X-Custom: true)]
//! │   ├── GET /custom-header
//! │   └── group   (empty)
//! └── protected   [authenticator]
//!     └── GET /profile
//! ```
//!
//! `/profile` answers 401 unless the request carries a `session_id` cookie.

use std::path::PathBuf;

use axum::extract::Request;
use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use clap::Parser;
use tokio::net::TcpListener;

use route_tree::config::validation::validate_config;
use route_tree::config::{load_config, ConfigError, ServerConfig};
use route_tree::http::response;
use route_tree::middleware;
use route_tree::{observability, HttpServer, Next, Router, Shutdown};

#[derive(Debug, Parser)]
#[command(name = "route-tree", version, about = "Serve the route-tree demo application")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

/// Authenticated user attached by `authenticator`.
#[derive(Debug, Clone)]
struct UserId(String);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = resolve_config(&cli)?;

    observability::logging::init(&config.observability);
    tracing::info!("route-tree v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let mux = app().into_mux()?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    HttpServer::new(mux, config).run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Load the configuration file (or defaults), apply CLI overrides, then
/// validate the result.
fn resolve_config(cli: &Cli) -> Result<ServerConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = &cli.bind {
        config.listener.bind_address = bind.clone();
    }
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn app() -> Router {
    let mut router = Router::new();

    router.handle_fn("GET /hello", |_req| async { "world!" });

    router
        .use_middleware(middleware::request_id())
        .use_middleware(middleware::log_requests());

    router.group(|g| {
        g.use_middleware(middleware::set_header(
            HeaderName::from_static("x-custom"),
            HeaderValue::from_static("true"),
        ));

        g.handle_fn("GET /custom-header", |_req| async {
            "Check response headers!"
        });

        g.group(|_nested| {});
    });

    let mut protected = Router::new();
    protected.use_middleware(middleware::from_fn(authenticator));
    protected.handle_fn("GET /profile", |req: Request| async move {
        match req.extensions().get::<UserId>() {
            Some(user) => axum::Json(serde_json::json!({ "user_id": user.0 })).into_response(),
            None => response::error(StatusCode::UNAUTHORIZED),
        }
    });

    router.mount(protected);
    router
}

async fn authenticator(mut req: Request, next: Next) -> axum::response::Response {
    if session_cookie(&req).is_none() {
        return response::error(StatusCode::UNAUTHORIZED);
    }

    // Session lookup is out of scope for the demo; every session maps to one user.
    req.extensions_mut().insert(UserId("1234".to_string()));
    next.run(req).await
}

fn session_cookie(req: &Request) -> Option<&str> {
    req.headers()
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == "session_id")
        .map(|(_, value)| value)
}
