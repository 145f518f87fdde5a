// Main entry point for Sentinel Web (demo server)

use axum::routing::{get, post};
use axum::Router;
use serde_json::json;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

use sentinel_web::api::{create_router, Gateway};
use sentinel_web::bind::handlers::{use_page_count, use_page_flag_params, use_params, use_user};
use sentinel_web::config::Config;
use sentinel_web::core::errors::GatewayError;
use sentinel_web::core::models::{Flag, Message, Page, Params, Principal};
use sentinel_web::core::token::TokenCodec;

/// Secret handed to demo principals; doubles as their AES and HMAC key
const DEMO_SECRET: &str = "0123456789abcdef";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load and validate configuration first (before any logging)
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // 2. Initialize tracing subscriber with config values
    init_tracing(&config)?;

    info!("Starting Sentinel Web");
    info!(
        bind_address = %config.bind_address,
        port = config.port,
        auth = config.gateway.auth_enable,
        sign = config.gateway.sign_enable,
        enc = config.gateway.enc_enable,
        "Configuration loaded"
    );

    // 3. Build the gateway (codec + stage list)
    let gateway = Gateway::from_config(&config).map_err(|e| {
        error!(error = %e, "Failed to build gateway");
        e
    })?;

    // 4. Create router
    let router = create_router(demo_routes(gateway.codec()), &gateway);
    info!("Router created");

    // 5. Start HTTP server
    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        error!(error = %e, addr = %addr, "Failed to bind to address");
        e
    })?;

    info!(addr = %addr, "Server listening on {}", addr);

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!(error = %e, "Server error");
            e
        })?;

    info!("Server shutdown complete");
    Ok(())
}

fn demo_routes(codec: Arc<TokenCodec>) -> Router {
    Router::new()
        .route(
            "/login/token",
            post(use_params(move |params: Params| {
                let codec = Arc::clone(&codec);
                async move { login(&codec, &params) }
            })),
        )
        .route("/user/info", get(use_user(user_info)))
        .route("/orders/list", get(use_page_flag_params(list_orders)))
        .route("/orders/count", get(use_page_count(count_orders)))
}

fn login(codec: &TokenCodec, params: &Params) -> Result<Message, GatewayError> {
    let username = params.get_or("username", "").trim();
    if username.is_empty() {
        return Ok(Message::err("username missing"));
    }
    let id = params.get_int::<i64>("id").unwrap_or(1);
    let token = codec.mint(id, username, DEMO_SECRET)?;
    Ok(Message::ok_with(json!({ "token": token, "secret": DEMO_SECRET })))
}

async fn user_info(principal: Arc<Principal>) -> Message {
    Message::ok_with(json!({ "id": principal.id, "username": principal.username }))
}

async fn list_orders(page: Page, flag: Flag, params: Params) -> Message {
    Message::ok_with(json!({
        "page": page.page,
        "rows": page.rows,
        "offset": page.offset(),
        "flag": flag,
        "status": params.get_or("status", "any"),
    }))
}

async fn count_orders(page: Page, is_count: bool) -> Message {
    Message::ok_with(json!({ "count": if is_count { 0 } else { page.rows } }))
}

/// Initialize tracing subscriber based on configuration
fn init_tracing(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    // Parse log level
    let level = parse_log_level(&config.log_level)?;

    // Create filter from RUST_LOG env var or config
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_env_filter(filter);

    if config.log_format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}

/// Parse log level string to tracing Level
fn parse_log_level(level: &str) -> Result<tracing::Level, String> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(tracing::Level::TRACE),
        "debug" => Ok(tracing::Level::DEBUG),
        "info" => Ok(tracing::Level::INFO),
        "warn" => Ok(tracing::Level::WARN),
        "error" => Ok(tracing::Level::ERROR),
        _ => Err(format!("Invalid log level: {}", level)),
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => error!(error = %e, "Failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Ctrl+C received, starting graceful shutdown");
        },
        _ = terminate => {
            info!("SIGTERM received, starting graceful shutdown");
        },
    }
}
