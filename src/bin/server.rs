use std::{fs::OpenOptions, io, path::Path, process::exit, sync::Arc};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::{Handle, tls_rustls::RustlsConfig};
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use fintrack::{AppState, ServerConfig, build_router, graceful_shutdown, logging_middleware};

#[tokio::main]
async fn main() {
    // A missing .env file is fine, everything can come from the environment.
    let _ = dotenvy::dotenv();

    let config = ServerConfig::parse();

    if let Err(error) = setup_logging(&config.log_path) {
        eprintln!(
            "Could not open log file {}: {error}",
            config.log_path.display()
        );
        exit(1);
    }

    if let Err(error) = serve(config).await {
        tracing::error!("{error}");
        eprintln!("{error}");
        exit(1);
    }
}

async fn serve(config: ServerConfig) -> Result<(), String> {
    let token_verifier = config
        .token_verifier()
        .map_err(|error| format!("Could not set up token verification: {error}"))?;

    let connection = Connection::open(&config.db_path).map_err(|error| {
        format!(
            "Could not open database {}: {error}",
            config.db_path.display()
        )
    })?;

    let state = AppState::new(connection, token_verifier)
        .map_err(|error| format!("Could not initialize database: {error}"))?;

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(state).layer(middleware::from_fn(logging_middleware));
    let router = add_tracing_layer(router);
    let addr = config.socket_addr();

    let result = match &config.cert_path {
        Some(cert_path) => {
            let tls_config =
                RustlsConfig::from_pem_file(cert_path.join("cert.pem"), cert_path.join("key.pem"))
                    .await
                    .map_err(|error| format!("Could not open TLS certificates: {error}"))?;

            tracing::info!("HTTPS server listening on {addr}");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(router.into_make_service())
                .await
        }
        None => {
            tracing::warn!("No certificate path given, serving plain HTTP");
            tracing::info!("HTTP server listening on {addr}");
            axum_server::bind(addr)
                .handle(handle)
                .serve(router.into_make_service())
                .await
        }
    };

    result.map_err(|error| format!("Server error: {error}"))
}

fn setup_logging(log_path: &Path) -> io::Result<()> {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();

    Ok(())
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Errors are logged where they are turned into responses.
        .on_failure(());

    router.layer(tracing_layer)
}
