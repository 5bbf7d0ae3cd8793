//! Purpose: Provide the HTTP/JSON sort server.
//! Exports: `ServeConfig`, `serve`, `router`.
//! Role: Axum server exposing `/process-single` and `/process-concurrent`.
//! Invariants: Malformed bodies get 400 with the parser message as plain text; nothing is sorted.
//! Invariants: Sorting runs on the blocking pool, never on the async executor.
//! Invariants: The route table is built once and never mutated afterwards.

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use serde_json::json;
use std::future::IntoFuture;
use std::net::SocketAddr;
use tokio::time::Duration;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use batchsort::api::{Error, ErrorKind, SortMode, SortResponse, decode_request, sort_batch};

#[derive(Clone, Debug)]
pub struct ServeConfig {
    pub bind: SocketAddr,
    pub shutdown_timeout_ms: u64,
}

pub async fn serve(config: ServeConfig) -> Result<(), Error> {
    validate_config(&config)?;

    init_tracing();

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message(format!("failed to bind server on {}", config.bind))
                .with_source(err)
        })?;
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "listening");
    }

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(listener, router())
        .with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => {
            result.map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("server failed")
                    .with_source(err)
            })?;
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown requested");
            let _ = shutdown_tx.send(());
            let grace = Duration::from_millis(config.shutdown_timeout_ms);
            match tokio::time::timeout(grace, &mut server).await {
                Ok(result) => result.map_err(|err| {
                    Error::new(ErrorKind::Io)
                        .with_message("server failed")
                        .with_source(err)
                })?,
                Err(_) => {
                    return Err(Error::new(ErrorKind::Io).with_message("server shutdown timed out"));
                }
            }
        }
    };
    Ok(())
}

pub fn router() -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/process-single", post(process_single))
        .route("/process-concurrent", post(process_concurrent))
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
}

fn validate_config(config: &ServeConfig) -> Result<(), Error> {
    if config.shutdown_timeout_ms == 0 {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("--shutdown-timeout-ms must be greater than zero")
            .with_hint("Use a positive value like 10000."));
    }
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    #[cfg(not(unix))]
    ctrl_c.await;
}

async fn healthz() -> Response {
    Json(json!({ "ok": true })).into_response()
}

async fn process_single(body: Bytes) -> Response {
    process(SortMode::Single, body).await
}

async fn process_concurrent(body: Bytes) -> Response {
    process(SortMode::Concurrent, body).await
}

async fn process(mode: SortMode, body: Bytes) -> Response {
    let request = match decode_request(&body) {
        Ok(request) => request,
        Err(err) => {
            tracing::debug!(mode = mode.as_str(), error = %err, "rejected request body");
            return error_response(err);
        }
    };

    let batch = request.to_sort;
    let result = tokio::task::spawn_blocking(move || sort_batch(mode, &batch))
        .await
        .map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("sort task failed")
                .with_source(err)
        })
        .and_then(|result| result);

    match result {
        Ok(outcome) => {
            let response = SortResponse::from(outcome);
            tracing::info!(
                mode = mode.as_str(),
                arrays = response.sorted_arrays.len(),
                time_ns = response.time_ns,
                "sorted batch"
            );
            Json(response).into_response()
        }
        Err(err) => {
            tracing::warn!(mode = mode.as_str(), error = %err, "sort failed");
            error_response(err)
        }
    }
}

fn error_response(err: Error) -> Response {
    let status = match err.kind() {
        ErrorKind::Usage => StatusCode::BAD_REQUEST,
        ErrorKind::Internal | ErrorKind::Io => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let message = err.message().unwrap_or("error");
    (status, format!("{message}\n")).into_response()
}
