//! Liveness endpoints for the hosting platform

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use telegram::BotContext;
use tower_http::trace::TraceLayer;

#[derive(Debug, Serialize)]
struct HealthReport {
    status: &'static str,
    users: usize,
    files: usize,
    sessions: usize,
}

pub fn router(ctx: BotContext) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
}

/// Serve the health routes on `0.0.0.0:port`.
///
/// A failure to bind is logged; the bot keeps running without the endpoint.
pub async fn serve(ctx: BotContext, port: u16) {
    let addr = format!("0.0.0.0:{}", port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Health endpoint could not bind {}: {}", addr, e);
            return;
        }
    };

    tracing::info!("Health endpoint listening on {}", addr);
    if let Err(e) = axum::serve(listener, router(ctx)).await {
        tracing::error!("Health endpoint stopped: {}", e);
    }
}

async fn root() -> &'static str {
    "Auto-filter bot is running"
}

async fn health_check(State(ctx): State<BotContext>) -> impl IntoResponse {
    let counts = (ctx.catalog.count_users().await, ctx.catalog.count_files().await);
    match counts {
        (Ok(users), Ok(files)) => (
            StatusCode::OK,
            Json(HealthReport {
                status: "ok",
                users,
                files,
                sessions: ctx.sessions.len(),
            }),
        ),
        (users, files) => {
            tracing::warn!(users_ok = users.is_ok(), files_ok = files.is_ok(), "Catalog unavailable for health check");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthReport {
                    status: "degraded",
                    users: users.unwrap_or_default(),
                    files: files.unwrap_or_default(),
                    sessions: ctx.sessions.len(),
                }),
            )
        }
    }
}
