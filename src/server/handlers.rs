use std::{convert::Infallible, sync::Arc, time::Instant};

use bytes::Bytes;
use serde_json::json;
use tracing::{error, info};
use warp::{
    http::StatusCode,
    reject::{LengthRequired, MethodNotAllowed, PayloadTooLarge},
    Rejection, Reply,
};

use crate::{
    routing::TripPlanner,
    types::{SuggestRequest, SuggestResponse},
};

/// `POST /api/ai/suggest`. Any failure, including a body that is not a valid
/// request, becomes a 500 carrying the error text.
pub async fn handle_suggest(
    body: Bytes,
    planner: Arc<TripPlanner>,
) -> Result<impl Reply, Infallible> {
    let started = Instant::now();

    let outcome = match serde_json::from_slice::<SuggestRequest>(&body) {
        Ok(request) => {
            info!(
                target: "wego::server",
                action = %request.action,
                query_len = request.query.len(),
                history = request.chat_history.len(),
                "suggest request received"
            );
            planner.handle(&request).await
        }
        Err(err) => Err(err.into()),
    };

    let (status, response) = match outcome {
        Ok(result) => {
            info!(
                target: "wego::server",
                elapsed_ms = started.elapsed().as_millis() as u64,
                "suggest request completed"
            );
            (StatusCode::OK, SuggestResponse::ok(result))
        }
        Err(err) => {
            error!(
                target: "wego::server",
                error = %err,
                code = err.error_code(),
                retryable = err.is_retryable(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "suggest request failed"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                SuggestResponse::failed(err.to_string()),
            )
        }
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&response),
        status,
    ))
}

/// `OPTIONS /api/ai/suggest`. Answers browser preflights and plain OPTIONS alike.
pub fn preflight() -> impl Reply {
    let reply = warp::reply::with_status(warp::reply(), StatusCode::OK);
    let reply = warp::reply::with_header(reply, "Access-Control-Allow-Origin", "*");
    let reply = warp::reply::with_header(reply, "Access-Control-Allow-Methods", "POST, OPTIONS");
    warp::reply::with_header(reply, "Access-Control-Allow-Headers", "Content-Type")
}

pub fn health() -> impl Reply {
    warp::reply::json(&json!({"status": "healthy"}))
}

pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (code, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if err.find::<PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large".to_string())
    } else if err.find::<LengthRequired>().is_some() {
        (StatusCode::LENGTH_REQUIRED, "Content-Length required".to_string())
    } else if err.find::<MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
    } else {
        error!(target: "wego::server", rejection = ?err, "unhandled rejection");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&SuggestResponse::failed(message)),
        code,
    ))
}
