use crate::models::{AddItemRequest, AddItemResponse, PopOrder, PopResponse};
use crate::queue::{ItemQueue, QueueError, QueueStats};

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
};
use serde::Serialize;
use tracing::{debug, error, warn};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
}

impl ErrorResponse {
    fn new(error: &str, details: Option<String>) -> Self {
        Self {
            error: error.to_string(),
            details,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub queue_stats: QueueStats,
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn queue_error(err: QueueError) -> HandlerError {
    match err {
        QueueError::Validation(message) => {
            warn!("Rejected request: {}", message);
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("invalid request", Some(message))),
            )
        }
        QueueError::Store(e) => {
            error!("Item store failure: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("internal server error", None)),
            )
        }
    }
}

pub async fn list_items(
    State(queue): State<ItemQueue>,
) -> Result<Json<Vec<String>>, HandlerError> {
    debug!("Listing items");

    let items = queue.list().await.map_err(queue_error)?;
    Ok(Json(items))
}

pub async fn add_item(
    State(queue): State<ItemQueue>,
    payload: Result<Json<AddItemRequest>, JsonRejection>,
) -> Result<Json<AddItemResponse>, HandlerError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Malformed add request: {}", rejection.body_text());
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                "invalid request",
                Some(rejection.body_text()),
            )),
        )
    })?;

    queue.add(&request.text).await.map_err(queue_error)?;
    Ok(Json(AddItemResponse::ok()))
}

async fn pop(queue: &ItemQueue, order: PopOrder) -> Result<Json<PopResponse>, HandlerError> {
    debug!("{:?} pop requested", order);

    let item = queue.pop(order).await.map_err(queue_error)?;
    Ok(Json(PopResponse::from(item)))
}

pub async fn lifo_pop(State(queue): State<ItemQueue>) -> Result<Json<PopResponse>, HandlerError> {
    pop(&queue, PopOrder::Lifo).await
}

pub async fn fifo_pop(State(queue): State<ItemQueue>) -> Result<Json<PopResponse>, HandlerError> {
    pop(&queue, PopOrder::Fifo).await
}

pub async fn health_check(
    State(queue): State<ItemQueue>,
) -> Result<Json<HealthResponse>, HandlerError> {
    debug!("Health check requested");

    let queue_stats = queue.stats().await.map_err(queue_error)?;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        queue_stats,
    }))
}

pub async fn queue_stats(State(queue): State<ItemQueue>) -> Result<Json<QueueStats>, HandlerError> {
    debug!("Queue stats requested");

    let stats = queue.stats().await.map_err(queue_error)?;
    Ok(Json(stats))
}

pub async fn handle_404() -> HandlerError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(
            "endpoint not found",
            Some("available endpoints: GET /, POST /add, GET /lifo-pop, GET /fifo-pop".to_string()),
        )),
    )
}
