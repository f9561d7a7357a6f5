use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Router,
};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/v1/admin/products/{id}/pricing/invalidate",
        post(invalidate_pricing),
    )
}

/// POST /v1/admin/products/{id}/pricing/invalidate
///
/// Called by the admin tooling after it writes pricing models or entries.
async fn invalidate_pricing(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.engine.invalidate(product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
