use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use printshop_catalog::{BatchQuote, QuoteRequest};
use printshop_shared::{AudienceContext, PriceQuote, Selection};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QuoteBody {
    pub selection: Selection,
    #[serde(default)]
    pub audience: AudienceContext,
}

#[derive(Debug, Deserialize)]
pub struct BatchBody {
    pub items: Vec<QuoteRequest>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/products/{id}/quote", post(quote_product))
        .route("/v1/quotes/batch", post(quote_batch))
}

/// POST /v1/products/{id}/quote
async fn quote_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(body): Json<QuoteBody>,
) -> Result<Json<PriceQuote>, AppError> {
    let quote = state
        .engine
        .calculate(product_id, &body.selection, &body.audience)
        .await?;

    tracing::debug!(
        "Quoted product {} for {}: net {} gross {}",
        product_id,
        body.audience.audience,
        quote.net,
        quote.gross
    );
    Ok(Json(quote))
}

/// POST /v1/quotes/batch
async fn quote_batch(
    State(state): State<AppState>,
    Json(body): Json<BatchBody>,
) -> Result<Json<BatchQuote>, AppError> {
    let batch = state.engine.calculate_batch(&body.items).await?;
    Ok(Json(batch))
}
