use crate::composer::compose_quote;
use crate::dataset::{build_dataset, RawPricingData};
use crate::fixed::calculate_fixed_total;
use crate::matrix::calculate_matrix_total;
use crate::money::add;
use crate::validation::validate_selection;
use printshop_core::repository::{
    CacheLookup, DatasetCache, PricingModelStore, ProductRepository, SettingsProvider,
};
use printshop_core::{PricingError, PricingResult};
use printshop_shared::{
    AttributeId, AudienceContext, CalculatorDataset, PriceQuote, PriceType, PricingPath, Selection, CURRENCY,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// One line of a batch quote request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub product_id: Uuid,
    pub selection: Selection,
    #[serde(default)]
    pub audience: AudienceContext,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuoteTotals {
    pub net: Decimal,
    pub vat_amount: Decimal,
    pub gross: Decimal,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchQuote {
    pub items: Vec<PriceQuote>,
    pub totals: QuoteTotals,
}

/// Single entry point for pricing a configured product.
///
/// Holds no mutable state of its own; share it behind an `Arc` and call it
/// concurrently. Quotes are never stored, callers finalizing a payment must
/// calculate again instead of trusting an earlier quote.
pub struct PricingEngine {
    products: Arc<dyn ProductRepository>,
    models: Arc<dyn PricingModelStore>,
    settings: Arc<dyn SettingsProvider>,
    cache: Arc<dyn DatasetCache>,
}

impl PricingEngine {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        models: Arc<dyn PricingModelStore>,
        settings: Arc<dyn SettingsProvider>,
        cache: Arc<dyn DatasetCache>,
    ) -> Self {
        Self {
            products,
            models,
            settings,
            cache,
        }
    }

    pub async fn calculate(
        &self,
        product_id: Uuid,
        selection: &Selection,
        audience: &AudienceContext,
    ) -> PricingResult<PriceQuote> {
        let product = self
            .products
            .get_product(product_id)
            .await
            .map_err(store_error)?
            .ok_or(PricingError::NotFound(product_id))?;

        validate_selection(selection)?;

        let total = match product.price_type {
            PriceType::Fixed => calculate_fixed_total(&product, selection)?,
            PriceType::Matrix => {
                let dataset = self.dataset(product_id).await?;
                calculate_matrix_total(&dataset, &product, selection)?
            }
        };

        if total.path == PricingPath::UnitFallback {
            warn!(
                "No matrix price for product {} (legacy id {:?}), falling back to unit price",
                product_id, product.legacy_id
            );
        }

        let settings = self.settings.shop_settings().await.map_err(store_error)?;
        compose_quote(product_id, total, &settings, audience)
    }

    /// Prices every line; the first failing line fails the batch.
    pub async fn calculate_batch(&self, requests: &[QuoteRequest]) -> PricingResult<BatchQuote> {
        let mut items = Vec::with_capacity(requests.len());
        let mut totals = QuoteTotals {
            net: Decimal::ZERO,
            vat_amount: Decimal::ZERO,
            gross: Decimal::ZERO,
            currency: CURRENCY.to_string(),
        };

        for request in requests {
            let quote = self
                .calculate(request.product_id, &request.selection, &request.audience)
                .await?;
            totals.net = add(totals.net, quote.net, "batch net")?;
            totals.vat_amount = add(totals.vat_amount, quote.vat_amount, "batch VAT")?;
            totals.gross = add(totals.gross, quote.gross, "batch gross")?;
            items.push(quote);
        }

        Ok(BatchQuote { items, totals })
    }

    /// Drops the cached dataset of a product after its pricing was edited.
    pub async fn invalidate(&self, product_id: Uuid) -> PricingResult<()> {
        info!("Invalidating pricing dataset for product {}", product_id);
        self.cache
            .invalidate(product_id)
            .await
            .map_err(|e| PricingError::Cache(e.to_string()))
    }

    /// Cached dataset, built from the store on a miss. Cache failures are
    /// logged and bypassed.
    ///
    /// The built dataset is written back under the generation observed at
    /// the miss, so it is dropped if the product was invalidated meanwhile.
    pub async fn dataset(&self, product_id: Uuid) -> PricingResult<CalculatorDataset> {
        let generation = match self.cache.get(product_id).await {
            Ok(CacheLookup {
                dataset: Some(dataset),
                ..
            }) => return Ok(dataset),
            Ok(lookup) => Some(lookup.generation),
            Err(e) => {
                warn!("Dataset cache read failed for product {}: {}", product_id, e);
                None
            }
        };

        let dataset = self.load_dataset(product_id).await?;

        if let Some(generation) = generation {
            match self.cache.set(&dataset, generation).await {
                Ok(true) => {}
                Ok(false) => debug!(
                    "Pricing of product {} was invalidated while loading, not caching",
                    product_id
                ),
                Err(e) => warn!("Dataset cache write failed for product {}: {}", product_id, e),
            }
        }

        Ok(dataset)
    }

    async fn load_dataset(&self, product_id: Uuid) -> PricingResult<CalculatorDataset> {
        let models = self
            .models
            .load_pricing_models(product_id)
            .await
            .map_err(store_error)?;

        let mut entries = HashMap::new();
        for model in models.iter().filter(|m| m.is_active) {
            let rows = self
                .models
                .load_pricing_entries(model.id)
                .await
                .map_err(store_error)?;
            entries.insert(model.id, rows);
        }

        let mut dimension_ids: Vec<AttributeId> = models
            .iter()
            .filter(|m| m.is_active)
            .flat_map(|m| m.attribute_selectors.iter())
            .filter(|s| s.terms.is_empty())
            .map(|s| s.dimension_id)
            .collect();
        dimension_ids.sort_unstable();
        dimension_ids.dedup();

        let terms = if dimension_ids.is_empty() {
            HashMap::new()
        } else {
            self.models
                .load_attribute_terms(&dimension_ids)
                .await
                .map_err(store_error)?
        };

        let dataset = build_dataset(
            product_id,
            RawPricingData {
                models,
                entries,
                terms,
            },
        )?;

        info!(
            "Built pricing dataset for product {} with {} active models",
            product_id,
            dataset.models.len()
        );
        Ok(dataset)
    }
}

fn store_error(e: Box<dyn std::error::Error + Send + Sync>) -> PricingError {
    PricingError::Store(e.to_string())
}
