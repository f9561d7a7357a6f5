use async_trait::async_trait;
use printshop_shared::{AttributeId, AttributeTerm, CalculatorDataset, PricingEntry, PricingModel, Product, ShopSettings};
use std::collections::HashMap;
use uuid::Uuid;

pub type StoreError = Box<dyn std::error::Error + Send + Sync>;
pub type StoreResult<T> = Result<T, StoreError>;

/// Repository trait for product lookups
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn get_product(&self, id: Uuid) -> StoreResult<Option<Product>>;
}

/// Read-only access to matrix pricing definitions.
///
/// A product without matrix configuration yields empty lists, never an error.
#[async_trait]
pub trait PricingModelStore: Send + Sync {
    async fn load_pricing_models(&self, product_id: Uuid) -> StoreResult<Vec<PricingModel>>;

    async fn load_pricing_entries(&self, model_id: Uuid) -> StoreResult<Vec<PricingEntry>>;

    /// Candidate terms per dimension, in display order. Unknown dimensions are omitted.
    async fn load_attribute_terms(
        &self,
        dimension_ids: &[AttributeId],
    ) -> StoreResult<HashMap<AttributeId, Vec<AttributeTerm>>>;
}

/// Source of the shop-wide VAT settings
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    async fn shop_settings(&self) -> StoreResult<ShopSettings>;
}

/// Result of a cache read. `generation` counts the invalidations seen for
/// the product so far; pass it back to [`DatasetCache::set`].
#[derive(Debug, Clone, Default)]
pub struct CacheLookup {
    pub dataset: Option<CalculatorDataset>,
    pub generation: u64,
}

impl CacheLookup {
    pub fn miss(generation: u64) -> Self {
        Self {
            dataset: None,
            generation,
        }
    }
}

/// Per-product cache of built calculator datasets.
///
/// A dataset built after a miss is only stored if the product was not
/// invalidated in between, so an admin edit made while a dataset was loading
/// can never be shadowed by the pre-edit data.
#[async_trait]
pub trait DatasetCache: Send + Sync {
    async fn get(&self, product_id: Uuid) -> StoreResult<CacheLookup>;

    /// Stores `dataset` if the product's generation still equals `generation`.
    /// Returns whether it was stored.
    async fn set(&self, dataset: &CalculatorDataset, generation: u64) -> StoreResult<bool>;

    /// Drops the dataset and advances the generation. Called after admin
    /// writes to a product's models or entries.
    async fn invalidate(&self, product_id: Uuid) -> StoreResult<()>;
}

/// Settings fixed at startup
#[derive(Debug, Clone)]
pub struct StaticSettingsProvider {
    settings: ShopSettings,
}

impl StaticSettingsProvider {
    pub fn new(settings: ShopSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl SettingsProvider for StaticSettingsProvider {
    async fn shop_settings(&self) -> StoreResult<ShopSettings> {
        Ok(self.settings.clone())
    }
}

/// Cache that never holds anything
#[derive(Debug, Clone, Default)]
pub struct NoopDatasetCache;

#[async_trait]
impl DatasetCache for NoopDatasetCache {
    async fn get(&self, _product_id: Uuid) -> StoreResult<CacheLookup> {
        Ok(CacheLookup::default())
    }

    async fn set(&self, _dataset: &CalculatorDataset, _generation: u64) -> StoreResult<bool> {
        Ok(false)
    }

    async fn invalidate(&self, _product_id: Uuid) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_static_settings() {
        let provider = StaticSettingsProvider::new(ShopSettings {
            vat_rate: Decimal::new(23, 2),
            prices_include_vat: true,
        });
        let settings = provider.shop_settings().await.unwrap();
        assert_eq!(settings.vat_rate, Decimal::new(23, 2));
        assert!(settings.prices_include_vat);
    }

    #[tokio::test]
    async fn test_noop_cache_never_hits() {
        let cache = NoopDatasetCache;
        let dataset = CalculatorDataset::empty(Uuid::new_v4());
        assert!(!cache.set(&dataset, 0).await.unwrap());
        assert!(cache.get(dataset.product_id).await.unwrap().dataset.is_none());
    }
}
