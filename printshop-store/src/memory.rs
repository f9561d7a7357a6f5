//! In-process store used by tests and local demos. Holds the same data the
//! Postgres tables do and can be seeded from a JSON fixture.

use async_trait::async_trait;
use printshop_core::repository::{PricingModelStore, ProductRepository, StoreResult};
use printshop_shared::{AttributeId, AttributeTerm, PricingEntry, PricingModel, Product};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    products: HashMap<Uuid, Product>,
    models: Vec<PricingModel>,
    entries: HashMap<Uuid, Vec<PricingEntry>>,
    terms: HashMap<AttributeId, Vec<AttributeTerm>>,
}

/// Seed data in the shape of the database tables
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Fixture {
    pub products: Vec<Product>,
    pub models: Vec<PricingModel>,
    pub entries: Vec<PricingEntry>,
    pub terms: HashMap<AttributeId, Vec<AttributeTerm>>,
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fixture(fixture: Fixture) -> Self {
        let store = Self::new();
        for product in fixture.products {
            store.insert_product(product);
        }
        for model in fixture.models {
            store.insert_model(model);
        }
        for entry in fixture.entries {
            store.insert_entry(entry);
        }
        for (dimension_id, terms) in fixture.terms {
            store.set_terms(dimension_id, terms);
        }
        store
    }

    pub fn from_fixture_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::from_fixture(serde_json::from_str(json)?))
    }

    // A panic while holding the lock cannot leave the maps half-written,
    // so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn insert_product(&self, product: Product) {
        self.write().products.insert(product.id, product);
    }

    /// Inserts or replaces a model by id
    pub fn insert_model(&self, model: PricingModel) {
        let mut tables = self.write();
        tables.models.retain(|m| m.id != model.id);
        tables.models.push(model);
    }

    pub fn insert_entry(&self, entry: PricingEntry) {
        self.write().entries.entry(entry.model_id).or_default().push(entry);
    }

    pub fn replace_entries(&self, model_id: Uuid, entries: Vec<PricingEntry>) {
        self.write().entries.insert(model_id, entries);
    }

    pub fn set_terms(&self, dimension_id: AttributeId, terms: Vec<AttributeTerm>) {
        self.write().terms.insert(dimension_id, terms);
    }
}

#[async_trait]
impl ProductRepository for InMemoryStore {
    async fn get_product(&self, id: Uuid) -> StoreResult<Option<Product>> {
        Ok(self.read().products.get(&id).cloned())
    }
}

#[async_trait]
impl PricingModelStore for InMemoryStore {
    async fn load_pricing_models(&self, product_id: Uuid) -> StoreResult<Vec<PricingModel>> {
        let mut models: Vec<PricingModel> = self
            .read()
            .models
            .iter()
            .filter(|m| m.product_id == product_id)
            .cloned()
            .collect();
        models.sort_by_key(|m| m.sort_order);
        Ok(models)
    }

    async fn load_pricing_entries(&self, model_id: Uuid) -> StoreResult<Vec<PricingEntry>> {
        Ok(self.read().entries.get(&model_id).cloned().unwrap_or_default())
    }

    async fn load_attribute_terms(
        &self,
        dimension_ids: &[AttributeId],
    ) -> StoreResult<HashMap<AttributeId, Vec<AttributeTerm>>> {
        let tables = self.read();
        Ok(dimension_ids
            .iter()
            .filter_map(|id| tables.terms.get(id).map(|terms| (*id, terms.clone())))
            .collect())
    }
}
