use super::attrs_key::AttrsKey;
use super::pricing::PricingModel;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// attrsKey -> breakpoint -> total price
pub type PriceTable = BTreeMap<AttrsKey, BTreeMap<i64, Decimal>>;

/// One validated pricing model together with its price table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDataset {
    pub model: PricingModel,
    /// Strictly ascending
    pub breakpoints: Vec<i64>,
    pub price_table: PriceTable,
}

/// Everything the calculator needs for one product, ordered BASE first
/// and then FINISHING models by sort order. Only active models are kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculatorDataset {
    pub product_id: Uuid,
    pub models: Vec<ModelDataset>,
    pub built_at: DateTime<Utc>,
}

impl CalculatorDataset {
    pub fn empty(product_id: Uuid) -> Self {
        Self {
            product_id,
            models: Vec::new(),
            built_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
