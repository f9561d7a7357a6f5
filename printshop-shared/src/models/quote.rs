use super::attrs_key::AttrsKey;
use super::pricing::ModelKind;
use super::selection::Audience;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const CURRENCY: &str = "EUR";

/// Shop-wide VAT configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShopSettings {
    /// Fraction, e.g. 0.2 for 20 %
    pub vat_rate: Decimal,
    /// Whether catalog and matrix prices are already gross
    pub prices_include_vat: bool,
}

impl Default for ShopSettings {
    fn default() -> Self {
        Self {
            vat_rate: Decimal::new(20, 2),
            prices_include_vat: false,
        }
    }
}

/// Which resolver produced the amount
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PricingPath {
    Fixed,
    Matrix,
    /// Matrix product whose base table had no usable price
    UnitFallback,
}

/// Contribution of one pricing model to a matrix total
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuoteComponent {
    pub model_id: Uuid,
    pub kind: ModelKind,
    pub title: String,
    pub attrs_key: AttrsKey,
    pub measure: Decimal,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub audience: Audience,
    pub source: String,
    pub vat_rate: Decimal,
    pub prices_include_vat: bool,
    pub pricing_path: PricingPath,
    /// Amount handed to the VAT split, after surcharge and discount
    pub amount: Decimal,
    #[serde(default)]
    pub components: Vec<QuoteComponent>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub product_id: Uuid,
    pub net: Decimal,
    pub vat_amount: Decimal,
    pub gross: Decimal,
    pub currency: String,
    pub breakdown: PriceBreakdown,
    pub quoted_at: DateTime<Utc>,
}
