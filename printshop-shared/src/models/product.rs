use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a product's unit price is determined
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceType {
    Fixed,
    Matrix,
}

impl PriceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceType::Fixed => "FIXED",
            PriceType::Matrix => "MATRIX",
        }
    }
}

impl std::str::FromStr for PriceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "FIXED" => Ok(PriceType::Fixed),
            "MATRIX" => Ok(PriceType::Matrix),
            other => Err(format!("unknown price type: {}", other)),
        }
    }
}

/// Catalog product as seen by the pricing engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price_type: PriceType,
    /// Base unit net price
    pub price_from: Decimal,
    /// Promotional unit net price, wins over `price_from` when present
    pub price_after_discount_from: Option<Decimal>,
    /// Reference id in the legacy shop
    pub legacy_id: Option<i64>,
    pub is_active: bool,
}

impl Product {
    /// Unit net price used by fixed pricing and by the matrix fallback
    pub fn unit_price(&self) -> Decimal {
        self.price_after_discount_from.unwrap_or(self.price_from)
    }
}
