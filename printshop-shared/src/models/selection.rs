use super::pricing::AttributeId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Caller-supplied product configuration for one price calculation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub quantity: u32,
    pub width: Option<Decimal>,
    pub height: Option<Decimal>,
    /// Chosen terms per attribute dimension: dimension id -> {term key -> term value}
    #[serde(default)]
    pub selections: BTreeMap<AttributeId, BTreeMap<String, String>>,
    /// Expedited production uplift, applied before the discount
    #[serde(default)]
    pub production_speed_percent: Decimal,
    #[serde(default)]
    pub user_discount_percent: Decimal,
}

impl Selection {
    pub fn new(quantity: u32) -> Self {
        Self {
            quantity,
            width: None,
            height: None,
            selections: BTreeMap::new(),
            production_speed_percent: Decimal::ZERO,
            user_discount_percent: Decimal::ZERO,
        }
    }

    pub fn with_dimensions(mut self, width: Decimal, height: Decimal) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_term(mut self, dimension_id: AttributeId, key: &str, value: &str) -> Self {
        self.selections
            .entry(dimension_id)
            .or_default()
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_production_speed(mut self, percent: Decimal) -> Self {
        self.production_speed_percent = percent;
        self
    }

    pub fn with_discount(mut self, percent: Decimal) -> Self {
        self.user_discount_percent = percent;
        self
    }

    /// Term value chosen for a dimension. With several terms submitted for one
    /// dimension the lowest term key wins, so the result never depends on the
    /// order the caller built the map in.
    pub fn chosen_value(&self, dimension_id: AttributeId) -> Option<&str> {
        self.selections
            .get(&dimension_id)
            .and_then(|terms| terms.values().find(|v| !v.trim().is_empty()))
            .map(|v| v.trim())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    B2b,
    #[default]
    B2c,
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Audience::B2b => write!(f, "b2b"),
            Audience::B2c => write!(f, "b2c"),
        }
    }
}

/// Who is asking for the price; carried into the quote for reporting only
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AudienceContext {
    pub audience: Audience,
    #[serde(default = "default_source")]
    pub source: String,
}

fn default_source() -> String {
    "storefront".to_string()
}

impl Default for AudienceContext {
    fn default() -> Self {
        Self {
            audience: Audience::B2c,
            source: default_source(),
        }
    }
}
