use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of an attribute dimension (paper, finish, size...)
pub type AttributeId = i64;

/// Role of a pricing model within its product
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModelKind {
    /// Drives the primary price, exactly one per product
    Base,
    /// Optional additive surcharge (lamination, rounded corners...)
    Finishing,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Base => "BASE",
            ModelKind::Finishing => "FINISHING",
        }
    }
}

impl std::str::FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BASE" => Ok(ModelKind::Base),
            "FINISHING" => Ok(ModelKind::Finishing),
            other => Err(format!("unknown pricing model kind: {}", other)),
        }
    }
}

/// Formula producing the measure value looked up in a model's breakpoints
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NumType {
    FixedQuantity,
    Area,
    Perimeter,
    WidthTimesTwo,
}

impl NumType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NumType::FixedQuantity => "FIXED_QUANTITY",
            NumType::Area => "AREA",
            NumType::Perimeter => "PERIMETER",
            NumType::WidthTimesTwo => "WIDTH_TIMES_TWO",
        }
    }

    /// Whether the measure needs width/height from the selection
    pub fn is_dimensional(&self) -> bool {
        !matches!(self, NumType::FixedQuantity)
    }

    /// Quantity tables clamp small runs to the minimum price, physical
    /// metrics scale down proportionally.
    pub fn default_scale_below_min(&self) -> bool {
        self.is_dimensional()
    }

    pub fn default_scale_above_max(&self) -> bool {
        true
    }
}

impl std::str::FromStr for NumType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "FIXED_QUANTITY" | "QUANTITY" => Ok(NumType::FixedQuantity),
            "AREA" => Ok(NumType::Area),
            "PERIMETER" => Ok(NumType::Perimeter),
            "WIDTH_TIMES_TWO" => Ok(NumType::WidthTimesTwo),
            other => Err(format!("unknown num type: {}", other)),
        }
    }
}

/// One selectable term of an attribute dimension
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttributeTerm {
    pub key: String,
    pub value: String,
}

/// Attribute dimension a pricing model depends on
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttributeSelector {
    pub dimension_id: AttributeId,
    /// Candidate terms in display order
    #[serde(default)]
    pub terms: Vec<AttributeTerm>,
    /// Key of the term used when the caller selects nothing
    pub default_term: Option<String>,
}

impl AttributeSelector {
    pub fn new(dimension_id: AttributeId) -> Self {
        Self {
            dimension_id,
            terms: Vec::new(),
            default_term: None,
        }
    }

    /// Value of the declared default term, falling back to the first candidate.
    pub fn default_value(&self) -> Option<&str> {
        let declared = self
            .default_term
            .as_deref()
            .and_then(|key| self.terms.iter().find(|t| t.key == key));

        declared
            .or_else(|| self.terms.first())
            .map(|t| t.value.as_str())
    }
}

/// Breakpoint price table definition for one product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingModel {
    pub id: Uuid,
    pub product_id: Uuid,
    pub kind: ModelKind,
    pub title: String,
    /// Quantity or metric thresholds, strictly ascending
    pub breakpoints: Vec<i64>,
    pub num_type: NumType,
    /// Divisor converting the selection's area unit into the breakpoints' unit
    pub unit_scale: Decimal,
    pub attribute_selectors: Vec<AttributeSelector>,
    pub scale_below_min: Option<bool>,
    pub scale_above_max: Option<bool>,
    pub default_quantity: Option<i32>,
    pub sort_order: i32,
    pub is_active: bool,
}

impl PricingModel {
    pub fn scales_below_min(&self) -> bool {
        self.scale_below_min
            .unwrap_or_else(|| self.num_type.default_scale_below_min())
    }

    pub fn scales_above_max(&self) -> bool {
        self.scale_above_max
            .unwrap_or_else(|| self.num_type.default_scale_above_max())
    }
}

/// Raw price row: total price of one attribute combination at one breakpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingEntry {
    pub id: Uuid,
    pub model_id: Uuid,
    /// Encoded attribute combination, see [`crate::AttrsKey`]
    pub attrs_key: String,
    pub breakpoint: i64,
    pub price: Decimal,
}
