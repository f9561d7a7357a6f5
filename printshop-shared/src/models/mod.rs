pub mod attrs_key;
pub mod dataset;
pub mod pricing;
pub mod product;
pub mod quote;
pub mod selection;

pub use attrs_key::{AttrsKey, AttrsKeyError};
pub use dataset::{CalculatorDataset, ModelDataset, PriceTable};
pub use pricing::{AttributeId, AttributeSelector, AttributeTerm, ModelKind, NumType, PricingEntry, PricingModel};
pub use product::{PriceType, Product};
pub use quote::{PriceBreakdown, PriceQuote, PricingPath, QuoteComponent, ShopSettings, CURRENCY};
pub use selection::{Audience, AudienceContext, Selection};
