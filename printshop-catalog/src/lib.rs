pub mod cache;
pub mod composer;
pub mod dataset;
pub mod engine;
pub mod fixed;
pub mod matrix;
pub mod money;
pub mod resolver;
pub mod validation;

pub use cache::InMemoryDatasetCache;
pub use composer::{compose_quote, split_vat, VatSplit};
pub use dataset::{attrs_key_for, build_dataset, RawPricingData};
pub use engine::{BatchQuote, PricingEngine, QuoteRequest, QuoteTotals};
pub use fixed::calculate_fixed_total;
pub use matrix::{calculate_matrix_total, measure_value, PricedTotal};
pub use resolver::{resolve_price, ResolveOptions};
