pub mod repository;

use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    /// Unknown product id. The message is shown to shop customers as is.
    #[error("Produkt sa nenašiel.")]
    NotFound(Uuid),
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),
    #[error("Corrupt pricing model: {0}")]
    CorruptPricingModel(String),
    #[error("Pricing store failure: {0}")]
    Store(String),
    #[error("Pricing cache failure: {0}")]
    Cache(String),
}

pub type PricingResult<T> = Result<T, PricingError>;
