use crate::matrix::{finish, PricedTotal};
use crate::money::mul;
use printshop_core::PricingResult;
use printshop_shared::{PricingPath, Product, Selection};
use rust_decimal::Decimal;

/// Total for a FIXED product: unit price times quantity, then the same
/// surcharge and discount a matrix total gets.
pub fn calculate_fixed_total(product: &Product, selection: &Selection) -> PricingResult<PricedTotal> {
    let raw_total = mul(product.unit_price(), Decimal::from(selection.quantity), "fixed total")?;
    finish(raw_total, PricingPath::Fixed, Vec::new(), selection)
}
