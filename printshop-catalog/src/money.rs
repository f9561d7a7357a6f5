use printshop_core::{PricingError, PricingResult};
use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places of every amount leaving the engine
pub const MONEY_SCALE: u32 = 2;

/// Half away from zero, the invoicing convention. The result always carries
/// exactly two decimal places, so `30` serializes as `"30.00"`.
pub fn round_money(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}

pub(crate) fn overflow(what: &str) -> PricingError {
    PricingError::InvalidSelection(format!("{} is out of the representable range", what))
}

pub(crate) fn mul(a: Decimal, b: Decimal, what: &str) -> PricingResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| overflow(what))
}

pub(crate) fn div(a: Decimal, b: Decimal, what: &str) -> PricingResult<Decimal> {
    a.checked_div(b).ok_or_else(|| overflow(what))
}

pub(crate) fn add(a: Decimal, b: Decimal, what: &str) -> PricingResult<Decimal> {
    a.checked_add(b).ok_or_else(|| overflow(what))
}

pub(crate) fn sub(a: Decimal, b: Decimal, what: &str) -> PricingResult<Decimal> {
    a.checked_sub(b).ok_or_else(|| overflow(what))
}

/// Applies the production-speed surcharge, then the user discount.
/// The result is not rounded.
pub fn apply_adjustments(
    raw_total: Decimal,
    production_speed_percent: Decimal,
    user_discount_percent: Decimal,
) -> PricingResult<Decimal> {
    let surcharge = add(
        Decimal::ONE,
        div(production_speed_percent, Decimal::ONE_HUNDRED, "production speed surcharge")?,
        "production speed surcharge",
    )?;
    let surcharged = mul(raw_total, surcharge, "surcharged total")?;

    let discount = sub(
        Decimal::ONE,
        div(user_discount_percent, Decimal::ONE_HUNDRED, "user discount")?,
        "user discount",
    )?;
    mul(surcharged, discount, "discounted total")
}
