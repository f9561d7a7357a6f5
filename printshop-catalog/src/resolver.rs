//! Breakpoint price lookup with linear interpolation.

use crate::money::{add, div, mul, sub};
use printshop_core::PricingResult;
use printshop_shared::{AttrsKey, PriceTable};
use rust_decimal::Decimal;

/// Extrapolation policy outside the priced breakpoint range
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Scale the minimum price proportionally toward zero instead of clamping
    pub scale_below_min: bool,
    /// Scale the maximum price proportionally instead of clamping
    pub scale_above_max: bool,
}

/// Resolves the total price of `attrs_key` at `measure`.
///
/// Only breakpoints listed in `breakpoints` that carry an entry take part.
/// Returns `Ok(None)` when the key has no entries at all; errors only on
/// arithmetic overflow.
pub fn resolve_price(
    price_table: &PriceTable,
    attrs_key: &AttrsKey,
    measure: Decimal,
    breakpoints: &[i64],
    options: ResolveOptions,
) -> PricingResult<Option<Decimal>> {
    let row = match price_table.get(attrs_key) {
        Some(row) => row,
        None => return Ok(None),
    };

    let points: Vec<(Decimal, Decimal)> = breakpoints
        .iter()
        .filter_map(|bp| row.get(bp).map(|price| (Decimal::from(*bp), *price)))
        .collect();

    let (first, last) = match (points.first(), points.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Ok(None),
    };

    // index of the first priced breakpoint >= measure
    let idx = points.partition_point(|(bp, _)| *bp < measure);

    if let Some((bp, price)) = points.get(idx) {
        if *bp == measure {
            return Ok(Some(*price));
        }
    }

    if idx == 0 {
        let (min_bp, min_price) = first;
        if options.scale_below_min && min_bp > Decimal::ZERO {
            let scaled = div(mul(min_price, measure, "scaled price")?, min_bp, "scaled price")?;
            return Ok(Some(scaled));
        }
        return Ok(Some(min_price));
    }

    if idx == points.len() {
        let (max_bp, max_price) = last;
        if options.scale_above_max && max_bp > Decimal::ZERO {
            let scaled = div(mul(max_price, measure, "scaled price")?, max_bp, "scaled price")?;
            return Ok(Some(scaled));
        }
        return Ok(Some(max_price));
    }

    let (lower, price_lower) = points[idx - 1];
    let (upper, price_upper) = points[idx];
    let span = sub(upper, lower, "breakpoint span")?;
    let delta = mul(
        sub(price_upper, price_lower, "price delta")?,
        sub(measure, lower, "measure offset")?,
        "interpolated price",
    )?;

    Ok(Some(add(price_lower, div(delta, span, "interpolated price")?, "interpolated price")?))
}
