use printshop_core::{PricingError, PricingResult};
use printshop_shared::Selection;
use rust_decimal::Decimal;

/// Rejects selections no pricing path can honour.
pub fn validate_selection(selection: &Selection) -> PricingResult<()> {
    if selection.quantity == 0 {
        return Err(PricingError::InvalidSelection(
            "quantity must be a positive integer".to_string(),
        ));
    }

    for (name, value) in [("width", selection.width), ("height", selection.height)] {
        if let Some(v) = value {
            if v <= Decimal::ZERO {
                return Err(PricingError::InvalidSelection(format!(
                    "{} must be positive, got {}",
                    name, v
                )));
            }
        }
    }

    if selection.production_speed_percent < Decimal::ZERO {
        return Err(PricingError::InvalidSelection(format!(
            "production speed surcharge must not be negative, got {}",
            selection.production_speed_percent
        )));
    }

    let discount = selection.user_discount_percent;
    if discount < Decimal::ZERO || discount > Decimal::ONE_HUNDRED {
        return Err(PricingError::InvalidSelection(format!(
            "user discount must be within 0..=100, got {}",
            discount
        )));
    }

    Ok(())
}
