//! VAT split and quote assembly.

use crate::matrix::PricedTotal;
use crate::money::{add, div, mul, round_money, sub};
use printshop_core::{PricingError, PricingResult};
use printshop_shared::{AudienceContext, PriceBreakdown, PriceQuote, ShopSettings, CURRENCY};
use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VatSplit {
    pub net: Decimal,
    pub vat_amount: Decimal,
    pub gross: Decimal,
}

/// Splits `amount` into net, VAT and gross.
///
/// With `prices_include_vat` the amount is taken as gross. All three figures
/// are rounded independently after the split.
pub fn split_vat(amount: Decimal, settings: &ShopSettings) -> PricingResult<VatSplit> {
    if settings.vat_rate < Decimal::ZERO {
        return Err(PricingError::Store(format!(
            "shop settings carry a negative VAT rate {}",
            settings.vat_rate
        )));
    }

    let factor = add(Decimal::ONE, settings.vat_rate, "VAT factor")?;
    let (net, gross) = if settings.prices_include_vat {
        (div(amount, factor, "net amount")?, amount)
    } else {
        (amount, mul(amount, factor, "gross amount")?)
    };
    let vat_amount = sub(gross, net, "VAT amount")?;

    Ok(VatSplit {
        net: round_money(net),
        vat_amount: round_money(vat_amount),
        gross: round_money(gross),
    })
}

/// Builds the quote for a priced line. Audience is recorded, never priced.
pub fn compose_quote(
    product_id: Uuid,
    total: PricedTotal,
    settings: &ShopSettings,
    audience: &AudienceContext,
) -> PricingResult<PriceQuote> {
    let split = split_vat(total.amount, settings)?;

    Ok(PriceQuote {
        product_id,
        net: split.net,
        vat_amount: split.vat_amount,
        gross: split.gross,
        currency: CURRENCY.to_string(),
        breakdown: PriceBreakdown {
            audience: audience.audience,
            source: audience.source.clone(),
            vat_rate: settings.vat_rate,
            prices_include_vat: settings.prices_include_vat,
            pricing_path: total.path,
            amount: total.amount,
            components: total.components,
        },
        quoted_at: chrono::Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use printshop_shared::{Audience, PricingPath};
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn settings(vat: &str, include: bool) -> ShopSettings {
        ShopSettings {
            vat_rate: d(vat),
            prices_include_vat: include,
        }
    }

    #[test]
    fn test_vat_added_on_top() {
        let split = split_vat(d("30"), &settings("0.2", false)).unwrap();
        assert_eq!(split.net, d("30"));
        assert_eq!(split.vat_amount, d("6"));
        assert_eq!(split.gross, d("36"));
    }

    #[test]
    fn test_vat_extracted_from_gross() {
        let split = split_vat(d("12"), &settings("0.2", true)).unwrap();
        assert_eq!(split.net, d("10"));
        assert_eq!(split.vat_amount, d("2"));
        assert_eq!(split.gross, d("12"));
    }

    #[test]
    fn test_rounds_after_split() {
        // 9.99 / 1.2 = 8.325 -> 8.33, VAT 1.665 -> 1.67
        let split = split_vat(d("9.99"), &settings("0.2", true)).unwrap();
        assert_eq!(split.net, d("8.33"));
        assert_eq!(split.vat_amount, d("1.67"));
        assert_eq!(split.gross, d("9.99"));
    }

    #[test]
    fn test_net_gross_round_trip() {
        let exclusive = settings("0.23", false);
        let inclusive = settings("0.23", true);
        for cents in [1_i64, 99, 1234, 50_000, 123_457, 9_999_999] {
            let net = Decimal::new(cents, 2);
            let gross = split_vat(net, &exclusive).unwrap().gross;
            let back = split_vat(gross, &inclusive).unwrap().net;
            assert!((back - net).abs() <= d("0.01"), "{} -> {} -> {}", net, gross, back);
        }
    }

    #[test]
    fn test_negative_vat_rate_is_rejected() {
        assert!(split_vat(d("10"), &settings("-0.1", false)).is_err());
    }

    #[test]
    fn test_compose_records_audience_and_rate() {
        let total = PricedTotal {
            amount: d("30"),
            raw_total: d("30"),
            path: PricingPath::Fixed,
            components: Vec::new(),
        };
        let audience = AudienceContext {
            audience: Audience::B2b,
            source: "checkout".to_string(),
        };
        let quote = compose_quote(Uuid::nil(), total, &settings("0.2", false), &audience).unwrap();

        assert_eq!(quote.currency, "EUR");
        assert_eq!(quote.gross, d("36"));
        assert_eq!(quote.breakdown.audience, Audience::B2b);
        assert_eq!(quote.breakdown.source, "checkout");
        assert_eq!(quote.breakdown.vat_rate, d("0.2"));
        assert_eq!(quote.breakdown.pricing_path, PricingPath::Fixed);
    }
}
