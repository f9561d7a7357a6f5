//! Matrix total: sums BASE and FINISHING contributions for one selection.

use crate::dataset::attrs_key_for;
use crate::money::{add, apply_adjustments, div, mul, round_money};
use crate::resolver::{resolve_price, ResolveOptions};
use printshop_core::{PricingError, PricingResult};
use printshop_shared::{
    CalculatorDataset, ModelDataset, ModelKind, NumType, PricingModel, PricingPath, Product,
    QuoteComponent, Selection,
};
use rust_decimal::Decimal;
use tracing::debug;

/// Pre-VAT amount of one product line
#[derive(Debug, Clone, PartialEq)]
pub struct PricedTotal {
    /// After surcharge and discount, rounded to cents
    pub amount: Decimal,
    /// Before surcharge and discount, unrounded
    pub raw_total: Decimal,
    pub path: PricingPath,
    pub components: Vec<QuoteComponent>,
}

/// Measure value of `model` for `selection`.
///
/// AREA divides `width * height` by the model's unit scale; the linear
/// metrics use the selection's dimensions as given.
pub fn measure_value(model: &PricingModel, selection: &Selection) -> PricingResult<Decimal> {
    match model.num_type {
        NumType::FixedQuantity => Ok(Decimal::from(selection.quantity)),
        NumType::Area => {
            let (width, height) = dimensions(model, selection)?;
            div(mul(width, height, "area")?, model.unit_scale, "area")
        }
        NumType::Perimeter => {
            let (width, height) = dimensions(model, selection)?;
            mul(Decimal::TWO, add(width, height, "perimeter")?, "perimeter")
        }
        NumType::WidthTimesTwo => {
            let width = selection.width.ok_or_else(|| missing_dimensions(model, "width"))?;
            mul(width, Decimal::TWO, "width")
        }
    }
}

fn dimensions(model: &PricingModel, selection: &Selection) -> PricingResult<(Decimal, Decimal)> {
    match (selection.width, selection.height) {
        (Some(w), Some(h)) => Ok((w, h)),
        _ => Err(missing_dimensions(model, "width and height")),
    }
}

fn missing_dimensions(model: &PricingModel, needed: &str) -> PricingError {
    PricingError::InvalidSelection(format!(
        "pricing model '{}' is priced by {} and needs {}",
        model.title,
        model.num_type.as_str(),
        needed
    ))
}

/// Resolves one model; `None` when its table has no price for the selection.
fn resolve_model(entry: &ModelDataset, selection: &Selection) -> PricingResult<Option<QuoteComponent>> {
    let model = &entry.model;
    let measure = measure_value(model, selection)?;

    let attrs_key = match attrs_key_for(model, selection) {
        Ok(Some(key)) => key,
        Ok(None) => return Ok(None),
        // No stored row can match a value that cannot be encoded; an optional
        // finishing simply has no price for it.
        Err(e) if model.kind == ModelKind::Finishing => {
            debug!("Model {} ({}) has no price for the selection: {}", model.id, model.title, e);
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    let options = ResolveOptions {
        scale_below_min: model.scales_below_min(),
        scale_above_max: model.scales_above_max(),
    };

    let amount = resolve_price(&entry.price_table, &attrs_key, measure, &entry.breakpoints, options)?;
    debug!(
        "Model {} ({}) key {:?} measure {} -> {:?}",
        model.id,
        model.kind.as_str(),
        attrs_key.encode(),
        measure,
        amount
    );

    Ok(amount.map(|amount| QuoteComponent {
        model_id: model.id,
        kind: model.kind,
        title: model.title.clone(),
        attrs_key,
        measure,
        amount,
    }))
}

/// Total for a MATRIX product.
///
/// Falls back to the product's unit price times quantity when the BASE model
/// is absent or cannot price the selection; FINISHING models are skipped in
/// that case. An unresolvable FINISHING model contributes nothing.
pub fn calculate_matrix_total(
    dataset: &CalculatorDataset,
    product: &Product,
    selection: &Selection,
) -> PricingResult<PricedTotal> {
    let base = dataset
        .models
        .iter()
        .find(|m| m.model.kind == ModelKind::Base);

    let base_component = match base {
        Some(base) => resolve_model(base, selection)?,
        None => None,
    };

    let base_component = match base_component {
        Some(component) => component,
        None => {
            let raw_total = mul(product.unit_price(), Decimal::from(selection.quantity), "unit price total")?;
            return finish(raw_total, PricingPath::UnitFallback, Vec::new(), selection);
        }
    };

    let mut raw_total = base_component.amount;
    let mut components = vec![base_component];

    for finishing in dataset
        .models
        .iter()
        .filter(|m| m.model.kind == ModelKind::Finishing)
    {
        if let Some(component) = resolve_model(finishing, selection)? {
            raw_total = add(raw_total, component.amount, "matrix total")?;
            components.push(component);
        }
    }

    finish(raw_total, PricingPath::Matrix, components, selection)
}

pub(crate) fn finish(
    raw_total: Decimal,
    path: PricingPath,
    components: Vec<QuoteComponent>,
    selection: &Selection,
) -> PricingResult<PricedTotal> {
    let adjusted = apply_adjustments(
        raw_total,
        selection.production_speed_percent,
        selection.user_discount_percent,
    )?;

    Ok(PricedTotal {
        amount: round_money(adjusted),
        raw_total,
        path,
        components,
    })
}
