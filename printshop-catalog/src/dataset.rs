//! Calculator dataset assembly from raw store rows.

use printshop_core::{PricingError, PricingResult};
use printshop_shared::{
    AttributeId, AttributeTerm, AttrsKey, CalculatorDataset, ModelDataset, ModelKind, PriceTable,
    PricingEntry, PricingModel, Selection,
};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};
use uuid::Uuid;

/// Rows fetched from the pricing model store for one product
#[derive(Debug, Clone, Default)]
pub struct RawPricingData {
    pub models: Vec<PricingModel>,
    pub entries: HashMap<Uuid, Vec<PricingEntry>>,
    pub terms: HashMap<AttributeId, Vec<AttributeTerm>>,
}

/// Validates raw rows and normalizes them into a [`CalculatorDataset`].
///
/// Inactive models are dropped. The BASE model comes first, FINISHING models
/// follow in sort order.
pub fn build_dataset(product_id: Uuid, raw: RawPricingData) -> PricingResult<CalculatorDataset> {
    let RawPricingData {
        models,
        mut entries,
        terms,
    } = raw;

    let mut built = Vec::new();
    for mut model in models.into_iter().filter(|m| m.is_active) {
        if model.product_id != product_id {
            return Err(corrupt(&model, format!("belongs to product {}", model.product_id)));
        }

        validate_breakpoints(&model)?;

        if model.unit_scale <= Decimal::ZERO {
            return Err(corrupt(&model, format!("unit scale must be positive, got {}", model.unit_scale)));
        }

        attach_terms(&mut model, &terms)?;

        let rows = entries.remove(&model.id).unwrap_or_default();
        let price_table = build_price_table(&model, rows)?;

        debug!(
            "Built pricing model {} ({}) with {} attribute combinations",
            model.id,
            model.kind.as_str(),
            price_table.len()
        );

        built.push(ModelDataset {
            breakpoints: model.breakpoints.clone(),
            model,
            price_table,
        });
    }

    let base_count = built.iter().filter(|m| m.model.kind == ModelKind::Base).count();
    if base_count > 1 {
        return Err(PricingError::CorruptPricingModel(format!(
            "product {} has {} active BASE models",
            product_id, base_count
        )));
    }

    built.sort_by_key(|m| {
        let rank = match m.model.kind {
            ModelKind::Base => 0,
            ModelKind::Finishing => 1,
        };
        (rank, m.model.sort_order)
    });

    Ok(CalculatorDataset {
        product_id,
        models: built,
        built_at: chrono::Utc::now(),
    })
}

/// Canonical key of the price row a selection points at within `model`.
///
/// Each declared dimension takes the caller's term value, or the model's
/// default when nothing was chosen. `None` when a dimension has neither.
pub fn attrs_key_for(model: &PricingModel, selection: &Selection) -> PricingResult<Option<AttrsKey>> {
    let mut pairs = Vec::with_capacity(model.attribute_selectors.len());
    for selector in &model.attribute_selectors {
        let value = selection
            .chosen_value(selector.dimension_id)
            .or_else(|| selector.default_value());
        match value {
            Some(v) => pairs.push((selector.dimension_id, v.to_string())),
            None => return Ok(None),
        }
    }

    AttrsKey::new(pairs)
        .map(Some)
        .map_err(|e| PricingError::InvalidSelection(e.to_string()))
}

fn corrupt(model: &PricingModel, reason: String) -> PricingError {
    PricingError::CorruptPricingModel(format!("model {} ({}): {}", model.id, model.title, reason))
}

fn validate_breakpoints(model: &PricingModel) -> PricingResult<()> {
    if let Some(negative) = model.breakpoints.iter().find(|bp| **bp < 0) {
        return Err(corrupt(model, format!("negative breakpoint {}", negative)));
    }
    if let Some(w) = model.breakpoints.windows(2).find(|w| w[0] >= w[1]) {
        return Err(corrupt(
            model,
            format!("breakpoints must be strictly increasing, found {} then {}", w[0], w[1]),
        ));
    }
    Ok(())
}

fn attach_terms(model: &mut PricingModel, terms: &HashMap<AttributeId, Vec<AttributeTerm>>) -> PricingResult<()> {
    let mut seen = HashSet::new();
    for selector in &model.attribute_selectors {
        if !seen.insert(selector.dimension_id) {
            return Err(corrupt(
                model,
                format!("attribute dimension {} declared twice", selector.dimension_id),
            ));
        }
    }

    for selector in model.attribute_selectors.iter_mut() {
        if selector.terms.is_empty() {
            if let Some(candidates) = terms.get(&selector.dimension_id) {
                selector.terms = candidates.clone();
            }
        }
    }
    Ok(())
}

fn build_price_table(model: &PricingModel, rows: Vec<PricingEntry>) -> PricingResult<PriceTable> {
    let declared: HashSet<i64> = model.breakpoints.iter().copied().collect();
    let mut table: PriceTable = BTreeMap::new();

    for entry in rows {
        if entry.model_id != model.id {
            return Err(corrupt(model, format!("entry {} belongs to model {}", entry.id, entry.model_id)));
        }

        let key = AttrsKey::parse(&entry.attrs_key)
            .map_err(|e| corrupt(model, format!("entry {}: {}", entry.id, e)))?;

        if entry.price < Decimal::ZERO {
            return Err(corrupt(model, format!("entry {} has negative price {}", entry.id, entry.price)));
        }

        if !declared.contains(&entry.breakpoint) {
            warn!(
                "Skipping entry {} of model {}: breakpoint {} is not declared",
                entry.id, model.id, entry.breakpoint
            );
            continue;
        }

        let row = table.entry(key).or_default();
        if row.insert(entry.breakpoint, entry.price).is_some() {
            return Err(corrupt(
                model,
                format!("duplicate entry for {:?} at breakpoint {}", entry.attrs_key, entry.breakpoint),
            ));
        }
    }

    Ok(table)
}
