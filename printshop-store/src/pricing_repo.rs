use crate::legacy::parse_legacy_attributes;
use async_trait::async_trait;
use printshop_core::repository::{PricingModelStore, ProductRepository, StoreError, StoreResult};
use printshop_shared::{
    AttributeId, AttributeSelector, AttributeTerm, PricingEntry, PricingModel, Product,
};
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

/// Postgres-backed product and pricing-model reads
#[derive(Clone)]
pub struct StorePricingRepository {
    pool: PgPool,
}

impl StorePricingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    price_type: String,
    price_from: Decimal,
    price_after_discount_from: Option<Decimal>,
    legacy_id: Option<i64>,
    is_active: bool,
}

impl TryFrom<ProductRow> for Product {
    type Error = StoreError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Product {
            id: row.id,
            name: row.name,
            price_type: row.price_type.parse()?,
            price_from: row.price_from,
            price_after_discount_from: row.price_after_discount_from,
            legacy_id: row.legacy_id,
            is_active: row.is_active,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ModelRow {
    id: Uuid,
    product_id: Uuid,
    kind: String,
    title: String,
    breakpoints: Vec<i64>,
    num_type: String,
    unit_scale: Decimal,
    attribute_selectors: Option<Value>,
    legacy_attributes: Option<String>,
    scale_below_min: Option<bool>,
    scale_above_max: Option<bool>,
    default_quantity: Option<i32>,
    sort_order: i32,
    is_active: bool,
}

impl TryFrom<ModelRow> for PricingModel {
    type Error = StoreError;

    fn try_from(row: ModelRow) -> Result<Self, Self::Error> {
        let attribute_selectors = decode_selectors(row.attribute_selectors, row.legacy_attributes.as_deref())
            .map_err(|e| format!("pricing model {}: {}", row.id, e))?;

        Ok(PricingModel {
            id: row.id,
            product_id: row.product_id,
            kind: row.kind.parse()?,
            title: row.title,
            breakpoints: row.breakpoints,
            num_type: row.num_type.parse()?,
            unit_scale: row.unit_scale,
            attribute_selectors,
            scale_below_min: row.scale_below_min,
            scale_above_max: row.scale_above_max,
            default_quantity: row.default_quantity,
            sort_order: row.sort_order,
            is_active: row.is_active,
        })
    }
}

/// JSON selectors win; rows imported from the legacy shop only carry the
/// serialized attribute blob.
fn decode_selectors(json: Option<Value>, legacy: Option<&str>) -> StoreResult<Vec<AttributeSelector>> {
    match (json, legacy) {
        (Some(Value::Null), Some(raw)) | (None, Some(raw)) if !raw.trim().is_empty() => {
            Ok(parse_legacy_attributes(raw)?)
        }
        (Some(Value::Null), _) | (None, _) => Ok(Vec::new()),
        (Some(value), _) => Ok(serde_json::from_value(value)?),
    }
}

#[derive(sqlx::FromRow)]
struct EntryRow {
    id: Uuid,
    model_id: Uuid,
    attrs_key: String,
    breakpoint: i64,
    price: Decimal,
}

impl From<EntryRow> for PricingEntry {
    fn from(row: EntryRow) -> Self {
        PricingEntry {
            id: row.id,
            model_id: row.model_id,
            attrs_key: row.attrs_key,
            breakpoint: row.breakpoint,
            price: row.price,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TermRow {
    dimension_id: i64,
    term_key: String,
    term_value: String,
}

#[async_trait]
impl ProductRepository for StorePricingRepository {
    async fn get_product(&self, id: Uuid) -> StoreResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, price_type, price_from, price_after_discount_from, legacy_id, is_active
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }
}

#[async_trait]
impl PricingModelStore for StorePricingRepository {
    async fn load_pricing_models(&self, product_id: Uuid) -> StoreResult<Vec<PricingModel>> {
        let rows = sqlx::query_as::<_, ModelRow>(
            r#"
            SELECT id, product_id, kind, title, breakpoints, num_type, unit_scale,
                   attribute_selectors, legacy_attributes, scale_below_min, scale_above_max,
                   default_quantity, sort_order, is_active
            FROM pricing_models
            WHERE product_id = $1
            ORDER BY sort_order, created_at
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PricingModel::try_from).collect()
    }

    async fn load_pricing_entries(&self, model_id: Uuid) -> StoreResult<Vec<PricingEntry>> {
        let rows = sqlx::query_as::<_, EntryRow>(
            r#"
            SELECT id, model_id, attrs_key, breakpoint, price
            FROM pricing_entries
            WHERE model_id = $1
            ORDER BY attrs_key, breakpoint
            "#,
        )
        .bind(model_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PricingEntry::from).collect())
    }

    async fn load_attribute_terms(
        &self,
        dimension_ids: &[AttributeId],
    ) -> StoreResult<HashMap<AttributeId, Vec<AttributeTerm>>> {
        if dimension_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, TermRow>(
            r#"
            SELECT dimension_id, term_key, term_value
            FROM attribute_terms
            WHERE dimension_id = ANY($1)
            ORDER BY dimension_id, sort_order, term_key
            "#,
        )
        .bind(dimension_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut terms: HashMap<AttributeId, Vec<AttributeTerm>> = HashMap::new();
        for row in rows {
            terms.entry(row.dimension_id).or_default().push(AttributeTerm {
                key: row.term_key,
                value: row.term_value,
            });
        }
        Ok(terms)
    }
}
