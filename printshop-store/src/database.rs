use async_trait::async_trait;
use printshop_core::repository::{SettingsProvider, StoreResult};
use printshop_shared::ShopSettings;
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    pub async fn new(connection_string: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(connection_string)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&self.pool)
            .await?;
        info!("Migrations completed successfully.");
        Ok(())
    }

    /// Shop settings from the `shop_settings` table layered over `defaults`.
    pub async fn fetch_shop_settings(&self, defaults: ShopSettings) -> Result<ShopSettings, sqlx::Error> {
        let rows: Vec<(String, Value)> =
            sqlx::query_as("SELECT setting_key, setting_value FROM shop_settings")
                .fetch_all(&self.pool)
                .await?;

        Ok(apply_settings_rows(defaults, rows))
    }
}

/// Rows are `{"value": ...}` objects; unknown keys and unreadable values are ignored.
pub(crate) fn apply_settings_rows(defaults: ShopSettings, rows: Vec<(String, Value)>) -> ShopSettings {
    let mut settings = defaults;

    for (key, raw) in rows {
        let Some(v) = raw.get("value") else {
            continue;
        };
        match key.as_str() {
            "vat_rate" => match decimal_from_json(v) {
                Some(rate) if rate >= Decimal::ZERO => settings.vat_rate = rate,
                _ => warn!("Ignoring unreadable vat_rate setting: {}", v),
            },
            "prices_include_vat" => {
                if let Some(b) = v.as_bool() {
                    settings.prices_include_vat = b;
                }
            }
            _ => {}
        }
    }

    settings
}

fn decimal_from_json(v: &Value) -> Option<Decimal> {
    match v {
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

/// Reads shop settings from Postgres on every call, so edits apply to the next quote.
pub struct DbSettingsProvider {
    db: DbClient,
    defaults: ShopSettings,
}

impl DbSettingsProvider {
    pub fn new(db: DbClient, defaults: ShopSettings) -> Self {
        Self { db, defaults }
    }
}

#[async_trait]
impl SettingsProvider for DbSettingsProvider {
    async fn shop_settings(&self) -> StoreResult<ShopSettings> {
        Ok(self.db.fetch_shop_settings(self.defaults.clone()).await?)
    }
}
