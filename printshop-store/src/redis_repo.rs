use async_trait::async_trait;
use printshop_core::repository::{CacheLookup, DatasetCache, StoreResult};
use printshop_shared::CalculatorDataset;
use redis::RedisResult;
use tracing::debug;
use uuid::Uuid;

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

impl RedisClient {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    /// Reads a dataset payload and its generation counter in one round trip.
    pub async fn get_versioned(&self, key: &str, generation_key: &str) -> RedisResult<(Option<String>, Option<u64>)> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("MGET")
            .arg(key)
            .arg(generation_key)
            .query_async(&mut conn)
            .await
    }

    /// Writes `value` only while `generation_key` still holds `generation`.
    pub async fn set_if_generation(
        &self,
        key: &str,
        generation_key: &str,
        generation: u64,
        value: &str,
        ttl_seconds: Option<u64>,
    ) -> RedisResult<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        // A missing counter means nothing was invalidated yet.
        let script = redis::Script::new(r#"
            local current = tonumber(redis.call("GET", KEYS[2]) or "0")
            if current ~= tonumber(ARGV[1]) then
                return 0
            end
            if ARGV[3] == "" then
                redis.call("SET", KEYS[1], ARGV[2])
            else
                redis.call("SET", KEYS[1], ARGV[2], "EX", ARGV[3])
            end
            return 1
        "#);

        let ttl = ttl_seconds.map(|t| t.to_string()).unwrap_or_default();
        let stored: i64 = script
            .key(key)
            .key(generation_key)
            .arg(generation)
            .arg(value)
            .arg(ttl)
            .invoke_async(&mut conn)
            .await?;
        Ok(stored == 1)
    }

    /// Deletes `key` and bumps `generation_key` atomically.
    pub async fn delete_and_bump(&self, key: &str, generation_key: &str) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        redis::pipe()
            .atomic()
            .del(key)
            .ignore()
            .incr(generation_key, 1)
            .ignore()
            .query_async(&mut conn)
            .await
    }
}

pub fn dataset_key(product_id: Uuid) -> String {
    format!("pricing:dataset:{}", product_id)
}

pub fn generation_key(product_id: Uuid) -> String {
    format!("pricing:dataset:{}:generation", product_id)
}

pub(crate) fn encode_dataset(dataset: &CalculatorDataset) -> Result<String, serde_json::Error> {
    serde_json::to_string(dataset)
}

/// `None` for payloads written by an older build or under the wrong key;
/// the caller rebuilds from the store.
pub(crate) fn decode_dataset(raw: &str, product_id: Uuid) -> Option<CalculatorDataset> {
    match serde_json::from_str::<CalculatorDataset>(raw) {
        Ok(dataset) if dataset.product_id == product_id => Some(dataset),
        Ok(dataset) => {
            debug!(
                "Discarding cached dataset of product {} stored under {}",
                dataset.product_id, product_id
            );
            None
        }
        Err(e) => {
            debug!("Discarding unreadable cached dataset for {}: {}", product_id, e);
            None
        }
    }
}

/// Calculator datasets stored as JSON, shared across API replicas.
pub struct RedisDatasetCache {
    client: RedisClient,
    ttl_seconds: Option<u64>,
}

impl RedisDatasetCache {
    pub fn new(client: RedisClient, ttl_seconds: Option<u64>) -> Self {
        Self { client, ttl_seconds: ttl_seconds.filter(|s| *s > 0) }
    }
}

#[async_trait]
impl DatasetCache for RedisDatasetCache {
    async fn get(&self, product_id: Uuid) -> StoreResult<CacheLookup> {
        let (raw, generation) = self
            .client
            .get_versioned(&dataset_key(product_id), &generation_key(product_id))
            .await?;

        Ok(CacheLookup {
            dataset: raw.and_then(|raw| decode_dataset(&raw, product_id)),
            generation: generation.unwrap_or(0),
        })
    }

    async fn set(&self, dataset: &CalculatorDataset, generation: u64) -> StoreResult<bool> {
        let payload = encode_dataset(dataset)?;
        let stored = self
            .client
            .set_if_generation(
                &dataset_key(dataset.product_id),
                &generation_key(dataset.product_id),
                generation,
                &payload,
                self.ttl_seconds,
            )
            .await?;
        Ok(stored)
    }

    async fn invalidate(&self, product_id: Uuid) -> StoreResult<()> {
        self.client
            .delete_and_bump(&dataset_key(product_id), &generation_key(product_id))
            .await?;
        Ok(())
    }
}
