pub mod app_config;
pub mod database;
pub mod legacy;
pub mod memory;
pub mod pricing_repo;
pub mod redis_repo;

pub use database::{DbClient, DbSettingsProvider};
pub use memory::InMemoryStore;
pub use pricing_repo::StorePricingRepository;
pub use redis_repo::{RedisClient, RedisDatasetCache};
