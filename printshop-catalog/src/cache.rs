use async_trait::async_trait;
use printshop_core::repository::{CacheLookup, DatasetCache, StoreResult};
use printshop_shared::CalculatorDataset;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

struct CachedDataset {
    dataset: CalculatorDataset,
    stored_at: Instant,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<Uuid, CachedDataset>,
    /// Invalidation count per product; absent means zero
    generations: HashMap<Uuid, u64>,
}

impl CacheState {
    fn generation(&self, product_id: Uuid) -> u64 {
        self.generations.get(&product_id).copied().unwrap_or(0)
    }
}

/// Process-local dataset cache. Entries live until invalidated, or until
/// `ttl` elapses when one is configured. Expired entries are evicted when
/// read and swept on every write.
pub struct InMemoryDatasetCache {
    state: RwLock<CacheState>,
    ttl: Option<Duration>,
}

impl InMemoryDatasetCache {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            state: RwLock::new(CacheState::default()),
            ttl,
        }
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    fn is_fresh(&self, cached: &CachedDataset) -> bool {
        match self.ttl {
            Some(ttl) => cached.stored_at.elapsed() < ttl,
            None => true,
        }
    }
}

impl Default for InMemoryDatasetCache {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl DatasetCache for InMemoryDatasetCache {
    async fn get(&self, product_id: Uuid) -> StoreResult<CacheLookup> {
        {
            let state = self.state.read().await;
            let generation = state.generation(product_id);
            match state.entries.get(&product_id) {
                Some(cached) if self.is_fresh(cached) => {
                    return Ok(CacheLookup {
                        dataset: Some(cached.dataset.clone()),
                        generation,
                    })
                }
                None => return Ok(CacheLookup::miss(generation)),
                Some(_) => {}
            }
        }

        let mut state = self.state.write().await;
        if state
            .entries
            .get(&product_id)
            .is_some_and(|cached| !self.is_fresh(cached))
        {
            state.entries.remove(&product_id);
        }
        Ok(CacheLookup::miss(state.generation(product_id)))
    }

    async fn set(&self, dataset: &CalculatorDataset, generation: u64) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        if let Some(ttl) = self.ttl {
            state.entries.retain(|_, cached| cached.stored_at.elapsed() < ttl);
        }

        if state.generation(dataset.product_id) != generation {
            return Ok(false);
        }

        state.entries.insert(
            dataset.product_id,
            CachedDataset {
                dataset: dataset.clone(),
                stored_at: Instant::now(),
            },
        );
        Ok(true)
    }

    async fn invalidate(&self, product_id: Uuid) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.entries.remove(&product_id);
        *state.generations.entry(product_id).or_insert(0) += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_invalidate() {
        let cache = InMemoryDatasetCache::default();
        let dataset = CalculatorDataset::empty(Uuid::new_v4());

        let lookup = cache.get(dataset.product_id).await.unwrap();
        assert!(lookup.dataset.is_none());
        assert!(cache.set(&dataset, lookup.generation).await.unwrap());
        assert!(cache.get(dataset.product_id).await.unwrap().dataset.is_some());
        assert_eq!(cache.len().await, 1);

        cache.invalidate(dataset.product_id).await.unwrap();
        let lookup = cache.get(dataset.product_id).await.unwrap();
        assert!(lookup.dataset.is_none());
        assert_eq!(lookup.generation, 1);
    }

    #[tokio::test]
    async fn test_set_after_invalidate_is_refused() {
        let cache = InMemoryDatasetCache::default();
        let dataset = CalculatorDataset::empty(Uuid::new_v4());

        let seen = cache.get(dataset.product_id).await.unwrap().generation;
        cache.invalidate(dataset.product_id).await.unwrap();

        assert!(!cache.set(&dataset, seen).await.unwrap());
        assert_eq!(cache.len().await, 0);

        let current = cache.get(dataset.product_id).await.unwrap().generation;
        assert!(cache.set(&dataset, current).await.unwrap());
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_generations_are_per_product() {
        let cache = InMemoryDatasetCache::default();
        let edited = Uuid::new_v4();
        let other = CalculatorDataset::empty(Uuid::new_v4());

        cache.invalidate(edited).await.unwrap();
        assert!(cache.set(&other, 0).await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_entries_are_not_served() {
        let cache = InMemoryDatasetCache::new(Some(Duration::from_millis(10)));
        let dataset = CalculatorDataset::empty(Uuid::new_v4());
        cache.set(&dataset, 0).await.unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(cache.get(dataset.product_id).await.unwrap().dataset.is_none());
    }

    #[tokio::test]
    async fn test_expired_entries_are_evicted() {
        let cache = InMemoryDatasetCache::new(Some(Duration::ZERO));
        let first = CalculatorDataset::empty(Uuid::new_v4());
        let second = CalculatorDataset::empty(Uuid::new_v4());

        cache.set(&first, 0).await.unwrap();
        // writing another product sweeps the expired one
        cache.set(&second, 0).await.unwrap();
        assert_eq!(cache.len().await, 1);

        // reading an expired entry removes it
        assert!(cache.get(second.product_id).await.unwrap().dataset.is_none());
        assert_eq!(cache.len().await, 0);
    }
}
