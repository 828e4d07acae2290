//! In-memory laptop store.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::RwLock;
use tracing::debug;

use crate::context::CallContext;
use crate::error::{LaptopResult, StoreError, StoreResult};
use crate::models::{Filter, Laptop};
use crate::repository::LaptopStore;

/// Laptops keyed by id behind a reader/writer lock
///
/// `save` takes the write lock; `find` and `search` share the read lock.
/// The read lock is only held while matching records are copied out, so a
/// slow consumer never holds up writers.
#[derive(Debug, Default)]
pub struct InMemoryLaptopStore {
    data: RwLock<HashMap<String, Laptop>>,
}

impl InMemoryLaptopStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn collect_matches(&self, ctx: &CallContext, filter: &Filter) -> StoreResult<Vec<Laptop>> {
        let data = self.data.read()?;
        let mut matches = Vec::new();
        for laptop in data.values() {
            ctx.check().map_err(StoreError::Aborted)?;
            if filter.matches(laptop) {
                matches.push(laptop.clone());
            }
        }
        Ok(matches)
    }
}

impl LaptopStore for InMemoryLaptopStore {
    fn save(&self, laptop: &Laptop) -> StoreResult<()> {
        let mut data = self.data.write()?;
        match data.entry(laptop.id.clone()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists(laptop.id.clone())),
            Entry::Vacant(slot) => {
                slot.insert(laptop.clone());
                Ok(())
            }
        }
    }

    fn find(&self, id: &str) -> StoreResult<Option<Laptop>> {
        let data = self.data.read()?;
        Ok(data.get(id).cloned())
    }

    fn search(
        &self,
        ctx: &CallContext,
        filter: &Filter,
        emit: &mut dyn FnMut(Laptop) -> LaptopResult<()>,
    ) -> StoreResult<()> {
        let matches = self.collect_matches(ctx, filter)?;
        debug!(matches = matches.len(), "Collected search matches");

        for laptop in matches {
            ctx.check().map_err(StoreError::Aborted)?;
            emit(laptop).map_err(StoreError::Aborted)?;
        }
        Ok(())
    }

    fn count(&self) -> StoreResult<usize> {
        Ok(self.data.read()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LaptopError;
    use crate::models::{Memory, MemoryUnit};
    use crate::sample;
    use std::sync::Arc;

    fn open_filter() -> Filter {
        Filter {
            max_price_usd: f64::MAX,
            min_cpu_cores: 0,
            min_cpu_ghz: 0.0,
            min_ram: Memory::new(0, MemoryUnit::Bit),
        }
    }

    #[test]
    fn test_save_and_find_returns_copy() {
        let store = InMemoryLaptopStore::new();
        let laptop = sample::new_laptop();
        store.save(&laptop).unwrap();

        let mut found = store.find(&laptop.id).unwrap().unwrap();
        assert_eq!(found, laptop);

        found.brand = "Changed".to_string();
        found.cpu.number_cores = 99;
        assert_eq!(store.find(&laptop.id).unwrap().unwrap(), laptop);
    }

    #[test]
    fn test_find_missing() {
        let store = InMemoryLaptopStore::new();
        assert!(store.find("missing").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_save() {
        let store = InMemoryLaptopStore::new();
        let laptop = sample::new_laptop();
        store.save(&laptop).unwrap();

        let err = store.save(&laptop).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(id) if id == laptop.id));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_concurrent_saves_same_id_only_one_wins() {
        let store = Arc::new(InMemoryLaptopStore::new());
        let laptop = sample::new_laptop();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let laptop = laptop.clone();
                std::thread::spawn(move || store.save(&laptop).is_ok())
            })
            .collect();

        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(wins, 1);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_search_emits_every_match_once() {
        let store = InMemoryLaptopStore::new();
        for _ in 0..5 {
            store.save(&sample::new_laptop()).unwrap();
        }

        let mut seen = Vec::new();
        store
            .search(&CallContext::new(), &open_filter(), &mut |l| {
                seen.push(l.id);
                Ok(())
            })
            .unwrap();

        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 5);
    }

    #[test]
    fn test_search_stops_on_emit_error() {
        let store = InMemoryLaptopStore::new();
        for _ in 0..3 {
            store.save(&sample::new_laptop()).unwrap();
        }

        let mut calls = 0;
        let err = store
            .search(&CallContext::new(), &open_filter(), &mut |_| {
                calls += 1;
                Err(LaptopError::Unknown("stream closed".to_string()))
            })
            .unwrap_err();

        assert_eq!(calls, 1);
        assert!(matches!(err, StoreError::Aborted(LaptopError::Unknown(_))));
    }

    #[test]
    fn test_search_on_cancelled_context_emits_nothing() {
        let store = InMemoryLaptopStore::new();
        store.save(&sample::new_laptop()).unwrap();

        let ctx = CallContext::new();
        ctx.cancel();
        let err = store
            .search(&ctx, &open_filter(), &mut |_| panic!("must not emit"))
            .unwrap_err();
        assert!(matches!(err, StoreError::Aborted(LaptopError::Canceled)));
    }
}
