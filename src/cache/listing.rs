//! By-query listing cache.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::traits::QueryKey;

/// In-memory mapping from a query key to an ordered, shared page of entities.
///
/// Pages are stored as snapshots behind an `Arc`: every hit hands out the same
/// allocation, and later changes to individual entities never reach a page
/// that is already cached.
pub struct ListingCache<T> {
  pages: Mutex<HashMap<String, Arc<Vec<T>>>>,
}

impl<T> ListingCache<T> {
  pub fn new() -> Self {
    Self {
      pages: Mutex::new(HashMap::new()),
    }
  }

  fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<Vec<T>>>> {
    self.pages.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Look up a page by raw key.
  pub fn get(&self, key: &str) -> Option<Arc<Vec<T>>> {
    self.lock().get(key).cloned()
  }

  pub fn contains(&self, key: &str) -> bool {
    self.lock().contains_key(key)
  }

  /// Look up the page addressed by a query.
  pub fn lookup<Q: QueryKey>(&self, query: &Q) -> Option<Arc<Vec<T>>> {
    self.get(&query.cache_key())
  }

  /// Store a fully resolved page and return the shared handle to it.
  ///
  /// If another caller stored the same key first, their page wins and is
  /// returned, so all callers observe one page per key.
  pub fn store<Q: QueryKey>(&self, query: &Q, entities: Vec<T>) -> Arc<Vec<T>> {
    let mut pages = self.lock();
    pages
      .entry(query.cache_key())
      .or_insert_with(|| Arc::new(entities))
      .clone()
  }

  pub fn len(&self) -> usize {
    self.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.lock().is_empty()
  }

  pub fn clear(&self) {
    self.lock().clear();
  }
}

impl<T> Default for ListingCache<T> {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Page(u32, u32);

  impl QueryKey for Page {
    fn cache_key(&self) -> String {
      format!("{}-{}", self.0, self.1)
    }

    fn description(&self) -> String {
      format!("page {} of {}", self.1, self.0)
    }
  }

  #[test]
  fn test_store_then_lookup_returns_same_page() {
    let cache = ListingCache::new();
    let stored = cache.store(&Page(4, 1), vec![1, 2, 3, 4]);

    let hit = cache.lookup(&Page(4, 1)).expect("page should be cached");
    assert!(Arc::ptr_eq(&stored, &hit));
    assert!(cache.contains("4-1"));
  }

  #[test]
  fn test_distinct_keys_do_not_collide() {
    let cache = ListingCache::new();
    cache.store(&Page(4, 1), vec![1, 2, 3, 4]);

    assert!(cache.lookup(&Page(4, 2)).is_none());
    assert!(cache.lookup(&Page(1, 4)).is_none());
  }

  #[test]
  fn test_first_store_wins() {
    let cache = ListingCache::new();
    let first = cache.store(&Page(2, 1), vec![1, 2]);
    let second = cache.store(&Page(2, 1), vec![9, 9]);

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(*second, vec![1, 2]);
  }

  #[test]
  fn test_clear() {
    let cache = ListingCache::new();
    cache.store(&Page(2, 1), vec![1, 2]);
    cache.clear();

    assert!(cache.is_empty());
    assert_eq!(cache.len(), 0);
  }
}
