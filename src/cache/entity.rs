//! By-id entity cache.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::traits::Cacheable;

/// In-memory mapping from entity id to entity.
///
/// Entries never expire; they are only replaced by `insert` or dropped by `remove`.
pub struct EntityCache<T: Cacheable> {
  entries: Mutex<HashMap<T::Id, T>>,
}

impl<T: Cacheable> EntityCache<T> {
  pub fn new() -> Self {
    Self {
      entries: Mutex::new(HashMap::new()),
    }
  }

  // Every critical section is a plain map operation, so a poisoned lock
  // still guards a consistent map.
  fn lock(&self) -> MutexGuard<'_, HashMap<T::Id, T>> {
    self.entries.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Get a clone of the cached entity, if any.
  pub fn get(&self, id: T::Id) -> Option<T> {
    self.lock().get(&id).cloned()
  }

  pub fn contains(&self, id: T::Id) -> bool {
    self.lock().contains_key(&id)
  }

  /// Store an entity under its own id, replacing any previous entry.
  pub fn insert(&self, entity: T) {
    self.lock().insert(entity.cache_id(), entity);
  }

  /// Store an entity unless an existing entry conflicts with it.
  ///
  /// The conflict scan and the insertion happen under one lock. On conflict
  /// the cache is untouched and the conflicting entry is returned.
  pub fn insert_unless<F>(&self, entity: T, conflicts: F) -> Result<(), T>
  where
    F: Fn(&T, &T) -> bool,
  {
    let mut entries = self.lock();

    if let Some(existing) = entries.values().find(|e| conflicts(e, &entity)) {
      return Err(existing.clone());
    }

    entries.insert(entity.cache_id(), entity);
    Ok(())
  }

  /// Remove and return the entry for `id`.
  pub fn remove(&self, id: T::Id) -> Option<T> {
    self.lock().remove(&id)
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

impl<T: Cacheable> Default for EntityCache<T> {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, Clone, PartialEq)]
  struct Item {
    id: u64,
    label: String,
  }

  impl Cacheable for Item {
    type Id = u64;

    fn cache_id(&self) -> u64 {
      self.id
    }

    fn entity_type() -> &'static str {
      "item"
    }
  }

  fn item(id: u64, label: &str) -> Item {
    Item {
      id,
      label: label.to_string(),
    }
  }

  #[test]
  fn test_insert_and_get() {
    let cache = EntityCache::new();
    cache.insert(item(1, "one"));

    assert_eq!(cache.get(1), Some(item(1, "one")));
    assert_eq!(cache.get(2), None);
    assert!(cache.contains(1));
  }

  #[test]
  fn test_insert_overwrites_same_id() {
    let cache = EntityCache::new();
    cache.insert(item(1, "one"));
    cache.insert(item(1, "uno"));

    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get(1).map(|i| i.label), Some("uno".to_string()));
  }

  #[test]
  fn test_insert_unless_rejects_conflict() {
    let cache = EntityCache::new();
    cache.insert(item(1, "one"));

    let result = cache.insert_unless(item(2, "one"), |a, b| a.label == b.label);

    assert_eq!(result, Err(item(1, "one")));
    assert_eq!(cache.len(), 1);
    assert!(!cache.contains(2));
  }

  #[test]
  fn test_insert_unless_accepts_distinct() {
    let cache = EntityCache::new();
    cache.insert(item(1, "one"));

    let result = cache.insert_unless(item(2, "two"), |a, b| a.label == b.label);

    assert!(result.is_ok());
    assert_eq!(cache.len(), 2);
  }

  #[test]
  fn test_remove_and_clear() {
    let cache = EntityCache::new();
    cache.insert(item(1, "one"));
    cache.insert(item(2, "two"));

    assert_eq!(cache.remove(1), Some(item(1, "one")));
    assert_eq!(cache.remove(1), None);

    cache.clear();
    assert!(cache.is_empty());
  }
}
