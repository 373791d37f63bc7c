//! Core traits for the caching system.

use std::fmt::Debug;
use std::hash::Hash;

/// Trait for entities that can be cached by identity.
///
/// Implementors provide a stable id used as the entity cache key.
pub trait Cacheable: Clone + Send + Sync {
  /// Identity type of the entity (e.g., a numeric upstream id)
  type Id: Copy + Eq + Hash + Debug + Send + Sync;

  /// Unique identifier for this entity
  fn cache_id(&self) -> Self::Id;

  /// Entity type name used in log output (e.g., "pokemon")
  fn entity_type() -> &'static str;
}

/// Trait for request descriptors that address a cached listing.
pub trait QueryKey {
  /// Deterministic key; equal requests must produce equal keys.
  fn cache_key(&self) -> String;

  /// Human-readable description for logging.
  fn description(&self) -> String;
}
