//! Generic in-memory caching for fetched entities and listings.
//!
//! This module provides a resource-agnostic caching mechanism that:
//! - Caches entities by id, with no expiry
//! - Caches ordered listings by a deterministic query key
//! - Hands out shared page snapshots so repeated hits return the same page

mod entity;
mod listing;
mod traits;

pub use entity::EntityCache;
pub use listing::ListingCache;
pub use traits::{Cacheable, QueryKey};
