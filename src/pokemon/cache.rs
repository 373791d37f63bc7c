//! Caching implementations for pokemon types.

use crate::cache::{Cacheable, QueryKey};

use super::types::{Pokemon, Pagination};

impl Cacheable for Pokemon {
  type Id = u64;

  fn cache_id(&self) -> u64 {
    self.id
  }

  fn entity_type() -> &'static str {
    "pokemon"
  }
}

impl QueryKey for Pagination {
  fn cache_key(&self) -> String {
    format!("{}-{}", self.limit(), self.page())
  }

  fn description(&self) -> String {
    format!("pokemon page {} (limit {})", self.page(), self.limit())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_pagination_key_composition() {
    let pagination = Pagination::new(4, 1).unwrap();
    assert_eq!(pagination.cache_key(), "4-1");
  }

  #[test]
  fn test_equal_requests_share_a_key() {
    let a = Pagination::new(20, 3).unwrap();
    let b = Pagination::new(20, 3).unwrap();
    assert_eq!(a.cache_key(), b.cache_key());
    assert_ne!(a.cache_key(), Pagination::new(3, 20).unwrap().cache_key());
  }
}
