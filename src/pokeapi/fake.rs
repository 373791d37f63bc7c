//! In-process upstream for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::json;
use tokio::sync::Barrier;

use crate::pokemon::{Pokemon, ServiceError, ServiceResult};

use super::api_types::{ApiPokemon, ApiResourceRef};
use super::Upstream;

const NAMES: &[(&str, &str, u32)] = &[
  ("bulbasaur", "grass", 45),
  ("ivysaur", "grass", 60),
  ("venusaur", "grass", 80),
  ("charmander", "fire", 39),
  ("charmeleon", "fire", 58),
  ("charizard", "fire", 78),
];

pub fn sprite_urls(id: u64) -> Vec<String> {
  vec![
    format!("https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/{id}.png"),
    format!("https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/back/{id}.png"),
  ]
}

/// Serves pokemon `1..=max_id` in PokeAPI's raw shape and counts every call.
pub struct FakeUpstream {
  max_id: u64,
  listing: Option<Vec<u64>>,
  detail_barrier: Option<Arc<Barrier>>,
  failing_id: Option<u64>,
  failing_listing: bool,
  list_calls: AtomicUsize,
  detail_calls: AtomicUsize,
  in_flight: AtomicUsize,
  peak_in_flight: AtomicUsize,
}

impl FakeUpstream {
  pub fn new() -> Self {
    Self {
      max_id: 1025,
      listing: None,
      detail_barrier: None,
      failing_id: None,
      failing_listing: false,
      list_calls: AtomicUsize::new(0),
      detail_calls: AtomicUsize::new(0),
      in_flight: AtomicUsize::new(0),
      peak_in_flight: AtomicUsize::new(0),
    }
  }

  /// Serve exactly these ids from every list call.
  pub fn with_listing(mut self, ids: Vec<u64>) -> Self {
    self.listing = Some(ids);
    self
  }

  /// Hold every detail fetch until `n` of them are in flight at once.
  pub fn with_detail_barrier(mut self, n: usize) -> Self {
    self.detail_barrier = Some(Arc::new(Barrier::new(n)));
    self
  }

  /// Fail detail fetches for `id` with a transport-style error.
  pub fn with_failing_id(mut self, id: u64) -> Self {
    self.failing_id = Some(id);
    self
  }

  /// Fail every list call with a transport-style error.
  pub fn with_failing_listing(mut self) -> Self {
    self.failing_listing = true;
    self
  }

  /// Most detail fetches ever observed in flight at the same time.
  pub fn peak_in_flight(&self) -> usize {
    self.peak_in_flight.load(Ordering::SeqCst)
  }

  pub fn list_calls(&self) -> usize {
    self.list_calls.load(Ordering::SeqCst)
  }

  pub fn detail_calls(&self) -> usize {
    self.detail_calls.load(Ordering::SeqCst)
  }

  pub fn total_calls(&self) -> usize {
    self.list_calls() + self.detail_calls()
  }

  fn raw(id: u64) -> ApiPokemon {
    let index = usize::try_from(id - 1).unwrap_or(usize::MAX);
    let (name, kind, hp) = NAMES
      .get(index)
      .map(|(n, k, hp)| (n.to_string(), k.to_string(), *hp))
      .unwrap_or_else(|| (format!("pokemon-{}", id), "normal".to_string(), 50));
    let [front, back]: [String; 2] = sprite_urls(id).try_into().unwrap();

    serde_json::from_value(json!({
      "id": id,
      "name": name,
      "types": [{"slot": 1, "type": {"name": kind}}],
      "stats": [{"base_stat": hp, "stat": {"name": "hp"}}, {"base_stat": 1, "stat": {"name": "attack"}}],
      "sprites": {"front_default": front, "back_default": back},
    }))
    .unwrap()
  }
}

impl Upstream for FakeUpstream {
  async fn list_page(&self, limit: u32, offset: u64) -> ServiceResult<Vec<ApiResourceRef>> {
    self.list_calls.fetch_add(1, Ordering::SeqCst);

    if self.failing_listing {
      return Err(ServiceError::Upstream("connection reset listing pokemon".to_string()));
    }

    let ids: Vec<u64> = match &self.listing {
      Some(ids) => ids.clone(),
      None => (offset + 1..=offset + u64::from(limit))
        .filter(|id| *id <= self.max_id)
        .collect(),
    };

    Ok(
      ids
        .into_iter()
        .map(|id| ApiResourceRef {
          url: format!("https://pokeapi.co/api/v2/pokemon/{}/", id),
        })
        .collect(),
    )
  }

  async fn fetch_by_id(&self, id: u64) -> ServiceResult<Pokemon> {
    self.detail_calls.fetch_add(1, Ordering::SeqCst);
    let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    self.peak_in_flight.fetch_max(in_flight, Ordering::SeqCst);

    // Suspend once so sibling fetches get a chance to start
    tokio::task::yield_now().await;
    if let Some(barrier) = &self.detail_barrier {
      barrier.wait().await;
    }

    self.in_flight.fetch_sub(1, Ordering::SeqCst);

    if self.failing_id == Some(id) {
      return Err(ServiceError::Upstream(format!("connection reset fetching {}", id)));
    }
    if id == 0 || id > self.max_id {
      return Err(ServiceError::NotFound { id });
    }

    Self::raw(id).into_pokemon()
  }
}
