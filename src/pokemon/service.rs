//! Pokemon service: the single entry point over both caches and the upstream.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use futures::{stream, StreamExt, TryStreamExt};
use tracing::{debug, info, instrument};

use crate::cache::{Cacheable, EntityCache, ListingCache, QueryKey};
use crate::config::Config;
use crate::pokeapi::Upstream;

use super::error::{ServiceError, ServiceResult};
use super::types::{CreatePokemon, Pagination, Pokemon, UpdatePokemon};

/// Tunables for the service.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceOptions {
  /// Upper bound on detail fetches in flight for one page; `None` dispatches all at once
  pub max_concurrent_fetches: Option<usize>,
}

impl From<&Config> for ServiceOptions {
  fn from(config: &Config) -> Self {
    Self {
      max_concurrent_fetches: config.fetch.max_concurrent,
    }
  }
}

/// Caching facade over an upstream pokemon source.
///
/// Two caches live here and nowhere else:
/// - an entity cache by id, filled by `find_one`, `create` and `update`
/// - a listing cache by `"<limit>-<page>"`, filled by `find_all`
///
/// Neither cache expires. Mutations never touch cached pages, so a page keeps
/// the entities as they were when it was fetched.
pub struct PokemonService<U: Upstream> {
  upstream: U,
  options: ServiceOptions,
  pokemons: EntityCache<Pokemon>,
  pages: ListingCache<Pokemon>,
  last_id: AtomicU64,
}

impl<U: Upstream> PokemonService<U> {
  pub fn new(upstream: U, options: ServiceOptions) -> Self {
    Self {
      upstream,
      options,
      pokemons: EntityCache::new(),
      pages: ListingCache::new(),
      last_id: AtomicU64::new(0),
    }
  }

  pub fn upstream(&self) -> &U {
    &self.upstream
  }

  pub fn entity_cache(&self) -> &EntityCache<Pokemon> {
    &self.pokemons
  }

  pub fn listing_cache(&self) -> &ListingCache<Pokemon> {
    &self.pages
  }

  /// Drop every cached entity and page.
  pub fn reset(&self) {
    self.pokemons.clear();
    self.pages.clear();
    debug!("Caches cleared");
  }

  /// Create a pokemon locally. Names must be unique among cached pokemon.
  pub async fn create(&self, draft: CreatePokemon) -> ServiceResult<Pokemon> {
    draft.validate()?;

    let pokemon = draft.into_pokemon(self.next_id());

    self
      .pokemons
      .insert_unless(pokemon.clone(), |existing, new| existing.name == new.name)
      .map_err(|existing| ServiceError::Duplicate {
        name: existing.name,
      })?;

    info!(id = pokemon.id, name = %pokemon.name, "Created pokemon");
    Ok(pokemon)
  }

  /// List one page of pokemon, served from the listing cache when possible.
  ///
  /// On a miss every detail fetch for the page is dispatched before any is
  /// awaited; the page keeps upstream reference order. Any failed fetch fails
  /// the whole page and nothing is cached.
  #[instrument(skip(self), fields(key = %pagination.cache_key()))]
  pub async fn find_all(&self, pagination: &Pagination) -> ServiceResult<Arc<Vec<Pokemon>>> {
    if let Some(page) = self.pages.lookup(pagination) {
      debug!("Listing cache hit");
      return Ok(page);
    }

    debug!(query = %pagination.description(), "Listing cache miss");

    let refs = self
      .upstream
      .list_page(pagination.limit(), pagination.offset())
      .await?;

    let ids = refs
      .iter()
      .map(|r| r.id())
      .collect::<ServiceResult<Vec<u64>>>()?;

    let fan_out = self
      .options
      .max_concurrent_fetches
      .unwrap_or(ids.len())
      .max(1);

    let pokemons: Vec<Pokemon> = stream::iter(ids)
      .map(|id| self.upstream.fetch_by_id(id))
      .buffered(fan_out)
      .try_collect()
      .await?;

    debug!(count = pokemons.len(), "Caching page");
    Ok(self.pages.store(pagination, pokemons))
  }

  /// Get a pokemon by id, fetching and caching it on a miss.
  pub async fn find_one(&self, id: u64) -> ServiceResult<Pokemon> {
    if let Some(pokemon) = self.pokemons.get(id) {
      debug!(id, entity = Pokemon::entity_type(), "Entity cache hit");
      return Ok(pokemon);
    }

    debug!(id, entity = Pokemon::entity_type(), "Entity cache miss");
    let pokemon = self.upstream.fetch_by_id(id).await?;
    self.pokemons.insert(pokemon.clone());

    Ok(pokemon)
  }

  /// Merge `patch` over the pokemon with this id and cache the result.
  pub async fn update(&self, id: u64, patch: UpdatePokemon) -> ServiceResult<Pokemon> {
    patch.validate()?;

    let current = self.find_one(id).await?;
    let updated = patch.apply_to(current);
    self.pokemons.insert(updated.clone());

    info!(id, name = %updated.name, "Updated pokemon");
    Ok(updated)
  }

  /// Drop the pokemon with this id from the entity cache.
  pub async fn remove(&self, id: u64) -> ServiceResult<String> {
    let pokemon = self.find_one(id).await?;
    self.pokemons.remove(id);

    info!(id, name = %pokemon.name, "Removed pokemon");
    Ok(format!("Pokemon #{} removed", pokemon.name))
  }

  /// Millisecond timestamp, bumped past the previous id when the clock has not moved.
  fn next_id(&self) -> u64 {
    let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);

    let previous = self
      .last_id
      .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
        Some(now.max(last + 1))
      })
      .unwrap_or_else(|last| last);

    now.max(previous + 1)
  }
}
