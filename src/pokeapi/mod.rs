//! Upstream access to the PokeAPI pokemon resource.

pub mod api_types;
mod client;
#[cfg(test)]
pub(crate) mod fake;

use std::future::Future;

use crate::pokemon::{Pokemon, ServiceResult};

pub use api_types::ApiResourceRef;
pub use client::PokeApiClient;

/// Remote source of pokemon data.
///
/// `fetch_by_id` must map the remote's not-found status to
/// `ServiceError::NotFound` and return already-normalized entities.
pub trait Upstream: Send + Sync {
  /// Fetch one page of references, `limit` entries starting at `offset`.
  fn list_page(
    &self,
    limit: u32,
    offset: u64,
  ) -> impl Future<Output = ServiceResult<Vec<ApiResourceRef>>> + Send;

  /// Fetch and normalize a single pokemon.
  fn fetch_by_id(&self, id: u64) -> impl Future<Output = ServiceResult<Pokemon>> + Send;
}
