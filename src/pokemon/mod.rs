//! The pokemon resource: domain types, errors, and the caching service.

mod cache;
mod error;
mod service;
mod types;

pub use error::{ErrorBody, ServiceError, ServiceResult};
pub use service::{PokemonService, ServiceOptions};
pub use types::{CreatePokemon, Pagination, Pokemon, UpdatePokemon};
