//! Caching facade over the PokeAPI pokemon resource.
//!
//! [`pokemon::PokemonService`] is the entry point: it answers create, list,
//! get, update and remove requests from two in-memory caches and falls back
//! to an [`pokeapi::Upstream`] on a miss.

pub mod cache;
pub mod config;
pub mod logging;
pub mod pokeapi;
pub mod pokemon;
