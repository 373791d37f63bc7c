//! Serde-deserializable types matching PokeAPI responses.
//!
//! These types are separate from domain types to allow clean deserialization
//! while keeping domain types focused on application needs.

use serde::Deserialize;

use crate::pokemon::{Pokemon, ServiceError, ServiceResult};

// ============================================================================
// List endpoint: GET /pokemon?limit=&offset=
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiPageResponse {
  #[serde(default)]
  pub results: Vec<ApiResourceRef>,
}

/// Reference to a detail resource, e.g. `https://pokeapi.co/api/v2/pokemon/25/`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResourceRef {
  pub url: String,
}

impl ApiResourceRef {
  /// Trailing numeric path segment of the reference URL.
  pub fn id(&self) -> ServiceResult<u64> {
    self
      .url
      .trim_end_matches('/')
      .rsplit('/')
      .next()
      .and_then(|segment| segment.parse().ok())
      .ok_or_else(|| ServiceError::Upstream(format!("No pokemon id in reference url '{}'", self.url)))
  }
}

// ============================================================================
// Detail endpoint: GET /pokemon/{id}
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiNamedRef {
  pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiTypeSlot {
  #[serde(rename = "type")]
  pub type_ref: ApiNamedRef,
}

#[derive(Debug, Deserialize)]
pub struct ApiStat {
  pub base_stat: u32,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiSprites {
  pub front_default: Option<String>,
  pub back_default: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiPokemon {
  pub id: u64,
  pub name: String,
  #[serde(default)]
  pub types: Vec<ApiTypeSlot>,
  #[serde(default)]
  pub stats: Vec<ApiStat>,
  #[serde(default)]
  pub sprites: ApiSprites,
}

impl ApiPokemon {
  /// Normalize into the domain shape.
  ///
  /// The first type and the first stat (hp) are taken; sprites are always
  /// `[front, back]`, with a missing image as an empty string.
  pub fn into_pokemon(self) -> ServiceResult<Pokemon> {
    let pokemon_type = self
      .types
      .into_iter()
      .next()
      .map(|slot| slot.type_ref.name)
      .ok_or_else(|| ServiceError::Upstream(format!("Pokemon {} has no types", self.id)))?;

    let hit_points = self
      .stats
      .first()
      .map(|stat| stat.base_stat)
      .ok_or_else(|| ServiceError::Upstream(format!("Pokemon {} has no stats", self.id)))?;

    Ok(Pokemon {
      id: self.id,
      name: self.name,
      pokemon_type,
      hit_points,
      sprites: vec![
        self.sprites.front_default.unwrap_or_default(),
        self.sprites.back_default.unwrap_or_default(),
      ],
    })
  }
}
