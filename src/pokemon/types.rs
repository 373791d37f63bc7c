use serde::{Deserialize, Serialize};

use super::error::{ServiceError, ServiceResult};

/// A pokemon as exposed to callers.
///
/// Serialized with the resource's wire names: `type` and `hp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pokemon {
  pub id: u64,
  pub name: String,
  #[serde(rename = "type")]
  pub pokemon_type: String,
  #[serde(rename = "hp", default)]
  pub hit_points: u32,
  #[serde(default)]
  pub sprites: Vec<String>,
}

/// Draft for a locally created pokemon
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePokemon {
  #[serde(default)]
  pub name: String,
  #[serde(rename = "type", default)]
  pub pokemon_type: String,
  #[serde(rename = "hp")]
  pub hit_points: Option<u32>,
  pub sprites: Option<Vec<String>>,
}

impl CreatePokemon {
  pub fn new(name: impl Into<String>, pokemon_type: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      pokemon_type: pokemon_type.into(),
      ..Self::default()
    }
  }

  /// Check required fields, reporting every violation at once.
  pub fn validate(&self) -> ServiceResult<()> {
    let mut errors = Vec::new();

    if self.name.is_empty() {
      errors.push("name should not be empty".to_string());
    }
    if self.pokemon_type.is_empty() {
      errors.push("type should not be empty".to_string());
    }

    if errors.is_empty() {
      Ok(())
    } else {
      Err(ServiceError::Invalid(errors))
    }
  }

  /// Materialize the draft under the given id, filling defaults.
  pub fn into_pokemon(self, id: u64) -> Pokemon {
    Pokemon {
      id,
      name: self.name,
      pokemon_type: self.pokemon_type,
      hit_points: self.hit_points.unwrap_or(0),
      sprites: self.sprites.unwrap_or_default(),
    }
  }
}

/// Partial update; `None` fields keep their previous value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatePokemon {
  pub name: Option<String>,
  #[serde(rename = "type")]
  pub pokemon_type: Option<String>,
  #[serde(rename = "hp")]
  pub hit_points: Option<u32>,
  pub sprites: Option<Vec<String>>,
}

impl UpdatePokemon {
  pub fn validate(&self) -> ServiceResult<()> {
    let mut errors = Vec::new();

    if self.name.as_deref().is_some_and(str::is_empty) {
      errors.push("name should not be empty".to_string());
    }
    if self.pokemon_type.as_deref().is_some_and(str::is_empty) {
      errors.push("type should not be empty".to_string());
    }

    if errors.is_empty() {
      Ok(())
    } else {
      Err(ServiceError::Invalid(errors))
    }
  }

  /// Merge this patch over `current`. The id is never touched.
  pub fn apply_to(self, current: Pokemon) -> Pokemon {
    Pokemon {
      id: current.id,
      name: self.name.unwrap_or(current.name),
      pokemon_type: self.pokemon_type.unwrap_or(current.pokemon_type),
      hit_points: self.hit_points.unwrap_or(current.hit_points),
      sprites: self.sprites.unwrap_or(current.sprites),
    }
  }
}

const DEFAULT_LIMIT: u32 = 10;
const DEFAULT_PAGE: u32 = 1;

/// Page request: `limit` entities per page, 1-indexed `page`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "PaginationParams")]
pub struct Pagination {
  limit: u32,
  page: u32,
}

impl Pagination {
  pub fn new(limit: u32, page: u32) -> ServiceResult<Self> {
    Self::checked(i64::from(limit), i64::from(page))
  }

  fn checked(limit: i64, page: i64) -> ServiceResult<Self> {
    let mut errors = Vec::new();
    let limit = check_bound("limit", limit, &mut errors);
    let page = check_bound("page", page, &mut errors);

    match (limit, page) {
      (Some(limit), Some(page)) => Ok(Self { limit, page }),
      _ => Err(ServiceError::Invalid(errors)),
    }
  }

  pub fn limit(&self) -> u32 {
    self.limit
  }

  pub fn page(&self) -> u32 {
    self.page
  }

  /// Number of entities preceding this page upstream.
  pub fn offset(&self) -> u64 {
    u64::from(self.page - 1) * u64::from(self.limit)
  }
}

impl Default for Pagination {
  fn default() -> Self {
    Self {
      limit: DEFAULT_LIMIT,
      page: DEFAULT_PAGE,
    }
  }
}

fn check_bound(field: &str, value: i64, errors: &mut Vec<String>) -> Option<u32> {
  if value < 1 {
    errors.push(format!("{} must not be less than 1", field));
    return None;
  }
  match u32::try_from(value) {
    Ok(v) => Some(v),
    Err(_) => {
      errors.push(format!("{} must not be greater than {}", field, u32::MAX));
      None
    }
  }
}

/// Raw query parameters; values may arrive as numbers or numeric strings.
#[derive(Debug, Deserialize)]
struct PaginationParams {
  #[serde(default, deserialize_with = "deserialize_number_or_string")]
  limit: Option<i64>,
  #[serde(default, deserialize_with = "deserialize_number_or_string")]
  page: Option<i64>,
}

impl TryFrom<PaginationParams> for Pagination {
  type Error = ServiceError;

  fn try_from(params: PaginationParams) -> ServiceResult<Self> {
    Self::checked(
      params.limit.unwrap_or(i64::from(DEFAULT_LIMIT)),
      params.page.unwrap_or(i64::from(DEFAULT_PAGE)),
    )
  }
}

fn deserialize_number_or_string<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
  D: serde::Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum NumberOrString {
    Number(i64),
    Text(String),
  }

  match NumberOrString::deserialize(deserializer)? {
    NumberOrString::Number(n) => Ok(Some(n)),
    NumberOrString::Text(s) => s
      .trim()
      .parse()
      .map(Some)
      .map_err(|_| serde::de::Error::custom(format!("'{}' is not a number", s))),
  }
}
