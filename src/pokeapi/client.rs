use std::time::Duration;

use color_eyre::{eyre::eyre, Result};
use reqwest::StatusCode;
use tracing::{debug, warn};
use url::Url;

use crate::config::PokeApiConfig;
use crate::pokemon::{Pokemon, ServiceError, ServiceResult};

use super::api_types::{ApiPageResponse, ApiPokemon, ApiResourceRef};
use super::Upstream;

/// PokeAPI HTTP client
#[derive(Clone)]
pub struct PokeApiClient {
  http: reqwest::Client,
  endpoints: Endpoints,
}

impl PokeApiClient {
  pub fn new(config: &PokeApiConfig) -> Result<Self> {
    let endpoints = Endpoints::parse(&config.url)?;

    let mut builder = reqwest::Client::builder().user_agent(concat!(
      env!("CARGO_PKG_NAME"),
      "/",
      env!("CARGO_PKG_VERSION")
    ));
    if let Some(secs) = config.timeout_secs {
      builder = builder.timeout(Duration::from_secs(secs));
    }

    let http = builder
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { http, endpoints })
  }
}

/// URL layout of the upstream API.
#[derive(Debug, Clone)]
struct Endpoints {
  base_url: Url,
}

impl Endpoints {
  fn parse(raw: &str) -> Result<Self> {
    let mut base_url = Url::parse(raw).map_err(|e| eyre!("Invalid PokeAPI url '{}': {}", raw, e))?;

    // Url::join replaces the last segment unless the base ends in a slash
    if !base_url.path().ends_with('/') {
      let path = format!("{}/", base_url.path());
      base_url.set_path(&path);
    }

    Ok(Self { base_url })
  }

  fn page_url(&self, limit: u32, offset: u64) -> ServiceResult<Url> {
    let mut url = self
      .base_url
      .join("pokemon")
      .map_err(|e| ServiceError::upstream("Failed to build list url", e))?;
    url
      .query_pairs_mut()
      .append_pair("limit", &limit.to_string())
      .append_pair("offset", &offset.to_string());
    Ok(url)
  }

  fn detail_url(&self, id: u64) -> ServiceResult<Url> {
    self
      .base_url
      .join(&format!("pokemon/{}", id))
      .map_err(|e| ServiceError::upstream("Failed to build detail url", e))
  }
}

impl Upstream for PokeApiClient {
  async fn list_page(&self, limit: u32, offset: u64) -> ServiceResult<Vec<ApiResourceRef>> {
    let url = self.endpoints.page_url(limit, offset)?;
    debug!(%url, "Fetching pokemon page");

    let response = self
      .http
      .get(url)
      .send()
      .await
      .and_then(|r| r.error_for_status())
      .map_err(|e| {
        warn!(error = %e, "Pokemon page request failed");
        ServiceError::upstream("Failed to list pokemon", e)
      })?;

    let page: ApiPageResponse = response
      .json()
      .await
      .map_err(|e| ServiceError::upstream("Failed to parse pokemon page", e))?;

    Ok(page.results)
  }

  async fn fetch_by_id(&self, id: u64) -> ServiceResult<Pokemon> {
    let url = self.endpoints.detail_url(id)?;
    debug!(%url, id, "Fetching pokemon");

    let response = self.http.get(url).send().await.map_err(|e| {
      warn!(error = %e, id, "Pokemon request failed");
      ServiceError::upstream(&format!("Failed to get pokemon {}", id), e)
    })?;

    if response.status() == StatusCode::NOT_FOUND {
      return Err(ServiceError::NotFound { id });
    }

    let response = response
      .error_for_status()
      .map_err(|e| ServiceError::upstream(&format!("Failed to get pokemon {}", id), e))?;

    let data: ApiPokemon = response
      .json()
      .await
      .map_err(|e| ServiceError::upstream(&format!("Failed to parse pokemon {}", id), e))?;

    data.into_pokemon()
  }
}
