//! HTTP client for the remote recipe search service.
//!
//! The service exposes a single search endpoint that takes a free-text
//! query and returns recipes already ranked:
//!
//! ```text
//! POST /search  {"query": "spicy indian high protein", "top_k": 20}
//! 200           {"recipes": [{"Recipe_title": ..., "Calories": ..., ...}]}
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::recipe::Recipe;

/// Connection settings for [`RecipeClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service root, e.g. `http://localhost:8000`
    pub base_url: String,
    /// Path of the search endpoint (default: `/search`)
    pub search_path: String,
    /// Per-request timeout (default: 15 seconds)
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            search_path: "/search".to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    top_k: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    recipes: Vec<Recipe>,
}

/// Query composed from the planner form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DietQuery {
    pub cuisine: String,
    /// Diet restriction; `None` or an empty string leaves it out.
    pub diet: String,
    pub goal: String,
}

impl DietQuery {
    /// Renders `"<cuisine> <diet> food for <goal>"` with blank parts dropped.
    pub fn to_query(&self) -> String {
        let diet = if self.diet.trim().eq_ignore_ascii_case("none") {
            ""
        } else {
            self.diet.as_str()
        };
        format!("{} {} food for {}", self.cuisine, diet, self.goal)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone)]
pub struct RecipeClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl RecipeClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    pub fn search_url(&self) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.search_path.trim_start_matches('/')
        )
    }

    /// Runs a search and returns the recipes in the order the service ranked them.
    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<Recipe>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::EmptyQuery);
        }

        let url = self.search_url();
        tracing::info!(%url, %query, top_k, "searching recipes");

        let response = self
            .http
            .post(&url)
            .json(&SearchRequest { query, top_k })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), %body, "recipe search rejected");
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        let payload: SearchResponse = response.json().await?;
        tracing::info!(count = payload.recipes.len(), "recipe search completed");
        Ok(payload.recipes)
    }
}
