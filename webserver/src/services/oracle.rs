//! Combination oracle clients
//!
//! - [`HttpCombinationOracle`] asks the public pairing endpoint over HTTP.
//! - [`RecipeBookOracle`] answers from a fixed table, for offline runs.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use shared::{ProcessRole, canonical_pair, process_debug, process_warn};
use crate::error::{WebServerError, WebServerResult};
use crate::traits::CombinationOracle;
use crate::types::Combination;

/// Wire format of the pairing endpoint
#[derive(Debug, Deserialize)]
struct PairResponse {
    result: Option<String>,
    emoji: Option<String>,
    #[serde(rename = "isNew", default)]
    is_new: bool,
}

impl PairResponse {
    fn into_combination(self) -> WebServerResult<Combination> {
        let result_name = self
            .result
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| WebServerError::oracle("response has no result"))?;

        let symbol = self
            .emoji
            .filter(|emoji| !emoji.trim().is_empty())
            .ok_or_else(|| WebServerError::oracle("response has no emoji"))?;

        Ok(Combination {
            result_name,
            symbol,
            is_globally_new: self.is_new,
        })
    }
}

/// Remote oracle reached over HTTP
#[derive(Clone)]
pub struct HttpCombinationOracle {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpCombinationOracle {
    /// Create a client for `endpoint` with a per-request timeout
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> WebServerResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WebServerError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout,
        })
    }
}

#[async_trait]
impl CombinationOracle for HttpCombinationOracle {
    async fn combine(&self, first: &str, second: &str) -> WebServerResult<Combination> {
        let request_start = std::time::Instant::now();

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("first", first), ("second", second)])
            .header("Accept", "*/*")
            .header("Referer", "https://neal.fun/infinite-craft/")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    WebServerError::oracle(format!("timed out after {:?}", self.timeout))
                } else {
                    WebServerError::oracle(format!("request failed: {e}"))
                }
            })?;

        if !response.status().is_success() {
            process_warn!(
                ProcessRole::current(),
                "Oracle returned HTTP {} for {} + {}",
                response.status(),
                first,
                second
            );
            return Err(WebServerError::oracle(format!("HTTP {}", response.status())));
        }

        let body: PairResponse = response
            .json()
            .await
            .map_err(|e| WebServerError::oracle(format!("malformed response: {e}")))?;

        let combination = body.into_combination()?;
        process_debug!(
            ProcessRole::current(),
            "🔮 {} + {} = {} {} in {:?}",
            first,
            second,
            combination.symbol,
            combination.result_name,
            request_start.elapsed()
        );
        Ok(combination)
    }
}

/// One line of a recipe book file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub first: String,
    pub second: String,
    pub result: String,
    pub symbol: String,
    #[serde(default)]
    pub is_new: bool,
}

/// Offline oracle answering from a fixed recipe table
#[derive(Debug, Clone, Default)]
pub struct RecipeBookOracle {
    recipes: HashMap<(String, String), Combination>,
}

impl RecipeBookOracle {
    pub fn new(recipes: impl IntoIterator<Item = Recipe>) -> Self {
        let mut book = Self::default();
        for recipe in recipes {
            book.insert(recipe);
        }
        book
    }

    /// Load a JSON array of recipes
    pub fn from_file(path: impl AsRef<Path>) -> WebServerResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let recipes: Vec<Recipe> = serde_json::from_str(&raw)
            .map_err(|e| WebServerError::config(format!("Invalid recipe book {}: {e}", path.as_ref().display())))?;
        Ok(Self::new(recipes))
    }

    pub fn insert(&mut self, recipe: Recipe) {
        let (first, second) = canonical_pair(&recipe.first, &recipe.second);
        self.recipes.insert(
            (first.to_string(), second.to_string()),
            Combination {
                result_name: recipe.result,
                symbol: recipe.symbol,
                is_globally_new: recipe.is_new,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

#[async_trait]
impl CombinationOracle for RecipeBookOracle {
    async fn combine(&self, first: &str, second: &str) -> WebServerResult<Combination> {
        let (first, second) = canonical_pair(first, second);
        self.recipes
            .get(&(first.to_string(), second.to_string()))
            .cloned()
            .ok_or_else(|| WebServerError::oracle(format!("no recipe for {first} + {second}")))
    }
}
