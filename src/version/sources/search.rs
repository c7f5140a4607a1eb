//! Search index client
//!
//! Asks the central search index for the latest published version of an
//! artifact. This is the first and cheapest step of the fallback chain.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::DEFAULT_SEARCH_INDEX_URL;
use crate::manifest::types::Coordinate;
use crate::version::error::RepositoryError;
use crate::version::source::SearchIndexSource;
use crate::version::sources::http_client;

#[derive(Debug, Deserialize, Default)]
struct SearchResponse {
    #[serde(default)]
    response: SearchBody,
}

#[derive(Debug, Deserialize, Default)]
struct SearchBody {
    #[serde(default)]
    docs: Vec<SearchDoc>,
}

#[derive(Debug, Deserialize)]
struct SearchDoc {
    #[serde(rename = "latestVersion")]
    latest_version: Option<String>,
    v: Option<String>,
}

pub struct CentralSearchIndex {
    client: reqwest::Client,
    base_url: String,
}

impl CentralSearchIndex {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.into(),
        }
    }
}

impl Default for CentralSearchIndex {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_INDEX_URL)
    }
}

#[async_trait::async_trait]
impl SearchIndexSource for CentralSearchIndex {
    async fn latest_version(
        &self,
        coordinate: &Coordinate,
    ) -> Result<Option<String>, RepositoryError> {
        // Built by hand: the index expects a literal `+AND+` in the query
        // which must not be percent-encoded.
        let url = format!(
            "{}?q=g:{}+AND+a:{}&rows=1&wt=json",
            self.base_url, coordinate.group_id, coordinate.artifact_id
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| RepositoryError::Network {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            debug!("search index has no entry at {}", url);
            return Ok(None);
        }
        if !status.is_success() {
            return Err(RepositoryError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body: SearchResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                warn!("malformed search index response from {}: {}", url, e);
                return Ok(None);
            }
        };

        Ok(body
            .response
            .docs
            .into_iter()
            .next()
            .and_then(|doc| doc.latest_version.or(doc.v)))
    }
}
