//! Repository metadata fetcher
//!
//! Downloads `maven-metadata.xml` for an artifact from a repository and
//! extracts a version from it. The document varies across repository
//! implementations, so extraction is lenient: `<release>` wins, then
//! `<latest>`, then the best entry from the `<version>` list.

use regex::Regex;
use tracing::debug;

use crate::manifest::types::Coordinate;
use crate::version::compare::pick_latest;
use crate::version::source::MetadataSource;
use crate::version::sources::http_client;

pub struct HttpMetadataSource {
    client: reqwest::Client,
    release_re: Regex,
    latest_re: Regex,
    version_re: Regex,
}

impl HttpMetadataSource {
    pub fn new() -> Self {
        Self {
            client: http_client(),
            release_re: Regex::new(r"<release>\s*([^<]+?)\s*</release>").unwrap(),
            latest_re: Regex::new(r"<latest>\s*([^<]+?)\s*</latest>").unwrap(),
            version_re: Regex::new(r"<version>\s*([^<]+?)\s*</version>").unwrap(),
        }
    }

    fn extract_version(&self, xml: &str) -> Option<String> {
        if let Some(caps) = self.release_re.captures(xml) {
            return Some(caps[1].to_string());
        }
        if let Some(caps) = self.latest_re.captures(xml) {
            return Some(caps[1].to_string());
        }
        let versions: Vec<String> = self
            .version_re
            .captures_iter(xml)
            .map(|caps| caps[1].to_string())
            .collect();
        pick_latest(&versions, true)
    }
}

impl Default for HttpMetadataSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl MetadataSource for HttpMetadataSource {
    async fn release_version(
        &self,
        repository_url: &str,
        coordinate: &Coordinate,
    ) -> Option<String> {
        let url = format!(
            "{}/{}/{}/maven-metadata.xml",
            repository_url.trim_end_matches('/'),
            coordinate.group_path(),
            coordinate.artifact_id
        );

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!("metadata fetch failed for {}: {}", url, e);
                return None;
            }
        };
        if !response.status().is_success() {
            debug!("metadata fetch for {} answered {}", url, response.status());
            return None;
        }

        let body = response.text().await.ok()?;
        self.extract_version(&body)
    }
}
