//! Concrete version sources
//! - search.rs: remote search index client
//! - local.rs: local repository directory scanner
//! - metadata.rs: remote repository metadata fetcher

pub mod local;
pub mod metadata;
pub mod search;

pub use local::LocalRepository;
pub use metadata::HttpMetadataSource;
pub use search::CentralSearchIndex;

use std::time::Duration;

use crate::config::FETCH_TIMEOUT_SECS;

/// HTTP client shared by the remote sources: per-request timeout,
/// crate-identifying user agent.
pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent("pomver")
        .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
        .build()
        .expect("Failed to create HTTP client")
}
