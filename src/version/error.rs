use thiserror::Error;

/// A named remote source was unreachable or answered with an unexpected
/// status. Always recoverable by the fallback chain.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("network error for {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected status {status} from {url}")]
    Status { url: String, status: u16 },
}

/// No source could produce a version for a dependency.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("dependency {group_id:?}:{artifact_id:?} is missing groupId or artifactId")]
    IncompleteCoordinate {
        group_id: Option<String>,
        artifact_id: Option<String>,
    },

    #[error(
        "no version found for {group_id}:{artifact_id} in any source \
         and no current version to fall back to ({} source failures)",
        causes.len()
    )]
    Exhausted {
        group_id: String,
        artifact_id: String,
        /// Failures from individual sources, kept for diagnosis.
        causes: Vec<RepositoryError>,
    },
}
