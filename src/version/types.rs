//! Common types for version resolution

/// Which fallback source produced a resolved version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionOrigin {
    /// The remote search index answered.
    SearchIndex,
    /// Found by scanning the local repository.
    LocalRepository,
    /// Extracted from a remote repository's metadata document.
    RepositoryMetadata,
    /// Every source was silent; the dependency's current version was kept.
    Unchanged,
}

/// Result of resolving the latest version for a dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    pub value: String,
    pub origin: VersionOrigin,
}

impl ResolvedVersion {
    pub fn new(value: impl Into<String>, origin: VersionOrigin) -> Self {
        Self {
            value: value.into(),
            origin,
        }
    }
}
