use std::path::PathBuf;

// =============================================================================
// Network constants
// =============================================================================

/// Timeout for a single repository request in seconds
pub const FETCH_TIMEOUT_SECS: u64 = 10;

/// Default search endpoint for looking up the latest published version
pub const DEFAULT_SEARCH_INDEX_URL: &str = "https://search.maven.org/solrsearch/select";

/// Repositories consulted after the ones declared in the manifest,
/// in this order.
pub const WELL_KNOWN_REPOSITORIES: &[&str] = &[
    "https://repo1.maven.org/maven2",
    "https://jcenter.bintray.com",
    "https://repo.spring.io/release",
];

// =============================================================================
// Filesystem conventions
// =============================================================================

/// Conventional manifest filename
pub const MANIFEST_FILE_NAME: &str = "pom.xml";

/// Suffix marking an interrupted download in the local repository;
/// directory names ending in it are never valid versions.
pub const TRANSIENT_DOWNLOAD_SUFFIX: &str = ".lastUpdated";

/// Returns the root of the local artifact repository,
/// conventionally ~/.m2/repository. Falls back to a relative
/// .m2/repository when no home directory is available.
pub fn local_repository_root() -> PathBuf {
    local_repository_root_with_home(dirs::home_dir())
}

fn local_repository_root_with_home(home_dir: Option<PathBuf>) -> PathBuf {
    home_dir
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".m2")
        .join("repository")
}
