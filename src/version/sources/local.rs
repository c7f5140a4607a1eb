//! Local repository scanner
//!
//! Lists the versions of an artifact already downloaded into the local
//! repository by looking at its version directories on disk.

use std::path::PathBuf;

use regex::Regex;
use tracing::debug;

use crate::config::{self, TRANSIENT_DOWNLOAD_SUFFIX};
use crate::manifest::types::Coordinate;
use crate::version::source::LocalVersionSource;

pub struct LocalRepository {
    root: PathBuf,
    version_dir_re: Regex,
}

impl LocalRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            // Version directories start with at least two numeric parts;
            // anything else under the artifact directory is not a version.
            version_dir_re: Regex::new(r"^\d+\.\d+").unwrap(),
        }
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new(config::local_repository_root())
    }
}

impl LocalVersionSource for LocalRepository {
    fn list_versions(&self, coordinate: &Coordinate) -> Vec<String> {
        let artifact_dir = self
            .root
            .join(coordinate.group_path())
            .join(&coordinate.artifact_id);

        let entries = match std::fs::read_dir(&artifact_dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("no local artifacts at {}: {}", artifact_dir.display(), e);
                return Vec::new();
            }
        };

        entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| {
                self.version_dir_re.is_match(name) && !name.ends_with(TRANSIENT_DOWNLOAD_SUFFIX)
            })
            .collect()
    }
}
