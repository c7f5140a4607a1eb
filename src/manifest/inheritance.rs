//! Parent-manifest inheritance resolution
//!
//! Completes a manifest's coordinates by locating its parent manifest,
//! verifying the parent's coordinates against the reference, and producing
//! a derived manifest with groupId/version filled in. Parsed manifests are
//! memoized by path and resolved parents by full coordinate key, so a batch
//! over one project tree parses each file at most once.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::MANIFEST_FILE_NAME;
use crate::manifest::error::LoadError;
use crate::manifest::pom;
use crate::manifest::types::{Manifest, ParentRef};

/// Resolves manifest inheritance within one session.
///
/// Both caches live for the lifetime of the resolver and are never
/// invalidated; keys are write-once, so concurrent duplicate loads settle
/// to the same value.
#[derive(Default)]
pub struct InheritanceResolver {
    models: Mutex<HashMap<PathBuf, Arc<Manifest>>>,
    parents: Mutex<HashMap<String, Arc<Manifest>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl InheritanceResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads and parses a manifest file, memoized by path.
    pub fn load(&self, path: &Path) -> Result<Arc<Manifest>, LoadError> {
        if let Some(cached) = lock(&self.models).get(path) {
            return Ok(Arc::clone(cached));
        }

        let manifest = Arc::new(pom::load(path)?);
        lock(&self.models)
            .entry(path.to_path_buf())
            .or_insert(manifest.clone());
        Ok(manifest)
    }

    /// Produces a manifest with coordinates inherited from its parent.
    ///
    /// The input is never mutated. When the manifest already has complete
    /// coordinates, has no parent reference, or the parent cannot be
    /// located or coordinate-matched, a plain clone is returned and
    /// inheritance is skipped.
    pub fn resolve(&self, manifest: &Manifest) -> Manifest {
        if manifest.has_complete_coordinates() {
            return manifest.clone();
        }
        let Some(parent_ref) = &manifest.parent else {
            return manifest.clone();
        };

        let Some(parent) = self.resolve_parent(parent_ref, manifest.source_path.as_deref()) else {
            debug!(
                "parent {} not found for {}; keeping manifest as-is",
                parent_ref.coordinate_key(),
                manifest.artifact_id.as_deref().unwrap_or("?"),
            );
            return manifest.clone();
        };

        let mut resolved = manifest.clone();
        if resolved.group_id.is_none() {
            resolved.group_id = parent.group_id.clone();
        }
        if resolved.version.is_none() {
            resolved.version = parent.version.clone();
        }
        resolved
    }

    /// Loads and resolves a single manifest file.
    pub fn resolve_file(&self, path: &Path) -> Result<Manifest, LoadError> {
        let manifest = self.load(path)?;
        Ok(self.resolve(&manifest))
    }

    /// Discovers and resolves every manifest under a root directory.
    ///
    /// A file that fails to parse is reported in place; siblings continue
    /// to be processed.
    pub fn resolve_tree(&self, root: &Path) -> Vec<(PathBuf, Result<Manifest, LoadError>)> {
        find_manifest_files(root)
            .into_iter()
            .map(|path| {
                let result = self.resolve_file(&path);
                if let Err(err) = &result {
                    warn!("failed to resolve {}: {}", path.display(), err);
                }
                (path, result)
            })
            .collect()
    }

    fn resolve_parent(
        &self,
        parent_ref: &ParentRef,
        child_path: Option<&Path>,
    ) -> Option<Arc<Manifest>> {
        let key = parent_ref.coordinate_key();
        if let Some(cached) = lock(&self.parents).get(&key) {
            return Some(Arc::clone(cached));
        }

        let parent = self.locate_parent(parent_ref, child_path?)?;
        lock(&self.parents)
            .entry(key)
            .or_insert(parent.clone());
        Some(parent)
    }

    /// Tries the reference's relative path first, then the conventional
    /// default location two directories up from the child manifest.
    fn locate_parent(&self, parent_ref: &ParentRef, child_path: &Path) -> Option<Arc<Manifest>> {
        let child_dir = child_path.parent()?;

        if let Some(relative) = parent_ref.relative_path.as_deref() {
            let mut candidate_path = child_dir.join(relative);
            if candidate_path.file_name() != Some(OsStr::new(MANIFEST_FILE_NAME)) {
                candidate_path = candidate_path.join(MANIFEST_FILE_NAME);
            }
            if let Some(parent) = self.load_candidate(&candidate_path, parent_ref) {
                return Some(parent);
            }
        }

        let default_path = child_dir.parent()?.join(MANIFEST_FILE_NAME);
        self.load_candidate(&default_path, parent_ref)
    }

    /// Loads a candidate parent and accepts it only on an exact coordinate
    /// match. An unreadable candidate skips inheritance rather than
    /// failing the child's resolution.
    fn load_candidate(&self, path: &Path, parent_ref: &ParentRef) -> Option<Arc<Manifest>> {
        if !path.exists() {
            return None;
        }
        match self.load(path) {
            Ok(candidate) if matches_parent(&candidate, parent_ref) => Some(candidate),
            Ok(candidate) => {
                debug!(
                    "candidate {} is {:?}:{:?}:{:?}, expected {}; discarding",
                    path.display(),
                    candidate.group_id,
                    candidate.artifact_id,
                    candidate.version,
                    parent_ref.coordinate_key(),
                );
                None
            }
            Err(err) => {
                warn!("failed to load parent candidate {}: {}", path.display(), err);
                None
            }
        }
    }
}

fn matches_parent(candidate: &Manifest, parent_ref: &ParentRef) -> bool {
    candidate.group_id.as_deref() == Some(parent_ref.group_id.as_str())
        && candidate.artifact_id.as_deref() == Some(parent_ref.artifact_id.as_str())
        && candidate.version.as_deref() == Some(parent_ref.version.as_str())
}

/// Lists every conventionally named manifest file under a root, skipping
/// hidden directories and build output.
pub fn find_manifest_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            name != "target" && !name.starts_with('.')
        })
        .filter_map(Result::ok)
        .filter(|entry| {
            entry.file_type().is_file() && entry.file_name() == OsStr::new(MANIFEST_FILE_NAME)
        })
        .map(|entry| entry.into_path())
        .collect()
}
