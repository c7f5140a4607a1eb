//! Fallback-chain version resolution
//!
//! Resolving the latest version of a dependency walks a fixed chain of
//! sources in order of trust: the remote search index, then the local
//! repository, then per-repository metadata from the manifest's declared
//! repositories and a set of well-known ones. The first answer wins. When
//! every source is silent the dependency's current version is kept, marked
//! so callers never write it back.

use tracing::{debug, info, warn};

use crate::config::WELL_KNOWN_REPOSITORIES;
use crate::manifest::property;
use crate::manifest::types::{Dependency, Manifest};
use crate::version::compare::pick_latest;
use crate::version::error::ResolveError;
use crate::version::source::{LocalVersionSource, MetadataSource, SearchIndexSource};
use crate::version::sources::{CentralSearchIndex, HttpMetadataSource, LocalRepository};
use crate::version::types::{ResolvedVersion, VersionOrigin};

pub struct VersionResolver {
    index: Box<dyn SearchIndexSource>,
    local: Box<dyn LocalVersionSource>,
    metadata: Box<dyn MetadataSource>,
}

/// Outcome of a whole-manifest update pass. Per-dependency failures are
/// collected here instead of aborting the pass.
#[derive(Debug, Default)]
pub struct UpdateReport {
    pub checked: usize,
    pub updated: Vec<DependencyUpdate>,
    pub failures: Vec<DependencyFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyUpdate {
    pub group_id: String,
    pub artifact_id: String,
    pub from: Option<String>,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyFailure {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Direct,
    Managed,
}

impl VersionResolver {
    pub fn new() -> Self {
        Self::with_sources(
            Box::new(CentralSearchIndex::default()),
            Box::new(LocalRepository::default()),
            Box::new(HttpMetadataSource::new()),
        )
    }

    pub fn with_sources(
        index: Box<dyn SearchIndexSource>,
        local: Box<dyn LocalVersionSource>,
        metadata: Box<dyn MetadataSource>,
    ) -> Self {
        Self {
            index,
            local,
            metadata,
        }
    }

    /// Resolves the latest known version for one dependency.
    ///
    /// The manifest supplies the declared repositories consulted in the
    /// metadata step; they are tried in declaration order, before the
    /// well-known ones.
    pub async fn resolve_latest(
        &self,
        dependency: &Dependency,
        manifest: &Manifest,
    ) -> Result<ResolvedVersion, ResolveError> {
        let coordinate =
            dependency
                .coordinate()
                .ok_or_else(|| ResolveError::IncompleteCoordinate {
                    group_id: dependency.group_id.clone(),
                    artifact_id: dependency.artifact_id.clone(),
                })?;

        let mut causes = Vec::new();

        match self.index.latest_version(&coordinate).await {
            Ok(Some(version)) => {
                return Ok(ResolvedVersion::new(version, VersionOrigin::SearchIndex));
            }
            Ok(None) => debug!("search index has no entry for {}", coordinate),
            Err(err) => {
                warn!("search index lookup failed for {}: {}", coordinate, err);
                causes.push(err);
            }
        }

        let local_versions = self.local.list_versions(&coordinate);
        if let Some(version) = pick_latest(&local_versions, true) {
            return Ok(ResolvedVersion::new(
                version,
                VersionOrigin::LocalRepository,
            ));
        }

        let repositories = manifest
            .repositories
            .iter()
            .map(|repo| repo.url.as_str())
            .chain(WELL_KNOWN_REPOSITORIES.iter().copied());
        for repository in repositories {
            if let Some(version) = self.metadata.release_version(repository, &coordinate).await {
                return Ok(ResolvedVersion::new(
                    version,
                    VersionOrigin::RepositoryMetadata,
                ));
            }
        }

        match dependency.version.clone() {
            Some(current) => Ok(ResolvedVersion::new(current, VersionOrigin::Unchanged)),
            None => Err(ResolveError::Exhausted {
                group_id: coordinate.group_id,
                artifact_id: coordinate.artifact_id,
                causes,
            }),
        }
    }

    /// True when a resolution should be written into the manifest.
    ///
    /// The expanded current version is compared to the resolution byte for
    /// byte, so `1.0` and `1.0.0` count as different. A resolution that
    /// merely echoed the current version is never an update: its value may
    /// be a raw placeholder and must not overwrite the property table.
    pub fn needs_update(
        manifest: &Manifest,
        dependency: &Dependency,
        resolved: &ResolvedVersion,
    ) -> bool {
        if resolved.origin == VersionOrigin::Unchanged {
            return false;
        }
        manifest.effective_version(dependency).as_deref() != Some(resolved.value.as_str())
    }

    /// Resolves every dependency in the manifest (direct and managed) and
    /// applies the versions that changed. One dependency failing does not
    /// stop the others.
    pub async fn update_manifest(&self, manifest: &mut Manifest) -> UpdateReport {
        let mut report = UpdateReport::default();

        // Resolution plan first, mutation second: resolving needs the
        // manifest intact for repository URLs and property expansion.
        let mut plan: Vec<(Slot, usize, String, Option<String>)> = Vec::new();
        let slots = [
            (Slot::Direct, &manifest.dependencies),
            (Slot::Managed, &manifest.managed_dependencies),
        ];
        for (slot, dependencies) in slots {
            for (idx, dependency) in dependencies.iter().enumerate() {
                report.checked += 1;
                match self.resolve_latest(dependency, manifest).await {
                    Ok(resolved) => {
                        if Self::needs_update(manifest, dependency, &resolved) {
                            let previous = manifest.effective_version(dependency);
                            plan.push((slot, idx, resolved.value, previous));
                        }
                    }
                    Err(err) => report.failures.push(DependencyFailure {
                        group_id: dependency.group_id.clone(),
                        artifact_id: dependency.artifact_id.clone(),
                        reason: err.to_string(),
                    }),
                }
            }
        }

        for (slot, idx, new_version, previous) in plan {
            let Manifest {
                properties,
                dependencies,
                managed_dependencies,
                ..
            } = manifest;
            let dependency = match slot {
                Slot::Direct => &mut dependencies[idx],
                Slot::Managed => &mut managed_dependencies[idx],
            };
            match property::update_version(properties, dependency, &new_version) {
                Ok(()) => {
                    info!(
                        "updated {} from {} to {}",
                        dependency.artifact_id.as_deref().unwrap_or("?"),
                        previous.as_deref().unwrap_or("(none)"),
                        new_version
                    );
                    report.updated.push(DependencyUpdate {
                        group_id: dependency.group_id.clone().unwrap_or_default(),
                        artifact_id: dependency.artifact_id.clone().unwrap_or_default(),
                        from: previous,
                        to: new_version,
                    });
                }
                Err(err) => report.failures.push(DependencyFailure {
                    group_id: dependency.group_id.clone(),
                    artifact_id: dependency.artifact_id.clone(),
                    reason: err.to_string(),
                }),
            }
        }

        report
    }
}

impl Default for VersionResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::types::Repository;
    use crate::version::source::{
        MockLocalVersionSource, MockMetadataSource, MockSearchIndexSource,
    };

    fn dependency(version: Option<&str>) -> Dependency {
        Dependency {
            group_id: Some("org.example".into()),
            artifact_id: Some("widget".into()),
            version: version.map(String::from),
            ..Default::default()
        }
    }

    fn resolver(
        index: MockSearchIndexSource,
        local: MockLocalVersionSource,
        metadata: MockMetadataSource,
    ) -> VersionResolver {
        VersionResolver::with_sources(Box::new(index), Box::new(local), Box::new(metadata))
    }

    #[tokio::test]
    async fn search_index_answer_short_circuits_the_chain() {
        let mut index = MockSearchIndexSource::new();
        index
            .expect_latest_version()
            .times(1)
            .returning(|_| Ok(Some("2.0.0".to_string())));
        let mut local = MockLocalVersionSource::new();
        local.expect_list_versions().times(0);
        let mut metadata = MockMetadataSource::new();
        metadata.expect_release_version().times(0);

        let resolved = resolver(index, local, metadata)
            .resolve_latest(&dependency(Some("1.0.0")), &Manifest::default())
            .await
            .unwrap();
        assert_eq!(resolved, ResolvedVersion::new("2.0.0", VersionOrigin::SearchIndex));
    }

    #[tokio::test]
    async fn local_repository_is_consulted_when_index_is_silent() {
        let mut index = MockSearchIndexSource::new();
        index.expect_latest_version().returning(|_| Ok(None));
        let mut local = MockLocalVersionSource::new();
        local.expect_list_versions().times(1).returning(|_| {
            vec![
                "1.0.0".to_string(),
                "1.2.0".to_string(),
                "1.3.0-SNAPSHOT".to_string(),
            ]
        });
        let mut metadata = MockMetadataSource::new();
        metadata.expect_release_version().times(0);

        let resolved = resolver(index, local, metadata)
            .resolve_latest(&dependency(Some("1.0.0")), &Manifest::default())
            .await
            .unwrap();
        assert_eq!(
            resolved,
            ResolvedVersion::new("1.2.0", VersionOrigin::LocalRepository)
        );
    }

    #[tokio::test]
    async fn metadata_tries_declared_repositories_before_well_known_ones() {
        let mut index = MockSearchIndexSource::new();
        index.expect_latest_version().returning(|_| Ok(None));
        let mut local = MockLocalVersionSource::new();
        local.expect_list_versions().returning(|_| Vec::new());
        let mut metadata = MockMetadataSource::new();
        metadata
            .expect_release_version()
            .times(1)
            .withf(|url, _| url == "https://repo.internal/releases")
            .returning(|_, _| Some("3.3.0".to_string()));

        let manifest = Manifest {
            repositories: vec![Repository {
                url: "https://repo.internal/releases".to_string(),
            }],
            ..Default::default()
        };
        let resolved = resolver(index, local, metadata)
            .resolve_latest(&dependency(Some("1.0.0")), &manifest)
            .await
            .unwrap();
        assert_eq!(
            resolved,
            ResolvedVersion::new("3.3.0", VersionOrigin::RepositoryMetadata)
        );
    }

    #[tokio::test]
    async fn exhausted_chain_keeps_the_current_version() {
        let mut index = MockSearchIndexSource::new();
        index.expect_latest_version().returning(|_| Ok(None));
        let mut local = MockLocalVersionSource::new();
        local.expect_list_versions().returning(|_| Vec::new());
        let mut metadata = MockMetadataSource::new();
        metadata.expect_release_version().returning(|_, _| None);

        let resolved = resolver(index, local, metadata)
            .resolve_latest(&dependency(Some("${widget.version}")), &Manifest::default())
            .await
            .unwrap();
        // The raw field value, placeholder and all, with the origin that
        // blocks writing it back.
        assert_eq!(
            resolved,
            ResolvedVersion::new("${widget.version}", VersionOrigin::Unchanged)
        );
    }

    #[tokio::test]
    async fn exhausted_chain_without_current_version_is_an_error() {
        let mut index = MockSearchIndexSource::new();
        index.expect_latest_version().returning(|_| {
            Err(crate::version::error::RepositoryError::Status {
                url: "https://index.invalid".to_string(),
                status: 500,
            })
        });
        let mut local = MockLocalVersionSource::new();
        local.expect_list_versions().returning(|_| Vec::new());
        let mut metadata = MockMetadataSource::new();
        metadata.expect_release_version().returning(|_, _| None);

        let err = resolver(index, local, metadata)
            .resolve_latest(&dependency(None), &Manifest::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Exhausted { ref causes, .. } if causes.len() == 1
        ));
    }

    #[tokio::test]
    async fn missing_coordinate_fails_without_touching_sources() {
        let mut index = MockSearchIndexSource::new();
        index.expect_latest_version().times(0);
        let mut local = MockLocalVersionSource::new();
        local.expect_list_versions().times(0);
        let mut metadata = MockMetadataSource::new();
        metadata.expect_release_version().times(0);

        let incomplete = Dependency {
            artifact_id: Some("widget".into()),
            ..Default::default()
        };
        let err = resolver(index, local, metadata)
            .resolve_latest(&incomplete, &Manifest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::IncompleteCoordinate { .. }));
    }

    #[test]
    fn needs_update_compares_expanded_versions_literally() {
        let mut manifest = Manifest {
            dependencies: vec![dependency(Some("1.0.0"))],
            ..Default::default()
        };
        manifest.rewrite_versions_to_properties();
        let dep = manifest.dependencies[0].clone();

        let same = ResolvedVersion::new("1.0.0", VersionOrigin::SearchIndex);
        assert!(!VersionResolver::needs_update(&manifest, &dep, &same));

        let newer = ResolvedVersion::new("1.2.0", VersionOrigin::SearchIndex);
        assert!(VersionResolver::needs_update(&manifest, &dep, &newer));

        // Same release spelled differently still counts as a change.
        let respelled = ResolvedVersion::new("1.0", VersionOrigin::SearchIndex);
        assert!(VersionResolver::needs_update(&manifest, &dep, &respelled));

        let unchanged = ResolvedVersion::new("9.9.9", VersionOrigin::Unchanged);
        assert!(!VersionResolver::needs_update(&manifest, &dep, &unchanged));
    }

    #[tokio::test]
    async fn update_manifest_applies_changes_through_properties() {
        let mut index = MockSearchIndexSource::new();
        index
            .expect_latest_version()
            .returning(|_| Ok(Some("1.2.0".to_string())));
        let local = MockLocalVersionSource::new();
        let metadata = MockMetadataSource::new();

        let mut manifest = Manifest {
            dependencies: vec![dependency(Some("1.0.0"))],
            ..Default::default()
        };
        manifest.rewrite_versions_to_properties();

        let report = resolver(index, local, metadata)
            .update_manifest(&mut manifest)
            .await;

        assert_eq!(report.checked, 1);
        assert_eq!(report.updated.len(), 1);
        assert!(report.failures.is_empty());
        assert_eq!(report.updated[0].from.as_deref(), Some("1.0.0"));
        assert_eq!(report.updated[0].to, "1.2.0");
        assert_eq!(
            manifest.properties.get("widget.version"),
            Some(&"1.2.0".to_string())
        );
        assert_eq!(
            manifest.dependencies[0].version.as_deref(),
            Some("${widget.version}")
        );
    }

    #[tokio::test]
    async fn update_manifest_covers_managed_dependencies() {
        let mut index = MockSearchIndexSource::new();
        index
            .expect_latest_version()
            .returning(|_| Ok(Some("5.0.0".to_string())));
        let local = MockLocalVersionSource::new();
        let metadata = MockMetadataSource::new();

        let mut manifest = Manifest {
            managed_dependencies: vec![dependency(Some("4.0.0"))],
            ..Default::default()
        };
        let report = resolver(index, local, metadata)
            .update_manifest(&mut manifest)
            .await;

        assert_eq!(report.updated.len(), 1);
        assert_eq!(
            manifest.managed_dependencies[0].version.as_deref(),
            Some("5.0.0")
        );
    }

    #[tokio::test]
    async fn update_manifest_records_failures_and_continues() {
        let mut index = MockSearchIndexSource::new();
        index
            .expect_latest_version()
            .returning(|_| Ok(Some("2.0.0".to_string())));
        let local = MockLocalVersionSource::new();
        let metadata = MockMetadataSource::new();

        let incomplete = Dependency {
            artifact_id: Some("no-group".into()),
            version: Some("1.0.0".into()),
            ..Default::default()
        };
        let mut manifest = Manifest {
            dependencies: vec![incomplete, dependency(Some("1.0.0"))],
            ..Default::default()
        };
        let report = resolver(index, local, metadata)
            .update_manifest(&mut manifest)
            .await;

        assert_eq!(report.checked, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.updated.len(), 1);
        assert_eq!(manifest.dependencies[1].version.as_deref(), Some("2.0.0"));
    }

    #[tokio::test]
    async fn update_manifest_skips_versions_already_current() {
        let mut index = MockSearchIndexSource::new();
        index
            .expect_latest_version()
            .returning(|_| Ok(Some("1.0.0".to_string())));
        let local = MockLocalVersionSource::new();
        let metadata = MockMetadataSource::new();

        let mut manifest = Manifest {
            dependencies: vec![dependency(Some("1.0.0"))],
            ..Default::default()
        };
        let before = manifest.clone();
        let report = resolver(index, local, metadata)
            .update_manifest(&mut manifest)
            .await;

        assert_eq!(report.checked, 1);
        assert!(report.updated.is_empty());
        assert_eq!(manifest, before);
    }
}
