//! Property indirection for dependency versions
//!
//! Manifests may declare a dependency version as a `${name}` placeholder
//! backed by the property table. This module expands placeholders to their
//! literal values, rewrites literal versions into placeholders, and applies
//! new versions through whichever form a dependency currently uses.

use indexmap::IndexMap;
use tracing::debug;

use crate::manifest::error::UpdateError;
use crate::manifest::types::{Dependency, Manifest};

/// Extracts the property name from a `${name}` placeholder, or None for a
/// literal value.
pub fn placeholder_name(version: &str) -> Option<&str> {
    version
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
}

/// Expands a version through the property table.
///
/// A literal value is returned unchanged. A placeholder whose property is
/// missing is returned as the placeholder text itself; callers treat that
/// as an unknown version.
pub fn effective_version<'a>(
    properties: &'a IndexMap<String, String>,
    version: &'a str,
) -> &'a str {
    match placeholder_name(version) {
        Some(name) => properties.get(name).map(String::as_str).unwrap_or(version),
        None => version,
    }
}

/// Moves a literal dependency version into the property table under the
/// conventional `{artifactId}.version` name, replacing the field with a
/// placeholder. Idempotent: a version that is already a placeholder is
/// left alone.
pub fn rewrite_to_property(properties: &mut IndexMap<String, String>, dependency: &mut Dependency) {
    let Some(artifact_id) = dependency.artifact_id.as_deref() else {
        return;
    };
    let Some(version) = dependency.version.as_deref() else {
        return;
    };
    if placeholder_name(version).is_some() {
        return;
    }

    let property = format!("{artifact_id}.version");
    properties.insert(property.clone(), version.to_string());
    dependency.version = Some(format!("${{{property}}}"));
}

/// Applies a new version to a dependency.
///
/// When the current version is a placeholder the backing property is
/// updated in place; a placeholder without a backing property is an
/// inconsistent manifest and fails. A literal version is replaced
/// directly.
pub fn update_version(
    properties: &mut IndexMap<String, String>,
    dependency: &mut Dependency,
    new_version: &str,
) -> Result<(), UpdateError> {
    if new_version.trim().is_empty() {
        return Err(UpdateError::EmptyVersion {
            artifact_id: dependency
                .artifact_id
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
        });
    }

    match dependency.version.as_deref().and_then(placeholder_name) {
        Some(property) => {
            if !properties.contains_key(property) {
                return Err(UpdateError::MissingProperty {
                    property: property.to_string(),
                });
            }
            let previous = properties.insert(property.to_string(), new_version.to_string());
            debug!(
                "updated property {} from {:?} to {}",
                property, previous, new_version
            );
        }
        None => {
            debug!(
                "updated {} version directly from {:?} to {}",
                dependency.artifact_id.as_deref().unwrap_or("?"),
                dependency.version,
                new_version
            );
            dependency.version = Some(new_version.to_string());
        }
    }

    Ok(())
}

impl Manifest {
    /// Expanded version of a dependency entry, placeholder resolved through
    /// this manifest's properties.
    pub fn effective_version(&self, dependency: &Dependency) -> Option<String> {
        dependency
            .version
            .as_deref()
            .map(|v| effective_version(&self.properties, v).to_string())
    }

    /// Rewrites every literal dependency version (direct and managed) into
    /// a `{artifactId}.version` property placeholder.
    pub fn rewrite_versions_to_properties(&mut self) {
        let Manifest {
            properties,
            dependencies,
            managed_dependencies,
            ..
        } = self;
        for dependency in dependencies.iter_mut().chain(managed_dependencies.iter_mut()) {
            rewrite_to_property(properties, dependency);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn manifest_with_dependency(version: Option<&str>) -> Manifest {
        Manifest {
            dependencies: vec![Dependency {
                group_id: Some("org.x".into()),
                artifact_id: Some("lib".into()),
                version: version.map(String::from),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[rstest]
    #[case("${lib.version}", Some("lib.version"))]
    #[case("1.0.0", None)]
    #[case("${unclosed", None)]
    #[case("prefix${x}", None)]
    fn placeholder_name_matches_exact_placeholders(
        #[case] version: &str,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(placeholder_name(version), expected);
    }

    #[test]
    fn effective_version_expands_placeholder() {
        let mut properties = IndexMap::new();
        properties.insert("lib.version".to_string(), "1.0.0".to_string());
        assert_eq!(effective_version(&properties, "${lib.version}"), "1.0.0");
    }

    #[test]
    fn effective_version_returns_placeholder_text_when_property_missing() {
        let properties = IndexMap::new();
        assert_eq!(
            effective_version(&properties, "${lib.version}"),
            "${lib.version}"
        );
    }

    #[test]
    fn rewrite_then_expand_round_trips_the_literal() {
        let mut manifest = manifest_with_dependency(Some("1.0.0"));
        manifest.rewrite_versions_to_properties();

        let dep = &manifest.dependencies[0];
        assert_eq!(dep.version.as_deref(), Some("${lib.version}"));
        assert_eq!(manifest.effective_version(dep), Some("1.0.0".to_string()));
    }

    #[test]
    fn rewrite_is_idempotent() {
        let mut manifest = manifest_with_dependency(Some("1.0.0"));
        manifest.rewrite_versions_to_properties();
        let after_first = manifest.clone();

        manifest.rewrite_versions_to_properties();
        assert_eq!(manifest, after_first);
        assert_eq!(manifest.properties.len(), 1);
    }

    #[test]
    fn rewrite_skips_dependencies_without_version() {
        let mut manifest = manifest_with_dependency(None);
        manifest.rewrite_versions_to_properties();
        assert!(manifest.properties.is_empty());
        assert_eq!(manifest.dependencies[0].version, None);
    }

    #[test]
    fn rewrite_covers_managed_dependencies() {
        let mut manifest = Manifest {
            managed_dependencies: vec![Dependency {
                group_id: Some("org.x".into()),
                artifact_id: Some("managed-lib".into()),
                version: Some("2.0.0".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        manifest.rewrite_versions_to_properties();

        assert_eq!(
            manifest.properties.get("managed-lib.version"),
            Some(&"2.0.0".to_string())
        );
        assert_eq!(
            manifest.managed_dependencies[0].version.as_deref(),
            Some("${managed-lib.version}")
        );
    }

    #[test]
    fn update_version_rewrites_backing_property() {
        let mut manifest = manifest_with_dependency(Some("1.0.0"));
        manifest.rewrite_versions_to_properties();

        let Manifest {
            properties,
            dependencies,
            ..
        } = &mut manifest;
        update_version(properties, &mut dependencies[0], "1.2.0").unwrap();

        assert_eq!(
            manifest.properties.get("lib.version"),
            Some(&"1.2.0".to_string())
        );
        // The dependency field keeps pointing at the property.
        assert_eq!(
            manifest.dependencies[0].version.as_deref(),
            Some("${lib.version}")
        );
    }

    #[test]
    fn update_version_replaces_literal_directly() {
        let mut manifest = manifest_with_dependency(Some("1.0.0"));
        let Manifest {
            properties,
            dependencies,
            ..
        } = &mut manifest;
        update_version(properties, &mut dependencies[0], "1.2.0").unwrap();
        assert_eq!(manifest.dependencies[0].version.as_deref(), Some("1.2.0"));
        assert!(manifest.properties.is_empty());
    }

    #[test]
    fn update_version_fails_for_missing_backing_property() {
        let mut manifest = manifest_with_dependency(Some("${lib.version}"));
        let Manifest {
            properties,
            dependencies,
            ..
        } = &mut manifest;
        let err = update_version(properties, &mut dependencies[0], "1.2.0").unwrap_err();
        assert!(matches!(
            err,
            UpdateError::MissingProperty { property } if property == "lib.version"
        ));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn update_version_rejects_blank_values(#[case] new_version: &str) {
        let mut manifest = manifest_with_dependency(Some("1.0.0"));
        let Manifest {
            properties,
            dependencies,
            ..
        } = &mut manifest;
        let err = update_version(properties, &mut dependencies[0], new_version).unwrap_err();
        assert!(matches!(err, UpdateError::EmptyVersion { .. }));
    }
}
