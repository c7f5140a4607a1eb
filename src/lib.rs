//! Dependency version management for pom.xml manifests
//!
//! Two layers:
//!
//! - [`manifest`]: reads and writes pom.xml files, expands `${property}`
//!   version placeholders, and resolves parent inheritance across a
//!   project tree.
//! - [`version`]: resolves the latest available version of each dependency
//!   through a fallback chain (search index, local repository, repository
//!   metadata) and applies updates back through the property table.
//!
//! [`config`] holds the endpoints, paths and timeouts both layers share.

pub mod config;
pub mod manifest;
pub mod version;
