//! Manifest layer
//! - types.rs: model types (Manifest, Dependency, Coordinate, ParentRef)
//! - pom.rs: pom.xml reader and writer
//! - property.rs: `${name}` placeholder expansion and rewriting
//! - inheritance.rs: parent-manifest resolution with session caches
//! - error.rs: load/save/update error types

pub mod error;
pub mod inheritance;
pub mod pom;
pub mod property;
pub mod types;

pub use error::{LoadError, ParseError, SaveError, UpdateError};
pub use inheritance::{InheritanceResolver, find_manifest_files};
pub use types::{Coordinate, Dependency, Manifest, ParentRef, Repository, Scope};
