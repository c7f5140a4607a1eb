//! Version resolution layer
//!
//! Finds the latest available version of a manifest dependency by walking
//! a fallback chain of sources and applies the result back through the
//! manifest's property table.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Search index │────▶│  Local repo  │────▶│   Metadata   │
//! │   (remote)   │     │   (on disk)  │     │ (per repo)   │
//! └──────────────┘     └──────────────┘     └──────────────┘
//!        first answer wins; silence falls through to the next
//! ```
//!
//! # Modules
//!
//! - [`resolver`]: the fallback chain and whole-manifest update pass
//! - [`source`]: traits for the three source kinds
//! - [`sources`]: concrete source implementations
//! - [`compare`]: qualifier-aware version ordering
//! - [`types`]: resolved-version value types
//! - [`error`]: repository and resolution error types

pub mod compare;
pub mod error;
pub mod resolver;
pub mod source;
pub mod sources;
pub mod types;

pub use error::{RepositoryError, ResolveError};
pub use resolver::{DependencyFailure, DependencyUpdate, UpdateReport, VersionResolver};
pub use types::{ResolvedVersion, VersionOrigin};
