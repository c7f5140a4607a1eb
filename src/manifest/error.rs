use std::path::PathBuf;

use thiserror::Error;

/// The manifest text could not be understood.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ParseError(pub String);

/// A manifest file could not be read or parsed.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read manifest {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed manifest {}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

impl LoadError {
    /// The offending manifest path.
    pub fn path(&self) -> &PathBuf {
        match self {
            LoadError::Io { path, .. } => path,
            LoadError::Malformed { path, .. } => path,
        }
    }
}

/// A resolved manifest could not be written back.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("failed to write manifest {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot update manifest {}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

/// A discovered version cannot be applied to a dependency.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("replacement version for {artifact_id} is empty")]
    EmptyVersion { artifact_id: String },

    #[error("version property `{property}` is not defined in the manifest")]
    MissingProperty { property: String },
}
