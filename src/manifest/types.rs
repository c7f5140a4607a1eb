//! Common types for project manifests

use std::path::PathBuf;

use indexmap::IndexMap;

/// Identifies an artifact family, independent of version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Coordinate {
    pub group_id: String,
    pub artifact_id: String,
}

impl Coordinate {
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
        }
    }

    /// Group id mapped to a repository path segment (com.example -> com/example)
    pub fn group_path(&self) -> String {
        self.group_id.replace('.', "/")
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)
    }
}

/// Dependency scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Compile,
    Provided,
    Runtime,
    Test,
    System,
    Import,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Compile => "compile",
            Scope::Provided => "provided",
            Scope::Runtime => "runtime",
            Scope::Test => "test",
            Scope::System => "system",
            Scope::Import => "import",
        }
    }
}

impl std::str::FromStr for Scope {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compile" => Ok(Scope::Compile),
            "provided" => Ok(Scope::Provided),
            "runtime" => Ok(Scope::Runtime),
            "test" => Ok(Scope::Test),
            "system" => Ok(Scope::System),
            "import" => Ok(Scope::Import),
            _ => Err(()),
        }
    }
}

/// A single dependency entry in a manifest.
///
/// The version may be a literal value or a `${name}` placeholder resolved
/// through the owning manifest's property table. Managed dependencies may
/// omit the version entirely.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Dependency {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub scope: Option<Scope>,
    pub dep_type: Option<String>,
}

impl Dependency {
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: Some(group_id.into()),
            artifact_id: Some(artifact_id.into()),
            ..Default::default()
        }
    }

    /// Returns the coordinate pair, or None when either id is missing.
    pub fn coordinate(&self) -> Option<Coordinate> {
        Some(Coordinate {
            group_id: self.group_id.clone()?,
            artifact_id: self.artifact_id.clone()?,
        })
    }

    /// Dependency type, defaulting to "jar" when unspecified.
    pub fn kind(&self) -> &str {
        self.dep_type.as_deref().unwrap_or("jar")
    }

    /// Human-readable summary: `groupId:artifactId:version (scope) [type]`.
    ///
    /// A missing version renders as `managed`; the type suffix is omitted
    /// for plain jars.
    pub fn display(&self) -> String {
        let mut out = format!(
            "{}:{}:{}",
            self.group_id.as_deref().unwrap_or("?"),
            self.artifact_id.as_deref().unwrap_or("?"),
            self.version.as_deref().unwrap_or("managed"),
        );
        if let Some(scope) = self.scope {
            out.push_str(&format!(" ({})", scope.as_str()));
        }
        if self.kind() != "jar" {
            out.push_str(&format!(" [{}]", self.kind()));
        }
        out
    }
}

/// Reference to a parent manifest. All three coordinates are required in
/// the reference itself; only the location hint is optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRef {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub relative_path: Option<String>,
}

impl ParentRef {
    /// Full coordinate key used for parent memoization.
    pub fn coordinate_key(&self) -> String {
        format!("{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

/// A remote repository declared in a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub url: String,
}

/// A parsed project manifest.
///
/// Coordinates may be partial: groupId and version can be inherited from a
/// parent manifest (see [`crate::manifest::inheritance`]). Properties keep
/// their declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Manifest {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub parent: Option<ParentRef>,
    pub properties: IndexMap<String, String>,
    pub dependencies: Vec<Dependency>,
    pub managed_dependencies: Vec<Dependency>,
    pub repositories: Vec<Repository>,
    pub source_path: Option<PathBuf>,
}

impl Manifest {
    /// True when both groupId and version are present and no inheritance
    /// is needed.
    pub fn has_complete_coordinates(&self) -> bool {
        self.group_id.is_some() && self.version.is_some()
    }
}
