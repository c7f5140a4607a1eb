use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pomver::manifest::{InheritanceResolver, Manifest, find_manifest_files, pom};
use pomver::version::VersionResolver;

#[derive(Parser)]
#[command(name = "pomver")]
#[command(version, about = "Dependency version management for pom.xml manifests")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the dependencies of every manifest under a path
    List {
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Report dependencies with a newer version available, without writing
    Check {
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Resolve the latest versions and write them back to the manifests
    Update {
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Rewrite literal dependency versions into version properties
    Format {
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::List { path } => list(&path),
        Command::Format { path } => format_manifests(&path),
        Command::Check { path } => run_async(check(path)),
        Command::Update { path } => run_async(update(path)),
    }
}

fn run_async<F>(future: F) -> anyhow::Result<()>
where
    F: std::future::Future<Output = anyhow::Result<()>>,
{
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(future)
}

/// A single manifest path is taken as-is; a directory is walked for
/// conventionally named manifest files.
fn manifest_paths(path: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if !path.exists() {
        anyhow::bail!("no such file or directory: {}", path.display());
    }
    if path.is_file() {
        Ok(vec![path.to_path_buf()])
    } else {
        Ok(find_manifest_files(path))
    }
}

fn coordinates_of(manifest: &Manifest) -> String {
    format!(
        "{}:{}:{}",
        manifest.group_id.as_deref().unwrap_or("?"),
        manifest.artifact_id.as_deref().unwrap_or("?"),
        manifest.version.as_deref().unwrap_or("?"),
    )
}

fn list(path: &Path) -> anyhow::Result<()> {
    let resolver = InheritanceResolver::new();
    for manifest_path in manifest_paths(path)? {
        let manifest = match resolver.resolve_file(&manifest_path) {
            Ok(manifest) => manifest,
            Err(err) => {
                eprintln!("{}: {}", manifest_path.display(), err);
                continue;
            }
        };
        println!("{} ({})", manifest_path.display(), coordinates_of(&manifest));
        for dependency in manifest
            .dependencies
            .iter()
            .chain(manifest.managed_dependencies.iter())
        {
            println!("  {}", dependency.display());
        }
    }
    Ok(())
}

async fn check(path: PathBuf) -> anyhow::Result<()> {
    let resolver = VersionResolver::new();
    for manifest_path in manifest_paths(&path)? {
        let manifest = match pom::load(&manifest_path) {
            Ok(manifest) => manifest,
            Err(err) => {
                eprintln!("{}: {}", manifest_path.display(), err);
                continue;
            }
        };
        println!("{}", manifest_path.display());
        for dependency in manifest
            .dependencies
            .iter()
            .chain(manifest.managed_dependencies.iter())
        {
            match resolver.resolve_latest(dependency, &manifest).await {
                Ok(resolved) => {
                    if VersionResolver::needs_update(&manifest, dependency, &resolved) {
                        println!(
                            "  {} {} -> {}",
                            dependency.display(),
                            manifest
                                .effective_version(dependency)
                                .as_deref()
                                .unwrap_or("(none)"),
                            resolved.value,
                        );
                    }
                }
                Err(err) => eprintln!("  {}: {}", dependency.display(), err),
            }
        }
    }
    Ok(())
}

async fn update(path: PathBuf) -> anyhow::Result<()> {
    let resolver = VersionResolver::new();
    for manifest_path in manifest_paths(&path)? {
        let mut manifest = match pom::load(&manifest_path) {
            Ok(manifest) => manifest,
            Err(err) => {
                eprintln!("{}: {}", manifest_path.display(), err);
                continue;
            }
        };

        let report = resolver.update_manifest(&mut manifest).await;
        for failure in &report.failures {
            eprintln!(
                "{}: {}:{}: {}",
                manifest_path.display(),
                failure.group_id.as_deref().unwrap_or("?"),
                failure.artifact_id.as_deref().unwrap_or("?"),
                failure.reason,
            );
        }
        if report.updated.is_empty() {
            println!("{}: up to date", manifest_path.display());
            continue;
        }

        pom::save_updates(&manifest, &manifest_path)?;
        for change in &report.updated {
            println!(
                "{}: {}:{} {} -> {}",
                manifest_path.display(),
                change.group_id,
                change.artifact_id,
                change.from.as_deref().unwrap_or("(none)"),
                change.to,
            );
        }
    }
    Ok(())
}

fn format_manifests(path: &Path) -> anyhow::Result<()> {
    for manifest_path in manifest_paths(path)? {
        let mut manifest = match pom::load(&manifest_path) {
            Ok(manifest) => manifest,
            Err(err) => {
                eprintln!("{}: {}", manifest_path.display(), err);
                continue;
            }
        };
        let before = manifest.clone();
        manifest.rewrite_versions_to_properties();
        if manifest == before {
            println!("{}: already formatted", manifest_path.display());
            continue;
        }
        pom::save_updates(&manifest, &manifest_path)?;
        println!("{}: versions moved to properties", manifest_path.display());
    }
    Ok(())
}
