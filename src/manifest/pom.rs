//! pom.xml reader and writer
//!
//! Best-effort tag extraction rather than schema validation: the reader
//! pulls out the fields the resolver cares about (coordinates, parent
//! reference, properties, dependency lists, repositories) and ignores
//! everything else. Blocks with their own coordinate, property or
//! dependency tags (build, profiles, ...) are excised up front so they
//! cannot shadow the project-level ones. Write-back goes through
//! [`apply_updates`], which edits the original text in place and leaves
//! unmodeled content untouched.

use std::path::Path;

use indexmap::IndexMap;
use tracing::debug;

use crate::manifest::error::{LoadError, ParseError, SaveError};
use crate::manifest::types::{Dependency, Manifest, ParentRef, Repository, Scope};

/// Byte span of an element within its enclosing text.
struct Element {
    start: usize,
    end: usize,
    inner_start: usize,
    inner_end: usize,
}

/// Finds the first occurrence of `<tag ...>...</tag>`, skipping
/// self-closing forms.
fn find_element(xml: &str, tag: &str) -> Option<Element> {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");
    let mut search_from = 0;

    while let Some(rel) = xml[search_from..].find(&open) {
        let start = search_from + rel;
        let after = start + open.len();

        let inner_start = match xml[after..].chars().next() {
            Some('>') => after + 1,
            Some(c) if c.is_whitespace() => {
                let gt = xml[after..].find('>').map(|i| after + i)?;
                if xml[..gt].ends_with('/') {
                    search_from = gt + 1;
                    continue;
                }
                gt + 1
            }
            Some('/') => {
                // <tag/>
                search_from = after + 1;
                continue;
            }
            _ => {
                // A longer tag name sharing this prefix.
                search_from = after;
                continue;
            }
        };

        let inner_end = xml[inner_start..].find(&close).map(|i| inner_start + i)?;
        return Some(Element {
            start,
            end: inner_end + close.len(),
            inner_start,
            inner_end,
        });
    }
    None
}

/// Inner bodies of every `<tag>` element, in document order.
fn elements<'a>(xml: &'a str, tag: &str) -> Vec<&'a str> {
    let mut out = Vec::new();
    let mut rest = xml;
    while let Some(el) = find_element(rest, tag) {
        out.push(&rest[el.inner_start..el.inner_end]);
        rest = &rest[el.end..];
    }
    out
}

/// Removes the first `<tag>` element from the body, returning its inner
/// text.
fn remove_first(body: &mut String, tag: &str) -> Option<String> {
    let el = find_element(body, tag)?;
    let inner = body[el.inner_start..el.inner_end].to_string();
    body.replace_range(el.start..el.end, "");
    Some(inner)
}

/// Finds the first `<tag>` element among the direct children of the
/// `start..end` range, skipping the contents of every other child so
/// nested blocks (profiles, build, exclusions) stay invisible. Offsets
/// are absolute within `xml`.
fn find_child(xml: &str, start: usize, end: usize, tag: &str) -> Option<Element> {
    let mut pos = start;
    while pos < end {
        let lt = pos + xml[pos..end].find('<')?;
        let rest = &xml[lt..end];
        if rest.starts_with("<!--") {
            pos = lt + rest.find("-->")? + 3;
            continue;
        }
        if rest.starts_with("</") || rest.starts_with("<?") || rest.starts_with("<!") {
            pos = lt + rest.find('>')? + 1;
            continue;
        }

        let name_len = rest[1..].find(|c: char| c.is_whitespace() || c == '>' || c == '/')?;
        let name = &rest[1..1 + name_len];
        let gt = rest.find('>')?;

        if rest[..gt].ends_with('/') {
            if name == tag {
                let after = lt + gt + 1;
                return Some(Element {
                    start: lt,
                    end: after,
                    inner_start: after,
                    inner_end: after,
                });
            }
            pos = lt + gt + 1;
            continue;
        }

        let inner_start = lt + gt + 1;
        let close = format!("</{name}>");
        let inner_end = inner_start + xml[inner_start..end].find(&close)?;
        let elem_end = inner_end + close.len();
        if name == tag {
            return Some(Element {
                start: lt,
                end: elem_end,
                inner_start,
                inner_end,
            });
        }
        pos = elem_end;
    }
    None
}

/// Every direct `<tag>` child of the range, in document order.
fn children(xml: &str, start: usize, end: usize, tag: &str) -> Vec<Element> {
    let mut out = Vec::new();
    let mut pos = start;
    while let Some(el) = find_child(xml, pos, end, tag) {
        pos = el.end;
        out.push(el);
    }
    out
}

/// Trimmed, unescaped text of the first `<tag>` element.
fn text_of(xml: &str, tag: &str) -> Option<String> {
    let el = find_element(xml, tag)?;
    Some(unescape(xml[el.inner_start..el.inner_end].trim()))
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Parses manifest text into a [`Manifest`].
pub fn parse_manifest(content: &str) -> Result<Manifest, ParseError> {
    let project = find_element(content, "project")
        .ok_or_else(|| ParseError("missing <project> root element".to_string()))?;
    let mut body = content[project.inner_start..project.inner_end].to_string();

    let parent = match remove_first(&mut body, "parent") {
        Some(inner) => Some(parse_parent(&inner)?),
        None => None,
    };

    // These carry their own coordinates, properties and dependency lists
    // and must not shadow the project-level ones, wherever they appear in
    // document order.
    for tag in [
        "build",
        "profiles",
        "reporting",
        "pluginRepositories",
        "distributionManagement",
    ] {
        while remove_first(&mut body, tag).is_some() {}
    }

    let managed_dependencies = remove_first(&mut body, "dependencyManagement")
        .and_then(|dm| {
            find_element(&dm, "dependencies").map(|el| dm[el.inner_start..el.inner_end].to_string())
        })
        .map(|deps| parse_dependencies(&deps))
        .unwrap_or_default();

    let dependencies = remove_first(&mut body, "dependencies")
        .map(|deps| parse_dependencies(&deps))
        .unwrap_or_default();

    let properties = remove_first(&mut body, "properties")
        .map(|props| parse_properties(&props))
        .unwrap_or_default();

    let repositories = remove_first(&mut body, "repositories")
        .map(|repos| {
            elements(&repos, "repository")
                .into_iter()
                .filter_map(|repo| text_of(repo, "url"))
                .map(|url| Repository { url })
                .collect()
        })
        .unwrap_or_default();

    Ok(Manifest {
        group_id: text_of(&body, "groupId"),
        artifact_id: text_of(&body, "artifactId"),
        version: text_of(&body, "version"),
        parent,
        properties,
        dependencies,
        managed_dependencies,
        repositories,
        source_path: None,
    })
}

fn parse_parent(inner: &str) -> Result<ParentRef, ParseError> {
    let field = |tag: &str| {
        text_of(inner, tag)
            .ok_or_else(|| ParseError(format!("incomplete <parent> reference: missing <{tag}>")))
    };
    Ok(ParentRef {
        group_id: field("groupId")?,
        artifact_id: field("artifactId")?,
        version: field("version")?,
        relative_path: text_of(inner, "relativePath").filter(|p| !p.is_empty()),
    })
}

fn parse_dependencies(deps_body: &str) -> Vec<Dependency> {
    elements(deps_body, "dependency")
        .into_iter()
        .map(|inner| {
            // Exclusions nest their own groupId/artifactId pairs.
            let mut body = inner.to_string();
            while remove_first(&mut body, "exclusions").is_some() {}

            Dependency {
                group_id: text_of(&body, "groupId"),
                artifact_id: text_of(&body, "artifactId"),
                version: text_of(&body, "version"),
                scope: text_of(&body, "scope").and_then(|s| s.parse::<Scope>().ok()),
                dep_type: text_of(&body, "type"),
            }
        })
        .collect()
}

fn parse_properties(body: &str) -> IndexMap<String, String> {
    let mut props = IndexMap::new();
    let mut rest = body;

    while let Some(lt) = rest.find('<') {
        let after = &rest[lt + 1..];
        if after.starts_with('/') || after.starts_with('!') {
            rest = after;
            continue;
        }
        let Some(gt) = after.find('>') else { break };
        let raw_name = &after[..gt];

        if let Some(name) = raw_name.strip_suffix('/') {
            // Self-closing property means an empty value.
            let name = name.trim();
            if !name.is_empty() && !name.contains(char::is_whitespace) {
                props.insert(name.to_string(), String::new());
            }
            rest = &after[gt + 1..];
            continue;
        }

        let name = raw_name.trim();
        if name.is_empty() || name.contains(char::is_whitespace) {
            rest = after;
            continue;
        }

        let value_body = &after[gt + 1..];
        let close = format!("</{name}>");
        let Some(end) = value_body.find(&close) else {
            rest = value_body;
            continue;
        };
        props.insert(name.to_string(), unescape(value_body[..end].trim()));
        rest = &value_body[end + close.len()..];
    }

    props
}

/// Reads and parses a manifest file, recording its source path.
pub fn load(path: &Path) -> Result<Manifest, LoadError> {
    debug!("loading manifest from {}", path.display());
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut manifest = parse_manifest(&content).map_err(|source| LoadError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;
    manifest.source_path = Some(path.to_path_buf());
    Ok(manifest)
}

/// Serializes a manifest back to pom.xml text.
pub fn render(manifest: &Manifest) -> String {
    let mut out = String::with_capacity(1024);
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(concat!(
        "<project xmlns=\"http://maven.apache.org/POM/4.0.0\"\n",
        "         xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\"\n",
        "         xsi:schemaLocation=\"http://maven.apache.org/POM/4.0.0 ",
        "http://maven.apache.org/xsd/maven-4.0.0.xsd\">\n",
    ));
    push_tag(&mut out, 1, "modelVersion", "4.0.0");

    if let Some(parent) = &manifest.parent {
        push_line(&mut out, 1, "<parent>");
        push_tag(&mut out, 2, "groupId", &parent.group_id);
        push_tag(&mut out, 2, "artifactId", &parent.artifact_id);
        push_tag(&mut out, 2, "version", &parent.version);
        if let Some(path) = &parent.relative_path {
            push_tag(&mut out, 2, "relativePath", path);
        }
        push_line(&mut out, 1, "</parent>");
    }

    if let Some(group_id) = &manifest.group_id {
        push_tag(&mut out, 1, "groupId", group_id);
    }
    if let Some(artifact_id) = &manifest.artifact_id {
        push_tag(&mut out, 1, "artifactId", artifact_id);
    }
    if let Some(version) = &manifest.version {
        push_tag(&mut out, 1, "version", version);
    }

    if !manifest.properties.is_empty() {
        push_line(&mut out, 1, "<properties>");
        for (name, value) in &manifest.properties {
            push_tag(&mut out, 2, name, value);
        }
        push_line(&mut out, 1, "</properties>");
    }

    if !manifest.managed_dependencies.is_empty() {
        push_line(&mut out, 1, "<dependencyManagement>");
        push_line(&mut out, 2, "<dependencies>");
        for dependency in &manifest.managed_dependencies {
            push_dependency(&mut out, 3, dependency);
        }
        push_line(&mut out, 2, "</dependencies>");
        push_line(&mut out, 1, "</dependencyManagement>");
    }

    if !manifest.dependencies.is_empty() {
        push_line(&mut out, 1, "<dependencies>");
        for dependency in &manifest.dependencies {
            push_dependency(&mut out, 2, dependency);
        }
        push_line(&mut out, 1, "</dependencies>");
    }

    if !manifest.repositories.is_empty() {
        push_line(&mut out, 1, "<repositories>");
        for repository in &manifest.repositories {
            push_line(&mut out, 2, "<repository>");
            push_tag(&mut out, 3, "url", &repository.url);
            push_line(&mut out, 2, "</repository>");
        }
        push_line(&mut out, 1, "</repositories>");
    }

    out.push_str("</project>\n");
    out
}

/// Writes a freshly rendered manifest to disk. Only suitable for files
/// the model fully describes; for edits to an existing pom use
/// [`save_updates`].
pub fn save(manifest: &Manifest, path: &Path) -> Result<(), SaveError> {
    debug!("saving manifest to {}", path.display());
    std::fs::write(path, render(manifest)).map_err(|source| SaveError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Applies the manifest's property values and dependency versions onto
/// the original pom text as targeted edits.
///
/// Everything the model does not carry (packaging, name, modules, build,
/// profiles, plugin configuration, comments) survives byte for byte.
/// Dependency entries pair with model entries by position and are
/// double-checked by artifactId; an entry that no longer lines up is
/// left alone.
pub fn apply_updates(original: &str, manifest: &Manifest) -> Result<String, ParseError> {
    let mut text = original.to_string();
    sync_properties(&mut text, manifest)?;
    sync_dependency_versions(&mut text, &manifest.dependencies, false)?;
    sync_dependency_versions(&mut text, &manifest.managed_dependencies, true)?;
    Ok(text)
}

/// Reads the manifest's source file, applies the model's updates in
/// place, and writes the result back.
pub fn save_updates(manifest: &Manifest, path: &Path) -> Result<(), SaveError> {
    debug!("updating manifest at {}", path.display());
    let original = std::fs::read_to_string(path).map_err(|source| SaveError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let updated = apply_updates(&original, manifest).map_err(|source| SaveError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, updated).map_err(|source| SaveError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn project_span(text: &str) -> Result<Element, ParseError> {
    find_element(text, "project")
        .ok_or_else(|| ParseError("missing <project> root element".to_string()))
}

fn sync_properties(text: &mut String, manifest: &Manifest) -> Result<(), ParseError> {
    for (name, value) in &manifest.properties {
        // Spans shift with every edit, so everything is re-located per
        // property.
        let project = project_span(text)?;
        let props = match find_child(text, project.inner_start, project.inner_end, "properties") {
            Some(props) => props,
            None => {
                insert_properties_block(text, &project);
                let project = project_span(text)?;
                find_child(text, project.inner_start, project.inner_end, "properties")
                    .ok_or_else(|| ParseError("failed to create <properties> block".to_string()))?
            }
        };

        match find_child(text, props.inner_start, props.inner_end, name) {
            Some(el) => {
                if unescape(text[el.inner_start..el.inner_end].trim()) != *value {
                    text.replace_range(
                        el.start..el.end,
                        &format!("<{name}>{}</{name}>", escape(value)),
                    );
                }
            }
            None => {
                text.insert_str(
                    props.inner_end,
                    &format!("  <{name}>{}</{name}>\n  ", escape(value)),
                );
            }
        }
    }
    Ok(())
}

/// Places an empty properties block ahead of the first dependency
/// section, or at the end of the project body.
fn insert_properties_block(text: &mut String, project: &Element) {
    let insert_at = find_child(
        text,
        project.inner_start,
        project.inner_end,
        "dependencyManagement",
    )
    .or_else(|| find_child(text, project.inner_start, project.inner_end, "dependencies"))
    .map(|el| el.start)
    .unwrap_or(project.inner_end);
    text.insert_str(insert_at, "<properties>\n  </properties>\n  ");
}

fn sync_dependency_versions(
    text: &mut String,
    dependencies: &[Dependency],
    managed: bool,
) -> Result<(), ParseError> {
    for (idx, dependency) in dependencies.iter().enumerate() {
        let Some(version) = dependency.version.as_deref() else {
            continue;
        };

        let project = project_span(text)?;
        let list = if managed {
            let Some(dm) = find_child(
                text,
                project.inner_start,
                project.inner_end,
                "dependencyManagement",
            ) else {
                continue;
            };
            find_child(text, dm.inner_start, dm.inner_end, "dependencies")
        } else {
            find_child(text, project.inner_start, project.inner_end, "dependencies")
        };
        let Some(list) = list else { continue };

        let entries = children(text, list.inner_start, list.inner_end, "dependency");
        let Some(entry) = entries.get(idx) else {
            continue;
        };
        let artifact_in_text = find_child(text, entry.inner_start, entry.inner_end, "artifactId");
        if let (Some(el), Some(artifact_id)) = (&artifact_in_text, dependency.artifact_id.as_deref())
        {
            if unescape(text[el.inner_start..el.inner_end].trim()) != artifact_id {
                continue;
            }
        }

        match find_child(text, entry.inner_start, entry.inner_end, "version") {
            Some(el) => {
                if unescape(text[el.inner_start..el.inner_end].trim()) != version {
                    text.replace_range(
                        el.start..el.end,
                        &format!("<version>{}</version>", escape(version)),
                    );
                }
            }
            None => {
                text.insert_str(
                    entry.inner_end,
                    &format!("  <version>{}</version>\n    ", escape(version)),
                );
            }
        }
    }
    Ok(())
}

fn push_line(out: &mut String, indent: usize, line: &str) {
    for _ in 0..indent {
        out.push_str("  ");
    }
    out.push_str(line);
    out.push('\n');
}

fn push_tag(out: &mut String, indent: usize, tag: &str, value: &str) {
    push_line(out, indent, &format!("<{tag}>{}</{tag}>", escape(value)));
}

fn push_dependency(out: &mut String, indent: usize, dependency: &Dependency) {
    push_line(out, indent, "<dependency>");
    if let Some(group_id) = &dependency.group_id {
        push_tag(out, indent + 1, "groupId", group_id);
    }
    if let Some(artifact_id) = &dependency.artifact_id {
        push_tag(out, indent + 1, "artifactId", artifact_id);
    }
    if let Some(version) = &dependency.version {
        push_tag(out, indent + 1, "version", version);
    }
    if let Some(dep_type) = &dependency.dep_type {
        push_tag(out, indent + 1, "type", dep_type);
    }
    if let Some(scope) = dependency.scope {
        push_tag(out, indent + 1, "scope", scope.as_str());
    }
    push_line(out, indent, "</dependency>");
}
