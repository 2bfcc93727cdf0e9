//! Raw entity documents
//!
//! A document is the untyped element tree of one entity definition, keyed by
//! its logical path (`common/Person` for `<root>/common/Person.xml`). Documents
//! are produced by a [`DocumentSource`]: the filesystem for local runs, or a
//! Navajo server for remote runs. Nothing in this module interprets entity
//! semantics; that is the job of [`crate::schema`].

pub mod filesystem;
pub mod rpc;
pub mod xml;

use serde::Serialize;
use std::path::Path;
use walkdir::WalkDir;

use crate::error::Result;

pub use filesystem::FilesystemSource;
pub use rpc::RpcSource;
pub use xml::parse_document;

/// Files whose stem ends with this suffix describe mappings, not entities.
pub const MAPPING_SUFFIX: &str = "entitymapping";

// =============================================================================
// Element tree
// =============================================================================

/// One XML element with its attributes (in document order) and child elements
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Builder-style attribute setter, mostly useful in tests
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Builder-style child setter, mostly useful in tests
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Immediate children with the given tag
    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    /// This element and every element below it, depth first
    pub fn descendants(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(element) = stack.pop() {
            out.push(element);
            stack.extend(element.children.iter().rev());
        }
        out
    }
}

// =============================================================================
// Sources
// =============================================================================

/// Produces raw documents by logical path
///
/// Implementations perform I/O. The closure builder guarantees each path is
/// fetched at most once per run, so sources do not cache.
pub trait DocumentSource {
    fn fetch(&mut self, path: &str) -> Result<Element>;
}

/// Filter applied when discovering entity documents under an input root
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Skip documents whose root-relative path starts with one of these
    pub skip_prefixes: Vec<String>,
    /// When non-empty, only load documents whose path starts with one of these
    pub include_prefixes: Vec<String>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            skip_prefixes: vec![
                "target/".to_string(),
                ".git/".to_string(),
                "node_modules/".to_string(),
            ],
            include_prefixes: Vec::new(),
        }
    }
}

impl LoadConfig {
    pub fn accepts(&self, relative: &str) -> bool {
        if !self.include_prefixes.is_empty()
            && !self.include_prefixes.iter().any(|p| relative.starts_with(p.as_str()))
        {
            return false;
        }
        !self.skip_prefixes.iter().any(|p| relative.starts_with(p.as_str()))
    }
}

/// Discover the logical paths of all entity documents under `root`
///
/// Returns root-relative, `/`-separated paths without the `.xml` extension,
/// sorted so runs are reproducible.
pub fn discover_paths(root: &Path, config: &LoadConfig) -> Result<Vec<String>> {
    let mut paths = Vec::new();

    for entry in WalkDir::new(root) {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() || path.extension().map(|e| e != "xml").unwrap_or(true) {
            continue;
        }
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
        if stem.ends_with(MAPPING_SUFFIX) {
            continue;
        }

        let relative = match path.strip_prefix(root) {
            Ok(relative) => relative,
            Err(_) => continue,
        };
        let relative_str = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if !config.accepts(&relative_str) {
            continue;
        }

        paths.push(logical_path(&relative_str));
    }

    paths.sort();
    tracing::info!(count = paths.len(), root = %root.display(), "discovered entity documents");
    Ok(paths)
}

/// Strip a trailing `.xml` and normalise separators
pub fn logical_path(relative: &str) -> String {
    let normalised = relative.replace('\\', "/");
    normalised
        .strip_suffix(".xml")
        .unwrap_or(&normalised)
        .trim_start_matches('/')
        .to_string()
}

/// Last segment of a logical path: the entity's name
pub fn entity_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Everything before the last segment of a logical path
pub fn entity_package(path: &str) -> &str {
    path.rsplit_once('/').map(|(package, _)| package).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_element_accessors() {
        let doc = Element::new("navascript")
            .with_child(Element::new("message").with_attr("name", "Person"))
            .with_child(Element::new("operations"))
            .with_child(Element::new("message").with_attr("name", "Person.2"));

        assert_eq!(doc.children_named("message").count(), 2);
        assert_eq!(doc.children[0].attr("name"), Some("Person"));
        assert_eq!(doc.children[1].attr("name"), None);
        assert_eq!(doc.descendants().len(), 4);
    }

    #[test]
    fn test_logical_path_helpers() {
        assert_eq!(logical_path("common/Person.xml"), "common/Person");
        assert_eq!(entity_name("common/person/Person"), "Person");
        assert_eq!(entity_package("common/person/Person"), "common/person");
        assert_eq!(entity_package("Person"), "");
    }

    #[test]
    fn test_load_config_filters() {
        let config = LoadConfig {
            skip_prefixes: vec!["legacy/".into()],
            include_prefixes: vec!["club/".into(), "legacy/".into()],
        };
        assert!(config.accepts("club/Member.xml"));
        assert!(!config.accepts("legacy/Member.xml"));
        assert!(!config.accepts("common/Person.xml"));
    }

    #[test]
    fn test_discover_paths_skips_mappings_and_other_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("common")).unwrap();
        fs::create_dir_all(root.join("target")).unwrap();
        fs::write(root.join("common/Person.xml"), "<x/>").unwrap();
        fs::write(root.join("common/Personentitymapping.xml"), "<x/>").unwrap();
        fs::write(root.join("common/notes.txt"), "").unwrap();
        fs::write(root.join("target/Stale.xml"), "<x/>").unwrap();
        fs::write(root.join("Club.xml"), "<x/>").unwrap();

        let paths = discover_paths(root, &LoadConfig::default()).unwrap();
        assert_eq!(paths, vec!["Club".to_string(), "common/Person".to_string()]);
    }
}
