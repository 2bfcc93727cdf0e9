//! Local entity documents

use std::fs;
use std::path::PathBuf;

use super::{parse_document, DocumentSource, Element};
use crate::error::{Result, SchemaError};

/// Reads `<root>/<path>.xml`
#[derive(Debug, Clone)]
pub struct FilesystemSource {
    root: PathBuf,
}

impl FilesystemSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// `x/Foo.bar` → `<root>/x/Foo.bar.xml`
    fn file_for(&self, path: &str) -> PathBuf {
        let mut file = self.root.clone();
        let mut segments = path.split('/').filter(|s| !s.is_empty()).peekable();
        while let Some(segment) = segments.next() {
            if segments.peek().is_some() {
                file.push(segment);
            } else {
                file.push(format!("{}.xml", segment));
            }
        }
        file
    }
}

impl DocumentSource for FilesystemSource {
    fn fetch(&mut self, path: &str) -> Result<Element> {
        let file = self.file_for(path);
        tracing::debug!(path, file = %file.display(), "reading entity document");
        let content = fs::read_to_string(&file).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SchemaError::UnknownDocument {
                    path: path.to_string(),
                }
            } else {
                SchemaError::Io(e)
            }
        })?;
        parse_document(path, &content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_reads_nested_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("common")).unwrap();
        fs::write(
            dir.path().join("common/Person.xml"),
            r#"<navascript><message name="Person"/></navascript>"#,
        )
        .unwrap();

        let mut source = FilesystemSource::new(dir.path());
        let doc = source.fetch("common/Person").unwrap();
        assert_eq!(doc.children[0].attr("name"), Some("Person"));
    }

    #[test]
    fn test_dotted_name_keeps_its_suffix() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("x")).unwrap();
        fs::write(dir.path().join("x/Foo.bar.xml"), r#"<n><message name="Foo.bar"/></n>"#).unwrap();
        fs::write(dir.path().join("x/Foo.xml"), r#"<n><message name="Foo"/></n>"#).unwrap();

        let mut source = FilesystemSource::new(dir.path());
        assert_eq!(
            source.file_for("x/Foo.bar"),
            dir.path().join("x").join("Foo.bar.xml")
        );
        let doc = source.fetch("x/Foo.bar").unwrap();
        assert_eq!(doc.children[0].attr("name"), Some("Foo.bar"));
    }

    #[test]
    fn test_missing_file_is_unknown_document() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = FilesystemSource::new(dir.path());
        assert!(matches!(
            source.fetch("common/Missing"),
            Err(SchemaError::UnknownDocument { path }) if path == "common/Missing"
        ));
    }
}
