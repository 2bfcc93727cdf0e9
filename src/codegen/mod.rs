//! Code Generation
//!
//! Emits source files for a resolved [`EntitySet`].
//!
//! Architecture:
//! - Field: pure projection of one message member, with every
//!   annotation-derived decision (enum, nested type or alias, nullability)
//!   already made
//! - RenderProfile: per-language type tables and spelling rules
//! - Emitters: one module per language, consuming Fields and the entity tree
//!
//! The key constraint: emitters NEVER read raw documents or annotation
//! strings, only the resolved model.

pub mod config;
pub mod java;
pub mod kotlin;
pub mod names;
pub mod swift;
pub mod typescript;
pub mod writer;

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::schema::reference::display_version;
use crate::schema::{Entity, EntitySet, Message, ScalarType};

pub use config::{Language, RenderProfile};
pub use writer::IndentedWriter;

// =============================================================================
// Field
// =============================================================================

/// One member of a generated type
#[derive(Debug, Clone)]
pub struct Field<'a> {
    /// Wire name
    pub network_name: &'a str,
    /// Local identifier: camel case, `List` suffix for arrays
    pub name: String,
    pub kind: FieldKind<'a>,
    pub is_array: bool,
    pub nullable: bool,
    /// Dotted path of the declaring message (`Club.Venue`)
    pub scope: String,
}

#[derive(Debug, Clone)]
pub enum FieldKind<'a> {
    Scalar(&'a ScalarType),
    /// Synthesized enum named after the property
    Enum { name: &'a str, cases: &'a [String] },
    /// A child message with a type of its own
    Nested(&'a Message),
    /// A child message that reuses its single parent's type
    Alias(&'a Entity),
}

impl<'a> Field<'a> {
    pub fn is_primitive(&self) -> bool {
        matches!(self.kind, FieldKind::Scalar(_))
    }
}

/// Payload fields of `message`: properties first, then child messages
///
/// `scope` is the dotted path of `message` itself.
pub fn fields<'a>(set: &'a EntitySet, message: &'a Message, scope: &str) -> Vec<Field<'a>> {
    let mut out = Vec::new();

    for property in message.payload_properties() {
        let kind = match &property.enumeration {
            Some(cases) => FieldKind::Enum {
                name: &property.name,
                cases,
            },
            None => FieldKind::Scalar(&property.ty),
        };
        out.push(Field {
            network_name: &property.name,
            name: names::camelcase(&property.name),
            kind,
            is_array: false,
            nullable: property.nullable,
            scope: scope.to_string(),
        });
    }

    for child in &message.messages {
        let kind = match child.alias_of() {
            Some(parent) => FieldKind::Alias(set.get(parent)),
            None => FieldKind::Nested(child),
        };
        let mut name = names::camelcase(&child.name);
        if child.is_array {
            name.push_str("List");
        }
        out.push(Field {
            network_name: &child.name,
            name,
            kind,
            is_array: child.is_array,
            nullable: child.nullable,
            scope: scope.to_string(),
        });
    }

    out
}

/// Non-nullable fields a constructor of `message` takes, ancestors first
///
/// Only single inheritance contributes ancestors: a message with several
/// parents is emitted as a fresh type conforming to its shared interface.
pub fn constructor_fields<'a>(
    set: &'a EntitySet,
    message: &'a Message,
    scope: &str,
) -> Vec<Field<'a>> {
    let mut out = Vec::new();
    if let Some(parent) = message.inheritance.single() {
        let parent = set.get(parent);
        out.extend(constructor_fields(set, &parent.root, &parent.root.name));
    }
    out.extend(
        fields(set, message, scope)
            .into_iter()
            .filter(|f| !f.nullable),
    );
    out
}

/// `scope.name`, or just `name` at the top level
pub fn qualify(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", scope, name)
    }
}

// =============================================================================
// Output
// =============================================================================

/// Whether a file is regenerated every run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Datamodel,
    Service,
    /// Hand-editable; only written when missing unless forced
    Logic,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedFile {
    /// Relative to the output directory
    pub path: PathBuf,
    pub contents: String,
    pub kind: FileKind,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GeneratedOutput {
    pub files: Vec<GeneratedFile>,
}

impl GeneratedOutput {
    pub fn file(&self, path: impl AsRef<Path>) -> Option<&GeneratedFile> {
        self.files.iter().find(|f| f.path == path.as_ref())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// JVM package of the output root (`com.acme.entities`)
    pub base_package: String,
    /// Prefix every file with a comment naming its source document
    pub debug: bool,
}

/// Emit every entity of `set`
pub fn generate(set: &EntitySet, language: Language, options: &GenerateOptions) -> GeneratedOutput {
    let profile = language.profile();
    let mut output = GeneratedOutput::default();

    for entity in set.iter() {
        let files = match language {
            Language::Java => java::emit_entity(set, entity, &profile, options),
            Language::Kotlin => kotlin::emit_entity(set, entity, &profile, options),
            Language::Swift => swift::emit_entity(set, entity, &profile, options),
            Language::TypeScript => typescript::emit_entity(set, entity, &profile, options),
        };
        tracing::debug!(entity = %entity.path, files = files.len(), "emitted entity");
        output.files.extend(files);
    }

    tracing::info!(?language, files = output.files.len(), "generation complete");
    output
}

/// Comment header used in debug mode; every target language accepts `//`
pub(crate) fn debug_header(entity: &Entity, options: &GenerateOptions) -> String {
    if options.debug {
        format!(
            "// Generated from {} (version {})\n\n",
            entity.path,
            display_version(entity.version)
        )
    } else {
        String::new()
    }
}

/// Files written and skipped by [`write_output`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub written: usize,
    pub skipped: usize,
}

/// Write generated files below `output_dir`
///
/// Existing logic files are left alone unless `force` is set.
pub fn write_output(output_dir: &Path, output: &GeneratedOutput, force: bool) -> Result<WriteSummary> {
    let mut summary = WriteSummary::default();

    for file in &output.files {
        let target = output_dir.join(&file.path);
        if file.kind == FileKind::Logic && !force && target.exists() {
            tracing::debug!(file = %target.display(), "keeping existing logic file");
            summary.skipped += 1;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, &file.contents)?;
        summary.written += 1;
    }

    tracing::info!(
        written = summary.written,
        skipped = summary.skipped,
        output = %output_dir.display(),
        "wrote generated files"
    );
    Ok(summary)
}

/// `dir/sub` + `Name.ext` as a relative path
pub(crate) fn relative_file(dir: &str, file_name: String) -> PathBuf {
    let mut path = PathBuf::new();
    for segment in dir.split('/').filter(|s| !s.is_empty()) {
        path.push(segment);
    }
    path.push(file_name);
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_output_respects_force_for_logic_files() {
        let dir = tempfile::tempdir().unwrap();
        let output = GeneratedOutput {
            files: vec![
                GeneratedFile {
                    path: PathBuf::from("club/logic/Member.java"),
                    contents: "generated logic".into(),
                    kind: FileKind::Logic,
                },
                GeneratedFile {
                    path: PathBuf::from("club/datamodel/MemberEntity.java"),
                    contents: "generated model".into(),
                    kind: FileKind::Datamodel,
                },
            ],
        };

        let logic = dir.path().join("club/logic/Member.java");
        fs::create_dir_all(logic.parent().unwrap()).unwrap();
        fs::write(&logic, "hand written").unwrap();

        let summary = write_output(dir.path(), &output, false).unwrap();
        assert_eq!(summary, WriteSummary { written: 1, skipped: 1 });
        assert_eq!(fs::read_to_string(&logic).unwrap(), "hand written");

        let summary = write_output(dir.path(), &output, true).unwrap();
        assert_eq!(summary, WriteSummary { written: 2, skipped: 0 });
        assert_eq!(fs::read_to_string(&logic).unwrap(), "generated logic");
    }

    #[test]
    fn test_relative_file_and_qualify() {
        assert_eq!(
            relative_file("club/member", "X.ts".into()),
            PathBuf::from("club").join("member").join("X.ts")
        );
        assert_eq!(relative_file("", "X.ts".into()), PathBuf::from("X.ts"));
        assert_eq!(qualify("Club.Venue", "Room"), "Club.Venue.Room");
        assert_eq!(qualify("", "Room"), "Room");
    }
}
