//! TypeScript emitter
//!
//! One `<package>/<Name>.ts` per entity: imports, hoisted enums, then an
//! `export interface` per message with a type of its own.

use std::collections::BTreeSet;

use super::names::{is_identifier, is_numeric_case, relative_import};
use super::{
    debug_header, fields, relative_file, Field, FieldKind, FileKind, GenerateOptions,
    GeneratedFile, IndentedWriter, RenderProfile,
};
use crate::schema::{Entity, EntitySet, Message};

pub fn emit_entity(
    set: &EntitySet,
    entity: &Entity,
    profile: &RenderProfile,
    options: &GenerateOptions,
) -> Vec<GeneratedFile> {
    let mut contents = debug_header(entity, options);
    {
        let mut w = IndentedWriter::new(&mut contents);
        write_imports(&mut w, set, entity);
        write_enums(&mut w, &entity.root);
        write_interface(&mut w, set, profile, &entity.root);
    }

    vec![GeneratedFile {
        path: relative_file(
            &entity.package,
            format!("{}.{}", entity.name, profile.file_extension),
        ),
        contents,
        kind: FileKind::Datamodel,
    }]
}

fn write_imports(w: &mut IndentedWriter<'_>, set: &EntitySet, entity: &Entity) {
    let statements: BTreeSet<String> = set
        .dependencies(entity.id, false)
        .into_iter()
        .filter(|&id| id != entity.id)
        .map(|id| {
            let dependency = set.get(id);
            format!(
                "import {{ {} }} from '{}';",
                dependency.name,
                relative_import(&entity.package, &dependency.package, &dependency.name)
            )
        })
        .collect();

    if statements.is_empty() {
        return;
    }
    for statement in &statements {
        w.writeln(statement);
    }
    w.newline();
}

fn write_enums(w: &mut IndentedWriter<'_>, message: &Message) {
    for property in message.payload_properties() {
        let Some(cases) = &property.enumeration else {
            continue;
        };
        w.writeln(&format!("export enum {} {{", property.name));
        {
            let mut body = w.indented();
            for case in cases {
                body.writeln(&format!("{},", enum_case(&property.name, case)));
            }
        }
        w.writeln("}");
        w.newline();
    }

    for child in &message.messages {
        write_enums(w, child);
    }
}

/// `Name = 'Name'`, with numeric cases prefixed by the enum name
fn enum_case(enum_name: &str, case: &str) -> String {
    if is_numeric_case(case) {
        format!("'{}_{}' = {}", enum_name, case, case)
    } else if is_identifier(case) {
        format!("{} = '{}'", case, case)
    } else {
        format!("'{}' = '{}'", case, case)
    }
}

fn write_interface(
    w: &mut IndentedWriter<'_>,
    set: &EntitySet,
    profile: &RenderProfile,
    message: &Message,
) {
    w.write(&format!("export interface {}", message.name));

    let mut seen = BTreeSet::new();
    let supertypes: Vec<&str> = message
        .parents()
        .iter()
        .chain(message.interfaces.iter())
        .map(|&id| set.get(id).name.as_str())
        .filter(|name| seen.insert(*name))
        .collect();
    if !supertypes.is_empty() {
        w.append(&format!(" extends {}", supertypes.join(", ")));
    }

    let mut members = fields(set, message, "");
    members.sort_by(|a, b| a.network_name.cmp(b.network_name));

    if members.is_empty() {
        w.appendln(" {}");
    } else {
        w.appendln(" {");
        {
            let mut body = w.indented();
            for field in &members {
                body.writeln(&format!(
                    "{}: {};",
                    field.network_name,
                    field_type(profile, field)
                ));
            }
        }
        w.writeln("}");
    }

    let nested: Vec<&Message> = message
        .messages
        .iter()
        .filter(|m| m.has_own_type())
        .collect();
    for child in nested {
        w.newline();
        write_interface(w, set, profile, child);
    }
}

fn field_type(profile: &RenderProfile, field: &Field<'_>) -> String {
    let base = match &field.kind {
        FieldKind::Scalar(scalar) => profile.scalar_type(scalar).to_string(),
        FieldKind::Enum { name, .. } => name.to_string(),
        FieldKind::Nested(message) => message.name.clone(),
        FieldKind::Alias(entity) => entity.name.clone(),
    };
    let base = if field.is_array {
        profile.wrap_array(&base)
    } else {
        base
    };
    if field.nullable {
        profile.wrap_nullable(&base)
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_case_spelling() {
        assert_eq!(enum_case("Status", "Active"), "Active = 'Active'");
        assert_eq!(enum_case("Rating", "3"), "'Rating_3' = 3");
        assert_eq!(enum_case("Rating", "2.5"), "'Rating_2.5' = 2.5");
        assert_eq!(enum_case("Phase", "in.progress"), "'in.progress' = 'in.progress'");
    }
}
