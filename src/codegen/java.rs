//! Java emitter
//!
//! Per entity, below `<package>/`:
//! - `datamodel/<Name>Entity.java`: Gson-annotated classes, regenerated
//! - `logic/<Name>.java`: subclasses meant for hand edits
//! - `service/<Name>Service.java`: Retrofit interface, when the entity has methods

use std::collections::BTreeSet;

use super::names::{camelcase, capitalize, join_package};
use super::{
    constructor_fields, debug_header, fields, qualify, relative_file, Field, FieldKind, FileKind,
    GenerateOptions, GeneratedFile, IndentedWriter, RenderProfile,
};
use crate::schema::{Entity, EntityId, EntitySet, Message, Method};

pub fn emit_entity(
    set: &EntitySet,
    entity: &Entity,
    profile: &RenderProfile,
    options: &GenerateOptions,
) -> Vec<GeneratedFile> {
    let package = join_package(&options.base_package, &entity.package);
    let mut files = Vec::new();

    if !entity.methods.is_empty() {
        let mut contents = debug_header(entity, options);
        write_service(&mut IndentedWriter::new(&mut contents), set, entity, profile, &package);
        files.push(GeneratedFile {
            path: file_path(entity, "service", format!("{}Service", entity.name)),
            contents,
            kind: FileKind::Service,
        });
    }

    let mut contents = debug_header(entity, options);
    write_datamodel(&mut IndentedWriter::new(&mut contents), set, entity, profile, options, &package);
    files.push(GeneratedFile {
        path: file_path(entity, "datamodel", format!("{}Entity", entity.name)),
        contents,
        kind: FileKind::Datamodel,
    });

    let mut contents = debug_header(entity, options);
    write_logic(&mut IndentedWriter::new(&mut contents), set, entity, profile, options, &package);
    files.push(GeneratedFile {
        path: file_path(entity, "logic", entity.name.clone()),
        contents,
        kind: FileKind::Logic,
    });

    files
}

fn file_path(entity: &Entity, layer: &str, class: String) -> std::path::PathBuf {
    relative_file(
        &format!("{}/{}", entity.package, layer),
        format!("{}.java", class),
    )
}

fn package_line(package: &str, layer: &str) -> String {
    if package.is_empty() {
        format!("package {};", layer)
    } else {
        format!("package {}.{};", package, layer)
    }
}

fn logic_import(set: &EntitySet, options: &GenerateOptions, id: EntityId) -> String {
    let dependency = set.get(id);
    format!(
        "{}.logic.{}",
        join_package(&options.base_package, &dependency.package),
        dependency.name
    )
}

fn write_imports(w: &mut IndentedWriter<'_>, imports: BTreeSet<String>) {
    for import in &imports {
        w.writeln(&format!("import {};", import));
    }
    w.newline();
}

// =============================================================================
// Datamodel
// =============================================================================

fn write_datamodel(
    w: &mut IndentedWriter<'_>,
    set: &EntitySet,
    entity: &Entity,
    profile: &RenderProfile,
    options: &GenerateOptions,
    package: &str,
) {
    w.writeln(&package_line(package, "datamodel"));
    w.newline();

    let mut imports: BTreeSet<String> = [
        "com.google.gson.annotations.SerializedName",
        "java.util.List",
        "java.io.Serializable",
        "androidx.annotation.NonNull",
        "androidx.annotation.Nullable",
    ]
    .into_iter()
    .map(String::from)
    .collect();
    imports.insert(format!("{}.logic.{}", package, entity.name).trim_start_matches('.').to_string());
    for id in set.dependencies(entity.id, false) {
        if id != entity.id {
            imports.insert(logic_import(set, options, id));
        }
    }
    write_imports(w, imports);

    let mut shared = Vec::new();
    write_datamodel_class(w, set, profile, &entity.root, "", false, &mut shared);
    for declaration in &shared {
        w.append(declaration);
    }
}

fn write_datamodel_class(
    w: &mut IndentedWriter<'_>,
    set: &EntitySet,
    profile: &RenderProfile,
    message: &Message,
    outer: &str,
    nested: bool,
    shared_out: &mut Vec<String>,
) {
    let scope = qualify(outer, &message.name);

    w.write("public");
    if nested {
        w.append(" static");
    }
    if message.is_interface {
        w.append(" abstract");
    }
    w.append(&format!(" class {}Entity", message.name));
    if let Some(parent) = message.inheritance.single() {
        w.append(&format!(" extends {}", set.get(parent).name));
    }

    let mut implements = vec!["Serializable".to_string()];
    if let Some(shared) = message.inheritance.shared() {
        if shared.is_inner {
            implements.push(format!("{}Shared", shared.name));
        } else {
            implements.push(shared.name.clone());
        }
    }
    for &id in &message.interfaces {
        let name = set.get(id).name.clone();
        if !implements.contains(&name) {
            implements.push(name);
        }
    }
    w.appendln(&format!(" implements {} {{", implements.join(", ")));
    w.newline();

    let members = fields(set, message, &scope);
    let mut body = w.indented();

    // a class cannot implement its own member type, so the contract is a
    // package-private sibling of the root class
    if let Some(shared) = message.inheritance.shared().filter(|s| s.is_inner) {
        let mut text = String::new();
        let mut decl = IndentedWriter::new(&mut text);
        decl.writeln(&format!("interface {}Shared {{", shared.name));
        for field in &members {
            decl.indented().writeln(&format!(
                "{} get{}();",
                field_type(profile, field),
                capitalize(&field.name)
            ));
        }
        decl.writeln("}");
        decl.newline();
        shared_out.push(text);
    }

    for field in &members {
        match &field.kind {
            FieldKind::Enum { name, cases } => {
                body.writeln(&format!("public enum {} {{", name));
                {
                    let mut cases_writer = body.indented();
                    for case in cases.iter() {
                        cases_writer.writeln(&format!("{},", case));
                    }
                }
                body.writeln("}");
                body.newline();
            }
            FieldKind::Nested(child) => {
                write_datamodel_class(&mut body, set, profile, child, &scope, true, shared_out);
            }
            _ => {}
        }

        body.writeln(if field.nullable { "@Nullable" } else { "@NonNull" });
        body.writeln(&format!("@SerializedName(\"{}\")", field.network_name));
        body.writeln(&format!(
            "public {} {};",
            field_type(profile, field),
            profile.escape_keyword(&field.name)
        ));
        body.newline();
    }

    if message.inheritance.shared().is_some_and(|s| s.is_inner) {
        for field in &members {
            body.writeln("@Override");
            body.writeln(&format!(
                "public {} get{}() {{",
                field_type(profile, field),
                capitalize(&field.name)
            ));
            body.indented()
                .writeln(&format!("return {};", profile.escape_keyword(&field.name)));
            body.writeln("}");
            body.newline();
        }
    }

    let inherited = match message.inheritance.single() {
        Some(parent) => {
            let parent = set.get(parent);
            constructor_fields(set, &parent.root, &parent.root.name)
        }
        None => Vec::new(),
    };
    let own: Vec<&Field<'_>> = members.iter().filter(|f| !f.nullable).collect();

    let parameters: Vec<String> = inherited
        .iter()
        .chain(own.iter().copied())
        .map(|f| parameter(profile, f))
        .collect();
    body.writeln(&format!(
        "public {}Entity({}) {{",
        message.name,
        parameters.join(", ")
    ));
    {
        let mut ctor = body.indented();
        let arguments: Vec<String> = inherited
            .iter()
            .map(|f| profile.escape_keyword(&f.name))
            .collect();
        ctor.writeln(&format!("super({});", arguments.join(", ")));
        for field in &own {
            let name = profile.escape_keyword(&field.name);
            ctor.writeln(&format!("this.{} = {};", name, name));
        }
    }
    body.writeln("}");
    body.newline();

    w.writeln("}");
    w.newline();
}

// =============================================================================
// Logic
// =============================================================================

fn write_logic(
    w: &mut IndentedWriter<'_>,
    set: &EntitySet,
    entity: &Entity,
    profile: &RenderProfile,
    options: &GenerateOptions,
    package: &str,
) {
    w.writeln(&package_line(package, "logic"));
    w.newline();

    let mut imports: BTreeSet<String> = [
        "java.io.Serializable",
        "java.util.List",
        "androidx.annotation.NonNull",
        "androidx.annotation.Nullable",
    ]
    .into_iter()
    .map(String::from)
    .collect();
    imports.insert(
        format!("{}.datamodel.{}Entity", package, entity.name)
            .trim_start_matches('.')
            .to_string(),
    );
    for id in set.dependencies(entity.id, true) {
        if id != entity.id {
            imports.insert(logic_import(set, options, id));
        }
    }
    write_imports(w, imports);

    write_logic_class(w, set, profile, &entity.root, "", false);
}

fn write_logic_class(
    w: &mut IndentedWriter<'_>,
    set: &EntitySet,
    profile: &RenderProfile,
    message: &Message,
    outer: &str,
    nested: bool,
) {
    let scope = qualify(outer, &message.name);

    w.write("public");
    if nested {
        w.append(" static");
    }
    if message.is_interface {
        w.append(" abstract");
    }
    w.appendln(&format!(" class {} extends {}Entity {{", message.name, message.name));
    w.newline();

    let mut body = w.indented();
    let parameters = constructor_fields(set, message, &scope);
    let declared: Vec<String> = parameters.iter().map(|f| parameter(profile, f)).collect();
    let arguments: Vec<String> = parameters
        .iter()
        .map(|f| profile.escape_keyword(&f.name))
        .collect();
    body.writeln(&format!("public {}({}) {{", message.name, declared.join(", ")));
    body.indented()
        .writeln(&format!("super({});", arguments.join(", ")));
    body.writeln("}");

    for child in message.messages.iter().filter(|m| m.has_own_type()) {
        body.newline();
        write_logic_class(&mut body, set, profile, child, &scope, true);
    }

    w.writeln("}");
}

// =============================================================================
// Service
// =============================================================================

fn write_service(
    w: &mut IndentedWriter<'_>,
    set: &EntitySet,
    entity: &Entity,
    profile: &RenderProfile,
    package: &str,
) {
    w.writeln(&package_line(package, "service"));
    w.newline();

    let has = |m: Method| entity.methods.contains(&m);
    let mut imports: BTreeSet<String> = [
        "retrofit2.http.Query",
        "androidx.annotation.NonNull",
        "androidx.annotation.Nullable",
    ]
    .into_iter()
    .map(String::from)
    .collect();
    if has(Method::Get) || has(Method::Put) {
        imports.insert("io.reactivex.Single".into());
    }
    if has(Method::Post) || has(Method::Delete) {
        imports.insert("io.reactivex.Completable".into());
    }
    if entity.is_versioned() {
        imports.insert("retrofit2.http.Headers".into());
    }
    if has(Method::Put) || has(Method::Post) {
        imports.insert("retrofit2.http.Body".into());
    }
    for method in &entity.methods {
        imports.insert(format!("retrofit2.http.{}", method));
    }
    if has(Method::Get) || has(Method::Put) || has(Method::Post) {
        imports.insert(
            format!("{}.logic.{}", package, entity.name)
                .trim_start_matches('.')
                .to_string(),
        );
    }
    write_imports(w, imports);

    w.writeln(&format!("public interface {}Service {{", entity.name));
    w.newline();

    let key_ids = set.key_ids(entity.id);
    let mut body = w.indented();
    for &method in &entity.methods {
        if key_ids.is_empty() {
            write_service_method(&mut body, entity, method, Vec::new());
            continue;
        }
        for key in &key_ids {
            let parameters = set
                .key_properties(entity.id, key)
                .into_iter()
                .map(|p| {
                    format!(
                        "{} @Query(\"{}\") {} {}",
                        if p.nullable { "@Nullable" } else { "@NonNull" },
                        p.name,
                        profile.scalar_type(&p.ty),
                        profile.escape_keyword(&camelcase(&p.name))
                    )
                })
                .collect();
            write_service_method(&mut body, entity, method, parameters);
        }
    }

    w.writeln("}");
    w.newline();
}

fn write_service_method(
    w: &mut IndentedWriter<'_>,
    entity: &Entity,
    method: Method,
    mut parameters: Vec<String>,
) {
    match entity.version {
        Some(version) => {
            w.writeln(&format!("@Headers(\"X-Navajo-Version: {}\")", version));
            w.writeln(&format!("@{}(\"{}?v={}\")", method, entity.path, version));
        }
        None => w.writeln(&format!("@{}(\"{}\")", method, entity.path)),
    }

    let name = &entity.name;
    if matches!(method, Method::Put | Method::Post) {
        parameters.push(format!("@NonNull @Body {} {}", name, camelcase(name)));
    }
    let parameters = parameters.join(", ");
    let signature = match method {
        Method::Get => format!("Single<{}> get{}({});", name, name, parameters),
        Method::Put => format!("Single<{}> update{}({});", name, name, parameters),
        Method::Delete => format!("Completable remove{}({});", name, parameters),
        Method::Post => format!("Completable insert{}({});", name, parameters),
    };
    w.writeln(&signature);
    w.newline();
}

// =============================================================================
// Types
// =============================================================================

fn field_type(profile: &RenderProfile, field: &Field<'_>) -> String {
    let base = match &field.kind {
        FieldKind::Scalar(scalar) => profile.scalar_type(scalar).to_string(),
        FieldKind::Enum { name, .. } => name.to_string(),
        FieldKind::Nested(message) => qualify(&field.scope, &message.name),
        FieldKind::Alias(entity) => entity.name.clone(),
    };
    if field.is_array {
        profile.wrap_array(&base)
    } else {
        base
    }
}

fn parameter(profile: &RenderProfile, field: &Field<'_>) -> String {
    format!(
        "@NonNull {} {}",
        field_type(profile, field),
        profile.escape_keyword(&field.name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_line_without_base() {
        assert_eq!(package_line("", "logic"), "package logic;");
        assert_eq!(package_line("com.acme.club", "logic"), "package com.acme.club.logic;");
    }
}
