//! Kotlin emitter: `datamodel/<Name>Entity.kt` and `service/<Name>Service.kt`

use std::collections::BTreeSet;

use super::names::{camelcase, join_package};
use super::{
    constructor_fields, debug_header, fields, qualify, relative_file, Field, FieldKind, FileKind,
    GenerateOptions, GeneratedFile, IndentedWriter, RenderProfile,
};
use crate::schema::{Entity, EntitySet, Message, Method};

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
            path: relative_file(
                &format!("{}/service", entity.package),
                format!("{}Service.kt", entity.name),
            ),
            contents,
            kind: FileKind::Service,
        });
    }

    let mut contents = debug_header(entity, options);
    write_datamodel(&mut IndentedWriter::new(&mut contents), set, entity, profile, options, &package);
    files.push(GeneratedFile {
        path: relative_file(
            &format!("{}/datamodel", entity.package),
            format!("{}Entity.kt", entity.name),
        ),
        contents,
        kind: FileKind::Datamodel,
    });

    files
}

fn qualified(package: &str, layer: &str, name: &str) -> String {
    [package, layer, name]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(".")
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
    w.writeln(&format!("package {}", qualified(package, "datamodel", "")));
    w.newline();

    let mut imports: BTreeSet<String> = BTreeSet::new();
    imports.insert("com.google.gson.annotations.SerializedName".into());
    imports.insert("java.io.Serializable".into());
    imports.insert(qualified(package, "logic", &entity.name));
    for id in set.dependencies(entity.id, false) {
        if id != entity.id {
            let dependency = set.get(id);
            let dependency_package = join_package(&options.base_package, &dependency.package);
            imports.insert(qualified(&dependency_package, "logic", &dependency.name));
        }
    }
    for import in &imports {
        w.writeln(&format!("import {}", import));
    }
    w.newline();

    let mut shared = Vec::new();
    write_class(w, set, profile, &entity.root, "", &mut shared);
    for declaration in &shared {
        w.append(declaration);
    }
}

fn write_class(
    w: &mut IndentedWriter<'_>,
    set: &EntitySet,
    profile: &RenderProfile,
    message: &Message,
    outer: &str,
    shared_out: &mut Vec<String>,
) {
    let scope = qualify(outer, &message.name);
    let members = fields(set, message, &scope);
    let inner_shared = message.inheritance.shared().filter(|s| s.is_inner);
    let overrides = if inner_shared.is_some() { "override " } else { "" };

    let inherited = match message.inheritance.single() {
        Some(parent) => {
            let parent = set.get(parent);
            constructor_fields(set, &parent.root, &parent.root.name)
        }
        None => Vec::new(),
    };

    let modifier = if message.is_interface { "abstract" } else { "open" };
    w.write(&format!("{} class {}Entity(", modifier, message.name));

    let mut parameters: Vec<String> = inherited
        .iter()
        .map(|f| format!("{}: {}", profile.escape_keyword(&f.name), field_type(profile, f)))
        .collect();
    parameters.extend(members.iter().filter(|f| !f.nullable).map(|f| {
        format!(
            "@field:JvmField @field:SerializedName(\"{}\") {}var {}: {}",
            f.network_name,
            overrides,
            profile.escape_keyword(&f.name),
            field_type(profile, f)
        )
    }));
    if parameters.is_empty() {
        w.append(")");
    } else {
        w.newline();
        for parameter in &parameters {
            w.indented().writeln(&format!("{},", parameter));
        }
        w.write(")");
    }

    let mut supertypes = Vec::new();
    if let Some(parent) = message.inheritance.single() {
        let arguments: Vec<String> = inherited
            .iter()
            .map(|f| profile.escape_keyword(&f.name))
            .collect();
        supertypes.push(format!("{}({})", set.get(parent).name, arguments.join(", ")));
    }
    supertypes.push("Serializable".to_string());
    if let Some(shared) = message.inheritance.shared() {
        if shared.is_inner {
            supertypes.push(format!("{}Shared", shared.name));
        } else {
            supertypes.push(shared.name.clone());
        }
    }
    for &id in &message.interfaces {
        let name = set.get(id).name.clone();
        if !supertypes.contains(&name) {
            supertypes.push(name);
        }
    }
    w.appendln(&format!(" : {} {{", supertypes.join(", ")));
    w.newline();

    if let Some(shared) = inner_shared {
        let mut text = String::new();
        let mut decl = IndentedWriter::new(&mut text);
        decl.writeln(&format!("interface {}Shared {{", shared.name));
        for field in &members {
            decl.indented().writeln(&format!(
                "val {}: {}",
                profile.escape_keyword(&field.name),
                field_type(profile, field)
            ));
        }
        decl.writeln("}");
        decl.newline();
        shared_out.push(text);
    }

    let mut body = w.indented();
    for field in &members {
        if let FieldKind::Nested(child) = field.kind {
            write_class(&mut body, set, profile, child, &scope, shared_out);
        }
    }

    for field in &members {
        if let FieldKind::Enum { name, cases } = field.kind {
            body.writeln(&format!("enum class {} {{", name));
            body.indented().writeln(&cases.join(", "));
            body.writeln("}");
            body.newline();
        }
    }

    for field in members.iter().filter(|f| f.nullable) {
        body.writeln("@JvmField");
        body.writeln(&format!("@SerializedName(\"{}\")", field.network_name));
        body.writeln(&format!(
            "{}var {}: {} = null",
            overrides,
            profile.escape_keyword(&field.name),
            field_type(profile, field)
        ));
        body.newline();
    }

    w.writeln("}");
    w.newline();
}

fn field_type(profile: &RenderProfile, field: &Field<'_>) -> String {
    let base = match &field.kind {
        FieldKind::Scalar(scalar) => profile.scalar_type(scalar).to_string(),
        FieldKind::Enum { name, .. } => name.to_string(),
        FieldKind::Nested(message) => qualify(&field.scope, &message.name),
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
    w.writeln(&format!("package {}", qualified(package, "service", "")));
    w.newline();

    let mut imports: BTreeSet<String> = BTreeSet::new();
    imports.insert("retrofit2.http.Query".into());
    imports.insert("io.reactivex.Single".into());
    imports.insert(qualified(package, "logic", &entity.name));
    if entity.is_versioned() {
        imports.insert("retrofit2.http.Headers".into());
    }
    if entity.methods.contains(&Method::Put) || entity.methods.contains(&Method::Post) {
        imports.insert("retrofit2.http.Body".into());
    }
    for method in &entity.methods {
        imports.insert(format!("retrofit2.http.{}", method));
    }
    for import in &imports {
        w.writeln(&format!("import {}", import));
    }
    w.newline();

    w.writeln(&format!("interface {}Service {{", entity.name));
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
                    let ty = profile.scalar_type(&p.ty);
                    let ty = if p.nullable {
                        profile.wrap_nullable(ty)
                    } else {
                        ty.to_string()
                    };
                    format!(
                        "@Query(\"{}\") {}: {}",
                        p.name,
                        profile.escape_keyword(&camelcase(&p.name)),
                        ty
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
        parameters.push(format!("@Body {}: {}", camelcase(name), name));
    }
    let function = match method {
        Method::Get => camelcase(name),
        Method::Put => format!("update{}", name),
        Method::Delete => format!("remove{}", name),
        Method::Post => format!("insert{}", name),
    };
    w.writeln(&format!(
        "fun {}({}): Single<{}>",
        function,
        parameters.join(", "),
        name
    ));
    w.newline();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_skips_empty_parts() {
        assert_eq!(qualified("", "logic", "Member"), "logic.Member");
        assert_eq!(qualified("com.acme", "datamodel", ""), "com.acme.datamodel");
    }
}
