//! Swift emitter
//!
//! Writes `Datamodel/<Name>Entity.swift` (Codable classes with explicit coding
//! keys) and `Service/<Name>Service.swift` (Alamofire operations). Directory
//! names below the output root are capitalized.

use super::names::{camelcase, capitalize_path, swift_case, variable_name};
use super::{
    constructor_fields, debug_header, fields, qualify, relative_file, Field, FieldKind, FileKind,
    GenerateOptions, GeneratedFile, IndentedWriter, RenderProfile,
};
use crate::schema::{Entity, EntitySet, Message, Method, Property};

const DATAMODEL_LINT: &str = "// swiftlint:disable type_body_length file_length line_length identifier_name superfluous_disable_command";
const SERVICE_LINT: &str = "// swiftlint:disable function_parameter_count superfluous_disable_command";

pub fn emit_entity(
    set: &EntitySet,
    entity: &Entity,
    profile: &RenderProfile,
    options: &GenerateOptions,
) -> Vec<GeneratedFile> {
    let mut files = Vec::new();

    let mut contents = debug_header(entity, options);
    {
        let mut w = IndentedWriter::new(&mut contents);
        w.writeln(DATAMODEL_LINT);
        w.newline();
        w.writeln("import Foundation");
        w.newline();
        let mut protocols = Vec::new();
        write_class(&mut w, set, profile, &entity.root, "", &mut protocols);
        for protocol in &protocols {
            w.newline();
            w.append(protocol);
        }
    }
    files.push(GeneratedFile {
        path: relative_file(
            &capitalize_path(&format!("{}/datamodel", entity.package)),
            format!("{}Entity.swift", entity.name),
        ),
        contents,
        kind: FileKind::Datamodel,
    });

    if !entity.methods.is_empty() {
        let mut contents = debug_header(entity, options);
        write_service(&mut IndentedWriter::new(&mut contents), set, entity, profile);
        files.push(GeneratedFile {
            path: relative_file(
                &capitalize_path(&format!("{}/service", entity.package)),
                format!("{}Service.swift", entity.name),
            ),
            contents,
            kind: FileKind::Service,
        });
    }

    files
}

/// Swift identifier of a field; arrays get a `List` suffix before casing
fn swift_name(field: &Field<'_>) -> String {
    if field.is_array {
        swift_case(&format!("{}List", field.network_name))
    } else {
        swift_case(field.network_name)
    }
}

fn base_type(profile: &RenderProfile, field: &Field<'_>) -> String {
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

fn field_type(profile: &RenderProfile, field: &Field<'_>) -> String {
    let base = base_type(profile, field);
    if field.nullable {
        profile.wrap_nullable(&base)
    } else {
        base
    }
}

// =============================================================================
// Datamodel
// =============================================================================

fn write_class(
    w: &mut IndentedWriter<'_>,
    set: &EntitySet,
    profile: &RenderProfile,
    message: &Message,
    outer: &str,
    protocols: &mut Vec<String>,
) {
    let scope = qualify(outer, &message.name);
    let members = fields(set, message, &scope);
    let parent = message.inheritance.single().map(|id| set.get(id));

    let mut supertypes = Vec::new();
    match parent {
        Some(parent) => supertypes.push(parent.name.clone()),
        None => supertypes.push("Codable".to_string()),
    }
    if let Some(shared) = message.inheritance.shared() {
        if shared.is_inner {
            supertypes.push(format!("{}Protocol", shared.name));
            protocols.push(protocol(profile, &shared.name, &members));
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
    w.writeln(&format!(
        "class {}Entity: {} {{",
        message.name,
        supertypes.join(", ")
    ));

    {
        let mut body = w.indented();
        for field in &members {
            match &field.kind {
                FieldKind::Enum { name, cases } => write_enum(&mut body, name, cases),
                FieldKind::Nested(child) => {
                    write_class(&mut body, set, profile, child, &scope, protocols)
                }
                _ => {}
            }
            body.writeln(&format!(
                "var {}: {}",
                swift_name(field),
                field_type(profile, field)
            ));
        }

        let inherited = match parent {
            Some(parent) => constructor_fields(set, &parent.root, &parent.root.name),
            None => Vec::new(),
        };
        let own: Vec<&Field<'_>> = members.iter().filter(|f| !f.nullable).collect();
        let parameters: Vec<String> = inherited
            .iter()
            .chain(own.iter().copied())
            .map(|f| format!("{}: {}", swift_name(f), base_type(profile, f)))
            .collect();

        if !parameters.is_empty() {
            body.newline();
            let modifier = if own.is_empty() { "override " } else { "" };
            body.writeln(&format!("{}init({}) {{", modifier, parameters.join(", ")));
            {
                let mut ctor = body.indented();
                for field in &own {
                    let name = swift_name(field);
                    ctor.writeln(&format!("self.{} = {}", name, name));
                }
                if parent.is_some() {
                    let arguments: Vec<String> = inherited
                        .iter()
                        .map(|f| {
                            let name = swift_name(f);
                            format!("{}: {}", name, name)
                        })
                        .collect();
                    if !own.is_empty() {
                        ctor.newline();
                    }
                    ctor.writeln(&format!("super.init({})", arguments.join(", ")));
                }
            }
            body.writeln("}");
        } else if parent.is_none() {
            body.newline();
            body.writeln("init() { }");
        }

        write_coding(&mut body, profile, &members, parent.is_some());
    }

    w.writeln("}");
}

fn write_enum(w: &mut IndentedWriter<'_>, name: &str, cases: &[String]) {
    w.writeln(&format!(
        "enum {}: String, Codable, CaseIterable, Comparable {{",
        name
    ));
    {
        let mut body = w.indented();
        for case in cases {
            let identifier = swift_case(case);
            if identifier == *case {
                body.writeln(&format!("case {}", identifier));
            } else {
                body.writeln(&format!("case {} = \"{}\"", identifier, case));
            }
        }
        body.newline();
        body.writeln(&format!(
            "static func < (lhs: {}, rhs: {}) -> Bool {{",
            name, name
        ));
        {
            let mut compare = body.indented();
            compare.writeln("let index = allCases.firstIndex(of: lhs)");
            compare.writeln("let other = allCases.firstIndex(of: rhs)");
            compare.newline();
            compare.writeln("return index! < other!");
        }
        body.writeln("}");
    }
    w.writeln("}");
}

fn write_coding(
    w: &mut IndentedWriter<'_>,
    profile: &RenderProfile,
    members: &[Field<'_>],
    inherits: bool,
) {
    if !members.is_empty() {
        w.newline();
        w.writeln("private enum CodingKeys: String, CodingKey {");
        for field in members {
            w.indented().writeln(&format!(
                "case {} = \"{}\"",
                swift_name(field),
                field.network_name
            ));
        }
        w.writeln("}");
    }

    w.newline();
    w.writeln("required init(from decoder: Decoder) throws {");
    {
        let mut body = w.indented();
        if !members.is_empty() {
            body.writeln("let container = try decoder.container(keyedBy: CodingKeys.self)");
        }
        for field in members {
            let name = swift_name(field);
            let decode = if field.nullable { "decodeIfPresent" } else { "decode" };
            body.writeln(&format!(
                "{} = try container.{}({}.self, forKey: .{})",
                name,
                decode,
                base_type(profile, field),
                name
            ));
        }
        if inherits {
            body.newline();
            body.writeln("try super.init(from: decoder)");
        }
    }
    w.writeln("}");

    w.newline();
    let modifier = if inherits { "override " } else { "" };
    w.writeln(&format!("{}func encode(to encoder: Encoder) throws {{", modifier));
    {
        let mut body = w.indented();
        if inherits {
            body.writeln("try super.encode(to: encoder)");
        }
        if !members.is_empty() {
            body.writeln("var container = encoder.container(keyedBy: CodingKeys.self)");
        }
        for field in members {
            let name = swift_name(field);
            body.writeln(&format!("try container.encode({}, forKey: .{})", name, name));
        }
    }
    w.writeln("}");
}

fn protocol(profile: &RenderProfile, name: &str, members: &[Field<'_>]) -> String {
    let mut text = String::new();
    let mut w = IndentedWriter::new(&mut text);
    w.writeln(&format!("protocol {}Protocol {{", name));
    for field in members {
        w.indented().writeln(&format!(
            "var {}: {} {{ get }}",
            swift_name(field),
            field_type(profile, field)
        ));
    }
    w.writeln("}");
    text
}

// =============================================================================
// Service
// =============================================================================

fn write_service(
    w: &mut IndentedWriter<'_>,
    set: &EntitySet,
    entity: &Entity,
    profile: &RenderProfile,
) {
    w.writeln(SERVICE_LINT);
    w.newline();
    w.writeln("import Alamofire");
    w.newline();
    w.writeln(&format!("struct {}Service {{", entity.name));

    let key_ids = set.key_ids(entity.id);
    {
        let mut body = w.indented();
        body.writeln(&format!("static let path = \"/{}\"", entity.path));
        body.writeln("static let headers = [");
        body.indented().writeln(&format!(
            "\"X-Navajo-Version\": \"{}\"",
            entity.version.unwrap_or(0)
        ));
        body.writeln("]");
        body.newline();
        body.writeln("private init() { }");

        for &method in &entity.methods {
            if key_ids.is_empty() {
                body.newline();
                write_operation(&mut body, entity, profile, method, &[]);
            }
            for key in &key_ids {
                body.newline();
                let properties = set.key_properties(entity.id, key);
                write_operation(&mut body, entity, profile, method, &properties);
            }
        }
    }

    w.writeln("}");
}

fn write_operation(
    w: &mut IndentedWriter<'_>,
    entity: &Entity,
    profile: &RenderProfile,
    method: Method,
    properties: &[&Property],
) {
    let name = &entity.name;
    let body_name = variable_name(name);
    let mut parameters: Vec<String> = properties
        .iter()
        .map(|p| {
            let ty = profile.scalar_type(&p.ty);
            let ty = if p.nullable {
                profile.wrap_nullable(ty)
            } else {
                ty.to_string()
            };
            format!("{}: {}", camelcase(&p.name), ty)
        })
        .collect();
    if matches!(method, Method::Put | Method::Post) {
        if parameters.is_empty() {
            parameters.push(format!("_ {}: {}", body_name, name));
        } else {
            parameters.push(format!("{}: {}", body_name, name));
        }
    }

    let (function, returns) = match method {
        Method::Get => (camelcase(name), format!("JSONDecodableOperation<{}>", name)),
        Method::Put => ("update".to_string(), format!("JSONDecodableOperation<{}>", name)),
        Method::Post => ("insert".to_string(), "Operation".to_string()),
        Method::Delete => ("remove".to_string(), "Operation".to_string()),
    };
    w.writeln(&format!(
        "static func {}({}) -> {} {{",
        function,
        parameters.join(", "),
        returns
    ));

    {
        let mut body = w.indented();
        let query = write_query(&mut body, properties);

        let input = match (method, query) {
            (Method::Put | Method::Post, Some(query)) => {
                body.writeln(&format!(
                    "let input = EncodableEncoding({}, parameterInputEncoding: {})",
                    body_name, query
                ));
                Some("input")
            }
            (Method::Put | Method::Post, None) => {
                body.writeln(&format!("let input = EncodableEncoding({})", body_name));
                Some("input")
            }
            (_, Some(query)) => Some(query),
            (_, None) => None,
        };
        if input.is_some() {
            body.newline();
        }

        let mut arguments = vec!["path: path".to_string()];
        if method != Method::Get {
            arguments.push(format!("method: .{}", method.as_str().to_lowercase()));
        }
        arguments.push("headers: headers".to_string());
        if let Some(input) = input {
            arguments.push(format!("input: {}", input));
        }
        match method {
            Method::Get | Method::Put => {
                arguments.push(format!("output: {}.self", name));
                body.writeln(&format!(
                    "return JSONDecodableOperation({})",
                    arguments.join(", ")
                ));
            }
            Method::Post | Method::Delete => {
                body.writeln(&format!("return PlainOperation({})", arguments.join(", ")));
            }
        }
    }

    w.writeln("}");
}

/// Query dictionary for key properties; returns the encoding's variable name
fn write_query(w: &mut IndentedWriter<'_>, properties: &[&Property]) -> Option<&'static str> {
    if properties.is_empty() {
        return None;
    }

    let required: Vec<&&Property> = properties.iter().filter(|p| !p.nullable).collect();
    let optional: Vec<&&Property> = properties.iter().filter(|p| p.nullable).collect();

    if required.is_empty() {
        w.writeln("var parameters: [String: Any] = [:]");
    } else {
        let binding = if optional.is_empty() { "let" } else { "var" };
        w.writeln(&format!("{} parameters: [String: Any] = [", binding));
        for (i, property) in required.iter().enumerate() {
            let separator = if i + 1 < required.len() { "," } else { "" };
            w.indented().writeln(&format!(
                "\"{}\": {}{}",
                property.name,
                variable_name(&property.name),
                separator
            ));
        }
        w.writeln("]");
    }
    for property in &optional {
        w.writeln(&format!(
            "parameters[\"{}\"] = {}",
            property.name,
            variable_name(&property.name)
        ));
    }

    w.newline();
    w.writeln("let encoding = Alamofire.URLEncoding(destination: .queryString, boolEncoding: .literal)");
    w.writeln("let query = ParameterInputEncoding(encoding: encoding, parameters: parameters)");
    Some("query")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_cases_keep_raw_values_when_renamed() {
        let mut out = String::new();
        write_enum(
            &mut IndentedWriter::new(&mut out),
            "Status",
            &["active".to_string(), "ON_HOLD".to_string()],
        );
        assert!(out.contains("enum Status: String, Codable, CaseIterable, Comparable {"));
        assert!(out.contains("    case active\n"));
        assert!(out.contains("    case onHold = \"ON_HOLD\"\n"));
    }
}
