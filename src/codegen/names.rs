//! Identifier and path helpers shared by the emitters

use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

pub use crate::schema::shared::camelcase;

/// `name` → `Name`
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Camel case without a leading underscore
pub fn variable_name(s: &str) -> String {
    let name = camelcase(s);
    match name.strip_prefix('_') {
        Some(stripped) => stripped.to_string(),
        None => name,
    }
}

/// Swift identifier for a wire name or enum case
///
/// All-caps names are lowered first, `snake_case` becomes `snakeCase`, and
/// reserved words are wrapped in backticks.
pub fn swift_case(s: &str) -> String {
    let has_upper = s.chars().any(|c| c.is_uppercase());
    let has_lower = s.chars().any(|c| c.is_lowercase());
    let lowered;
    let s = if has_upper && !has_lower {
        lowered = s.to_lowercase();
        lowered.as_str()
    } else {
        s
    };

    let mut out = String::with_capacity(s.len());
    let mut upper_next = false;
    for c in variable_name(s).chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }

    if SWIFT_RESERVED.contains(&out.as_str()) {
        format!("`{}`", out)
    } else {
        out
    }
}

/// Enum cases such as `1` or `2.5`, which cannot be identifiers
pub fn is_numeric_case(case: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[0-9]+(\.[0-9]+)?$").expect("numeric case pattern"))
        .is_match(case)
}

pub fn is_identifier(s: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("identifier pattern"))
        .is_match(s)
}

/// `common/person` → `common.person`
pub fn dotted(package: &str) -> String {
    package
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

/// JVM package of an output directory: its components from `start` onwards
///
/// `/work/app/src/main/java/com/acme/entities` with `start = "com"` gives
/// `com.acme.entities`. Empty when `start` does not occur.
pub fn package_from(output: &Path, start: &str) -> String {
    let parts: Vec<String> = output
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .skip_while(|part| part != start)
        .collect();
    parts.join(".")
}

/// Join a base package and an entity package, skipping empty halves
pub fn join_package(base: &str, package: &str) -> String {
    [base.to_string(), dotted(package)]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

/// `common/person` → `Common/Person`
pub fn capitalize_path(path: &str) -> String {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join("/")
}

/// ES module specifier for `name` in package `to`, imported from package `from`
pub fn relative_import(from: &str, to: &str, name: &str) -> String {
    let from: Vec<&str> = from.split('/').filter(|s| !s.is_empty()).collect();
    let to: Vec<&str> = to.split('/').filter(|s| !s.is_empty()).collect();
    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = vec![".."; from.len() - common];
    parts.extend(&to[common..]);

    let relative = if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    };
    if relative.starts_with('.') {
        format!("{}/{}", relative, name)
    } else {
        format!("./{}/{}", relative, name)
    }
}

const SWIFT_RESERVED: &[&str] = &[
    "guard", "Protocol", "Self", "Type", "__COLUMN__", "__FILE__", "__FUNCTION__", "__LINE__",
    "as", "break", "case", "class", "continue", "default", "deinit", "do", "dynamicType", "else",
    "enum", "extension", "fallthrough", "false", "final", "for", "func", "if", "import", "in",
    "init", "internal", "is", "let", "nil", "operator", "private", "protocol", "public",
    "required", "return", "right", "self", "set", "static", "struct", "subscript", "super",
    "switch", "true", "typealias", "unowned", "var", "weak", "where", "while",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_helpers() {
        assert_eq!(capitalize("person"), "Person");
        assert_eq!(camelcase("PersonId"), "personId");
        assert_eq!(camelcase(""), "");
        assert_eq!(variable_name("_Hidden"), "hidden");
    }

    #[test]
    fn test_swift_case() {
        assert_eq!(swift_case("ACTIVE"), "active");
        assert_eq!(swift_case("first_name"), "firstName");
        assert_eq!(swift_case("Default"), "`default`");
        assert_eq!(swift_case("PersonId"), "personId");
    }

    #[test]
    fn test_case_patterns() {
        assert!(is_numeric_case("12"));
        assert!(is_numeric_case("1.5"));
        assert!(!is_numeric_case("1.5.2"));
        assert!(is_identifier("Active"));
        assert!(!is_identifier("in-progress"));
    }

    #[test]
    fn test_packages() {
        assert_eq!(dotted("common/person"), "common.person");
        assert_eq!(
            package_from(Path::new("/work/app/src/com/acme/entities"), "com"),
            "com.acme.entities"
        );
        assert_eq!(package_from(Path::new("/tmp/out"), "com"), "");
        assert_eq!(join_package("com.acme", "club"), "com.acme.club");
        assert_eq!(join_package("", "club/member"), "club.member");
        assert_eq!(capitalize_path("common/person"), "Common/Person");
    }

    #[test]
    fn test_relative_import() {
        assert_eq!(relative_import("club", "club", "Member"), "./Member");
        assert_eq!(relative_import("club", "common", "Person"), "../common/Person");
        assert_eq!(relative_import("", "common", "Person"), "./common/Person");
        assert_eq!(relative_import("club/member", "", "Root"), "../../Root");
    }
}
