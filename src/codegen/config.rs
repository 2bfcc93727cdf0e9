//! Codegen Configuration
//!
//! One `RenderProfile` per target language: how scalar tags map to language
//! types, how sequences and nullable types are spelled, and which identifiers
//! need escaping. Resolution is profile-free; only emission consults this.

use serde::{Deserialize, Serialize};

use crate::schema::ScalarType;

/// Supported target languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Java,
    Kotlin,
    Swift,
    TypeScript,
}

impl Language {
    pub fn profile(self) -> RenderProfile {
        match self {
            Language::Java => RenderProfile::java(),
            Language::Kotlin => RenderProfile::kotlin(),
            Language::Swift => RenderProfile::swift(),
            Language::TypeScript => RenderProfile::typescript(),
        }
    }
}

/// Language-specific rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderProfile {
    pub language: Language,
    pub types: TypeMappings,
    pub file_extension: String,
    /// Prefix or wrapper used for identifiers that collide with keywords
    pub keyword_escape: KeywordEscape,
}

/// Target type for every scalar tag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeMappings {
    pub integer: String,
    pub long: String,
    pub string: String,
    pub boolean: String,
    pub date: String,
    pub clocktime: String,
    pub float: String,
    pub binary: String,
    pub money: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordEscape {
    /// `_class`
    Prefix(String),
    /// `` `class` ``
    Backticks,
}

// =============================================================================
// Default Profiles
// =============================================================================

impl RenderProfile {
    pub fn java() -> Self {
        Self {
            language: Language::Java,
            types: TypeMappings {
                integer: "Integer".into(),
                long: "Long".into(),
                string: "String".into(),
                boolean: "Boolean".into(),
                date: "String".into(),
                clocktime: "String".into(),
                float: "Double".into(),
                binary: "String".into(),
                money: "Double".into(),
                timestamp: "String".into(),
            },
            file_extension: "java".into(),
            keyword_escape: KeywordEscape::Prefix("_".into()),
        }
    }

    pub fn kotlin() -> Self {
        Self {
            language: Language::Kotlin,
            types: TypeMappings {
                integer: "Int".into(),
                long: "Long".into(),
                string: "String".into(),
                boolean: "Boolean".into(),
                date: "String".into(),
                clocktime: "String".into(),
                float: "Double".into(),
                binary: "String".into(),
                money: "Double".into(),
                timestamp: "String".into(),
            },
            file_extension: "kt".into(),
            keyword_escape: KeywordEscape::Backticks,
        }
    }

    pub fn swift() -> Self {
        Self {
            language: Language::Swift,
            types: TypeMappings {
                integer: "Int".into(),
                long: "Int64".into(),
                string: "String".into(),
                boolean: "Bool".into(),
                date: "String".into(),
                clocktime: "String".into(),
                float: "Double".into(),
                binary: "Data".into(),
                money: "Double".into(),
                timestamp: "String".into(),
            },
            file_extension: "swift".into(),
            keyword_escape: KeywordEscape::Backticks,
        }
    }

    pub fn typescript() -> Self {
        Self {
            language: Language::TypeScript,
            types: TypeMappings {
                integer: "number".into(),
                long: "number".into(),
                string: "string".into(),
                boolean: "boolean".into(),
                date: "Date".into(),
                clocktime: "string".into(),
                float: "number".into(),
                binary: "string".into(),
                money: "number".into(),
                timestamp: "Date".into(),
            },
            file_extension: "ts".into(),
            keyword_escape: KeywordEscape::Prefix("_".into()),
        }
    }
}

// =============================================================================
// Render Helpers
// =============================================================================

impl RenderProfile {
    /// Language type of a scalar; unknown tags fall back to the string type
    pub fn scalar_type(&self, scalar: &ScalarType) -> &str {
        match scalar {
            ScalarType::Integer => &self.types.integer,
            ScalarType::Long => &self.types.long,
            ScalarType::String => &self.types.string,
            ScalarType::Boolean => &self.types.boolean,
            ScalarType::Date => &self.types.date,
            ScalarType::ClockTime => &self.types.clocktime,
            ScalarType::Float => &self.types.float,
            ScalarType::Binary => &self.types.binary,
            ScalarType::Money => &self.types.money,
            ScalarType::Timestamp => &self.types.timestamp,
            ScalarType::Unknown(_) => &self.types.string,
        }
    }

    /// Wrap a type in the language's sequence type
    pub fn wrap_array(&self, type_str: &str) -> String {
        match self.language {
            Language::Java => format!("List<{}>", type_str),
            Language::Kotlin => format!("MutableList<{}>", type_str),
            Language::Swift => format!("[{}]", type_str),
            Language::TypeScript => format!("{}[]", type_str),
        }
    }

    /// Spell a nullable type; Java expresses nullability with annotations
    pub fn wrap_nullable(&self, type_str: &str) -> String {
        match self.language {
            Language::Java => type_str.to_string(),
            Language::Kotlin | Language::Swift => format!("{}?", type_str),
            Language::TypeScript => format!("{} | null", type_str),
        }
    }

    pub fn is_keyword(&self, name: &str) -> bool {
        let keywords = match self.language {
            Language::Java => JAVA_KEYWORDS,
            Language::Kotlin => KOTLIN_KEYWORDS,
            Language::Swift => SWIFT_KEYWORDS,
            Language::TypeScript => TS_KEYWORDS,
        };
        keywords.contains(&name)
    }

    /// Escape a keyword if needed
    pub fn escape_keyword(&self, name: &str) -> String {
        if !self.is_keyword(name) {
            return name.to_string();
        }
        match &self.keyword_escape {
            KeywordEscape::Prefix(prefix) => format!("{}{}", prefix, name),
            KeywordEscape::Backticks => format!("`{}`", name),
        }
    }
}

// =============================================================================
// Keywords
// =============================================================================

const JAVA_KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally",
    "float", "for", "goto", "if", "implements", "import", "instanceof", "int", "interface",
    "long", "native", "new", "package", "private", "protected", "public", "return", "short",
    "static", "strictfp", "super", "switch", "synchronized", "this", "throw", "throws",
    "transient", "try", "void", "volatile", "while", "true", "false", "null",
];

const KOTLIN_KEYWORDS: &[&str] = &[
    "as", "break", "class", "continue", "do", "else", "false", "for", "fun", "if", "in",
    "interface", "is", "null", "object", "package", "return", "super", "this", "throw", "true",
    "try", "typealias", "typeof", "val", "var", "when", "while",
];

const SWIFT_KEYWORDS: &[&str] = &[
    "as", "break", "case", "class", "continue", "default", "defer", "do", "else", "enum",
    "extension", "fallthrough", "false", "for", "func", "guard", "if", "import", "in", "init",
    "internal", "is", "let", "nil", "operator", "private", "protocol", "public", "repeat",
    "return", "self", "Self", "static", "struct", "subscript", "super", "switch", "throw",
    "true", "try", "typealias", "var", "where", "while",
];

const TS_KEYWORDS: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete",
    "do", "else", "enum", "export", "extends", "false", "finally", "for", "function", "if",
    "import", "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw",
    "true", "try", "typeof", "var", "void", "while", "with",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_tables() {
        let java = RenderProfile::java();
        assert_eq!(java.scalar_type(&ScalarType::Integer), "Integer");
        assert_eq!(java.scalar_type(&ScalarType::Float), "Double");

        let swift = RenderProfile::swift();
        assert_eq!(swift.scalar_type(&ScalarType::Binary), "Data");
        assert_eq!(swift.scalar_type(&ScalarType::Boolean), "Bool");

        let ts = RenderProfile::typescript();
        assert_eq!(ts.scalar_type(&ScalarType::Timestamp), "Date");
        assert_eq!(ts.scalar_type(&ScalarType::Money), "number");
    }

    #[test]
    fn test_unknown_tag_falls_back_to_string() {
        for language in [Language::Java, Language::Kotlin, Language::Swift, Language::TypeScript] {
            let profile = language.profile();
            let unknown = ScalarType::Unknown("memo".into());
            assert_eq!(profile.scalar_type(&unknown), profile.types.string);
        }
    }

    #[test]
    fn test_wrappers() {
        assert_eq!(RenderProfile::java().wrap_array("Person"), "List<Person>");
        assert_eq!(RenderProfile::kotlin().wrap_nullable("Int"), "Int?");
        assert_eq!(RenderProfile::swift().wrap_array("Person"), "[Person]");
        assert_eq!(RenderProfile::typescript().wrap_nullable("string"), "string | null");
    }

    #[test]
    fn test_keyword_escape() {
        assert_eq!(RenderProfile::java().escape_keyword("class"), "_class");
        assert_eq!(RenderProfile::kotlin().escape_keyword("val"), "`val`");
        assert_eq!(RenderProfile::typescript().escape_keyword("name"), "name");
    }
}
