//! Resolved entity model
//!
//! Everything here is built once by [`crate::schema::builder`] and never
//! mutated afterwards. Cross-entity links are [`EntityId`]s into the
//! [`crate::schema::EntitySet`] arena, so two references to the same document
//! always compare equal.

use serde::Serialize;
use std::fmt;

use super::shared::SharedInterface;
use crate::error::{Result, SchemaError};

/// Index of an entity inside its [`crate::schema::EntitySet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(pub(crate) usize);

impl EntityId {
    pub fn index(self) -> usize {
        self.0
    }
}

// =============================================================================
// Scalars
// =============================================================================

/// The closed set of scalar property types
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Integer,
    Long,
    String,
    Boolean,
    Date,
    ClockTime,
    Float,
    Binary,
    Money,
    Timestamp,
    /// Any other tag; emitters fall back to their string type
    Unknown(String),
}

impl ScalarType {
    pub fn parse(tag: &str) -> Self {
        match tag {
            "integer" => ScalarType::Integer,
            "long" => ScalarType::Long,
            "string" => ScalarType::String,
            "boolean" => ScalarType::Boolean,
            "date" => ScalarType::Date,
            "clocktime" => ScalarType::ClockTime,
            "float" => ScalarType::Float,
            "binary" => ScalarType::Binary,
            "money" => ScalarType::Money,
            "timestamp" => ScalarType::Timestamp,
            other => {
                tracing::warn!(tag = other, "unknown property type, treating as string");
                ScalarType::Unknown(other.to_string())
            }
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            ScalarType::Integer => "integer",
            ScalarType::Long => "long",
            ScalarType::String => "string",
            ScalarType::Boolean => "boolean",
            ScalarType::Date => "date",
            ScalarType::ClockTime => "clocktime",
            ScalarType::Float => "float",
            ScalarType::Binary => "binary",
            ScalarType::Money => "money",
            ScalarType::Timestamp => "timestamp",
            ScalarType::Unknown(tag) => tag,
        }
    }
}

// =============================================================================
// Operations
// =============================================================================

/// Operation verbs an entity supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Put,
    Post,
    Delete,
}

impl Method {
    /// Parse an `operation@method` value; a missing method means GET
    pub fn parse(path: &str, raw: Option<&str>) -> Result<Self> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Method::Get),
            Some(m) if m.eq_ignore_ascii_case("GET") => Ok(Method::Get),
            Some(m) if m.eq_ignore_ascii_case("PUT") => Ok(Method::Put),
            Some(m) if m.eq_ignore_ascii_case("POST") => Ok(Method::Post),
            Some(m) if m.eq_ignore_ascii_case("DELETE") => Ok(Method::Delete),
            Some(other) => Err(SchemaError::UnknownMethod {
                path: path.to_string(),
                method: other.to_string(),
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Tree
// =============================================================================

/// A scalar field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Property {
    /// Wire name
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ScalarType,
    pub method: Option<String>,
    pub nullable: bool,
    /// Enum cases; when present the field's type is an enum named after it
    pub enumeration: Option<Vec<String>>,
    pub is_key: bool,
    pub is_optional_key: bool,
    /// Key groups this property belongs to, empty unless `is_key`
    pub key_ids: Vec<String>,
}

impl Property {
    /// Input-only fields never appear in response payloads
    pub fn is_request_only(&self) -> bool {
        self.method.as_deref() == Some("request")
    }

    pub fn in_key_group(&self, key: &str) -> bool {
        self.is_key && self.key_ids.iter().any(|k| k == key)
    }
}

/// Parents of a message
///
/// The three shapes need different emission, so they are separate variants
/// rather than a list whose length callers must inspect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Inheritance {
    None,
    Single { parent: EntityId },
    Multiple {
        parents: Vec<EntityId>,
        shared: SharedInterface,
    },
}

impl Inheritance {
    pub fn parents(&self) -> &[EntityId] {
        match self {
            Inheritance::None => &[],
            Inheritance::Single { parent } => std::slice::from_ref(parent),
            Inheritance::Multiple { parents, .. } => parents,
        }
    }

    pub fn single(&self) -> Option<EntityId> {
        match self {
            Inheritance::Single { parent } => Some(*parent),
            _ => None,
        }
    }

    pub fn shared(&self) -> Option<&SharedInterface> {
        match self {
            Inheritance::Multiple { shared, .. } => Some(shared),
            _ => None,
        }
    }
}

/// A node in an entity's tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// Name with any version suffix stripped
    pub name: String,
    pub is_array: bool,
    pub nullable: bool,
    pub properties: Vec<Property>,
    pub messages: Vec<Message>,
    pub inheritance: Inheritance,
    pub interfaces: Vec<EntityId>,
    pub is_interface: bool,
}

impl Message {
    pub fn parents(&self) -> &[EntityId] {
        self.inheritance.parents()
    }

    /// Whether the message declares anything beyond what it inherits
    pub fn is_non_empty(&self) -> bool {
        !self.properties.is_empty() || !self.messages.is_empty()
    }

    /// Whether emitters give this message a type of its own
    ///
    /// A message with exactly one parent and nothing of its own is just a
    /// use of the parent's type.
    pub fn has_own_type(&self) -> bool {
        match self.inheritance {
            Inheritance::Single { .. } => self.is_non_empty(),
            _ => true,
        }
    }

    /// The parent whose type this message reuses, when it has no type of its own
    pub fn alias_of(&self) -> Option<EntityId> {
        if self.has_own_type() {
            None
        } else {
            self.inheritance.single()
        }
    }

    /// Properties that appear in payloads
    pub fn payload_properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter().filter(|p| !p.is_request_only())
    }
}

/// One top-level, versioned entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    /// Logical path of the source document
    pub path: String,
    /// Namespace derived from the path, `/` separated, possibly empty
    pub package: String,
    /// `None` when the document carries no versioned root message
    pub version: Option<u32>,
    pub methods: Vec<Method>,
    pub root: Message,
}

impl Entity {
    pub fn is_versioned(&self) -> bool {
        self.version.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(name: &str) -> Message {
        Message {
            name: name.to_string(),
            is_array: false,
            nullable: false,
            properties: Vec::new(),
            messages: Vec::new(),
            inheritance: Inheritance::None,
            interfaces: Vec::new(),
            is_interface: false,
        }
    }

    #[test]
    fn test_scalar_type_tags() {
        for tag in [
            "integer", "long", "string", "boolean", "date", "clocktime", "float", "binary",
            "money", "timestamp",
        ] {
            assert_eq!(ScalarType::parse(tag).tag(), tag);
        }
        assert_eq!(
            ScalarType::parse("memo"),
            ScalarType::Unknown("memo".to_string())
        );
    }

    #[test]
    fn test_method_parse() {
        assert_eq!(Method::parse("p", None).unwrap(), Method::Get);
        assert_eq!(Method::parse("p", Some("delete")).unwrap(), Method::Delete);
        assert!(matches!(
            Method::parse("p", Some("PATCH")),
            Err(SchemaError::UnknownMethod { .. })
        ));
    }

    #[test]
    fn test_own_type_decision() {
        let plain = message("Address");
        assert!(plain.has_own_type());
        assert_eq!(plain.alias_of(), None);

        let mut alias = message("Address");
        alias.inheritance = Inheritance::Single { parent: EntityId(3) };
        assert!(!alias.is_non_empty());
        assert_eq!(alias.alias_of(), Some(EntityId(3)));

        let mut extended = alias.clone();
        extended.messages.push(message("Extra"));
        assert!(extended.has_own_type());
        assert_eq!(extended.alias_of(), None);
    }
}
