//! Shared interfaces for multiple inheritance
//!
//! None of the target languages let a class extend several concrete parents,
//! so a message with more than one parent is emitted as a type that conforms
//! to a synthesized contract: the variables and enums the message declares
//! itself. That contract is the [`SharedInterface`].

use serde::Serialize;
use std::hash::{Hash, Hasher};

use super::model::{Entity, EntityId, Message, ScalarType};

/// Type of a shared-interface variable, before any language mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VariableType {
    Scalar { scalar: ScalarType },
    /// Synthesized enum named after the property; `scope` qualifies it when
    /// the enum lives in another generated type
    Enum { name: String, scope: Option<String> },
    /// The child message's own nested type
    Nested { name: String },
    /// The child message reuses a parent entity's type
    Entity { id: EntityId, name: String },
}

impl VariableType {
    pub fn is_primitive(&self) -> bool {
        matches!(self, VariableType::Scalar { .. })
    }
}

/// One member of a shared interface
///
/// Equality and hashing consider only the wire name: an inherited variable is
/// "the same" as a more specific redeclaration with that name.
#[derive(Debug, Clone, Serialize)]
pub struct Variable {
    pub network_name: String,
    /// Local identifier (camel case, `List` suffix for arrays)
    pub name: String,
    #[serde(rename = "type")]
    pub ty: VariableType,
    pub is_array: bool,
    pub nullable: bool,
    /// Name of the child message this variable was derived from
    pub message: Option<String>,
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.network_name == other.network_name
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.network_name.hash(state);
    }
}

/// An enum hoisted into a shared interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumDef {
    pub name: String,
    pub scope: Option<String>,
    pub cases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharedInterface {
    /// Name of the owning message
    pub name: String,
    pub variables: Vec<Variable>,
    /// Interfaces the owning message declares, then the entities it extends
    pub parents: Vec<EntityId>,
    pub enums: Vec<EnumDef>,
    /// False when a parent already is the interface by name, so emitters
    /// reference that type instead of declaring a nested one
    pub is_inner: bool,
}

impl SharedInterface {
    /// Build the contract of `message`, which extends `extends`
    ///
    /// `entities` must contain every entity the message references; the
    /// builder guarantees this by resolving references before their users.
    pub fn synthesize(message: &Message, extends: &[EntityId], entities: &[Entity]) -> Self {
        let scope = message
            .is_interface
            .then(|| format!("{}Entity", message.name));

        let mut variables: Vec<Variable> = Vec::new();
        let mut enums = Vec::new();

        for property in message.payload_properties() {
            let ty = match &property.enumeration {
                Some(cases) => {
                    enums.push(EnumDef {
                        name: property.name.clone(),
                        scope: scope.clone(),
                        cases: cases.clone(),
                    });
                    VariableType::Enum {
                        name: property.name.clone(),
                        scope: scope.clone(),
                    }
                }
                None => VariableType::Scalar {
                    scalar: property.ty.clone(),
                },
            };
            push_unique(
                &mut variables,
                Variable {
                    network_name: property.name.clone(),
                    name: camelcase(&property.name),
                    ty,
                    is_array: false,
                    nullable: property.nullable,
                    message: None,
                },
            );
        }

        for child in &message.messages {
            let ty = match child.alias_of() {
                Some(id) => VariableType::Entity {
                    id,
                    name: entity_name(entities, id),
                },
                None => VariableType::Nested {
                    name: child.name.clone(),
                },
            };
            let mut name = camelcase(&child.name);
            if child.is_array {
                name.push_str("List");
            }
            push_unique(
                &mut variables,
                Variable {
                    network_name: child.name.clone(),
                    name,
                    ty,
                    is_array: child.is_array,
                    nullable: child.nullable,
                    message: Some(child.name.clone()),
                },
            );
        }

        let mut parents = message.interfaces.clone();
        for id in extends {
            if !parents.contains(id) {
                parents.push(*id);
            }
        }
        let is_inner = !parents
            .iter()
            .any(|&id| entity_name(entities, id) == message.name);

        Self {
            name: message.name.clone(),
            variables,
            parents,
            enums,
            is_inner,
        }
    }

    pub fn variable(&self, network_name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.network_name == network_name)
    }
}

fn push_unique(variables: &mut Vec<Variable>, variable: Variable) {
    if !variables.contains(&variable) {
        variables.push(variable);
    }
}

/// `Name` → `name`, the variable spelling of a wire name
pub fn camelcase(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn entity_name(entities: &[Entity], id: EntityId) -> String {
    entities
        .get(id.index())
        .map(|e| e.name.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::model::{Inheritance, Property};

    fn entity(id: usize, name: &str) -> Entity {
        Entity {
            id: EntityId(id),
            name: name.to_string(),
            path: format!("common/{}", name),
            package: "common".to_string(),
            version: None,
            methods: Vec::new(),
            root: message(name),
        }
    }

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

    fn property(name: &str) -> Property {
        Property {
            name: name.to_string(),
            ty: ScalarType::String,
            method: None,
            nullable: true,
            enumeration: None,
            is_key: false,
            is_optional_key: false,
            key_ids: Vec::new(),
        }
    }

    #[test]
    fn test_variables_cover_properties_and_messages() {
        let entities = vec![entity(0, "Address")];
        let mut m = message("Member");
        m.properties.push(property("Name"));
        let mut secret = property("Password");
        secret.method = Some("request".to_string());
        m.properties.push(secret);
        let mut status = property("Status");
        status.enumeration = Some(vec!["Active".into(), "Inactive".into()]);
        m.properties.push(status);

        let mut home = message("Home");
        home.inheritance = Inheritance::Single { parent: EntityId(0) };
        m.messages.push(home);
        let mut phones = message("Phone");
        phones.is_array = true;
        phones.properties.push(property("Number"));
        m.messages.push(phones);

        let shared = SharedInterface::synthesize(&m, &[], &entities);
        let names: Vec<_> = shared.variables.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["name", "status", "home", "phoneList"]);

        assert!(shared.variables[0].ty.is_primitive());
        assert_eq!(
            shared.variables[1].ty,
            VariableType::Enum { name: "Status".into(), scope: None }
        );
        assert_eq!(
            shared.variables[2].ty,
            VariableType::Entity { id: EntityId(0), name: "Address".into() }
        );
        assert_eq!(shared.variables[3].ty, VariableType::Nested { name: "Phone".into() });
        assert_eq!(shared.enums[0].cases, vec!["Active", "Inactive"]);
    }

    #[test]
    fn test_enum_scope_when_message_is_interface() {
        let mut m = message("Named");
        m.is_interface = true;
        let mut kind = property("Kind");
        kind.enumeration = Some(vec!["A".into()]);
        m.properties.push(kind);

        let shared = SharedInterface::synthesize(&m, &[], &[]);
        assert_eq!(
            shared.variables[0].ty,
            VariableType::Enum { name: "Kind".into(), scope: Some("NamedEntity".into()) }
        );
    }

    #[test]
    fn test_is_inner_depends_on_parent_names() {
        let entities = vec![entity(0, "Member"), entity(1, "Named"), entity(2, "Dated")];

        let m = message("Member");
        let collapses = SharedInterface::synthesize(&m, &[EntityId(0), EntityId(1)], &entities);
        assert!(!collapses.is_inner);
        assert_eq!(collapses.parents, vec![EntityId(0), EntityId(1)]);

        let fresh = SharedInterface::synthesize(&m, &[EntityId(1), EntityId(2)], &entities);
        assert!(fresh.is_inner);

        let mut declared = message("Member");
        declared.interfaces = vec![EntityId(0)];
        let via_interface = SharedInterface::synthesize(&declared, &[EntityId(1), EntityId(2)], &entities);
        assert!(!via_interface.is_inner);
        assert_eq!(via_interface.parents, vec![EntityId(0), EntityId(1), EntityId(2)]);
    }

    #[test]
    fn test_variable_equality_uses_wire_name_only() {
        let a = Variable {
            network_name: "Id".into(),
            name: "id".into(),
            ty: VariableType::Scalar { scalar: ScalarType::String },
            is_array: false,
            nullable: true,
            message: None,
        };
        let mut b = a.clone();
        b.name = "identifier".into();
        b.nullable = false;
        b.ty = VariableType::Scalar { scalar: ScalarType::Long };
        assert_eq!(a, b);
    }

    #[test]
    fn test_camelcase_lowers_first_letter_only() {
        assert_eq!(camelcase("HomeAddress"), "homeAddress");
        assert_eq!(camelcase("URL"), "uRL");
        assert_eq!(camelcase(""), "");
    }
}
