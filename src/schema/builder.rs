//! Message tree builder
//!
//! Turns raw documents into [`Entity`] values. Entities are memoised per
//! logical path: however often a document is referenced, it is built once and
//! every reference receives the same [`EntityId`]. Cross-entity references are
//! resolved (and version checked) while the referencing message is built, so a
//! parent always lands in the arena before its children.

use std::collections::HashMap;

use super::annotation::{Annotations, KeySpec};
use super::closure::{normalize_path, DocumentMap};
use super::model::{Entity, EntityId, Inheritance, Message, Method, Property, ScalarType};
use super::reference::{base_name, display_version, split_extends, version_suffix, Reference};
use super::set::EntitySet;
use super::shared::SharedInterface;
use crate::document::{entity_name, entity_package, Element};
use crate::error::{Result, SchemaError};

pub struct EntityBuilder<'a> {
    documents: &'a DocumentMap,
    entities: Vec<Entity>,
    by_path: HashMap<String, EntityId>,
    in_progress: Vec<String>,
}

impl<'a> EntityBuilder<'a> {
    pub fn new(documents: &'a DocumentMap) -> Self {
        Self {
            documents,
            entities: Vec::new(),
            by_path: HashMap::new(),
            in_progress: Vec::new(),
        }
    }

    /// Build the entity at `path`, or return the one already built
    pub fn build(&mut self, path: &str) -> Result<EntityId> {
        let path = normalize_path(path);
        if let Some(&id) = self.by_path.get(&path) {
            return Ok(id);
        }
        if let Some(start) = self.in_progress.iter().position(|p| *p == path) {
            let mut cycle = self.in_progress[start..].to_vec();
            cycle.push(path);
            return Err(SchemaError::CyclicReference { cycle });
        }

        let documents = self.documents;
        let document = documents
            .get(&path)
            .ok_or_else(|| SchemaError::UnknownDocument { path: path.clone() })?;

        self.in_progress.push(path.clone());
        let built = self.build_entity(&path, document);
        self.in_progress.pop();

        let mut entity = built?;
        let id = EntityId(self.entities.len());
        entity.id = id;
        tracing::debug!(path = %path, name = %entity.name, version = %display_version(entity.version), "built entity");
        self.entities.push(entity);
        self.by_path.insert(path, id);
        Ok(id)
    }

    /// Entities built so far, in build order
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn finish(self, requested: Vec<EntityId>) -> EntitySet {
        EntitySet::new(self.entities, requested)
    }

    fn build_entity(&mut self, path: &str, document: &Element) -> Result<Entity> {
        let name = entity_name(path).to_string();
        let (version, root) = root_message(path, document)?;

        let methods = document
            .children_named("operations")
            .flat_map(|ops| ops.children_named("operation"))
            .map(|op| Method::parse(path, op.attr("method")))
            .collect::<Result<Vec<_>>>()?;

        let root = self.build_message(path, root)?;

        Ok(Entity {
            id: EntityId(usize::MAX),
            name,
            path: path.to_string(),
            package: entity_package(path).to_string(),
            version,
            methods,
            root,
        })
    }

    fn build_message(&mut self, path: &str, element: &Element) -> Result<Message> {
        let raw_name = element
            .attr("name")
            .ok_or_else(|| SchemaError::missing_attribute(path, "message", "name"))?;
        let name = base_name(raw_name).to_string();
        let is_array = element.attr("type") == Some("array");
        let outer = Annotations::parse(element.attr("subtype"));

        // Arrays describe their element in a synthetic definition child
        let (definition, annotations) = if is_array {
            let definition = element
                .children_named("message")
                .find(|m| m.attr("type") == Some("definition"))
                .ok_or_else(|| SchemaError::MissingDefinition {
                    path: path.to_string(),
                    message: name.clone(),
                })?;
            (definition, Annotations::parse(definition.attr("subtype")))
        } else {
            (element, outer.clone())
        };

        if annotations.enumeration.is_some() {
            tracing::debug!(path, message = %name, "ignoring enum annotation on a message");
        }

        let properties = definition
            .children_named("property")
            .map(|p| build_property(path, p))
            .collect::<Result<Vec<_>>>()?;

        let mut messages = Vec::new();
        for child in definition.children_named("message") {
            messages.push(self.build_message(path, child)?);
        }

        let mut parents = Vec::new();
        if let Some(extends) = definition.attr("extends") {
            for raw in split_extends(extends) {
                let id = self.resolve_reference(path, raw)?;
                if !parents.contains(&id) {
                    parents.push(id);
                }
            }
        }

        let mut interfaces = Vec::new();
        for raw in &annotations.interfaces {
            let id = self.resolve_reference(path, raw)?;
            if !interfaces.contains(&id) {
                interfaces.push(id);
            }
        }

        if parents.len() > 1 && interfaces.len() > 1 {
            return Err(SchemaError::UnsupportedCombination {
                path: path.to_string(),
                message: name,
            });
        }

        let mut message = Message {
            name,
            is_array,
            nullable: outer.message_nullable(),
            properties,
            messages,
            inheritance: Inheritance::None,
            interfaces,
            is_interface: annotations.is_interface,
        };

        message.inheritance = match parents.len() {
            0 => Inheritance::None,
            1 => Inheritance::Single { parent: parents[0] },
            _ => {
                let shared = SharedInterface::synthesize(&message, &parents, &self.entities);
                Inheritance::Multiple { parents, shared }
            }
        };

        Ok(message)
    }

    fn resolve_reference(&mut self, path: &str, raw: &str) -> Result<EntityId> {
        let reference = Reference::parse(raw)?;
        let id = self.build(&reference.path)?;
        let resolved = self.entities[id.index()].version;

        if resolved != reference.version {
            return Err(SchemaError::VersionMismatch {
                path: path.to_string(),
                reference: reference.raw,
                target: reference.path,
                requested: display_version(reference.version),
                resolved: display_version(resolved),
            });
        }
        Ok(id)
    }
}

fn build_property(path: &str, element: &Element) -> Result<Property> {
    let name = element
        .attr("name")
        .ok_or_else(|| SchemaError::missing_attribute(path, "property", "name"))?;
    let ty = element
        .attr("type")
        .ok_or_else(|| SchemaError::missing_attribute(path, "property", "type"))?;

    let annotations = Annotations::parse(element.attr("subtype"));
    let key = KeySpec::parse(element.attr("key"));

    Ok(Property {
        name: name.to_string(),
        ty: ScalarType::parse(ty),
        method: element.attr("method").map(str::to_string),
        nullable: annotations.property_nullable(),
        enumeration: annotations.enumeration,
        is_key: key.is_some(),
        is_optional_key: key.as_ref().map(|k| k.optional).unwrap_or(false),
        key_ids: key.map(|k| k.ids).unwrap_or_default(),
    })
}

/// The top-level message an entity resolves to, named after the highest version
///
/// Older versions and unrelated top-level messages in the same document are
/// never built.
pub fn root_message<'a>(path: &str, document: &'a Element) -> Result<(Option<u32>, &'a Element)> {
    let name = entity_name(path);
    let version = max_version(name, document);
    let expected = match version {
        Some(v) => format!("{}.{}", name, v),
        None => name.to_string(),
    };

    document
        .children_named("message")
        .find(|m| m.attr("name") == Some(expected.as_str()))
        .map(|root| (version, root))
        .ok_or_else(|| SchemaError::MissingRootMessage {
            path: path.to_string(),
            expected,
        })
}

/// Highest numeric version among the document's root message candidates
///
/// `None` when no top-level message named after the entity carries a version.
pub fn max_version(name: &str, document: &Element) -> Option<u32> {
    document
        .children_named("message")
        .filter_map(|m| m.attr("name"))
        .filter(|n| base_name(n) == name)
        .filter_map(version_suffix)
        .filter_map(|v| v.parse::<u32>().ok())
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse_document;

    fn documents(docs: &[(&str, &str)]) -> DocumentMap {
        docs.iter()
            .map(|(p, xml)| (p.to_string(), parse_document(p, xml).unwrap()))
            .collect()
    }

    #[test]
    fn test_max_version() {
        let doc = parse_document(
            "p",
            r#"<n><message name="Person"/><message name="Person.2"/><message name="Person.10"/><message name="PersonX.99"/></n>"#,
        )
        .unwrap();
        assert_eq!(max_version("Person", &doc), Some(10));
        assert_eq!(max_version("Club", &doc), None);
    }

    #[test]
    fn test_picks_versioned_root_and_methods() {
        let docs = documents(&[(
            "common/Person",
            r#"<n>
                <message name="Person"><property name="Old" type="string"/></message>
                <message name="Person.2"><property name="New" type="string"/></message>
                <operations><operation method="GET"/><operation/><operation method="DELETE"/></operations>
            </n>"#,
        )]);
        let mut builder = EntityBuilder::new(&docs);
        let id = builder.build("common/Person").unwrap();
        let entity = &builder.entities()[id.index()];

        assert_eq!(entity.version, Some(2));
        assert_eq!(entity.package, "common");
        assert_eq!(entity.root.properties[0].name, "New");
        assert_eq!(entity.methods, vec![Method::Get, Method::Get, Method::Delete]);
    }

    #[test]
    fn test_missing_root_message() {
        let docs = documents(&[("common/Person", r#"<n><message name="Human"/></n>"#)]);
        let mut builder = EntityBuilder::new(&docs);
        assert!(matches!(
            builder.build("common/Person"),
            Err(SchemaError::MissingRootMessage { expected, .. }) if expected == "Person"
        ));
    }

    #[test]
    fn test_missing_property_type() {
        let docs = documents(&[(
            "A",
            r#"<n><message name="A"><property name="Id"/></message></n>"#,
        )]);
        let mut builder = EntityBuilder::new(&docs);
        assert!(matches!(
            builder.build("A"),
            Err(SchemaError::MissingAttribute { attribute, .. }) if attribute == "type"
        ));
    }

    #[test]
    fn test_array_uses_definition_node() {
        let docs = documents(&[
            ("A", r#"<n><message name="A"/></n>"#),
            (
                "B",
                r#"<n><message name="B">
                    <message name="Items" type="array" subtype="nullable=true">
                        <message name="Items" type="definition" extends="navajo://A" subtype="isInterface=true">
                            <property name="Count" type="integer"/>
                        </message>
                    </message>
                </message></n>"#,
            ),
        ]);
        let mut builder = EntityBuilder::new(&docs);
        let b = builder.build("B").unwrap();
        let a = builder.build("A").unwrap();
        let items = &builder.entities()[b.index()].root.messages[0];

        assert!(items.is_array);
        assert!(items.nullable);
        assert!(items.is_interface);
        assert_eq!(items.properties[0].ty, ScalarType::Integer);
        assert_eq!(items.inheritance, Inheritance::Single { parent: a });
    }

    #[test]
    fn test_array_without_definition_fails() {
        let docs = documents(&[(
            "A",
            r#"<n><message name="A"><message name="Items" type="array"/></message></n>"#,
        )]);
        assert!(matches!(
            EntityBuilder::new(&docs).build("A"),
            Err(SchemaError::MissingDefinition { .. })
        ));
    }

    #[test]
    fn test_unversioned_reference_to_versioned_entity_is_a_mismatch() {
        let docs = documents(&[
            ("A", r#"<n><message name="A.1"/></n>"#),
            ("B", r#"<n><message name="B" extends="navajo://A"/></n>"#),
        ]);
        assert!(matches!(
            EntityBuilder::new(&docs).build("B"),
            Err(SchemaError::VersionMismatch { requested, resolved, .. })
                if requested == "-1" && resolved == "1"
        ));
    }

    #[test]
    fn test_cycle_in_builder_reports_path() {
        let docs = documents(&[
            ("A", r#"<n><message name="A" extends="navajo://B"/></n>"#),
            ("B", r#"<n><message name="B" extends="navajo://A"/></n>"#),
        ]);
        let err = EntityBuilder::new(&docs).build("A").unwrap_err();
        match err {
            SchemaError::CyclicReference { cycle } => assert_eq!(cycle, vec!["A", "B", "A"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_multiple_parents_with_multiple_interfaces_is_unsupported() {
        let docs = documents(&[
            ("P", r#"<n><message name="P"/></n>"#),
            ("Q", r#"<n><message name="Q"/></n>"#),
            ("I", r#"<n><message name="I"/></n>"#),
            ("J", r#"<n><message name="J"/></n>"#),
            (
                "M",
                r#"<n><message name="M" extends="navajo://P^navajo://Q" subtype="interface=navajo://I;navajo://J"/></n>"#,
            ),
        ]);
        assert!(matches!(
            EntityBuilder::new(&docs).build("M"),
            Err(SchemaError::UnsupportedCombination { .. })
        ));
    }

    #[test]
    fn test_multiple_parents_synthesize_shared_interface() {
        let docs = documents(&[
            ("P", r#"<n><message name="P"/></n>"#),
            ("Q", r#"<n><message name="Q"/></n>"#),
            (
                "M",
                r#"<n><message name="M" extends="navajo://P,navajo://Q">
                    <property name="Label" type="string" subtype="nullable=false"/>
                </message></n>"#,
            ),
        ]);
        let mut builder = EntityBuilder::new(&docs);
        let m = builder.build("M").unwrap();
        let root = &builder.entities()[m.index()].root;

        assert_eq!(root.parents().len(), 2);
        let shared = root.inheritance.shared().unwrap();
        assert_eq!(shared.name, "M");
        assert!(shared.is_inner);
        assert_eq!(shared.variables[0].network_name, "Label");
        assert!(!shared.variables[0].nullable);
    }
}
