//! Entity dependencies
//!
//! Emitters need to know which other entities a generated file refers to:
//! parents, the ancestors whose constructors must be called, the parents of
//! nested messages and every interface. The result is ordered by first
//! appearance and free of duplicates, so generated imports are stable.
//!
//! The owning entity itself appears in the list when one of its nested
//! messages gets a type of its own; emitters use that as a marker and drop it
//! from imports.

use super::model::{EntityId, Inheritance, Message};
use super::set::EntitySet;

/// Entities `id` depends on
///
/// With `for_logic`, nullable nested messages (and everything below them)
/// are ignored: business-logic classes never take them as constructor
/// arguments.
pub fn dependencies(set: &EntitySet, id: EntityId, for_logic: bool) -> Vec<EntityId> {
    let entity = set.get(id);
    let mut out = Vec::new();

    for &parent in entity.root.parents() {
        out.push(parent);
        out.extend(constructor_dependencies(set, parent));
    }
    if entity.root.inheritance.shared().is_some() {
        out.push(id);
    }

    interface_dependencies(set, &entity.root, &mut out);
    nested_dependencies(set, id, &entity.root, for_logic, &mut out);

    dedup(out)
}

/// Entities needed to build the super-constructor call chain of `id`
pub fn constructor_dependencies(set: &EntitySet, id: EntityId) -> Vec<EntityId> {
    let entity = set.get(id);
    let mut out = Vec::new();

    if let Some(parent) = entity.root.inheritance.single() {
        out.extend(constructor_dependencies(set, parent));
    }

    for message in entity.root.messages.iter().filter(|m| !m.nullable) {
        match &message.inheritance {
            Inheritance::Single { parent } => {
                if message.is_non_empty() {
                    out.push(id);
                } else {
                    out.push(*parent);
                }
            }
            Inheritance::Multiple { parents, .. } => {
                out.push(id);
                out.extend(parents.iter().copied());
            }
            Inheritance::None => out.push(id),
        }
    }

    out
}

fn nested_dependencies(
    set: &EntitySet,
    owner: EntityId,
    message: &Message,
    for_logic: bool,
    out: &mut Vec<EntityId>,
) {
    for child in &message.messages {
        if for_logic && child.nullable {
            continue;
        }

        if child.has_own_type() {
            out.push(owner);
        }
        for &parent in child.parents() {
            out.push(parent);
            out.extend(constructor_dependencies(set, parent));
        }

        interface_dependencies(set, child, out);
        nested_dependencies(set, owner, child, for_logic, out);
    }
}

fn interface_dependencies(set: &EntitySet, message: &Message, out: &mut Vec<EntityId>) {
    for &interface in &message.interfaces {
        out.push(interface);
        out.extend(constructor_dependencies(set, interface));
    }
}

fn dedup(ids: Vec<EntityId>) -> Vec<EntityId> {
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}
