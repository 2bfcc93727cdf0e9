//! The resolved entity arena

use serde::Serialize;
use std::collections::HashMap;

use super::dependencies;
use super::model::{Entity, EntityId, Property};

/// Every entity of one resolution run
///
/// Entities are stored parents-first; an [`EntityId`] is only meaningful for
/// the set that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct EntitySet {
    entities: Vec<Entity>,
    requested: Vec<EntityId>,
    #[serde(skip)]
    by_path: HashMap<String, EntityId>,
}

impl EntitySet {
    pub(crate) fn new(entities: Vec<Entity>, requested: Vec<EntityId>) -> Self {
        let by_path = entities.iter().map(|e| (e.path.clone(), e.id)).collect();
        Self {
            entities,
            requested,
            by_path,
        }
    }

    pub fn get(&self, id: EntityId) -> &Entity {
        &self.entities[id.index()]
    }

    pub fn by_path(&self, path: &str) -> Option<&Entity> {
        self.by_path.get(path).map(|&id| self.get(id))
    }

    /// All entities, requested or pulled in by references
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Entities that were asked for, in request order
    pub fn requested(&self) -> impl Iterator<Item = &Entity> {
        self.requested.iter().map(|&id| self.get(id))
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Key groups of an entity, parents' groups first
    pub fn key_ids(&self, id: EntityId) -> Vec<String> {
        let entity = self.get(id);
        let mut ids: Vec<String> = Vec::new();

        for &parent in entity.root.parents() {
            for key in self.key_ids(parent) {
                if !ids.contains(&key) {
                    ids.push(key);
                }
            }
        }
        for property in entity.root.properties.iter().filter(|p| p.is_key) {
            for key in &property.key_ids {
                if !ids.contains(key) {
                    ids.push(key.clone());
                }
            }
        }

        ids
    }

    /// Properties in key group `key`, own properties before inherited ones
    pub fn key_properties(&self, id: EntityId, key: &str) -> Vec<&Property> {
        let entity = self.get(id);
        let mut properties: Vec<&Property> = entity
            .root
            .properties
            .iter()
            .filter(|p| p.in_key_group(key))
            .collect();

        for &parent in entity.root.parents() {
            for property in self.key_properties(parent, key) {
                // a diamond reaches the same ancestor twice
                if !properties.iter().any(|p| std::ptr::eq(*p, property)) {
                    properties.push(property);
                }
            }
        }

        properties
    }

    /// See [`dependencies::dependencies`]
    pub fn dependencies(&self, id: EntityId, for_logic: bool) -> Vec<EntityId> {
        dependencies::dependencies(self, id, for_logic)
    }
}
