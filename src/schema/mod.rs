//! Entity resolution
//!
//! ```text
//! requested paths ──► closure (fetch once per path, reference graph)
//!                        │
//!                        ▼ cycle check
//!                     builder (memoised per path, version checks)
//!                        │
//!                        ▼
//!                     EntitySet ──► dependencies / key groups ──► codegen
//! ```

pub mod annotation;
pub mod builder;
pub mod closure;
pub mod dependencies;
pub mod model;
pub mod reference;
pub mod set;
pub mod shared;

pub use annotation::{Annotations, KeySpec};
pub use builder::EntityBuilder;
pub use closure::{resolve_closure, DocumentClosure, DocumentMap, ReferenceKind};
pub use model::{Entity, EntityId, Inheritance, Message, Method, Property, ScalarType};
pub use reference::Reference;
pub use set::EntitySet;
pub use shared::{EnumDef, SharedInterface, Variable, VariableType};

use crate::document::DocumentSource;
use crate::error::Result;

/// Fetch, check and build `requested` and everything they reference
pub fn resolve(requested: &[String], source: &mut dyn DocumentSource) -> Result<EntitySet> {
    let closure = resolve_closure(requested, source)?;
    closure.check_acyclic()?;
    resolve_documents(closure.requested(), closure.documents())
}

/// Build `requested` from documents that are already loaded
pub fn resolve_documents(requested: &[String], documents: &DocumentMap) -> Result<EntitySet> {
    let mut builder = EntityBuilder::new(documents);
    let mut ids = Vec::with_capacity(requested.len());
    for path in requested {
        let id = builder.build(path)?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    let set = builder.finish(ids);
    tracing::info!(
        requested = requested.len(),
        resolved = set.len(),
        "entities resolved"
    );
    Ok(set)
}
