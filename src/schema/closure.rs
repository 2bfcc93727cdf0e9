//! Fetch closure
//!
//! Starting from the requested paths, fetches every document reachable
//! through `extends` attributes and `interface=` annotations on messages at
//! any depth. Each path is fetched exactly once. References made from the
//! root message each entity resolves to form a directed graph that is kept
//! for cycle reporting. Older root versions are followed for fetching but
//! are never built, so they add no edges.

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use super::annotation::Annotations;
use super::builder::root_message;
use super::reference::{split_extends, Reference};
use crate::document::{DocumentSource, Element};
use crate::error::{Result, SchemaError};

/// Raw documents keyed by logical path
pub type DocumentMap = BTreeMap<String, Element>;

/// How one document refers to another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Extends,
    Interface,
}

/// Every document needed to resolve the requested entities
#[derive(Debug, Clone)]
pub struct DocumentClosure {
    documents: DocumentMap,
    requested: Vec<String>,
    graph: DiGraph<String, ReferenceKind>,
    nodes: HashMap<String, NodeIndex>,
}

/// Fetch `requested` and everything they reference
pub fn resolve_closure(
    requested: &[String],
    source: &mut dyn DocumentSource,
) -> Result<DocumentClosure> {
    let requested: Vec<String> = requested.iter().map(|p| normalize_path(p)).collect();
    let mut closure = DocumentClosure {
        documents: DocumentMap::new(),
        requested: requested.clone(),
        graph: DiGraph::new(),
        nodes: HashMap::new(),
    };

    let mut queue: VecDeque<String> = VecDeque::new();
    let mut seen: HashSet<String> = HashSet::new();
    for path in requested {
        if seen.insert(path.clone()) {
            queue.push_back(path);
        }
    }
    tracing::info!(count = queue.len(), "requested entities");

    while let Some(path) = queue.pop_front() {
        let document = source.fetch(&path)?;
        let from = closure.node(&path);

        // a missing root is reported by the builder, with the expected name
        if let Ok((_, root)) = root_message(&path, &document) {
            for (kind, reference) in references_in(root)? {
                let to = closure.node(&reference.path);
                closure.graph.update_edge(from, to, kind);
            }
        }

        for (_, reference) in references_in(&document)? {
            if seen.insert(reference.path.clone()) {
                tracing::debug!(from = %path, to = %reference.path, "discovered reference");
                queue.push_back(reference.path);
            }
        }

        closure.documents.insert(path, document);
    }

    tracing::info!(
        requested = closure.requested.len(),
        loaded = closure.documents.len(),
        "fetch closure complete"
    );
    Ok(closure)
}

/// All references declared on messages at or below `element`
pub fn references_in(element: &Element) -> Result<Vec<(ReferenceKind, Reference)>> {
    let mut references = Vec::new();

    for element in element.descendants() {
        if element.tag != "message" {
            continue;
        }
        if let Some(extends) = element.attr("extends") {
            for raw in split_extends(extends) {
                references.push((ReferenceKind::Extends, Reference::parse(raw)?));
            }
        }
        for raw in Annotations::parse(element.attr("subtype")).interfaces {
            references.push((ReferenceKind::Interface, Reference::parse(&raw)?));
        }
    }

    Ok(references)
}

impl DocumentClosure {
    fn node(&mut self, path: &str) -> NodeIndex {
        if let Some(&index) = self.nodes.get(path) {
            return index;
        }
        let index = self.graph.add_node(path.to_string());
        self.nodes.insert(path.to_string(), index);
        index
    }

    pub fn documents(&self) -> &DocumentMap {
        &self.documents
    }

    pub fn into_documents(self) -> DocumentMap {
        self.documents
    }

    pub fn requested(&self) -> &[String] {
        &self.requested
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Paths `path` refers to directly
    pub fn references_of(&self, path: &str) -> Vec<(&str, ReferenceKind)> {
        let Some(&index) = self.nodes.get(path) else {
            return Vec::new();
        };
        let mut out: Vec<(&str, ReferenceKind)> = self
            .graph
            .edges(index)
            .map(|edge| (self.graph[edge.target()].as_str(), *edge.weight()))
            .collect();
        out.sort();
        out
    }

    /// Reference cycles, each as a closed path (`a -> b -> a`)
    pub fn cycles(&self) -> Vec<Vec<String>> {
        let mut cycles = Vec::new();

        for component in kosaraju_scc(&self.graph) {
            let is_cycle = component.len() > 1
                || component
                    .first()
                    .map(|&n| self.graph.contains_edge(n, n))
                    .unwrap_or(false);
            if !is_cycle {
                continue;
            }

            let members: HashSet<NodeIndex> = component.iter().copied().collect();
            let Some(&start) = component.iter().min_by_key(|&&n| &self.graph[n]) else {
                continue;
            };
            let path = self.cycle_through(start, &members);
            cycles.push(path.into_iter().map(|n| self.graph[n].clone()).collect());
        }

        cycles.sort();
        cycles
    }

    /// Fail with the first reference cycle, if any
    pub fn check_acyclic(&self) -> Result<()> {
        match self.cycles().into_iter().next() {
            Some(cycle) => Err(SchemaError::CyclicReference { cycle }),
            None => Ok(()),
        }
    }

    // Depth-first walk inside one strongly connected component back to `start`
    fn cycle_through(&self, start: NodeIndex, members: &HashSet<NodeIndex>) -> Vec<NodeIndex> {
        let mut path = vec![start];
        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut stack = vec![self.sorted_neighbors(start, members)];

        while let Some(candidates) = stack.last_mut() {
            let Some(next) = candidates.pop() else {
                stack.pop();
                path.pop();
                continue;
            };
            if next == start {
                path.push(start);
                return path;
            }
            if visited.insert(next) {
                path.push(next);
                stack.push(self.sorted_neighbors(next, members));
            }
        }

        vec![start, start]
    }

    fn sorted_neighbors(&self, node: NodeIndex, members: &HashSet<NodeIndex>) -> Vec<NodeIndex> {
        let mut neighbors: Vec<NodeIndex> = self
            .graph
            .neighbors(node)
            .filter(|n| members.contains(n))
            .collect();
        // popped from the back, so the smallest path is tried first
        neighbors.sort_by(|a, b| self.graph[*b].cmp(&self.graph[*a]));
        neighbors.dedup();
        neighbors
    }
}

/// `/common//Person/` → `common/Person`
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}
