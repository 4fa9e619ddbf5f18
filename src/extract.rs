//! Extract Module for vuextcg
//!
//! Walks a store tree depth-first, accumulating the namespace of every
//! namespaced module on the way down, and records one catalogue entry per
//! getter, mutation and action.

#[cfg(feature = "napi")]
use napi_derive::napi;
use serde::{Deserialize, Serialize};

use crate::case::canonical_constant;
use crate::store::{GroupKind, StoreNode};

// ═══════════════════════════════════════════════════════════════════════════════
// NAMESPACE PATH
// ═══════════════════════════════════════════════════════════════════════════════

/// Names of the namespaced modules between the root and the current node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespacePath {
    segments: Vec<String>,
}

impl NamespacePath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Path of a namespaced child module.
    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self { segments }
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Namespace segments followed by the property name.
    pub fn qualify<'s>(&'s self, property: &'s str) -> Vec<&'s str> {
        let mut full: Vec<&str> = self.segments.iter().map(String::as_str).collect();
        full.push(property);
        full
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CATALOGUE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "napi", napi(object))]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// Upper snake case identifier, e.g. `ACCOUNT_POSTS_POPULAR`.
    pub constant: String,
    /// Slash separated path as passed to `commit`/`dispatch`, e.g. `account/posts/popular`.
    pub path: String,
    /// Number of namespaced modules enclosing the property.
    pub depth: u32,
}

impl CatalogEntry {
    pub fn new(namespace: &NamespacePath, property: &str) -> Self {
        let full = namespace.qualify(property);
        CatalogEntry {
            constant: canonical_constant(&full),
            path: full.join("/"),
            depth: namespace.depth() as u32,
        }
    }

    pub fn is_global(&self) -> bool {
        self.depth == 0
    }
}

/// Entries of every group, in traversal order until the formatter sorts them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "napi", napi(object))]
#[serde(rename_all = "camelCase")]
pub struct Catalogue {
    pub getters: Vec<CatalogEntry>,
    pub mutations: Vec<CatalogEntry>,
    pub actions: Vec<CatalogEntry>,
}

impl Catalogue {
    pub fn group(&self, kind: GroupKind) -> &[CatalogEntry] {
        match kind {
            GroupKind::Getters => &self.getters,
            GroupKind::Mutations => &self.mutations,
            GroupKind::Actions => &self.actions,
        }
    }

    fn group_mut(&mut self, kind: GroupKind) -> &mut Vec<CatalogEntry> {
        match kind {
            GroupKind::Getters => &mut self.getters,
            GroupKind::Mutations => &mut self.mutations,
            GroupKind::Actions => &mut self.actions,
        }
    }

    pub fn len(&self) -> usize {
        self.getters.len() + self.mutations.len() + self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TRAVERSAL
// ═══════════════════════════════════════════════════════════════════════════════

/// Builds the catalogue of a whole store. The root's own `namespaced` flag is
/// ignored: its properties are always global.
pub fn extract(root: &StoreNode) -> Catalogue {
    let mut catalogue = Catalogue::default();
    extract_into(root, &NamespacePath::root(), &mut catalogue);

    tracing::debug!(
        getters = catalogue.getters.len(),
        mutations = catalogue.mutations.len(),
        actions = catalogue.actions.len(),
        "extracted store catalogue"
    );
    catalogue
}

/// Appends the entries of `node` and its modules, all placed under `namespace`.
pub fn extract_into(node: &StoreNode, namespace: &NamespacePath, out: &mut Catalogue) {
    for kind in GroupKind::ALL {
        let entries = node
            .group(kind)
            .keys()
            .map(|property| CatalogEntry::new(namespace, property));
        out.group_mut(kind).extend(entries);
    }

    for (name, module) in &node.modules {
        if module.namespaced {
            tracing::trace!(module = %name, depth = namespace.depth() + 1, "entering namespaced module");
            extract_into(module, &namespace.child(name), out);
        } else {
            // Non-namespaced modules register their properties in the parent's namespace
            tracing::trace!(module = %name, "entering global module");
            extract_into(module, namespace, out);
        }
    }
}
