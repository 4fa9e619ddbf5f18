//! Store Model for vuextcg
//!
//! Typed view of a Vuex store definition: three property groups, nested
//! modules and the `namespaced` flag. Only property names are meaningful;
//! leaf bodies stay opaque.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

// ═══════════════════════════════════════════════════════════════════════════════
// GROUP KINDS
// ═══════════════════════════════════════════════════════════════════════════════

/// The three property groups a store node can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupKind {
    Getters,
    Mutations,
    Actions,
}

impl GroupKind {
    /// Render order of the generated module.
    pub const ALL: [GroupKind; 3] = [GroupKind::Getters, GroupKind::Mutations, GroupKind::Actions];

    /// Name of the exported constant mapping, which is also the key used in
    /// the store definition.
    pub fn export_name(self) -> &'static str {
        match self {
            GroupKind::Getters => "getters",
            GroupKind::Mutations => "mutations",
            GroupKind::Actions => "actions",
        }
    }

    pub fn from_key(key: &str) -> Option<GroupKind> {
        match key {
            "getters" => Some(GroupKind::Getters),
            "mutations" => Some(GroupKind::Mutations),
            "actions" => Some(GroupKind::Actions),
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// STORE NODE
// ═══════════════════════════════════════════════════════════════════════════════

/// Opaque body of a getter, mutation or action. Its contents are never read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Leaf;

impl<'de> Deserialize<'de> for Leaf {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        IgnoredAny::deserialize(deserializer)?;
        Ok(Leaf)
    }
}

impl Serialize for Leaf {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_unit()
    }
}

pub type PropertyGroup = BTreeMap<String, Leaf>;

/// A node of the store tree. Every field is optional in the input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreNode {
    #[serde(default)]
    pub getters: PropertyGroup,
    #[serde(default)]
    pub mutations: PropertyGroup,
    #[serde(default)]
    pub actions: PropertyGroup,
    #[serde(default)]
    pub modules: BTreeMap<String, StoreNode>,
    #[serde(default)]
    pub namespaced: bool,
}

impl StoreNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group(&self, kind: GroupKind) -> &PropertyGroup {
        match kind {
            GroupKind::Getters => &self.getters,
            GroupKind::Mutations => &self.mutations,
            GroupKind::Actions => &self.actions,
        }
    }

    pub fn group_mut(&mut self, kind: GroupKind) -> &mut PropertyGroup {
        match kind {
            GroupKind::Getters => &mut self.getters,
            GroupKind::Mutations => &mut self.mutations,
            GroupKind::Actions => &mut self.actions,
        }
    }

    /// Marks the node as namespaced.
    pub fn namespaced(mut self) -> Self {
        self.namespaced = true;
        self
    }

    pub fn with_property(mut self, kind: GroupKind, name: impl Into<String>) -> Self {
        self.group_mut(kind).insert(name.into(), Leaf);
        self
    }

    pub fn with_getter(self, name: impl Into<String>) -> Self {
        self.with_property(GroupKind::Getters, name)
    }

    pub fn with_mutation(self, name: impl Into<String>) -> Self {
        self.with_property(GroupKind::Mutations, name)
    }

    pub fn with_action(self, name: impl Into<String>) -> Self {
        self.with_property(GroupKind::Actions, name)
    }

    pub fn with_module(mut self, name: impl Into<String>, module: StoreNode) -> Self {
        self.modules.insert(name.into(), module);
        self
    }

    /// Number of leaf properties in this node and all of its modules.
    pub fn leaf_count(&self) -> usize {
        let own: usize = GroupKind::ALL.iter().map(|k| self.group(*k).len()).sum();
        own + self.modules.values().map(StoreNode::leaf_count).sum::<usize>()
    }
}
