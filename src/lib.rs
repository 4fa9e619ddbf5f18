//! # vuextcg
//!
//! Generates an ES module of getter, mutation and action type constants from a
//! Vuex store definition.
//!
//! ## Pipeline
//!
//! 1. **Load**: the definition (JSON, or a JS/TS module whose default export
//!    is the store object or a factory returning it) is read statically into a
//!    [`StoreNode`] tree. Nothing is executed.
//! 2. **Extract**: the tree is walked depth-first. Namespaced modules append
//!    their name to the namespace; other modules are transparent.
//! 3. **Format**: each group is sorted (globals first, then namespaced, by
//!    path) and rendered as `export const <group> = { CONST: 'path', ... }`.
//!
//! ## Output Invariants
//!
//! - Constant names are the upper snake case of every path segment, joined
//!   with `_`: `account/posts/popular` -> `ACCOUNT_POSTS_POPULAR`.
//! - Empty groups produce no block; an empty store produces the header only.
//! - Output depends only on the tree, never on declaration order.

#[cfg(feature = "napi")]
use napi_derive::napi;
use std::path::Path;

pub mod case;
pub mod error;
pub mod extract;
pub mod format;
mod globals;
pub mod loader;
pub mod options;
pub mod store;

#[cfg(test)]
mod loader_tests;

pub use case::canonical_constant;
pub use error::{GenerateError, Result};
pub use extract::{extract, extract_into, CatalogEntry, Catalogue, NamespacePath};
pub use format::{find_collisions, format_catalogue, render, sort_catalogue, Collision};
pub use globals::HOST_GLOBALS;
pub use loader::{load_definition, load_definition_source, LoadedDefinition};
pub use options::{GenerateOptions, DEFAULT_HEADER};
pub use store::{GroupKind, StoreNode};

/// Generates the module text for a definition held in memory. `file` selects
/// the syntax by extension and anchors relative imports.
pub fn generate(source: &str, file: &Path, options: &GenerateOptions) -> Result<String> {
    let definition = load_definition_source(source, file)?;
    Ok(render(&extract(&definition.root), options))
}

/// Generates the module text for the definition stored at `path`.
pub fn generate_from_path(path: &Path, options: &GenerateOptions) -> Result<String> {
    let definition = load_definition(path)?;
    Ok(render(&extract(&definition.root), options))
}

/// Sorted catalogue of the definition stored at `path`.
pub fn catalogue_from_path(path: &Path) -> Result<Catalogue> {
    let definition = load_definition(path)?;
    Ok(sort_catalogue(&extract(&definition.root)))
}

// ═══════════════════════════════════════════════════════════════════════════════
// NAPI EXPORTS
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(feature = "napi")]
fn to_napi_error(error: GenerateError) -> napi::Error {
    napi::Error::from_reason(format!("[{}] {}", error.code(), error))
}

#[cfg(feature = "napi")]
#[napi]
pub fn generate_types_native(
    source: String,
    file_path: String,
    options_json: Option<String>,
) -> napi::Result<String> {
    let options = GenerateOptions::from_json(options_json.as_deref().unwrap_or(""))
        .map_err(|e| napi::Error::from_reason(e.to_string()))?;
    generate(&source, Path::new(&file_path), &options).map_err(to_napi_error)
}

#[cfg(feature = "napi")]
#[napi]
pub fn catalogue_native(file_path: String) -> napi::Result<Catalogue> {
    catalogue_from_path(Path::new(&file_path)).map_err(to_napi_error)
}
