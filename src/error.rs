//! Errors raised while loading a store definition.
//!
//! Every variant carries a stable code so tooling can match on it without
//! parsing messages.

use std::path::PathBuf;
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// ERROR CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const ERR_IO: &str = "VTG001";
pub const ERR_PARSE: &str = "VTG002";
pub const ERR_JSON: &str = "VTG003";
pub const ERR_MISSING_DEFAULT_EXPORT: &str = "VTG004";
pub const ERR_MALFORMED_NODE: &str = "VTG005";
pub const ERR_IMPORT_NOT_FOUND: &str = "VTG006";
pub const ERR_UNRESOLVED_EXPORT: &str = "VTG007";
pub const ERR_RESOLUTION_DEPTH: &str = "VTG008";

pub type Result<T, E = GenerateError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line}:{column}: syntax error: {message}", file.display())]
    Parse {
        file: PathBuf,
        line: u32,
        column: u32,
        message: String,
    },

    #[error("{}: invalid store definition: {source}", file.display())]
    Json {
        file: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{}: the module has no default export", file.display())]
    MissingDefaultExport { file: PathBuf },

    #[error("{}:{line}:{column}: `{node}` {reason}", file.display())]
    MalformedNode {
        file: PathBuf,
        line: u32,
        column: u32,
        node: String,
        reason: String,
    },

    #[error("{}: cannot resolve import '{specifier}'", file.display())]
    ImportNotFound { file: PathBuf, specifier: String },

    #[error("{}: module has no export named '{name}'", file.display())]
    UnresolvedExport { file: PathBuf, name: String },

    #[error("{}: resolving '{name}' recursed too deeply", file.display())]
    ResolutionDepth { file: PathBuf, name: String },
}

impl GenerateError {
    pub fn code(&self) -> &'static str {
        match self {
            GenerateError::Io { .. } => ERR_IO,
            GenerateError::Parse { .. } => ERR_PARSE,
            GenerateError::Json { .. } => ERR_JSON,
            GenerateError::MissingDefaultExport { .. } => ERR_MISSING_DEFAULT_EXPORT,
            GenerateError::MalformedNode { .. } => ERR_MALFORMED_NODE,
            GenerateError::ImportNotFound { .. } => ERR_IMPORT_NOT_FOUND,
            GenerateError::UnresolvedExport { .. } => ERR_UNRESOLVED_EXPORT,
            GenerateError::ResolutionDepth { .. } => ERR_RESOLUTION_DEPTH,
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            GenerateError::Io { .. } => "Check that the path exists and is readable.",
            GenerateError::Parse { .. } => "The store definition must be valid JavaScript or TypeScript.",
            GenerateError::Json { .. } => {
                "JSON definitions use the keys getters, mutations, actions, modules and namespaced."
            }
            GenerateError::MissingDefaultExport { .. } => {
                "Export the store definition, or a function returning it, with `export default`."
            }
            GenerateError::MalformedNode { .. } => {
                "Store definitions are read without running them; modules, property groups and \
                 `namespaced` must be literals or names bound to literals."
            }
            GenerateError::ImportNotFound { .. } => {
                "Only relative imports of files next to the definition can be followed."
            }
            GenerateError::UnresolvedExport { .. } => "Check the imported name against the module's exports.",
            GenerateError::ResolutionDepth { .. } => "Look for bindings that refer to each other in a cycle.",
        }
    }
}

/// 1-based line and column of a byte offset.
pub fn line_column(source: &str, offset: u32) -> (u32, u32) {
    let offset = (offset as usize).min(source.len());
    let before = &source.as_bytes()[..offset];
    let line = before.iter().filter(|b| **b == b'\n').count() + 1;
    let line_start = before
        .iter()
        .rposition(|b| *b == b'\n')
        .map(|p| p + 1)
        .unwrap_or(0);
    let column = String::from_utf8_lossy(&before[line_start..]).chars().count() + 1;
    (line as u32, column as u32)
}
