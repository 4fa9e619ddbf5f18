//! Format Module for vuextcg
//!
//! Sorts the catalogue and renders it as an ES module exporting one constant
//! mapping per non-empty group.

use std::collections::BTreeMap;

use crate::extract::{CatalogEntry, Catalogue};
use crate::options::GenerateOptions;
use crate::store::GroupKind;

pub const GLOBALS_MARKER: &str = "// Globals";
pub const NAMESPACED_MARKER: &str = "// Namespaced";

const INDENT: &str = "  ";

// ═══════════════════════════════════════════════════════════════════════════════
// ORDERING
// ═══════════════════════════════════════════════════════════════════════════════

/// Globals first, then namespaced entries; each tier ordered by path.
/// The sort is stable, so duplicates keep their traversal order.
pub fn sort_entries(entries: &mut [CatalogEntry]) {
    entries.sort_by(|a, b| {
        (!a.is_global())
            .cmp(&!b.is_global())
            .then_with(|| a.path.cmp(&b.path))
    });
}

pub fn sorted(entries: &[CatalogEntry]) -> Vec<CatalogEntry> {
    let mut entries = entries.to_vec();
    sort_entries(&mut entries);
    entries
}

/// Same catalogue with every group sorted.
pub fn sort_catalogue(catalogue: &Catalogue) -> Catalogue {
    Catalogue {
        getters: sorted(&catalogue.getters),
        mutations: sorted(&catalogue.mutations),
        actions: sorted(&catalogue.actions),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COLLISIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Distinct paths of one group that derive the same constant name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub group: GroupKind,
    pub constant: String,
    pub paths: Vec<String>,
}

pub fn find_collisions(catalogue: &Catalogue) -> Vec<Collision> {
    let mut collisions = Vec::new();

    for kind in GroupKind::ALL {
        let mut by_constant: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for entry in catalogue.group(kind) {
            let paths = by_constant.entry(entry.constant.as_str()).or_default();
            if !paths.contains(&entry.path) {
                paths.push(entry.path.clone());
            }
        }

        collisions.extend(
            by_constant
                .into_iter()
                .filter(|(_, paths)| paths.len() > 1)
                .map(|(constant, paths)| Collision {
                    group: kind,
                    constant: constant.to_string(),
                    paths,
                }),
        );
    }

    collisions
}

// ═══════════════════════════════════════════════════════════════════════════════
// RENDERING
// ═══════════════════════════════════════════════════════════════════════════════

/// Lines of the generated module, without line terminators.
pub fn format_catalogue(catalogue: &Catalogue, options: &GenerateOptions) -> Vec<String> {
    if options.warn_on_collisions {
        for collision in find_collisions(catalogue) {
            tracing::warn!(
                group = collision.group.export_name(),
                constant = %collision.constant,
                paths = ?collision.paths,
                "several paths share one constant name; the generated mapping has duplicate keys"
            );
        }
    }

    let mut lines = vec![options.header.clone()];
    let mut first_block = true;

    for kind in GroupKind::ALL {
        let entries = sorted(catalogue.group(kind));
        if entries.is_empty() {
            continue;
        }

        if !first_block {
            lines.push(String::new());
        }
        first_block = false;

        render_group(kind, &entries, &mut lines);
    }

    lines
}

/// The generated module as a single string ending with a newline.
pub fn render(catalogue: &Catalogue, options: &GenerateOptions) -> String {
    let mut out = format_catalogue(catalogue, options).join("\n");
    out.push('\n');
    out
}

fn render_group(kind: GroupKind, entries: &[CatalogEntry], lines: &mut Vec<String>) {
    lines.push(format!("export const {} = {{", kind.export_name()));

    let last = entries.len() - 1;
    let mut in_globals = false;

    for (idx, entry) in entries.iter().enumerate() {
        if entry.is_global() {
            if idx == 0 {
                lines.push(format!("{INDENT}{GLOBALS_MARKER}"));
                in_globals = true;
            }
        } else if idx == 0 || in_globals {
            if in_globals {
                lines.push(String::new());
                in_globals = false;
            }
            // Indented even when it opens the block, matching `// Globals`
            lines.push(format!("{INDENT}{NAMESPACED_MARKER}"));
        }

        let separator = if idx == last { "" } else { "," };
        lines.push(format!(
            "{INDENT}{}: '{}'{separator}",
            entry.constant,
            escape_single_quoted(&entry.path)
        ));
    }

    lines.push("}".to_string());
}

fn escape_single_quoted(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }
    escaped
}
