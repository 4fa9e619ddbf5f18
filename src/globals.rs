//! Browser global detection.
//!
//! Definitions that touch `window` or `document` while building the store
//! still load, since nothing runs; the names are collected for reporting.

use oxc_ast::ast::{IdentifierReference, Program};
use oxc_ast_visit::Visit;
use std::collections::BTreeSet;

/// Browser globals a store definition may touch while it is being built.
/// The loader never runs the definition, so these are reported rather than
/// stubbed.
pub const HOST_GLOBALS: &[&str] = &[
    "window",
    "document",
    "localStorage",
    "sessionStorage",
    "navigator",
    "location",
    "history",
    "fetch",
    "XMLHttpRequest",
];

#[derive(Default)]
pub struct HostGlobalScanner {
    pub found: BTreeSet<String>,
}

impl HostGlobalScanner {
    pub fn scan(program: &Program<'_>) -> BTreeSet<String> {
        let mut scanner = HostGlobalScanner::default();
        scanner.visit_program(program);
        scanner.found
    }
}

impl<'a> Visit<'a> for HostGlobalScanner {
    fn visit_identifier_reference(&mut self, ident: &IdentifierReference<'a>) {
        let name = ident.name.as_str();
        if HOST_GLOBALS.contains(&name) {
            self.found.insert(name.to_string());
        }
    }
}
