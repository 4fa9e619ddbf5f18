//! Loader Module for vuextcg
//!
//! Reads a store definition without running it. JSON files deserialize
//! straight into a [`StoreNode`]; JavaScript and TypeScript modules are parsed
//! with oxc and their default export is resolved statically.
//!
//! ## Resolution Rules
//!
//! 1. Only structural values are resolved: property groups (their keys),
//!    `modules` and `namespaced`. Getter, mutation and action bodies are never
//!    inspected.
//! 2. A default-exported function is a factory. Its body-level declarations
//!    form a local scope and its last body-level `return` is the definition.
//! 3. Identifiers resolve through factory locals, module declarations and
//!    imports. Relative imports are followed lazily; package imports and
//!    unbound names (browser globals included) are opaque.
//! 4. A structural value that is opaque is an error, never a guess.

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    ArrowFunctionExpression, BindingPattern, Declaration, ExportDefaultDeclarationKind,
    Expression, FormalParameters, Function, ImportDeclarationSpecifier, ModuleExportName,
    ObjectExpression, ObjectProperty, ObjectPropertyKind, Program, PropertyKey, Statement,
    VariableDeclaration,
};
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType, Span};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashMap};
use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::{line_column, GenerateError, Result};
use crate::globals::HostGlobalScanner;
use crate::store::{GroupKind, Leaf, StoreNode};

const MAX_RESOLUTION_DEPTH: usize = 64;

/// Extensions tried, in order, for extensionless relative imports.
const MODULE_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "ts", "mts", "cts", "jsx", "tsx"];

const DEFAULT_EXPORT: &str = "default";
const SPREAD: &str = "...";

// ═══════════════════════════════════════════════════════════════════════════════
// PUBLIC API
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct LoadedDefinition {
    pub root: StoreNode,
    /// Every file read while resolving the definition, entry file first.
    pub files: Vec<PathBuf>,
    /// Browser globals referenced anywhere in those files.
    pub host_globals: BTreeSet<String>,
}

/// Loads the definition at `path`; relative paths start at the working directory.
pub fn load_definition(path: &Path) -> Result<LoadedDefinition> {
    let path = absolute(path)?;
    let source = read_source(&path)?;
    load_definition_source(&source, &path)
}

/// Loads a definition whose entry source is already in memory. `path` decides
/// the syntax (by extension) and anchors relative imports.
pub fn load_definition_source(source: &str, path: &Path) -> Result<LoadedDefinition> {
    if is_json(path) {
        let root = serde_json::from_str(source).map_err(|source| GenerateError::Json {
            file: path.to_path_buf(),
            source,
        })?;
        return Ok(LoadedDefinition {
            root,
            files: vec![path.to_path_buf()],
            host_globals: BTreeSet::new(),
        });
    }

    let allocator = Allocator::default();
    let loader = Loader::new(&allocator);
    let entry = loader.load_source(path.to_path_buf(), source)?;
    let root = loader.definition_root(&entry)?;

    let host_globals = loader.host_globals.into_inner();
    if !host_globals.is_empty() {
        tracing::debug!(
            globals = ?host_globals,
            "definition references browser globals; they are not evaluated"
        );
    }

    Ok(LoadedDefinition {
        root,
        files: loader.files.into_inner(),
        host_globals,
    })
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = env::current_dir().map_err(|source| GenerateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(cwd.join(path))
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| GenerateError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("json")
}

fn source_type_for(path: &Path) -> SourceType {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("js");
    let typescript = matches!(ext, "ts" | "mts" | "cts" | "tsx");
    let jsx = matches!(ext, "js" | "jsx" | "tsx");
    SourceType::default()
        .with_module(true)
        .with_typescript(typescript)
        .with_jsx(jsx)
}

/// Finds the file a relative specifier points at. Package specifiers yield `None`.
fn resolve_specifier(from: &Path, specifier: &str) -> Option<PathBuf> {
    if !(specifier.starts_with("./") || specifier.starts_with("../") || specifier.starts_with('/')) {
        return None;
    }
    let base = from.parent().unwrap_or_else(|| Path::new(".")).join(specifier);
    if base.is_file() {
        return Some(base);
    }

    let with_extension = MODULE_EXTENSIONS.iter().map(|ext| {
        let mut candidate = OsString::from(base.as_os_str());
        candidate.push(".");
        candidate.push(ext);
        PathBuf::from(candidate)
    });
    let index = MODULE_EXTENSIONS
        .iter()
        .map(|ext| base.join(format!("index.{ext}")));

    with_extension.chain(index).find(|candidate| candidate.is_file())
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCOPES AND MODULES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy)]
enum ImportedName<'a> {
    Named(&'a str),
    Namespace,
}

#[derive(Debug, Clone, Copy)]
enum ScopeBinding<'a> {
    Value(&'a Expression<'a>),
    Function(&'a Function<'a>),
    /// `const { getters } = shared` binds `getters` to `shared.getters`.
    Member {
        object: &'a Expression<'a>,
        property: &'a str,
    },
    Import {
        specifier: &'a str,
        name: ImportedName<'a>,
    },
    Opaque,
}

#[derive(Debug, Clone, Copy)]
enum ExportBinding<'a> {
    Local(&'a str),
    Value(&'a Expression<'a>),
    Function(&'a Function<'a>),
    ReExport {
        specifier: &'a str,
        name: ImportedName<'a>,
    },
    Opaque,
}

struct LexicalScope<'a> {
    file: Rc<PathBuf>,
    source: &'a str,
    bindings: HashMap<&'a str, ScopeBinding<'a>>,
    parent: Option<Rc<LexicalScope<'a>>>,
}

struct SourceModule<'a> {
    path: Rc<PathBuf>,
    scope: Rc<LexicalScope<'a>>,
    exports: HashMap<&'a str, ExportBinding<'a>>,
    star_exports: Vec<&'a str>,
    default_span: Span,
}

/// Where a value came from, for error reporting.
#[derive(Clone)]
struct Site<'a> {
    file: Rc<PathBuf>,
    source: &'a str,
    span: Span,
}

impl<'a> Site<'a> {
    fn in_scope(scope: &LexicalScope<'a>, span: Span) -> Self {
        Site {
            file: scope.file.clone(),
            source: scope.source,
            span,
        }
    }

    fn malformed(&self, node: &str, reason: &str) -> GenerateError {
        let (line, column) = line_column(self.source, self.span.start);
        GenerateError::MalformedNode {
            file: self.file.to_path_buf(),
            line,
            column,
            node: if node.is_empty() {
                "default export".to_string()
            } else {
                node.to_string()
            },
            reason: reason.to_string(),
        }
    }
}

#[derive(Clone, Copy)]
enum Callable<'a> {
    Function(&'a Function<'a>),
    Arrow(&'a ArrowFunctionExpression<'a>),
}

/// A statically known value.
enum Resolved<'a> {
    Object {
        scope: Rc<LexicalScope<'a>>,
        object: &'a ObjectExpression<'a>,
    },
    /// `import * as ns` or `export * as ns`.
    Namespace(Rc<SourceModule<'a>>),
    Function {
        scope: Rc<LexicalScope<'a>>,
        callable: Callable<'a>,
    },
    String(String),
    Number(f64),
    Bool(bool),
    Opaque,
}

impl Resolved<'_> {
    /// JavaScript truthiness, when it is known without running anything.
    fn truthiness(&self) -> Option<bool> {
        match self {
            Resolved::Bool(flag) => Some(*flag),
            Resolved::String(text) => Some(!text.is_empty()),
            Resolved::Number(value) => Some(*value != 0.0 && !value.is_nan()),
            Resolved::Object { .. } | Resolved::Namespace(_) | Resolved::Function { .. } => Some(true),
            Resolved::Opaque => None,
        }
    }
}

enum Member<'a> {
    Value {
        scope: Rc<LexicalScope<'a>>,
        expr: &'a Expression<'a>,
    },
    Export {
        module: Rc<SourceModule<'a>>,
        name: String,
    },
}

struct Property<'a> {
    key: String,
    member: Member<'a>,
}

/// Later duplicates win, but keep the position of the first occurrence.
fn upsert<'a>(properties: &mut Vec<Property<'a>>, property: Property<'a>) {
    match properties.iter_mut().find(|p| p.key == property.key) {
        Some(existing) => existing.member = property.member,
        None => properties.push(property),
    }
}

fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn export_name<'a>(name: &'a ModuleExportName<'a>) -> &'a str {
    match name {
        ModuleExportName::IdentifierName(id) => id.name.as_str(),
        ModuleExportName::IdentifierReference(id) => id.name.as_str(),
        ModuleExportName::StringLiteral(lit) => lit.value.as_str(),
    }
}

fn bind_opaque<'a>(pattern: &'a BindingPattern<'a>, bindings: &mut HashMap<&'a str, ScopeBinding<'a>>) {
    match pattern {
        BindingPattern::BindingIdentifier(id) => {
            bindings.insert(id.name.as_str(), ScopeBinding::Opaque);
        }
        BindingPattern::ObjectPattern(obj) => {
            for prop in &obj.properties {
                bind_opaque(&prop.value, bindings);
            }
            if let Some(rest) = &obj.rest {
                bind_opaque(&rest.argument, bindings);
            }
        }
        BindingPattern::ArrayPattern(arr) => {
            for pattern in arr.elements.iter().flatten() {
                bind_opaque(pattern, bindings);
            }
            if let Some(rest) = &arr.rest {
                bind_opaque(&rest.argument, bindings);
            }
        }
        _ => {}
    }
}

/// Binds the names of a `const`/`let`/`var` declaration; returns them in order.
fn declare_variables<'a>(
    decl: &'a VariableDeclaration<'a>,
    bindings: &mut HashMap<&'a str, ScopeBinding<'a>>,
) -> Vec<&'a str> {
    let mut names = Vec::new();
    for declarator in &decl.declarations {
        match (&declarator.id, &declarator.init) {
            (BindingPattern::BindingIdentifier(id), Some(init)) => {
                bindings.insert(id.name.as_str(), ScopeBinding::Value(init));
                names.push(id.name.as_str());
            }
            (BindingPattern::ObjectPattern(obj), Some(init)) => {
                for prop in &obj.properties {
                    let key = match &prop.key {
                        PropertyKey::StaticIdentifier(key) if !prop.computed => Some(key.name.as_str()),
                        _ => None,
                    };
                    match (&prop.value, key) {
                        (BindingPattern::BindingIdentifier(id), Some(property)) => {
                            bindings.insert(
                                id.name.as_str(),
                                ScopeBinding::Member {
                                    object: init,
                                    property,
                                },
                            );
                            names.push(id.name.as_str());
                        }
                        (pattern, _) => bind_opaque(pattern, bindings),
                    }
                }
                if let Some(rest) = &obj.rest {
                    bind_opaque(&rest.argument, bindings);
                }
            }
            (pattern, _) => bind_opaque(pattern, bindings),
        }
    }
    names
}

/// Binds what a declaration-level statement introduces. Returns the declared
/// names so exports can refer to them.
fn declare_statement<'a>(
    stmt: &'a Statement<'a>,
    bindings: &mut HashMap<&'a str, ScopeBinding<'a>>,
) -> Vec<&'a str> {
    match stmt {
        Statement::VariableDeclaration(decl) => declare_variables(decl, bindings),
        Statement::FunctionDeclaration(function) => declare_function(function, bindings),
        Statement::ClassDeclaration(class) => match &class.id {
            Some(id) => {
                bindings.insert(id.name.as_str(), ScopeBinding::Opaque);
                vec![id.name.as_str()]
            }
            None => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn declare_function<'a>(
    function: &'a Function<'a>,
    bindings: &mut HashMap<&'a str, ScopeBinding<'a>>,
) -> Vec<&'a str> {
    match &function.id {
        Some(id) => {
            bindings.insert(id.name.as_str(), ScopeBinding::Function(function));
            vec![id.name.as_str()]
        }
        None => Vec::new(),
    }
}

fn declare<'a>(
    declaration: &'a Declaration<'a>,
    bindings: &mut HashMap<&'a str, ScopeBinding<'a>>,
) -> Vec<&'a str> {
    match declaration {
        Declaration::VariableDeclaration(decl) => declare_variables(decl, bindings),
        Declaration::FunctionDeclaration(function) => declare_function(function, bindings),
        Declaration::ClassDeclaration(class) => match &class.id {
            Some(id) => {
                bindings.insert(id.name.as_str(), ScopeBinding::Opaque);
                vec![id.name.as_str()]
            }
            None => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn build_module<'a>(path: Rc<PathBuf>, source: &'a str, program: &'a Program<'a>) -> SourceModule<'a> {
    let mut bindings = HashMap::new();
    let mut exports = HashMap::new();
    let mut star_exports = Vec::new();
    let mut default_span = Span::new(0, 0);

    for stmt in &program.body {
        match stmt {
            Statement::ImportDeclaration(decl) => {
                if decl.import_kind.is_type() {
                    continue;
                }
                let specifier = decl.source.value.as_str();
                for spec in decl.specifiers.iter().flatten() {
                    let (local, name) = match spec {
                        ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                            (s.local.name.as_str(), ImportedName::Named(DEFAULT_EXPORT))
                        }
                        ImportDeclarationSpecifier::ImportSpecifier(s) => {
                            (s.local.name.as_str(), ImportedName::Named(export_name(&s.imported)))
                        }
                        ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                            (s.local.name.as_str(), ImportedName::Namespace)
                        }
                    };
                    bindings.insert(local, ScopeBinding::Import { specifier, name });
                }
            }
            Statement::ExportNamedDeclaration(decl) => {
                if decl.export_kind.is_type() {
                    continue;
                }
                if let Some(declaration) = &decl.declaration {
                    for name in declare(declaration, &mut bindings) {
                        exports.insert(name, ExportBinding::Local(name));
                    }
                }
                let source = decl.source.as_ref().map(|s| s.value.as_str());
                for spec in &decl.specifiers {
                    let local = export_name(&spec.local);
                    let binding = match source {
                        Some(specifier) => ExportBinding::ReExport {
                            specifier,
                            name: ImportedName::Named(local),
                        },
                        None => ExportBinding::Local(local),
                    };
                    exports.insert(export_name(&spec.exported), binding);
                }
            }
            Statement::ExportDefaultDeclaration(decl) => {
                default_span = decl.span;
                let binding = match &decl.declaration {
                    ExportDefaultDeclarationKind::FunctionDeclaration(function) => {
                        declare_function(function, &mut bindings);
                        ExportBinding::Function(function)
                    }
                    kind => match kind.as_expression() {
                        Some(expr) => ExportBinding::Value(expr),
                        None => ExportBinding::Opaque,
                    },
                };
                exports.insert(DEFAULT_EXPORT, binding);
            }
            Statement::ExportAllDeclaration(decl) => {
                let specifier = decl.source.value.as_str();
                match &decl.exported {
                    Some(name) => {
                        exports.insert(
                            export_name(name),
                            ExportBinding::ReExport {
                                specifier,
                                name: ImportedName::Namespace,
                            },
                        );
                    }
                    None => star_exports.push(specifier),
                }
            }
            stmt => {
                declare_statement(stmt, &mut bindings);
            }
        }
    }

    let scope = Rc::new(LexicalScope {
        file: path.clone(),
        source,
        bindings,
        parent: None,
    });

    SourceModule {
        path,
        scope,
        exports,
        star_exports,
        default_span,
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// LOADER
// ═══════════════════════════════════════════════════════════════════════════════

struct Loader<'a> {
    allocator: &'a Allocator,
    modules: RefCell<HashMap<PathBuf, Rc<SourceModule<'a>>>>,
    files: RefCell<Vec<PathBuf>>,
    host_globals: RefCell<BTreeSet<String>>,
    depth: Cell<usize>,
}

struct DepthGuard<'g>(&'g Cell<usize>);

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}

impl<'a> Loader<'a> {
    fn new(allocator: &'a Allocator) -> Self {
        Loader {
            allocator,
            modules: RefCell::new(HashMap::new()),
            files: RefCell::new(Vec::new()),
            host_globals: RefCell::new(BTreeSet::new()),
            depth: Cell::new(0),
        }
    }

    fn enter(&self, file: &Path, name: &str) -> Result<DepthGuard<'_>> {
        let depth = self.depth.get() + 1;
        if depth > MAX_RESOLUTION_DEPTH {
            return Err(GenerateError::ResolutionDepth {
                file: file.to_path_buf(),
                name: name.to_string(),
            });
        }
        self.depth.set(depth);
        Ok(DepthGuard(&self.depth))
    }

    fn load_source(&self, path: PathBuf, text: &str) -> Result<Rc<SourceModule<'a>>> {
        let source: &'a str = self.allocator.alloc_str(text);
        let ret = Parser::new(self.allocator, source, source_type_for(&path)).parse();

        if let Some(error) = ret.errors.first() {
            let offset = error
                .labels
                .as_ref()
                .and_then(|labels| labels.first())
                .map(|label| label.offset() as u32)
                .unwrap_or(0);
            let (line, column) = line_column(source, offset);
            return Err(GenerateError::Parse {
                file: path,
                line,
                column,
                message: error.to_string(),
            });
        }

        let program: &'a Program<'a> = self.allocator.alloc(ret.program);
        self.host_globals
            .borrow_mut()
            .extend(HostGlobalScanner::scan(program));

        tracing::debug!(file = %path.display(), "parsed store module");
        self.files.borrow_mut().push(path.clone());

        let module = Rc::new(build_module(Rc::new(path.clone()), source, program));
        self.modules.borrow_mut().insert(path, module.clone());
        Ok(module)
    }

    fn load_file(&self, path: PathBuf) -> Result<Rc<SourceModule<'a>>> {
        let path = fs::canonicalize(&path).unwrap_or(path);
        if let Some(module) = self.modules.borrow().get(&path) {
            return Ok(module.clone());
        }
        let text = read_source(&path)?;
        self.load_source(path, &text)
    }

    /// Loads the module behind `specifier`, or `None` for package imports.
    fn import(&self, scope: &LexicalScope<'a>, specifier: &str) -> Result<Option<Rc<SourceModule<'a>>>> {
        match resolve_specifier(&scope.file, specifier) {
            Some(path) => self.load_file(path).map(Some),
            None if specifier.starts_with('.') || specifier.starts_with('/') => {
                Err(GenerateError::ImportNotFound {
                    file: scope.file.to_path_buf(),
                    specifier: specifier.to_string(),
                })
            }
            None => {
                tracing::trace!(specifier, "package import treated as opaque");
                Ok(None)
            }
        }
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Values
    // ───────────────────────────────────────────────────────────────────────────

    fn resolve_expr(&self, scope: &Rc<LexicalScope<'a>>, expr: &'a Expression<'a>) -> Result<Resolved<'a>> {
        match expr {
            Expression::ParenthesizedExpression(inner) => self.resolve_expr(scope, &inner.expression),
            Expression::TSAsExpression(inner) => self.resolve_expr(scope, &inner.expression),
            Expression::TSSatisfiesExpression(inner) => self.resolve_expr(scope, &inner.expression),
            Expression::TSNonNullExpression(inner) => self.resolve_expr(scope, &inner.expression),
            Expression::ObjectExpression(object) => Ok(Resolved::Object {
                scope: scope.clone(),
                object,
            }),
            Expression::FunctionExpression(function) => Ok(Resolved::Function {
                scope: scope.clone(),
                callable: Callable::Function(function),
            }),
            Expression::ArrowFunctionExpression(arrow) => Ok(Resolved::Function {
                scope: scope.clone(),
                callable: Callable::Arrow(arrow),
            }),
            Expression::StringLiteral(lit) => Ok(Resolved::String(lit.value.to_string())),
            Expression::TemplateLiteral(tpl) if tpl.expressions.is_empty() => {
                Ok(match tpl.quasis.first().and_then(|q| q.value.cooked) {
                    Some(cooked) => Resolved::String(cooked.to_string()),
                    None => Resolved::Opaque,
                })
            }
            Expression::BooleanLiteral(lit) => Ok(Resolved::Bool(lit.value)),
            Expression::NumericLiteral(lit) => Ok(Resolved::Number(lit.value)),
            Expression::UnaryExpression(unary) if unary.operator.as_str() == "!" => {
                Ok(match self.resolve_expr(scope, &unary.argument)?.truthiness() {
                    Some(flag) => Resolved::Bool(!flag),
                    None => Resolved::Opaque,
                })
            }
            Expression::Identifier(ident) => self.resolve_name(scope, ident.name.as_str()),
            Expression::StaticMemberExpression(member) => {
                let object = self.resolve_expr(scope, &member.object)?;
                self.resolve_member(object, member.property.name.as_str())
            }
            Expression::ComputedMemberExpression(member) => match self.resolve_expr(scope, &member.expression)? {
                Resolved::String(key) => {
                    let object = self.resolve_expr(scope, &member.object)?;
                    self.resolve_member(object, &key)
                }
                _ => Ok(Resolved::Opaque),
            },
            _ => Ok(Resolved::Opaque),
        }
    }

    fn resolve_name(&self, scope: &Rc<LexicalScope<'a>>, name: &str) -> Result<Resolved<'a>> {
        let _guard = self.enter(&scope.file, name)?;

        let mut current = Some(scope.clone());
        while let Some(s) = current {
            if let Some(binding) = s.bindings.get(name).copied() {
                return self.resolve_binding(&s, binding);
            }
            current = s.parent.clone();
        }
        Ok(Resolved::Opaque)
    }

    fn resolve_binding(&self, scope: &Rc<LexicalScope<'a>>, binding: ScopeBinding<'a>) -> Result<Resolved<'a>> {
        match binding {
            ScopeBinding::Value(expr) => self.resolve_expr(scope, expr),
            ScopeBinding::Function(function) => Ok(Resolved::Function {
                scope: scope.clone(),
                callable: Callable::Function(function),
            }),
            ScopeBinding::Member { object, property } => {
                let object = self.resolve_expr(scope, object)?;
                self.resolve_member(object, property)
            }
            ScopeBinding::Import { specifier, name } => self.resolve_import(scope, specifier, name),
            ScopeBinding::Opaque => Ok(Resolved::Opaque),
        }
    }

    fn resolve_import(
        &self,
        scope: &LexicalScope<'a>,
        specifier: &str,
        name: ImportedName<'a>,
    ) -> Result<Resolved<'a>> {
        let Some(module) = self.import(scope, specifier)? else {
            return Ok(Resolved::Opaque);
        };
        match name {
            ImportedName::Namespace => Ok(Resolved::Namespace(module)),
            ImportedName::Named(export) => self.resolve_export(&module, export),
        }
    }

    /// Module that actually declares `name`, following `export *` chains.
    fn export_owner(&self, module: &Rc<SourceModule<'a>>, name: &str) -> Result<Option<Rc<SourceModule<'a>>>> {
        if module.exports.contains_key(name) {
            return Ok(Some(module.clone()));
        }
        if name == DEFAULT_EXPORT {
            return Ok(None);
        }
        let _guard = self.enter(&module.path, name)?;
        for specifier in &module.star_exports {
            if let Some(target) = self.import(&module.scope, specifier)? {
                if let Some(owner) = self.export_owner(&target, name)? {
                    return Ok(Some(owner));
                }
            }
        }
        Ok(None)
    }

    fn resolve_export(&self, module: &Rc<SourceModule<'a>>, name: &str) -> Result<Resolved<'a>> {
        let owner = self
            .export_owner(module, name)?
            .ok_or_else(|| GenerateError::UnresolvedExport {
                file: module.path.to_path_buf(),
                name: name.to_string(),
            })?;
        let _guard = self.enter(&owner.path, name)?;

        match owner.exports[name] {
            ExportBinding::Local(local) => self.resolve_name(&owner.scope, local),
            ExportBinding::Value(expr) => self.resolve_expr(&owner.scope, expr),
            ExportBinding::Function(function) => Ok(Resolved::Function {
                scope: owner.scope.clone(),
                callable: Callable::Function(function),
            }),
            ExportBinding::ReExport { specifier, name } => self.resolve_import(&owner.scope, specifier, name),
            ExportBinding::Opaque => Ok(Resolved::Opaque),
        }
    }

    /// Names visible on `import * as ns`, including those of `export *`.
    fn export_names(&self, module: &Rc<SourceModule<'a>>) -> Result<Vec<String>> {
        let mut names: Vec<String> = module.exports.keys().map(|k| k.to_string()).collect();
        names.sort();

        let _guard = self.enter(&module.path, "*")?;
        for specifier in &module.star_exports {
            if let Some(target) = self.import(&module.scope, specifier)? {
                for name in self.export_names(&target)? {
                    if name != DEFAULT_EXPORT && !names.contains(&name) {
                        names.push(name);
                    }
                }
            }
        }
        Ok(names)
    }

    fn resolve_member(&self, object: Resolved<'a>, property: &str) -> Result<Resolved<'a>> {
        match &object {
            Resolved::Namespace(module) => match self.export_owner(module, property)? {
                Some(_) => self.resolve_export(module, property),
                None => Ok(Resolved::Opaque),
            },
            Resolved::Object { scope, .. } => {
                let _guard = self.enter(&scope.file, property)?;
                let properties = self.properties(&object, "")?.unwrap_or_default();
                match properties.into_iter().find(|p| p.key == property) {
                    Some(found) => Ok(self.resolve_member_value(&found.member)?.0),
                    None => Ok(Resolved::Opaque),
                }
            }
            _ => Ok(Resolved::Opaque),
        }
    }

    fn resolve_member_value(&self, member: &Member<'a>) -> Result<(Resolved<'a>, Site<'a>)> {
        match member {
            Member::Value { scope, expr } => {
                let site = Site::in_scope(scope, expr.span());
                Ok((self.resolve_expr(scope, expr)?, site))
            }
            Member::Export { module, name } => {
                let site = Site::in_scope(&module.scope, Span::new(0, 0));
                Ok((self.resolve_export(module, name)?, site))
            }
        }
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Objects
    // ───────────────────────────────────────────────────────────────────────────

    /// Properties of an object-like value, `None` when it is not object-like.
    fn properties(&self, value: &Resolved<'a>, node: &str) -> Result<Option<Vec<Property<'a>>>> {
        match value {
            Resolved::Object { scope, object } => self.object_properties(scope, object, node).map(Some),
            Resolved::Namespace(module) => {
                let properties = self
                    .export_names(module)?
                    .into_iter()
                    .map(|name| Property {
                        key: name.clone(),
                        member: Member::Export {
                            module: module.clone(),
                            name,
                        },
                    })
                    .collect();
                Ok(Some(properties))
            }
            _ => Ok(None),
        }
    }

    fn object_properties(
        &self,
        scope: &Rc<LexicalScope<'a>>,
        object: &'a ObjectExpression<'a>,
        node: &str,
    ) -> Result<Vec<Property<'a>>> {
        let mut properties = Vec::new();

        for kind in &object.properties {
            match kind {
                ObjectPropertyKind::ObjectProperty(prop) => {
                    let key = self.property_key(scope, prop, node)?;
                    upsert(
                        &mut properties,
                        Property {
                            key,
                            member: Member::Value {
                                scope: scope.clone(),
                                expr: &prop.value,
                            },
                        },
                    );
                }
                ObjectPropertyKind::SpreadProperty(spread) => {
                    let _guard = self.enter(&scope.file, SPREAD)?;
                    let value = self.resolve_expr(scope, &spread.argument)?;
                    let Some(spread_properties) = self.properties(&value, node)? else {
                        return Err(Site::in_scope(scope, spread.span)
                            .malformed(node, "spreads a value that cannot be read statically"));
                    };
                    for property in spread_properties {
                        upsert(&mut properties, property);
                    }
                }
            }
        }

        Ok(properties)
    }

    fn property_key(&self, scope: &Rc<LexicalScope<'a>>, prop: &'a ObjectProperty<'a>, node: &str) -> Result<String> {
        if !prop.computed {
            match &prop.key {
                PropertyKey::StaticIdentifier(id) => return Ok(id.name.to_string()),
                PropertyKey::NumericLiteral(lit) => return Ok(number_key(lit.value)),
                _ => {}
            }
        }

        if let Some(expr) = prop.key.as_expression() {
            match self.resolve_expr(scope, expr)? {
                Resolved::String(key) => return Ok(key),
                Resolved::Number(value) => return Ok(number_key(value)),
                _ => {}
            }
        }

        Err(Site::in_scope(scope, prop.key.span())
            .malformed(node, "has a property key that does not resolve to a string"))
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Factories
    // ───────────────────────────────────────────────────────────────────────────

    fn function_scope<I>(
        &self,
        parent: &Rc<LexicalScope<'a>>,
        params: &'a FormalParameters<'a>,
        statements: I,
    ) -> Rc<LexicalScope<'a>>
    where
        I: IntoIterator<Item = &'a Statement<'a>>,
    {
        let mut bindings = HashMap::new();
        for param in &params.items {
            bind_opaque(&param.pattern, &mut bindings);
        }
        for stmt in statements {
            declare_statement(stmt, &mut bindings);
        }
        Rc::new(LexicalScope {
            file: parent.file.clone(),
            source: parent.source,
            bindings,
            parent: Some(parent.clone()),
        })
    }

    /// The value a factory returns, read from its last body-level `return`.
    fn invoke(&self, scope: &Rc<LexicalScope<'a>>, callable: Callable<'a>, site: &Site<'a>) -> Result<Resolved<'a>> {
        let (params, body) = match callable {
            Callable::Function(function) => match &function.body {
                Some(body) => (&*function.params, &**body),
                None => return Err(site.malformed("", "is a function without a body")),
            },
            Callable::Arrow(arrow) => (&*arrow.params, &*arrow.body),
        };
        let local = self.function_scope(scope, params, body.statements.iter());

        if let Callable::Arrow(arrow) = callable {
            if arrow.expression {
                if let Some(Statement::ExpressionStatement(stmt)) = body.statements.first() {
                    return self.resolve_expr(&local, &stmt.expression);
                }
            }
        }

        let returned = body.statements.iter().rev().find_map(|stmt| match stmt {
            Statement::ReturnStatement(ret) => ret.argument.as_ref(),
            _ => None,
        });
        match returned {
            Some(expr) => self.resolve_expr(&local, expr),
            None => Err(site.malformed("", "is a factory that never returns the store definition")),
        }
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Store tree
    // ───────────────────────────────────────────────────────────────────────────

    fn definition_root(&self, module: &Rc<SourceModule<'a>>) -> Result<StoreNode> {
        if !module.exports.contains_key(DEFAULT_EXPORT) {
            return Err(GenerateError::MissingDefaultExport {
                file: module.path.to_path_buf(),
            });
        }

        let site = Site::in_scope(&module.scope, module.default_span);
        let value = match self.resolve_export(module, DEFAULT_EXPORT)? {
            Resolved::Function { scope, callable } => {
                tracing::debug!("default export is a factory; reading its return value");
                self.invoke(&scope, callable, &site)?
            }
            value => value,
        };

        self.store_node(&value, &site, "")
    }

    fn store_node(&self, value: &Resolved<'a>, site: &Site<'a>, node: &str) -> Result<StoreNode> {
        // A module that contains itself fails on the depth limit here
        let _guard = self.enter(&site.file, if node.is_empty() { DEFAULT_EXPORT } else { node })?;
        let Some(properties) = self.properties(value, node)? else {
            return Err(site.malformed(node, "is not a statically readable object"));
        };

        let mut store = StoreNode::new();
        for property in &properties {
            let key = property.key.as_str();
            let path = child_path(node, key);

            if let Some(kind) = GroupKind::from_key(key) {
                let (value, site) = self.resolve_member_value(&property.member)?;
                let Some(entries) = self.properties(&value, &path)? else {
                    return Err(site.malformed(&path, "is not a statically readable object"));
                };
                let group = store.group_mut(kind);
                for entry in entries {
                    group.insert(entry.key, Leaf);
                }
            } else if key == "modules" {
                let (value, site) = self.resolve_member_value(&property.member)?;
                let Some(children) = self.properties(&value, &path)? else {
                    return Err(site.malformed(&path, "is not a statically readable object"));
                };
                for child in children {
                    let child_node = child_path(&path, &child.key);
                    let (value, site) = self.resolve_member_value(&child.member)?;
                    let module = self.store_node(&value, &site, &child_node)?;
                    store.modules.insert(child.key, module);
                }
            } else if key == "namespaced" {
                let (value, site) = self.resolve_member_value(&property.member)?;
                store.namespaced = match value.truthiness() {
                    Some(flag) => flag,
                    None => return Err(site.malformed(&path, "must be a value known without running the store")),
                };
            }
        }

        Ok(store)
    }
}

fn number_key(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
