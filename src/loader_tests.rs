//! Loader Tests
//!
//! Static reading of store definitions: the bundled fixtures, factories,
//! imports across files, and the failures that must not turn into guesses.

#[cfg(test)]
mod tests {
    use crate::error::{
        GenerateError, ERR_IMPORT_NOT_FOUND, ERR_MALFORMED_NODE, ERR_MISSING_DEFAULT_EXPORT,
        ERR_PARSE, ERR_RESOLUTION_DEPTH, ERR_UNRESOLVED_EXPORT,
    };
    use crate::extract::extract;
    use crate::format::render;
    use crate::loader::{load_definition, load_definition_source, LoadedDefinition};
    use crate::options::GenerateOptions;
    use crate::{generate, generate_from_path};
    use std::fs;
    use std::path::{Path, PathBuf};

    const EXPECTED_FIXTURE: &str = include_str!("../fixtures/store.expected.js");
    const EXPECTED_SPLIT: &str = include_str!("../fixtures/split.expected.js");

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(name)
    }

    fn load_inline(source: &str) -> LoadedDefinition {
        load_definition_source(source, Path::new("/virtual/store.js")).unwrap()
    }

    fn load_inline_err(source: &str) -> GenerateError {
        load_definition_source(source, Path::new("/virtual/store.js")).unwrap_err()
    }

    fn rendered(definition: &LoadedDefinition) -> String {
        render(&extract(&definition.root), &GenerateOptions::default())
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // Fixtures
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_plain_object_fixture() {
        let output = generate_from_path(&fixture("store.js"), &GenerateOptions::default()).unwrap();
        assert_eq!(output, EXPECTED_FIXTURE);
    }

    #[test]
    fn test_factory_fixture_with_browser_globals() {
        let definition = load_definition(&fixture("store-factory.js")).unwrap();
        assert_eq!(rendered(&definition), EXPECTED_FIXTURE);
        assert_eq!(
            definition.host_globals.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["document", "window"]
        );
    }

    #[test]
    fn test_json_fixture() {
        let definition = load_definition(&fixture("store.json")).unwrap();
        assert_eq!(rendered(&definition), EXPECTED_FIXTURE);
        assert!(definition.host_globals.is_empty());
    }

    #[test]
    fn test_split_store_follows_imports() {
        let definition = load_definition(&fixture("split/index.js")).unwrap();
        assert_eq!(rendered(&definition), EXPECTED_SPLIT);

        assert_eq!(definition.files.len(), 6);
        assert!(definition.files.iter().any(|f| f.ends_with("posts/getters.ts")));
        assert!(definition.host_globals.contains("fetch"));
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // Definition shapes
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_default_export_identifier() {
        let definition = load_inline(
            r#"
            const account = { namespaced: true, actions: { login() {} } }
            const store = { modules: { account } }
            export default store
            "#,
        );
        assert!(definition.root.modules["account"].namespaced);
        assert!(definition.root.modules["account"].actions.contains_key("login"));
    }

    #[test]
    fn test_export_specifier_as_default() {
        let definition = load_inline(
            r#"
            const store = { getters: { total: () => 0 } }
            export { store as default }
            "#,
        );
        assert!(definition.root.getters.contains_key("total"));
    }

    #[test]
    fn test_arrow_factory_with_locals() {
        let definition = load_inline(
            r#"
            export default (api) => {
              const token = api.token()
              const getters = { isLoggedIn: () => !!token }
              function mutations() {}
              return { getters, mutations: { setToken() {} } }
            }
            "#,
        );
        assert!(definition.root.getters.contains_key("isLoggedIn"));
        assert!(definition.root.mutations.contains_key("setToken"));
    }

    #[test]
    fn test_named_factory_declaration() {
        let definition = load_inline(
            r#"
            export default function createStore() {
              if (typeof window === 'undefined') {
                return {}
              }
              return { actions: { boot() {} } }
            }
            "#,
        );
        assert!(definition.root.actions.contains_key("boot"));
    }

    #[test]
    fn test_computed_keys_and_spreads() {
        let definition = load_inline(
            r#"
            const SET_NAME = 'setName'
            const types = { RESET: 'reset' }
            const shared = { clear() {} }
            export default {
              mutations: {
                ...shared,
                [SET_NAME](state, name) {},
                [types.RESET](state) {},
                ['flush-all'](state) {},
                [`noop`](state) {},
              }
            }
            "#,
        );
        let names: Vec<&str> = definition.root.mutations.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["clear", "flush-all", "noop", "reset", "setName"]);

        let output = rendered(&definition);
        assert!(output.contains("  FLUSH_ALL: 'flush-all',"));
    }

    #[test]
    fn test_destructured_binding() {
        let definition = load_inline(
            r#"
            const shared = { getters: { count: (s) => s.count }, other: 1 }
            const { getters } = shared
            export default { getters }
            "#,
        );
        assert!(definition.root.getters.contains_key("count"));
    }

    #[test]
    fn test_duplicate_keys_last_one_wins() {
        let definition = load_inline(
            r#"
            export default {
              modules: {
                cart: { namespaced: true, getters: { a() {} } },
                cart: { getters: { b() {} } },
              }
            }
            "#,
        );
        let cart = &definition.root.modules["cart"];
        assert!(!cart.namespaced);
        assert!(cart.getters.contains_key("b"));
        assert!(!cart.getters.contains_key("a"));
    }

    #[test]
    fn test_typescript_wrappers() {
        let source = r#"
            interface State { n: number }
            export default {
              namespaced: true as boolean,
              getters: { double: (s: State) => s.n * 2 },
            } satisfies Record<string, unknown>
        "#;
        let output = generate(source, Path::new("/virtual/store.ts"), &GenerateOptions::default()).unwrap();
        assert!(output.contains("DOUBLE: 'double'"));
    }

    #[test]
    fn test_package_imports_are_opaque_in_leaves() {
        let definition = load_inline(
            r#"
            import { helper } from 'some-package'
            export default { actions: { run: helper } }
            "#,
        );
        assert!(definition.root.actions.contains_key("run"));
        assert_eq!(definition.files.len(), 1);
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // Failures
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_missing_default_export() {
        let err = load_inline_err("export const getters = {}");
        assert_eq!(err.code(), ERR_MISSING_DEFAULT_EXPORT);
    }

    #[test]
    fn test_syntax_error() {
        let err = load_inline_err("export default {\n  getters: {\n    broken( {}\n  }\n");
        assert_eq!(err.code(), ERR_PARSE);
    }

    #[test]
    fn test_opaque_module_is_rejected() {
        let err = load_inline_err(
            r#"
            import { createModule } from 'factory'
            export default { modules: { account: createModule() } }
            "#,
        );
        assert_eq!(err.code(), ERR_MALFORMED_NODE);
        match err {
            GenerateError::MalformedNode { node, line, .. } => {
                assert_eq!(node, "modules.account");
                assert_eq!(line, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_dynamic_namespaced_flag_is_rejected() {
        let err = load_inline_err("export default { namespaced: process.env.NS, getters: {} }");
        assert_eq!(err.code(), ERR_MALFORMED_NODE);
    }

    #[test]
    fn test_opaque_spread_is_rejected() {
        let err = load_inline_err(
            r#"
            import { mapGetters } from 'vuex'
            export default { getters: { ...mapGetters(['a']) } }
            "#,
        );
        assert_eq!(err.code(), ERR_MALFORMED_NODE);
    }

    #[test]
    fn test_unresolvable_computed_key_is_rejected() {
        let err = load_inline_err("export default { mutations: { [Date.now()]() {} } }");
        assert_eq!(err.code(), ERR_MALFORMED_NODE);
    }

    #[test]
    fn test_missing_relative_import() {
        let err = load_inline_err(
            r#"
            import account from './does-not-exist'
            export default { modules: { account } }
            "#,
        );
        assert_eq!(err.code(), ERR_IMPORT_NOT_FOUND);
    }

    #[test]
    fn test_cyclic_bindings() {
        let err = load_inline_err(
            r#"
            const a = b
            const b = a
            export default a
            "#,
        );
        assert_eq!(err.code(), ERR_RESOLUTION_DEPTH);
    }

    #[test]
    fn test_module_containing_itself() {
        let err = load_inline_err(
            r#"
            const root = { getters: { a() {} }, modules: { child: root } }
            export default root
            "#,
        );
        assert_eq!(err.code(), ERR_RESOLUTION_DEPTH);
    }

    #[test]
    fn test_object_spreading_itself() {
        let err = load_inline_err(
            r#"
            const t = { ...t }
            export default { modules: { x: t } }
            "#,
        );
        assert_eq!(err.code(), ERR_RESOLUTION_DEPTH);
    }

    #[test]
    fn test_group_reading_itself() {
        let err = load_inline_err(
            r#"
            const store = { getters: store.getters }
            export default store
            "#,
        );
        assert_eq!(err.code(), ERR_RESOLUTION_DEPTH);
    }

    #[test]
    fn test_modules_importing_each_other() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a.js"),
            "import b from './b'\nexport default { modules: { b } }\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("b.js"),
            "import a from './a'\nexport default { namespaced: true, modules: { a } }\n",
        )
        .unwrap();

        let err = load_definition(&dir.path().join("a.js")).unwrap_err();
        assert_eq!(err.code(), ERR_RESOLUTION_DEPTH);
    }

    #[test]
    fn test_namespaced_follows_truthiness() {
        let definition = load_inline(
            r#"
            const flag = 'yes'
            export default {
              modules: {
                one: { namespaced: 1 },
                notZero: { namespaced: !0 },
                named: { namespaced: flag },
                zero: { namespaced: 0 },
                notOne: { namespaced: !1 },
                empty: { namespaced: '' },
              },
              mutations: { [2]() {} },
            }
            "#,
        );
        let modules = &definition.root.modules;
        assert!(modules["one"].namespaced);
        assert!(modules["notZero"].namespaced);
        assert!(modules["named"].namespaced);
        assert!(!modules["zero"].namespaced);
        assert!(!modules["notOne"].namespaced);
        assert!(!modules["empty"].namespaced);
        assert!(definition.root.mutations.contains_key("2"));
    }

    #[test]
    fn test_missing_named_export() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("parts.js"), "export const getters = {}\n").unwrap();
        let entry = dir.path().join("store.js");
        fs::write(
            &entry,
            "import { actions } from './parts'\nexport default { actions }\n",
        )
        .unwrap();

        let err = load_definition(&entry).unwrap_err();
        assert_eq!(err.code(), ERR_UNRESOLVED_EXPORT);
    }

    #[test]
    fn test_star_reexports() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("leaf.js"), "export const total = () => 0\n").unwrap();
        fs::write(dir.path().join("barrel.js"), "export * from './leaf'\n").unwrap();
        let entry = dir.path().join("store.mjs");
        fs::write(
            &entry,
            "import * as getters from './barrel'\nexport default { getters }\n",
        )
        .unwrap();

        let definition = load_definition(&entry).unwrap();
        assert!(definition.root.getters.contains_key("total"));
        assert_eq!(definition.files.len(), 3);
    }
}
