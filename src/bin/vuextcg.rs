//! vuextcg - type constants for Vuex stores
//!
//! Usage: vuextcg <STORE_DEFINITION> [OUTPUT]

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use vuextcg::{
    catalogue_from_path, generate_from_path, GenerateError, GenerateOptions, DEFAULT_HEADER,
};

const LOG_ENV: &str = "VUEXTCG_LOG";

const LONG_ABOUT: &str = "\
Reads a Vuex store definition and writes an ES2015 module exporting three
objects:

  * getters: upper case constants with the getter types
  * mutations: upper case constants with the mutation types
  * actions: upper case constants with the action types

The definition is a JSON file, or a JavaScript/TypeScript module whose default
export is the store definition object or a function returning it. Modules are
read statically and never executed; relative imports are followed.

A relative STORE_DEFINITION path is resolved from the current working
directory. Without OUTPUT the module is written to standard output.

Each constant is the upper snake case of the type, prefixed by the names of
its namespaced ancestor modules. Modules without `namespaced: true` add
nothing to the prefix.

Example

// store-definition.js
export default {
  mutations: {
    increment (state) { state.count++ }
  },
  modules: {
    account: {
      namespaced: true,
      mutations: {
        increment (state) { state.count += 2 }
      },
      modules: {
        settings: {
          namespaced: true,
          getters: { isAdmin () { } }
        }
      }
    },
    user: {
      actions: { getProfile () { } }
    }
  }
}

// output
// DO NOT MODIFY THIS FILE: AUTOGENERATED BY vuextcg
export const getters = {
  // Namespaced
  ACCOUNT_SETTINGS_IS_ADMIN: 'account/settings/isAdmin'
}

export const mutations = {
  // Globals
  INCREMENT: 'increment',

  // Namespaced
  ACCOUNT_INCREMENT: 'account/increment'
}

export const actions = {
  // Globals
  GET_PROFILE: 'getProfile'
}

Set VUEXTCG_LOG (for example VUEXTCG_LOG=debug) to control diagnostics.";

#[derive(Parser)]
#[command(name = "vuextcg", version)]
#[command(about = "Generate getter, mutation and action type constants from a Vuex store")]
#[command(long_about = LONG_ABOUT)]
struct Cli {
    /// Store definition (.js, .mjs, .ts, ... or .json)
    store_definition: PathBuf,

    /// File to write; standard output when omitted
    output: Option<PathBuf>,

    /// First line of the generated module
    #[arg(long, default_value = DEFAULT_HEADER)]
    header: String,

    /// Do not warn when two types map to the same constant
    #[arg(long)]
    no_collision_warnings: bool,

    /// Print the sorted catalogue as JSON instead of the module
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            if let Some(cause) = err.downcast_ref::<GenerateError>() {
                eprintln!("  [{}] {}", cause.code(), cause.hint());
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let definition = cli.store_definition.display();

    let text = if cli.json {
        let catalogue = catalogue_from_path(&cli.store_definition)
            .with_context(|| format!("failed to read store definition {definition}"))?;
        let mut json = serde_json::to_string_pretty(&catalogue)?;
        json.push('\n');
        json
    } else {
        let options = GenerateOptions {
            header: cli.header.clone(),
            warn_on_collisions: !cli.no_collision_warnings,
        };
        generate_from_path(&cli.store_definition, &options)
            .with_context(|| format!("failed to generate types for {definition}"))?
    };

    match &cli.output {
        Some(path) => {
            fs::write(path, &text).with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(output = %path.display(), "wrote store types");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(text.as_bytes())
                .context("failed to write to standard output")?;
            stdout.flush()?;
        }
    }

    Ok(())
}
