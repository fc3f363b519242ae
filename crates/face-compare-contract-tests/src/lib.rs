#![warn(missing_docs)]
//! # face-compare-contract-tests
//!
//! Loaders for the frozen JSON schemas and fixtures under `contracts/`.

use std::path::PathBuf;

use jsonschema::JSONSchema;
use serde_json::Value;

/// Absolute path of the workspace `contracts/` directory.
pub fn contracts_dir() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../../contracts"))
}

/// Reads a contract file relative to `contracts/` as raw text.
///
/// # Panics
/// Panics when the file is missing; callers are tests.
pub fn read_contract(relative: &str) -> String {
    let path = contracts_dir().join(relative);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|error| panic!("{} should be readable: {error}", path.display()))
}

/// Reads and parses a contract JSON file.
///
/// # Panics
/// Panics when the file is missing or not JSON.
pub fn load_json(relative: &str) -> Value {
    serde_json::from_str(&read_contract(relative)).expect("contract file should be valid json")
}

/// Compiles a schema file into a validator.
///
/// # Panics
/// Panics when the schema does not compile.
pub fn compile_validator(schema: &str) -> JSONSchema {
    JSONSchema::compile(&load_json(schema)).expect("schema should compile")
}
