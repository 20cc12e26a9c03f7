// src/config/loader.rs

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::config::model::{ClusterFile, RawClusterFile};
use crate::errors::{CastleError, Result};
use crate::template::{transform, MapSubstituter};

/// Load a cluster file from `path` and return the raw `RawClusterFile`.
///
/// `overrides` are merged over the file's `[env]` table and win on conflict.
/// No semantic validation happens here; use [`load_and_validate`] for that.
pub fn load_from_path(
    path: impl AsRef<Path>,
    overrides: &BTreeMap<String, String>,
) -> Result<RawClusterFile> {
    let contents = fs::read_to_string(path.as_ref())?;
    parse_str(&contents, overrides)
}

/// Parse cluster file text.
///
/// The `[env]` table (plus `overrides`) becomes the substitution source for
/// every other string in the document, so `%{user}` in an uplink picks up
/// `env.user`. `[env]` itself is not expanded.
pub fn parse_str(contents: &str, overrides: &BTreeMap<String, String>) -> Result<RawClusterFile> {
    let mut doc: Value = toml::from_str(contents)?;

    let mut variables = take_env_table(&mut doc)?;
    variables.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));

    let substituter = MapSubstituter::new(variables.clone());
    let expanded = transform(&doc, &substituter)?;

    let mut raw: RawClusterFile = serde_json::from_value(expanded)?;
    raw.env = variables;
    Ok(raw)
}

/// Load a cluster file from path and run validation.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML and expands `%{var}` references.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks node names, policy bounds and uplink settings.
pub fn load_and_validate(
    path: impl AsRef<Path>,
    overrides: &BTreeMap<String, String>,
) -> Result<ClusterFile> {
    let raw = load_from_path(&path, overrides)?;
    ClusterFile::try_from(raw)
}

/// Remove `[env]` from the document and flatten it to strings.
fn take_env_table(doc: &mut Value) -> Result<BTreeMap<String, String>> {
    let env = match doc.as_object_mut().and_then(|root| root.remove("env")) {
        Some(env) => env,
        None => return Ok(BTreeMap::new()),
    };

    let Value::Object(entries) = env else {
        return Err(CastleError::ConfigError("[env] must be a table".to_string()));
    };

    entries
        .into_iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => {
                    return Err(CastleError::ConfigError(format!(
                        "[env].{key} must be a string, number or boolean"
                    )));
                }
            };
            Ok((key, text))
        })
        .collect()
}
