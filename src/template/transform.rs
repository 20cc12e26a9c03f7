// src/template/transform.rs

use serde_json::{Map, Value};

use crate::errors::Result;
use crate::template::Substituter;

const OPEN: &str = "%{";

/// Expand `%{name}` placeholders in `input`.
///
/// Scans left to right in a single pass. See the module docs for the exact
/// rules; the only failure is a placeholder naming a key the substituter
/// does not know.
pub fn transform_string(input: &str, substituter: &dyn Substituter) -> Result<String> {
    if !input.contains('%') {
        return Ok(input.to_string());
    }

    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    // Start of the literal run not yet copied to `out`.
    let mut literal_start = 0;
    let mut i = 0;

    // All markers are ASCII, so byte offsets are always char boundaries.
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if input[i + 1..].starts_with(OPEN) => {
                out.push_str(&input[literal_start..i]);
                out.push_str(OPEN);
                i += 1 + OPEN.len();
                literal_start = i;
            }
            b'%' if input[i + 1..].starts_with('{') => {
                let key_start = i + OPEN.len();
                match input[key_start..].find('}') {
                    Some(len) => {
                        out.push_str(&input[literal_start..i]);
                        let key = &input[key_start..key_start + len];
                        out.push_str(&substituter.substitute(key)?);
                        i = key_start + len + 1;
                        literal_start = i;
                    }
                    // Unterminated: everything from here on is literal.
                    None => break,
                }
            }
            _ => i += 1,
        }
    }

    out.push_str(&input[literal_start..]);
    Ok(out)
}

/// Expand placeholders in every string leaf of a JSON tree.
///
/// Objects keep their key order, arrays their length and order; numbers,
/// booleans and nulls are copied unchanged. The input is never mutated.
pub fn transform(node: &Value, substituter: &dyn Substituter) -> Result<Value> {
    Ok(match node {
        Value::String(s) => Value::String(transform_string(s, substituter)?),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| transform(item, substituter))
                .collect::<Result<Vec<_>>>()?,
        ),
        Value::Object(fields) => {
            let mut out = Map::with_capacity(fields.len());
            for (key, value) in fields {
                out.insert(key.clone(), transform(value, substituter)?);
            }
            Value::Object(out)
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => node.clone(),
    })
}
