// src/template/mod.rs

//! `%{name}` macro substitution over strings and JSON trees.
//!
//! - [`substituter`] defines where replacement text comes from.
//! - [`transform`] holds the single-pass string scanner and the recursive
//!   tree walk built on top of it.
//!
//! The language is deliberately tiny:
//! - `%{name}` is replaced by the substituter's value for `name`
//! - `\%{` emits a literal `%{` (the backslash is consumed)
//! - `%` not followed by `{` is literal
//! - an unterminated `%{...` is emitted unchanged

pub mod substituter;
pub mod transform;

pub use substituter::{MapSubstituter, Substituter};
pub use transform::{transform, transform_string};
