//! Semantic PATH entries and values.
//!
//! This module models a PATH environment value as a sequence of
//! [`PathEntry`] items rather than a raw string. Each entry keeps two
//! forms: the raw form as persisted (which may contain unexpanded
//! tokens such as `%APPDATA%`) and the expanded canonical form used
//! for membership tests.
//!
//! # Modules
//!
//! - [`entry`] - Single PATH entry with raw and expanded forms
//! - [`value`] - Ordered entry sequence plus stored value type
//! - [`resolver`] - Membership, idempotent insert, and removal

pub mod entry;
pub mod resolver;
pub mod value;

pub use entry::{expand_tokens, EnvLookup, PathEntry};
pub use resolver::{contains, insert, remove, to_portable_raw};
pub use value::{PathValue, ValueKind};
