//! Command-tree data model and a single-command builder.

pub mod tokenize;
pub mod types;

pub use tokenize::{leaf, simple_command, tokenize, word};
pub use types::{Command, IoFlags, Operator, Part, SimpleCommand, Word};
