//! treesh: the execution core of a small Unix shell.
//!
//! A parser (not part of this crate) turns one input line into a
//! [`parse::Command`] tree. This crate evaluates that tree: built-ins run in
//! the shell's own process, other programs are forked and exec'd, `&` and `|`
//! run each side in its own process, and every node yields an
//! [`eval::Status`]. `exit`/`quit` yield [`eval::Status::Terminate`], which
//! every enclosing operator passes straight up.
//!
//! # Architecture
//!
//! - **[`parse`]**: command-tree types and a one-line simple-command builder.
//! - **[`expand`]**: word resolution against the environment ([`env`]).
//! - **[`redirect`]**: standard-stream redirection, permanent or scoped.
//! - **[`commands`]**: built-ins and the external command runner.
//! - **[`eval`]**: the tree evaluator and the `&` / `|` orchestrators.
//! - **[`config`]**: embedded defaults plus a user overlay.
//! - **[`logging`]**: optional file logging for the binary.

/// Built-in commands and the external command runner.
pub mod commands;
/// Configuration types, loading, and overlay merge logic.
pub mod config;
/// Process environment table and the unset-variable policy.
pub mod env;
/// Error type shared by every stage of evaluation.
pub mod error;
/// Tree evaluator, status model and process orchestration.
pub mod eval;
/// Word resolution.
pub mod expand;
/// File logging setup.
pub mod logging;
/// Command-tree types and the simple-command builder.
pub mod parse;
/// Redirection planning and application.
pub mod redirect;

use error::ShellError;
use eval::{Shell, Status};
use parse::Command;

/// Evaluate one tree with the default configuration.
///
/// This is the main entry point for tests and simple usage. The binary builds
/// its [`Shell`] from the merged user configuration instead.
pub fn evaluate(tree: &Command) -> Result<Status, ShellError> {
    let config = config::Config::default_config();
    Shell::from_config(&config).run(tree)
}
