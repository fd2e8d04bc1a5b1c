//! The process environment table.
//!
//! Every evaluation in one process shares this table. Forked children
//! inherit a copy, so nothing they set reaches the parent shell.

use serde::{Deserialize, Serialize};

use crate::error::ShellError;

/// What reading an unset variable does to the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsetVars {
    /// Define the variable as the empty string.
    #[default]
    Define,
    /// Leave the table untouched.
    Leave,
}

pub fn get(name: &str) -> Option<String> {
    std::env::var_os(name).map(|v| v.to_string_lossy().into_owned())
}

pub fn set(name: &str, value: &str) -> Result<(), ShellError> {
    if name.is_empty() || name.contains(['=', '\0']) {
        return Err(ShellError::InvalidArgument(name.to_string()));
    }
    if value.contains('\0') {
        return Err(ShellError::InvalidArgument(value.to_string()));
    }
    // SAFETY: the treesh binary evaluates on one thread and concurrency only
    // happens in forked processes with their own copy of the table. Unit
    // tests call this from harness threads that reach the environment only
    // through `std::env`, which serialises access behind its own lock.
    unsafe { std::env::set_var(name, value) };
    Ok(())
}

/// Read a variable for expansion. Unset variables read as empty and, under
/// [`UnsetVars::Define`], are recorded as set-to-empty.
pub fn lookup(name: &str, unset: UnsetVars) -> String {
    if let Some(value) = get(name) {
        return value;
    }
    if unset == UnsetVars::Define && set(name, "").is_err() {
        log::debug!("not defining unusable variable name {name:?}");
    }
    String::new()
}
