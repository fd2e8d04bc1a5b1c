//! Errors raised while evaluating a command tree.

use std::io::{self, Write};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShellError {
    /// A built-in was called with the wrong arguments.
    #[error("{command}: {reason}")]
    Usage {
        command: &'static str,
        reason: &'static str,
    },

    /// A redirection target could not be opened or attached.
    #[error("{path}: {source}")]
    Redirect {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("cd: {path}: no such file or directory")]
    ChangeDir {
        path: String,
        #[source]
        source: nix::Error,
    },

    #[error("pwd: {0}")]
    WorkingDir(#[source] nix::Error),

    #[error("Execution failed for '{verb}'")]
    Exec {
        verb: String,
        #[source]
        source: nix::Error,
    },

    /// A word resolved to text the OS cannot carry (NUL byte, bad variable name).
    #[error("invalid argument {0:?}")]
    InvalidArgument(String),

    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("command tree nested deeper than {max} levels")]
    DepthExceeded { max: usize },

    #[error("fork: {0}")]
    Fork(#[source] nix::Error),

    #[error("pipe: {0}")]
    Pipe(#[source] nix::Error),

    #[error("waitpid: {0}")]
    Wait(#[source] nix::Error),

    #[error("config: {0}")]
    Config(String),
}

impl ShellError {
    /// Resource exhaustion ends the whole shell; everything else is local
    /// to the command that raised it.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ShellError::Fork(_) | ShellError::Pipe(_) | ShellError::Wait(_)
        )
    }
}

/// Write an error to the current standard error and the log.
///
/// Goes through `io::stderr()` rather than `eprintln!` so a redirected
/// descriptor 2 receives it.
pub fn report(err: &ShellError) {
    if err.is_fatal() {
        log::error!("{err}");
    } else {
        log::warn!("{err}");
    }
    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "{err}");
    let _ = stderr.flush();
}
