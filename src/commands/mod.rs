//! Built-in commands and the external command runner.
//!
//! Built-ins that are selected by name live in [`BUILTINS`] and implement
//! [`Builtin`]. Variable display and assignment are selected by the shape of
//! the verb instead (see [`vars`]). Anything else is run as a program by
//! [`external`].

/// `cd`: change the shell's working directory.
pub mod cd;
/// `exit` / `quit`: ask the shell to stop.
pub mod exit;
/// Fork, redirect and exec a program found on `PATH`.
pub mod external;
/// `pwd`: print the working directory.
pub mod pwd;
/// `true` / `false`: fixed statuses with no side effects.
pub mod simple;
/// Bare `$NAME` display and `NAME=value` assignment.
pub mod vars;

use crate::error::ShellError;
use crate::eval::{Shell, Status};
use crate::parse::SimpleCommand;

/// A command that runs inside the shell's own process.
pub trait Builtin: Send + Sync {
    /// Verbs this built-in answers to. The first is its canonical name.
    fn names(&self) -> &[&'static str];

    /// Run the built-in. Leaf-local failures may come back as `Err`; the
    /// evaluator reports them and turns them into a failure status.
    fn run(&self, shell: &Shell, cmd: &SimpleCommand) -> Result<Status, ShellError>;
}

/// Name-matched built-ins, in dispatch priority order.
pub static BUILTINS: &[&dyn Builtin] = &[
    &simple::FALSE,
    &simple::TRUE,
    &cd::Cd,
    &exit::Exit,
    &pwd::Pwd,
];

/// The built-in answering to `verb`, if any.
pub fn lookup(verb: &str) -> Option<&'static dyn Builtin> {
    BUILTINS
        .iter()
        .copied()
        .find(|builtin| builtin.names().contains(&verb))
}
