//! Run a program that is not a built-in.
//!
//! The child resolves its own arguments and redirection targets, so any
//! variable the resolution defines stays in the child.

use std::ffi::CString;

use nix::sys::signal::{self, SigHandler, Signal};
use nix::unistd::{ForkResult, execvp};

use crate::env::UnsetVars;
use crate::error::{self, ShellError};
use crate::eval::{Shell, Status};
use crate::eval::process::{self, exit_child, wait_for};
use crate::expand;
use crate::logging;
use crate::parse::{SimpleCommand, Word};
use crate::redirect;

/// Argument vector: the resolved verb, then each parameter resolved on its own.
pub fn argv(verb: &Word, params: &[Word], unset: UnsetVars) -> Vec<String> {
    std::iter::once(verb)
        .chain(params)
        .map(|word| expand::resolve(word, unset))
        .collect()
}

/// Fork, redirect, exec `cmd`, and wait for it.
pub fn run(shell: &Shell, cmd: &SimpleCommand) -> Result<Status, ShellError> {
    let Some(verb) = cmd.verb.as_ref() else {
        return Ok(Status::SUCCESS);
    };

    match process::fork()? {
        ForkResult::Child => exit_child(exec(shell, verb, cmd)),
        ForkResult::Parent { child } => wait_for(child, Status::from_program),
    }
}

/// Child side of [`run`]. Only returns on failure, with the exit code to use.
fn exec(shell: &Shell, verb: &Word, cmd: &SimpleCommand) -> i32 {
    let settings = shell.settings();
    let unset = shell.unset_vars();
    let args = argv(verb, &cmd.params, unset);
    log::debug!("exec {}", logging::quote_argv(&args));

    if let Err(e) = redirect::apply(&redirect::plan(cmd, unset)) {
        error::report(&e);
        return i32::from(settings.redirect_failure_status);
    }

    let c_args = match to_c_strings(&args) {
        Ok(c_args) => c_args,
        Err(e) => {
            error::report(&e);
            return i32::from(settings.exec_failure_status);
        }
    };

    // The shell ignores SIGPIPE; a program writing into a closed pipe must
    // die of it quietly instead.
    // SAFETY: installs the default disposition, no handler code runs.
    if let Err(e) = unsafe { signal::signal(Signal::SIGPIPE, SigHandler::SigDfl) } {
        log::warn!("restoring SIGPIPE: {e}");
    }

    // Only returns on failure.
    let Err(source) = execvp(&c_args[0], &c_args);
    error::report(&ShellError::Exec {
        verb: args[0].clone(),
        source,
    });
    i32::from(settings.exec_failure_status)
}

fn to_c_strings(args: &[String]) -> Result<Vec<CString>, ShellError> {
    args.iter()
        .map(|arg| {
            CString::new(arg.as_bytes())
                .map_err(|_| ShellError::InvalidArgument(arg.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env;
    use crate::parse::{Part, simple_command};

    #[test]
    fn argv_resolves_each_word_separately() {
        env::set("TREESH_EXT_ARG", "a b").unwrap();
        let line = "printf %s $TREESH_EXT_ARG x${TREESH_EXT_ARG}y";
        let cmd = simple_command(line).unwrap();
        let args = argv(cmd.verb.as_ref().unwrap(), &cmd.params, UnsetVars::Leave);
        assert_eq!(args, vec!["printf", "%s", "a b", "xa by"]);
    }

    #[test]
    fn argv_keeps_empty_words() {
        let verb = Word::literal("echo");
        let params = vec![Word::variable("TREESH_EXT_UNSET"), Word::literal("after")];
        assert_eq!(
            argv(&verb, &params, UnsetVars::Leave),
            vec!["echo", "", "after"]
        );
        assert_eq!(env::get("TREESH_EXT_UNSET"), None);
    }

    #[test]
    fn argv_of_bare_verb() {
        let verb = Word::new(vec![Part::Literal("ls".into())]);
        assert_eq!(argv(&verb, &[], UnsetVars::Leave), vec!["ls"]);
    }

    #[test]
    fn interior_nul_is_invalid_argument() {
        let args = vec!["echo".to_string(), "a\0b".to_string()];
        assert!(matches!(
            to_c_strings(&args),
            Err(ShellError::InvalidArgument(arg)) if arg == "a\0b"
        ));
    }
}
