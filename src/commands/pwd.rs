use std::io::{self, Write};

use nix::unistd;

use crate::commands::Builtin;
use crate::error::{self, ShellError};
use crate::eval::{Shell, Status};
use crate::parse::SimpleCommand;
use crate::redirect::{self, SavedStdio};

/// `pwd`: print the working directory. Only an output target is honoured.
pub struct Pwd;

impl Builtin for Pwd {
    fn names(&self) -> &[&'static str] {
        &["pwd"]
    }

    fn run(&self, shell: &Shell, cmd: &SimpleCommand) -> Result<Status, ShellError> {
        let plan = redirect::plan_output(cmd, shell.unset_vars());
        let _restore = SavedStdio::apply(&plan)?;

        let cwd = match unistd::getcwd() {
            Ok(cwd) => cwd,
            Err(e) => {
                error::report(&ShellError::WorkingDir(e));
                return Ok(Status::FAILURE);
            }
        };

        let mut stdout = io::stdout().lock();
        let written = writeln!(stdout, "{}", cwd.display()).and_then(|()| stdout.flush());
        drop(stdout);
        match written {
            Ok(()) => Ok(Status::SUCCESS),
            Err(e) => {
                log::warn!("pwd: {e}");
                Ok(Status::FAILURE)
            }
        }
    }
}
