use nix::unistd;

use crate::commands::Builtin;
use crate::error::{self, ShellError};
use crate::eval::{Shell, Status};
use crate::expand;
use crate::parse::SimpleCommand;
use crate::redirect::{self, SavedStdio, Stream};

/// `cd DIR`: change the working directory of the shell's own process.
///
/// Output and error redirections are honoured for the duration of the call
/// and undone afterwards; an input target is ignored.
pub struct Cd;

impl Builtin for Cd {
    fn names(&self) -> &[&'static str] {
        &["cd"]
    }

    fn run(&self, shell: &Shell, cmd: &SimpleCommand) -> Result<Status, ShellError> {
        let [dir] = cmd.params.as_slice() else {
            return Err(ShellError::Usage {
                command: "cd",
                reason: "expected exactly one directory",
            });
        };

        let unset = shell.unset_vars();
        let mut plan = redirect::plan(cmd, unset);
        plan.retain(|r| r.stream != Stream::Stdin);
        let _restore = SavedStdio::apply(&plan)?;

        let path = expand::resolve(dir, unset);
        match unistd::chdir(path.as_str()) {
            Ok(()) => {
                log::debug!("cd {path}");
                Ok(Status::SUCCESS)
            }
            Err(source) => {
                // Reported while the error redirection is still in place.
                error::report(&ShellError::ChangeDir { path, source });
                Ok(Status::FAILURE)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::simple_command;

    fn run(line: &str) -> Result<Status, ShellError> {
        Cd.run(&Shell::default(), &simple_command(line).unwrap())
    }

    #[test]
    fn no_directory_is_usage_error() {
        assert!(matches!(
            run("cd"),
            Err(ShellError::Usage { command: "cd", .. })
        ));
    }

    #[test]
    fn two_directories_is_usage_error() {
        let before = std::env::current_dir().unwrap();
        assert!(matches!(run("cd /tmp /"), Err(ShellError::Usage { .. })));
        assert_eq!(std::env::current_dir().unwrap(), before);
    }

    #[test]
    fn missing_directory_fails_without_moving() {
        let before = std::env::current_dir().unwrap();
        assert_eq!(
            run("cd /definitely/not/a/treesh/dir").unwrap(),
            Status::FAILURE
        );
        assert_eq!(std::env::current_dir().unwrap(), before);
    }

    #[test]
    fn unopenable_target_is_redirect_error() {
        assert!(matches!(
            run("cd . > /definitely/not/a/dir/out"),
            Err(ShellError::Redirect { .. })
        ));
    }
}
