use crate::commands::Builtin;
use crate::error::ShellError;
use crate::eval::{Shell, Status};
use crate::parse::SimpleCommand;

/// `exit` and `quit`. Arguments are ignored.
pub struct Exit;

impl Builtin for Exit {
    fn names(&self) -> &[&'static str] {
        &["exit", "quit"]
    }

    fn run(&self, _shell: &Shell, _cmd: &SimpleCommand) -> Result<Status, ShellError> {
        log::debug!("terminate requested");
        Ok(Status::Terminate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::simple_command;

    #[test]
    fn exit_terminates() {
        let cmd = simple_command("exit 3").unwrap();
        assert_eq!(Exit.run(&Shell::default(), &cmd).unwrap(), Status::Terminate);
    }
}
