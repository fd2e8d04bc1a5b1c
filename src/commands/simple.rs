//! Built-ins whose only effect is a fixed status.

use crate::commands::Builtin;
use crate::error::ShellError;
use crate::eval::{Shell, Status};
use crate::parse::SimpleCommand;

/// Ignores its arguments and redirections and returns `status`.
pub struct FixedStatus {
    names: &'static [&'static str],
    status: Status,
}

pub static TRUE: FixedStatus = FixedStatus {
    names: &["true"],
    status: Status::SUCCESS,
};

pub static FALSE: FixedStatus = FixedStatus {
    names: &["false"],
    status: Status::FAILURE,
};

impl Builtin for FixedStatus {
    fn names(&self) -> &[&'static str] {
        self.names
    }

    fn run(&self, _shell: &Shell, _cmd: &SimpleCommand) -> Result<Status, ShellError> {
        Ok(self.status)
    }
}
