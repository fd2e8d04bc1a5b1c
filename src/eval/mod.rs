//! Tree evaluation: dispatches leaves to built-ins or external programs and
//! composes interior nodes.
//!
//! `;`, `&&` and `||` run both sides in the calling process, left first.
//! `&` and `|` fork one process per side (see [`orchestrate`]).

pub mod orchestrate;
pub(crate) mod process;
pub mod status;

pub use status::Status;

use crate::commands::{self, external, vars};
use crate::config::{Config, Settings};
use crate::env::UnsetVars;
use crate::error::{self, ShellError};
use crate::parse::{Command, Operator, SimpleCommand};

/// The evaluator. Holds configuration only; all mutable shell state (working
/// directory, environment) is process state.
#[derive(Debug, Clone, Default)]
pub struct Shell {
    settings: Settings,
}

impl Shell {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.settings.clone())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn unset_vars(&self) -> UnsetVars {
        self.settings.unset_vars()
    }

    /// Evaluate a whole tree. Only fatal errors come back as `Err`.
    pub fn run(&self, tree: &Command) -> Result<Status, ShellError> {
        self.evaluate(tree, 0, None)
    }

    /// Evaluate one node at `depth`. `parent` is only used for logging.
    pub fn evaluate(
        &self,
        node: &Command,
        depth: usize,
        parent: Option<&Command>,
    ) -> Result<Status, ShellError> {
        if depth > self.settings.max_depth {
            error::report(&ShellError::DepthExceeded {
                max: self.settings.max_depth,
            });
            return Ok(Status::FAILURE);
        }
        log::trace!(
            "depth {depth}: {} (under {})",
            node.label(),
            parent.map_or("root", Command::label)
        );

        let (op, left, right) = match node {
            Command::Simple(cmd) => return self.simple(cmd),
            Command::Compound { op, left, right } => {
                (*op, left.as_deref(), right.as_deref())
            }
        };

        match op {
            Operator::Sequential => self.sequential(node, left, right, depth),
            Operator::ConditionalNonZero => {
                self.conditional(node, left, right, depth, |s| !s.is_success())
            }
            Operator::ConditionalZero => {
                self.conditional(node, left, right, depth, Status::is_success)
            }
            Operator::Parallel => orchestrate::parallel(self, node, left, right, depth),
            Operator::Pipe => orchestrate::pipe(self, node, left, right, depth),
        }
    }

    /// Evaluate a child of `parent`; an absent child is a successful no-op.
    fn child(
        &self,
        node: Option<&Command>,
        depth: usize,
        parent: &Command,
    ) -> Result<Status, ShellError> {
        match node {
            Some(node) => self.evaluate(node, depth + 1, Some(parent)),
            None => Ok(Status::SUCCESS),
        }
    }

    fn sequential(
        &self,
        node: &Command,
        left: Option<&Command>,
        right: Option<&Command>,
        depth: usize,
    ) -> Result<Status, ShellError> {
        let status = self.child(left, depth, node)?;
        if status.is_terminate() || right.is_none() {
            return Ok(status);
        }
        self.child(right, depth, node)
    }

    /// Run `right` only when `run_right` accepts the left status.
    fn conditional(
        &self,
        node: &Command,
        left: Option<&Command>,
        right: Option<&Command>,
        depth: usize,
        run_right: fn(Status) -> bool,
    ) -> Result<Status, ShellError> {
        let status = self.child(left, depth, node)?;
        if status.is_terminate() || !run_right(status) || right.is_none() {
            return Ok(status);
        }
        self.child(right, depth, node)
    }

    /// Run a leaf. Leaf-local errors are reported here and become a status.
    fn simple(&self, cmd: &SimpleCommand) -> Result<Status, ShellError> {
        match self.dispatch(cmd) {
            Ok(status) => Ok(status),
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                error::report(&err);
                Ok(self.failure_status(&err))
            }
        }
    }

    fn dispatch(&self, cmd: &SimpleCommand) -> Result<Status, ShellError> {
        let Some(verb) = cmd.verb.as_ref().filter(|v| !v.is_empty()) else {
            return Ok(Status::SUCCESS);
        };

        if let Some(builtin) = verb.as_literal().and_then(commands::lookup) {
            log::debug!("builtin: {}", builtin.names()[0]);
            return builtin.run(self, cmd);
        }
        if let Some(name) = verb.as_variable() {
            return vars::display(self, name);
        }
        if let Some(assignment) = vars::Assignment::parse(verb) {
            return assignment.apply(self);
        }
        external::run(self, cmd)
    }

    pub(crate) fn failure_status(&self, err: &ShellError) -> Status {
        match err {
            ShellError::Redirect { .. } => {
                Status::Exited(self.settings.redirect_failure_status)
            }
            _ => Status::FAILURE,
        }
    }
}
