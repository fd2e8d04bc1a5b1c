//! Concurrent composition: `&` and `|`.
//!
//! Each side runs in its own forked process, which evaluates its subtree,
//! writes the resulting status to a report pipe and exits. The report is
//! what the orchestrator combines, so `Terminate` and a side that ended by
//! signal survive the process boundary whatever the exit code was. The
//! orchestrating process only forks and waits, and always waits for both
//! children.

use std::io::Write;
use std::os::fd::{AsRawFd, RawFd};

use nix::sys::signal::Signal;
use nix::unistd::{self, ForkResult};

use super::process::{self, Subshell, exit_child};
use super::{Shell, Status};
use crate::error::{self, ShellError};
use crate::parse::Command;
use crate::redirect::Stream;

/// `left & right`: both sides run concurrently and unconnected.
pub fn parallel(
    shell: &Shell,
    node: &Command,
    left: Option<&Command>,
    right: Option<&Command>,
    depth: usize,
) -> Result<Status, ShellError> {
    let (Some(left), Some(right)) = (left, right) else {
        return shell.child(left.or(right), depth, node);
    };

    let first = spawn(shell, left, node, depth, || Ok(()))?;
    let second = match spawn(shell, right, node, depth, || Ok(())) {
        Ok(side) => side,
        Err(err) => {
            let _ = first.wait();
            return Err(err);
        }
    };

    let left = first.wait();
    let right = second.wait();
    Ok(combine_parallel(left?, right?))
}

/// `left | right`: left's stdout is connected to right's stdin.
pub fn pipe(
    shell: &Shell,
    node: &Command,
    left: Option<&Command>,
    right: Option<&Command>,
    depth: usize,
) -> Result<Status, ShellError> {
    let (Some(left), Some(right)) = (left, right) else {
        return shell.child(left.or(right), depth, node);
    };

    let (read_end, write_end) = unistd::pipe().map_err(ShellError::Pipe)?;
    let (read_fd, write_fd) = (read_end.as_raw_fd(), write_end.as_raw_fd());

    let producer = spawn(shell, left, node, depth, || {
        attach(write_fd, Stream::Stdout, read_fd)
    })?;
    let consumer = spawn(shell, right, node, depth, || {
        attach(read_fd, Stream::Stdin, write_fd)
    });

    // The orchestrator takes no part in the transfer; the consumer only sees
    // EOF once every copy of the write end is closed.
    drop(read_end);
    drop(write_end);

    let consumer = match consumer {
        Ok(side) => side,
        Err(err) => {
            let _ = producer.wait();
            return Err(err);
        }
    };

    let left = producer.wait();
    let right = consumer.wait();
    Ok(combine_pipe(left?, right?))
}

/// Fork a child that runs `setup`, evaluates `node` one level down, reports
/// the resulting status and exits.
fn spawn(
    shell: &Shell,
    node: &Command,
    parent: &Command,
    depth: usize,
    setup: impl FnOnce() -> Result<(), ShellError>,
) -> Result<Subshell, ShellError> {
    let (report, mut report_end) = process::report_channel()?;
    match process::fork()? {
        ForkResult::Child => {
            drop(report);
            let evaluated =
                setup().and_then(|()| shell.evaluate(node, depth + 1, Some(parent)));
            let status = evaluated.unwrap_or_else(|err| {
                error::report(&err);
                Status::FAILURE
            });
            if let Err(e) = report_end.write_all(&status.encode()) {
                log::warn!("reporting {status}: {e}");
            }
            exit_child(status.exit_code())
        }
        ForkResult::Parent { child } => {
            drop(report_end);
            log::debug!(
                "forked pid {child} for {} at depth {}",
                node.label(),
                depth + 1
            );
            Ok(Subshell { pid: child, report })
        }
    }
}

/// In a pipe child: close the unused end and move `fd` onto `stream`.
fn attach(fd: RawFd, stream: Stream, unused: RawFd) -> Result<(), ShellError> {
    unistd::close(unused).map_err(ShellError::Pipe)?;
    unistd::dup2(fd, stream.fd()).map_err(ShellError::Pipe)?;
    unistd::close(fd).map_err(ShellError::Pipe)?;
    Ok(())
}

/// `Terminate` wins; otherwise success only if both sides succeeded, else the
/// right side's failure, else the left side's.
pub fn combine_parallel(left: Status, right: Status) -> Status {
    if left.is_terminate() || right.is_terminate() {
        Status::Terminate
    } else if !right.is_success() {
        right
    } else {
        left
    }
}

/// `Terminate` wins; a producer killed by a signal fails the pipe; otherwise
/// the pipe's status is the consumer's. The producer's exit code is dropped,
/// as in a conventional shell pipeline, and so is a `SIGPIPE` death, which
/// only means the consumer stopped reading early.
pub fn combine_pipe(left: Status, right: Status) -> Status {
    match (left, right) {
        (Status::Terminate, _) | (_, Status::Terminate) => Status::Terminate,
        (Status::Signaled(signal), _) if signal != Signal::SIGPIPE as i32 => left,
        _ => right,
    }
}
