//! fork / wait / exit plumbing shared by the external runner and the
//! orchestrators.

use std::fs::File;
use std::io::Read;
use std::os::fd::AsRawFd;

use nix::errno::Errno;
use nix::fcntl::{FcntlArg, FdFlag, fcntl};
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::{self, ForkResult, Pid};

use super::Status;
use crate::error::ShellError;
use crate::redirect::flush_stdio;

pub(crate) fn fork() -> Result<ForkResult, ShellError> {
    flush_stdio();
    // SAFETY: callers must not have other threads running. The treesh
    // binary never starts any, and no unit test reaches a fork.
    unsafe { unistd::fork() }.map_err(ShellError::Fork)
}

/// Block until `pid` terminates and decode how it ended.
pub(crate) fn wait_for(
    pid: Pid,
    decode: fn(WaitStatus) -> Option<Status>,
) -> Result<Status, ShellError> {
    loop {
        match waitpid(pid, None) {
            Ok(wait) => {
                if let Some(status) = decode(wait) {
                    log::debug!("pid {pid}: {status}");
                    return Ok(status);
                }
            }
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(ShellError::Wait(e)),
        }
    }
}

/// End a forked child. Buffered output is flushed first.
pub(crate) fn exit_child(code: i32) -> ! {
    flush_stdio();
    std::process::exit(code)
}

/// Pipe a forked sub-evaluation writes its final [`Status`] to, as
/// `(read, write)`. Both ends are close-on-exec, so a program exec'd below
/// the sub-evaluation never holds the write end open.
pub(crate) fn report_channel() -> Result<(File, File), ShellError> {
    let (read, write) = unistd::pipe().map_err(ShellError::Pipe)?;
    for fd in [&read, &write] {
        fcntl(fd.as_raw_fd(), FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC))
            .map_err(ShellError::Pipe)?;
    }
    Ok((File::from(read), File::from(write)))
}

/// A forked sub-evaluation, seen from the process that forked it.
#[derive(Debug)]
pub(crate) struct Subshell {
    pub pid: Pid,
    /// Read end of its [`report_channel`].
    pub report: File,
}

impl Subshell {
    /// Wait for the child, then take the status it reported. A child that
    /// died before reporting is judged by how the process itself ended.
    pub fn wait(mut self) -> Result<Status, ShellError> {
        let ended = wait_for(self.pid, Status::from_program)?;
        let mut bytes = Vec::with_capacity(2);
        if let Err(e) = self.report.read_to_end(&mut bytes) {
            log::warn!("pid {}: reading status report: {e}", self.pid);
        }
        match Status::decode(&bytes) {
            Some(reported) => Ok(reported),
            None => {
                log::warn!("pid {}: no status report, using {ended}", self.pid);
                Ok(ended)
            }
        }
    }
}
