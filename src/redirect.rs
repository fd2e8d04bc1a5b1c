//! Standard-stream redirection for simple commands.
//!
//! [`plan`] decides what to open; [`apply`] remaps the streams for good (in a
//! forked child); [`SavedStdio`] remaps them for the lifetime of a guard (in
//! the shell's own process, for built-ins).

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::os::unix::fs::OpenOptionsExt;

use nix::unistd::{dup, dup2};

use crate::env::UnsetVars;
use crate::error::ShellError;
use crate::expand;
use crate::parse::{SimpleCommand, Word};

/// rw-r--r--
const CREATE_MODE: u32 = 0o644;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdin,
    Stdout,
    Stderr,
}

impl Stream {
    pub fn fd(self) -> RawFd {
        match self {
            Stream::Stdin => 0,
            Stream::Stdout => 1,
            Stream::Stderr => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Read,
    Truncate,
    Append,
}

impl Mode {
    fn write(append: bool) -> Mode {
        if append { Mode::Append } else { Mode::Truncate }
    }
}

/// One stream remapped onto one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub stream: Stream,
    pub path: String,
    pub mode: Mode,
}

impl Redirect {
    /// Open the target with the flags its mode calls for.
    pub fn open(&self) -> Result<File, ShellError> {
        let mut options = OpenOptions::new();
        match self.mode {
            Mode::Read => options.read(true),
            Mode::Truncate => options
                .write(true)
                .create(true)
                .truncate(true)
                .mode(CREATE_MODE),
            Mode::Append => options.append(true).create(true).mode(CREATE_MODE),
        };
        options.open(&self.path).map_err(|source| self.error(source))
    }

    fn error(&self, source: io::Error) -> ShellError {
        ShellError::Redirect {
            path: self.path.clone(),
            source,
        }
    }
}

/// The redirections a simple command asks for, in the order they are applied.
///
/// With both an output and an error target, the error target is truncated
/// and the output target appended to, whatever the append flags say.
pub fn plan(cmd: &SimpleCommand, unset: UnsetVars) -> Vec<Redirect> {
    let resolve = |word: &Word| expand::resolve(word, unset);
    let mut plan = Vec::new();

    match (&cmd.out, &cmd.err) {
        (Some(out), Some(err)) => {
            plan.push(Redirect {
                stream: Stream::Stderr,
                path: resolve(err),
                mode: Mode::Truncate,
            });
            plan.push(Redirect {
                stream: Stream::Stdout,
                path: resolve(out),
                mode: Mode::Append,
            });
        }
        (Some(out), None) => plan.push(Redirect {
            stream: Stream::Stdout,
            path: resolve(out),
            mode: Mode::write(cmd.io.out_append),
        }),
        (None, Some(err)) => plan.push(Redirect {
            stream: Stream::Stderr,
            path: resolve(err),
            mode: Mode::write(cmd.io.err_append),
        }),
        (None, None) => {}
    }

    if let Some(input) = &cmd.input {
        plan.push(Redirect {
            stream: Stream::Stdin,
            path: resolve(input),
            mode: Mode::Read,
        });
    }

    plan
}

/// Only the output target, honouring its own append flag.
pub fn plan_output(cmd: &SimpleCommand, unset: UnsetVars) -> Vec<Redirect> {
    cmd.out
        .iter()
        .map(|out| Redirect {
            stream: Stream::Stdout,
            path: expand::resolve(out, unset),
            mode: Mode::write(cmd.io.out_append),
        })
        .collect()
}

/// Remap the streams of the current process for good.
pub fn apply(plan: &[Redirect]) -> Result<(), ShellError> {
    for redirect in plan {
        let file = redirect.open()?;
        flush_stdio();
        dup2(file.as_raw_fd(), redirect.stream.fd())
            .map_err(|e| redirect.error(io::Error::from(e)))?;
    }
    Ok(())
}

/// Flush Rust's buffered standard streams before a descriptor changes
/// underneath them or the process forks.
pub(crate) fn flush_stdio() {
    let _ = io::stdout().flush();
    let _ = io::stderr().flush();
}

/// Streams remapped in the shell's own process; the originals come back on drop.
#[derive(Debug, Default)]
pub struct SavedStdio {
    saved: Vec<(Stream, OwnedFd)>,
}

impl SavedStdio {
    /// Apply a plan, keeping a copy of every stream it touches.
    ///
    /// If any target fails to open, the streams already remapped are restored
    /// before the error is returned.
    pub fn apply(plan: &[Redirect]) -> Result<SavedStdio, ShellError> {
        let mut guard = SavedStdio::default();
        for redirect in plan {
            let file = redirect.open()?;
            guard
                .save(redirect.stream)
                .map_err(|e| redirect.error(io::Error::from(e)))?;
            dup2(file.as_raw_fd(), redirect.stream.fd())
                .map_err(|e| redirect.error(io::Error::from(e)))?;
        }
        Ok(guard)
    }

    fn save(&mut self, stream: Stream) -> nix::Result<()> {
        if self.saved.iter().any(|(s, _)| *s == stream) {
            return Ok(());
        }
        flush_stdio();
        let copy = dup(stream.fd())?;
        // SAFETY: `dup` just returned this descriptor; nothing else owns it.
        let copy = unsafe { OwnedFd::from_raw_fd(copy) };
        self.saved.push((stream, copy));
        Ok(())
    }
}

impl Drop for SavedStdio {
    fn drop(&mut self) {
        if self.saved.is_empty() {
            return;
        }
        flush_stdio();
        for (stream, copy) in self.saved.drain(..).rev() {
            if let Err(e) = dup2(copy.as_raw_fd(), stream.fd()) {
                log::error!("restoring fd {}: {e}", stream.fd());
            }
        }
    }
}
