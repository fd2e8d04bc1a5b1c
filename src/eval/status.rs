use std::fmt;

use nix::sys::wait::WaitStatus;

/// Outcome of evaluating a command or tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Normal completion with an exit code.
    Exited(u8),
    /// A child was killed by this signal number.
    Signaled(i32),
    /// `exit`/`quit` ran: the shell should stop.
    Terminate,
}

impl Status {
    pub const SUCCESS: Status = Status::Exited(0);
    pub const FAILURE: Status = Status::Exited(1);

    /// Status for an exit code, keeping the low eight bits like `wait` does.
    pub fn from_code(code: i32) -> Status {
        Status::Exited((code & 0xff) as u8)
    }

    pub fn is_success(self) -> bool {
        self == Status::SUCCESS
    }

    pub fn is_terminate(self) -> bool {
        self == Status::Terminate
    }

    /// Exit code for a process ending with this status. `Terminate` is a
    /// clean exit.
    pub fn exit_code(self) -> i32 {
        match self {
            Status::Exited(code) => i32::from(code),
            Status::Signaled(signal) => 128 + signal,
            Status::Terminate => 0,
        }
    }

    /// Status of an external program. Its exit codes are taken at face value.
    pub fn from_program(wait: WaitStatus) -> Option<Status> {
        match wait {
            WaitStatus::Exited(_, code) => Some(Status::from_code(code)),
            WaitStatus::Signaled(_, signal, _) => Some(Status::Signaled(signal as i32)),
            _ => None,
        }
    }

    /// Wire form a forked sub-evaluation sends to its orchestrator.
    pub fn encode(self) -> [u8; 2] {
        match self {
            Status::Exited(code) => [b'E', code],
            Status::Signaled(signal) => [b'S', signal as u8],
            Status::Terminate => [b'T', 0],
        }
    }

    /// Inverse of [`encode`](Status::encode). Anything else is `None`.
    pub fn decode(bytes: &[u8]) -> Option<Status> {
        match bytes {
            [b'E', code] => Some(Status::Exited(*code)),
            [b'S', signal] => Some(Status::Signaled(i32::from(*signal))),
            [b'T', _] => Some(Status::Terminate),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Exited(code) => write!(f, "exit {code}"),
            Status::Signaled(signal) => write!(f, "signal {signal}"),
            Status::Terminate => f.write_str("terminate"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::signal::Signal;
    use nix::unistd::Pid;

    #[test]
    fn exit_codes() {
        assert_eq!(Status::SUCCESS.exit_code(), 0);
        assert_eq!(Status::Exited(42).exit_code(), 42);
        assert_eq!(Status::Signaled(9).exit_code(), 137);
        assert_eq!(Status::Terminate.exit_code(), 0);
    }

    #[test]
    fn from_code_wraps_like_wait() {
        assert_eq!(Status::from_code(256), Status::SUCCESS);
        assert_eq!(Status::from_code(-1), Status::Exited(255));
    }

    #[test]
    fn signaled_is_not_success() {
        assert!(!Status::Signaled(15).is_success());
        assert!(!Status::Terminate.is_success());
    }

    #[test]
    fn program_exit_code_is_literal() {
        let pid = Pid::from_raw(1);
        assert_eq!(
            Status::from_program(WaitStatus::Exited(pid, 156)),
            Some(Status::Exited(156))
        );
        assert_eq!(
            Status::from_program(WaitStatus::Signaled(pid, Signal::SIGKILL, false)),
            Some(Status::Signaled(9))
        );
        assert_eq!(Status::from_program(WaitStatus::StillAlive), None);
    }

    #[test]
    fn report_keeps_every_outcome_apart() {
        for status in [
            Status::SUCCESS,
            Status::Exited(156),
            Status::Exited(137),
            Status::Signaled(9),
            Status::Terminate,
        ] {
            assert_eq!(Status::decode(&status.encode()), Some(status));
        }
        assert_ne!(Status::Exited(156).encode(), Status::Terminate.encode());
        assert_ne!(Status::Exited(137).encode(), Status::Signaled(9).encode());
    }

    #[test]
    fn truncated_report_is_rejected() {
        assert_eq!(Status::decode(b""), None);
        assert_eq!(Status::decode(b"T"), None);
        assert_eq!(Status::decode(b"X0"), None);
    }

    #[test]
    fn display() {
        assert_eq!(Status::Exited(2).to_string(), "exit 2");
        assert_eq!(Status::Terminate.to_string(), "terminate");
    }
}
