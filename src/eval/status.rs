use log::debug;
use nix::sys::wait::WaitStatus;

/// Conventional exit status: 0 is success, anything else is failure.
pub type ExitStatus = i32;

pub const SUCCESS: ExitStatus = 0;
pub const FAILURE: ExitStatus = 1;

/// A fork, pipe or wait call failed. Distinct from any exit code a program can report.
pub const INTERNAL_ERROR: ExitStatus = -1;

/// Returned for a node whose operator the evaluator does not recognize.
pub const SHELL_EXIT: ExitStatus = -100;

/// Map a reaped child's wait status to an exit status.
///
/// Normal exit yields the exit code. A child killed by a signal yields 0;
/// callers that need to tell the two apart must inspect the wait status
/// themselves.
pub fn from_wait(status: WaitStatus) -> ExitStatus {
    match status {
        WaitStatus::Exited(_, code) => code,
        WaitStatus::Signaled(pid, signal, core_dumped) => {
            debug!("pid {pid} terminated by {signal:?} (core dumped: {core_dumped}), reporting 0");
            SUCCESS
        }
        other => {
            debug!("unexpected wait status {other:?}, reporting 0");
            SUCCESS
        }
    }
}

/// Integer form of a runner's boolean outcome (`true` is 1, `false` is 0).
pub fn from_bool(ok: bool) -> ExitStatus {
    ExitStatus::from(ok)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::signal::Signal;
    use nix::unistd::Pid;

    #[test]
    fn exited_reports_code() {
        let pid = Pid::from_raw(4242);
        assert_eq!(from_wait(WaitStatus::Exited(pid, 0)), 0);
        assert_eq!(from_wait(WaitStatus::Exited(pid, 3)), 3);
    }

    #[test]
    fn signal_death_reports_zero() {
        let pid = Pid::from_raw(4242);
        assert_eq!(
            from_wait(WaitStatus::Signaled(pid, Signal::SIGKILL, false)),
            SUCCESS
        );
    }

    #[test]
    fn bool_maps_to_one_and_zero() {
        assert_eq!(from_bool(true), 1);
        assert_eq!(from_bool(false), 0);
    }

    #[test]
    fn sentinels_are_not_exit_codes() {
        assert!(SHELL_EXIT < 0);
        assert!(INTERNAL_ERROR < 0);
        assert_ne!(SHELL_EXIT, INTERNAL_ERROR);
    }
}
