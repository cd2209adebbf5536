//! Child processes as closures: fork, run a task, exit with its status.

use std::io::Write;
use std::os::fd::{AsRawFd, IntoRawFd, OwnedFd, RawFd};
use std::panic::{self, AssertUnwindSafe};

use log::{debug, trace};
use nix::errno::Errno;
use nix::libc;
use nix::sys::signal::{SigHandler, Signal, signal};
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::{ForkResult, Pid, fork};

use crate::error::ExecError;
use crate::eval::status::{ExitStatus, FAILURE};

pub const STDIN: RawFd = libc::STDIN_FILENO;
pub const STDOUT: RawFd = libc::STDOUT_FILENO;
pub const STDERR: RawFd = libc::STDERR_FILENO;

/// Fork a child that runs `task` and terminates with the status it returns.
///
/// Returns the child's pid in the parent. The child never returns from this
/// call: it exits without unwinding, so nothing owned by the caller's stack
/// is dropped (or closed) a second time in the child. Values moved into
/// `task` are dropped in the parent when the closure is discarded.
pub fn spawn<F>(task: F) -> Result<Pid, ExecError>
where
    F: FnOnce() -> ExitStatus,
{
    // Anything still buffered would otherwise be written by both processes.
    let _ = std::io::stdout().flush();
    let _ = std::io::stderr().flush();

    // SAFETY: the evaluator runs in a single-threaded process, so the child
    // cannot inherit a lock held by another thread.
    match unsafe { fork() }.map_err(ExecError::Fork)? {
        ForkResult::Parent { child } => {
            trace!("forked pid {child}");
            Ok(child)
        }
        ForkResult::Child => {
            let status = panic::catch_unwind(AssertUnwindSafe(task)).unwrap_or(FAILURE);
            std::process::exit(status)
        }
    }
}

/// Block until `pid` terminates.
pub fn wait(pid: Pid) -> Result<WaitStatus, ExecError> {
    let status = waitpid(pid, None).map_err(|source| ExecError::Wait { pid, source })?;
    debug!("pid {pid} finished: {status:?}");
    Ok(status)
}

/// Make `fd` the process's descriptor for every slot in `targets`, then close it.
pub fn install(fd: OwnedFd, targets: &[RawFd]) -> Result<(), ExecError> {
    let raw = fd.as_raw_fd();
    for &target in targets {
        if raw == target {
            continue;
        }
        // SAFETY: `raw` is open for the lifetime of `fd`; dup2 only replaces `target`.
        if unsafe { libc::dup2(raw, target) } == -1 {
            return Err(ExecError::Dup {
                fd: target,
                source: Errno::last(),
            });
        }
    }
    if targets.contains(&raw) {
        // Already sitting in a standard slot; keep it open.
        let _ = fd.into_raw_fd();
    }
    Ok(())
}

/// Close a descriptor this process inherited from its parent but does not use.
///
/// Only for use inside a freshly forked child, where the parent's owning
/// handle is never dropped.
pub fn close_inherited(fd: RawFd) {
    // SAFETY: see above; nothing in this process will use or close `fd` again.
    if unsafe { libc::close(fd) } == -1 {
        trace!("close({fd}) failed: {}", Errno::last());
    }
}

/// Put SIGPIPE back to its default action before exec.
///
/// The Rust runtime ignores SIGPIPE, and an ignored disposition survives
/// `execvp`; a pipe writer whose reader has gone must die quietly instead
/// of seeing EPIPE.
pub fn reset_sigpipe() {
    // SAFETY: SIG_DFL installs no handler code in this process.
    if let Err(e) = unsafe { signal(Signal::SIGPIPE, SigHandler::SigDfl) } {
        trace!("restoring SIGPIPE failed: {e}");
    }
}
