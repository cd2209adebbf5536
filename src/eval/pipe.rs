use std::os::fd::AsRawFd;

use log::{debug, warn};
use nix::unistd::pipe;

use crate::error::ExecError;
use crate::eval::process::{self, STDIN, STDOUT};
use crate::eval::status::{self, ExitStatus, INTERNAL_ERROR};
use crate::eval::{EvalContext, Executor};
use crate::parse::CommandNode;

impl Executor {
    /// `cmd1 | cmd2`: run both at once with cmd1's stdout feeding cmd2's stdin.
    ///
    /// The result is cmd2's status; cmd1's is reaped and dropped.
    pub(crate) fn run_on_pipe(
        &self,
        cmd1: &CommandNode,
        cmd2: &CommandNode,
        ctx: EvalContext<'_>,
    ) -> ExitStatus {
        match self.try_pipe(cmd1, cmd2, ctx) {
            Ok(status) => status,
            Err(e) => {
                warn!("[{}] pipe: {e}", ctx.level);
                INTERNAL_ERROR
            }
        }
    }

    fn try_pipe(
        &self,
        cmd1: &CommandNode,
        cmd2: &CommandNode,
        ctx: EvalContext<'_>,
    ) -> Result<ExitStatus, ExecError> {
        let (read_end, write_end) = pipe().map_err(ExecError::Pipe)?;
        let read_raw = read_end.as_raw_fd();

        // The write end moves into the closure, so the parent closes its
        // copy as soon as the writer has been forked (or the fork failed).
        // The reader then sees end-of-stream once the writer side is done.
        let writer = process::spawn(move || {
            process::close_inherited(read_raw);
            if let Err(e) = process::install(write_end, &[STDOUT]) {
                eprintln!("shexec: {e}");
                return status::FAILURE;
            }
            self.evaluate_node(cmd1, ctx)
        })?;

        // Same for the read end: closed in the parent once the reader exists.
        let reader = match process::spawn(move || {
            if let Err(e) = process::install(read_end, &[STDIN]) {
                eprintln!("shexec: {e}");
                return status::FAILURE;
            }
            self.evaluate_node(cmd2, ctx)
        }) {
            Ok(pid) => pid,
            Err(e) => {
                // The read end is gone, so the writer cannot block forever.
                let _ = process::wait(writer);
                return Err(e);
            }
        };

        let discarded = status::from_wait(process::wait(writer)?);
        let result = status::from_wait(process::wait(reader)?);
        debug!("[{}] pipe statuses {discarded} | {result}", ctx.level);

        Ok(result)
    }
}
