use log::{debug, warn};

use crate::error::ExecError;
use crate::eval::status;
use crate::eval::{EvalContext, Executor, process};
use crate::parse::CommandNode;

impl Executor {
    /// `cmd1 & cmd2`: evaluate both subtrees at once, each in its own child.
    ///
    /// `true` only when both children were reaped and both reported a
    /// non-zero status. Any fork or wait failure gives `false`.
    pub(crate) fn run_in_parallel(
        &self,
        cmd1: &CommandNode,
        cmd2: &CommandNode,
        ctx: EvalContext<'_>,
    ) -> bool {
        match self.try_parallel(cmd1, cmd2, ctx) {
            Ok(ok) => ok,
            Err(e) => {
                warn!("[{}] parallel: {e}", ctx.level);
                false
            }
        }
    }

    fn try_parallel(
        &self,
        cmd1: &CommandNode,
        cmd2: &CommandNode,
        ctx: EvalContext<'_>,
    ) -> Result<bool, ExecError> {
        let first = process::spawn(|| self.evaluate_node(cmd1, ctx))?;
        let second = match process::spawn(|| self.evaluate_node(cmd2, ctx)) {
            Ok(pid) => pid,
            Err(e) => {
                // Reap the first child before reporting.
                let _ = process::wait(first);
                return Err(e);
            }
        };

        let status1 = status::from_wait(process::wait(first)?);
        let status2 = status::from_wait(process::wait(second)?);
        debug!("[{}] parallel statuses {status1}, {status2}", ctx.level);

        Ok(status1 != 0 && status2 != 0)
    }
}
