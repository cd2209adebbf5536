//! Commands run inside the evaluator's own process.
//!
//! Builtins are looked up by the literal text of a command's verb. The
//! names each builtin answers to come from configuration.

/// `cd`: change directory (`HOME`, `OLDPWD` or an explicit path).
pub mod cd;
/// `exit` / `quit`: terminate the current process.
pub mod exit;

use crate::eval::{Executor, ExitStatus};
use crate::parse::SimpleCommand;

/// A command implemented in-process instead of by exec'ing a program.
pub trait Builtin: Send + Sync {
    /// Run the builtin for `cmd` and return its status.
    fn run(&self, cmd: &SimpleCommand, executor: &Executor) -> ExitStatus;
}
