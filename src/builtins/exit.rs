use log::debug;

use crate::builtins::Builtin;
use crate::eval::{Executor, ExitStatus, SUCCESS};
use crate::parse::SimpleCommand;

/// Terminate the current process with status 0.
///
/// Nothing after this in the tree runs: not the sibling, not the rest of
/// any ancestor. Inside a forked child only that child ends.
pub struct ExitBuiltin;

impl Builtin for ExitBuiltin {
    fn run(&self, cmd: &SimpleCommand, _executor: &Executor) -> ExitStatus {
        debug!("{}: terminating pid {}", cmd.verb, std::process::id());
        std::process::exit(SUCCESS)
    }
}
