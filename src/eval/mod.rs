pub mod context;
pub mod environment;
mod parallel;
mod pipe;
pub mod process;
pub mod redirect;
pub mod resolve;
mod simple;
pub mod status;

pub use context::EvalContext;
pub use resolve::{EnvResolver, WordResolver};
pub use status::{ExitStatus, FAILURE, INTERNAL_ERROR, SHELL_EXIT, SUCCESS};

use std::collections::HashMap;

use log::{debug, warn};

use crate::builtins::Builtin;
use crate::config::Config;
use crate::parse::{CommandNode, Operator, Word};
use redirect::Redirector;

/// Evaluates command trees: builtins by name, everything else through fork/exec.
pub struct Executor {
    builtins: HashMap<String, Box<dyn Builtin>>,
    resolver: Box<dyn WordResolver>,
    /// Status of a child whose exec failed.
    not_found_status: ExitStatus,
    /// Permission bits for files created by output redirection.
    file_mode: u32,
}

impl Executor {
    /// Build the executor from configuration.
    pub fn from_config(config: &Config) -> Self {
        use crate::builtins::{cd::CdBuiltin, exit::ExitBuiltin};

        let mut builtins: HashMap<String, Box<dyn Builtin>> = HashMap::new();
        for name in &config.builtins.cd {
            builtins.insert(name.clone(), Box::new(CdBuiltin));
        }
        for name in &config.builtins.exit {
            builtins.insert(name.clone(), Box::new(ExitBuiltin));
        }

        Self {
            builtins,
            resolver: Box::new(EnvResolver),
            not_found_status: config.exec.not_found_status,
            file_mode: config.exec.file_mode,
        }
    }

    /// Replace the word resolver (the default reads the process environment).
    pub fn with_resolver(mut self, resolver: Box<dyn WordResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Expand a word to its final string.
    pub fn resolve(&self, word: &Word) -> String {
        self.resolver.resolve(word)
    }

    /// Redirection helper bound to this executor's resolver and file mode.
    pub fn redirector(&self) -> Redirector<'_> {
        Redirector::new(self.resolver.as_ref(), self.file_mode)
    }

    fn builtin(&self, name: &str) -> Option<&dyn Builtin> {
        self.builtins.get(name).map(|b| b.as_ref())
    }

    /// Evaluate a whole tree and return its status.
    pub fn evaluate(&self, root: &CommandNode) -> ExitStatus {
        self.evaluate_node(root, EvalContext::root())
    }

    /// Evaluate `node`, recursing through compound operators.
    pub fn evaluate_node(&self, node: &CommandNode, ctx: EvalContext<'_>) -> ExitStatus {
        let (op, cmd1, cmd2) = match node {
            CommandNode::Simple(cmd) => {
                debug!("[{}] {} (parent {})", ctx.level, cmd, ctx.parent_op());
                return self.run_simple(cmd);
            }
            CommandNode::Compound { op, cmd1, cmd2 } => (*op, cmd1.as_ref(), cmd2.as_ref()),
        };

        debug!("[{}] operator {} (parent {})", ctx.level, op.as_str(), ctx.parent_op());
        let inner = ctx.descend(node);

        match op {
            Operator::Sequential => {
                let first = self.evaluate_node(cmd1, inner);
                let second = self.evaluate_node(cmd2, inner);
                first & second
            }
            Operator::CondNonzero => {
                let first = self.evaluate_node(cmd1, inner);
                if first != 0 {
                    return self.evaluate_node(cmd2, inner);
                }
                first
            }
            Operator::CondZero => {
                let first = self.evaluate_node(cmd1, inner);
                if first == 0 {
                    return self.evaluate_node(cmd2, inner);
                }
                first
            }
            Operator::Parallel => status::from_bool(self.run_in_parallel(cmd1, cmd2, inner)),
            Operator::Pipe => self.run_on_pipe(cmd1, cmd2, inner),
            Operator::Unsupported => {
                warn!("[{}] unsupported operator in command tree", ctx.level);
                SHELL_EXIT
            }
        }
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::from_config(&Config::default_config())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::SimpleCommand;

    fn leaf(verb: &str) -> CommandNode {
        CommandNode::Simple(SimpleCommand::new(verb, &[]))
    }

    #[test]
    fn default_builtins_registered() {
        let executor = Executor::default();
        assert!(executor.builtin("cd").is_some());
        assert!(executor.builtin("exit").is_some());
        assert!(executor.builtin("quit").is_some());
        assert!(executor.builtin("ls").is_none());
    }

    #[test]
    fn unsupported_operator_is_shell_exit() {
        // Children are never evaluated, so nothing is forked here.
        let node = CommandNode::compound(Operator::Unsupported, leaf("exit"), leaf("exit"));
        assert_eq!(Executor::default().evaluate(&node), SHELL_EXIT);
    }

    #[test]
    fn empty_verb_is_noop() {
        let node = CommandNode::Simple(SimpleCommand::default());
        assert_eq!(Executor::default().evaluate(&node), SUCCESS);
    }

    #[test]
    fn conditionals_over_noops() {
        let executor = Executor::default();
        let empty = || CommandNode::Simple(SimpleCommand::default());
        // An empty leaf is status 0 without forking; `||` returns it, `&&` goes on.
        let or = CommandNode::compound(Operator::CondNonzero, empty(), leaf("exit"));
        assert_eq!(executor.evaluate(&or), SUCCESS);
        let seq = CommandNode::compound(Operator::Sequential, empty(), empty());
        assert_eq!(executor.evaluate(&seq), SUCCESS);
    }
}
