//! shexec: the execution engine of a small POSIX-style shell.
//!
//! Given an already-parsed command tree, the evaluator runs every node
//! against fork/exec, pipes and `dup2`, and reports an integer exit status
//! (0 = success). Trees combine leaf commands with five operators:
//! sequence (`;`), parallel (`&`), the two conditionals (`&&`, `||`), and
//! pipe (`|`). Concurrency is process-based throughout: a parallel or piped
//! pair runs as two forked children that evaluate their subtree and exit
//! with its status.
//!
//! # Architecture
//!
//! - **[`eval`]**: operator dispatch, leaf commands, the parallel and pipe runners.
//! - **[`builtins`]**: In-process commands (`cd`, `exit`/`quit`).
//! - **[`parse`]**: Tree types plus a small front-end that builds trees from command lines.
//! - **[`config`]**: embedded defaults + user overlay merge.
//! - **[`logging`]**: `log` records routed through simplelog to a file and/or stderr.
//! - **[`error`]**: Parser and OS-call error types.

/// In-process builtin commands.
pub mod builtins;
/// Configuration types, loading, and overlay merge logic.
pub mod config;
/// Error types shared by the parser and the evaluator.
pub mod error;
/// Tree evaluator and process orchestration.
pub mod eval;
/// Logger setup.
pub mod logging;
/// Command tree types and the command-line front-end.
pub mod parse;

use error::ParseError;
use eval::{ExitStatus, SUCCESS};
use parse::CommandNode;

/// Evaluate a tree with the default configuration.
///
/// This is the main entry point for tests and simple usage.
/// For user config or a custom word resolver, build an [`eval::Executor`] directly.
pub fn evaluate(root: &CommandNode) -> ExitStatus {
    eval::Executor::default().evaluate(root)
}

/// Parse a command line and evaluate it with the default configuration.
///
/// A blank line evaluates to success.
pub fn run(line: &str) -> Result<ExitStatus, ParseError> {
    Ok(match parse::parse(line)? {
        Some(tree) => evaluate(&tree),
        None => SUCCESS,
    })
}
