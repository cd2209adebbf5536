//! Error types for the front-end parser and the process layer.

use nix::errno::Errno;
use nix::unistd::Pid;
use std::os::fd::RawFd;
use thiserror::Error;

/// A command line the front-end could not turn into a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unterminated {0} quote")]
    UnterminatedQuote(char),
    #[error("unterminated ${{ expansion")]
    UnterminatedBrace,
    #[error("empty variable name in ${{}}")]
    EmptyVariable,
    #[error("syntax error near {near}: missing command")]
    EmptyCommand { near: String },
    #[error("syntax error: {0} needs a target")]
    MissingRedirectTarget(&'static str),
    #[error("background jobs are not supported (trailing &)")]
    TrailingAmpersand,
}

/// An OS call made while evaluating a node failed.
///
/// These never escape the evaluator: each operator collapses them into a
/// status after logging.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("fork failed: {0}")]
    Fork(#[source] Errno),
    #[error("pipe failed: {0}")]
    Pipe(#[source] Errno),
    #[error("waiting for pid {pid} failed: {source}")]
    Wait {
        pid: Pid,
        #[source]
        source: Errno,
    },
    #[error("{path}: {source}")]
    Redirect {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot install descriptor onto fd {fd}: {source}")]
    Dup {
        fd: RawFd,
        #[source]
        source: Errno,
    },
    #[error("{what} contains a NUL byte: {value:?}")]
    InvalidArgument { what: &'static str, value: String },
}
