//! Leaf commands: builtins, assignments and external programs.

use std::ffi::CString;

use log::{debug, warn};
use nix::errno::Errno;
use nix::unistd::execvp;

use crate::error::ExecError;
use crate::eval::status::{self, ExitStatus, FAILURE, INTERNAL_ERROR, SUCCESS};
use crate::eval::{Executor, environment, process};
use crate::parse::{SimpleCommand, Word};

impl Executor {
    /// Run one leaf command.
    pub(crate) fn run_simple(&self, cmd: &SimpleCommand) -> ExitStatus {
        if cmd.verb.is_empty() {
            return SUCCESS;
        }

        if let Some(name) = cmd.verb.as_literal()
            && let Some(builtin) = self.builtin(&name)
        {
            debug!("builtin {name}");
            return builtin.run(cmd, self);
        }

        if let Some((name, value)) = cmd.verb.assignment() {
            return self.assign(name, &value);
        }

        self.run_external(cmd)
    }

    /// `NAME=value`: visible to this process and everything it forks afterwards.
    fn assign(&self, name: &str, value: &Word) -> ExitStatus {
        let value = self.resolve(value);
        match environment::set_var(name, &value) {
            Ok(()) => SUCCESS,
            Err(e) => {
                debug!("assignment failed: {e}");
                INTERNAL_ERROR
            }
        }
    }

    /// Fork, exec the program in the child, and wait for it.
    fn run_external(&self, cmd: &SimpleCommand) -> ExitStatus {
        let pid = match process::spawn(|| self.exec_child(cmd)) {
            Ok(pid) => pid,
            Err(e) => {
                warn!("{}: {e}", cmd.verb);
                return INTERNAL_ERROR;
            }
        };

        match process::wait(pid) {
            Ok(wait_status) => status::from_wait(wait_status),
            Err(e) => {
                warn!("{}: {e}", cmd.verb);
                INTERNAL_ERROR
            }
        }
    }

    /// Child side of [`run_external`](Self::run_external). Only returns if
    /// redirection or exec failed.
    fn exec_child(&self, cmd: &SimpleCommand) -> ExitStatus {
        if let Err(e) = self.redirector().apply(cmd) {
            eprintln!("shexec: {e}");
            return FAILURE;
        }

        let verb = self.resolve(&cmd.verb);
        let argv = match self.argv(&verb, &cmd.params) {
            Ok(argv) => argv,
            Err(e) => {
                eprintln!("shexec: {e}");
                return FAILURE;
            }
        };

        process::reset_sigpipe();
        let errno = match execvp(&argv[0], &argv) {
            Ok(never) => match never {},
            Err(errno) => errno,
        };
        if errno == Errno::ENOENT {
            eprintln!("shexec: {verb}: command not found");
        } else {
            eprintln!("shexec: {verb}: {}", errno.desc());
        }
        self.not_found_status
    }

    /// `verb` followed by every resolved parameter.
    fn argv(&self, verb: &str, params: &[Word]) -> Result<Vec<CString>, ExecError> {
        let mut argv = Vec::with_capacity(params.len() + 1);
        argv.push(to_cstring(verb.to_string())?);
        for param in params {
            argv.push(to_cstring(self.resolve(param))?);
        }
        Ok(argv)
    }
}

fn to_cstring(arg: String) -> Result<CString, ExecError> {
    CString::new(arg).map_err(|e| ExecError::InvalidArgument {
        what: "argument",
        value: String::from_utf8_lossy(&e.into_vec()).into_owned(),
    })
}

