//! Opening redirection targets and installing them onto the standard streams.

use std::fs::{File, OpenOptions};
use std::os::fd::OwnedFd;
use std::os::unix::fs::OpenOptionsExt;

use log::{debug, trace};

use crate::error::ExecError;
use crate::eval::process::{self, STDERR, STDIN, STDOUT};
use crate::eval::resolve::WordResolver;
use crate::parse::{IoFlags, SimpleCommand};

/// Applies a command's `<`, `>` and `2>` targets.
pub struct Redirector<'a> {
    resolver: &'a dyn WordResolver,
    /// Permission bits for files created by an output redirection.
    mode: u32,
}

impl<'a> Redirector<'a> {
    pub fn new(resolver: &'a dyn WordResolver, mode: u32) -> Self {
        Self { resolver, mode }
    }

    fn open_input(&self, path: &str) -> Result<File, ExecError> {
        File::open(path).map_err(|source| ExecError::Redirect {
            path: path.to_string(),
            source,
        })
    }

    fn open_output(&self, path: &str, append: bool) -> Result<File, ExecError> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).mode(self.mode);
        if append {
            options.append(true);
        } else {
            options.truncate(true);
        }
        options.open(path).map_err(|source| ExecError::Redirect {
            path: path.to_string(),
            source,
        })
    }

    /// Rebind stdin, stdout and stderr for a child about to exec `cmd`.
    ///
    /// When `out` and `err` have the same unresolved text, the file is
    /// opened once, truncated, and shared by both streams so neither
    /// clobbers the other's output. Append flags do not apply to a shared
    /// target.
    pub fn apply(&self, cmd: &SimpleCommand) -> Result<(), ExecError> {
        if let Some(word) = &cmd.input {
            let path = self.resolver.resolve(word);
            trace!("stdin < {path}");
            process::install(OwnedFd::from(self.open_input(&path)?), &[STDIN])?;
        }

        if let (Some(out), Some(err)) = (&cmd.out, &cmd.err)
            && out.raw() == err.raw()
        {
            let path = self.resolver.resolve(out);
            trace!("stdout, stderr > {path} (shared)");
            let file = self.open_output(&path, false)?;
            return process::install(OwnedFd::from(file), &[STDOUT, STDERR]);
        }

        if let Some(word) = &cmd.out {
            let path = self.resolver.resolve(word);
            let append = cmd.io_flags.contains(IoFlags::OUT_APPEND);
            trace!("stdout > {path} (append: {append})");
            process::install(OwnedFd::from(self.open_output(&path, append)?), &[STDOUT])?;
        }

        if let Some(word) = &cmd.err {
            let path = self.resolver.resolve(word);
            let append = cmd.io_flags.contains(IoFlags::ERR_APPEND);
            trace!("stderr > {path} (append: {append})");
            process::install(OwnedFd::from(self.open_output(&path, append)?), &[STDERR])?;
        }

        Ok(())
    }

    /// Redirections on an in-process builtin.
    ///
    /// The input is opened and closed, the outputs are created (always
    /// truncated, whatever the append flags say), and the error target
    /// replaces this process's stderr. Failures are logged and otherwise
    /// ignored; they never change the builtin's status.
    pub fn touch_for_builtin(&self, cmd: &SimpleCommand) {
        if let Some(word) = &cmd.input {
            let path = self.resolver.resolve(word);
            if let Err(e) = self.open_input(&path) {
                debug!("builtin input redirection: {e}");
            }
        }

        if let Some(word) = &cmd.out {
            let path = self.resolver.resolve(word);
            if let Err(e) = self.open_output(&path, false) {
                debug!("builtin output redirection: {e}");
            }
        }

        if let Some(word) = &cmd.err {
            let path = self.resolver.resolve(word);
            let installed = self
                .open_output(&path, false)
                .and_then(|file| process::install(OwnedFd::from(file), &[STDERR]));
            if let Err(e) = installed {
                debug!("builtin error redirection: {e}");
            }
        }
    }
}
