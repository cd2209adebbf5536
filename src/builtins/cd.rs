use std::ffi::OsString;

use log::debug;

use crate::builtins::Builtin;
use crate::eval::{Executor, ExitStatus, FAILURE, SUCCESS, environment};
use crate::parse::SimpleCommand;

/// Change the evaluator's working directory.
///
/// Only the first argument is considered. None, empty, or `~` means `HOME`;
/// `-` means `OLDPWD`. Any redirection on the command is opened first, so
/// `cd dir > log` still creates `log`.
pub struct CdBuiltin;

impl Builtin for CdBuiltin {
    fn run(&self, cmd: &SimpleCommand, executor: &Executor) -> ExitStatus {
        executor.redirector().touch_for_builtin(cmd);

        let arg = cmd.params.first().map(|w| executor.resolve(w));
        let Some(target) = target_dir(arg.as_deref()) else {
            debug!("cd: {} not set", if arg.as_deref() == Some("-") { "OLDPWD" } else { "HOME" });
            return FAILURE;
        };

        match environment::change_dir(&target) {
            Ok(dir) => {
                debug!("cd: now in {}", dir.display());
                SUCCESS
            }
            Err(e) => {
                debug!("cd: {}: {e}", target.to_string_lossy());
                FAILURE
            }
        }
    }
}

/// Resolve the argument to the directory to enter, or `None` when the
/// variable it refers to is unset.
fn target_dir(arg: Option<&str>) -> Option<OsString> {
    match arg {
        None | Some("") | Some("~") => std::env::var_os("HOME"),
        Some("-") => std::env::var_os("OLDPWD"),
        Some(dir) => Some(OsString::from(dir)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_is_taken_literally() {
        assert_eq!(target_dir(Some("/tmp")), Some(OsString::from("/tmp")));
        assert_eq!(target_dir(Some("./~")), Some(OsString::from("./~")));
    }

    #[test]
    fn home_forms_agree() {
        let home = std::env::var_os("HOME");
        assert_eq!(target_dir(None), home);
        assert_eq!(target_dir(Some("")), home);
        assert_eq!(target_dir(Some("~")), home);
    }

    #[test]
    fn dash_reads_oldpwd() {
        assert_eq!(target_dir(Some("-")), std::env::var_os("OLDPWD"));
    }
}
