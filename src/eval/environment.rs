//! The two operations allowed to mutate process-wide state.

use std::ffi::OsStr;
use std::path::PathBuf;

use log::debug;

use crate::error::ExecError;

/// Set an environment variable for this process and every child it forks later.
pub fn set_var(name: &str, value: &str) -> Result<(), ExecError> {
    if name.is_empty() || name.contains(|c| c == '=' || c == '\0') {
        return Err(ExecError::InvalidArgument {
            what: "variable name",
            value: name.to_string(),
        });
    }
    if value.contains('\0') {
        return Err(ExecError::InvalidArgument {
            what: "variable value",
            value: value.to_string(),
        });
    }
    debug!("setenv {name}={value}");
    // SAFETY: the evaluator is single-threaded; no other thread reads the
    // environment concurrently.
    unsafe { std::env::set_var(name, value) };
    Ok(())
}

/// Change the working directory, keeping `OLDPWD` and `PWD` up to date.
pub fn change_dir(target: &OsStr) -> std::io::Result<PathBuf> {
    let previous = std::env::current_dir().ok();
    std::env::set_current_dir(target)?;
    let current = std::env::current_dir()?;

    // SAFETY: as in `set_var`.
    unsafe {
        if let Some(previous) = &previous {
            std::env::set_var("OLDPWD", previous);
        }
        std::env::set_var("PWD", &current);
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_names() {
        assert!(set_var("", "x").is_err());
        assert!(set_var("A=B", "x").is_err());
        assert!(set_var("A\0", "x").is_err());
    }

    #[test]
    fn rejects_nul_in_value() {
        assert!(matches!(
            set_var("SHEXEC_TEST_NUL", "a\0b"),
            Err(ExecError::InvalidArgument { what: "variable value", .. })
        ));
    }
}
