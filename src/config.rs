use serde::{Deserialize, Serialize};

use crate::eval::ExitStatus;

/// Embedded default configuration.
const DEFAULT_CONFIG: &str = include_str!("../config.default.toml");

/// Location of the user overlay, before `~` expansion.
const USER_CONFIG_PATH: &str = "~/.config/shexec/config.toml";

// ── Final (merged) config types ──

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub builtins: BuiltinsConfig,
    #[serde(default)]
    pub exec: ExecConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Verbs dispatched to in-process builtins.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct BuiltinsConfig {
    #[serde(default)]
    pub cd: Vec<String>,
    #[serde(default)]
    pub exit: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ExecConfig {
    /// Status of a child whose exec failed.
    #[serde(default = "default_not_found_status")]
    pub not_found_status: ExitStatus,
    /// Permission bits for files created by output redirection.
    #[serde(default = "default_file_mode")]
    pub file_mode: u32,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            not_found_status: default_not_found_status(),
            file_mode: default_file_mode(),
        }
    }
}

fn default_not_found_status() -> ExitStatus {
    127
}

fn default_file_mode() -> u32 {
    0o644
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log file path; empty means no file logging.
    #[serde(default)]
    pub file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: String::new(),
        }
    }
}

fn default_log_level() -> String {
    "warn".into()
}

// ── Overlay types (user config that merges with defaults) ──

#[derive(Debug, Deserialize, Default)]
struct ConfigOverlay {
    #[serde(default)]
    builtins: BuiltinsOverlay,
    #[serde(default)]
    exec: ExecOverlay,
    #[serde(default)]
    logging: LoggingOverlay,
}

#[derive(Debug, Deserialize, Default)]
struct BuiltinsOverlay {
    #[serde(default)]
    replace: bool,
    #[serde(default)]
    cd: Vec<String>,
    #[serde(default)]
    exit: Vec<String>,
    #[serde(default)]
    remove_cd: Vec<String>,
    #[serde(default)]
    remove_exit: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
struct ExecOverlay {
    not_found_status: Option<ExitStatus>,
    file_mode: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct LoggingOverlay {
    level: Option<String>,
    file: Option<String>,
}

// ── Merge logic ──

/// Merge a user list into a default list.
/// In replace mode: user list replaces default entirely.
/// In merge mode: remove items first, then extend with additions (deduped).
fn merge_list(base: &mut Vec<String>, add: Vec<String>, remove: &[String], replace: bool) {
    if replace {
        *base = add;
    } else {
        base.retain(|item| !remove.contains(item));
        for item in add {
            if !base.contains(&item) {
                base.push(item);
            }
        }
    }
}

impl Config {
    /// Load the default embedded configuration.
    pub fn default_config() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("embedded default config must parse")
    }

    /// Load configuration with resolution order:
    /// 1. Start with embedded defaults
    /// 2. Merge user overlay from ~/.config/shexec/config.toml (if exists)
    pub fn load() -> Self {
        let mut config = Self::default_config();
        if let Some(overlay) = Self::load_overlay() {
            config.apply_overlay(overlay);
        }
        config
    }

    /// Try to load the user overlay.
    fn load_overlay() -> Option<ConfigOverlay> {
        let path = shellexpand::tilde(USER_CONFIG_PATH).into_owned();
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(overlay) => Some(overlay),
            Err(e) => {
                // Logging is configured from this file, so it is not up yet.
                eprintln!("shexec: config parse error: {e}");
                None
            }
        }
    }

    /// Apply an overlay on top of this config (merge semantics).
    fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        let b = overlay.builtins;
        merge_list(&mut self.builtins.cd, b.cd, &b.remove_cd, b.replace);
        merge_list(&mut self.builtins.exit, b.exit, &b.remove_exit, b.replace);

        if let Some(v) = overlay.exec.not_found_status {
            self.exec.not_found_status = v;
        }
        if let Some(v) = overlay.exec.file_mode {
            self.exec.file_mode = v;
        }

        if let Some(v) = overlay.logging.level {
            self.logging.level = v;
        }
        if let Some(v) = overlay.logging.file {
            self.logging.file = v;
        }
    }

    /// Apply an overlay from a TOML string. Used for testing.
    #[cfg(test)]
    fn apply_overlay_str(&mut self, toml_str: &str) {
        let overlay: ConfigOverlay = toml::from_str(toml_str).unwrap();
        self.apply_overlay(overlay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_parses() {
        let config = Config::default_config();
        assert_eq!(config.builtins.cd, vec!["cd"]);
        assert_eq!(config.builtins.exit, vec!["exit", "quit"]);
        assert_eq!(config.exec.not_found_status, 127);
        assert_eq!(config.exec.file_mode, 0o644);
        assert_eq!(config.logging.level, "warn");
        assert!(config.logging.file.is_empty());
    }

    #[test]
    fn overlay_extends_builtins() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [builtins]
            exit = ["logout"]
        "#,
        );
        assert_eq!(config.builtins.exit, vec!["exit", "quit", "logout"]);
        assert_eq!(config.builtins.cd, vec!["cd"]);
    }

    #[test]
    fn overlay_removes_builtin() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [builtins]
            remove_exit = ["quit"]
        "#,
        );
        assert_eq!(config.builtins.exit, vec!["exit"]);
    }

    #[test]
    fn overlay_replace_builtins() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [builtins]
            replace = true
            cd = ["chdir"]
        "#,
        );
        assert_eq!(config.builtins.cd, vec!["chdir"]);
        assert!(config.builtins.exit.is_empty());
    }

    #[test]
    fn overlay_no_duplicates() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [builtins]
            cd = ["cd"]
        "#,
        );
        assert_eq!(config.builtins.cd, vec!["cd"]);
    }

    #[test]
    fn overlay_scalars_override() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [exec]
            not_found_status = 1
            file_mode = 0o600

            [logging]
            level = "debug"
            file = "~/shexec.log"
        "#,
        );
        assert_eq!(config.exec.not_found_status, 1);
        assert_eq!(config.exec.file_mode, 0o600);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, "~/shexec.log");
    }

    #[test]
    fn omitted_sections_unchanged() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [logging]
            level = "trace"
        "#,
        );
        assert_eq!(config.exec.not_found_status, 127);
        assert_eq!(config.builtins.exit, vec!["exit", "quit"]);
    }

    #[test]
    fn empty_overlay_changes_nothing() {
        let mut config = Config::default_config();
        config.apply_overlay_str("");
        assert_eq!(config.builtins.cd, vec!["cd"]);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn dumps_back_to_toml() {
        let config = Config::default_config();
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("[builtins]"));
        assert!(text.contains("not_found_status = 127"));
    }
}
