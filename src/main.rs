//! shexec: evaluate shell command lines or pre-parsed command trees.
//!
//! Input, in order of precedence:
//!   - `-c LINE`: a single command line
//!   - `--tree FILE`: a JSON command tree written by an external parser
//!   - otherwise stdin, one command line per line
//!
//! The process exits with the status of the last evaluated tree.

use std::io::Read;

use shexec::config::Config;
use shexec::eval::{Executor, ExitStatus, SUCCESS};
use shexec::parse::{self, CommandNode};

/// Status for usage, parse and tree-loading errors.
const USAGE_ERROR: ExitStatus = 2;

const USAGE: &str = "usage: shexec [--verbose] [--dump-config] [--dump-tree] [-c LINE | --tree FILE]";

#[derive(Debug, Default)]
struct Options {
    verbose: bool,
    dump_config: bool,
    dump_tree: bool,
    command: Option<String>,
    tree: Option<String>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Options, String> {
    let mut opts = Options::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-v" | "--verbose" => opts.verbose = true,
            "--dump-config" => opts.dump_config = true,
            "--dump-tree" => opts.dump_tree = true,
            "-c" => {
                opts.command = Some(args.next().ok_or("-c requires a command line")?);
            }
            "--tree" => {
                opts.tree = Some(args.next().ok_or("--tree requires a file")?);
            }
            "-h" | "--help" => return Err(String::new()),
            other => return Err(format!("unknown argument: {other}")),
        }
    }
    Ok(opts)
}

/// Evaluate a tree, or print it as JSON when `--dump-tree` was given.
fn run_tree(executor: &Executor, tree: &CommandNode, dump: bool) -> ExitStatus {
    if dump {
        match serde_json::to_string_pretty(tree) {
            Ok(json) => {
                println!("{json}");
                return SUCCESS;
            }
            Err(e) => {
                eprintln!("shexec: cannot serialize tree: {e}");
                return USAGE_ERROR;
            }
        }
    }
    executor.evaluate(tree)
}

fn run_line(executor: &Executor, line: &str, dump: bool) -> ExitStatus {
    match parse::parse(line) {
        Ok(Some(tree)) => run_tree(executor, &tree, dump),
        Ok(None) => SUCCESS,
        Err(e) => {
            eprintln!("shexec: {e}");
            USAGE_ERROR
        }
    }
}

fn run_tree_file(executor: &Executor, path: &str, dump: bool) -> ExitStatus {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("shexec: {path}: {e}");
            return USAGE_ERROR;
        }
    };
    match serde_json::from_str::<CommandNode>(&text) {
        Ok(tree) => run_tree(executor, &tree, dump),
        Err(e) => {
            eprintln!("shexec: {path}: invalid command tree: {e}");
            USAGE_ERROR
        }
    }
}

fn run_stdin(executor: &Executor, dump: bool) -> ExitStatus {
    let mut input = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut input) {
        eprintln!("shexec: failed to read stdin: {e}");
        return USAGE_ERROR;
    }

    let mut status = SUCCESS;
    for line in input.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        status = run_line(executor, line, dump);
    }
    status
}

fn main() {
    let opts = match parse_args(std::env::args().skip(1)) {
        Ok(opts) => opts,
        Err(msg) => {
            if msg.is_empty() {
                println!("{USAGE}");
                std::process::exit(0);
            }
            eprintln!("shexec: {msg}");
            eprintln!("{USAGE}");
            std::process::exit(USAGE_ERROR);
        }
    };

    let config = Config::load();

    if opts.dump_config {
        match toml::to_string_pretty(&config) {
            Ok(text) => print!("{text}"),
            Err(e) => {
                eprintln!("shexec: cannot serialize config: {e}");
                std::process::exit(USAGE_ERROR);
            }
        }
        std::process::exit(0);
    }

    shexec::logging::init(&config.logging, opts.verbose);
    let executor = Executor::from_config(&config);

    let status = if let Some(line) = &opts.command {
        run_line(&executor, line, opts.dump_tree)
    } else if let Some(path) = &opts.tree {
        run_tree_file(&executor, path, opts.dump_tree)
    } else {
        run_stdin(&executor, opts.dump_tree)
    };

    std::process::exit(status);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_flags() {
        let opts = parse_args(args(&["--verbose", "--dump-tree", "-c", "ls | wc"])).unwrap();
        assert!(opts.verbose);
        assert!(opts.dump_tree);
        assert!(!opts.dump_config);
        assert_eq!(opts.command.as_deref(), Some("ls | wc"));
        assert!(opts.tree.is_none());
    }

    #[test]
    fn missing_values_are_errors() {
        assert!(parse_args(args(&["-c"])).is_err());
        assert!(parse_args(args(&["--tree"])).is_err());
    }

    #[test]
    fn unknown_argument_is_error() {
        let err = parse_args(args(&["--frobnicate"])).unwrap_err();
        assert!(err.contains("--frobnicate"));
    }

    #[test]
    fn help_is_empty_error() {
        assert_eq!(parse_args(args(&["--help"])).unwrap_err(), "");
    }
}
