//! Word resolution: turning a [`Word`] into the string a command sees.

use crate::parse::{Word, WordPart};

/// Expands words at use time.
pub trait WordResolver {
    fn resolve(&self, word: &Word) -> String;
}

/// Resolves variable references against the current process environment.
///
/// Unset variables, and variables whose value is not valid Unicode, expand
/// to the empty string.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvResolver;

impl WordResolver for EnvResolver {
    fn resolve(&self, word: &Word) -> String {
        resolve_with(word, |name| std::env::var(name).ok())
    }
}

/// Concatenate a word's fragments, looking variables up with `lookup`.
pub fn resolve_with<F>(word: &Word, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::new();
    for part in &word.parts {
        match part {
            WordPart::Literal(text) => out.push_str(text),
            WordPart::Var(name) => {
                if let Some(value) = lookup(name) {
                    out.push_str(&value);
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "USER" => Some("ada".into()),
            "EMPTY" => Some(String::new()),
            _ => None,
        }
    }

    #[test]
    fn literals_concatenate() {
        let word = Word {
            parts: vec![
                WordPart::Literal("foo".into()),
                WordPart::Literal("=".into()),
                WordPart::Literal("bar".into()),
            ],
        };
        assert_eq!(resolve_with(&word, lookup), "foo=bar");
    }

    #[test]
    fn variables_expand_in_place() {
        let word = Word {
            parts: vec![
                WordPart::Literal("/home/".into()),
                WordPart::Var("USER".into()),
                WordPart::Literal("/bin".into()),
            ],
        };
        assert_eq!(resolve_with(&word, lookup), "/home/ada/bin");
    }

    #[test]
    fn unset_variable_is_empty() {
        let word = Word {
            parts: vec![
                WordPart::Literal("[".into()),
                WordPart::Var("NOPE".into()),
                WordPart::Var("EMPTY".into()),
                WordPart::Literal("]".into()),
            ],
        };
        assert_eq!(resolve_with(&word, lookup), "[]");
    }

    #[test]
    fn env_resolver_reads_process_environment() {
        let word = Word {
            parts: vec![WordPart::Var("PATH".into())],
        };
        assert_eq!(
            EnvResolver.resolve(&word),
            std::env::var("PATH").unwrap_or_default()
        );
    }
}
