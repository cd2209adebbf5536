//! Command tree types handed to the evaluator.
//!
//! These are produced by the front-end parser in this module or deserialized
//! from JSON written by an external parser. The evaluator never mutates them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One fragment of a [`Word`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WordPart {
    /// Text taken verbatim.
    Literal(String),
    /// `$NAME` / `${NAME}`, expanded at use time.
    Var(String),
}

/// A parsed token: literal text interleaved with variable references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub parts: Vec<WordPart>,
}

impl Word {
    /// A word made of a single literal fragment.
    pub fn literal(text: impl Into<String>) -> Self {
        Self {
            parts: vec![WordPart::Literal(text.into())],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// The word's text when it has no variable references.
    pub fn as_literal(&self) -> Option<String> {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                WordPart::Literal(s) => out.push_str(s),
                WordPart::Var(_) => return None,
            }
        }
        Some(out)
    }

    /// The unresolved text: fragments concatenated, variable references
    /// written as `${NAME}`.
    pub fn raw(&self) -> String {
        let mut raw = String::new();
        for part in &self.parts {
            match part {
                WordPart::Literal(s) => raw.push_str(s),
                WordPart::Var(name) => {
                    raw.push_str("${");
                    raw.push_str(name);
                    raw.push('}');
                }
            }
        }
        raw
    }

    /// Split an assignment head `NAME = value...` into its name and value.
    ///
    /// The parser emits assignment verbs as `[Literal(name), Literal("="), value...]`.
    pub fn assignment(&self) -> Option<(&str, Word)> {
        match self.parts.as_slice() {
            [WordPart::Literal(name), WordPart::Literal(eq), rest @ ..] if eq == "=" => {
                Some((name.as_str(), Word { parts: rest.to_vec() }))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw = self.raw();
        match shlex::try_quote(&raw) {
            Ok(quoted) => f.write_str(&quoted),
            Err(_) => f.write_str(&raw),
        }
    }
}

/// Append-vs-truncate choices for output redirections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoFlags(u8);

impl IoFlags {
    pub const OUT_APPEND: IoFlags = IoFlags(0b01);
    pub const ERR_APPEND: IoFlags = IoFlags(0b10);

    pub fn empty() -> Self {
        Self(0)
    }

    pub fn contains(self, other: IoFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: IoFlags) {
        self.0 |= other.0;
    }
}

/// A leaf execution unit: builtin, assignment or external program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleCommand {
    pub verb: Word,
    #[serde(default)]
    pub params: Vec<Word>,
    #[serde(default, rename = "in")]
    pub input: Option<Word>,
    #[serde(default)]
    pub out: Option<Word>,
    #[serde(default)]
    pub err: Option<Word>,
    #[serde(default)]
    pub io_flags: IoFlags,
}

impl SimpleCommand {
    /// A command with a literal verb and literal arguments.
    pub fn new(verb: &str, params: &[&str]) -> Self {
        Self {
            verb: Word::literal(verb),
            params: params.iter().map(|p| Word::literal(*p)).collect(),
            ..Self::default()
        }
    }
}

impl fmt::Display for SimpleCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.verb.assignment() {
            Some((name, value)) => write!(f, "{name}={value}")?,
            None => write!(f, "{}", self.verb)?,
        }
        for param in &self.params {
            write!(f, " {param}")?;
        }
        if let Some(w) = &self.input {
            write!(f, " < {w}")?;
        }
        if let Some(w) = &self.out {
            let op = if self.io_flags.contains(IoFlags::OUT_APPEND) { ">>" } else { ">" };
            write!(f, " {op} {w}")?;
        }
        if let Some(w) = &self.err {
            let op = if self.io_flags.contains(IoFlags::ERR_APPEND) { "2>>" } else { "2>" };
            write!(f, " {op} {w}")?;
        }
        Ok(())
    }
}

/// Operator joining the two children of a compound node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// `;`: run both, one after the other
    Sequential,
    /// `&`: run both at once
    Parallel,
    /// `||`: run the second only if the first failed
    CondNonzero,
    /// `&&`: run the second only if the first succeeded
    CondZero,
    /// `|`: first's stdout feeds second's stdin
    Pipe,
    /// Any tag this evaluator does not know; only reachable through JSON input.
    #[serde(other)]
    Unsupported,
}

impl Operator {
    /// The operator's shell syntax.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Sequential => ";",
            Operator::Parallel => "&",
            Operator::CondNonzero => "||",
            Operator::CondZero => "&&",
            Operator::Pipe => "|",
            Operator::Unsupported => "?",
        }
    }
}

/// A node of the command tree: a leaf command or an operator over two subtrees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandNode {
    Simple(SimpleCommand),
    Compound {
        op: Operator,
        cmd1: Box<CommandNode>,
        cmd2: Box<CommandNode>,
    },
}

impl CommandNode {
    pub fn compound(op: Operator, cmd1: CommandNode, cmd2: CommandNode) -> Self {
        CommandNode::Compound {
            op,
            cmd1: Box::new(cmd1),
            cmd2: Box::new(cmd2),
        }
    }

    /// `None` for leaves.
    pub fn operator(&self) -> Option<Operator> {
        match self {
            CommandNode::Simple(_) => None,
            CommandNode::Compound { op, .. } => Some(*op),
        }
    }
}

impl fmt::Display for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandNode::Simple(s) => write!(f, "{s}"),
            CommandNode::Compound { op, cmd1, cmd2 } => {
                write!(f, "{cmd1} {} {cmd2}", op.as_str())
            }
        }
    }
}
