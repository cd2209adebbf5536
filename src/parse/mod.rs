pub mod shell;
pub mod tokenize;
pub mod types;

pub use shell::parse;
pub use tokenize::{RedirectKind, Token, tokenize};
pub use types::{CommandNode, IoFlags, Operator, SimpleCommand, Word, WordPart};
