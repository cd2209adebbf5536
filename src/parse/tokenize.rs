//! Lexer for the command-line front-end.

use crate::error::ParseError;
use crate::parse::types::{Operator, Word, WordPart};

/// Which stream a redirection token rebinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectKind {
    /// `<`
    In,
    /// `>`
    Out,
    /// `>>`
    OutAppend,
    /// `2>`
    Err,
    /// `2>>`
    ErrAppend,
    /// `&>`: stdout and stderr to the same target
    Both,
    /// `&>>`
    BothAppend,
}

impl RedirectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RedirectKind::In => "<",
            RedirectKind::Out => ">",
            RedirectKind::OutAppend => ">>",
            RedirectKind::Err => "2>",
            RedirectKind::ErrAppend => "2>>",
            RedirectKind::Both => "&>",
            RedirectKind::BothAppend => "&>>",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Word(Word),
    Op(Operator),
    Redirect(RedirectKind),
}

/// True for a valid environment variable name.
pub fn is_name(s: &str) -> bool {
    !s.is_empty()
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && s.chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
}

/// Accumulates one word's fragments while scanning.
#[derive(Default)]
struct WordBuilder {
    parts: Vec<WordPart>,
    buf: String,
    /// Something (even an empty quote pair) has been seen.
    started: bool,
    /// Part of the word was quoted or escaped.
    quoted: bool,
}

impl WordBuilder {
    fn push(&mut self, c: char) {
        self.started = true;
        self.buf.push(c);
    }

    fn mark_quoted(&mut self) {
        self.started = true;
        self.quoted = true;
    }

    fn push_var(&mut self, name: String) {
        self.flush_literal();
        self.started = true;
        self.parts.push(WordPart::Var(name));
    }

    fn flush_literal(&mut self) {
        if !self.buf.is_empty() {
            self.parts.push(WordPart::Literal(std::mem::take(&mut self.buf)));
        }
    }

    /// An unquoted `=`. Right after a plain name it becomes an assignment
    /// head: `NAME`, `=`, then whatever follows.
    fn push_equals(&mut self) {
        if !self.quoted && self.parts.is_empty() && is_name(&self.buf) {
            self.flush_literal();
            self.parts.push(WordPart::Literal("=".into()));
            self.started = true;
        } else {
            self.push('=');
        }
    }

    /// The word is exactly the unquoted text `s` so far.
    fn is_plain(&self, s: &str) -> bool {
        !self.quoted && self.parts.is_empty() && self.buf == s
    }

    fn finish(&mut self) -> Option<Word> {
        if !self.started {
            return None;
        }
        self.flush_literal();
        let mut parts = std::mem::take(&mut self.parts);
        if parts.is_empty() {
            // `""` and `''` are real, empty words.
            parts.push(WordPart::Literal(String::new()));
        }
        *self = Self::default();
        Some(Word { parts })
    }

    fn flush_into(&mut self, tokens: &mut Vec<Token>) {
        if let Some(word) = self.finish() {
            tokens.push(Token::Word(word));
        }
    }
}

/// Scan a `$` reference starting at `chars[i]`; returns the index after it.
fn lex_variable(chars: &[char], i: usize, word: &mut WordBuilder) -> Result<usize, ParseError> {
    let len = chars.len();
    match chars.get(i + 1) {
        Some('{') => {
            let start = i + 2;
            let end = (start..len)
                .find(|&j| chars[j] == '}')
                .ok_or(ParseError::UnterminatedBrace)?;
            let name: String = chars[start..end].iter().collect();
            if name.is_empty() {
                return Err(ParseError::EmptyVariable);
            }
            word.push_var(name);
            Ok(end + 1)
        }
        Some(&c) if c.is_ascii_alphabetic() || c == '_' => {
            let mut j = i + 1;
            while j < len && (chars[j].is_ascii_alphanumeric() || chars[j] == '_') {
                j += 1;
            }
            word.push_var(chars[i + 1..j].iter().collect());
            Ok(j)
        }
        _ => {
            word.push('$');
            Ok(i + 1)
        }
    }
}

/// Split a command line into words, operators and redirections.
///
/// Single quotes are literal. Double quotes keep `$NAME`/`${NAME}` live and
/// honor `\"`, `\\` and `\$`. A backslash outside quotes escapes the next
/// character. An unquoted `#` at the start of a word begins a comment.
pub fn tokenize(line: &str) -> Result<Vec<Token>, ParseError> {
    let chars: Vec<char> = line.chars().collect();
    let len = chars.len();
    let mut tokens = Vec::new();
    let mut word = WordBuilder::default();
    let mut i = 0;
    let (mut sq, mut dq) = (false, false);

    while i < len {
        let c = chars[i];

        if sq {
            if c == '\'' {
                sq = false;
            } else {
                word.push(c);
            }
            i += 1;
            continue;
        }

        if dq {
            match c {
                '"' => {
                    dq = false;
                    i += 1;
                }
                '\\' if i + 1 < len && matches!(chars[i + 1], '"' | '\\' | '$') => {
                    word.push(chars[i + 1]);
                    i += 2;
                }
                '$' => i = lex_variable(&chars, i, &mut word)?,
                _ => {
                    word.push(c);
                    i += 1;
                }
            }
            continue;
        }

        match c {
            '\'' => {
                sq = true;
                word.mark_quoted();
                i += 1;
            }
            '"' => {
                dq = true;
                word.mark_quoted();
                i += 1;
            }
            '\\' => {
                word.mark_quoted();
                if let Some(&next) = chars.get(i + 1) {
                    word.push(next);
                }
                i += 2;
            }
            '$' => i = lex_variable(&chars, i, &mut word)?,
            '=' => {
                word.push_equals();
                i += 1;
            }
            '#' if !word.started => break,
            c if c.is_whitespace() => {
                word.flush_into(&mut tokens);
                i += 1;
            }
            ';' => {
                word.flush_into(&mut tokens);
                tokens.push(Token::Op(Operator::Sequential));
                i += 1;
            }
            '|' => {
                word.flush_into(&mut tokens);
                if chars.get(i + 1) == Some(&'|') {
                    tokens.push(Token::Op(Operator::CondNonzero));
                    i += 2;
                } else {
                    tokens.push(Token::Op(Operator::Pipe));
                    i += 1;
                }
            }
            '&' => {
                word.flush_into(&mut tokens);
                match (chars.get(i + 1), chars.get(i + 2)) {
                    (Some('&'), _) => {
                        tokens.push(Token::Op(Operator::CondZero));
                        i += 2;
                    }
                    (Some('>'), Some('>')) => {
                        tokens.push(Token::Redirect(RedirectKind::BothAppend));
                        i += 3;
                    }
                    (Some('>'), _) => {
                        tokens.push(Token::Redirect(RedirectKind::Both));
                        i += 2;
                    }
                    _ => {
                        tokens.push(Token::Op(Operator::Parallel));
                        i += 1;
                    }
                }
            }
            '<' => {
                word.flush_into(&mut tokens);
                tokens.push(Token::Redirect(RedirectKind::In));
                i += 1;
            }
            '>' => {
                let stderr = word.is_plain("2");
                if stderr {
                    word = WordBuilder::default();
                } else {
                    word.flush_into(&mut tokens);
                }
                let append = chars.get(i + 1) == Some(&'>');
                let kind = match (stderr, append) {
                    (true, true) => RedirectKind::ErrAppend,
                    (true, false) => RedirectKind::Err,
                    (false, true) => RedirectKind::OutAppend,
                    (false, false) => RedirectKind::Out,
                };
                tokens.push(Token::Redirect(kind));
                i += if append { 2 } else { 1 };
            }
            _ => {
                word.push(c);
                i += 1;
            }
        }
    }

    if sq {
        return Err(ParseError::UnterminatedQuote('\''));
    }
    if dq {
        return Err(ParseError::UnterminatedQuote('"'));
    }
    word.flush_into(&mut tokens);
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(s: &str) -> WordPart {
        WordPart::Literal(s.into())
    }

    fn var(s: &str) -> WordPart {
        WordPart::Var(s.into())
    }

    fn words(line: &str) -> Vec<Vec<WordPart>> {
        tokenize(line)
            .unwrap()
            .into_iter()
            .filter_map(|t| match t {
                Token::Word(w) => Some(w.parts),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn is_name_rules() {
        assert!(is_name("FOO_1"));
        assert!(is_name("_x"));
        assert!(!is_name("1A"));
        assert!(!is_name(""));
        assert!(!is_name("A-B"));
    }

    #[test]
    fn splits_on_whitespace() {
        assert_eq!(
            words("ls  -la\t/tmp"),
            vec![vec![lit("ls")], vec![lit("-la")], vec![lit("/tmp")]]
        );
    }

    #[test]
    fn single_quotes_are_literal() {
        assert_eq!(words("echo '$HOME a;b'"), vec![vec![lit("echo")], vec![lit("$HOME a;b")]]);
    }

    #[test]
    fn double_quotes_expand_variables() {
        assert_eq!(
            words("echo \"x $USER y\""),
            vec![vec![lit("echo")], vec![lit("x "), var("USER"), lit(" y")]]
        );
    }

    #[test]
    fn braced_variable() {
        assert_eq!(words("${HOME}/bin"), vec![vec![var("HOME"), lit("/bin")]]);
    }

    #[test]
    fn lone_dollar_is_literal() {
        assert_eq!(words("echo $ $1"), vec![vec![lit("echo")], vec![lit("$")], vec![lit("$1")]]);
    }

    #[test]
    fn empty_quotes_make_a_word() {
        assert_eq!(words("cd ''"), vec![vec![lit("cd")], vec![lit("")]]);
    }

    #[test]
    fn assignment_head_is_split() {
        assert_eq!(
            words("FOO=bar$X"),
            vec![vec![lit("FOO"), lit("="), lit("bar"), var("X")]]
        );
    }

    #[test]
    fn quoted_equals_is_not_assignment() {
        assert_eq!(words("'FOO'=bar"), vec![vec![lit("FOO=bar")]]);
        assert_eq!(words("a-b=c"), vec![vec![lit("a-b=c")]]);
    }

    #[test]
    fn operators() {
        let ops: Vec<Token> = tokenize("a;b|c||d&&e&f")
            .unwrap()
            .into_iter()
            .filter(|t| matches!(t, Token::Op(_)))
            .collect();
        assert_eq!(
            ops,
            vec![
                Token::Op(Operator::Sequential),
                Token::Op(Operator::Pipe),
                Token::Op(Operator::CondNonzero),
                Token::Op(Operator::CondZero),
                Token::Op(Operator::Parallel),
            ]
        );
    }

    #[test]
    fn redirections() {
        let kinds: Vec<RedirectKind> = tokenize("c <in >out >>app 2>err 2>>eapp &>both &>>bapp")
            .unwrap()
            .into_iter()
            .filter_map(|t| match t {
                Token::Redirect(k) => Some(k),
                _ => None,
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                RedirectKind::In,
                RedirectKind::Out,
                RedirectKind::OutAppend,
                RedirectKind::Err,
                RedirectKind::ErrAppend,
                RedirectKind::Both,
                RedirectKind::BothAppend,
            ]
        );
    }

    #[test]
    fn quoted_two_is_an_argument() {
        let tokens = tokenize("echo '2'>f").unwrap();
        assert_eq!(tokens[1], Token::Word(Word::literal("2")));
        assert_eq!(tokens[2], Token::Redirect(RedirectKind::Out));
    }

    #[test]
    fn comment_ends_line() {
        assert_eq!(words("ls # trailing"), vec![vec![lit("ls")]]);
        assert_eq!(words("echo a#b"), vec![vec![lit("echo")], vec![lit("a#b")]]);
    }

    #[test]
    fn unterminated_input() {
        assert_eq!(tokenize("echo 'abc"), Err(ParseError::UnterminatedQuote('\'')));
        assert_eq!(tokenize("echo \"abc"), Err(ParseError::UnterminatedQuote('"')));
        assert_eq!(tokenize("echo ${abc"), Err(ParseError::UnterminatedBrace));
        assert_eq!(tokenize("echo ${}"), Err(ParseError::EmptyVariable));
    }
}
