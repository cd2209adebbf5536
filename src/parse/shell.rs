use super::tokenize::{RedirectKind, Token, tokenize};
use super::types::{CommandNode, IoFlags, Operator, SimpleCommand};
use crate::error::ParseError;

/// Parse a command line into a tree.
///
/// Returns `Ok(None)` for a blank or comment-only line. Operators bind, from
/// loosest to tightest: `;`, `&`, `&&`/`||`, `|`, each left-associative.
pub fn parse(line: &str) -> Result<Option<CommandNode>, ParseError> {
    let tokens = tokenize(line)?;
    if tokens.is_empty() {
        return Ok(None);
    }
    let mut parser = Parser { tokens, pos: 0 };
    let node = parser.sequence()?;
    match parser.peek() {
        None => Ok(Some(node)),
        Some(token) => Err(ParseError::EmptyCommand {
            near: describe(Some(token)),
        }),
    }
}

fn describe(token: Option<&Token>) -> String {
    match token {
        None => "end of input".into(),
        Some(Token::Op(op)) => format!("`{}`", op.as_str()),
        Some(Token::Redirect(kind)) => format!("`{}`", kind.as_str()),
        Some(Token::Word(word)) => format!("`{word}`"),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    /// Consume the next token if it is one of `ops`.
    fn eat_op(&mut self, ops: &[Operator]) -> Option<Operator> {
        match self.peek() {
            Some(Token::Op(op)) if ops.contains(op) => {
                let op = *op;
                self.pos += 1;
                Some(op)
            }
            _ => None,
        }
    }

    fn sequence(&mut self) -> Result<CommandNode, ParseError> {
        let mut node = self.parallel()?;
        while self.eat_op(&[Operator::Sequential]).is_some() {
            if self.peek().is_none() {
                break;
            }
            let rhs = self.parallel()?;
            node = CommandNode::compound(Operator::Sequential, node, rhs);
        }
        Ok(node)
    }

    fn parallel(&mut self) -> Result<CommandNode, ParseError> {
        let mut node = self.conditional()?;
        while self.eat_op(&[Operator::Parallel]).is_some() {
            if matches!(self.peek(), None | Some(Token::Op(Operator::Sequential))) {
                return Err(ParseError::TrailingAmpersand);
            }
            let rhs = self.conditional()?;
            node = CommandNode::compound(Operator::Parallel, node, rhs);
        }
        Ok(node)
    }

    fn conditional(&mut self) -> Result<CommandNode, ParseError> {
        let mut node = self.pipeline()?;
        while let Some(op) = self.eat_op(&[Operator::CondZero, Operator::CondNonzero]) {
            let rhs = self.pipeline()?;
            node = CommandNode::compound(op, node, rhs);
        }
        Ok(node)
    }

    fn pipeline(&mut self) -> Result<CommandNode, ParseError> {
        let mut node = self.simple()?;
        while self.eat_op(&[Operator::Pipe]).is_some() {
            let rhs = self.simple()?;
            node = CommandNode::compound(Operator::Pipe, node, rhs);
        }
        Ok(node)
    }

    fn simple(&mut self) -> Result<CommandNode, ParseError> {
        let mut words = Vec::new();
        let mut cmd = SimpleCommand::default();

        loop {
            match self.peek() {
                Some(Token::Word(_)) => {
                    if let Some(Token::Word(word)) = self.next() {
                        words.push(word);
                    }
                }
                Some(Token::Redirect(kind)) => {
                    let kind = *kind;
                    self.pos += 1;
                    let Some(Token::Word(target)) = self.next() else {
                        return Err(ParseError::MissingRedirectTarget(kind.as_str()));
                    };
                    match kind {
                        RedirectKind::In => cmd.input = Some(target),
                        RedirectKind::Out | RedirectKind::OutAppend => {
                            if kind == RedirectKind::OutAppend {
                                cmd.io_flags.insert(IoFlags::OUT_APPEND);
                            }
                            cmd.out = Some(target);
                        }
                        RedirectKind::Err | RedirectKind::ErrAppend => {
                            if kind == RedirectKind::ErrAppend {
                                cmd.io_flags.insert(IoFlags::ERR_APPEND);
                            }
                            cmd.err = Some(target);
                        }
                        RedirectKind::Both | RedirectKind::BothAppend => {
                            if kind == RedirectKind::BothAppend {
                                cmd.io_flags.insert(IoFlags::OUT_APPEND);
                                cmd.io_flags.insert(IoFlags::ERR_APPEND);
                            }
                            cmd.out = Some(target.clone());
                            cmd.err = Some(target);
                        }
                    }
                }
                _ => break,
            }
        }

        let mut words = words.into_iter();
        let Some(verb) = words.next() else {
            return Err(ParseError::EmptyCommand {
                near: describe(self.peek()),
            });
        };
        cmd.verb = verb;
        cmd.params = words.collect();
        Ok(CommandNode::Simple(cmd))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::types::Word;

    fn parsed(line: &str) -> CommandNode {
        parse(line).unwrap().unwrap()
    }

    fn leaf(verb: &str, params: &[&str]) -> CommandNode {
        CommandNode::Simple(SimpleCommand::new(verb, params))
    }

    #[test]
    fn blank_and_comment_lines() {
        assert_eq!(parse("   "), Ok(None));
        assert_eq!(parse("# just a note"), Ok(None));
    }

    #[test]
    fn simple_command() {
        assert_eq!(parsed("ls -la /tmp"), leaf("ls", &["-la", "/tmp"]));
    }

    #[test]
    fn sequence_is_left_associative() {
        assert_eq!(
            parsed("a; b; c"),
            CommandNode::compound(
                Operator::Sequential,
                CommandNode::compound(Operator::Sequential, leaf("a", &[]), leaf("b", &[])),
                leaf("c", &[]),
            )
        );
    }

    #[test]
    fn pipe_binds_tighter_than_and() {
        assert_eq!(
            parsed("a | b && c"),
            CommandNode::compound(
                Operator::CondZero,
                CommandNode::compound(Operator::Pipe, leaf("a", &[]), leaf("b", &[])),
                leaf("c", &[]),
            )
        );
    }

    #[test]
    fn parallel_sits_between_sequence_and_conditionals() {
        assert_eq!(
            parsed("a || b & c ; d"),
            CommandNode::compound(
                Operator::Sequential,
                CommandNode::compound(
                    Operator::Parallel,
                    CommandNode::compound(Operator::CondNonzero, leaf("a", &[]), leaf("b", &[])),
                    leaf("c", &[]),
                ),
                leaf("d", &[]),
            )
        );
    }

    #[test]
    fn trailing_semicolon_allowed() {
        assert_eq!(parsed("true;"), leaf("true", &[]));
    }

    #[test]
    fn trailing_ampersand_rejected() {
        assert_eq!(parse("sleep 1 &"), Err(ParseError::TrailingAmpersand));
        assert_eq!(parse("sleep 1 & ; ls"), Err(ParseError::TrailingAmpersand));
    }

    #[test]
    fn redirections_fill_fields() {
        let CommandNode::Simple(cmd) = parsed("sort < in > out 2>> err") else {
            panic!("expected a leaf");
        };
        assert_eq!(cmd.verb, Word::literal("sort"));
        assert_eq!(cmd.input, Some(Word::literal("in")));
        assert_eq!(cmd.out, Some(Word::literal("out")));
        assert_eq!(cmd.err, Some(Word::literal("err")));
        assert!(!cmd.io_flags.contains(IoFlags::OUT_APPEND));
        assert!(cmd.io_flags.contains(IoFlags::ERR_APPEND));
    }

    #[test]
    fn ampersand_redirect_shares_target() {
        let CommandNode::Simple(cmd) = parsed("make &> build.log") else {
            panic!("expected a leaf");
        };
        assert_eq!(cmd.out, cmd.err);
        assert_eq!(cmd.out, Some(Word::literal("build.log")));
    }

    #[test]
    fn redirect_before_verb() {
        let CommandNode::Simple(cmd) = parsed("> out echo hi") else {
            panic!("expected a leaf");
        };
        assert_eq!(cmd.verb, Word::literal("echo"));
        assert_eq!(cmd.params, vec![Word::literal("hi")]);
    }

    #[test]
    fn assignment_verb() {
        let CommandNode::Simple(cmd) = parsed("GREETING=hello") else {
            panic!("expected a leaf");
        };
        let (name, value) = cmd.verb.assignment().unwrap();
        assert_eq!(name, "GREETING");
        assert_eq!(value, Word::literal("hello"));
    }

    #[test]
    fn missing_command_errors() {
        assert!(matches!(parse("| wc"), Err(ParseError::EmptyCommand { .. })));
        assert!(matches!(parse("ls &&"), Err(ParseError::EmptyCommand { .. })));
        assert!(matches!(parse("; ls"), Err(ParseError::EmptyCommand { .. })));
        assert!(matches!(parse("> out"), Err(ParseError::EmptyCommand { .. })));
    }

    #[test]
    fn missing_redirect_target() {
        assert_eq!(parse("ls >"), Err(ParseError::MissingRedirectTarget(">")));
        assert_eq!(parse("ls 2> | wc"), Err(ParseError::MissingRedirectTarget("2>")));
    }
}
