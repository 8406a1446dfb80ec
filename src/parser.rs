use crate::{
    error::{LispError, LispResult},
    syntax::Expression,
};

pub mod tokens {
    use std::ops::Range;

    use winnow::{
        combinator::alt,
        error::ContextError,
        stream::{Located, Stream},
        token::take_while,
        PResult, Parser,
    };

    use crate::error::{LispError, LispResult};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Token<'a> {
        Open,
        Close,
        Atom(&'a str),
    }

    pub type TokenSpan<'a> = (Token<'a>, Range<usize>);

    fn atom_char(c: char) -> bool {
        !c.is_whitespace() && c != '(' && c != ')'
    }

    fn whitespace<'a>(input: &mut Located<&'a str>) -> PResult<&'a str, ContextError> {
        take_while(0.., char::is_whitespace).parse_next(input)
    }

    fn token<'a>(input: &mut Located<&'a str>) -> PResult<Token<'a>, ContextError> {
        alt((
            '('.value(Token::Open),
            ')'.value(Token::Close),
            take_while(1.., atom_char).map(Token::Atom),
        ))
        .parse_next(input)
    }

    /// Splits `input` into parens and whitespace-delimited atoms, keeping the
    /// byte range each token came from.
    pub fn tokenize(input: &str) -> LispResult<Vec<TokenSpan<'_>>> {
        let mut stream = Located::new(input);
        let mut tokens = Vec::new();
        loop {
            whitespace
                .parse_next(&mut stream)
                .map_err(|_| LispError::SyntaxError("unreadable input"))?;
            if stream.eof_offset() == 0 {
                return Ok(tokens);
            }
            tokens.push(
                token
                    .with_span()
                    .parse_next(&mut stream)
                    .map_err(|_| LispError::SyntaxError("unreadable input"))?,
            );
        }
    }

    /// The source text of each token, in order.
    pub fn token_strs(input: &str) -> LispResult<Vec<&str>> {
        Ok(tokenize(input)?
            .into_iter()
            .map(|(_, span)| &input[span])
            .collect())
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            token_strs("(+ 1 (* 2.5 x))").unwrap(),
            vec!["(", "+", "1", "(", "*", "2.5", "x", ")", ")"]
        );
        assert_eq!(token_strs("  a\tb\n").unwrap(), vec!["a", "b"]);
        assert_eq!(token_strs("(())").unwrap(), vec!["(", "(", ")", ")"]);
        assert!(token_strs("   ").unwrap().is_empty());
        for line in ["(+ 1\u{0b}2)", "(+ 1\u{0c}2)", "(+ 1\u{a0}2)", "(+\u{3000}1 2)"] {
            assert_eq!(token_strs(line).unwrap(), vec!["(", "+", "1", "2", ")"]);
        }
    }

    #[test]
    fn test_spans() {
        assert_eq!(
            tokenize("(foo 12)").unwrap(),
            vec![
                (Token::Open, 0..1),
                (Token::Atom("foo"), 1..4),
                (Token::Atom("12"), 5..7),
                (Token::Close, 7..8),
            ]
        );
    }
}

/// Integer first, then float, and anything else is a symbol.
pub fn atom(token: &str) -> Expression {
    if let Ok(x) = token.parse::<i64>() {
        Expression::Integer(x)
    } else if let Ok(x) = token.parse::<f64>() {
        Expression::Float(x)
    } else {
        Expression::Symbol(token.to_string())
    }
}

/// Reads one expression from the front of `tokens`, returning it along with the
/// number of tokens it used.
pub fn read_from_tokens(tokens: &[&str]) -> LispResult<(Expression, usize)> {
    match tokens {
        [] => Err(LispError::SyntaxError("no tokens")),
        ["(", rest @ ..] => {
            let mut list = Vec::new();
            let mut consumed = 1;
            loop {
                match &rest[consumed - 1..] {
                    [] => return Err(LispError::SyntaxError("missing close paren")),
                    [")", ..] => return Ok((Expression::List(list), consumed + 1)),
                    remaining => {
                        let (expr, used) = read_from_tokens(remaining)?;
                        list.push(expr);
                        consumed += used;
                    }
                }
            }
        }
        [")", ..] => Err(LispError::SyntaxError("unexpected close paren")),
        [token, ..] => Ok((atom(token), 1)),
    }
}

/// Parses one line of source as a single expression. Every token must belong
/// to that expression.
pub fn parse(input: &str) -> LispResult<Expression> {
    let tokens = tokens::token_strs(input)?;
    let (expr, consumed) = read_from_tokens(&tokens)?;
    match tokens[consumed..] {
        [] => Ok(expr),
        [")", ..] => Err(LispError::SyntaxError("unexpected close paren")),
        _ => Err(LispError::SyntaxError("unexpected trailing tokens")),
    }
}

#[test]
fn test_atoms() {
    assert_eq!(atom("42"), Expression::Integer(42));
    assert_eq!(atom("-7"), Expression::Integer(-7));
    assert_eq!(atom("3"), Expression::Integer(3));
    assert_eq!(atom("2.5"), Expression::Float(2.5));
    assert_eq!(atom("1e3"), Expression::Float(1000.0));
    assert_eq!(atom("set!"), Expression::Symbol("set!".to_string()));
    assert_eq!(atom("3ab"), Expression::Symbol("3ab".to_string()));
}

#[test]
fn test_lists() {
    use Expression as E;
    assert_eq!(
        parse("(+ 1 2)"),
        Ok(E::List(vec![
            E::Symbol("+".to_string()),
            E::Integer(1),
            E::Integer(2)
        ]))
    );
    assert_eq!(
        parse("(((42) ()))"),
        Ok(E::List(vec![E::List(vec![
            E::List(vec![E::Integer(42)]),
            E::List(vec![])
        ])]))
    );
    assert_eq!(read_from_tokens(&["(", "a", ")", "b"]).unwrap().1, 3);
    assert_eq!(parse("(+ 1\u{0c}2)"), parse("(+ 1 2)"));
    assert_eq!(parse("(+\u{3000}1\u{a0}2)"), parse("(+ 1 2)"));
}

#[test]
fn test_syntax_errors() {
    assert_eq!(parse("(+ 1 2"), Err(LispError::SyntaxError("missing close paren")));
    assert_eq!(parse(")"), Err(LispError::SyntaxError("unexpected close paren")));
    assert_eq!(parse("(a))"), Err(LispError::SyntaxError("unexpected close paren")));
    assert_eq!(parse(""), Err(LispError::SyntaxError("no tokens")));
    assert_eq!(parse("1 2"), Err(LispError::SyntaxError("unexpected trailing tokens")));
}
