use std::{borrow::Cow, env, io, path::PathBuf};

use colored::{ColoredString, Colorize};
use rustyline::{
    error::ReadlineError, highlight::Highlighter, history::DefaultHistory, validate::Validator,
    Completer, Editor, Helper, Hinter,
};

use crate::{
    environment::Environment,
    interpreter::execute,
    parser::{
        atom,
        tokens::{tokenize, Token, TokenSpan},
    },
    syntax::{Expression, Operator},
};

pub type Repl = Editor<LispHelper, DefaultHistory>;

/// Settings for the interactive loop, read from `SCHEMELET_PROMPT` and
/// `SCHEMELET_HISTORY`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplConfig {
    pub prompt: String,
    pub history_file: Option<PathBuf>,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            prompt: "-> ".to_string(),
            history_file: None,
        }
    }
}

impl ReplConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            prompt: var("SCHEMELET_PROMPT").unwrap_or(defaults.prompt),
            history_file: var("SCHEMELET_HISTORY")
                .map(PathBuf::from)
                .or_else(|| var("HOME").map(|home| PathBuf::from(home).join(".schemelet_history"))),
        }
    }
}

#[derive(Helper, Completer, Hinter)]
pub struct LispHelper;

impl Highlighter for LispHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        match tokenize(line) {
            Ok(tokens) => Cow::Owned(highlight_tokens(&tokens, line)),
            Err(_) => Cow::Borrowed(line),
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Validator for LispHelper {}

fn highlight_tokens(tokens: &[TokenSpan], s: &str) -> String {
    let mut next_start = 0;
    let mut highlighted = String::new();
    for (token, span) in tokens {
        if next_start < span.start {
            highlighted.push_str(&s[next_start..span.start]);
        }
        highlighted.push_str(&highlight_token(token).to_string());
        next_start = span.end;
    }
    if next_start < s.len() {
        highlighted.push_str(&s[next_start..]);
    }
    highlighted
}

fn highlight_token(token: &Token) -> ColoredString {
    match *token {
        Token::Open => "(".normal(),
        Token::Close => ")".normal(),
        Token::Atom(s) if Operator::from_name(s).is_some() => s.magenta(),
        Token::Atom(s @ ("#t" | "#f" | "true" | "false")) => s.red(),
        Token::Atom(s) => match atom(s) {
            Expression::Integer(_) | Expression::Float(_) => s.yellow(),
            _ => s.blue(),
        },
    }
}

/// A missing history file just means a fresh history.
fn is_missing_file(err: &ReadlineError) -> bool {
    matches!(err, ReadlineError::Io(err) if err.kind() == io::ErrorKind::NotFound)
}

/// Reads, evaluates and prints one line at a time until end of input. A line
/// that fails to parse or evaluate only prints its error.
pub fn run(config: &ReplConfig) -> anyhow::Result<()> {
    let mut repl = Repl::new()?;
    repl.set_helper(Some(LispHelper));
    if let Some(path) = &config.history_file {
        match repl.load_history(path) {
            Err(err) if !is_missing_file(&err) => {
                println!("{}", format!("could not load history: {err}").red())
            }
            _ => {}
        }
    }

    let mut env = Environment::base();
    loop {
        let input = match repl.readline(&config.prompt) {
            Ok(input) => input,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        };
        if input.trim().is_empty() {
            continue;
        }
        repl.add_history_entry(input.as_str())?;

        match execute(&input, &mut env) {
            Ok(expr) => println!("{expr}"),
            Err(err) => println!("{}", err.to_string().red()),
        }
    }

    if let Some(path) = &config.history_file {
        repl.save_history(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_from_vars() {
        let config = ReplConfig::from_vars(|key| match key {
            "SCHEMELET_PROMPT" => Some("> ".to_string()),
            "HOME" => Some("/home/me".to_string()),
            _ => None,
        });
        assert_eq!(config.prompt, "> ");
        assert_eq!(
            config.history_file,
            Some(PathBuf::from("/home/me/.schemelet_history"))
        );
        assert_eq!(ReplConfig::from_vars(|_| None), ReplConfig::default());
    }

    #[test]
    fn only_a_missing_history_file_is_ignored() {
        let missing = ReadlineError::Io(io::Error::from(io::ErrorKind::NotFound));
        let denied = ReadlineError::Io(io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(is_missing_file(&missing));
        assert!(!is_missing_file(&denied));
        assert!(!is_missing_file(&ReadlineError::Eof));
    }

    #[test]
    fn highlighting_keeps_the_text() {
        colored::control::set_override(false);
        let line = "( define  x (+ 1 2.5))";
        let tokens = tokenize(line).unwrap();
        assert_eq!(highlight_tokens(&tokens, line), line);
    }
}
