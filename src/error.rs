use itertools::Itertools;
use thiserror::Error;

use crate::syntax::Expression;

pub type LispResult<T> = Result<T, LispError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LispError {
    #[error("syntax error: {0}")]
    SyntaxError(&'static str),
    #[error("unbound symbol: `{0}` is not defined")]
    UnboundSymbol(String),
    #[error("type error: expected {expected_type}, got {value} of type {actual_type}")]
    TypeError {
        expected_type: &'static str,
        actual_type: &'static str,
        value: Expression,
    },
    #[error("arity error: expected {expected} arguments but was given {actual}")]
    ArityError { expected: String, actual: usize },
    #[error("empty list error: cannot take the {0} of an empty list")]
    EmptyListError(&'static str),
    #[error("not callable: {0} is not a procedure")]
    NotCallable(Expression),
    #[error("procedure `{name}` called with arguments ({}) failed: {source}", .args.iter().join(" "))]
    EvalError {
        name: String,
        args: Vec<Expression>,
        source: Box<LispError>,
    },
    #[error("failed to evaluate {expr}: {source}")]
    Context {
        expr: Expression,
        source: Box<LispError>,
    },
}

impl LispError {
    /// Wraps this error with the expression whose evaluation produced it.
    pub fn context(self, expr: &Expression) -> Self {
        LispError::Context {
            expr: expr.clone(),
            source: Box::new(self),
        }
    }

    /// The innermost error, with every `EvalError`/`Context` layer peeled off.
    pub fn root_cause(&self) -> &LispError {
        match self {
            LispError::EvalError { source, .. } | LispError::Context { source, .. } => {
                source.root_cause()
            }
            err => err,
        }
    }
}

impl Expression {
    pub fn type_error(&self, expected_type: &'static str) -> LispError {
        LispError::TypeError {
            expected_type,
            actual_type: self.type_name(),
            value: self.clone(),
        }
    }
}

/// Argument count checks shared by special forms and builtins. Both run before
/// anything in the argument list is evaluated or inspected.
pub trait Args {
    fn take<const N: usize>(&self) -> LispResult<&[Expression; N]>;
    fn at_least(&self, n: usize) -> LispResult<&[Expression]>;
}

impl Args for [Expression] {
    fn take<const N: usize>(&self) -> LispResult<&[Expression; N]> {
        self.try_into().map_err(|_| LispError::ArityError {
            expected: N.to_string(),
            actual: self.len(),
        })
    }

    fn at_least(&self, n: usize) -> LispResult<&[Expression]> {
        if self.len() < n {
            return Err(LispError::ArityError {
                expected: format!(">= {n}"),
                actual: self.len(),
            });
        }
        Ok(self)
    }
}
