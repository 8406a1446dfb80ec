use std::{fmt::Display, rc::Rc};

use derivative::Derivative;
use enum_map::{Enum, EnumMap};
use itertools::Itertools;

use crate::{environment::Environment, functions::BaseFunction};

/// The special-form keywords. They are recognised by the literal symbol at the
/// head of a list, so binding one of these names as a variable does not stop
/// the list form from being treated as the keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
pub enum Operator {
    If,
    Define,
    Set,
    Lambda,
    Quote,
    Begin,
}

impl Operator {
    pub const TEXT: EnumMap<Self, &'static str> =
        EnumMap::from_array(["if", "define", "set!", "lambda", "quote", "begin"]);

    pub fn from_name(name: &str) -> Option<Self> {
        Self::TEXT
            .iter()
            .find_map(|(op, text)| (*text == name).then_some(op))
    }
}

/// Source syntax and runtime values share this one type: a quoted list is data,
/// and a list value can be handed back to the evaluator as code.
///
/// Arithmetic always produces `Float`; an all-integer computation shows up as a
/// float whose value is integral, not as an `Integer`.
#[derive(Derivative, Clone)]
#[derivative(PartialEq, Debug)]
pub enum Expression {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Symbol(String),
    List(Vec<Expression>),
    Closure(#[derivative(PartialEq(compare_with = "Rc::ptr_eq"))] Rc<Closure>),
    Builtin(Builtin),
}

/// A procedure value created by `lambda`. `env` is a private copy of the chain
/// that was current when the lambda was evaluated.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct Closure {
    pub params: Vec<String>,
    pub body: Expression,
    #[derivative(Debug = "ignore")]
    pub env: Environment,
}

#[derive(Derivative, Clone, Copy)]
#[derivative(Debug, PartialEq)]
pub struct Builtin {
    pub name: &'static str,
    #[derivative(Debug = "ignore", PartialEq = "ignore")]
    pub func: BaseFunction,
}

impl Expression {
    /// The empty list, which `define`, `set!` and an empty `begin` evaluate to.
    pub fn nil() -> Self {
        Expression::List(Vec::new())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Expression::Integer(_) => "integer",
            Expression::Float(_) => "float",
            Expression::Boolean(_) => "boolean",
            Expression::Symbol(_) => "symbol",
            Expression::List(_) => "list",
            Expression::Closure(_) => "procedure",
            Expression::Builtin(_) => "builtin",
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Expression::Symbol(name) => Some(name),
            _ => None,
        }
    }

    /// Numeric view used by the arithmetic and comparison builtins. The flag is
    /// true when the operand was a float.
    pub fn as_number(&self) -> Option<(f64, bool)> {
        match self {
            Expression::Integer(x) => Some((*x as f64, false)),
            Expression::Float(x) => Some((*x, true)),
            _ => None,
        }
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(x) => write!(f, "{x}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Boolean(true) => write!(f, "#t"),
            Self::Boolean(false) => write!(f, "#f"),
            Self::Symbol(name) => write!(f, "{name}"),
            Self::List(list) => write!(f, "({})", list.iter().join(" ")),
            Self::Closure(closure) => write!(f, "<lambda ({})>", closure.params.iter().join(" ")),
            Self::Builtin(builtin) => write!(f, "<builtin {}>", builtin.name),
        }
    }
}
