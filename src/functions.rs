use std::collections::HashMap;

use lazy_static::lazy_static;
use literally::hmap;

use crate::{
    error::{Args, LispError},
    interpreter::ExprResult,
    syntax::Expression,
};

pub type BaseFunction = fn(&[Expression]) -> ExprResult;

/// How close an all-integer quotient must be to its rounded value to be
/// reported as that rounded value.
const DIVISION_EPSILON: f64 = 1e-5;

/// Folds the operands into a float accumulator, seeded with the first operand.
/// Returns the total and whether any operand was a float.
fn fold_numbers(args: &[Expression], f: fn(f64, f64) -> f64) -> Result<(f64, bool), LispError> {
    let mut saw_float = false;
    let mut total = None;
    for arg in args {
        let (x, is_float) = arg.as_number().ok_or_else(|| arg.type_error("number"))?;
        saw_float |= is_float;
        total = Some(match total {
            None => x,
            Some(total) => f(total, x),
        });
    }
    Ok((total.unwrap_or_default(), saw_float))
}

macro_rules! fold_op {
    ( $f:expr ) => {
        |args: &[Expression]| -> ExprResult {
            let (total, saw_float) = fold_numbers(args.at_least(2)?, $f)?;
            Ok(Expression::Float(if saw_float { total } else { total.round() }))
        }
    };
}

macro_rules! compare_op {
    ( $f:expr ) => {
        |args: &[Expression]| -> ExprResult {
            let [a, b] = args.take()?;
            let (a, _) = a.as_number().ok_or_else(|| a.type_error("number"))?;
            let (b, _) = b.as_number().ok_or_else(|| b.type_error("number"))?;
            Ok(Expression::Boolean($f(&a, &b)))
        }
    };
}

macro_rules! logic_op {
    ( $short_circuit:literal ) => {
        |args: &[Expression]| -> ExprResult {
            let values = args
                .at_least(2)?
                .iter()
                .map(|arg| match arg {
                    Expression::Boolean(b) => Ok(*b),
                    e => Err(e.type_error("boolean")),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Expression::Boolean(if values.contains(&$short_circuit) {
                $short_circuit
            } else {
                !$short_circuit
            }))
        }
    };
}

lazy_static! {
    pub static ref FUNCTIONS: HashMap<&'static str, BaseFunction> = hmap! {
        "+" => fold_op!(|a, b| a + b) as BaseFunction,
        "-" => fold_op!(|a, b| a - b) as BaseFunction,
        "*" => fold_op!(|a, b| a * b) as BaseFunction,
        "/" => fn_divide as BaseFunction,
        "=" => compare_op!(PartialEq::eq) as BaseFunction,
        ">" => compare_op!(PartialOrd::gt) as BaseFunction,
        "and" => logic_op!(false) as BaseFunction,
        "or" => logic_op!(true) as BaseFunction,
        "boolean?" => fn_is_boolean as BaseFunction,
        "cons" => fn_cons as BaseFunction,
        "empty?" => fn_is_empty as BaseFunction,
        "car" => fn_car as BaseFunction,
        "cdr" => fn_cdr as BaseFunction,
    };
}

fn fn_divide(args: &[Expression]) -> ExprResult {
    let (quotient, saw_float) = fold_numbers(args.take::<2>()?, |a, b| a / b)?;
    if !saw_float {
        let rounded = quotient.round();
        if (rounded - quotient).abs() < DIVISION_EPSILON {
            return Ok(Expression::Float(rounded));
        }
    }
    Ok(Expression::Float(quotient))
}

fn fn_is_boolean(args: &[Expression]) -> ExprResult {
    let [arg] = args.take()?;
    Ok(Expression::Boolean(matches!(arg, Expression::Boolean(_))))
}

fn into_list(expr: &Expression) -> Result<&[Expression], LispError> {
    match expr {
        Expression::List(list) => Ok(list),
        e => Err(e.type_error("list")),
    }
}

fn fn_cons(args: &[Expression]) -> ExprResult {
    let [head, tail] = args.take()?;
    let tail = into_list(tail)?;
    Ok(Expression::List(
        std::iter::once(head).chain(tail).cloned().collect(),
    ))
}

fn fn_is_empty(args: &[Expression]) -> ExprResult {
    let [list] = args.take()?;
    Ok(Expression::Boolean(into_list(list)?.is_empty()))
}

fn fn_car(args: &[Expression]) -> ExprResult {
    let [list] = args.take()?;
    match into_list(list)? {
        [] => Err(LispError::EmptyListError("car")),
        [head, ..] => Ok(head.clone()),
    }
}

fn fn_cdr(args: &[Expression]) -> ExprResult {
    let [list] = args.take()?;
    match into_list(list)? {
        [] => Err(LispError::EmptyListError("cdr")),
        [_, tail @ ..] => Ok(Expression::List(tail.to_vec())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Expression as E;

    fn call(name: &str, args: &[Expression]) -> ExprResult {
        FUNCTIONS[name](args)
    }

    #[test]
    fn arithmetic_rounds_all_integer_results() {
        assert_eq!(call("+", &[E::Integer(1), E::Integer(2)]), Ok(E::Float(3.0)));
        assert_eq!(call("+", &[E::Integer(1), E::Float(2.5)]), Ok(E::Float(3.5)));
        assert_eq!(
            call("-", &[E::Integer(10), E::Integer(2), E::Integer(3)]),
            Ok(E::Float(5.0))
        );
        assert_eq!(call("*", &[E::Float(1.5), E::Integer(2)]), Ok(E::Float(3.0)));
        assert!(matches!(
            call("+", &[E::Integer(1)]),
            Err(LispError::ArityError { actual: 1, .. })
        ));
        assert!(matches!(
            call("*", &[E::Integer(1), E::Boolean(true)]),
            Err(LispError::TypeError { expected_type: "number", actual_type: "boolean", .. })
        ));
    }

    #[test]
    fn division_uses_an_epsilon_for_exactness() {
        assert_eq!(call("/", &[E::Integer(10), E::Integer(2)]), Ok(E::Float(5.0)));
        let Ok(E::Float(third)) = call("/", &[E::Integer(10), E::Integer(3)]) else {
            panic!("expected a float");
        };
        assert!((third - 10.0 / 3.0).abs() < 1e-12);
        assert_eq!(call("/", &[E::Float(5.0), E::Integer(2)]), Ok(E::Float(2.5)));
        assert!(matches!(
            call("/", &[E::Integer(1), E::Integer(2), E::Integer(3)]),
            Err(LispError::ArityError { actual: 3, .. })
        ));
    }

    #[test]
    fn comparisons_cross_numeric_types() {
        assert_eq!(call("=", &[E::Integer(3), E::Float(3.0)]), Ok(E::Boolean(true)));
        assert_eq!(call(">", &[E::Float(2.5), E::Integer(3)]), Ok(E::Boolean(false)));
        assert!(call(">", &[E::Integer(1), E::nil()]).is_err());
    }

    #[test]
    fn logic_checks_every_argument() {
        assert_eq!(call("and", &[E::Boolean(true), E::Boolean(false)]), Ok(E::Boolean(false)));
        assert_eq!(call("or", &[E::Boolean(false), E::Boolean(true)]), Ok(E::Boolean(true)));
        assert_eq!(call("and", &[E::Boolean(true), E::Boolean(true)]), Ok(E::Boolean(true)));
        assert!(matches!(
            call("and", &[E::Boolean(false), E::Integer(1)]),
            Err(LispError::TypeError { .. })
        ));
        assert_eq!(call("boolean?", &[E::Integer(0)]), Ok(E::Boolean(false)));
    }

    #[test]
    fn argument_counts() {
        let arity = |name: &str, args: &[Expression]| {
            matches!(call(name, args), Err(LispError::ArityError { .. }))
        };
        assert!(arity("and", &[E::Boolean(true)]));
        assert!(arity("or", &[]));
        assert!(arity("=", &[E::Integer(1)]));
        assert!(arity(">", &[E::Integer(1), E::Integer(2), E::Integer(3)]));
        assert!(arity("boolean?", &[]));
        assert!(arity("boolean?", &[E::Boolean(true), E::Boolean(false)]));
        assert!(arity("cons", &[E::Integer(1)]));
        assert!(arity("empty?", &[E::nil(), E::nil()]));
        assert!(arity("car", &[]));
        assert!(arity("cdr", &[E::nil(), E::nil()]));
    }

    #[test]
    fn list_primitives() {
        let list = E::List(vec![E::Integer(2), E::Integer(3)]);
        assert_eq!(
            call("cons", &[E::Integer(1), list.clone()]),
            Ok(E::List(vec![E::Integer(1), E::Integer(2), E::Integer(3)]))
        );
        assert!(matches!(
            call("cons", &[E::Integer(1), E::Integer(2)]),
            Err(LispError::TypeError { expected_type: "list", .. })
        ));
        assert_eq!(call("car", &[list.clone()]), Ok(E::Integer(2)));
        assert_eq!(call("cdr", &[list]), Ok(E::List(vec![E::Integer(3)])));
        assert_eq!(call("cdr", &[E::List(vec![E::Integer(3)])]), Ok(E::nil()));
        assert_eq!(call("car", &[E::nil()]), Err(LispError::EmptyListError("car")));
        assert_eq!(call("cdr", &[E::nil()]), Err(LispError::EmptyListError("cdr")));
        assert_eq!(call("empty?", &[E::nil()]), Ok(E::Boolean(true)));
        assert!(call("empty?", &[E::Integer(1)]).is_err());
    }
}
