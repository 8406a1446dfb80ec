use std::rc::Rc;

use enum_map::{enum_map, EnumMap};
use lazy_static::lazy_static;

use crate::{
    environment::Environment,
    error::{Args, LispError, LispResult},
    parser::parse,
    syntax::{Closure, Expression, Operator},
};

pub type ExprResult = LispResult<Expression>;
pub type SpecialForm = fn(&[Expression], &mut Environment) -> ExprResult;

lazy_static! {
    pub static ref OPERATORS: EnumMap<Operator, SpecialForm> = enum_map! {
        Operator::If => op_if as SpecialForm,
        Operator::Define => op_define as SpecialForm,
        Operator::Set => op_set as SpecialForm,
        Operator::Lambda => op_lambda as SpecialForm,
        Operator::Quote => op_quote as SpecialForm,
        Operator::Begin => op_begin as SpecialForm,
    };
}

fn symbol_name(expr: &Expression) -> LispResult<&str> {
    expr.as_symbol().ok_or_else(|| expr.type_error("symbol"))
}

/// Evaluates `expr`, tagging any failure with the expression itself.
fn eval_in_context(expr: &Expression, env: &mut Environment) -> ExprResult {
    expr.eval(env).map_err(|err| err.context(expr))
}

fn op_if(args: &[Expression], env: &mut Environment) -> ExprResult {
    let [test, conseq, alt] = args.take()?;
    match eval_in_context(test, env)? {
        Expression::Boolean(true) => eval_in_context(conseq, env),
        Expression::Boolean(false) => eval_in_context(alt, env),
        other => Err(other.type_error("boolean").context(test)),
    }
}

fn op_define(args: &[Expression], env: &mut Environment) -> ExprResult {
    let [name, expr] = args.take()?;
    let name = symbol_name(name)?;
    let value = eval_in_context(expr, env)?;
    env.define(name, value);
    Ok(Expression::nil())
}

fn op_set(args: &[Expression], env: &mut Environment) -> ExprResult {
    let [name, expr] = args.take()?;
    let name = symbol_name(name)?;
    let value = eval_in_context(expr, env)?;
    env.assign(name, value)?;
    Ok(Expression::nil())
}

fn op_lambda(args: &[Expression], env: &mut Environment) -> ExprResult {
    let [params, body] = args.take()?;
    let params = match params {
        Expression::List(params) => params
            .iter()
            .map(|param| symbol_name(param).map(ToString::to_string))
            .collect::<LispResult<Vec<_>>>()?,
        e => return Err(e.type_error("list")),
    };
    Ok(Expression::Closure(Rc::new(Closure {
        params,
        body: body.clone(),
        env: env.duplicate(),
    })))
}

fn op_quote(args: &[Expression], _env: &mut Environment) -> ExprResult {
    let [expr] = args.take()?;
    Ok(expr.clone())
}

fn op_begin(args: &[Expression], env: &mut Environment) -> ExprResult {
    let mut return_value = Expression::nil();
    for expr in args {
        return_value = expr.eval(env)?;
    }
    Ok(return_value)
}

impl Closure {
    /// Binds the arguments in a new frame on top of the captured chain and
    /// evaluates the body there. Nothing done during the call outlives it.
    pub fn call(&self, args: Vec<Expression>) -> ExprResult {
        if self.params.len() != args.len() {
            return Err(LispError::ArityError {
                expected: self.params.len().to_string(),
                actual: args.len(),
            });
        }
        let mut env = self.env.scope();
        for (name, arg) in self.params.iter().zip(args) {
            env.define(name.as_str(), arg);
        }
        self.body.eval(&mut env)
    }
}

impl Expression {
    pub fn eval(&self, env: &mut Environment) -> ExprResult {
        match self {
            Self::Symbol(name) => env.lookup(name),
            Self::List(list) => match list.as_slice() {
                [] => Ok(Self::nil()),
                [head, args @ ..] => match head.as_symbol().and_then(Operator::from_name) {
                    Some(op) => OPERATORS[op](args, env),
                    None => {
                        let procedure = eval_in_context(head, env)?;
                        let args = args
                            .iter()
                            .map(|arg| eval_in_context(arg, env))
                            .collect::<LispResult<Vec<_>>>()?;
                        procedure.apply(head, args, env)
                    }
                },
            },
            e => Ok(e.clone()),
        }
    }

    /// Calls an already evaluated procedure. `head` is the expression it came
    /// from, used to label builtin failures.
    pub fn apply(
        self,
        head: &Expression,
        args: Vec<Expression>,
        env: &mut Environment,
    ) -> ExprResult {
        match self {
            Self::Builtin(builtin) => (builtin.func)(&args).map_err(|err| LispError::EvalError {
                name: head.to_string(),
                args,
                source: Box::new(err),
            }),
            Self::Closure(closure) => closure.call(args),
            // quoted code run as a procedure; its arguments are not used
            list @ Self::List(_) => list.eval(env),
            e => Err(LispError::NotCallable(e)),
        }
    }
}

pub fn eval(expr: &Expression, env: &mut Environment) -> ExprResult {
    expr.eval(env)
}

/// Parses and evaluates one line of input.
pub fn execute(input: &str, env: &mut Environment) -> ExprResult {
    parse(input)?.eval(env)
}
