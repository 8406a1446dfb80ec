//! A small Scheme-flavoured Lisp. Source text is read into [`Expression`]
//! trees, which are also the runtime values, and evaluated against a chain of
//! [`Environment`] frames.
//!
//! ```
//! use schemelet::{execute, Environment};
//!
//! let mut env = Environment::base();
//! execute("(define square (lambda (n) (* n n)))", &mut env).unwrap();
//! assert_eq!(execute("(square 5)", &mut env).unwrap().to_string(), "25");
//! ```

pub mod environment;
pub mod error;
pub mod functions;
pub mod interpreter;
pub mod parser;
pub mod repl;
pub mod syntax;

pub use environment::Environment;
pub use error::{LispError, LispResult};
pub use interpreter::{eval, execute, ExprResult};
pub use parser::parse;
pub use syntax::Expression;
