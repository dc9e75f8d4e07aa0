//! Compile-once, evaluate-many path expressions for JSON-like documents.
//!
//! A textual path such as `.store.book[:-2]` or `..title(has(@.author))` is
//! compiled against a [`Context`] into an immutable [`Path`], which can then
//! be evaluated any number of times, concurrently, against arbitrary
//! [`serde_json::Value`] documents.
//!
//! ```
//! use obpath::{compile, Context};
//! use serde_json::json;
//!
//! let context = Context::with_builtins();
//! let path = compile(".trees[:-2]", &context).unwrap();
//!
//! let doc = json!({
//!     "trees":   ["Elm", "Oak", "Fir"],
//!     "animals": ["Cat", "Dog", "Horse"]
//! });
//! assert_eq!(path.evaluate(&doc), vec![json!("Elm"), json!("Oak")]);
//! ```

pub mod context;
pub mod errors;
mod compare;
mod compile;
mod cursor;
mod evaluate;
mod functions;
mod path;

use tracing::debug;

pub use context::{ArgType, ConditionFunction, Context, ResolvedArg};
pub use errors::SyntaxError;
pub use path::{Argument, Expression, Path, Selector, Step, Target};

/// Compiles a path expression against `context`, producing a reusable
/// [`Path`] or a positioned [`SyntaxError`].
pub fn compile(path: &str, context: &Context) -> Result<Path, SyntaxError> {
    if path.is_empty() {
        return Err(SyntaxError::new(path, 0, "empty path"));
    }
    debug!(path, "compiling path expression");
    compile::Compiler::new(path, 0).parse_path(context)
}

/// Like [`compile`], but panics on a syntax error. Intended for expressions
/// fixed at build time.
pub fn must_compile(path: &str, context: &Context) -> Path {
    match compile(path, context) {
        Ok(compiled) => compiled,
        Err(err) => panic!("{err}"),
    }
}
