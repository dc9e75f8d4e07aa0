use std::sync::Arc;

use crate::context::{ArgType, ConditionFunction, Context};

/// An immutable compiled path expression. Built once by the compiler, never
/// mutated, and safe to evaluate concurrently from multiple callers.
#[derive(Debug, Clone)]
pub struct Path {
    /// The context the path was compiled against.
    pub context: Context,
    pub steps: Vec<Step>,
    /// The exact source substring the path was parsed from.
    pub source: String,
}

/// One stage of a path: where to look, and an optional filter gating which
/// values proceed to the next stage.
#[derive(Debug, Clone)]
pub struct Step {
    pub target: Target,
    pub condition: Option<Expression>,
}

#[derive(Debug, Clone)]
pub enum Target {
    /// `.name` — direct lookup in an object, or every child for `.*`.
    Child(Selector),
    /// `..name` — like `Child`, but also re-applied to every descendant.
    Descendant(Selector),
    /// `[start:end]` — an inclusive index range into an array. Negative
    /// bounds count from the end; `end: None` means "to the last element".
    Item { start: i64, end: Option<i64> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// The `*` wildcard: any direct child.
    Any,
    Name(String),
}

/// A compiled filter: the condition function it names, whether the result is
/// negated, and one argument per declared position.
#[derive(Debug, Clone)]
pub struct Expression {
    pub condition: Arc<ConditionFunction>,
    pub inverse: bool,
    pub arguments: Vec<Argument>,
}

/// A filter argument. Nested paths are independent, self-owned compiled
/// paths; the other variants are literals fixed at compile time.
#[derive(Debug, Clone)]
pub enum Argument {
    Path(Path),
    String(String),
    Integer(i64),
    Float(f64),
}

impl Argument {
    /// The type tag checked against a condition function's signature.
    pub fn arg_type(&self) -> ArgType {
        match self {
            Argument::Path(_) => ArgType::PATH,
            Argument::String(_) => ArgType::STRING,
            Argument::Integer(_) => ArgType::INTEGER,
            Argument::Float(_) => ArgType::FLOAT,
        }
    }
}
