use std::collections::HashMap;
use std::fmt;
use std::ops::BitOr;
use std::sync::Arc;

use itertools::Itertools;
use serde_json::Value;

use crate::functions;

/// Bitmask describing which argument kinds a condition function accepts at
/// one position. Single flags double as the type tag of a parsed argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgType(u8);

impl ArgType {
    /// A nested path, evaluated against the current position at filter time.
    pub const PATH: ArgType = ArgType(1);
    /// A number literal with an optional fractional part.
    pub const FLOAT: ArgType = ArgType(1 << 1);
    /// A number literal without a fractional part.
    pub const INTEGER: ArgType = ArgType(1 << 2);
    /// A string literal bounded by `"`, `'` or a backtick.
    pub const STRING: ArgType = ArgType(1 << 3);
    /// Any literal argument.
    pub const LITERAL: ArgType = ArgType(Self::STRING.0 | Self::FLOAT.0);

    /// Whether any flag in `tag` is part of this mask.
    pub fn accepts(self, tag: ArgType) -> bool {
        self.0 & tag.0 != 0
    }

    /// The names of the flags in this mask, in declaration order.
    pub fn names(self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.accepts(Self::PATH) {
            names.push("path");
        }
        if self.accepts(Self::FLOAT) {
            names.push("float");
        }
        if self.accepts(Self::INTEGER) {
            names.push("integer");
        }
        if self.accepts(Self::STRING) {
            names.push("string");
        }
        names
    }
}

impl BitOr for ArgType {
    type Output = ArgType;

    fn bitor(self, rhs: ArgType) -> ArgType {
        ArgType(self.0 | rhs.0)
    }
}

/// A resolved argument as handed to a condition function: path arguments
/// become the ordered match list of their nested path evaluated at the
/// current position, literals pass through unchanged.
pub enum ResolvedArg<'a> {
    Matches(Vec<&'a Value>),
    String(&'a str),
    Integer(i64),
    Float(f64),
}

impl<'a> ResolvedArg<'a> {
    /// The match list of a path argument; empty for literals.
    pub fn matches(&self) -> &[&'a Value] {
        match self {
            ResolvedArg::Matches(m) => m,
            _ => &[],
        }
    }

    /// The text of a string argument; empty for anything else.
    pub fn as_str(&self) -> &str {
        match self {
            ResolvedArg::String(s) => s,
            _ => "",
        }
    }

    /// The numeric value of an integer or float argument; NaN for anything
    /// else, so comparisons against it are false.
    pub fn as_f64(&self) -> f64 {
        match self {
            ResolvedArg::Integer(i) => *i as f64,
            ResolvedArg::Float(f) => *f,
            _ => f64::NAN,
        }
    }
}

/// A named predicate usable inside a filter: a test over resolved arguments
/// plus one `ArgType` mask per argument position. The mask list defines the
/// arity and the per-position type constraints at the same time.
pub struct ConditionFunction {
    signature: Vec<ArgType>,
    test: Arc<dyn Fn(&[ResolvedArg]) -> bool + Send + Sync>,
}

impl ConditionFunction {
    pub fn new(
        signature: Vec<ArgType>,
        test: impl Fn(&[ResolvedArg]) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            signature,
            test: Arc::new(test),
        }
    }

    pub fn signature(&self) -> &[ArgType] {
        &self.signature
    }

    pub(crate) fn test(&self, args: &[ResolvedArg]) -> bool {
        (self.test)(args)
    }
}

impl fmt::Debug for ConditionFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionFunction")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// The environment paths are compiled and evaluated in: a registry of named
/// condition functions plus compilation/evaluation knobs. Cloning is cheap
/// (the registry sits behind an `Arc`), and a context must not be mutated
/// once a compile using it has begun.
#[derive(Clone)]
pub struct Context {
    functions: Arc<HashMap<String, Arc<ConditionFunction>>>,
    /// Permits the `..` descendant selector syntax. Off by default.
    pub allow_descendants: bool,
    /// Bound on how deep the evaluator walks into a document. Branches past
    /// the limit contribute no matches.
    pub max_depth: usize,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            functions: Arc::new(HashMap::new()),
            allow_descendants: false,
            max_depth: 128,
        }
    }
}

impl Context {
    /// A context with an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context populated with the standard condition functions.
    pub fn with_builtins() -> Self {
        let mut context = Self::new();
        functions::register_builtins(&mut context);
        context
    }

    /// Add or override a named condition function.
    pub fn register(&mut self, name: impl Into<String>, function: ConditionFunction) {
        Arc::make_mut(&mut self.functions).insert(name.into(), Arc::new(function));
    }

    pub fn condition(&self, name: &str) -> Option<Arc<ConditionFunction>> {
        self.functions.get(name).cloned()
    }

    /// The registered condition names, sorted for stable diagnostics.
    pub fn condition_names(&self) -> Vec<&str> {
        self.functions.keys().map(String::as_str).sorted().collect()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("conditions", &self.condition_names())
            .field("allow_descendants", &self.allow_descendants)
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn literal_mask_covers_string_and_float_only() {
        assert!(ArgType::LITERAL.accepts(ArgType::STRING));
        assert!(ArgType::LITERAL.accepts(ArgType::FLOAT));
        assert!(!ArgType::LITERAL.accepts(ArgType::INTEGER));
        assert!(!ArgType::LITERAL.accepts(ArgType::PATH));
    }

    #[test]
    fn mask_names_enumerate_flags() {
        assert_eq!(ArgType::PATH.names(), vec!["path"]);
        assert_eq!(ArgType::LITERAL.names(), vec!["float", "string"]);
        assert_eq!((ArgType::PATH | ArgType::INTEGER).names(), vec!["path", "integer"]);
    }

    #[test]
    fn builtin_registry_is_complete_and_sorted() {
        let context = Context::with_builtins();
        assert_eq!(
            context.condition_names(),
            vec![
                "between",
                "cicontains",
                "contains",
                "empty",
                "eq",
                "gt",
                "gte",
                "has",
                "lt",
                "lte",
            ]
        );
    }

    #[test]
    fn register_overrides_without_touching_clones() {
        let mut context = Context::with_builtins();
        let snapshot = context.clone();
        context.register(
            "always",
            ConditionFunction::new(vec![ArgType::PATH], |_| true),
        );
        assert!(context.condition("always").is_some());
        assert!(snapshot.condition("always").is_none());
    }
}
