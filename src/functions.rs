//! The standard condition functions.
//!
//! Every function receives its path argument pre-resolved to the ordered
//! match list of that path evaluated at the value being filtered; literal
//! arguments arrive unchanged. All of them are pure predicates.

use serde_json::Value;

use crate::compare::{loose_eq, numeric, text_form};
use crate::context::{ArgType, ConditionFunction, Context, ResolvedArg};

pub(crate) fn register_builtins(context: &mut Context) {
    context.register(
        "eq",
        ConditionFunction::new(vec![ArgType::PATH, ArgType::LITERAL], test_equals),
    );
    context.register(
        "contains",
        ConditionFunction::new(vec![ArgType::PATH, ArgType::STRING], test_contains),
    );
    context.register(
        "cicontains",
        ConditionFunction::new(vec![ArgType::PATH, ArgType::STRING], test_ci_contains),
    );
    context.register(
        "gt",
        ConditionFunction::new(vec![ArgType::PATH, ArgType::FLOAT], test_greater),
    );
    context.register(
        "lt",
        ConditionFunction::new(vec![ArgType::PATH, ArgType::FLOAT], test_less),
    );
    context.register(
        "gte",
        ConditionFunction::new(vec![ArgType::PATH, ArgType::FLOAT], test_greater_or_equal),
    );
    context.register(
        "lte",
        ConditionFunction::new(vec![ArgType::PATH, ArgType::FLOAT], test_less_or_equal),
    );
    context.register(
        "between",
        ConditionFunction::new(
            vec![ArgType::PATH, ArgType::FLOAT, ArgType::FLOAT],
            test_between,
        ),
    );
    context.register(
        "has",
        ConditionFunction::new(vec![ArgType::PATH], test_has),
    );
    context.register(
        "empty",
        ConditionFunction::new(vec![ArgType::PATH], test_empty),
    );
}

/// True when any match loosely equals the literal.
fn test_equals(args: &[ResolvedArg]) -> bool {
    let [matches, literal] = args else {
        return false;
    };
    matches.matches().iter().any(|value| loose_eq(value, literal))
}

/// True when any match's string form contains the substring.
fn test_contains(args: &[ResolvedArg]) -> bool {
    let [matches, substring] = args else {
        return false;
    };
    let substring = substring.as_str();
    matches
        .matches()
        .iter()
        .any(|value| text_form(value).contains(substring))
}

/// Case-insensitive `contains`, folding both sides with `str::to_lowercase`.
fn test_ci_contains(args: &[ResolvedArg]) -> bool {
    let [matches, substring] = args else {
        return false;
    };
    let substring = substring.as_str().to_lowercase();
    matches
        .matches()
        .iter()
        .any(|value| text_form(value).to_lowercase().contains(&substring))
}

fn test_greater(args: &[ResolvedArg]) -> bool {
    any_numeric(args, |value, bound| value > bound)
}

fn test_less(args: &[ResolvedArg]) -> bool {
    any_numeric(args, |value, bound| value < bound)
}

fn test_greater_or_equal(args: &[ResolvedArg]) -> bool {
    any_numeric(args, |value, bound| value >= bound)
}

fn test_less_or_equal(args: &[ResolvedArg]) -> bool {
    any_numeric(args, |value, bound| value <= bound)
}

fn any_numeric(args: &[ResolvedArg], compare: impl Fn(f64, f64) -> bool) -> bool {
    let [matches, bound] = args else {
        return false;
    };
    let bound = bound.as_f64();
    matches
        .matches()
        .iter()
        .any(|value| numeric(value).is_some_and(|f| compare(f, bound)))
}

/// True when any match is strictly between the two bounds.
fn test_between(args: &[ResolvedArg]) -> bool {
    let [matches, low, high] = args else {
        return false;
    };
    let (low, high) = (low.as_f64(), high.as_f64());
    matches
        .matches()
        .iter()
        .any(|value| numeric(value).is_some_and(|f| f > low && f < high))
}

/// True when the path matched anything at all.
fn test_has(args: &[ResolvedArg]) -> bool {
    let [matches] = args else {
        return false;
    };
    !matches.matches().is_empty()
}

/// True when the path matched nothing, or every match is an empty string,
/// null, or numeric zero.
fn test_empty(args: &[ResolvedArg]) -> bool {
    let [matches] = args else {
        return false;
    };
    matches.matches().iter().all(|value| match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn matches(values: Vec<&Value>) -> ResolvedArg {
        ResolvedArg::Matches(values)
    }

    #[test]
    fn equals_checks_every_match() {
        let (a, b) = (json!("Elm"), json!("Oak"));
        let args = [matches(vec![&a, &b]), ResolvedArg::String("Oak")];
        assert!(test_equals(&args));

        let args = [matches(vec![&a]), ResolvedArg::String("Oak")];
        assert!(!test_equals(&args));
    }

    #[test]
    fn contains_is_case_sensitive_cicontains_is_not() {
        let title = json!("Moby Dick");
        let args = [matches(vec![&title]), ResolvedArg::String("moby")];
        assert!(!test_contains(&args));
        assert!(test_ci_contains(&args));
    }

    #[test]
    fn comparisons_skip_non_numeric_matches() {
        let (word, number) = (json!("many"), json!(12));
        let args = [matches(vec![&word, &number]), ResolvedArg::Float(10.0)];
        assert!(test_greater(&args));
        assert!(!test_less(&args));

        let args = [matches(vec![&word]), ResolvedArg::Float(10.0)];
        assert!(!test_greater(&args));
    }

    #[test]
    fn between_is_exclusive() {
        let price = json!(10.0);
        let args = [
            matches(vec![&price]),
            ResolvedArg::Float(10.0),
            ResolvedArg::Float(20.0),
        ];
        assert!(!test_between(&args));

        let price = json!(10.5);
        let args = [
            matches(vec![&price]),
            ResolvedArg::Float(10.0),
            ResolvedArg::Float(20.0),
        ];
        assert!(test_between(&args));
    }

    #[test]
    fn has_and_empty_look_at_the_match_list() {
        let zero = json!(0);
        let blank = json!("");
        let null = json!(null);
        let word = json!("x");

        assert!(!test_has(&[matches(vec![])]));
        assert!(test_has(&[matches(vec![&word])]));

        assert!(test_empty(&[matches(vec![])]));
        assert!(test_empty(&[matches(vec![&zero, &blank, &null])]));
        assert!(!test_empty(&[matches(vec![&zero, &word])]));
    }
}
