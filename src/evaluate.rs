use serde_json::Value;

use crate::context::ResolvedArg;
use crate::path::{Argument, Path, Selector, Step, Target};

impl Path {
    /// Finds everything in `document` matching the compiled path and returns
    /// owned copies, in document order. Duplicates are preserved: the same
    /// value can be reached through several descendant branches.
    pub fn evaluate(&self, document: &Value) -> Vec<Value> {
        self.matches(document).into_iter().cloned().collect()
    }

    /// Like [`Path::evaluate`], but borrows the matches from the document.
    pub fn matches<'doc>(&self, document: &'doc Value) -> Vec<&'doc Value> {
        let mut results = Vec::new();
        let walker = Walker {
            steps: &self.steps,
            limit: self.context.max_depth,
        };
        walker.evaluate_step(0, document, 0, &mut results);
        results
    }
}

struct Walker<'p> {
    steps: &'p [Step],
    limit: usize,
}

impl<'p> Walker<'p> {
    fn evaluate_step<'doc>(
        &self,
        index: usize,
        value: &'doc Value,
        depth: usize,
        results: &mut Vec<&'doc Value>,
    ) {
        if depth > self.limit {
            return;
        }
        let Some(step) = self.steps.get(index) else {
            // Past the last step: the value itself is a match.
            results.push(value);
            return;
        };

        match &step.target {
            Target::Child(selector) | Target::Descendant(selector) => {
                match selector {
                    Selector::Any => match value {
                        Value::Object(map) => {
                            for child in map.values() {
                                self.check_and_evaluate_next(index, child, depth + 1, results);
                            }
                        }
                        Value::Array(items) => {
                            for child in items {
                                self.check_and_evaluate_next(index, child, depth + 1, results);
                            }
                        }
                        _ => {}
                    },
                    Selector::Name(name) => {
                        // Named lookup applies to objects only; arrays and
                        // scalars yield nothing for this branch.
                        if let Value::Object(map) = value {
                            if let Some(child) = map.get(name) {
                                self.check_and_evaluate_next(index, child, depth + 1, results);
                            }
                        }
                    }
                }

                // A descendant step keeps searching deeper at the same step
                // index, in parallel with matching at the current depth.
                if matches!(step.target, Target::Descendant(_)) {
                    match value {
                        Value::Object(map) => {
                            for child in map.values() {
                                self.evaluate_step(index, child, depth + 1, results);
                            }
                        }
                        Value::Array(items) => {
                            for child in items {
                                self.evaluate_step(index, child, depth + 1, results);
                            }
                        }
                        _ => {}
                    }
                }
            }
            Target::Item { start, end } => {
                if let Value::Array(items) = value {
                    let length = items.len();
                    let lo = slice_bound(*start, length);
                    let hi = match end {
                        Some(end) => slice_bound(*end, length),
                        None => length.saturating_sub(1),
                    };
                    let mut i = lo;
                    while i <= hi && i < length {
                        self.check_and_evaluate_next(index, &items[i], depth + 1, results);
                        i += 1;
                    }
                }
            }
        }
    }

    fn check_and_evaluate_next<'doc>(
        &self,
        index: usize,
        value: &'doc Value,
        depth: usize,
        results: &mut Vec<&'doc Value>,
    ) {
        if depth > self.limit {
            return;
        }
        let Some(condition) = self.steps[index].condition.as_ref() else {
            self.evaluate_step(index + 1, value, depth, results);
            return;
        };

        // A filter on an array distributes over its elements: each element
        // is tested on its own and continues to the next step individually.
        if let Value::Array(items) = value {
            for item in items {
                self.check_and_evaluate_next(index, item, depth + 1, results);
            }
            return;
        }

        let resolved: Vec<ResolvedArg> = condition
            .arguments
            .iter()
            .map(|argument| match argument {
                Argument::Path(path) => {
                    let nested = Walker {
                        steps: &path.steps,
                        limit: path.context.max_depth,
                    };
                    let mut matches = Vec::new();
                    nested.evaluate_step(0, value, 0, &mut matches);
                    ResolvedArg::Matches(matches)
                }
                Argument::String(s) => ResolvedArg::String(s.as_str()),
                Argument::Integer(i) => ResolvedArg::Integer(*i),
                Argument::Float(f) => ResolvedArg::Float(*f),
            })
            .collect();

        let mut matched = condition.condition.test(&resolved);
        if condition.inverse {
            matched = !matched;
        }
        if matched {
            self.evaluate_step(index + 1, value, depth, results);
        }
    }
}

/// Resolves a slice bound against a concrete length: negative bounds count
/// from the end, then everything clamps into `[0, length - 1]`.
fn slice_bound(bound: i64, length: usize) -> usize {
    let length = length as i64;
    let mut index = if bound < 0 { length + bound } else { bound };
    if index < 0 || length == 0 {
        index = 0;
    } else if index >= length {
        index = length - 1;
    }
    index as usize
}
