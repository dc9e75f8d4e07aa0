use crate::context::{ArgType, Context};
use crate::cursor::Cursor;
use crate::errors::SyntaxError;
use crate::path::{Argument, Expression, Path, Selector, Step, Target};

/// Recursive-descent compiler for path expressions.
///
/// A compiler makes a single forward pass over the source text. Nested
/// sub-paths inside filter arguments are parsed by a fresh compiler sharing
/// the same source; the outer cursor only advances to the inner compiler's
/// final position once it succeeds.
pub(crate) struct Compiler<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Compiler<'a> {
    pub fn new(source: &'a str, index: usize) -> Self {
        Self {
            cursor: Cursor::new(source, index),
        }
    }

    pub fn parse_path(&mut self, context: &Context) -> Result<Path, SyntaxError> {
        let mut steps = Vec::new();
        let start = self.cursor.index;

        loop {
            if self.cursor.skip(b'.') {
                let descendant = self.cursor.skip(b'.');
                if descendant && !context.allow_descendants {
                    return Err(self.errorf(format!(
                        "unexpected {:?}, expected a name",
                        self.cursor.offset_char(-1).unwrap_or('.')
                    )));
                }

                let mark = self.cursor.index;
                if !self.cursor.skip_name() {
                    return Err(self.errorf("missing name"));
                }
                let selector = match self.cursor.text(mark) {
                    "*" => Selector::Any,
                    name => Selector::Name(name.to_string()),
                };

                let condition = self.parse_condition(context)?;
                steps.push(Step {
                    target: if descendant {
                        Target::Descendant(selector)
                    } else {
                        Target::Child(selector)
                    },
                    condition,
                });
            } else if self.cursor.skip(b'[') {
                let target = self.parse_item_target()?;
                let condition = self.parse_condition(context)?;
                steps.push(Step { target, condition });
            } else {
                // A top-level path must consume its whole input; a nested
                // path just has to make progress before handing back.
                if (start == 0 || start == self.cursor.index) && !self.cursor.at_end() {
                    return Err(self.unexpected_char_error());
                }
                return Ok(Path {
                    context: context.clone(),
                    steps,
                    source: self.cursor.text(start).to_string(),
                });
            }
        }
    }

    /// Parses the body of an item step after the opening `[`, including the
    /// closing `]`.
    fn parse_item_target(&mut self) -> Result<Target, SyntaxError> {
        let mut start = 0;
        let mut end = None;
        let mut has_body = true;

        if self.cursor.skip(b'*') {
            // Full slice: everything from the first to the last element.
        } else {
            let mark = self.cursor.index;
            if self.cursor.skip_integer() {
                start = self.parse_i64(mark)?;
                if self.cursor.skip(b':') {
                    let mark = self.cursor.index;
                    if self.cursor.skip_integer() {
                        end = Some(self.parse_i64(mark)?);
                    }
                } else {
                    end = Some(start);
                }
            } else if self.cursor.skip(b':') {
                let mark = self.cursor.index;
                if self.cursor.skip_integer() {
                    end = Some(self.parse_i64(mark)?);
                }
            } else {
                has_body = false;
            }
        }

        if !has_body && self.cursor.peek(b']') {
            return Err(self.unexpected_char_error());
        }
        if !self.cursor.skip(b']') {
            return Err(self.expected_char_error(']'));
        }
        Ok(Target::Item { start, end })
    }

    /// Parses an optional filter expression. A missing opening `(` simply
    /// means the step carries no filter.
    fn parse_condition(&mut self, context: &Context) -> Result<Option<Expression>, SyntaxError> {
        if !self.cursor.skip(b'(') {
            return Ok(None);
        }

        self.cursor.skip_all(b' ');
        let inverse = self.cursor.skip(b'!');

        let mark = self.cursor.index;
        if !self.cursor.skip_name() {
            return Err(self.errorf(format!(
                "unexpected {}, expected expression name",
                self.describe_current()
            )));
        }
        let name = self.cursor.text(mark);

        let Some(function) = context.condition(name) else {
            return Err(self.errorf(format!(
                "unknown expression {:?}, expected one of: {}",
                name,
                context.condition_names().join(", ")
            )));
        };
        let arg_count = function.signature().len();

        if !self.cursor.skip(b'(') {
            return Err(self.expected_char_error('('));
        }

        let mut arguments = Vec::with_capacity(arg_count);
        loop {
            self.cursor.skip_all(b' ');

            if arguments.len() >= arg_count {
                return Err(self.errorf(format!(
                    "unexpected argument {}, only expected {} arguments",
                    arguments.len() + 1,
                    arg_count
                )));
            }
            let accepted = function.signature()[arguments.len()];

            let argument = self.parse_argument(context, accepted)?;
            if !accepted.accepts(argument.arg_type()) {
                return Err(self.errorf(format!(
                    "unexpected argument type {}, expected one of: {}",
                    argument.arg_type().names().join(", "),
                    accepted.names().join(", ")
                )));
            }
            arguments.push(argument);

            if !self.cursor.skip(b',') {
                break;
            }
        }

        if arguments.len() != arg_count {
            return Err(self.errorf(format!(
                "expected {} arguments, only got {}",
                arg_count,
                arguments.len()
            )));
        }

        self.cursor.skip_all(b' ');
        if !self.cursor.skip(b')') {
            return Err(self.expected_char_error(')'));
        }
        self.cursor.skip_all(b' ');
        if !self.cursor.skip(b')') {
            return Err(self.expected_char_error(')'));
        }

        Ok(Some(Expression {
            condition: function,
            inverse,
            arguments,
        }))
    }

    fn parse_argument(
        &mut self,
        context: &Context,
        accepted: ArgType,
    ) -> Result<Argument, SyntaxError> {
        let mark = self.cursor.index;

        // A path relative to the value being filtered.
        if self.cursor.skip(b'@') {
            let mut nested = Compiler::new(self.cursor.source(), self.cursor.index);
            let path = nested.parse_path(context)?;
            self.cursor.index = nested.cursor.index;
            return Ok(Argument::Path(path));
        }

        if self.cursor.peek(b'"') || self.cursor.peek(b'\'') || self.cursor.peek(b'`') {
            return Ok(Argument::String(self.parse_string_literal()?));
        }

        let scan = self.cursor.skip_number();
        if !scan.is_number {
            return Err(self.errorf(format!(
                "unexpected {}, expected an argument",
                self.describe_current()
            )));
        }
        let text = self.cursor.text(mark);

        // An integer literal only keeps its integer type when the position
        // accepts one; otherwise it is coerced to a float.
        if !scan.is_float && accepted.accepts(ArgType::INTEGER) {
            let value = text
                .parse()
                .map_err(|_| self.errorf(format!("invalid integer {text:?}")))?;
            Ok(Argument::Integer(value))
        } else {
            let value = text
                .parse()
                .map_err(|_| self.errorf(format!("invalid number {text:?}")))?;
            Ok(Argument::Float(value))
        }
    }

    /// Parses a string literal bounded by `"`, `'` or a backtick. No escape
    /// sequences are recognised.
    fn parse_string_literal(&mut self) -> Result<String, SyntaxError> {
        for quote in [b'"', b'\'', b'`'] {
            if self.cursor.skip(quote) {
                let mark = self.cursor.index;
                if !self.cursor.skip_until(quote) {
                    return Err(self.errorf(format!("missing closing {:?}", quote as char)));
                }
                let text = self.cursor.text(mark);
                return Ok(text[..text.len() - 1].to_string());
            }
        }
        Err(self.errorf(format!(
            "unexpected {}, expected string literal",
            self.describe_current()
        )))
    }

    fn parse_i64(&self, mark: usize) -> Result<i64, SyntaxError> {
        let text = self.cursor.text(mark);
        text.parse()
            .map_err(|_| self.errorf(format!("invalid integer {text:?}")))
    }

    fn errorf(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(self.cursor.source(), self.cursor.index, message)
    }

    fn unexpected_char_error(&self) -> SyntaxError {
        self.errorf(format!("unexpected {}", self.describe_current()))
    }

    fn expected_char_error(&self, expected: char) -> SyntaxError {
        self.errorf(format!(
            "unexpected {}, expected {:?}",
            self.describe_current(),
            expected
        ))
    }

    fn describe_current(&self) -> String {
        match self.cursor.current_char() {
            Some(c) => c.to_string(),
            None => "EOF".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ArgType, ConditionFunction};
    use pretty_assertions::assert_eq;

    fn parse(source: &str, context: &Context) -> Path {
        match Compiler::new(source, 0).parse_path(context) {
            Ok(path) => path,
            Err(err) => panic!("{err}"),
        }
    }

    #[test]
    fn parses_child_steps() {
        let context = Context::with_builtins();
        let path = parse(".store.bicycle", &context);
        assert_eq!(path.steps.len(), 2);
        assert_eq!(path.source, ".store.bicycle");
        match &path.steps[0].target {
            Target::Child(Selector::Name(name)) => assert_eq!(name, "store"),
            other => panic!("unexpected target: {other:?}"),
        }
        assert!(path.steps[0].condition.is_none());
    }

    #[test]
    fn parses_wildcard_and_descendant_steps() {
        let mut context = Context::with_builtins();
        context.allow_descendants = true;

        let path = parse(".*", &context);
        assert!(matches!(&path.steps[0].target, Target::Child(Selector::Any)));

        let path = parse("..price", &context);
        assert!(matches!(
            &path.steps[0].target,
            Target::Descendant(Selector::Name(name)) if name == "price"
        ));
    }

    #[test]
    fn parses_item_step_bounds() {
        let context = Context::with_builtins();
        let cases = [
            ("[*]", 0, None),
            ("[5]", 5, Some(5)),
            ("[-1]", -1, Some(-1)),
            ("[1:]", 1, None),
            ("[:3]", 0, Some(3)),
            ("[:]", 0, None),
            ("[-2:-1]", -2, Some(-1)),
            ("[2:4]", 2, Some(4)),
        ];
        for (source, start, end) in cases {
            let path = parse(source, &context);
            match &path.steps[0].target {
                Target::Item { start: s, end: e } => {
                    assert_eq!((*s, *e), (start, end), "for {source}");
                }
                other => panic!("unexpected target for {source}: {other:?}"),
            }
        }
    }

    #[test]
    fn parses_a_filter_with_nested_path_and_string() {
        let context = Context::with_builtins();
        let path = parse(r#".book(eq(@.category, "fiction")).title"#, &context);
        assert_eq!(path.steps.len(), 2);

        let expr = path.steps[0].condition.as_ref().expect("condition");
        assert!(!expr.inverse);
        assert_eq!(expr.arguments.len(), 2);
        match &expr.arguments[0] {
            Argument::Path(nested) => assert_eq!(nested.source, ".category"),
            other => panic!("unexpected argument: {other:?}"),
        }
        match &expr.arguments[1] {
            Argument::String(s) => assert_eq!(s, "fiction"),
            other => panic!("unexpected argument: {other:?}"),
        }
    }

    #[test]
    fn parses_an_inverse_filter_with_spaces() {
        let context = Context::with_builtins();
        let path = parse(".book( !has(@.isbn) )", &context);
        let expr = path.steps[0].condition.as_ref().expect("condition");
        assert!(expr.inverse);
        assert_eq!(expr.arguments.len(), 1);
    }

    #[test]
    fn integer_literals_coerce_to_float_unless_accepted() {
        let mut context = Context::with_builtins();
        context.register(
            "nth",
            ConditionFunction::new(vec![ArgType::PATH, ArgType::INTEGER], |_| true),
        );

        // gt declares a float position, so a bare integer becomes a float.
        let path = parse(".a(gt(@.b, 10))", &context);
        let expr = path.steps[0].condition.as_ref().expect("condition");
        assert!(matches!(expr.arguments[1], Argument::Float(f) if f == 10.0));

        let path = parse(".a(nth(@.b, 3))", &context);
        let expr = path.steps[0].condition.as_ref().expect("condition");
        assert!(matches!(expr.arguments[1], Argument::Integer(3)));

        let path = parse(".a(gt(@.b, 2.5))", &context);
        let expr = path.steps[0].condition.as_ref().expect("condition");
        assert!(matches!(expr.arguments[1], Argument::Float(f) if f == 2.5));
    }

    #[test]
    fn nested_paths_stop_at_the_argument_separator() {
        let context = Context::with_builtins();
        let path = parse(".a(between(@.b[0], 1, 2))", &context);
        let expr = path.steps[0].condition.as_ref().expect("condition");
        match &expr.arguments[0] {
            Argument::Path(nested) => {
                assert_eq!(nested.source, ".b[0]");
                assert_eq!(nested.steps.len(), 2);
            }
            other => panic!("unexpected argument: {other:?}"),
        }
    }
}
