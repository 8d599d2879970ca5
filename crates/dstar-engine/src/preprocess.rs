//! Text rewrite rules applied to raw attribute values.
//!
//! A [`Preprocessor`] pairs a regular expression with a replacement function.
//! Extensions contribute preprocessors either to the engine-wide stack, where
//! they rewrite the expressions of every extension registered afterwards, or
//! privately, where they only apply to the declaring extension.

use std::collections::HashMap;
use std::fmt;
use std::ops::Range;
use std::rc::Rc;

use regex::Regex;

/// One match of a preprocessor pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreprocessMatch {
    /// Byte range of the full match in the text the pattern ran on.
    pub span: Range<usize>,
    /// Text of the full match.
    pub whole: String,
    /// Named capture groups that took part in the match.
    pub groups: HashMap<String, String>,
}

impl PreprocessMatch {
    /// Value of a named capture group.
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&str> {
        self.groups.get(name).map(String::as_str)
    }
}

/// Replacement callback of a [`Preprocessor`].
pub type ReplaceFn = dyn Fn(&PreprocessMatch) -> String;

/// A named text rewrite rule.
///
/// # Example
///
/// ```
/// use dstar_engine::Preprocessor;
/// use regex::Regex;
///
/// let signals = Preprocessor::new(
///     "signal",
///     "Replace $name with a signal lookup",
///     Regex::new(r"\$(?<name>\w+)").unwrap(),
///     |m| format!("ctx.signals.{}.value", m.group("name").unwrap_or_default()),
/// );
///
/// assert_eq!(signals.apply("$count + 1"), "ctx.signals.count.value + 1");
/// ```
#[derive(Clone)]
pub struct Preprocessor {
    name: String,
    description: String,
    pattern: Regex,
    replace: Rc<ReplaceFn>,
}

impl Preprocessor {
    /// Create a preprocessor.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        pattern: Regex,
        replace: impl Fn(&PreprocessMatch) -> String + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            pattern,
            replace: Rc::new(replace),
        }
    }

    /// Preprocessor name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Match pattern.
    #[must_use]
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// Rewrite `text`.
    ///
    /// All non-overlapping matches are collected from the input first. Each
    /// match then replaces the first remaining occurrence of its matched text
    /// in the working string, in match order. Two matches with the same text
    /// therefore both target the leftmost remaining occurrence. Returns the
    /// input unchanged when nothing matches.
    #[must_use]
    pub fn apply(&self, text: &str) -> String {
        let matches: Vec<PreprocessMatch> = self
            .pattern
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let groups = self
                    .pattern
                    .capture_names()
                    .flatten()
                    .filter_map(|name| {
                        caps.name(name)
                            .map(|m| (name.to_owned(), m.as_str().to_owned()))
                    })
                    .collect();
                Some(PreprocessMatch {
                    span: whole.range(),
                    whole: whole.as_str().to_owned(),
                    groups,
                })
            })
            .collect();

        if matches.is_empty() {
            return text.to_owned();
        }

        let mut output = text.to_owned();
        for m in &matches {
            let replacement = (self.replace)(m);
            output = output.replacen(&m.whole, &replacement, 1);
        }

        tracing::trace!(
            preprocessor = %self.name,
            matches = matches.len(),
            input = text,
            output = %output,
            "Preprocessed expression"
        );
        output
    }
}

impl fmt::Debug for Preprocessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Preprocessor")
            .field("name", &self.name)
            .field("pattern", &self.pattern.as_str())
            .finish_non_exhaustive()
    }
}

/// Ordered, append-only list of preprocessors.
#[derive(Debug, Clone, Default)]
pub struct PreprocessorStack {
    entries: Vec<Preprocessor>,
}

impl PreprocessorStack {
    /// Create an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append preprocessors, keeping their order.
    pub fn extend(&mut self, preprocessors: impl IntoIterator<Item = Preprocessor>) {
        self.entries.extend(preprocessors);
    }

    /// Preprocessors in application order.
    pub fn iter(&self) -> impl Iterator<Item = &Preprocessor> {
        self.entries.iter()
    }

    /// Number of preprocessors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the stack is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run every preprocessor over `text`, in order.
    #[must_use]
    pub fn apply(&self, text: &str) -> String {
        apply_all(&self.entries, text)
    }
}

/// Run `preprocessors` over `text` sequentially.
#[must_use]
pub fn apply_all<'a>(preprocessors: impl IntoIterator<Item = &'a Preprocessor>, text: &str) -> String {
    preprocessors
        .into_iter()
        .fold(text.to_owned(), |acc, p| p.apply(&acc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dollar_signals() -> Preprocessor {
        Preprocessor::new(
            "signal",
            "Replace $name with a signal read",
            Regex::new(r"\$(?<name>[a-zA-Z_]\w*)").unwrap(),
            |m| format!("s.{}()", m.group("name").unwrap_or_default()),
        )
    }

    #[test]
    fn test_no_match_returns_input() {
        let p = dollar_signals();
        assert_eq!(p.apply("1 + 2"), "1 + 2");
    }

    #[test]
    fn test_replaces_every_match() {
        let p = dollar_signals();
        assert_eq!(p.apply("$a + $b"), "s.a() + s.b()");
    }

    #[test]
    fn test_idempotent_after_exhaustion() {
        let p = dollar_signals();
        let once = p.apply("$count * 2");
        assert_eq!(p.apply(&once), once);
    }

    #[test]
    fn test_identical_matches_target_first_occurrence() {
        let counter = std::cell::Cell::new(0);
        let counter = Rc::new(counter);
        let p = Preprocessor::new(
            "numbered",
            "Number each x",
            Regex::new("x").unwrap(),
            {
                let counter = Rc::clone(&counter);
                move |_| {
                    counter.set(counter.get() + 1);
                    format!("x{}", counter.get())
                }
            },
        );

        // The second replacement finds the `x` inside "x1" first.
        assert_eq!(p.apply("x x"), "x21 x");
        assert_eq!(counter.get(), 2);
    }

    #[test]
    fn test_match_carries_span_and_groups() {
        let seen = Rc::new(std::cell::RefCell::new(Vec::new()));
        let p = Preprocessor::new(
            "pair",
            "Capture key=value",
            Regex::new(r"(?<key>\w+)=(?<value>\w+)?").unwrap(),
            {
                let seen = Rc::clone(&seen);
                move |m| {
                    seen.borrow_mut().push(m.clone());
                    m.whole.clone()
                }
            },
        );

        let _ = p.apply("a=1 b=");
        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].span, 0..3);
        assert_eq!(seen[0].group("key"), Some("a"));
        assert_eq!(seen[0].group("value"), Some("1"));
        assert_eq!(seen[1].whole, "b=");
        assert_eq!(seen[1].group("value"), None);
    }

    #[test]
    fn test_stack_applies_in_order() {
        let upper = Preprocessor::new("upper", "", Regex::new("a").unwrap(), |_| "A".to_owned());
        let wrap = Preprocessor::new("wrap", "", Regex::new("A").unwrap(), |_| "[A]".to_owned());

        let mut stack = PreprocessorStack::new();
        stack.extend([upper, wrap]);

        assert_eq!(stack.len(), 2);
        assert_eq!(stack.apply("a"), "[A]");
        let names: Vec<_> = stack.iter().map(Preprocessor::name).collect();
        assert_eq!(names, ["upper", "wrap"]);
    }
}
