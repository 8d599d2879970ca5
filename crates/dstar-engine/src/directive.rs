//! Directive attribute parsing.
//!
//! Directives are written as `data-{prefix}-{name}[.modifier[:arg]*]*` and
//! parsed from the attribute's dataset key, where the dashes have already
//! been folded into camel case (`data-on-click.once` becomes `onClick.once`).

/// One `.label[:arg]*` segment of a directive key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modifier {
    /// Modifier label, the text before the first `:`.
    pub label: String,
    /// Colon-separated arguments after the label.
    pub args: Vec<String>,
}

impl Modifier {
    /// Parse a single modifier segment.
    #[must_use]
    pub fn parse(segment: &str) -> Self {
        let mut parts = segment.split(':');
        let label = parts.next().unwrap_or_default().to_owned();
        let args = parts.map(str::to_owned).collect();
        Self { label, args }
    }
}

/// A parsed directive occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Prefix of the extension the directive belongs to.
    pub namespace: String,
    /// Local name: the key with the prefix stripped, first character lower-cased.
    pub name: String,
    /// Modifiers in attribute order.
    pub modifiers: Vec<Modifier>,
}

impl Directive {
    /// Parse a dataset key for the extension with the given prefix.
    ///
    /// Returns `None` when the key does not start with `prefix`. Matching is
    /// a plain string prefix test, so `foobar` matches prefix `foo` with the
    /// local name `bar`.
    ///
    /// # Example
    ///
    /// ```
    /// use dstar_engine::Directive;
    ///
    /// let directive = Directive::parse("on", "onKeyDown.key:enter:space.prevent").unwrap();
    /// assert_eq!(directive.name, "keyDown");
    /// assert_eq!(directive.modifiers[0].label, "key");
    /// assert_eq!(directive.modifiers[0].args, ["enter", "space"]);
    /// assert!(directive.has_modifier("prevent"));
    /// ```
    #[must_use]
    pub fn parse(prefix: &str, key: &str) -> Option<Self> {
        let rest = key.strip_prefix(prefix)?;
        let mut segments = rest.split('.');
        let name = lowercase_first(segments.next().unwrap_or_default());
        let modifiers = segments.map(Modifier::parse).collect();

        Some(Self {
            namespace: prefix.to_owned(),
            name,
            modifiers,
        })
    }

    /// Whether a modifier with `label` is present.
    #[must_use]
    pub fn has_modifier(&self, label: &str) -> bool {
        has_modifier(&self.modifiers, label)
    }

    /// First modifier with `label`.
    #[must_use]
    pub fn with_modifier(&self, label: &str) -> Option<&Modifier> {
        with_modifier(&self.modifiers, label)
    }
}

/// Whether `modifiers` contains one with `label`.
#[must_use]
pub fn has_modifier(modifiers: &[Modifier], label: &str) -> bool {
    modifiers.iter().any(|m| m.label == label)
}

/// First modifier in `modifiers` with `label`.
#[must_use]
pub fn with_modifier<'a>(modifiers: &'a [Modifier], label: &str) -> Option<&'a Modifier> {
    modifiers.iter().find(|m| m.label == label)
}

fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
