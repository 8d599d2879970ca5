//! Extension declarations.

use std::collections::HashSet;
use std::fmt;

use dstar_dom::ElementRef;
use regex::Regex;

use crate::action::ActionMap;
use crate::directive::{Modifier, has_modifier, with_modifier};
use crate::error::ConfigurationError;
use crate::preprocess::Preprocessor;
use crate::reactivity::Reactivity;
use crate::store::NamespacedRecords;

/// Everything a binder gets for one directive occurrence.
pub struct BinderArgs<'a> {
    /// Directive local name.
    pub name: &'a str,
    /// Attribute value after preprocessing.
    pub expression: &'a str,
    /// Element carrying the directive.
    pub element: ElementRef<'a>,
    /// Records inherited from the element and its ancestors, as committed so far.
    pub scope: &'a NamespacedRecords,
    /// Reactive factories.
    pub reactivity: &'a Reactivity,
    /// Directive modifiers in attribute order.
    pub modifiers: &'a [Modifier],
    /// Registered actions.
    pub actions: &'a ActionMap,
}

impl BinderArgs<'_> {
    /// Whether the directive carries a modifier with `label`.
    #[must_use]
    pub fn has_modifier(&self, label: &str) -> bool {
        has_modifier(self.modifiers, label)
    }

    /// First modifier with `label`.
    #[must_use]
    pub fn with_modifier(&self, label: &str) -> Option<&Modifier> {
        with_modifier(self.modifiers, label)
    }
}

/// Turns one directive occurrence into records and side effects.
///
/// A returned patch is merged into the element's records.
pub type Binder = dyn Fn(BinderArgs<'_>) -> Option<NamespacedRecords>;

/// Allowed-modifier pattern, given as regex source or compiled.
#[derive(Debug, Clone)]
pub enum ModifierPattern {
    /// Regex source, compiled at registration.
    Source(String),
    /// Compiled regex.
    Regex(Regex),
}

impl From<&str> for ModifierPattern {
    fn from(source: &str) -> Self {
        Self::Source(source.to_owned())
    }
}

impl From<String> for ModifierPattern {
    fn from(source: String) -> Self {
        Self::Source(source)
    }
}

impl From<Regex> for ModifierPattern {
    fn from(regex: Regex) -> Self {
        Self::Regex(regex)
    }
}

impl ModifierPattern {
    fn compile(self, prefix: &str) -> Result<Regex, ConfigurationError> {
        match self {
            Self::Regex(regex) => Ok(regex),
            Self::Source(pattern) => {
                Regex::new(&pattern).map_err(|source| ConfigurationError::InvalidModifierPattern {
                    prefix: prefix.to_owned(),
                    pattern,
                    source,
                })
            }
        }
    }
}

/// Declaration of an extension.
///
/// # Example
///
/// ```
/// use dstar_engine::ExtensionConfig;
///
/// let config = ExtensionConfig::new()
///     .with_allowed_tags(["button", "a"])
///     .with_allowed_modifiers(["once", "debounce"])
///     .with_required_extensions(["signals"])
///     .with_binder(|args| {
///         assert!(!args.has_modifier("never"));
///         None
///     });
/// ```
#[derive(Default)]
pub struct ExtensionConfig {
    allowed_tags: Vec<String>,
    allowed_modifiers: Vec<ModifierPattern>,
    is_preprocess_global: Option<bool>,
    preprocess_expressions: Vec<Preprocessor>,
    binder: Option<Box<Binder>>,
    required_extensions: Vec<String>,
}

impl ExtensionConfig {
    /// Create an empty declaration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the extension to these tags. Empty means any tag.
    #[must_use]
    pub fn with_allowed_tags<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.allowed_tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Allow modifiers whose label matches any of these patterns.
    #[must_use]
    pub fn with_allowed_modifiers<P: Into<ModifierPattern>>(
        mut self,
        patterns: impl IntoIterator<Item = P>,
    ) -> Self {
        self.allowed_modifiers
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Whether the preprocessors join the engine-wide stack.
    ///
    /// Default: `true`
    #[must_use]
    pub fn with_preprocess_global(mut self, global: bool) -> Self {
        self.is_preprocess_global = Some(global);
        self
    }

    /// Add a preprocessor.
    #[must_use]
    pub fn with_preprocessor(mut self, preprocessor: Preprocessor) -> Self {
        self.preprocess_expressions.push(preprocessor);
        self
    }

    /// Set the binder.
    #[must_use]
    pub fn with_binder<F>(mut self, binder: F) -> Self
    where
        F: Fn(BinderArgs<'_>) -> Option<NamespacedRecords> + 'static,
    {
        self.binder = Some(Box::new(binder));
        self
    }

    /// Require extensions to be registered before this one.
    #[must_use]
    pub fn with_required_extensions<S: Into<String>>(
        mut self,
        extensions: impl IntoIterator<Item = S>,
    ) -> Self {
        self.required_extensions
            .extend(extensions.into_iter().map(Into::into));
        self
    }

    pub(crate) fn required_extensions(&self) -> &[String] {
        &self.required_extensions
    }

    /// Compile into a registered extension.
    pub(crate) fn compile(self, prefix: &str) -> Result<Extension, ConfigurationError> {
        let allowed_modifiers = self
            .allowed_modifiers
            .into_iter()
            .map(|pattern| pattern.compile(prefix))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Extension {
            prefix: prefix.to_owned(),
            allowed_tags: self
                .allowed_tags
                .iter()
                .map(|tag| tag.to_lowercase())
                .collect(),
            allowed_modifiers,
            is_preprocess_global: self.is_preprocess_global.unwrap_or(true),
            preprocessors: self.preprocess_expressions,
            binder: self.binder,
        })
    }
}

impl fmt::Debug for ExtensionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionConfig")
            .field("allowed_tags", &self.allowed_tags)
            .field("allowed_modifiers", &self.allowed_modifiers)
            .field("is_preprocess_global", &self.is_preprocess_global)
            .field("preprocess_expressions", &self.preprocess_expressions)
            .field("has_binder", &self.binder.is_some())
            .field("required_extensions", &self.required_extensions)
            .finish()
    }
}

/// A validated extension, ready to scan.
pub(crate) struct Extension {
    pub(crate) prefix: String,
    allowed_tags: HashSet<String>,
    allowed_modifiers: Vec<Regex>,
    pub(crate) is_preprocess_global: bool,
    pub(crate) preprocessors: Vec<Preprocessor>,
    pub(crate) binder: Option<Box<Binder>>,
}

impl Extension {
    pub(crate) fn allows_tag(&self, tag: &str) -> bool {
        self.allowed_tags.is_empty() || self.allowed_tags.contains(&tag.to_lowercase())
    }

    pub(crate) fn allows_modifier(&self, label: &str) -> bool {
        self.allowed_modifiers.iter().any(|re| re.is_match(label))
    }

    /// Preprocessors applied only to this extension's expressions.
    pub(crate) fn own_preprocessors(&self) -> &[Preprocessor] {
        if self.is_preprocess_global {
            &[]
        } else {
            &self.preprocessors
        }
    }
}
