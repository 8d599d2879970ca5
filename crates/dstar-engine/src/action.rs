//! Named callables available to binders.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::rc::Rc;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;

use crate::error::ActionError;
use crate::store::NamespacedRecords;

static CAMELIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?-u:^\w|[A-Z]|\b\w)").unwrap());

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Normalize `s` to camelCase.
///
/// Lower-cases a leading word character, upper-cases every other upper-case
/// letter or word start, and drops whitespace. A name is camelCase exactly
/// when it is left unchanged.
///
/// # Example
///
/// ```
/// use dstar_engine::camelize;
///
/// assert_eq!(camelize("set all"), "setAll");
/// assert_eq!(camelize("fetchJson"), "fetchJson");
/// assert_eq!(camelize("Foo_bar"), "foo_bar");
/// ```
#[must_use]
pub fn camelize(s: &str) -> String {
    let cased = CAMELIZE_RE.replace_all(s, |caps: &Captures<'_>| {
        let Some(m) = caps.get(0) else {
            return String::new();
        };
        if m.start() == 0 {
            m.as_str().to_lowercase()
        } else {
            m.as_str().to_uppercase()
        }
    });
    WHITESPACE_RE.replace_all(&cased, "").into_owned()
}

/// Arguments of an action invocation.
#[derive(Debug, Clone, Copy)]
pub struct ActionArgs<'a> {
    /// Scope of the element the action is invoked for.
    pub scope: &'a NamespacedRecords,
    /// Positional arguments.
    pub args: &'a [Value],
}

/// Action callable.
pub type ActionFn = Rc<dyn Fn(&ActionArgs<'_>) -> Value>;

/// A registered action.
#[derive(Clone)]
pub struct ActionEntry {
    /// Action name, camelCase.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// The callable.
    pub run: ActionFn,
    /// Extensions the action declared as requirements.
    pub required_extensions: Vec<String>,
}

impl fmt::Debug for ActionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionEntry")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("required_extensions", &self.required_extensions)
            .finish_non_exhaustive()
    }
}

/// Registered actions by name.
#[derive(Debug, Clone, Default)]
pub struct ActionMap {
    entries: BTreeMap<String, ActionEntry>,
}

impl ActionMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an action.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ActionEntry> {
        self.entries.get(name)
    }

    /// Whether an action with `name` exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Invoke an action by name.
    ///
    /// Returns `None` when no such action is registered.
    pub fn call(&self, name: &str, args: &ActionArgs<'_>) -> Option<Value> {
        self.entries.get(name).map(|entry| (entry.run)(args))
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no action is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validate and insert `entry`.
    ///
    /// The dependency and uniqueness checks run once per extension in
    /// `[base_extension, ..entry.required_extensions]`, inserting the entry on
    /// the first pass. With more than one required extension the second pass
    /// therefore reports [`ActionError::DuplicateAction`] for the entry that
    /// was just inserted.
    pub(crate) fn register(
        &mut self,
        entry: ActionEntry,
        base_extension: &str,
        registered: &HashSet<String>,
    ) -> Result<(), ActionError> {
        if entry.name != camelize(&entry.name) {
            return Err(ActionError::NotCamelCase { name: entry.name });
        }

        let extensions: Vec<String> = std::iter::once(base_extension.to_owned())
            .chain(entry.required_extensions.iter().cloned())
            .collect();

        for extension in extensions {
            if !registered.contains(&extension) {
                return Err(ActionError::MissingDependency {
                    name: entry.name,
                    extension,
                });
            }
            if self.entries.contains_key(&entry.name) {
                return Err(ActionError::DuplicateAction { name: entry.name });
            }
            self.entries.insert(entry.name.clone(), entry.clone());
        }

        Ok(())
    }
}
