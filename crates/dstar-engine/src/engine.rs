//! The engine context owning every registry.

use std::collections::HashSet;
use std::rc::Rc;

use dstar_config::Config;
use dstar_dom::{Document, NodeId};
use serde_json::Value;

use crate::action::{ActionArgs, ActionEntry, ActionMap};
use crate::error::{ActionError, ConfigurationError, ExtensionError};
use crate::extension::ExtensionConfig;
use crate::preprocess::PreprocessorStack;
use crate::reactivity::Reactivity;
use crate::scanner::Scanner;
use crate::scope;
use crate::store::{ElementStore, NamespacedRecords};

/// Directive engine.
///
/// Holds the registered extension prefixes, the per-element record store,
/// the action map, the engine-wide preprocessor stack and the id counter.
/// Registries only grow; nothing is ever unregistered.
///
/// The engine is single-threaded: records hold reactive cells bound to the
/// current thread's runtime.
#[derive(Debug, Default)]
pub struct Engine {
    config: Config,
    extensions: HashSet<String>,
    store: ElementStore,
    actions: ActionMap,
    preprocessors: PreprocessorStack,
    reactivity: Reactivity,
    next_id: u64,
}

impl Engine {
    /// Create an engine with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with the given configuration.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Register an extension and bind its directives in `doc`.
    ///
    /// Validates the declaration, adds global preprocessors to the engine-wide
    /// stack, then scans the tree once from the configured scan root. The
    /// prefix counts as registered only once the scan completes.
    ///
    /// # Errors
    ///
    /// Returns [`ExtensionError::Configuration`] for an invalid declaration,
    /// before anything is scanned, and [`ExtensionError::ModifierNotAllowed`]
    /// when a directive uses a modifier the extension does not allow. In the
    /// latter case the scan stops and records committed by earlier directives
    /// are kept.
    pub fn register_extension(
        &mut self,
        doc: &Document,
        prefix: &str,
        config: ExtensionConfig,
    ) -> Result<(), ExtensionError> {
        self.validate_extension(prefix, &config)?;
        let extension = config.compile(prefix)?;

        if extension.is_preprocess_global && !extension.preprocessors.is_empty() {
            self.preprocessors
                .extend(extension.preprocessors.iter().cloned());
        }

        let root = doc
            .find_first(&self.config.scan.root)
            .unwrap_or_else(|| doc.root());
        let scanner = Scanner {
            extension: &extension,
            globals: &self.preprocessors,
            actions: &self.actions,
            reactivity: &self.reactivity,
        };
        let bound = scanner.scan(doc, root, &mut self.store)?;

        self.extensions.insert(prefix.to_owned());
        tracing::info!(prefix, bound, "Registered data extension: data-{prefix}");
        Ok(())
    }

    fn validate_extension(
        &self,
        prefix: &str,
        config: &ExtensionConfig,
    ) -> Result<(), ConfigurationError> {
        if prefix.is_empty() || prefix.to_lowercase() != prefix {
            return Err(ConfigurationError::InvalidPrefix {
                prefix: prefix.to_owned(),
            });
        }
        if self.extensions.contains(prefix) {
            return Err(ConfigurationError::DuplicateExtension {
                prefix: prefix.to_owned(),
            });
        }

        let required = config.required_extensions();
        if required.iter().any(|dep| dep == prefix) {
            return Err(ConfigurationError::SelfDependency {
                prefix: prefix.to_owned(),
            });
        }
        if let Some(dependency) = required.iter().find(|dep| !self.extensions.contains(*dep)) {
            return Err(ConfigurationError::MissingDependency {
                prefix: prefix.to_owned(),
                dependency: dependency.clone(),
            });
        }

        Ok(())
    }

    /// Register a named action.
    ///
    /// Every action requires the configured base extension
    /// (`actions.base_extension`) in addition to `required_extensions`.
    ///
    /// # Errors
    ///
    /// See [`ActionError`]. The dependency and uniqueness checks run once per
    /// required extension and the action is inserted on the first pass, so a
    /// failure on a later pass leaves the action registered. In particular an
    /// action with any explicit required extension reports
    /// [`ActionError::DuplicateAction`] even though it was inserted.
    pub fn add_action<S: Into<String>>(
        &mut self,
        name: &str,
        description: &str,
        run: impl Fn(&ActionArgs<'_>) -> Value + 'static,
        required_extensions: impl IntoIterator<Item = S>,
    ) -> Result<(), ActionError> {
        let entry = ActionEntry {
            name: name.to_owned(),
            description: description.to_owned(),
            run: Rc::new(run),
            required_extensions: required_extensions.into_iter().map(Into::into).collect(),
        };
        self.actions
            .register(entry, &self.config.actions.base_extension, &self.extensions)?;

        tracing::info!(action = name, "Registered action: @{name}");
        Ok(())
    }

    /// Whether an extension with `prefix` finished registering.
    #[must_use]
    pub fn is_registered(&self, prefix: &str) -> bool {
        self.extensions.contains(prefix)
    }

    /// Registered actions.
    #[must_use]
    pub fn actions(&self) -> &ActionMap {
        &self.actions
    }

    /// Records owned by `node`.
    #[must_use]
    pub fn records(&self, node: NodeId) -> Option<&NamespacedRecords> {
        self.store.get(node)
    }

    /// The element record store.
    #[must_use]
    pub fn store(&self) -> &ElementStore {
        &self.store
    }

    /// Records visible to a directive on `node`.
    ///
    /// Empty when `node` does not belong to `doc`.
    #[must_use]
    pub fn resolve_scope(&self, doc: &Document, node: NodeId) -> NamespacedRecords {
        scope::resolve_scope(doc, &self.store, node)
    }

    /// Engine-wide preprocessor stack.
    #[must_use]
    pub fn preprocessors(&self) -> &PreprocessorStack {
        &self.preprocessors
    }

    /// Reactive factories handed to binders.
    #[must_use]
    pub fn reactivity(&self) -> &Reactivity {
        &self.reactivity
    }

    /// Engine configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Next value of the engine's id counter, starting at 0.
    pub fn unique_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Drop the records of elements detached from `doc`.
    ///
    /// Records of elements of other documents are kept. Returns the number of
    /// record sets removed.
    pub fn prune_detached(&mut self, doc: &Document) -> usize {
        self.store.prune(doc)
    }
}
