//! Error types for extension and action registration.

/// Invalid extension declaration, detected before the document is scanned.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// Prefix is empty or contains upper-case characters.
    #[error("Data extension 'data-{prefix}' must be lowercase")]
    InvalidPrefix {
        /// Offending prefix.
        prefix: String,
    },

    /// Prefix already registered.
    #[error("Data extension 'data-{prefix}' already registered")]
    DuplicateExtension {
        /// Offending prefix.
        prefix: String,
    },

    /// Extension lists itself as a requirement.
    #[error("Data extension 'data-{prefix}' cannot require itself")]
    SelfDependency {
        /// Offending prefix.
        prefix: String,
    },

    /// A required extension has not been registered yet.
    #[error("Data extension 'data-{prefix}' requires 'data-{dependency}' to be registered first")]
    MissingDependency {
        /// Extension being registered.
        prefix: String,
        /// Requirement that is not registered.
        dependency: String,
    },

    /// An allowed-modifier pattern is not a valid regular expression.
    #[error("Data extension 'data-{prefix}' has an invalid modifier pattern '{pattern}'")]
    InvalidModifierPattern {
        /// Extension being registered.
        prefix: String,
        /// Pattern source.
        pattern: String,
        /// Regex compilation error.
        #[source]
        source: regex::Error,
    },
}

/// A directive used a modifier its extension does not allow.
#[derive(Debug, thiserror::Error)]
#[error("Modifier {label} is not allowed for {name}")]
pub struct ModifierNotAllowedError {
    /// Extension prefix.
    pub prefix: String,
    /// Directive local name.
    pub name: String,
    /// Rejected modifier label.
    pub label: String,
}

/// Error from extension registration.
#[derive(Debug, thiserror::Error)]
pub enum ExtensionError {
    /// Extension declaration rejected.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Scan aborted on a disallowed modifier.
    #[error(transparent)]
    ModifierNotAllowed(#[from] ModifierNotAllowedError),
}

/// Error from action registration.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ActionError {
    /// Action name is not camelCase.
    #[error("Action '{name}' must be camelCase")]
    NotCamelCase {
        /// Offending name.
        name: String,
    },

    /// An action with this name is already registered.
    #[error("'@{name}' already registered")]
    DuplicateAction {
        /// Offending name.
        name: String,
    },

    /// A required extension has not been registered yet.
    #[error("'@{name}' requires 'data-{extension}' registration")]
    MissingDependency {
        /// Action being registered.
        name: String,
        /// Requirement that is not registered.
        extension: String,
    },
}
