//! Declarative directive engine for `data-*` attributes.
//!
//! Extensions add attribute vocabularies to a document. Registering an
//! extension with [`Engine::register_extension`] scans the element tree once;
//! every attribute `data-{prefix}-{name}[.modifier[:arg]*]*` becomes a
//! [`Directive`] whose value is preprocessed and handed to the extension's
//! binder together with the scope inherited from the element's ancestors.
//! Records a binder returns are attached to the element and inherited by its
//! descendants.
//!
//! # Example
//!
//! ```
//! use dstar_dom::Document;
//! use dstar_engine::{Engine, ExtensionConfig, Fields, NamespacedRecords};
//! use serde_json::json;
//!
//! let doc = Document::parse_xhtml(
//!     r#"<body data-signals-count="1"><p id="leaf"/></body>"#,
//! ).unwrap();
//!
//! let mut engine = Engine::new();
//! engine.register_extension(
//!     &doc,
//!     "signals",
//!     ExtensionConfig::new().with_binder(|args| {
//!         let value: serde_json::Value = args.expression.parse().ok()?;
//!         let fields: Fields = [(args.name.to_owned(), args.reactivity.signal(value))]
//!             .into_iter()
//!             .collect();
//!         Some(NamespacedRecords::from([("signals".to_owned(), fields)]))
//!     }),
//! ).unwrap();
//!
//! let leaf = doc.find_first("p").unwrap();
//! let scope = engine.resolve_scope(&doc, leaf);
//! assert_eq!(scope["signals"]["count"].get(), json!(1));
//! ```

mod action;
mod directive;
mod engine;
mod error;
mod extension;
mod preprocess;
mod reactivity;
mod scanner;
mod scope;
mod store;

pub use action::{ActionArgs, ActionEntry, ActionFn, ActionMap, camelize};
pub use directive::{Directive, Modifier, has_modifier, with_modifier};
pub use dstar_config::Config;
pub use engine::Engine;
pub use error::{
    ActionError, ConfigurationError, ExtensionError, ModifierNotAllowedError,
};
pub use extension::{Binder, BinderArgs, ExtensionConfig, ModifierPattern};
pub use preprocess::{PreprocessMatch, Preprocessor, PreprocessorStack, ReplaceFn, apply_all};
pub use reactivity::{ReactiveCell, Reactivity};
pub use scope::resolve_scope;
pub use store::{ElementStore, Fields, NamespacedRecords, merge_records};
