//! Element tree provider for the dstar directive engine.
//!
//! The engine never owns elements. It sees a [`Document`] through three
//! primitives:
//!
//! - [`walk_down`]: pre-order descent, parent before children, in document order
//! - [`walk_up`]: the element itself followed by each of its ancestors
//! - [`Element`]: the capability interface (tag name, kind, attribute entries)
//!
//! Elements are addressed by [`NodeId`], a plain copyable identity that also
//! names its [`Document`]. Holding a `NodeId` does not keep anything alive; a
//! detached subtree simply stops being reachable from the root.
//!
//! # Example
//!
//! ```
//! use dstar_dom::{Document, walk_up};
//!
//! let doc = Document::parse_xhtml(
//!     r#"<body><div data-signals-count="0"><span id="leaf"/></div></body>"#,
//! ).unwrap();
//!
//! let leaf = doc.find_first("span").unwrap();
//! let tags: Vec<_> = walk_up(&doc, leaf).map(|el| el.tag_name().to_owned()).collect();
//! assert_eq!(tags, ["span", "div", "body"]);
//! ```

mod dataset;
mod document;
mod walk;
mod xhtml;

pub use dataset::dataset_key;
pub use document::{Document, DocumentId, Element, ElementKind, ElementRef, NodeId};
pub use walk::{Ancestors, walk_down, walk_up};
pub use xhtml::ParseError;
