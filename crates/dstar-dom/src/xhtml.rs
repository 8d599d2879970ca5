//! XHTML loader.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::document::{Document, ElementKind, NodeId};

/// Error while loading an XHTML document.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ParseError {
    /// Malformed XML.
    #[error("XML parse error")]
    Xml(#[from] quick_xml::Error),

    /// Input contains no element.
    #[error("document has no root element")]
    NoRootElement,

    /// A second top-level element follows the root.
    #[error("document has more than one root element")]
    MultipleRoots,
}

impl Document {
    /// Load a well-formed XHTML fragment with a single root element.
    ///
    /// Text, comments, doctype and processing instructions are dropped; only
    /// elements and their attributes are kept. Namespace declarations decide
    /// the element kind and are not kept as attributes. Without an explicit
    /// declaration, `<svg>` and `<math>` open SVG and `MathML` subtrees and
    /// every other element inherits the kind of its parent.
    ///
    /// # Example
    ///
    /// ```
    /// use dstar_dom::{Document, Element, ElementKind};
    ///
    /// let doc = Document::parse_xhtml(r#"<body><svg><circle r="4"/></svg></body>"#).unwrap();
    /// let circle = doc.find_first("circle").unwrap();
    /// assert_eq!(doc.element(circle).kind(), ElementKind::Svg);
    /// ```
    pub fn parse_xhtml(input: &str) -> Result<Self, ParseError> {
        let mut reader = Reader::from_str(input);
        reader.config_mut().trim_text(true);

        let mut builder = TreeBuilder::default();
        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let opened = builder.open(&e)?;
                    builder.stack.push(opened);
                }
                Event::Empty(e) => {
                    builder.open(&e)?;
                }
                Event::End(_) => {
                    builder.stack.pop();
                }
                Event::Eof => break,
                _ => {}
            }
        }

        builder.doc.ok_or(ParseError::NoRootElement)
    }
}

#[derive(Default)]
struct TreeBuilder {
    doc: Option<Document>,
    stack: Vec<(NodeId, ElementKind)>,
}

impl TreeBuilder {
    fn open(&mut self, e: &BytesStart<'_>) -> Result<(NodeId, ElementKind), ParseError> {
        let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let (attributes, namespace) = decode_attributes(e);
        let parent_kind = self.stack.last().map(|&(_, kind)| kind);
        let kind = element_kind(&tag, namespace.as_deref(), parent_kind);

        let id = if let Some(doc) = self.doc.as_mut() {
            let &(parent, _) = self.stack.last().ok_or(ParseError::MultipleRoots)?;
            doc.append_element(parent, tag, kind)
        } else {
            let doc = Document::with_root(tag, kind);
            let root = doc.root();
            self.doc = Some(doc);
            root
        };

        let doc = self.doc.as_mut().ok_or(ParseError::NoRootElement)?;
        for (name, value) in attributes {
            doc.set_attribute(id, name, value);
        }

        Ok((id, kind))
    }
}

/// Split attributes into regular ones and the default namespace declaration.
fn decode_attributes(e: &BytesStart<'_>) -> (Vec<(String, String)>, Option<String>) {
    let mut attributes = Vec::new();
    let mut namespace = None;

    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_or_else(
            |_| String::from_utf8_lossy(&attr.value).into_owned(),
            std::borrow::Cow::into_owned,
        );

        if key == "xmlns" {
            namespace = Some(value);
        } else if !key.starts_with("xmlns:") {
            attributes.push((key, value));
        }
    }

    (attributes, namespace)
}

fn element_kind(tag: &str, namespace: Option<&str>, parent: Option<ElementKind>) -> ElementKind {
    if let Some(uri) = namespace {
        return ElementKind::from_namespace(uri);
    }
    match tag.to_ascii_lowercase().as_str() {
        "svg" => ElementKind::Svg,
        "math" => ElementKind::MathMl,
        _ => parent.unwrap_or_default(),
    }
}
