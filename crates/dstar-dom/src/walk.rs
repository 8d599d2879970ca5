//! Tree traversal primitives.

use crate::document::{Document, ElementRef, NodeId};

/// Visit `start` and every connected descendant in pre-order.
///
/// A parent is always visited before its children, and siblings in document
/// order. The first error returned by `visit` stops the walk and is returned.
/// A `start` from another document visits nothing.
pub fn walk_down<'a, E>(
    doc: &'a Document,
    start: NodeId,
    mut visit: impl FnMut(ElementRef<'a>) -> Result<(), E>,
) -> Result<(), E> {
    if !doc.contains(start) {
        return Ok(());
    }
    let mut stack = vec![start];
    while let Some(id) = stack.pop() {
        visit(doc.element(id))?;
        stack.extend(doc.children_of(id).iter().rev().copied());
    }
    Ok(())
}

/// Iterate over `start` followed by each of its ancestors, root last.
///
/// Empty when `start` belongs to another document.
#[must_use]
pub fn walk_up(doc: &Document, start: NodeId) -> Ancestors<'_> {
    Ancestors {
        doc,
        next: doc.contains(start).then_some(start),
    }
}

/// Iterator returned by [`walk_up`].
#[derive(Debug)]
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = ElementRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        self.next = self.doc.parent_of(id);
        Some(self.doc.element(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> (Document, Vec<NodeId>) {
        // body
        // ├── a
        // │   ├── a1
        // │   └── a2
        // └── b
        let mut doc = Document::new("body");
        let a = doc.append_html(doc.root(), "a");
        let a1 = doc.append_html(a, "a1");
        let a2 = doc.append_html(a, "a2");
        let b = doc.append_html(doc.root(), "b");
        let root = doc.root();
        (doc, vec![root, a, a1, a2, b])
    }

    #[test]
    fn test_walk_down_is_preorder() {
        let (doc, ids) = sample();
        let mut seen = Vec::new();
        walk_down::<()>(&doc, doc.root(), |el| {
            seen.push(el.id());
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, ids);
    }

    #[test]
    fn test_walk_down_stops_on_error() {
        let (doc, ids) = sample();
        let mut seen = Vec::new();
        let result = walk_down(&doc, doc.root(), |el| {
            seen.push(el.id());
            if el.tag_name() == "a1" {
                return Err("stop");
            }
            Ok(())
        });
        assert_eq!(result, Err("stop"));
        assert_eq!(seen, ids[..3].to_vec());
    }

    #[test]
    fn test_walk_down_from_subtree() {
        let (doc, ids) = sample();
        let mut seen = Vec::new();
        walk_down::<()>(&doc, ids[1], |el| {
            seen.push(el.tag_name().to_owned());
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, ["a", "a1", "a2"]);
    }

    #[test]
    fn test_walk_up_includes_self_then_ancestors() {
        let (doc, ids) = sample();
        let chain: Vec<_> = walk_up(&doc, ids[3]).map(|el| el.id()).collect();
        assert_eq!(chain, vec![ids[3], ids[1], ids[0]]);
    }

    #[test]
    fn test_foreign_start_visits_nothing() {
        let (doc, ids) = sample();
        let other = Document::new("body");
        let mut seen = 0;
        walk_down::<()>(&other, ids[3], |_| {
            seen += 1;
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, 0);
        assert_eq!(walk_up(&other, ids[3]).count(), 0);
        assert_eq!(walk_up(&doc, other.root()).count(), 0);
    }

    #[test]
    fn test_walk_up_from_root() {
        let (doc, _) = sample();
        assert_eq!(walk_up(&doc, doc.root()).count(), 1);
    }
}
