//! Inherited scope resolution.

use dstar_dom::{Document, NodeId, walk_up};

use crate::store::{ElementStore, NamespacedRecords, merge_records};

/// Compute the records visible to a directive on `node`.
///
/// Merges the committed records of `node` and all of its ancestors, root-most
/// first, so that within a namespace a closer element's field shadows a
/// farther one's. Fields defined by only one layer are kept. The result is a
/// fresh map; stored records are not touched.
#[must_use]
pub fn resolve_scope(doc: &Document, store: &ElementStore, node: NodeId) -> NamespacedRecords {
    let mut layers: Vec<&NamespacedRecords> = walk_up(doc, node)
        .filter_map(|el| store.get(el.id()))
        .collect();
    layers.reverse();

    let mut scope = NamespacedRecords::new();
    for layer in layers {
        merge_records(&mut scope, layer);
    }
    scope
}

#[cfg(test)]
mod tests {
    use super::*;
    use dstar_reactive::signal;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    fn patch(namespace: &str, field: &str, value: Value) -> NamespacedRecords {
        NamespacedRecords::from([(
            namespace.to_owned(),
            [(field.to_owned(), signal(value))].into_iter().collect(),
        )])
    }

    fn get(scope: &NamespacedRecords, namespace: &str, field: &str) -> Option<Value> {
        scope
            .get(namespace)
            .and_then(|fields| fields.get(field))
            .map(dstar_reactive::Reactive::get_untracked)
    }

    #[test]
    fn test_closer_layer_shadows_farther() {
        let mut doc = Document::new("body");
        let parent = doc.append_html(doc.root(), "div");
        let child = doc.append_html(parent, "span");
        let sibling = doc.append_html(parent, "span");

        let mut store = ElementStore::new();
        store.merge(parent, &patch("greet", "msg", json!("hi")));
        store.merge(child, &patch("greet", "msg", json!("bye")));

        assert_eq!(
            get(&resolve_scope(&doc, &store, child), "greet", "msg"),
            Some(json!("bye"))
        );
        assert_eq!(
            get(&resolve_scope(&doc, &store, sibling), "greet", "msg"),
            Some(json!("hi"))
        );
        assert_eq!(
            get(&resolve_scope(&doc, &store, parent), "greet", "msg"),
            Some(json!("hi"))
        );
    }

    #[test]
    fn test_fields_unique_to_a_layer_are_kept() {
        let mut doc = Document::new("body");
        let child = doc.append_html(doc.root(), "div");

        let mut store = ElementStore::new();
        store.merge(doc.root(), &patch("signals", "a", json!(1)));
        store.merge(child, &patch("signals", "b", json!(2)));
        store.merge(child, &patch("refs", "c", json!(3)));

        let scope = resolve_scope(&doc, &store, child);
        assert_eq!(get(&scope, "signals", "a"), Some(json!(1)));
        assert_eq!(get(&scope, "signals", "b"), Some(json!(2)));
        assert_eq!(get(&scope, "refs", "c"), Some(json!(3)));
    }

    #[test]
    fn test_resolution_does_not_mutate_store() {
        let mut doc = Document::new("body");
        let child = doc.append_html(doc.root(), "div");

        let mut store = ElementStore::new();
        store.merge(doc.root(), &patch("signals", "a", json!(1)));
        store.merge(child, &patch("signals", "b", json!(2)));

        let _ = resolve_scope(&doc, &store, child);

        let root_fields = &store.get(doc.root()).unwrap()["signals"];
        assert_eq!(root_fields.len(), 1);
    }

    #[test]
    fn test_element_without_records() {
        let doc = Document::new("body");
        let store = ElementStore::new();
        assert!(resolve_scope(&doc, &store, doc.root()).is_empty());
    }

    #[test]
    fn test_shares_cells_with_owner() {
        let mut doc = Document::new("body");
        let child = doc.append_html(doc.root(), "div");
        let mut store = ElementStore::new();
        store.merge(doc.root(), &patch("signals", "count", json!(0)));

        let scope = resolve_scope(&doc, &store, child);
        scope["signals"]["count"].set(json!(5));

        let owned = &store.get(doc.root()).unwrap()["signals"]["count"];
        assert_eq!(owned.get_untracked(), json!(5));
    }
}
