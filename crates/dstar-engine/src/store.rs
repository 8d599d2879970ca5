//! Per-element reactive records.

use std::collections::{BTreeMap, HashMap};

use dstar_dom::{Document, NodeId};

use crate::reactivity::ReactiveCell;

/// Field name to reactive cell.
pub type Fields = BTreeMap<String, ReactiveCell>;

/// Namespace key to fields.
///
/// Used both for the records an element owns and for the patches binders
/// return.
pub type NamespacedRecords = BTreeMap<String, Fields>;

/// Merge `patch` into `target` field by field.
///
/// Fields in `patch` overwrite same-named fields of the same namespace;
/// every other field in `target` is kept.
pub fn merge_records(target: &mut NamespacedRecords, patch: &NamespacedRecords) {
    for (namespace, fields) in patch {
        let slot = target.entry(namespace.clone()).or_default();
        for (field, cell) in fields {
            slot.insert(field.clone(), cell.clone());
        }
    }
}

/// Records owned by each element.
///
/// Elements are keyed by identity only, and an identity names its document,
/// so records of different documents never mix. The store never keeps an
/// element alive. Record sets are created on the first merge and only ever extended.
#[derive(Debug, Default)]
pub struct ElementStore {
    records: HashMap<NodeId, NamespacedRecords>,
}

impl ElementStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records owned by `node`.
    #[must_use]
    pub fn get(&self, node: NodeId) -> Option<&NamespacedRecords> {
        self.records.get(&node)
    }

    /// Whether `node` owns any records.
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.records.contains_key(&node)
    }

    /// Number of elements with records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no element has records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Merge `patch` into the records of `node`, creating them if needed.
    pub fn merge(&mut self, node: NodeId, patch: &NamespacedRecords) {
        let records = self.records.entry(node).or_default();
        merge_records(records, patch);
        tracing::debug!(
            node = %node,
            namespaces = patch.len(),
            "Merged element records"
        );
    }

    /// Drop the records of elements of `doc` that are no longer connected.
    ///
    /// Records of other documents are kept. Returns the number of record sets
    /// removed.
    pub fn prune(&mut self, doc: &Document) -> usize {
        let before = self.records.len();
        self.records
            .retain(|&node, _| node.document() != doc.id() || doc.is_connected(node));
        let removed = before - self.records.len();
        if removed > 0 {
            tracing::debug!(removed, "Pruned records of detached elements");
        }
        removed
    }
}
