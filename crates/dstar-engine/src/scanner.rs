//! One-shot directive scan for a single extension.

use dstar_dom::{Document, Element, ElementRef, NodeId, dataset_key, walk_down};

use crate::action::ActionMap;
use crate::directive::Directive;
use crate::error::ModifierNotAllowedError;
use crate::extension::{BinderArgs, Extension};
use crate::preprocess::{PreprocessorStack, apply_all};
use crate::reactivity::Reactivity;
use crate::scope::resolve_scope;
use crate::store::ElementStore;

/// Binds one extension's directives across a subtree.
pub(crate) struct Scanner<'a> {
    pub(crate) extension: &'a Extension,
    pub(crate) globals: &'a PreprocessorStack,
    pub(crate) actions: &'a ActionMap,
    pub(crate) reactivity: &'a Reactivity,
}

impl Scanner<'_> {
    /// Walk `root` and its descendants, committing every binder result as
    /// soon as it is returned.
    ///
    /// Returns the number of directives bound. A disallowed modifier stops the
    /// walk; records committed before it stay in `store`.
    pub(crate) fn scan(
        &self,
        doc: &Document,
        root: NodeId,
        store: &mut ElementStore,
    ) -> Result<usize, ModifierNotAllowedError> {
        let mut bound = 0;
        walk_down(doc, root, |element| {
            bound += self.bind_element(element, store)?;
            Ok(())
        })?;
        Ok(bound)
    }

    fn bind_element(
        &self,
        element: ElementRef<'_>,
        store: &mut ElementStore,
    ) -> Result<usize, ModifierNotAllowedError> {
        let ext = self.extension;
        if !element.kind().is_html_or_svg() || !ext.allows_tag(element.tag_name()) {
            return Ok(0);
        }

        let mut bound = 0;
        for (attr, value) in element.attribute_entries() {
            let Some(directive) =
                dataset_key(attr).and_then(|key| Directive::parse(&ext.prefix, &key))
            else {
                continue;
            };

            if let Some(rejected) = directive
                .modifiers
                .iter()
                .find(|m| !ext.allows_modifier(&m.label))
            {
                return Err(ModifierNotAllowedError {
                    prefix: ext.prefix.clone(),
                    name: directive.name,
                    label: rejected.label.clone(),
                });
            }

            let expression = apply_all(ext.own_preprocessors(), &self.globals.apply(value));
            let scope = resolve_scope(element.document(), store, element.id());

            let patch = ext.binder.as_ref().and_then(|binder| {
                binder(BinderArgs {
                    name: &directive.name,
                    expression: &expression,
                    element,
                    scope: &scope,
                    reactivity: self.reactivity,
                    modifiers: &directive.modifiers,
                    actions: self.actions,
                })
            });
            if let Some(patch) = patch {
                store.merge(element.id(), &patch);
            }

            tracing::debug!(
                prefix = %ext.prefix,
                name = %directive.name,
                modifiers = directive.modifiers.len(),
                node = %element.id(),
                "Bound directive"
            );
            bound += 1;
        }
        Ok(bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::ExtensionConfig;
    use crate::store::NamespacedRecords;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn scan(
        doc: &Document,
        prefix: &str,
        config: ExtensionConfig,
        store: &mut ElementStore,
    ) -> Result<usize, ModifierNotAllowedError> {
        let extension = config.compile(prefix).unwrap();
        let globals = PreprocessorStack::new();
        let actions = ActionMap::new();
        let scanner = Scanner {
            extension: &extension,
            globals: &globals,
            actions: &actions,
            reactivity: &Reactivity,
        };
        scanner.scan(doc, doc.root(), store)
    }

    #[test]
    fn test_visits_parents_before_children() {
        let doc = Document::parse_xhtml(
            r#"<body><div data-log-a="1"><p data-log-b="2"/></div><p data-log-c="3"/></body>"#,
        )
        .unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let config = ExtensionConfig::new().with_binder(move |args| {
            sink.borrow_mut()
                .push((args.name.to_owned(), args.expression.to_owned()));
            None
        });

        let bound = scan(&doc, "log", config, &mut ElementStore::new()).unwrap();

        assert_eq!(bound, 3);
        assert_eq!(
            *seen.borrow(),
            [
                ("a".to_owned(), "1".to_owned()),
                ("b".to_owned(), "2".to_owned()),
                ("c".to_owned(), "3".to_owned()),
            ]
        );
    }

    #[test]
    fn test_ignores_other_attributes() {
        let doc = Document::parse_xhtml(
            r#"<body id="x" data-other-a="1" data-logx="2" class="y"/>"#,
        )
        .unwrap();
        let config = ExtensionConfig::new().with_binder(|args| {
            assert_eq!(args.name, "x");
            None
        });
        assert_eq!(scan(&doc, "log", config, &mut ElementStore::new()).unwrap(), 1);
    }

    #[test]
    fn test_upper_case_attribute_is_not_a_directive() {
        let doc = Document::parse_xhtml(r#"<body data-fooBar="1" data-foo-baz="2"/>"#).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let config = ExtensionConfig::new().with_binder(move |args| {
            sink.borrow_mut().push(args.name.to_owned());
            None
        });

        scan(&doc, "foo", config, &mut ElementStore::new()).unwrap();
        assert_eq!(*seen.borrow(), ["baz"]);
    }

    #[test]
    fn test_later_attributes_see_earlier_commits() {
        let doc =
            Document::parse_xhtml(r#"<body data-sig-a="1" data-sig-b="2"/>"#).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let config = ExtensionConfig::new().with_binder(move |args| {
            sink.borrow_mut().push(
                args.scope
                    .get("sig")
                    .map(|fields| fields.keys().cloned().collect::<Vec<_>>())
                    .unwrap_or_default(),
            );
            let fields = [(args.name.to_owned(), args.reactivity.signal(json!(args.expression)))]
                .into_iter()
                .collect();
            Some(NamespacedRecords::from([("sig".to_owned(), fields)]))
        });

        let mut store = ElementStore::new();
        scan(&doc, "sig", config, &mut store).unwrap();

        assert_eq!(*seen.borrow(), [Vec::<String>::new(), vec!["a".to_owned()]]);
        assert_eq!(store.get(doc.root()).unwrap()["sig"].len(), 2);
    }

    #[test]
    fn test_missing_binder_still_validates_modifiers() {
        let doc = Document::parse_xhtml(r#"<body data-on-click.once="x"/>"#).unwrap();
        let err = scan(&doc, "on", ExtensionConfig::new(), &mut ElementStore::new())
            .unwrap_err();
        assert_eq!(err.name, "click");
        assert_eq!(err.label, "once");
        assert_eq!(err.to_string(), "Modifier once is not allowed for click");
    }
}
