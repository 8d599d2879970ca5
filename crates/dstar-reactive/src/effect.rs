//! Effects and cleanup registration.

use std::fmt;
use std::rc::Rc;

use crate::node::{AnyNode, Node};
use crate::runtime;

/// A running side effect.
///
/// The runtime keeps the effect alive until [`Effect::dispose`] is called;
/// dropping the handle does not stop it.
pub struct Effect {
    node: Rc<Node<()>>,
}

/// Run `f` now and again whenever a value it read during its last run changes.
pub fn effect(f: impl Fn() + 'static) -> Effect {
    let node = Node::derived(Rc::new(f), true);
    runtime::retain_effect(Rc::clone(&node) as Rc<dyn AnyNode>);
    node.update_if_necessary();
    Effect { node }
}

/// Register teardown for the running computed value or effect.
///
/// Cleanups run before the reaction re-runs and when an effect is disposed.
/// Outside a reaction the call does nothing.
pub fn on_cleanup(f: impl FnOnce() + 'static) {
    match runtime::current_owner() {
        Some(owner) => owner.add_cleanup(Box::new(f)),
        None => tracing::debug!("on_cleanup called outside a running reaction; ignored"),
    }
}

impl Effect {
    /// Stop the effect, running its pending cleanups.
    pub fn dispose(&self) {
        self.node.dispose();
        runtime::release_effect(self.node.key());
    }

    /// Whether [`Effect::dispose`] has been called.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.node.is_disposed()
    }
}

impl Clone for Effect {
    fn clone(&self) -> Self {
        Self {
            node: Rc::clone(&self.node),
        }
    }
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;
    use crate::{batch, computed, signal};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_effect_runs_immediately_and_on_change() {
        let s = signal(1);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let _e = effect({
            let (s, seen) = (s.clone(), Rc::clone(&seen));
            move || seen.borrow_mut().push(s.get())
        });

        s.set(2);
        s.set(2);
        s.set(3);
        assert_eq!(*seen.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn test_effect_survives_dropped_handle() {
        let s = signal(0);
        let runs = Rc::new(Cell::new(0));
        drop(effect({
            let (s, runs) = (s.clone(), Rc::clone(&runs));
            move || {
                s.get();
                runs.set(runs.get() + 1);
            }
        }));

        s.set(1);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn test_effect_through_computed() {
        let s = signal(1);
        let doubled = computed({
            let s = s.clone();
            move || s.get() * 2
        });
        let seen = Rc::new(RefCell::new(Vec::new()));
        let _e = effect({
            let (doubled, seen) = (doubled.clone(), Rc::clone(&seen));
            move || seen.borrow_mut().push(doubled.get())
        });

        s.set(4);
        assert_eq!(*seen.borrow(), vec![2, 8]);
    }

    #[test]
    fn test_dispose_stops_effect_and_runs_cleanup() {
        let s = signal(0);
        let runs = Rc::new(Cell::new(0));
        let cleanups = Rc::new(Cell::new(0));
        let e = effect({
            let (s, runs, cleanups) = (s.clone(), Rc::clone(&runs), Rc::clone(&cleanups));
            move || {
                s.get();
                runs.set(runs.get() + 1);
                let cleanups = Rc::clone(&cleanups);
                on_cleanup(move || cleanups.set(cleanups.get() + 1));
            }
        });

        s.set(1);
        assert_eq!(runs.get(), 2);
        assert_eq!(cleanups.get(), 1);

        e.dispose();
        assert!(e.is_disposed());
        assert_eq!(cleanups.get(), 2);

        s.set(2);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn test_on_cleanup_outside_reaction_is_ignored() {
        let called = Rc::new(Cell::new(false));
        on_cleanup({
            let called = Rc::clone(&called);
            move || called.set(true)
        });
        assert!(!called.get());
    }

    #[test]
    fn test_effect_writing_signal_is_flushed() {
        let source = signal(1);
        let mirror = signal(0);
        let _copy = effect({
            let (source, mirror) = (source.clone(), mirror.clone());
            move || mirror.set(source.get())
        });
        assert_eq!(mirror.get(), 1);

        source.set(9);
        assert_eq!(mirror.get(), 9);
    }

    #[test]
    fn test_batch_defers_effects() {
        let a = signal(1);
        let runs = Rc::new(Cell::new(0));
        let _e = effect({
            let (a, runs) = (a.clone(), Rc::clone(&runs));
            move || {
                a.get();
                runs.set(runs.get() + 1);
            }
        });

        batch(|| {
            a.set(2);
            a.set(3);
            assert_eq!(runs.get(), 1);
        });
        assert_eq!(runs.get(), 2);
    }
}
