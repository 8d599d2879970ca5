//! Signals and computed values.

use std::fmt;
use std::rc::Rc;

use crate::node::{AnyNode, Node};
use crate::runtime;

/// Handle to a reactive value, either a writable signal or a computed value.
///
/// Cloning the handle is cheap and yields another handle to the same value.
pub struct Reactive<T> {
    node: Rc<Node<T>>,
}

/// Create a writable reactive value.
pub fn signal<T: Clone + PartialEq + 'static>(initial: T) -> Reactive<T> {
    Reactive {
        node: Node::source(initial),
    }
}

/// Create a derived value.
///
/// `f` is not run until the value is first read. Afterwards the result is
/// cached and `f` re-runs only when a value it read during its last run has
/// changed.
pub fn computed<T: Clone + PartialEq + 'static>(f: impl Fn() -> T + 'static) -> Reactive<T> {
    Reactive {
        node: Node::derived(Rc::new(f), false),
    }
}

impl<T: Clone + PartialEq + 'static> Reactive<T> {
    /// Read the current value and record the read in the running reaction.
    pub fn get(&self) -> T {
        runtime::track(Rc::clone(&self.node) as Rc<dyn AnyNode>);
        self.node.read()
    }

    /// Read the current value without recording a dependency.
    pub fn get_untracked(&self) -> T {
        self.node.read()
    }

    /// Write a new value and flush affected effects.
    ///
    /// Writing to a computed value replaces its derivation with the constant.
    /// Writing a value equal to the current one does nothing.
    pub fn set(&self, value: T) {
        self.node.write(value);
        runtime::stabilize();
    }

    /// Replace the value with `f(current)`.
    pub fn update(&self, f: impl FnOnce(T) -> T) {
        self.set(f(self.get_untracked()));
    }

    /// Whether both handles point to the same reactive value.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }
}

impl<T> Clone for Reactive<T> {
    fn clone(&self) -> Self {
        Self {
            node: Rc::clone(&self.node),
        }
    }
}

/// Shows the cached value without bringing it up to date.
impl<T: Clone + PartialEq + fmt::Debug + 'static> fmt::Debug for Reactive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tuple = f.debug_tuple("Reactive");
        match self.node.peek() {
            Some(value) => tuple.field(&value),
            None => tuple.field(&format_args!("<pending>")),
        };
        tuple.finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use pretty_assertions::assert_eq;

    static_assertions::assert_not_impl_any!(Reactive<i32>: Send, Sync);

    #[test]
    fn test_signal_get_set() {
        let s = signal(1);
        assert_eq!(s.get(), 1);
        s.set(2);
        assert_eq!(s.get(), 2);
        s.update(|v| v + 3);
        assert_eq!(s.get(), 5);
    }

    #[test]
    fn test_computed_is_lazy_and_cached() {
        let runs = Rc::new(Cell::new(0));
        let s = signal(2);
        let c = computed({
            let (s, runs) = (s.clone(), Rc::clone(&runs));
            move || {
                runs.set(runs.get() + 1);
                s.get() * 10
            }
        });

        assert_eq!(runs.get(), 0);
        assert_eq!(c.get(), 20);
        assert_eq!(c.get(), 20);
        assert_eq!(runs.get(), 1);

        s.set(3);
        assert_eq!(runs.get(), 1);
        assert_eq!(c.get(), 30);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn test_unchanged_source_skips_downstream_recompute() {
        let s = signal(4);
        let parity = computed({
            let s = s.clone();
            move || s.get() % 2
        });
        let downstream_runs = Rc::new(Cell::new(0));
        let label = computed({
            let (parity, runs) = (parity.clone(), Rc::clone(&downstream_runs));
            move || {
                runs.set(runs.get() + 1);
                if parity.get() == 0 { "even" } else { "odd" }
            }
        });

        assert_eq!(label.get(), "even");
        s.set(6);
        assert_eq!(label.get(), "even");
        assert_eq!(downstream_runs.get(), 1);

        s.set(7);
        assert_eq!(label.get(), "odd");
        assert_eq!(downstream_runs.get(), 2);
    }

    #[test]
    fn test_dynamic_dependencies() {
        let use_a = signal(true);
        let a = signal("a");
        let b = signal("b");
        let runs = Rc::new(Cell::new(0));
        let pick = computed({
            let (use_a, a, b, runs) = (use_a.clone(), a.clone(), b.clone(), Rc::clone(&runs));
            move || {
                runs.set(runs.get() + 1);
                if use_a.get() { a.get() } else { b.get() }
            }
        });

        assert_eq!(pick.get(), "a");
        b.set("bb");
        assert_eq!(pick.get(), "a");
        assert_eq!(runs.get(), 1);

        use_a.set(false);
        assert_eq!(pick.get(), "bb");
        a.set("aa");
        assert_eq!(pick.get(), "bb");
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn test_set_on_computed_replaces_derivation() {
        let s = signal(1);
        let c = computed({
            let s = s.clone();
            move || s.get() + 1
        });
        assert_eq!(c.get(), 2);

        c.set(100);
        s.set(5);
        assert_eq!(c.get(), 100);
    }

    #[test]
    fn test_ptr_eq() {
        let a = signal(0);
        let b = a.clone();
        let c = signal(0);
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
    }

    #[test]
    fn test_debug_shows_value() {
        assert_eq!(format!("{:?}", signal(7)), "Reactive(7)");
    }

    #[test]
    fn test_debug_does_not_recompute() {
        let runs = Rc::new(Cell::new(0));
        let s = signal(1);
        let c = computed({
            let (s, runs) = (s.clone(), Rc::clone(&runs));
            move || {
                runs.set(runs.get() + 1);
                s.get() * 2
            }
        });

        assert_eq!(format!("{c:?}"), "Reactive(<pending>)");
        assert_eq!(runs.get(), 0);

        assert_eq!(c.get(), 2);
        s.set(5);
        assert_eq!(format!("{c:?}"), "Reactive(2)");
        assert_eq!(runs.get(), 1);
        assert_eq!(c.get(), 10);
    }
}
