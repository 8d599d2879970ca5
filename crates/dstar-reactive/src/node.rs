//! Reactive graph nodes.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::runtime;

/// Cache state of a node, ordered by staleness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum State {
    Clean,
    /// A source further upstream changed; sources must be checked first.
    Check,
    /// A direct source changed.
    Dirty,
}

/// Type-erased view of a node used for graph bookkeeping.
pub(crate) trait AnyNode {
    fn key(&self) -> *const ();
    fn stale(&self, state: State);
    fn update_if_necessary(&self);
    fn add_observer(&self, observer: Weak<dyn AnyNode>);
    fn remove_observer(&self, key: *const ());
    fn add_cleanup(&self, cleanup: Box<dyn FnOnce()>);
    fn dispose(&self);
}

pub(crate) fn key_of(node: &Rc<dyn AnyNode>) -> *const () {
    Rc::as_ptr(node).cast::<()>()
}

type ComputeFn<T> = Rc<dyn Fn() -> T>;

pub(crate) struct Node<T> {
    value: RefCell<Option<T>>,
    compute: RefCell<Option<ComputeFn<T>>>,
    state: Cell<State>,
    effect: bool,
    disposed: Cell<bool>,
    sources: RefCell<Vec<Rc<dyn AnyNode>>>,
    observers: RefCell<Vec<Weak<dyn AnyNode>>>,
    cleanups: RefCell<Vec<Box<dyn FnOnce()>>>,
    this: Weak<Node<T>>,
}

impl<T: Clone + PartialEq + 'static> Node<T> {
    pub(crate) fn source(value: T) -> Rc<Self> {
        Rc::new_cyclic(|this| Self::build(Some(value), None, State::Clean, false, this))
    }

    pub(crate) fn derived(compute: ComputeFn<T>, effect: bool) -> Rc<Self> {
        Rc::new_cyclic(|this| Self::build(None, Some(compute), State::Dirty, effect, this))
    }

    fn build(
        value: Option<T>,
        compute: Option<ComputeFn<T>>,
        state: State,
        effect: bool,
        this: &Weak<Self>,
    ) -> Self {
        Self {
            value: RefCell::new(value),
            compute: RefCell::new(compute),
            state: Cell::new(state),
            effect,
            disposed: Cell::new(false),
            sources: RefCell::new(Vec::new()),
            observers: RefCell::new(Vec::new()),
            cleanups: RefCell::new(Vec::new()),
            this: this.clone(),
        }
    }

    /// Current value, bringing it up to date first.
    pub(crate) fn read(&self) -> T {
        self.update_if_necessary();
        match self.value.borrow().as_ref() {
            Some(value) => value.clone(),
            None => unreachable!("a derived node holds a value once it is clean"),
        }
    }

    /// Last computed value, possibly stale. `None` before the first run.
    pub(crate) fn peek(&self) -> Option<T> {
        self.value.borrow().clone()
    }

    /// Replace the value, turning a derived node into a plain source.
    pub(crate) fn write(&self, value: T) {
        if self.compute.borrow_mut().take().is_some() {
            self.unsubscribe();
            self.state.set(State::Clean);
        }
        if self.value.borrow().as_ref() == Some(&value) {
            return;
        }
        *self.value.borrow_mut() = Some(value);
        for observer in self.live_observers() {
            observer.stale(State::Dirty);
        }
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    fn erased(&self) -> Option<Rc<dyn AnyNode>> {
        self.this.upgrade().map(|node| node as Rc<dyn AnyNode>)
    }

    fn live_observers(&self) -> Vec<Rc<dyn AnyNode>> {
        self.observers
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .collect()
    }

    fn run_cleanups(&self) {
        let cleanups = std::mem::take(&mut *self.cleanups.borrow_mut());
        for cleanup in cleanups {
            cleanup();
        }
    }

    fn unsubscribe(&self) {
        let sources = std::mem::take(&mut *self.sources.borrow_mut());
        for source in sources {
            source.remove_observer(self.key());
        }
    }

    fn update(&self) {
        let Some(compute) = self.compute.borrow().clone() else {
            self.state.set(State::Clean);
            return;
        };
        let Some(this) = self.erased() else {
            return;
        };

        self.run_cleanups();

        runtime::push_frame(Rc::downgrade(&this));
        let value = compute();
        let sources = runtime::pop_frame();

        let previous = std::mem::replace(&mut *self.sources.borrow_mut(), sources);
        for source in previous {
            source.remove_observer(self.key());
        }
        for source in self.sources.borrow().iter() {
            source.add_observer(Rc::downgrade(&this));
        }

        let changed = self.value.borrow().as_ref() != Some(&value);
        *self.value.borrow_mut() = Some(value);
        if changed {
            for observer in self.live_observers() {
                observer.stale(State::Dirty);
            }
        }
        self.state.set(State::Clean);
    }
}

impl<T: Clone + PartialEq + 'static> AnyNode for Node<T> {
    fn key(&self) -> *const () {
        std::ptr::from_ref(self).cast::<()>()
    }

    fn stale(&self, state: State) {
        let current = self.state.get();
        if current >= state {
            return;
        }
        if current == State::Clean
            && self.effect
            && let Some(this) = self.erased()
        {
            runtime::schedule(this);
        }
        self.state.set(state);
        for observer in self.live_observers() {
            observer.stale(State::Check);
        }
    }

    fn update_if_necessary(&self) {
        if self.disposed.get() {
            return;
        }
        if self.state.get() == State::Check {
            let sources = self.sources.borrow().clone();
            for source in sources {
                source.update_if_necessary();
                if self.state.get() == State::Dirty {
                    break;
                }
            }
        }
        if self.state.get() == State::Dirty {
            self.update();
        }
        self.state.set(State::Clean);
    }

    fn add_observer(&self, observer: Weak<dyn AnyNode>) {
        let key = Weak::as_ptr(&observer).cast::<()>();
        let mut observers = self.observers.borrow_mut();
        if !observers.iter().any(|o| Weak::as_ptr(o).cast::<()>() == key) {
            observers.push(observer);
        }
    }

    fn remove_observer(&self, key: *const ()) {
        self.observers
            .borrow_mut()
            .retain(|o| o.strong_count() > 0 && Weak::as_ptr(o).cast::<()>() != key);
    }

    fn add_cleanup(&self, cleanup: Box<dyn FnOnce()>) {
        self.cleanups.borrow_mut().push(cleanup);
    }

    fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        self.run_cleanups();
        self.unsubscribe();
        self.compute.borrow_mut().take();
    }
}
