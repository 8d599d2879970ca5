//! Thread-local reactive runtime: dependency tracking and effect scheduling.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::node::{AnyNode, key_of};

/// A reaction currently being computed.
struct Frame {
    owner: Weak<dyn AnyNode>,
    sources: Vec<Rc<dyn AnyNode>>,
}

#[derive(Default)]
struct Runtime {
    frames: RefCell<Vec<Frame>>,
    pending: RefCell<Vec<Rc<dyn AnyNode>>>,
    effects: RefCell<Vec<Rc<dyn AnyNode>>>,
    stabilizing: Cell<bool>,
    batch_depth: Cell<usize>,
}

thread_local! {
    static RUNTIME: Runtime = Runtime::default();
}

pub(crate) fn push_frame(owner: Weak<dyn AnyNode>) {
    RUNTIME.with(|rt| {
        rt.frames.borrow_mut().push(Frame {
            owner,
            sources: Vec::new(),
        });
    });
}

pub(crate) fn pop_frame() -> Vec<Rc<dyn AnyNode>> {
    RUNTIME.with(|rt| {
        rt.frames
            .borrow_mut()
            .pop()
            .map(|frame| frame.sources)
            .unwrap_or_default()
    })
}

/// Record `node` as a source of the running reaction, if any.
pub(crate) fn track(node: Rc<dyn AnyNode>) {
    RUNTIME.with(|rt| {
        if let Some(frame) = rt.frames.borrow_mut().last_mut() {
            let key = key_of(&node);
            if !frame.sources.iter().any(|s| key_of(s) == key) {
                frame.sources.push(node);
            }
        }
    });
}

/// Owner of the running reaction, if any.
pub(crate) fn current_owner() -> Option<Rc<dyn AnyNode>> {
    RUNTIME.with(|rt| {
        rt.frames
            .borrow()
            .last()
            .and_then(|frame| frame.owner.upgrade())
    })
}

pub(crate) fn schedule(effect: Rc<dyn AnyNode>) {
    RUNTIME.with(|rt| rt.pending.borrow_mut().push(effect));
}

pub(crate) fn retain_effect(effect: Rc<dyn AnyNode>) {
    RUNTIME.with(|rt| rt.effects.borrow_mut().push(effect));
}

pub(crate) fn release_effect(key: *const ()) {
    RUNTIME.with(|rt| rt.effects.borrow_mut().retain(|e| key_of(e) != key));
}

/// Run every scheduled effect, including ones scheduled while flushing.
///
/// No-op while a flush or a [`batch`] is already in progress; the outermost
/// caller does the work.
pub(crate) fn stabilize() {
    RUNTIME.with(|rt| {
        if rt.stabilizing.get() || rt.batch_depth.get() > 0 {
            return;
        }
        rt.stabilizing.set(true);
        loop {
            let next = {
                let mut pending = rt.pending.borrow_mut();
                if pending.is_empty() {
                    None
                } else {
                    Some(pending.remove(0))
                }
            };
            let Some(effect) = next else {
                break;
            };
            effect.update_if_necessary();
        }
        rt.stabilizing.set(false);
    });
}

/// Group several writes so effects run once, after `f` returns.
///
/// # Example
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use dstar_reactive::{batch, effect, signal};
///
/// let (a, b) = (signal(1), signal(2));
/// let runs = Rc::new(Cell::new(0));
/// let _sum = effect({
///     let (a, b, runs) = (a.clone(), b.clone(), Rc::clone(&runs));
///     move || {
///         let _ = a.get() + b.get();
///         runs.set(runs.get() + 1);
///     }
/// });
///
/// batch(|| {
///     a.set(10);
///     b.set(20);
/// });
/// assert_eq!(runs.get(), 2);
/// ```
pub fn batch<R>(f: impl FnOnce() -> R) -> R {
    RUNTIME.with(|rt| rt.batch_depth.set(rt.batch_depth.get() + 1));
    let result = f();
    RUNTIME.with(|rt| rt.batch_depth.set(rt.batch_depth.get() - 1));
    stabilize();
    result
}
