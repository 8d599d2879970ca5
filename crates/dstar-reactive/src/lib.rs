//! Fine-grained reactive primitives.
//!
//! - [`signal`]: a writable source value
//! - [`computed`]: a derived value, recomputed lazily and cached until one of
//!   the values it read last time changes
//! - [`effect`]: a side effect that re-runs whenever anything it read changes
//! - [`on_cleanup`]: teardown for the running computed or effect
//!
//! Propagation is push-pull. Writing a signal marks direct dependants dirty and
//! everything further downstream as "check"; values are only recomputed when
//! read, and only if a source actually changed. Effects are flushed
//! synchronously at the end of the outermost write (see [`batch`] to group
//! writes). The runtime is thread-local and created on first use.
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use dstar_reactive::{computed, effect, signal};
//!
//! let count = signal(1);
//! let doubled = computed({
//!     let count = count.clone();
//!     move || count.get() * 2
//! });
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let _watch = effect({
//!     let (doubled, seen) = (doubled.clone(), Rc::clone(&seen));
//!     move || seen.borrow_mut().push(doubled.get())
//! });
//!
//! count.set(5);
//! assert_eq!(*seen.borrow(), vec![2, 10]);
//! ```

mod effect;
mod node;
mod reactive;
mod runtime;

pub use effect::{Effect, effect, on_cleanup};
pub use reactive::{Reactive, computed, signal};
pub use runtime::batch;
