//! Reactive primitives handed to binders.

use dstar_reactive::{Effect, Reactive};
use serde_json::Value;

/// Reactive value stored in element records.
pub type ReactiveCell = Reactive<Value>;

/// Factories for reactive values, passed to every binder.
#[derive(Debug, Default, Clone, Copy)]
pub struct Reactivity;

impl Reactivity {
    /// Create a writable cell.
    #[must_use]
    pub fn signal(&self, initial: Value) -> ReactiveCell {
        dstar_reactive::signal(initial)
    }

    /// Create a derived cell.
    #[must_use]
    pub fn computed(&self, f: impl Fn() -> Value + 'static) -> ReactiveCell {
        dstar_reactive::computed(f)
    }

    /// Start an effect.
    pub fn effect(&self, f: impl Fn() + 'static) -> Effect {
        dstar_reactive::effect(f)
    }

    /// Register teardown for the running effect.
    pub fn on_cleanup(&self, f: impl FnOnce() + 'static) {
        dstar_reactive::on_cleanup(f);
    }
}
