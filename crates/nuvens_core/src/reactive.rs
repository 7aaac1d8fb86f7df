//! Observable values with two-phase notification
//!
//! A change to an [`Observable`] first recomputes every [`Derived`] view, then
//! runs effect subscribers. Effects therefore always observe derived values
//! that are already consistent with the new state.

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::sync::{Arc, PoisonError, RwLock};

new_key_type! {
    /// Handle returned by [`Observable::subscribe`]
    pub struct SubscriptionId;
}

type DeriveFn<T> = Box<dyn FnMut(&T) + Send>;
type EffectFn<T> = Box<dyn FnMut(&T) + Send>;

/// A read-only value computed from an [`Observable`]
pub struct Derived<U> {
    cell: Arc<RwLock<U>>,
}

impl<U> Clone for Derived<U> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<U: Clone> Derived<U> {
    /// Current derived value
    pub fn get(&self) -> U {
        self.cell
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<U> Derived<U> {
    /// Borrow the derived value without cloning
    pub fn with<R>(&self, f: impl FnOnce(&U) -> R) -> R {
        f(&self.cell.read().unwrap_or_else(PoisonError::into_inner))
    }
}

/// A value that notifies derived views and effects when it changes
pub struct Observable<T> {
    value: T,
    derived: SmallVec<[DeriveFn<T>; 4]>,
    effects: SlotMap<SubscriptionId, EffectFn<T>>,
}

impl<T: Clone + PartialEq + Send + 'static> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            derived: SmallVec::new(),
            effects: SlotMap::with_key(),
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Create a derived view; it is recomputed before effects on every change
    pub fn derive<U, F>(&mut self, compute: F) -> Derived<U>
    where
        U: Send + Sync + 'static,
        F: Fn(&T) -> U + Send + 'static,
    {
        let cell = Arc::new(RwLock::new(compute(&self.value)));
        let writer = Arc::clone(&cell);
        self.derived.push(Box::new(move |value: &T| {
            *writer.write().unwrap_or_else(PoisonError::into_inner) = compute(value);
        }));
        Derived { cell }
    }

    /// Register an effect. It runs once immediately with the current value.
    pub fn subscribe<F>(&mut self, mut effect: F) -> SubscriptionId
    where
        F: FnMut(&T) + Send + 'static,
    {
        effect(&self.value);
        self.effects.insert(Box::new(effect))
    }

    /// Remove an effect; returns false if it was already gone
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.effects.remove(id).is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.effects.len()
    }

    /// Replace the value; notifies only if it differs
    pub fn set(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        self.notify();
        true
    }

    /// Mutate in place; notifies only if the result differs
    pub fn update(&mut self, f: impl FnOnce(&mut T)) -> bool {
        let mut next = self.value.clone();
        f(&mut next);
        self.set(next)
    }

    /// Propagate the current value unconditionally
    pub fn notify(&mut self) {
        for derive in self.derived.iter_mut() {
            derive(&self.value);
        }
        for (_, effect) in self.effects.iter_mut() {
            effect(&self.value);
        }
    }
}
