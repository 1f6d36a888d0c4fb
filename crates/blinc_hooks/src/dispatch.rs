//! Dispatch handles for reducer and state slots
//!
//! A [`Dispatch`] is a small copyable handle naming the component that created
//! it and the update queue of its slot. It does not capture the runtime;
//! callers pass the runtime in when they dispatch:
//!
//! ```rust
//! use blinc_hooks::{ComponentId, HooksRuntime};
//!
//! let mut runtime = HooksRuntime::new();
//! let count = runtime
//!     .render(
//!         ComponentId::from_raw(1),
//!         |rt, _props: &(), _extra: &()| {
//!             let (count, set_count) = rt.use_state(0)?;
//!             if count < 3 {
//!                 set_count.update(rt, |n| n + 1)?;
//!             }
//!             Ok(count)
//!         },
//!         &(),
//!         &(),
//!     )
//!     .unwrap();
//! assert_eq!(count, 3);
//! ```

use std::fmt;
use std::marker::PhantomData;

use crate::context::ContextLookup;
use crate::error::Result;
use crate::runtime::HooksRuntime;
use crate::session::ComponentId;
use crate::update::QueueId;

/// Handle that enqueues actions on a reducer slot
///
/// The handle returned by a slot is equal across every pass of one render.
pub struct Dispatch<A> {
    component: ComponentId,
    generation: u64,
    queue: QueueId,
    _marker: PhantomData<fn(A)>,
}

impl<A> Clone for Dispatch<A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A> Copy for Dispatch<A> {}

impl<A> PartialEq for Dispatch<A> {
    fn eq(&self, other: &Self) -> bool {
        self.component == other.component
            && self.generation == other.generation
            && self.queue == other.queue
    }
}

impl<A> Eq for Dispatch<A> {}

impl<A> fmt::Debug for Dispatch<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatch")
            .field("component", &self.component)
            .field("generation", &self.generation)
            .field("queue", &self.queue)
            .finish()
    }
}

impl<A> Dispatch<A> {
    pub(crate) fn new(component: ComponentId, generation: u64, queue: QueueId) -> Self {
        Self {
            component,
            generation,
            queue,
            _marker: PhantomData,
        }
    }

    /// Component that created this handle
    pub fn component(&self) -> ComponentId {
        self.component
    }
}

impl<A: 'static> Dispatch<A> {
    /// Enqueue `action` on the slot
    ///
    /// Applied on a replay pass if the render that created the handle is
    /// still running, dropped otherwise. Fails once the replay limit has been
    /// reached.
    pub fn dispatch<C: ContextLookup>(&self, runtime: &mut HooksRuntime<C>, action: A) -> Result<()> {
        runtime.dispatch_action(self.component, self.generation, self.queue, Box::new(action))
    }
}

/// Action accepted by state slots: a replacement value or an updater
pub enum SetStateAction<S> {
    Value(S),
    Update(Box<dyn FnOnce(S) -> S>),
}

impl<S> SetStateAction<S> {
    pub fn update(f: impl FnOnce(S) -> S + 'static) -> Self {
        SetStateAction::Update(Box::new(f))
    }

    /// Apply the action to the current state
    pub fn apply(self, state: S) -> S {
        match self {
            SetStateAction::Value(value) => value,
            SetStateAction::Update(f) => f(state),
        }
    }
}

impl<S> From<S> for SetStateAction<S> {
    fn from(value: S) -> Self {
        SetStateAction::Value(value)
    }
}

impl<S: fmt::Debug> fmt::Debug for SetStateAction<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetStateAction::Value(value) => f.debug_tuple("Value").field(value).finish(),
            SetStateAction::Update(_) => f.write_str("Update(..)"),
        }
    }
}

/// Reducer used by state slots
pub fn basic_state_reducer<S>(state: S, action: SetStateAction<S>) -> S {
    action.apply(state)
}

/// Dispatch handle returned by `use_state`
pub type StateSetter<S> = Dispatch<SetStateAction<S>>;

impl<S: 'static> Dispatch<SetStateAction<S>> {
    /// Replace the state with `value`
    pub fn set<C: ContextLookup>(&self, runtime: &mut HooksRuntime<C>, value: S) -> Result<()> {
        self.dispatch(runtime, SetStateAction::Value(value))
    }

    /// Compute the next state from the previous one
    pub fn update<C: ContextLookup>(
        &self,
        runtime: &mut HooksRuntime<C>,
        f: impl FnOnce(S) -> S + 'static,
    ) -> Result<()> {
        self.dispatch(runtime, SetStateAction::update(f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_state_reducer() {
        assert_eq!(basic_state_reducer(1, SetStateAction::Value(5)), 5);
        assert_eq!(basic_state_reducer(1, SetStateAction::update(|s| s + 1)), 2);
        assert_eq!(basic_state_reducer(1, 9.into()), 9);
    }

    #[test]
    fn test_action_debug() {
        assert_eq!(format!("{:?}", SetStateAction::Value(3)), "Value(3)");
        assert_eq!(
            format!("{:?}", SetStateAction::<i32>::update(|s| s)),
            "Update(..)"
        );
    }
}
