//! Context lookup keyed by render thread
//!
//! Context values are not stored in slots. Every read goes to a
//! [`ContextLookup`] implementation, which keeps one current value per context
//! per render thread. The surrounding renderer assigns a [`ThreadId`] before a
//! render starts and pushes/pops provider values as it walks the tree.
//!
//! [`ContextStore`] is the built-in implementation:
//!
//! ```rust
//! use blinc_hooks::context::{ContextStore, ThreadId};
//!
//! let mut store = ContextStore::new();
//! let theme = store.create_context("light");
//!
//! let thread = ThreadId(1);
//! store.push_provider(theme, thread, "dark").unwrap();
//! assert_eq!(store.read(theme, thread).unwrap(), "dark");
//!
//! store.pop_provider(theme, thread);
//! assert_eq!(store.read(theme, thread).unwrap(), "light");
//! ```

use slotmap::{new_key_type, SlotMap};
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::error::{HookError, Result};

new_key_type! {
    /// Unique identifier for a context
    pub struct ContextId;
}

/// Identifier of the render thread a component is rendered on
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThreadId(pub u32);

impl ThreadId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A typed context handle (cheap to copy)
#[derive(Debug)]
pub struct Context<T> {
    id: ContextId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Context<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Context<T> {}

impl<T> Context<T> {
    pub fn id(&self) -> ContextId {
        self.id
    }
}

/// The context collaborator consumed by the hooks runtime
pub trait ContextLookup {
    /// Make sure `thread` has a value for `context`, seeding it if needed
    fn validate_bounds(&mut self, context: ContextId, thread: ThreadId) -> Result<()>;

    /// Current value of `context` on `thread`
    fn lookup(&self, context: ContextId, thread: ThreadId) -> Option<&dyn Any>;
}

struct ContextEntry {
    default: Rc<dyn Any>,
    /// Current value per thread, indexed by thread id
    values: Vec<Rc<dyn Any>>,
    /// Values replaced by providers, restored on pop
    provider_stack: Vec<(ThreadId, Rc<dyn Any>)>,
}

/// Per-thread context values with provider push/pop
pub struct ContextStore {
    contexts: SlotMap<ContextId, ContextEntry>,
    max_threads: usize,
}

impl ContextStore {
    /// Default upper bound on thread ids
    pub const DEFAULT_MAX_THREADS: usize = 1 << 16;

    pub fn new() -> Self {
        Self::with_max_threads(Self::DEFAULT_MAX_THREADS)
    }

    pub fn with_max_threads(max_threads: usize) -> Self {
        Self {
            contexts: SlotMap::with_key(),
            max_threads,
        }
    }

    /// Register a context with its default value
    pub fn create_context<T: 'static>(&mut self, default: T) -> Context<T> {
        let id = self.contexts.insert(ContextEntry {
            default: Rc::new(default),
            values: Vec::new(),
            provider_stack: Vec::new(),
        });
        Context {
            id,
            _marker: PhantomData,
        }
    }

    /// Provide `value` for `context` on `thread` until the matching pop
    pub fn push_provider<T: 'static>(
        &mut self,
        context: Context<T>,
        thread: ThreadId,
        value: T,
    ) -> Result<()> {
        self.validate_bounds(context.id, thread)?;
        let entry = self
            .contexts
            .get_mut(context.id)
            .ok_or(HookError::UnknownContext)?;

        let previous = std::mem::replace(&mut entry.values[thread.index()], Rc::new(value));
        entry.provider_stack.push((thread, previous));
        Ok(())
    }

    /// Restore the value replaced by the most recent provider on `thread`
    pub fn pop_provider<T>(&mut self, context: Context<T>, thread: ThreadId) {
        let Some(entry) = self.contexts.get_mut(context.id) else {
            return;
        };
        let Some(pos) = entry.provider_stack.iter().rposition(|(t, _)| *t == thread) else {
            return;
        };

        let (_, previous) = entry.provider_stack.remove(pos);
        if let Some(slot) = entry.values.get_mut(thread.index()) {
            *slot = previous;
        }
    }

    /// Reset every context on `thread` back to its default value
    ///
    /// Called when a thread id is released so the next render that reuses the
    /// id starts from defaults.
    pub fn reset_thread(&mut self, thread: ThreadId) {
        for entry in self.contexts.values_mut() {
            entry.provider_stack.retain(|(t, _)| *t != thread);
            if let Some(slot) = entry.values.get_mut(thread.index()) {
                *slot = entry.default.clone();
            }
        }
    }

    /// Read a context value outside of a render
    pub fn read<T: Clone + 'static>(&mut self, context: Context<T>, thread: ThreadId) -> Result<T> {
        self.validate_bounds(context.id, thread)?;
        self.lookup(context.id, thread)
            .and_then(|value| value.downcast_ref::<T>())
            .cloned()
            .ok_or(HookError::UnknownContext)
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

impl Default for ContextStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextLookup for ContextStore {
    fn validate_bounds(&mut self, context: ContextId, thread: ThreadId) -> Result<()> {
        if thread.index() >= self.max_threads {
            return Err(HookError::ContextBounds {
                thread,
                max: self.max_threads,
            });
        }

        let entry = self
            .contexts
            .get_mut(context)
            .ok_or(HookError::UnknownContext)?;
        while entry.values.len() <= thread.index() {
            entry.values.push(entry.default.clone());
        }
        Ok(())
    }

    fn lookup(&self, context: ContextId, thread: ThreadId) -> Option<&dyn Any> {
        self.contexts
            .get(context)?
            .values
            .get(thread.index())
            .map(|value| &**value)
    }
}
