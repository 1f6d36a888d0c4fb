//! Blinc Hooks Runtime
//!
//! [`HooksRuntime`] owns the render session and exposes the hook primitives to
//! component code. A renderer drives it with `begin` / first pass / `end`, or
//! with the [`HooksRuntime::render`] shortcut:
//!
//! ```rust
//! use blinc_hooks::{deps, ComponentId, HooksRuntime};
//!
//! struct Props {
//!     label: &'static str,
//! }
//!
//! let mut runtime = HooksRuntime::new();
//! let id = runtime.next_component_id();
//!
//! let html = runtime
//!     .render(
//!         id,
//!         |rt, props: &Props, _extra: &()| {
//!             let (clicks, _set_clicks) = rt.use_state(0)?;
//!             let title = rt.use_memo(|| props.label.to_uppercase(), Some(deps![props.label]))?;
//!             Ok(format!("<button>{title} ({clicks})</button>"))
//!         },
//!         &Props { label: "save" },
//!         &(),
//!     )
//!     .unwrap();
//!
//! assert_eq!(html, "<button>SAVE (0)</button>");
//! ```
//!
//! Hooks are identified purely by call order. Every pass of a render must call
//! the same hooks in the same order; a replay pass that calls more hooks than
//! the first pass fails with [`HookError::MoreHooksThanPreviousRender`].

use std::any::{type_name, Any};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::config::HooksConfig;
use crate::context::{Context, ContextLookup, ContextStore, ThreadId};
use crate::dispatch::{basic_state_reducer, Dispatch, StateSetter};
use crate::equality::{compare_deps, Deps, DepsComparison};
use crate::error::{HookError, Result};
use crate::session::{ComponentId, HookKind, RenderPhase, RenderSession};
use crate::slot::SlotVisit;
use crate::update::QueueId;

/// Mutable reference cell returned by `use_ref`
pub type HookRef<T> = Rc<RefCell<T>>;

/// Value stored in a memo slot
struct MemoState<T> {
    value: T,
    deps: Option<Deps>,
}

/// The hooks runtime - owns the active render session and the context store
pub struct HooksRuntime<C: ContextLookup = ContextStore> {
    config: HooksConfig,
    contexts: C,
    thread_id: ThreadId,
    session: Option<RenderSession>,
    next_component_id: u64,
    next_generation: u64,
}

impl HooksRuntime<ContextStore> {
    /// Create a runtime with the standard configuration and an empty context store
    pub fn new() -> Self {
        Self::with_config(HooksConfig::standard())
    }

    pub fn with_config(config: HooksConfig) -> Self {
        Self::with_contexts(ContextStore::new(), config)
    }
}

impl Default for HooksRuntime<ContextStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ContextLookup> HooksRuntime<C> {
    /// Create a runtime reading context values from `contexts`
    pub fn with_contexts(contexts: C, config: HooksConfig) -> Self {
        Self {
            config,
            contexts,
            thread_id: ThreadId::default(),
            session: None,
            next_component_id: 1,
            next_generation: 0,
        }
    }

    pub fn config(&self) -> &HooksConfig {
        &self.config
    }

    pub fn contexts(&self) -> &C {
        &self.contexts
    }

    pub fn contexts_mut(&mut self) -> &mut C {
        &mut self.contexts
    }

    /// Set the render thread used for context lookups
    pub fn set_current_thread_id(&mut self, thread: ThreadId) {
        self.thread_id = thread;
    }

    pub fn current_thread_id(&self) -> ThreadId {
        self.thread_id
    }

    /// Allocate a fresh component identity
    pub fn next_component_id(&mut self) -> ComponentId {
        let id = ComponentId::from_raw(self.next_component_id);
        self.next_component_id += 1;
        id
    }

    pub fn phase(&self) -> RenderPhase {
        self.session
            .as_ref()
            .map_or(RenderPhase::Idle, RenderSession::phase)
    }

    pub fn is_rendering(&self) -> bool {
        self.session.is_some()
    }

    /// Component currently rendering, if any
    pub fn current_component(&self) -> Option<ComponentId> {
        self.session.as_ref().map(|session| session.component)
    }

    // =========================================================================
    // RENDER LIFECYCLE
    // =========================================================================

    /// Start rendering `component`
    ///
    /// The renderer invokes the component's first pass after this, then
    /// calls [`HooksRuntime::end`].
    pub fn begin(&mut self, component: ComponentId) -> Result<()> {
        if let Some(active) = &self.session {
            return Err(HookError::RenderInProgress {
                active: active.component,
                requested: component,
            });
        }

        let generation = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1);

        tracing::trace!(component = component.to_raw(), generation, "begin render");
        self.session = Some(RenderSession::new(component, generation));
        Ok(())
    }

    /// Finish the render started by [`HooksRuntime::begin`]
    ///
    /// `children` is the output of the first pass. While render-phase updates
    /// are pending, the component is invoked again on the same slot list and
    /// its output replaces `children`. The session is torn down afterwards,
    /// whether the loop succeeds or not.
    pub fn end<P, E, R, F>(&mut self, mut component: F, props: &P, children: R, extra: &E) -> Result<R>
    where
        F: FnMut(&mut Self, &P, &E) -> Result<R>,
    {
        let result = self.replay_render_phase_updates(&mut component, props, children, extra);
        self.finish();
        result
    }

    /// `begin`, first pass and `end` in one call
    pub fn render<P, E, R, F>(
        &mut self,
        id: ComponentId,
        mut component: F,
        props: &P,
        extra: &E,
    ) -> Result<R>
    where
        F: FnMut(&mut Self, &P, &E) -> Result<R>,
    {
        self.begin(id)?;
        let children = match component(self, props, extra) {
            Ok(children) => children,
            Err(err) => {
                self.abort();
                return Err(err);
            }
        };
        self.end(component, props, children, extra)
    }

    /// Tear down the active session without running replay passes
    pub fn abort(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::debug!(
                component = session.component.to_raw(),
                pending = session.queues.pending_len(),
                "render aborted"
            );
        }
    }

    fn replay_render_phase_updates<P, E, R, F>(
        &mut self,
        component: &mut F,
        props: &P,
        mut children: R,
        extra: &E,
    ) -> Result<R>
    where
        F: FnMut(&mut Self, &P, &E) -> Result<R>,
    {
        let limit = self.config.re_render_limit;
        loop {
            let Some(session) = self.session.as_mut() else {
                return Ok(children);
            };
            if !session.did_schedule_render_phase_update {
                return Ok(children);
            }
            if session.re_renders >= limit {
                return Err(HookError::TooManyReRenders { limit });
            }

            session.start_replay();
            tracing::debug!(
                component = session.component.to_raw(),
                pass = session.re_renders,
                "replaying render-phase updates"
            );

            children = component(self, props, extra)?;
        }
    }

    fn finish(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::trace!(
                component = session.component.to_raw(),
                slots = session.slots.len(),
                re_renders = session.re_renders,
                "end render"
            );
        }
    }

    // =========================================================================
    // SLOTS
    // =========================================================================

    fn resolve_session(&mut self, hook: HookKind) -> Result<&mut RenderSession> {
        self.session
            .as_mut()
            .ok_or(HookError::InvalidHookCall { hook })
    }

    /// Claim the next slot; replay passes may not append
    fn next_slot(&mut self, hook: HookKind) -> Result<(&mut RenderSession, SlotVisit)> {
        let session = self.resolve_session(hook)?;
        let allow_append = session.re_renders == 0;
        let visit = session.slots.next_slot(allow_append)?;
        Ok((session, visit))
    }

    // =========================================================================
    // STATE / REDUCER
    // =========================================================================

    /// Reducer slot whose initial state is `initial`
    pub fn use_reducer<S, A, F>(&mut self, reducer: F, initial: S) -> Result<(S, Dispatch<A>)>
    where
        S: Clone + 'static,
        A: 'static,
        F: Fn(S, A) -> S,
    {
        self.reducer_slot(HookKind::Reducer, reducer, || initial)
    }

    /// Reducer slot whose initial state is `init(arg)`
    ///
    /// `init` only runs on the first pass.
    pub fn use_reducer_with<S, A, I, F, G>(
        &mut self,
        reducer: F,
        arg: I,
        init: G,
    ) -> Result<(S, Dispatch<A>)>
    where
        S: Clone + 'static,
        A: 'static,
        F: Fn(S, A) -> S,
        G: FnOnce(I) -> S,
    {
        self.reducer_slot(HookKind::Reducer, reducer, move || init(arg))
    }

    /// State slot
    pub fn use_state<S: Clone + 'static>(&mut self, initial: S) -> Result<(S, StateSetter<S>)> {
        self.reducer_slot(HookKind::State, basic_state_reducer, || initial)
    }

    /// State slot with a lazy initializer, run only on the first pass
    pub fn use_state_with<S, G>(&mut self, init: G) -> Result<(S, StateSetter<S>)>
    where
        S: Clone + 'static,
        G: FnOnce() -> S,
    {
        self.reducer_slot(HookKind::State, basic_state_reducer, init)
    }

    fn reducer_slot<S, A, F, G>(
        &mut self,
        hook: HookKind,
        reducer: F,
        init: G,
    ) -> Result<(S, Dispatch<A>)>
    where
        S: Clone + 'static,
        A: 'static,
        F: Fn(S, A) -> S,
        G: FnOnce() -> S,
    {
        let (session, visit) = self.next_slot(hook)?;
        let (component, generation) = (session.component, session.generation);

        if !visit.is_re_render {
            let initial = init();
            let queue = session.queues.create_queue(visit.id);
            let slot = session.slots.slot_mut(&visit);
            slot.memoized = Some(Box::new(initial.clone()));
            slot.queue = Some(queue);
            return Ok((initial, Dispatch::new(component, generation, queue)));
        }

        let mismatch = || HookError::HookTypeMismatch {
            index: visit.index,
            hook,
            expected: type_name::<S>(),
        };

        let queue = session
            .slots
            .slot_mut(&visit)
            .queue
            .ok_or_else(mismatch)?;
        let dispatch = Dispatch::new(component, generation, queue);
        let actions = session.queues.drain(queue);
        let slot = session.slots.slot_mut(&visit);

        if actions.is_empty() {
            let state = slot
                .memoized
                .as_ref()
                .and_then(|value| value.downcast_ref::<S>())
                .ok_or_else(mismatch)?;
            return Ok((state.clone(), dispatch));
        }

        let mut state = slot
            .memoized
            .take()
            .ok_or_else(mismatch)?
            .downcast::<S>()
            .map(|boxed| *boxed)
            .map_err(|_| mismatch())?;

        for action in actions {
            let action = action
                .downcast::<A>()
                .map_err(|_| HookError::HookTypeMismatch {
                    index: visit.index,
                    hook,
                    expected: type_name::<A>(),
                })?;
            state = reducer(state, *action);
        }

        slot.memoized = Some(Box::new(state.clone()));
        Ok((state, dispatch))
    }

    // =========================================================================
    // MEMO / REF
    // =========================================================================

    /// Memoized computation
    ///
    /// Returns the cached value when `deps` is `Some` and equal to the list
    /// stored with it; otherwise runs `compute` and caches the result.
    pub fn use_memo<T, F>(&mut self, compute: F, deps: Option<Deps>) -> Result<T>
    where
        T: Clone + 'static,
        F: FnOnce() -> T,
    {
        let dev_warnings = self.config.dev_warnings;
        let (session, visit) = self.next_slot(HookKind::Memo)?;
        let slot = session.slots.slot_mut(&visit);

        if let Some(previous) = slot.memoized.as_ref() {
            let previous = previous.downcast_ref::<MemoState<T>>().ok_or(
                HookError::HookTypeMismatch {
                    index: visit.index,
                    hook: HookKind::Memo,
                    expected: type_name::<T>(),
                },
            )?;

            if let Some(next_deps) = deps.as_deref() {
                match compare_deps(next_deps, previous.deps.as_deref()) {
                    DepsComparison::Equal => return Ok(previous.value.clone()),
                    DepsComparison::Changed => {}
                    DepsComparison::MissingPrevious => {
                        if dev_warnings {
                            tracing::warn!(
                                hook = %HookKind::Memo,
                                index = visit.index,
                                "received a dependency list during this pass, but not during the \
                                 previous pass. The dependency list is optional, but its presence \
                                 cannot change between passes"
                            );
                        }
                    }
                    DepsComparison::LengthChanged { .. } => {
                        if dev_warnings {
                            tracing::warn!(
                                hook = %HookKind::Memo,
                                index = visit.index,
                                previous = ?previous.deps,
                                incoming = ?next_deps,
                                "the dependency list changed size between passes. Its order and \
                                 size must remain constant"
                            );
                        }
                    }
                }
            }
        }

        let value = compute();
        slot.memoized = Some(Box::new(MemoState {
            value: value.clone(),
            deps,
        }));
        Ok(value)
    }

    /// Mutable reference cell, created on the first pass and returned
    /// unchanged on every later pass
    pub fn use_ref<T: 'static>(&mut self, initial: T) -> Result<HookRef<T>> {
        let (session, visit) = self.next_slot(HookKind::Ref)?;
        let slot = session.slots.slot_mut(&visit);

        match slot.memoized.as_ref() {
            Some(existing) => existing
                .downcast_ref::<HookRef<T>>()
                .cloned()
                .ok_or(HookError::HookTypeMismatch {
                    index: visit.index,
                    hook: HookKind::Ref,
                    expected: type_name::<T>(),
                }),
            None => {
                let cell = Rc::new(RefCell::new(initial));
                slot.memoized = Some(Box::new(cell.clone()));
                Ok(cell)
            }
        }
    }

    // =========================================================================
    // CONTEXT
    // =========================================================================

    /// Read a context value from inside a component body
    ///
    /// Does not claim a slot.
    pub fn use_context<T: Clone + 'static>(&mut self, context: Context<T>) -> Result<T> {
        self.resolve_session(HookKind::Context)?;
        self.read_context(context)
    }

    /// Read a context value for the current thread without requiring an
    /// active render
    pub fn read_context<T: Clone + 'static>(&mut self, context: Context<T>) -> Result<T> {
        let thread = self.thread_id;
        self.contexts.validate_bounds(context.id(), thread)?;
        self.contexts
            .lookup(context.id(), thread)
            .and_then(|value| value.downcast_ref::<T>())
            .cloned()
            .ok_or(HookError::UnknownContext)
    }

    // =========================================================================
    // NO-OP PRIMITIVES
    // =========================================================================

    /// Effects never run: there is no post-render phase
    pub fn use_effect<F, D>(&mut self, _create: F, _deps: Option<Deps>)
    where
        F: FnOnce() -> D,
    {
        tracing::trace!(hook = %HookKind::Effect, "effect skipped");
    }

    /// Layout effects never run; logs a warning because the rendered output
    /// will not reflect them
    pub fn use_layout_effect<F, D>(&mut self, _create: F, _deps: Option<Deps>)
    where
        F: FnOnce() -> D,
    {
        if self.config.warn_on_layout_effect {
            tracing::warn!(
                hook = %HookKind::LayoutEffect,
                "use_layout_effect does nothing in a single-pass render, because its effect \
                 cannot be encoded into the rendered output. Only use it in components that \
                 are rendered interactively"
            );
        }
    }

    /// Returns `callback` unchanged
    pub fn use_callback<F>(&mut self, callback: F, _deps: Option<Deps>) -> F {
        callback
    }

    /// Imperative handles are never attached
    pub fn use_imperative_handle<T, F>(
        &mut self,
        _target: &HookRef<Option<T>>,
        _create: F,
        _deps: Option<Deps>,
    ) where
        F: FnOnce() -> T,
    {
        tracing::trace!(hook = %HookKind::ImperativeHandle, "imperative handle skipped");
    }

    pub fn use_debug_value<T: fmt::Debug>(&mut self, value: T) {
        tracing::trace!(hook = %HookKind::DebugValue, value = ?value);
    }

    // =========================================================================
    // DISPATCH
    // =========================================================================

    /// Enqueue a type-erased action for `queue`
    ///
    /// Applies only while the render identified by `component` and
    /// `generation` is running; any other dispatch arrives after its render
    /// returned and is dropped.
    pub(crate) fn dispatch_action(
        &mut self,
        component: ComponentId,
        generation: u64,
        queue: QueueId,
        action: Box<dyn Any>,
    ) -> Result<()> {
        let limit = self.config.re_render_limit;
        let Some(session) = self.session.as_mut() else {
            tracing::debug!(
                component = component.to_raw(),
                "dropping update dispatched outside of a render"
            );
            return Ok(());
        };

        if session.re_renders >= limit {
            return Err(HookError::TooManyReRenders { limit });
        }

        let Some(owner) = session
            .queues
            .queue(queue)
            .filter(|_| session.component == component && session.generation == generation)
        else {
            tracing::debug!(
                component = component.to_raw(),
                generation,
                rendering = session.component.to_raw(),
                "dropping update for a render that is no longer running"
            );
            return Ok(());
        };

        tracing::trace!(slot = ?owner.slot, "render-phase update scheduled");
        session.queues.enqueue(queue, action);
        session.did_schedule_render_phase_update = true;
        Ok(())
    }

    // =========================================================================
    // STATS
    // =========================================================================

    pub fn stats(&self) -> RenderStats {
        match &self.session {
            Some(session) => RenderStats {
                component: Some(session.component),
                phase: session.phase(),
                slot_count: session.slots.len(),
                re_renders: session.re_renders,
                pending_updates: session.queues.pending_len(),
            },
            None => RenderStats {
                component: None,
                phase: RenderPhase::Idle,
                slot_count: 0,
                re_renders: 0,
                pending_updates: 0,
            },
        }
    }
}

/// Statistics about the active render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderStats {
    pub component: Option<ComponentId>,
    pub phase: RenderPhase,
    pub slot_count: usize,
    pub re_renders: u32,
    pub pending_updates: usize,
}
