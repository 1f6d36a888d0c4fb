//! Render session state
//!
//! A session covers one component's single logical render: the first pass and
//! every replay pass triggered by render-phase updates. Nothing in it outlives
//! the render; the runtime drops the whole session when the render ends.

use std::fmt;

use crate::slot::SlotList;
use crate::update::UpdateQueues;

/// Identity of a component instance being rendered
///
/// Dispatch handles capture the identity of the component that created them.
/// A dispatch only applies while that same identity is rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(u64);

impl ComponentId {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn to_raw(self) -> u64 {
        self.0
    }
}

/// The fixed set of hook primitives
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HookKind {
    Context,
    Memo,
    Reducer,
    State,
    Ref,
    Effect,
    LayoutEffect,
    Callback,
    ImperativeHandle,
    DebugValue,
}

impl HookKind {
    pub const fn name(self) -> &'static str {
        match self {
            HookKind::Context => "use_context",
            HookKind::Memo => "use_memo",
            HookKind::Reducer => "use_reducer",
            HookKind::State => "use_state",
            HookKind::Ref => "use_ref",
            HookKind::Effect => "use_effect",
            HookKind::LayoutEffect => "use_layout_effect",
            HookKind::Callback => "use_callback",
            HookKind::ImperativeHandle => "use_imperative_handle",
            HookKind::DebugValue => "use_debug_value",
        }
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lifecycle of the runtime
///
/// `Idle -> Rendering -> (Replaying)* -> Idle`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderPhase {
    Idle,
    /// First pass of a render
    Rendering,
    /// Replay pass number `pass` (1-based)
    Replaying { pass: u32 },
}

/// Mutable state of the active render
pub(crate) struct RenderSession {
    pub component: ComponentId,
    /// Distinguishes this render from earlier renders of the same component
    pub generation: u64,
    pub slots: SlotList,
    pub queues: UpdateQueues,
    /// Replay passes run so far
    pub re_renders: u32,
    /// Set by a render-phase dispatch, cleared before each replay pass
    pub did_schedule_render_phase_update: bool,
}

impl RenderSession {
    pub fn new(component: ComponentId, generation: u64) -> Self {
        Self {
            component,
            generation,
            slots: SlotList::new(),
            queues: UpdateQueues::new(),
            re_renders: 0,
            did_schedule_render_phase_update: false,
        }
    }

    pub fn phase(&self) -> RenderPhase {
        match self.re_renders {
            0 => RenderPhase::Rendering,
            pass => RenderPhase::Replaying { pass },
        }
    }

    /// Rewind the cursor for a replay pass, keeping every slot record
    pub fn start_replay(&mut self) {
        self.did_schedule_render_phase_update = false;
        self.re_renders += 1;
        self.slots.rewind();
    }
}
