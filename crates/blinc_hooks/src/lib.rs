//! Blinc Hooks Runtime
//!
//! Call-order state slots for function components rendered in a single
//! synchronous pass:
//!
//! - **Slots**: each hook call claims the next position in a per-render slot
//!   list; the position is the only identity a hook has
//! - **Render-phase updates**: dispatching while the component is still
//!   rendering replays the component until no updates remain, bounded by a
//!   replay limit
//! - **Memoization**: dependency lists compared with same-value semantics
//! - **Context**: per-thread context reads that do not consume a slot
//!
//! Effects, layout effects and imperative handles are accepted but never run:
//! there is no post-render phase.
//!
//! # Example
//!
//! ```rust
//! use blinc_hooks::{deps, HooksRuntime, RenderPhase};
//!
//! let mut runtime = HooksRuntime::new();
//! let id = runtime.next_component_id();
//!
//! let total = runtime
//!     .render(
//!         id,
//!         |rt, items: &Vec<u32>, _extra: &()| {
//!             let (visits, set_visits) = rt.use_state(0u32)?;
//!             let sum = rt.use_memo(|| items.iter().sum::<u32>(), Some(deps![items.len()]))?;
//!
//!             // Schedule an update while still rendering: the component is
//!             // invoked again with the update applied.
//!             if rt.phase() == RenderPhase::Rendering {
//!                 set_visits.update(rt, |v| v + 1)?;
//!             }
//!             Ok(sum + visits)
//!         },
//!         &vec![1, 2, 3],
//!         &(),
//!     )
//!     .unwrap();
//!
//! assert_eq!(total, 7);
//! assert!(!runtime.is_rendering());
//! ```

pub mod config;
pub mod context;
pub mod dispatch;
pub mod equality;
pub mod error;
pub mod runtime;
pub mod session;
pub mod slot;
pub mod update;

pub use config::HooksConfig;
pub use context::{Context, ContextId, ContextLookup, ContextStore, ThreadId};
pub use dispatch::{basic_state_reducer, Dispatch, SetStateAction, StateSetter};
pub use equality::{are_hook_inputs_equal, same_value, DepValue, Deps};
pub use error::{HookError, Result};
pub use runtime::{HookRef, HooksRuntime, RenderStats};
pub use session::{ComponentId, HookKind, RenderPhase};
pub use slot::{SlotId, SlotList, SlotVisit};
