//! Error types for blinc_hooks
//!
//! Every variant except [`HookError::Config`] is fatal to the render that
//! produced it: the runtime tears its session down before returning the error.

use thiserror::Error;

use crate::context::ThreadId;
use crate::session::{ComponentId, HookKind};

/// Errors that can occur while rendering a component with hooks
#[derive(Error, Debug)]
pub enum HookError {
    /// A hook was called with no component rendering
    #[error(
        "Invalid hook call to {hook}. Hooks can only be called inside the body of a function \
         component while it is being rendered"
    )]
    InvalidHookCall { hook: HookKind },

    /// `begin` was called while another component is still rendering
    #[error("Cannot begin rendering {requested:?}: {active:?} is still rendering")]
    RenderInProgress {
        active: ComponentId,
        requested: ComponentId,
    },

    /// A replay pass called more hooks than the first pass did
    #[error("Rendered more hooks than during the previous render (hook #{index})")]
    MoreHooksThanPreviousRender { index: usize },

    /// Render-phase updates kept scheduling replay passes
    #[error("Too many re-renders. Renders are limited to {limit} passes to prevent an infinite loop")]
    TooManyReRenders { limit: u32 },

    /// A slot was revisited by a hook holding a different value type
    #[error("Hook #{index} ({hook}) was called with a different type than during the first pass (expected {expected})")]
    HookTypeMismatch {
        index: usize,
        hook: HookKind,
        expected: &'static str,
    },

    /// The context handle is not registered with the context store
    #[error("Unknown context")]
    UnknownContext,

    /// The thread id is outside the range the context store accepts
    #[error("Thread id {thread} exceeds the context store limit of {max} threads")]
    ContextBounds { thread: ThreadId, max: usize },

    /// Failed to parse a configuration file
    #[error("Invalid hooks configuration: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result type for blinc_hooks operations
pub type Result<T> = std::result::Result<T, HookError>;
