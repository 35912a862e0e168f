//! Injected diagnostics.
//!
//! Components that log hold a [`Logger`] handed to them at construction. When
//! it carries a dispatcher, their work runs under that dispatcher; otherwise
//! events go to whatever subscriber is ambient.

use tracing::Dispatch;

/// Handle to the diagnostics sink for the tree, resolvers and scene.
#[derive(Clone, Default)]
pub struct Logger {
    dispatch: Option<Dispatch>,
}

impl Logger {
    /// Route to the ambient subscriber.
    pub fn ambient() -> Self {
        Self::default()
    }

    /// Route every event emitted in scope to `dispatch`.
    pub fn new(dispatch: Dispatch) -> Self {
        Self {
            dispatch: Some(dispatch),
        }
    }

    /// Run `f` with this logger's dispatcher active.
    pub fn in_scope<R>(&self, f: impl FnOnce() -> R) -> R {
        match &self.dispatch {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, f),
            None => f(),
        }
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("injected", &self.dispatch.is_some())
            .finish()
    }
}
