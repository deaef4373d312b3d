//! Display fault boundary
//!
//! Wraps a render path. The first fault latches the boundary; later renders
//! short-circuit with [`ViewError::Faulted`] until [`ViewBoundary::reset`].
//! The boundary holds no pipeline state, so resetting it leaves the
//! orchestrator untouched.

use crate::error::{RenderFault, ViewError};

/// Latching fault boundary for one view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewBoundary {
    fault: Option<RenderFault>,
}

impl ViewBoundary {
    /// Unlatched boundary
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `render` unless latched
    ///
    /// # Errors
    /// [`ViewError::Fault`] if `render` fails (the boundary latches), or
    /// [`ViewError::Faulted`] without calling `render` while latched.
    pub fn render<T, F>(&mut self, render: F) -> Result<T, ViewError>
    where
        F: FnOnce() -> Result<T, RenderFault>,
    {
        if let Some(fault) = &self.fault {
            return Err(ViewError::Faulted(fault.clone()));
        }
        render().map_err(|fault| {
            tracing::warn!(%fault, "view faulted");
            self.fault = Some(fault.clone());
            ViewError::Fault(fault)
        })
    }

    /// Clear the latch
    pub fn reset(&mut self) {
        self.fault = None;
    }

    /// Latched fault, if any
    #[must_use]
    pub fn fault(&self) -> Option<&RenderFault> {
        self.fault.as_ref()
    }

    /// Whether the boundary is latched
    #[inline]
    #[must_use]
    pub fn is_faulted(&self) -> bool {
        self.fault.is_some()
    }
}
