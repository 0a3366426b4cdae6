//! One-shot deferred actions.
//!
//! The widget cannot capture itself in a timer callback, so it hands the
//! scheduler a [`DeferredAction`] and the platform calls
//! [`Sidebar::run_deferred`](crate::Sidebar::run_deferred) when it fires.
//! Scheduled actions are not cancellable; running one twice is harmless.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredAction {
    /// Close the panel after a mobile menu selection.
    Collapse,
}

pub trait Scheduler {
    fn schedule(&self, delay: Duration, action: DeferredAction);
}
