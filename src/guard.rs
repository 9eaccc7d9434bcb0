//! Session lifecycle guard
//!
//! Warns before an active session is abandoned and tells the backend when it
//! is. The guard never sees the session itself, only its lifecycle through
//! an [`ActivityProbe`].

use crate::api::QuizApi;
use crate::session::Lifecycle;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Read-only view of the session lifecycle
#[derive(Debug, Clone)]
pub struct ActivityProbe {
    rx: watch::Receiver<Lifecycle>,
}

impl ActivityProbe {
    pub fn new(rx: watch::Receiver<Lifecycle>) -> Self {
        Self { rx }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        *self.rx.borrow()
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle().is_active()
    }
}

/// What to do with an attempt to leave
#[derive(Debug)]
pub enum UnloadDecision {
    /// Keep running and show the warning; a second attempt confirms
    Stay { warning: &'static str },
    /// Leave now. `quit` is the in-flight quit notification, if one was fired.
    Leave { quit: Option<JoinHandle<()>> },
}

pub const LEAVE_WARNING: &str =
    "A session is in progress. Press Ctrl-C again to abandon it, or keep answering to continue.";

/// Intercepts interrupts and closes while a session is active
pub struct LifecycleGuard<A: QuizApi + 'static> {
    probe: ActivityProbe,
    api: Arc<A>,
    /// A first interrupt was seen and warned about
    armed: bool,
    quit_sent: bool,
}

impl<A: QuizApi + 'static> LifecycleGuard<A> {
    pub fn new(probe: ActivityProbe, api: Arc<A>) -> Self {
        Self {
            probe,
            api,
            armed: false,
            quit_sent: false,
        }
    }

    /// Ctrl-C: warn once while active, leave on the second
    pub fn on_interrupt(&mut self) -> UnloadDecision {
        if !self.probe.is_active() {
            return UnloadDecision::Leave { quit: None };
        }
        if !self.armed {
            self.armed = true;
            tracing::info!("Interrupt during active session, asking for confirmation");
            return UnloadDecision::Stay {
                warning: LEAVE_WARNING,
            };
        }
        UnloadDecision::Leave {
            quit: self.fire_quit(),
        }
    }

    /// Input closed: there is nobody left to ask, so leave immediately.
    /// Returns the in-flight quit notification, if one was fired.
    pub fn on_close(&mut self) -> Option<JoinHandle<()>> {
        self.fire_quit()
    }

    /// Any other user input cancels a pending confirmation
    pub fn disarm(&mut self) {
        self.armed = false;
    }

    /// Fire the quit notification without waiting for it. At most once, and
    /// never after the end notification has been initiated.
    fn fire_quit(&mut self) -> Option<JoinHandle<()>> {
        if self.quit_sent || !self.probe.is_active() {
            return None;
        }
        self.quit_sent = true;
        tracing::info!("Abandoning active session, notifying backend");

        let api = self.api.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = api.notify_quit().await {
                tracing::debug!(error = %e, "Quit notification not delivered");
            }
        }))
    }
}
