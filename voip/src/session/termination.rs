//! Leg termination signal shared by the duties of one call leg

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::SessionError;

/// Why a call leg ended.
#[derive(Debug)]
pub enum TerminationReason {
    /// `terminate()` was called by the owner of the leg
    Requested,
    /// The capture source reported the end of its stream
    CaptureEnded,
    /// A duty hit an unrecoverable error
    Failed(SessionError),
}

impl TerminationReason {
    pub fn is_failure(&self) -> bool {
        matches!(self, TerminationReason::Failed(_))
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationReason::Requested => write!(f, "terminated by request"),
            TerminationReason::CaptureEnded => write!(f, "capture stream ended"),
            TerminationReason::Failed(e) => write!(f, "failed: {}", e),
        }
    }
}

/// One-shot termination event.
///
/// Any duty, or the owner of the leg, can signal it; the first reason
/// sticks and later signals are ignored.
#[derive(Clone, Default)]
pub struct LegTerminator {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    terminated: AtomicBool,
    reason: Mutex<Option<TerminationReason>>,
}

impl LegTerminator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `reason` unless the leg already ended.
    ///
    /// Returns true when this call is the one that ended the leg.
    pub fn signal(&self, reason: TerminationReason) -> bool {
        let mut slot = self
            .inner
            .reason
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if self.inner.terminated.load(Ordering::Acquire) {
            return false;
        }
        *slot = Some(reason);
        self.inner.terminated.store(true, Ordering::Release);
        true
    }

    pub fn is_terminated(&self) -> bool {
        self.inner.terminated.load(Ordering::Acquire)
    }

    /// Takes the recorded reason. `Requested` if none was recorded.
    pub(crate) fn take_reason(&self) -> TerminationReason {
        self.inner
            .reason
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
            .unwrap_or(TerminationReason::Requested)
    }
}

impl fmt::Debug for LegTerminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LegTerminator")
            .field("terminated", &self.is_terminated())
            .finish()
    }
}
