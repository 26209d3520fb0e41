use std::fmt::Debug;

use crate::api::error::ScheduleError;

/// "Call me back before the next display refresh."
///
/// The orchestrator requests one tick at a time and holds the returned
/// handle until the tick fires or is cancelled. The browser implementation
/// wraps `requestAnimationFrame`; [`ManualScheduler`] drives headless runs
/// and tests.
pub trait Scheduler {
    /// Token identifying one pending request.
    type Handle: Copy + PartialEq + Debug;

    /// Ask for one callback before the next refresh.
    fn request_tick(&mut self) -> Result<Self::Handle, ScheduleError>;

    /// Cancel a pending request. Unknown or already-fired handles are ignored.
    fn cancel_tick(&mut self, handle: Self::Handle);
}

/// Deterministic scheduler that records requests instead of waiting for a
/// display. The driver fires the pending tick with [`ManualScheduler::fire`].
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_handle: u64,
    pending: Option<u64>,
    requests: u64,
    cancellations: u64,
    refuse: bool,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle of the outstanding request, if any.
    pub fn pending(&self) -> Option<u64> {
        self.pending
    }

    /// Consume the outstanding request as if the display refreshed.
    /// Returns `false` when nothing was scheduled.
    pub fn fire(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Make subsequent requests fail until called again with `false`.
    pub fn set_refusing(&mut self, refuse: bool) {
        self.refuse = refuse;
    }

    pub fn request_count(&self) -> u64 {
        self.requests
    }

    pub fn cancel_count(&self) -> u64 {
        self.cancellations
    }
}

impl Scheduler for ManualScheduler {
    type Handle = u64;

    fn request_tick(&mut self) -> Result<u64, ScheduleError> {
        if self.refuse {
            return Err(ScheduleError::Rejected("manual scheduler refusing".into()));
        }
        self.next_handle += 1;
        self.requests += 1;
        self.pending = Some(self.next_handle);
        Ok(self.next_handle)
    }

    fn cancel_tick(&mut self, handle: u64) {
        if self.pending == Some(handle) {
            self.pending = None;
            self.cancellations += 1;
        }
    }
}
