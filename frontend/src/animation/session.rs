use tracing::{debug, warn};

use crate::animation::error::AnimationError;
use crate::config;

/// Per-frame callback queue the session schedules itself on.
///
/// Implementations fire the registered frame callback once per display
/// refresh for every successful `request_frame`, until the returned handle
/// is cancelled. The session never holds more than one handle at a time.
pub trait FrameScheduler {
    type Handle;

    fn request_frame(&mut self) -> Result<Self::Handle, AnimationError>;

    fn cancel_frame(&mut self, handle: Self::Handle);
}

/// What a count-up should count to, and how long it takes to get there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountUpConfig {
    pub target: i64,
    pub duration_ms: u32,
}

impl CountUpConfig {
    pub fn new(target: i64) -> Self {
        Self {
            target,
            duration_ms: config::DEFAULT_DURATION_MS,
        }
    }

    pub fn with_duration(mut self, duration_ms: u32) -> Self {
        self.duration_ms = duration_ms;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the element to become visible.
    Idle,
    /// First frame requested, no timestamp seen yet.
    Armed,
    Running,
    Completed,
    Cancelled,
}

/// One count-up animation from 0 to `target`.
///
/// The session is driven from outside: the host calls [`arm`] when the
/// element first becomes visible, [`on_frame`] every time a scheduled frame
/// fires, and [`cancel`] on teardown. It only ever talks to the scheduler it
/// is handed, so the same state machine runs against the browser's
/// `requestAnimationFrame` and against a test double.
///
/// [`arm`]: AnimationSession::arm
/// [`on_frame`]: AnimationSession::on_frame
/// [`cancel`]: AnimationSession::cancel
#[derive(Debug)]
pub struct AnimationSession<H> {
    target: u64,
    duration_ms: u32,
    displayed: u64,
    start_ms: Option<f64>,
    pending: Option<H>,
    has_started: bool,
    phase: Phase,
}

/// Negative targets are not supported; they count to zero instead.
fn clamp_target(target: i64) -> u64 {
    if target < 0 {
        warn!(end = target, "negative count-up target, clamping to 0");
    }
    target.max(0) as u64
}

impl<H> AnimationSession<H> {
    pub fn new(config: CountUpConfig) -> Self {
        Self {
            target: clamp_target(config.target),
            duration_ms: config.duration_ms,
            displayed: 0,
            start_ms: None,
            pending: None,
            has_started: false,
            phase: Phase::Idle,
        }
    }

    pub fn displayed(&self) -> u64 {
        self.displayed
    }

    #[cfg(test)]
    pub fn target(&self) -> u64 {
        self.target
    }

    #[cfg(test)]
    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    #[cfg(test)]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn has_started(&self) -> bool {
        self.has_started
    }

    #[cfg(test)]
    pub fn pending(&self) -> Option<&H> {
        self.pending.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Completed | Phase::Cancelled)
    }

    /// Commits the session to animating. Only an idle session can be armed,
    /// so repeated visibility reports never restart the count.
    pub fn arm<S>(&mut self, scheduler: &mut S) -> bool
    where
        S: FrameScheduler<Handle = H>,
    {
        if self.phase != Phase::Idle {
            return false;
        }
        self.has_started = true;

        if self.target == 0 {
            self.complete(scheduler);
            return true;
        }

        match scheduler.request_frame() {
            Ok(handle) => {
                self.pending = Some(handle);
                self.phase = Phase::Armed;
                debug!(end = self.target, duration_ms = self.duration_ms, "count-up armed");
            }
            Err(err) => {
                warn!(%err, "frame scheduler unavailable, showing final value");
                self.complete(scheduler);
            }
        }
        true
    }

    /// Handles one frame callback fired at `timestamp_ms`.
    pub fn on_frame<S>(&mut self, timestamp_ms: f64, scheduler: &mut S)
    where
        S: FrameScheduler<Handle = H>,
    {
        if !matches!(self.phase, Phase::Armed | Phase::Running) {
            return;
        }
        // The handle that just fired is spent.
        self.pending = None;
        self.phase = Phase::Running;

        let start_ms = *self.start_ms.get_or_insert(timestamp_ms);
        let elapsed = (timestamp_ms - start_ms).max(0.0);
        let duration = f64::from(self.duration_ms);

        if elapsed < duration {
            let progress = (elapsed / duration).clamp(0.0, 1.0);
            let value = ((self.target as f64) * progress).round() as u64;
            self.displayed = self.displayed.max(value.min(self.target));

            match scheduler.request_frame() {
                Ok(handle) => self.pending = Some(handle),
                Err(err) => {
                    warn!(%err, "frame scheduler failed mid-animation, showing final value");
                    self.complete(scheduler);
                }
            }
        } else {
            self.complete(scheduler);
        }
    }

    /// Teardown. Cancels the outstanding frame, if any; a completed session
    /// stays completed.
    pub fn cancel<S>(&mut self, scheduler: &mut S)
    where
        S: FrameScheduler<Handle = H>,
    {
        if let Some(handle) = self.pending.take() {
            scheduler.cancel_frame(handle);
        }
        if self.phase != Phase::Completed && self.phase != Phase::Cancelled {
            debug!(displayed = self.displayed, end = self.target, "count-up cancelled");
            self.phase = Phase::Cancelled;
        }
    }

    /// Applies a new target or duration. Any change throws away progress:
    /// the session goes back to idle at zero and has to be armed again.
    pub fn reconfigure<S>(&mut self, config: CountUpConfig, scheduler: &mut S) -> bool
    where
        S: FrameScheduler<Handle = H>,
    {
        if self.phase == Phase::Cancelled {
            return false;
        }
        let target = clamp_target(config.target);
        if target == self.target && config.duration_ms == self.duration_ms {
            return false;
        }

        if let Some(handle) = self.pending.take() {
            scheduler.cancel_frame(handle);
        }
        debug!(
            from = self.target,
            to = target,
            duration_ms = config.duration_ms,
            "count-up reconfigured, resetting"
        );
        self.target = target;
        self.duration_ms = config.duration_ms;
        self.displayed = 0;
        self.start_ms = None;
        self.has_started = false;
        self.phase = Phase::Idle;
        true
    }

    fn complete<S>(&mut self, scheduler: &mut S)
    where
        S: FrameScheduler<Handle = H>,
    {
        if let Some(handle) = self.pending.take() {
            scheduler.cancel_frame(handle);
        }
        self.displayed = self.target;
        self.phase = Phase::Completed;
        debug!(end = self.target, "count-up completed");
    }
}
