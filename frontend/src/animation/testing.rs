use crate::animation::error::AnimationError;
use crate::animation::session::FrameScheduler;

/// Recording scheduler: hands out numbered handles and remembers what was
/// requested and cancelled. Panics if two frames are ever outstanding.
#[derive(Debug, Default)]
pub struct FakeScheduler {
    pub next: u32,
    pub outstanding: Vec<u32>,
    pub requested: u32,
    pub cancelled: Vec<u32>,
    pub fail_after: Option<u32>,
}

impl FakeScheduler {
    pub fn unavailable() -> Self {
        Self {
            fail_after: Some(0),
            ..Self::default()
        }
    }

    /// The browser drops a handle from its queue right before running it.
    pub fn take_fired(&mut self, handle: u32) {
        self.outstanding.retain(|h| *h != handle);
    }
}

impl FrameScheduler for FakeScheduler {
    type Handle = u32;

    fn request_frame(&mut self) -> Result<u32, AnimationError> {
        if self.fail_after.is_some_and(|n| self.requested >= n) {
            return Err(AnimationError::Scheduler("no frames".into()));
        }
        self.requested += 1;
        self.next += 1;
        self.outstanding.push(self.next);
        assert!(self.outstanding.len() <= 1, "more than one frame outstanding");
        Ok(self.next)
    }

    fn cancel_frame(&mut self, handle: u32) {
        self.outstanding.retain(|h| *h != handle);
        self.cancelled.push(handle);
    }
}
