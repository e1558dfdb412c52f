/// One-shot visibility signal.
///
/// Viewport reporters call back with "is intersecting" every time the
/// element crosses a threshold, including once right after observation
/// starts. The latch turns that stream into a single false to true
/// transition and ignores everything afterwards.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityLatch {
    fired: bool,
}

impl VisibilityLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true only for the first intersecting report.
    pub fn report(&mut self, intersecting: bool) -> bool {
        if self.fired || !intersecting {
            return false;
        }
        self.fired = true;
        true
    }

    #[cfg(test)]
    pub fn has_fired(&self) -> bool {
        self.fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_on_initial_report_when_already_visible() {
        let mut latch = VisibilityLatch::new();
        assert!(latch.report(true));
        assert!(latch.has_fired());
    }

    #[test]
    fn fires_once_across_toggles() {
        let mut latch = VisibilityLatch::new();
        let fired: Vec<bool> = [false, false, true, false, true, true]
            .into_iter()
            .map(|visible| latch.report(visible))
            .collect();
        assert_eq!(fired, vec![false, false, true, false, false, false]);
    }

    #[test]
    fn stays_quiet_while_offscreen() {
        let mut latch = VisibilityLatch::new();
        for _ in 0..10 {
            assert!(!latch.report(false));
        }
        assert!(!latch.has_fired());
    }
}
