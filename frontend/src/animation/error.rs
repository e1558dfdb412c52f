use thiserror::Error;

/// Environmental failures around the count-up animation.
///
/// None of these reach the UI: a scheduler failure falls back to showing the
/// final value, an observer failure leaves the counter at zero.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnimationError {
    #[error("no browser window available")]
    NoWindow,
    #[error("frame scheduler rejected the request: {0}")]
    Scheduler(String),
    #[error("frame callback is no longer attached")]
    CallbackDetached,
    #[error("host element is not mounted")]
    MissingElement,
    #[error("intersection observer unavailable: {0}")]
    Observer(String),
}
