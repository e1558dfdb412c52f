use log::Level;

pub const DEFAULT_DURATION_MS: u32 = 2000;

/// Fraction of the element that must be on screen to start counting.
/// Zero means any visible pixel.
pub const VISIBILITY_THRESHOLD: f64 = 0.0;

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::Debug // Verbose animation lifecycle when running locally
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::Info
}

#[cfg(debug_assertions)]
pub fn tracing_level() -> tracing::Level {
    tracing::Level::DEBUG
}

#[cfg(not(debug_assertions))]
pub fn tracing_level() -> tracing::Level {
    tracing::Level::INFO
}
