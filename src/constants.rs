//! Constants used throughout the library

/// Consecutive gate rejections tolerated before a sample is force-accepted
pub const RESTART_THRESHOLD: u32 = 5;

/// Threshold value meaning "no limit" for an axis family
pub const DISABLED_THRESHOLD: f64 = -1.0;

/// Default smoother coefficients (no smoothing)
pub const DEFAULT_SMOOTHER_ALPHA: f64 = 1.0;
pub const DEFAULT_SMOOTHER_GAMMA: f64 = 1.0;

/// Default predictor coefficients
pub const DEFAULT_PREDICTOR_ALPHA: f64 = 0.5;
pub const DEFAULT_PREDICTOR_DELTA_MS: u32 = 50;

/// Default frame interval for the stream front-end (30 Hz)
pub const DEFAULT_FRAME_INTERVAL_MS: f64 = 1000.0 / 30.0;

/// Default number of decimals written per output value
pub const DEFAULT_OUTPUT_PRECISION: usize = 6;

/// Angle below which slerp falls back to normalized lerp
pub const SLERP_EPSILON: f64 = 1e-9;

/// Numeric precision epsilon
pub const EPSILON: f64 = 1e-10;
