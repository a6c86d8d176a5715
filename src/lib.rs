//! Pose filtering library for stabilizing and forward-predicting tracker streams.
//!
//! This library provides double exponential smoothing (DES) filters for 6-DOF
//! poses (position plus unit quaternion) coming from head trackers, marker
//! trackers and similar noisy sources:
//! - A smoother that returns a filtered pose for every raw sample
//! - A predictor that extrapolates the pose some milliseconds ahead
//! - An outlier gate shared by both, with bounded recovery after a real jump
//!
//! Every filter instance owns its state, so use one instance per tracked entity.
//!
//! # Examples
//!
//! ## Smoothing
//!
//! ```
//! use nalgebra::{UnitQuaternion, Vector3};
//! use pose_filter::filters::{des_smoother::DesSmoother, PoseSmoother};
//! use pose_filter::Pose;
//!
//! # fn main() -> pose_filter::Result<()> {
//! let mut smoother = DesSmoother::new(0.5, 0.5)?;
//!
//! let raw = Pose::new(Vector3::new(0.1, 1.6, -0.4), UnitQuaternion::identity());
//! let filtered = smoother.filter(&raw);
//!
//! // 4x4 transform to hand to the renderer
//! let transform = filtered.to_matrix();
//! assert_eq!(transform[(1, 3)], 1.6);
//! # Ok(())
//! # }
//! ```
//!
//! ## Prediction
//!
//! ```
//! use nalgebra::Vector3;
//! use pose_filter::filters::{des_predictor::DesPredictor, PosePredictor};
//! use pose_filter::Pose;
//!
//! # fn main() -> pose_filter::Result<()> {
//! // Samples arrive every 50 ms
//! let mut predictor = DesPredictor::new(0.5, 50)?;
//! for x in [0.0, 1.0, 2.0, 3.0] {
//!     predictor.update(&Pose::from_position(Vector3::new(x, 0.0, 0.0)));
//! }
//!
//! let ahead = predictor.predict(100.0).expect("predictor has samples");
//! assert!(ahead.position.x > 2.0);
//! # Ok(())
//! # }
//! ```
//!
//! ## Saving and restoring tuning
//!
//! ```
//! use pose_filter::config::SmootherConfig;
//! use pose_filter::filters::des_smoother::DesSmoother;
//!
//! # fn main() -> pose_filter::Result<()> {
//! let smoother = DesSmoother::new(0.3, 0.2)?;
//! let saved = smoother.config().to_yaml()?;
//!
//! let restored = DesSmoother::from_config(&SmootherConfig::from_yaml(&saved)?)?;
//! assert_eq!(restored.config(), smoother.config());
//! # Ok(())
//! # }
//! ```

/// Pose type and quaternion helpers
pub mod pose;

/// Pose smoothing and prediction filters
pub mod filters;

/// Per-entity pipeline combining smoothing with dropout prediction
pub mod tracker;

/// Line-oriented front-end for recorded pose streams
pub mod app;

/// Error types and result handling
pub mod error;

/// Constants used throughout the library
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
pub use pose::Pose;
