//! Per-entity tracking pipeline combining a smoother and a predictor.
//!
//! Observations are smoothed while the entity is visible. When observations go
//! missing the predictor bridges a bounded number of frames before the pose is
//! reported lost.

use crate::config::TrackingConfig;
use crate::filters::des_predictor::DesPredictor;
use crate::filters::des_smoother::DesSmoother;
use crate::filters::{PosePredictor, PoseSmoother};
use crate::pose::Pose;
use crate::Result;
use log::trace;

/// How the pose of a frame was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingStatus {
    /// Observed this frame
    Tracked,
    /// Extrapolated by the predictor
    Predicted,
    /// Last known pose repeated
    Held,
    /// No usable pose
    Lost,
}

impl TrackingStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tracked => "tracked",
            Self::Predicted => "predicted",
            Self::Held => "held",
            Self::Lost => "lost",
        }
    }
}

/// Pose reported for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedPose {
    pub status: TrackingStatus,
    pub pose: Option<Pose>,
}

/// Smoothing and dropout bridging for a single tracked entity
pub struct PoseTracker {
    smoother: Option<Box<dyn PoseSmoother>>,
    predictor: Option<Box<dyn PosePredictor>>,
    max_dropouts: i32,
    dropouts: u32,
    prediction_time_ms: f64,
    last_pose: Option<Pose>,
}

impl PoseTracker {
    /// Create a tracker from optional filters.
    ///
    /// `max_dropouts < 0` holds the last pose forever instead of predicting.
    #[must_use]
    pub fn new(
        smoother: Option<Box<dyn PoseSmoother>>,
        predictor: Option<Box<dyn PosePredictor>>,
        max_dropouts: i32,
    ) -> Self {
        Self {
            smoother,
            predictor,
            max_dropouts,
            dropouts: 0,
            prediction_time_ms: 0.0,
            last_pose: None,
        }
    }

    /// Create a tracker with DES filters built from `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the smoother or predictor configuration is invalid
    pub fn from_config(config: &TrackingConfig) -> Result<Self> {
        let smoother = match &config.smoother {
            Some(c) => Some(Box::new(DesSmoother::from_config(c)?) as Box<dyn PoseSmoother>),
            None => None,
        };
        let predictor = match &config.predictor {
            Some(c) => Some(Box::new(DesPredictor::from_config(c)?) as Box<dyn PosePredictor>),
            None => None,
        };
        Ok(Self::new(smoother, predictor, config.max_dropouts))
    }

    /// Replace the smoother; its history starts empty
    pub fn set_smoother(&mut self, smoother: Option<Box<dyn PoseSmoother>>) {
        self.smoother = smoother;
    }

    /// Replace the predictor; its history starts empty
    pub fn set_predictor(&mut self, predictor: Option<Box<dyn PosePredictor>>) {
        self.predictor = predictor;
        self.prediction_time_ms = 0.0;
    }

    /// Consecutive frames without an observation
    #[must_use]
    pub const fn dropouts(&self) -> u32 {
        self.dropouts
    }

    /// Most recent pose handed out for an observed frame
    #[must_use]
    pub const fn last_pose(&self) -> Option<&Pose> {
        self.last_pose.as_ref()
    }

    /// Process one frame.
    ///
    /// `observation` is the raw pose if the entity was seen; `elapsed_ms` is the time since the previous frame.
    pub fn update(&mut self, observation: Option<&Pose>, elapsed_ms: f64) -> TrackedPose {
        match observation {
            Some(raw) => self.observe(raw),
            None => self.miss(elapsed_ms),
        }
    }

    fn observe(&mut self, raw: &Pose) -> TrackedPose {
        let pose = match self.smoother.as_mut() {
            Some(smoother) => smoother.filter(raw),
            None => *raw,
        };

        if let Some(predictor) = self.predictor.as_mut() {
            self.prediction_time_ms = 0.0;
            predictor.update(raw);
        }

        self.last_pose = Some(pose);
        self.dropouts = 0;

        TrackedPose {
            status: TrackingStatus::Tracked,
            pose: Some(pose),
        }
    }

    fn miss(&mut self, elapsed_ms: f64) -> TrackedPose {
        let result = if self.max_dropouts < 0 {
            self.held()
        } else if i64::from(self.dropouts) < i64::from(self.max_dropouts) {
            self.dropouts += 1;
            match self.predictor.as_ref() {
                Some(predictor) => {
                    self.prediction_time_ms += elapsed_ms;
                    match predictor.predict(self.prediction_time_ms) {
                        Some(pose) => TrackedPose {
                            status: TrackingStatus::Predicted,
                            pose: Some(pose),
                        },
                        None => self.held(),
                    }
                }
                None => self.held(),
            }
        } else {
            trace!("Pose lost after {} missing observations", self.dropouts);
            TrackedPose {
                status: TrackingStatus::Lost,
                pose: None,
            }
        };

        if let Some(smoother) = self.smoother.as_mut() {
            smoother.reset_history();
        }

        result
    }

    fn held(&self) -> TrackedPose {
        match self.last_pose {
            Some(pose) => TrackedPose {
                status: TrackingStatus::Held,
                pose: Some(pose),
            },
            None => TrackedPose {
                status: TrackingStatus::Lost,
                pose: None,
            },
        }
    }
}
