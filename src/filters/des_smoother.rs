use super::gate::OutlierGate;
use super::PoseSmoother;
use crate::config::SmootherConfig;
use crate::pose::{slerp, Pose};
use crate::Result;
use nalgebra::{UnitQuaternion, Vector3};

/// Level and trend estimates of a double exponential smoother.
///
/// Translation trend is a velocity per tick. Rotation "trend" is the
/// second-stage smoothed orientation that the next level is blended from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingState {
    pub trans_level: Vector3<f64>,
    pub trans_trend: Vector3<f64>,
    pub rot_level: UnitQuaternion<f64>,
    pub rot_trend: UnitQuaternion<f64>,
}

impl SmoothingState {
    /// Initial state from the first sample: no velocity, both orientation stages at the sample
    #[must_use]
    pub fn seed(sample: &Pose) -> Self {
        Self {
            trans_level: sample.position,
            trans_trend: Vector3::zeros(),
            rot_level: sample.orientation,
            rot_trend: sample.orientation,
        }
    }

    /// State after blending in an accepted sample
    #[must_use]
    pub fn advance(&self, sample: &Pose, config: &SmootherConfig) -> Self {
        let (trans_level, trans_trend) = if config.trans_alpha == 1.0 {
            (sample.position, self.trans_trend)
        } else {
            let alpha = config.trans_alpha;
            let gamma = config.trans_gamma;
            let level = sample.position * alpha + (self.trans_level + self.trans_trend) * (1.0 - alpha);
            let trend = (level - self.trans_level) * gamma + self.trans_trend * (1.0 - gamma);
            (level, trend)
        };

        let (rot_level, rot_trend) = if config.rot_alpha == 1.0 {
            (sample.orientation, self.rot_trend)
        } else {
            let level = slerp(&self.rot_trend, &sample.orientation, config.rot_alpha);
            let trend = slerp(&self.rot_trend, &level, config.rot_gamma);
            (level, trend)
        };

        Self {
            trans_level,
            trans_trend,
            rot_level,
            rot_trend,
        }
    }

    /// Smoothed pose for the current tick
    #[must_use]
    pub const fn pose(&self) -> Pose {
        Pose::new(self.trans_level, self.rot_level)
    }
}

/// Double exponential smoothing (DES) of a pose stream.
///
/// Uses the NIST formulation `S = a*y + (1-a)*(S' + b')`, `b = g*(S - S') + (1-g)*b'`
/// for translation and the slerp analogue for rotation.
pub struct DesSmoother {
    config: SmootherConfig,
    state: Option<SmoothingState>,
    gate: OutlierGate,
    last_output: Pose,
}

impl DesSmoother {
    /// Create a smoother using the same alpha and gamma for translation and rotation, without gating
    ///
    /// # Errors
    ///
    /// Returns an error if alpha is outside (0, 1] or gamma is outside [0, 1]
    pub fn new(alpha: f64, gamma: f64) -> Result<Self> {
        Self::from_config(&SmootherConfig::uniform(alpha, gamma))
    }

    /// Create a smoother from a (possibly deserialized) configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any coefficient is outside its valid range
    pub fn from_config(config: &SmootherConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: *config,
            state: None,
            gate: OutlierGate::new(config.trans_threshold, config.rot_threshold),
            last_output: Pose::identity(),
        })
    }

    /// Configuration this smoother was built with, for persistence
    #[must_use]
    pub const fn config(&self) -> &SmootherConfig {
        &self.config
    }

    /// Current level/trend estimates, `None` until the first sample
    #[must_use]
    pub const fn state(&self) -> Option<&SmoothingState> {
        self.state.as_ref()
    }

    /// Previous raw sample used for gating
    #[must_use]
    pub const fn reference(&self) -> &Pose {
        self.gate.reference()
    }

    /// Consecutive gated samples since the last accepted one
    #[must_use]
    pub const fn stuck_count(&self) -> u32 {
        self.gate.stuck_count()
    }

    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.state.is_some()
    }
}

impl PoseSmoother for DesSmoother {
    fn filter(&mut self, sample: &Pose) -> Pose {
        let Some(state) = self.state else {
            // Nothing to smooth against yet
            self.state = Some(SmoothingState::seed(sample));
            self.gate.seed(sample);
            self.last_output = *sample;
            return *sample;
        };

        if self.gate.check(sample).should_update() {
            let next = state.advance(sample, &self.config);
            self.last_output = next.pose();
            self.state = Some(next);
        }

        self.last_output
    }

    fn reset_history(&mut self) {
        self.state = None;
        self.gate.reset();
        self.last_output = Pose::identity();
    }

    fn name(&self) -> &str {
        "DESSmoother"
    }
}
