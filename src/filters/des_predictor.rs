use super::gate::OutlierGate;
use super::PosePredictor;
use crate::config::PredictorConfig;
use crate::pose::{renormalize, slerp, Pose};
use crate::Result;
use nalgebra::{UnitQuaternion, Vector3};

/// First and second stage smoothed values of the DES predictor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionState {
    pub trans_s: Vector3<f64>,
    pub trans_s2: Vector3<f64>,
    pub rot_s: UnitQuaternion<f64>,
    pub rot_s2: UnitQuaternion<f64>,
}

impl PredictionState {
    #[must_use]
    pub const fn seed(sample: &Pose) -> Self {
        Self {
            trans_s: sample.position,
            trans_s2: sample.position,
            rot_s: sample.orientation,
            rot_s2: sample.orientation,
        }
    }

    /// Cascade an accepted sample through both smoothing stages
    #[must_use]
    pub fn advance(&self, sample: &Pose, config: &PredictorConfig) -> Self {
        let a = config.trans_alpha;
        let trans_s = sample.position * a + self.trans_s * (1.0 - a);
        let trans_s2 = trans_s * a + self.trans_s2 * (1.0 - a);

        let rot_s = slerp(&self.rot_s, &sample.orientation, config.rot_alpha);
        let rot_s2 = slerp(&self.rot_s2, &rot_s, config.rot_alpha);

        Self {
            trans_s,
            trans_s2,
            rot_s,
            rot_s2,
        }
    }

    /// Closed-form DES forecast `tau` ticks ahead.
    ///
    /// Orientation uses the same linear formula on raw quaternion components and is
    /// renormalized afterwards. If that cancels to zero the first stage orientation is used.
    #[must_use]
    pub fn forecast(&self, tau: u32, config: &PredictorConfig) -> Pose {
        let f = forecast_factor(config.trans_alpha, tau);
        let position = self.trans_s * (2.0 + f) - self.trans_s2 * (1.0 + f);

        let f = forecast_factor(config.rot_alpha, tau);
        let q = self.rot_s.into_inner() * (2.0 + f) - self.rot_s2.into_inner() * (1.0 + f);
        let orientation = if q.norm() > crate::constants::EPSILON {
            renormalize(q)
        } else {
            self.rot_s
        };

        Pose::new(position, orientation)
    }
}

/// `alpha * tau / (1 - alpha)`; alpha is validated to lie strictly inside (0, 1)
fn forecast_factor(alpha: f64, tau: u32) -> f64 {
    alpha * f64::from(tau) / (1.0 - alpha)
}

/// LaViola's double exponential smoothing predictor.
///
/// Feed every raw sample through [`PosePredictor::update`] and ask for the pose
/// some milliseconds ahead with [`PosePredictor::predict`].
pub struct DesPredictor {
    config: PredictorConfig,
    state: Option<PredictionState>,
    gate: OutlierGate,
}

impl DesPredictor {
    /// Create a predictor with one alpha for translation and rotation, without gating
    ///
    /// # Errors
    ///
    /// Returns an error if alpha is outside (0, 1) or `delta_ms` is zero
    pub fn new(alpha: f64, delta_ms: u32) -> Result<Self> {
        Self::from_config(&PredictorConfig::uniform(alpha, delta_ms))
    }

    /// Create a predictor from a (possibly deserialized) configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a coefficient is outside (0, 1) or `delta_ms` is zero
    pub fn from_config(config: &PredictorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: *config,
            state: None,
            gate: OutlierGate::new(config.trans_threshold, config.rot_threshold),
        })
    }

    #[must_use]
    pub const fn config(&self) -> &PredictorConfig {
        &self.config
    }

    #[must_use]
    pub const fn state(&self) -> Option<&PredictionState> {
        self.state.as_ref()
    }

    #[must_use]
    pub const fn reference(&self) -> &Pose {
        self.gate.reference()
    }

    #[must_use]
    pub const fn stuck_count(&self) -> u32 {
        self.gate.stuck_count()
    }

    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Number of ticks `max(round(t / delta), 1)` a horizon of `horizon_ms` spans
    #[must_use]
    pub fn steps_ahead(&self, horizon_ms: f64) -> u32 {
        let steps = (horizon_ms / f64::from(self.config.delta_ms)).round();
        if steps.is_finite() && steps > 1.0 {
            // Saturating conversion for absurd horizons
            steps as u32
        } else {
            1
        }
    }
}

impl PosePredictor for DesPredictor {
    fn update(&mut self, sample: &Pose) {
        let Some(state) = self.state else {
            self.state = Some(PredictionState::seed(sample));
            self.gate.seed(sample);
            return;
        };

        if self.gate.check(sample).should_update() {
            self.state = Some(state.advance(sample, &self.config));
        }
    }

    fn predict(&self, horizon_ms: f64) -> Option<Pose> {
        let tau = self.steps_ahead(horizon_ms);
        self.state.map(|state| state.forecast(tau, &self.config))
    }

    fn reset(&mut self) {
        self.state = None;
        self.gate.reset();
    }

    fn name(&self) -> &str {
        "DESPredictor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn at(x: f64) -> Pose {
        Pose::from_position(Vector3::new(x, 0.0, 0.0))
    }

    #[test]
    fn test_predict_before_update() {
        let predictor = DesPredictor::new(0.5, 50).unwrap();
        assert!(predictor.predict(100.0).is_none());
    }

    #[test]
    fn test_constant_input_predicts_itself() {
        let mut predictor = DesPredictor::new(0.5, 50).unwrap();
        predictor.update(&at(5.0));
        predictor.update(&at(5.0));

        let predicted = predictor.predict(100.0).unwrap();
        assert_eq!(predicted.position, Vector3::new(5.0, 0.0, 0.0));
        assert_relative_eq!(predicted.orientation.angle(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cascade_equations() {
        let mut predictor = DesPredictor::new(0.5, 50).unwrap();
        predictor.update(&at(0.0));
        predictor.update(&at(10.0));

        // S = 0.5*10 + 0.5*0 = 5, S2 = 0.5*5 + 0.5*0 = 2.5
        let state = predictor.state().unwrap();
        assert_relative_eq!(state.trans_s.x, 5.0);
        assert_relative_eq!(state.trans_s2.x, 2.5);

        // tau = 2, f = 0.5*2/0.5 = 2, P = 5*4 - 2.5*3 = 12.5
        assert_relative_eq!(predictor.predict(100.0).unwrap().position.x, 12.5);
        // tau = 1, f = 1, P = 5*3 - 2.5*2 = 10
        assert_relative_eq!(predictor.predict(50.0).unwrap().position.x, 10.0);
    }

    #[test]
    fn test_steps_ahead_clamps_to_one() {
        let predictor = DesPredictor::new(0.5, 50).unwrap();
        assert_eq!(predictor.steps_ahead(0.0), 1);
        assert_eq!(predictor.steps_ahead(10.0), 1);
        assert_eq!(predictor.steps_ahead(-500.0), 1);
        assert_eq!(predictor.steps_ahead(f64::NAN), 1);
        assert_eq!(predictor.steps_ahead(74.0), 1);
        assert_eq!(predictor.steps_ahead(75.0), 2);
        assert_eq!(predictor.steps_ahead(500.0), 10);
    }

    #[test]
    fn test_rotation_forecast_extrapolates_turn() {
        let mut predictor = DesPredictor::new(0.5, 50).unwrap();
        for i in 0..20 {
            let angle = 0.05 * f64::from(i);
            predictor.update(&Pose::new(
                Vector3::zeros(),
                UnitQuaternion::from_axis_angle(&Vector3::y_axis(), angle),
            ));
        }

        let now = predictor.state().unwrap().rot_s.angle();
        let ahead = predictor.predict(200.0).unwrap().orientation;
        assert_relative_eq!(ahead.norm(), 1.0, epsilon = 1e-12);
        assert!(ahead.angle() > now);
    }

    #[test]
    fn test_gated_sample_does_not_move_state() {
        let config = PredictorConfig {
            trans_threshold: 1.0,
            ..PredictorConfig::uniform(0.5, 50)
        };
        let mut predictor = DesPredictor::from_config(&config).unwrap();
        predictor.update(&at(0.0));
        let before = *predictor.state().unwrap();

        predictor.update(&at(100.0));
        assert_eq!(*predictor.state().unwrap(), before);
        assert_eq!(predictor.stuck_count(), 1);
    }

    #[test]
    fn test_reset() {
        let mut predictor = DesPredictor::new(0.5, 50).unwrap();
        predictor.update(&at(3.0));
        predictor.reset();
        assert!(!predictor.is_initialized());
        assert!(predictor.predict(0.0).is_none());
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(DesPredictor::new(0.0, 50).is_err());
        assert!(DesPredictor::new(1.0, 50).is_err());
        assert!(DesPredictor::new(0.5, 0).is_err());
        assert!(DesPredictor::new(0.99, 1).is_ok());
    }
}
