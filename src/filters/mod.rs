//! Pose filtering algorithms for stabilizing and forward-predicting tracker streams.
//!
//! Both filters are double exponential smoothing (DES) variants and share the
//! same outlier gate, so a glitching tracker cannot drag the filter state away.

/// Outlier gating with bounded recovery
pub mod gate;

/// Double exponential smoother producing a filtered pose every tick
pub mod des_smoother;

/// Double exponential predictor extrapolating poses into the future
pub mod des_predictor;

use crate::config::{PredictorConfig, SmootherConfig};
use crate::pose::Pose;
use crate::{Error, Result};

/// Trait for filters that return a stabilized pose for every raw sample
pub trait PoseSmoother: Send {
    /// Feed a raw sample and get the pose to use for this tick
    fn filter(&mut self, sample: &Pose) -> Pose;

    /// Forget all history; the next sample is treated as the first
    fn reset_history(&mut self);

    /// Get filter name
    fn name(&self) -> &str;
}

/// Trait for filters that extrapolate poses ahead of the latest sample
pub trait PosePredictor: Send {
    /// Feed a raw sample into the trend estimate
    fn update(&mut self, sample: &Pose);

    /// Pose expected `horizon_ms` milliseconds after the latest sample, if any sample was seen
    fn predict(&self, horizon_ms: f64) -> Option<Pose>;

    /// Forget all history
    fn reset(&mut self);

    /// Get predictor name
    fn name(&self) -> &str;
}

/// No-op smoother that passes samples through unchanged
pub struct NoSmoother;

impl PoseSmoother for NoSmoother {
    fn filter(&mut self, sample: &Pose) -> Pose {
        *sample
    }

    fn reset_history(&mut self) {}

    fn name(&self) -> &str {
        "NoSmoother"
    }
}

fn parse_params(spec: &str, params: &[&str]) -> Result<Vec<f64>> {
    params
        .iter()
        .map(|p| {
            p.trim()
                .parse::<f64>()
                .map_err(|_| Error::FilterError(format!("Invalid parameter '{p}' in filter spec '{spec}'")))
        })
        .collect()
}

/// Create a smoother from a spec string.
///
/// Accepted forms: `none`, `des`, `des:<alpha>:<gamma>` and
/// `des:<trans_alpha>:<trans_gamma>:<rot_alpha>:<rot_gamma>`.
///
/// # Errors
///
/// Returns an error for unknown names, malformed numbers or out of range coefficients.
pub fn create_smoother(spec: &str) -> Result<Box<dyn PoseSmoother>> {
    let lowered = spec.trim().to_lowercase();
    let mut parts = lowered.split(':');
    let name = parts.next().unwrap_or_default();
    let params = parse_params(spec, &parts.collect::<Vec<_>>())?;

    match (name, params.as_slice()) {
        ("none" | "nosmoother", []) => Ok(Box::new(NoSmoother)),
        ("des", []) => Ok(Box::new(des_smoother::DesSmoother::from_config(&SmootherConfig::default())?)),
        ("des", &[alpha, gamma]) => Ok(Box::new(des_smoother::DesSmoother::new(alpha, gamma)?)),
        ("des", &[trans_alpha, trans_gamma, rot_alpha, rot_gamma]) => {
            let config = SmootherConfig {
                trans_alpha,
                trans_gamma,
                rot_alpha,
                rot_gamma,
                ..SmootherConfig::default()
            };
            Ok(Box::new(des_smoother::DesSmoother::from_config(&config)?))
        }
        _ => Err(Error::FilterError(format!("Unknown smoother type: {spec}"))),
    }
}

/// Create a predictor from a spec string.
///
/// Accepted forms: `des`, `des:<alpha>:<delta_ms>` and `des:<trans_alpha>:<rot_alpha>:<delta_ms>`.
///
/// # Errors
///
/// Returns an error for unknown names, malformed numbers or out of range coefficients.
pub fn create_predictor(spec: &str) -> Result<Box<dyn PosePredictor>> {
    let lowered = spec.trim().to_lowercase();
    let mut parts = lowered.split(':');
    let name = parts.next().unwrap_or_default();
    let params = parse_params(spec, &parts.collect::<Vec<_>>())?;

    let config = match (name, params.as_slice()) {
        ("des", []) => PredictorConfig::default(),
        ("des", &[alpha, delta]) => PredictorConfig::uniform(alpha, parse_delta(spec, delta)?),
        ("des", &[trans_alpha, rot_alpha, delta]) => PredictorConfig {
            trans_alpha,
            rot_alpha,
            delta_ms: parse_delta(spec, delta)?,
            ..PredictorConfig::default()
        },
        _ => return Err(Error::FilterError(format!("Unknown predictor type: {spec}"))),
    };

    Ok(Box::new(des_predictor::DesPredictor::from_config(&config)?))
}

fn parse_delta(spec: &str, delta: f64) -> Result<u32> {
    if delta.fract() != 0.0 || delta < 1.0 || delta > f64::from(u32::MAX) {
        return Err(Error::FilterError(format!(
            "Delta must be a positive whole number of milliseconds in '{spec}'"
        )));
    }
    Ok(delta as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{UnitQuaternion, Vector3};

    #[test]
    fn test_no_smoother() {
        let mut smoother = NoSmoother;
        let sample = Pose::new(Vector3::new(1.0, 2.0, 3.0), UnitQuaternion::from_euler_angles(0.1, 0.2, 0.3));
        assert_eq!(smoother.filter(&sample), sample);
    }

    #[test]
    fn test_create_smoother() {
        assert!(create_smoother("none").is_ok());
        assert!(create_smoother("des").is_ok());
        assert!(create_smoother("DES:0.5:0.5").is_ok());
        assert!(create_smoother("des:0.5:0.5:0.3:0.2").is_ok());
        assert_eq!(create_smoother("des:0.5:0.5").unwrap().name(), "DESSmoother");

        assert!(create_smoother("unknown").is_err());
        assert!(create_smoother("des:0.5").is_err());
        assert!(create_smoother("des:0:0.5").is_err());
        assert!(create_smoother("des:abc:0.5").is_err());
    }

    #[test]
    fn test_create_predictor() {
        assert!(create_predictor("des").is_ok());
        assert!(create_predictor("des:0.5:50").is_ok());
        assert!(create_predictor("des:0.5:0.4:20").is_ok());

        assert!(create_predictor("des:1.0:50").is_err());
        assert!(create_predictor("des:0.5:0").is_err());
        assert!(create_predictor("des:0.5:12.5").is_err());
        assert!(create_predictor("kalman").is_err());
    }
}
