//! Outlier gating shared by the smoother and the predictor.
//!
//! A sample that jumps further from the previous raw sample than a configured
//! threshold is kept out of the filter state. After more than
//! [`RESTART_THRESHOLD`] consecutive rejections the gate adopts the current sample
//! as its new reference, so a tracker that legitimately teleported is picked up again.

use crate::constants::RESTART_THRESHOLD;
use crate::pose::Pose;
use log::{debug, trace};

/// Outcome of presenting a sample to the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// The sample may update the filter state
    Accepted,
    /// The sample is an outlier and must be ignored
    Rejected,
    /// The sample was an outlier but became the new reference after too many rejections.
    /// It still must not be blended into the filter state.
    ForceAccepted,
}

impl GateDecision {
    /// Whether the filter should blend the sample into its state
    #[must_use]
    pub const fn should_update(self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Distance/angle gate with a bounded consecutive-rejection counter
#[derive(Debug, Clone)]
pub struct OutlierGate {
    trans_threshold: f64,
    rot_threshold: f64,
    reference: Pose,
    stuck_count: u32,
}

impl OutlierGate {
    /// Create a gate. A threshold `<= 0` disables the check for that axis family.
    #[must_use]
    pub fn new(trans_threshold: f64, rot_threshold: f64) -> Self {
        Self {
            trans_threshold,
            rot_threshold,
            reference: Pose::identity(),
            stuck_count: 0,
        }
    }

    /// Use `sample` as the previous raw sample without evaluating it
    pub fn seed(&mut self, sample: &Pose) {
        self.reference = *sample;
        self.stuck_count = 0;
    }

    /// Clear the reference and the counter
    pub fn reset(&mut self) {
        self.seed(&Pose::identity());
    }

    /// Previous raw sample that incoming samples are compared against
    #[must_use]
    pub const fn reference(&self) -> &Pose {
        &self.reference
    }

    /// Number of consecutive rejections since the last accepted sample
    #[must_use]
    pub const fn stuck_count(&self) -> u32 {
        self.stuck_count
    }

    #[must_use]
    pub const fn trans_threshold(&self) -> f64 {
        self.trans_threshold
    }

    #[must_use]
    pub const fn rot_threshold(&self) -> f64 {
        self.rot_threshold
    }

    /// Whether `sample` stays within every enabled threshold of the reference
    #[must_use]
    pub fn is_within_limits(&self, sample: &Pose) -> bool {
        if self.trans_threshold > 0.0 && sample.translation_distance(&self.reference) > self.trans_threshold {
            return false;
        }
        if self.rot_threshold > 0.0 && sample.rotation_distance(&self.reference) > self.rot_threshold {
            return false;
        }
        true
    }

    /// Evaluate `sample`, advancing the reference and the rejection counter
    pub fn check(&mut self, sample: &Pose) -> GateDecision {
        if self.is_within_limits(sample) {
            self.seed(sample);
            return GateDecision::Accepted;
        }

        self.stuck_count += 1;
        if self.stuck_count > RESTART_THRESHOLD {
            debug!(
                "Re-anchoring gate after {} consecutive rejections at ({:.3}, {:.3}, {:.3})",
                self.stuck_count, sample.position.x, sample.position.y, sample.position.z
            );
            self.seed(sample);
            return GateDecision::ForceAccepted;
        }

        trace!("Rejected outlier sample ({} in a row)", self.stuck_count);
        GateDecision::Rejected
    }
}
