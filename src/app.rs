//! Line-oriented front-end feeding recorded tracker samples through a [`PoseTracker`].
//!
//! Input has one frame per line: `x y z qw qx qy qz`, separated by whitespace
//! or commas. A blank line, `-` or `lost` marks a frame without an observation,
//! and lines starting with `#` are ignored.

use crate::config::{Config, StreamConfig};
use crate::pose::Pose;
use crate::tracker::{PoseTracker, TrackedPose};
use crate::{Error, Result};
use log::{debug, info};
use nalgebra::{Quaternion, Vector3};
use std::io::{BufRead, Write};

/// Parsed content of one input line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Frame {
    Observed(Pose),
    Missing,
}

/// Parse one input line; `Ok(None)` for comments.
///
/// # Errors
///
/// Returns an error if the line is neither a marker nor seven finite numbers forming a valid pose
pub fn parse_frame(line: &str) -> Result<Option<Frame>> {
    let trimmed = line.trim();
    if trimmed.starts_with('#') {
        return Ok(None);
    }
    if trimmed.is_empty() || trimmed == "-" || trimmed.eq_ignore_ascii_case("lost") {
        return Ok(Some(Frame::Missing));
    }

    let values = trimmed
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| Error::InvalidInput(format!("Invalid number '{s}'")))
        })
        .collect::<Result<Vec<f64>>>()?;

    let &[x, y, z, w, i, j, k] = values.as_slice() else {
        return Err(Error::InvalidInput(format!(
            "Expected 7 values (x y z qw qx qy qz), got {}",
            values.len()
        )));
    };

    let pose = Pose::from_raw(Vector3::new(x, y, z), Quaternion::new(w, i, j, k))?;
    Ok(Some(Frame::Observed(pose)))
}

/// Format a frame result as `status x y z qw qx qy qz`, or just the status without a pose
#[must_use]
pub fn format_frame(frame: &TrackedPose, precision: usize) -> String {
    let status = frame.status.as_str();
    match frame.pose {
        Some(pose) => {
            let p = pose.position;
            let q = pose.orientation.quaternion();
            format!(
                "{status} {:.prec$} {:.prec$} {:.prec$} {:.prec$} {:.prec$} {:.prec$} {:.prec$}",
                p.x,
                p.y,
                p.z,
                q.w,
                q.i,
                q.j,
                q.k,
                prec = precision
            )
        }
        None => status.to_string(),
    }
}

/// Stream processing application
pub struct PoseStreamApp {
    tracker: PoseTracker,
    stream: StreamConfig,
}

impl PoseStreamApp {
    /// Create the application from a validated configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_tracker(config.create_tracker()?, config.stream.clone()))
    }

    /// Create the application around an already built tracker
    #[must_use]
    pub const fn with_tracker(tracker: PoseTracker, stream: StreamConfig) -> Self {
        Self { tracker, stream }
    }

    /// Process every line of `input`, writing one output line per frame.
    ///
    /// Returns the number of frames processed.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure or on a malformed line (reported with its line number)
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<usize> {
        info!("Processing pose stream at {:.3} ms per frame", self.stream.frame_interval_ms);

        let mut frames = 0;
        for (index, line) in input.lines().enumerate() {
            let line = line?;
            let frame = parse_frame(&line).map_err(|e| match e {
                Error::InvalidInput(msg) => Error::InvalidInput(format!("line {}: {msg}", index + 1)),
                other => other,
            })?;

            let observation = match frame {
                None => continue,
                Some(Frame::Observed(pose)) => Some(pose),
                Some(Frame::Missing) => None,
            };

            let result = self.tracker.update(observation.as_ref(), self.stream.frame_interval_ms);
            writeln!(output, "{}", format_frame(&result, self.stream.precision))?;
            frames += 1;
        }

        output.flush()?;
        debug!("Processed {} frames", frames);
        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::TrackingStatus;

    #[test]
    fn test_parse_frame_markers() {
        assert_eq!(parse_frame("# comment").unwrap(), None);
        assert_eq!(parse_frame("").unwrap(), Some(Frame::Missing));
        assert_eq!(parse_frame(" - ").unwrap(), Some(Frame::Missing));
        assert_eq!(parse_frame("LOST").unwrap(), Some(Frame::Missing));
    }

    #[test]
    fn test_parse_frame_values() {
        let Some(Frame::Observed(pose)) = parse_frame("1, 2, 3, 1, 0, 0, 0").unwrap() else {
            panic!("expected an observation");
        };
        assert_eq!(pose.position, Vector3::new(1.0, 2.0, 3.0));

        let Some(Frame::Observed(pose)) = parse_frame("0 0 0  2 0 0 0").unwrap() else {
            panic!("expected an observation");
        };
        assert_eq!(pose.orientation.quaternion().w, 1.0);
    }

    #[test]
    fn test_parse_frame_errors() {
        assert!(parse_frame("1 2 3").is_err());
        assert!(parse_frame("1 2 3 1 0 0 x").is_err());
        assert!(parse_frame("1 2 3 0 0 0 0").is_err());
        assert!(parse_frame("1 2 inf 1 0 0 0").is_err());
    }

    #[test]
    fn test_format_frame() {
        let frame = TrackedPose {
            status: TrackingStatus::Tracked,
            pose: Some(Pose::from_position(Vector3::new(1.0, -2.0, 0.5))),
        };
        assert_eq!(format_frame(&frame, 2), "tracked 1.00 -2.00 0.50 1.00 0.00 0.00 0.00");

        let lost = TrackedPose {
            status: TrackingStatus::Lost,
            pose: None,
        };
        assert_eq!(format_frame(&lost, 2), "lost");
    }
}
