//! FBX time units and frame conversion

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Number of KTime units in one second.
pub const KTIME_PER_SECOND: i64 = 46_186_158_000;

/// Frame-rate mode stamped into the global settings.
///
/// Only 30 fps is produced for now; the conversion below routes through
/// [`TimeMode::fps`] so additional rates stay a one-enum change.
/// The discriminant matches the FBX `EMode` member.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i32)]
pub enum TimeMode {
    /// 30 frames per second.
    Frames30 = 6,
}

impl TimeMode {
    /// Frames per second for this mode.
    pub fn fps(&self) -> f64 {
        match self {
            TimeMode::Frames30 => 30.0,
        }
    }
}

impl Default for TimeMode {
    fn default() -> Self {
        TimeMode::Frames30
    }
}

/// A point in time expressed in KTime units.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FbxTime(pub i64);

impl FbxTime {
    /// Converts a frame number to KTime under the given mode.
    ///
    /// Whole frames convert exactly; fractional frames round to the
    /// nearest KTime unit (the `SetFramePrecise` path).
    pub fn from_frame(frame: f64, mode: TimeMode) -> Self {
        let units = frame / mode.fps() * KTIME_PER_SECOND as f64;
        FbxTime(units.round() as i64)
    }

    /// Converts back to a frame number under the given mode.
    pub fn to_frame(&self, mode: TimeMode) -> f64 {
        self.0 as f64 / KTIME_PER_SECOND as f64 * mode.fps()
    }

    /// Seconds represented by this time.
    pub fn seconds(&self) -> f64 {
        self.0 as f64 / KTIME_PER_SECOND as f64
    }
}

/// Iterates `start..=end` in increments of `step`.
///
/// Values are derived from the iteration index so fractional steps do not
/// accumulate drift. The end point is included when the step lands on it
/// within a half-ulp-ish tolerance, which is what fractional bake ranges
/// rely on.
pub fn inclusive_range(start: f64, end: f64, step: f64) -> impl Iterator<Item = f64> {
    let count = if step > 0.0 && end >= start {
        ((end - start) / step + 1e-9).floor() as usize + 1
    } else {
        0
    };

    (0..count).map(move |i| start + i as f64 * step)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_frames_are_exact() {
        let t = FbxTime::from_frame(10.0, TimeMode::Frames30);
        assert_eq!(t.0, 10 * KTIME_PER_SECOND / 30);
        assert!((t.to_frame(TimeMode::Frames30) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn half_frame_is_exact_at_30fps() {
        let t = FbxTime::from_frame(0.5, TimeMode::Frames30);
        assert_eq!(t.0, KTIME_PER_SECOND / 60);
    }

    #[test]
    fn fractional_range_hits_both_ends() {
        let frames: Vec<f64> = inclusive_range(0.0, 10.0, 0.5).collect();
        assert_eq!(frames.len(), 21);
        assert_eq!(frames[0], 0.0);
        assert_eq!(frames[20], 10.0);
    }

    #[test]
    fn degenerate_range_is_empty() {
        assert_eq!(inclusive_range(5.0, 0.0, 1.0).count(), 0);
    }

    #[test]
    fn single_frame_range() {
        let frames: Vec<f64> = inclusive_range(3.0, 3.0, 1.0).collect();
        assert_eq!(frames, vec![3.0]);
    }
}
