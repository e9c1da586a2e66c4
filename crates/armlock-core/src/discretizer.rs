use glam::Quat;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

/// Number of equal-width slices each Euler angle's range is divided into.
/// Roll and yaw cover [-π, π), so one bucket spans 20 degrees.
pub const ANGLE_BUCKETS: i32 = 18;

/// Bucketed roll/pitch/yaw derived from the latest orientation sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiscretizedOrientation {
    pub roll: i32,
    pub pitch: i32,
    pub yaw: i32,
}

/// Folds streaming orientation quaternions into coarse integer angle buckets.
///
/// Only the most recent value is kept; callers that need history (the
/// gesture latch keeps its start bucket) record it themselves. The mapping
/// is a plain linear scale with no correction at bucket boundaries, so a
/// roll angle crossing the -π/π seam jumps between the extreme buckets.
#[derive(Debug, Default)]
pub struct OrientationDiscretizer {
    current: DiscretizedOrientation,
}

impl OrientationDiscretizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decompose a unit quaternion into aerospace Euler angles and bucket
    /// each one. Total over unit quaternions: the arcsine argument for
    /// pitch is clamped because accumulated float error can push it
    /// slightly past ±1.
    pub fn update(&mut self, quat: Quat) -> DiscretizedOrientation {
        let roll = (2.0 * (quat.w * quat.x + quat.y * quat.z))
            .atan2(1.0 - 2.0 * (quat.x * quat.x + quat.y * quat.y));
        let pitch = (2.0 * (quat.w * quat.y - quat.z * quat.x))
            .clamp(-1.0, 1.0)
            .asin();
        let yaw = (2.0 * (quat.w * quat.z + quat.x * quat.y))
            .atan2(1.0 - 2.0 * (quat.y * quat.y + quat.z * quat.z));

        self.current = DiscretizedOrientation {
            roll: ((roll + PI) / TAU * ANGLE_BUCKETS as f32) as i32,
            pitch: ((pitch + FRAC_PI_2) / PI * ANGLE_BUCKETS as f32) as i32,
            yaw: ((yaw + PI) / TAU * ANGLE_BUCKETS as f32) as i32,
        };
        self.current
    }

    /// Latest bucketed orientation.
    pub fn current(&self) -> DiscretizedOrientation {
        self.current
    }

    /// Clear the buckets back to zero. Called when the band unpairs.
    pub fn reset(&mut self) {
        self.current = DiscretizedOrientation::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn identity_maps_to_mid_range() {
        let mut disc = OrientationDiscretizer::new();
        let out = disc.update(Quat::IDENTITY);
        assert_eq!(out.roll, 9);
        assert_eq!(out.pitch, 9);
        assert_eq!(out.yaw, 9);
    }

    #[test]
    fn quarter_turn_roll_buckets() {
        let mut disc = OrientationDiscretizer::new();

        // +π/2 about the forward axis: (π/2 + π) / 2π * 18 = 13.5 → 13.
        let out = disc.update(Quat::from_rotation_x(FRAC_PI_2));
        assert_eq!(out.roll, 13);

        // -π/2: (π/2) / 2π * 18 = 4.5 → 4.
        let out = disc.update(Quat::from_rotation_x(-FRAC_PI_2));
        assert_eq!(out.roll, 4);
    }

    #[test]
    fn yaw_rotation_leaves_roll_centered() {
        let mut disc = OrientationDiscretizer::new();
        let out = disc.update(Quat::from_rotation_z(FRAC_PI_2));
        assert_eq!(out.yaw, 13);
        assert_eq!(out.roll, 9);
        assert_eq!(out.pitch, 9);
    }

    #[test]
    fn pitch_rotation_buckets() {
        let mut disc = OrientationDiscretizer::new();
        // asin(sin 0.5) = 0.5 rad: (0.5 + π/2) / π * 18 = 11.86 → 11.
        let out = disc.update(Quat::from_rotation_y(0.5));
        assert_eq!(out.pitch, 11);
    }

    #[test]
    fn buckets_stay_in_range_across_rotations() {
        let mut disc = OrientationDiscretizer::new();
        let mut angle = -3.1_f32;
        while angle <= 3.1 {
            for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
                let out = disc.update(Quat::from_axis_angle(axis, angle));
                // atan2 lands on exactly +π for some degenerate axis/angle
                // pairs, putting roll/yaw on the seam bucket one past the
                // nominal top. That seam is deliberately not corrected.
                assert!((0..=ANGLE_BUCKETS).contains(&out.roll), "roll {:?}", out);
                assert!((0..=ANGLE_BUCKETS).contains(&out.yaw), "yaw {:?}", out);
                assert!((0..=ANGLE_BUCKETS).contains(&out.pitch), "pitch {:?}", out);
            }
            angle += 0.1;
        }
    }

    #[test]
    fn drifted_pitch_argument_is_clamped() {
        let mut disc = OrientationDiscretizer::new();
        // Deliberately non-unit: 2(wy - zx) = 1.28, past the asin domain.
        let out = disc.update(Quat::from_xyzw(0.0, 0.8, 0.0, 0.8));
        assert!((0..=ANGLE_BUCKETS).contains(&out.pitch));
    }

    #[test]
    fn reset_clears_buckets() {
        let mut disc = OrientationDiscretizer::new();
        disc.update(Quat::from_rotation_x(1.0));
        disc.reset();
        assert_eq!(disc.current(), DiscretizedOrientation::default());
    }
}
