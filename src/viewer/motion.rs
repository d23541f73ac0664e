//! Driving animation: spinning wheels and a ground grid scrolling underneath

use std::f64::consts::TAU;

/// Wheel spin and grid offset produced by the motion animation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionPose {
    /// Rotation of every wheel part around its axle, in [0, 2π) radians
    pub wheel_angle: f32,
    /// Ground grid offset along Z, in (-1, 0]
    pub grid_offset: f32,
}

impl MotionPose {
    /// Pose at `time` seconds of wall-clock time. Both values are one turn
    /// per second, so they are reduced in `f64` before narrowing.
    pub fn at(time: f64) -> Self {
        Self {
            wheel_angle: (time.rem_euclid(1.0) * TAU) as f32,
            grid_offset: ((-time) % 1.0) as f32,
        }
    }
}

/// Moving/stopped flag plus the last computed pose
///
/// The pose is a pure function of elapsed wall-clock time, so stopping and
/// restarting jumps to the current phase instead of resuming where it froze.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionState {
    is_moving: bool,
    pose: MotionPose,
}

impl MotionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_moving(&self) -> bool {
        self.is_moving
    }

    pub fn pose(&self) -> MotionPose {
        self.pose
    }

    pub fn toggle_motion(&mut self) -> bool {
        self.is_moving = !self.is_moving;
        log::info!("Car motion {}", if self.is_moving { "started" } else { "stopped" });
        self.is_moving
    }

    /// Recompute the pose while moving. Returns the pose to write, or `None`
    /// when stopped and the scene must be left as it is.
    pub fn advance(&mut self, time: f64) -> Option<MotionPose> {
        if !self.is_moving {
            return None;
        }
        self.pose = MotionPose::at(time);
        Some(self.pose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopped_motion_freezes_pose() {
        let mut motion = MotionState::new();
        assert_eq!(motion.advance(3.7), None);
        assert_eq!(motion.pose(), MotionPose::default());
    }

    #[test]
    fn moving_pose_is_function_of_time() {
        let mut motion = MotionState::new();
        assert!(motion.toggle_motion());
        let pose = motion.advance(2.25).unwrap();
        assert!((pose.wheel_angle - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
        assert!((pose.grid_offset + 0.25).abs() < 1e-6);
        assert_eq!(motion.advance(2.25), Some(pose));
    }

    #[test]
    fn grid_offset_stays_within_one_unit() {
        for i in 0..200 {
            let offset = MotionPose::at(i as f64 * 0.137).grid_offset;
            assert!(offset <= 0.0 && offset > -1.0);
        }
    }

    #[test]
    fn resume_jumps_to_current_phase() {
        let mut motion = MotionState::new();
        motion.toggle_motion();
        motion.advance(1.0);
        assert!(!motion.toggle_motion());
        assert_eq!(motion.advance(5.5), None);
        assert_eq!(motion.pose(), MotionPose::at(1.0));

        motion.toggle_motion();
        assert_eq!(motion.advance(5.5), Some(MotionPose::at(5.5)));
    }

    #[test]
    fn wheel_steps_stay_even_after_a_day() {
        let frame = 1.0 / 60.0;
        let expected = (TAU * frame) as f32;
        let start = 86_400.0;
        for i in 0..120 {
            let a = MotionPose::at(start + i as f64 * frame).wheel_angle;
            let b = MotionPose::at(start + (i + 1) as f64 * frame).wheel_angle;
            let step = (b - a).rem_euclid(std::f32::consts::TAU);
            assert!((step - expected).abs() < 1e-4, "step {step} at frame {i}");
        }
    }
}
