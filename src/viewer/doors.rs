//! Door open/close state and hinge animation

use std::f32::consts::FRAC_PI_3;

/// Hinge angle of a fully open door, in radians
pub const OPEN_ANGLE: f32 = FRAC_PI_3;

/// Fraction of the remaining angle covered each frame
pub const DAMPING: f32 = 0.1;

/// The four doors of the car
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoorId {
    FrontLeft,
    FrontRight,
    RearLeft,
    RearRight,
}

impl DoorId {
    pub const ALL: [DoorId; 4] = [
        DoorId::FrontLeft,
        DoorId::FrontRight,
        DoorId::RearLeft,
        DoorId::RearRight,
    ];

    pub fn code(self) -> &'static str {
        match self {
            DoorId::FrontLeft => "FL",
            DoorId::FrontRight => "FR",
            DoorId::RearLeft => "RL",
            DoorId::RearRight => "RR",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.code().eq_ignore_ascii_case(code))
    }

    pub fn display_name(self) -> &'static str {
        match self {
            DoorId::FrontLeft => "Front Left Door",
            DoorId::FrontRight => "Front Right Door",
            DoorId::RearLeft => "Rear Left Door",
            DoorId::RearRight => "Rear Right Door",
        }
    }

    /// Name of the hinge node the door geometry hangs from
    pub fn hinge_node(self) -> &'static str {
        match self {
            DoorId::FrontLeft => "DoorFLAxes",
            DoorId::FrontRight => "DoorFRAxes",
            DoorId::RearLeft => "DoorRLAxes",
            DoorId::RearRight => "DoorRRAxes",
        }
    }

    /// Id of the UI button toggling this door
    pub fn control_id(self) -> &'static str {
        match self {
            DoorId::FrontLeft => "toggle-door-fl",
            DoorId::FrontRight => "toggle-door-fr",
            DoorId::RearLeft => "toggle-door-rl",
            DoorId::RearRight => "toggle-door-rr",
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    /// Left doors swing to negative angles, right doors to positive
    pub fn signed_open_angle(self, open_angle: f32) -> f32 {
        match self {
            DoorId::FrontLeft | DoorId::RearLeft => -open_angle,
            DoorId::FrontRight | DoorId::RearRight => open_angle,
        }
    }
}

/// State of a single door
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DoorState {
    pub is_open: bool,
    pub current_angle: f32,
    pub target_angle: f32,
}

/// Open/closed flags and hinge angles for all four doors
#[derive(Debug, Clone, PartialEq)]
pub struct DoorTracker {
    doors: [DoorState; 4],
    open_angle: f32,
    damping: f32,
}

impl Default for DoorTracker {
    fn default() -> Self {
        Self::new(OPEN_ANGLE, DAMPING)
    }
}

impl DoorTracker {
    /// `damping` must lie in (0, 1); the config layer validates it
    pub fn new(open_angle: f32, damping: f32) -> Self {
        Self {
            doors: [DoorState::default(); 4],
            open_angle,
            damping,
        }
    }

    pub fn state(&self, id: DoorId) -> &DoorState {
        &self.doors[id.index()]
    }

    pub fn is_open(&self, id: DoorId) -> bool {
        self.state(id).is_open
    }

    /// Flip a door and retarget its hinge
    pub fn toggle_door(&mut self, id: DoorId) {
        let open_angle = self.open_angle;
        let door = &mut self.doors[id.index()];
        door.is_open = !door.is_open;
        door.target_angle = if door.is_open {
            id.signed_open_angle(open_angle)
        } else {
            0.0
        };
        log::debug!(
            "{} {}",
            id.display_name(),
            if door.is_open { "opening" } else { "closing" }
        );
    }

    /// Move every hinge a fixed fraction of the way toward its target.
    /// Called once per rendered frame.
    pub fn advance(&mut self) {
        for door in &mut self.doors {
            door.current_angle += (door.target_angle - door.current_angle) * self.damping;
        }
    }

    /// Text for the door's toggle button
    pub fn button_label(&self, id: DoorId) -> String {
        let verb = if self.is_open(id) { "Close" } else { "Open" };
        format!("{} {}", verb, id.display_name())
    }

    pub fn iter(&self) -> impl Iterator<Item = (DoorId, &DoorState)> {
        DoorId::ALL.into_iter().map(move |id| (id, self.state(id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_parity_decides_state() {
        for id in DoorId::ALL {
            let mut doors = DoorTracker::default();
            for n in 1..=6 {
                doors.toggle_door(id);
                let state = doors.state(id);
                if n % 2 == 1 {
                    assert!(state.is_open);
                    assert_eq!(state.target_angle, id.signed_open_angle(OPEN_ANGLE));
                } else {
                    assert!(!state.is_open);
                    assert_eq!(state.target_angle, 0.0);
                }
            }
        }
    }

    #[test]
    fn left_doors_open_negative() {
        assert!(DoorId::FrontLeft.signed_open_angle(OPEN_ANGLE) < 0.0);
        assert!(DoorId::RearLeft.signed_open_angle(OPEN_ANGLE) < 0.0);
        assert!(DoorId::FrontRight.signed_open_angle(OPEN_ANGLE) > 0.0);
        assert!(DoorId::RearRight.signed_open_angle(OPEN_ANGLE) > 0.0);
    }

    #[test]
    fn advance_is_monotone_without_overshoot() {
        let mut doors = DoorTracker::default();
        doors.toggle_door(DoorId::FrontRight);
        let target = OPEN_ANGLE;

        let mut previous = 0.0;
        for _ in 0..400 {
            doors.advance();
            let angle = doors.state(DoorId::FrontRight).current_angle;
            assert!(angle >= previous);
            assert!(angle <= target);
            previous = angle;
        }
        assert!((target - previous).abs() < 1e-5);
    }

    #[test]
    fn advance_converges_geometrically() {
        let mut doors = DoorTracker::default();
        doors.toggle_door(DoorId::RearLeft);
        for step in 1..=30 {
            doors.advance();
            let remaining = (doors.state(DoorId::RearLeft).current_angle + OPEN_ANGLE).abs();
            let expected = OPEN_ANGLE * (1.0 - DAMPING).powi(step);
            assert!((remaining - expected).abs() < 1e-5, "step {step}");
        }
    }

    #[test]
    fn other_doors_are_untouched() {
        let mut doors = DoorTracker::default();
        doors.toggle_door(DoorId::FrontLeft);
        doors.advance();
        for id in [DoorId::FrontRight, DoorId::RearLeft, DoorId::RearRight] {
            assert_eq!(*doors.state(id), DoorState::default());
        }
    }

    #[test]
    fn button_label_follows_state() {
        let mut doors = DoorTracker::default();
        assert_eq!(doors.button_label(DoorId::RearRight), "Open Rear Right Door");
        doors.toggle_door(DoorId::RearRight);
        assert_eq!(doors.button_label(DoorId::RearRight), "Close Rear Right Door");
    }

    #[test]
    fn codes_round_trip() {
        for id in DoorId::ALL {
            assert_eq!(DoorId::from_code(id.code()), Some(id));
        }
        assert_eq!(DoorId::from_code("fl"), Some(DoorId::FrontLeft));
        assert_eq!(DoorId::from_code("XX"), None);
    }
}
