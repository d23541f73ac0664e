//! Click-to-toggle door picking

use std::collections::HashMap;

use super::doors::{DoorId, DoorTracker};

/// Rendering-object names that act as door handles
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PickTable {
    targets: HashMap<String, DoorId>,
}

impl PickTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles present in the shipped Volvo S90 model
    pub fn standard() -> Self {
        Self::new().with_target("Plane023", DoorId::FrontLeft)
    }

    pub fn with_target(mut self, object: &str, door: DoorId) -> Self {
        self.insert(object, door);
        self
    }

    pub fn insert(&mut self, object: &str, door: DoorId) {
        self.targets.insert(object.to_string(), door);
    }

    pub fn lookup(&self, object: &str) -> Option<DoorId> {
        self.targets.get(object).copied()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Maps the nearest clicked object to a door toggle
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PickDispatcher {
    table: PickTable,
}

impl PickDispatcher {
    pub fn new(table: PickTable) -> Self {
        Self { table }
    }

    /// Toggle the door bound to `object`, if any. Most clickable objects are
    /// not door handles, so a miss is a silent no-op.
    pub fn dispatch(&self, object: &str, doors: &mut DoorTracker) -> Option<DoorId> {
        let door = self.table.lookup(object)?;
        doors.toggle_door(door);
        Some(door)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_toggles_its_door_once() {
        let dispatcher = PickDispatcher::new(PickTable::standard());
        let mut doors = DoorTracker::default();

        assert_eq!(dispatcher.dispatch("Plane023", &mut doors), Some(DoorId::FrontLeft));
        assert!(doors.is_open(DoorId::FrontLeft));
        for id in [DoorId::FrontRight, DoorId::RearLeft, DoorId::RearRight] {
            assert!(!doors.is_open(id));
        }
    }

    #[test]
    fn unmapped_object_changes_nothing() {
        let dispatcher = PickDispatcher::new(PickTable::standard());
        let mut doors = DoorTracker::default();
        let before = doors.clone();

        assert_eq!(dispatcher.dispatch("Chassis_Main", &mut doors), None);
        assert_eq!(doors, before);
    }

    #[test]
    fn table_accepts_extra_handles() {
        let table = PickTable::standard().with_target("Handle_RR", DoorId::RearRight);
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("Handle_RR"), Some(DoorId::RearRight));
    }
}
