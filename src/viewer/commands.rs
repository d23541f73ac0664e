//! UI control id → command table
//!
//! Built once at setup. Every button and color input on the page is
//! resolved through here instead of carrying its own handler.

use std::collections::HashMap;

use crate::error::{ViewerError, ViewerResult};
use crate::resources::MaterialSlot;

use super::doors::DoorId;

/// An action the viewer can perform in response to a UI control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ToggleDoor(DoorId),
    ToggleView,
    ToggleMotion,
    /// Needs the color-picker value
    SetColor(MaterialSlot),
}

impl Command {
    pub fn needs_value(self) -> bool {
        matches!(self, Command::SetColor(_))
    }
}

/// A resolved command with its payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    ToggleDoor(DoorId),
    ToggleView,
    ToggleMotion,
    SetColor(MaterialSlot, String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommandTable {
    commands: HashMap<String, Command>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Control ids used by the viewer page
    pub fn standard() -> Self {
        let mut table = Self::new();
        for door in DoorId::ALL {
            table.bind(door.control_id(), Command::ToggleDoor(door));
        }
        table.bind("toggle-camera-view", Command::ToggleView);
        table.bind("toggle-car-move", Command::ToggleMotion);
        table.bind("paint-color", Command::SetColor(MaterialSlot::Paint));
        table.bind("body-color", Command::SetColor(MaterialSlot::Paint));
        table.bind("details-color", Command::SetColor(MaterialSlot::Details));
        table.bind("glass-color", Command::SetColor(MaterialSlot::Glass));
        table
    }

    pub fn bind(&mut self, control: &str, command: Command) {
        self.commands.insert(control.to_string(), command);
    }

    pub fn get(&self, control: &str) -> Option<Command> {
        self.commands.get(control).copied()
    }

    /// Control ids in sorted order
    pub fn controls(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Resolve a control event into an invocation
    pub fn resolve(&self, control: &str, value: Option<&str>) -> ViewerResult<Invocation> {
        let command = self
            .get(control)
            .ok_or_else(|| ViewerError::UnknownControl(control.to_string()))?;

        Ok(match command {
            Command::ToggleDoor(door) => Invocation::ToggleDoor(door),
            Command::ToggleView => Invocation::ToggleView,
            Command::ToggleMotion => Invocation::ToggleMotion,
            Command::SetColor(slot) => {
                let value = value.ok_or_else(|| ViewerError::MissingValue(control.to_string()))?;
                Invocation::SetColor(slot, value.to_string())
            }
        })
    }
}
