//! Form state: ordered room list and scalar fields of one session

use shared::{FormFieldsPatch, FormSnapshot, RoomEntry, RoomPatch};

use crate::error::{DesignerError, DesignerResult};

/// Mutable form state. Not internally synchronized; a session wraps it in a mutex.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    fields: FormSnapshot,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a default room, returning its index
    pub fn add_room(&mut self) -> usize {
        self.fields.rooms.push(RoomEntry::default());
        self.fields.rooms.len() - 1
    }

    /// Apply only the fields named in `patch` to the room at `index`
    pub fn update_room(&mut self, index: usize, patch: RoomPatch) -> DesignerResult<&RoomEntry> {
        let len = self.fields.rooms.len();
        if let Some(Some(size)) = patch.size {
            validate_size(size)?;
        }

        let room = self
            .fields
            .rooms
            .get_mut(index)
            .ok_or(DesignerError::OutOfRange { index, len })?;

        if let Some(name) = patch.name {
            room.name = name;
        }
        if let Some(size) = patch.size {
            // -0.0 and 0.0 compare equal but serialize differently
            room.size = size.map(|s| if s == 0.0 { 0.0 } else { s });
        }
        if let Some(notes) = patch.notes {
            room.notes = notes;
        }

        Ok(room)
    }

    /// Remove the room at `index`, shifting later rooms left
    pub fn remove_room(&mut self, index: usize) -> DesignerResult<RoomEntry> {
        let len = self.fields.rooms.len();
        if index >= len {
            return Err(DesignerError::OutOfRange { index, len });
        }
        Ok(self.fields.rooms.remove(index))
    }

    pub fn rooms(&self) -> &[RoomEntry] {
        &self.fields.rooms
    }

    pub fn update_fields(&mut self, patch: FormFieldsPatch) {
        if let Some(scenario) = patch.scenario {
            self.fields.scenario = scenario;
        }
        if let Some(style) = patch.style {
            self.fields.style = style;
        }
        if let Some(budget) = patch.budget {
            self.fields.budget = budget;
        }
        if let Some(priority) = patch.priority {
            self.fields.priority = priority;
        }
        if let Some(square_footage) = patch.square_footage {
            self.fields.square_footage = square_footage;
        }
        if let Some(amenities) = patch.amenities {
            self.fields.amenities = amenities;
        }
        if let Some(requirements) = patch.requirements {
            self.fields.requirements = requirements;
        }
    }

    /// Drop all rooms and restore default field values
    pub fn reset(&mut self) {
        self.fields = FormSnapshot::default();
    }

    /// Immutable copy of the current form
    pub fn snapshot(&self) -> FormSnapshot {
        self.fields.clone()
    }
}

fn validate_size(size: f64) -> DesignerResult<()> {
    if !size.is_finite() || size < 0.0 {
        return Err(DesignerError::InvalidRoom {
            reason: format!("size must be a finite, non-negative number, got {size}"),
        });
    }
    Ok(())
}
