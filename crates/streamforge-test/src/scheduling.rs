//! Meeting scheduling fixtures.
//!
//! A meeting is assigned once it has a room; a room can hold `capacity`
//! attendees.

use streamforge_core::{DomainModel, PlanningId};

/// A room, identified by a letter.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Room {
    pub id: char,
    pub capacity: u32,
}

impl Room {
    pub fn new(id: char, capacity: u32) -> Self {
        Self { id, capacity }
    }
}

impl PlanningId for Room {
    type Id = char;

    fn planning_id(&self) -> char {
        self.id
    }
}

/// A meeting entity whose planning variable is its room.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Meeting {
    pub id: u32,
    pub room: Option<char>,
    pub attendees: u32,
}

impl Meeting {
    pub fn new(id: u32, room: Option<char>, attendees: u32) -> Self {
        Self {
            id,
            room,
            attendees,
        }
    }

    /// The same meeting moved to another room.
    pub fn with_room(&self, room: Option<char>) -> Self {
        Self {
            room,
            ..self.clone()
        }
    }
}

impl PlanningId for Meeting {
    type Id = u32;

    fn planning_id(&self) -> u32 {
        self.id
    }
}

/// Rooms as problem facts, meetings as entities assigned once they have a room.
pub fn scheduling_model() -> DomainModel {
    DomainModel::new()
        .with_problem_fact::<Room>()
        .with_planning_entity(|m: &Meeting| m.room.is_some())
}
