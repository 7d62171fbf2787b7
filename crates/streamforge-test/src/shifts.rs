//! Shift rostering fixtures.

use streamforge_core::{DomainModel, PlanningId};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Employee {
    pub id: u32,
    pub name: String,
    pub skills: Vec<String>,
}

impl Employee {
    pub fn new(id: u32, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            skills: Vec::new(),
        }
    }

    pub fn with_skill(mut self, skill: &str) -> Self {
        self.skills.push(skill.to_string());
        self
    }
}

impl PlanningId for Employee {
    type Id = u32;

    fn planning_id(&self) -> u32 {
        self.id
    }
}

/// A shift from `start` to `end` (hours since the roster epoch), assigned
/// to at most one employee.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Shift {
    pub id: u32,
    pub employee: Option<u32>,
    pub start: u32,
    pub end: u32,
    pub required_skill: Option<String>,
}

impl Shift {
    pub fn new(id: u32, employee: Option<u32>, start: u32, end: u32) -> Self {
        Self {
            id,
            employee,
            start,
            end,
            required_skill: None,
        }
    }

    pub fn requiring(mut self, skill: &str) -> Self {
        self.required_skill = Some(skill.to_string());
        self
    }

    pub fn hours(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn with_employee(&self, employee: Option<u32>) -> Self {
        Self {
            employee,
            ..self.clone()
        }
    }
}

impl PlanningId for Shift {
    type Id = u32;

    fn planning_id(&self) -> u32 {
        self.id
    }
}

/// Employees as problem facts, shifts as entities assigned once they have
/// an employee.
pub fn shift_model() -> DomainModel {
    DomainModel::new()
        .with_problem_fact::<Employee>()
        .with_planning_entity(|s: &Shift| s.employee.is_some())
}
