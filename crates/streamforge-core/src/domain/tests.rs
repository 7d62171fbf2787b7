use std::any::TypeId;

use super::*;

#[derive(Debug)]
struct Room {
    id: char,
}

impl PlanningId for Room {
    type Id = char;
    fn planning_id(&self) -> char {
        self.id
    }
}

#[derive(Debug)]
struct Meeting {
    id: u32,
    room: Option<char>,
}

impl PlanningId for Meeting {
    type Id = u32;
    fn planning_id(&self) -> u32 {
        self.id
    }
}

fn model() -> DomainModel {
    DomainModel::new()
        .with_problem_fact::<Room>()
        .with_planning_entity(|m: &Meeting| m.room.is_some())
}

#[test]
fn test_problem_facts_are_always_assigned() {
    let model = model();
    let rooms = model.class_of::<Room>().unwrap();
    assert_eq!(rooms.kind(), FactKind::ProblemFact);
    assert!(!rooms.can_be_unassigned());
    assert!(rooms.is_assigned(&Room { id: 'A' }));
}

#[test]
fn test_entity_assignment_predicate() {
    let model = model();
    let meetings = model.class(TypeId::of::<Meeting>()).unwrap();
    assert!(meetings.can_be_unassigned());
    assert!(meetings.is_assigned(&Meeting { id: 1, room: Some('A') }));
    assert!(!meetings.is_assigned(&Meeting { id: 2, room: None }));
}

#[test]
fn test_predicate_rejects_foreign_type() {
    let model = model();
    let meetings = model.class_of::<Meeting>().unwrap();
    assert!(!meetings.is_assigned(&Room { id: 'A' }));
}

#[test]
fn test_lookup() {
    let model = model();
    assert_eq!(model.len(), 2);
    assert!(model.contains(TypeId::of::<Room>()));
    assert!(!model.contains(TypeId::of::<String>()));
    assert!(model.class_of::<Meeting>().unwrap().type_name().ends_with("Meeting"));
    assert_eq!(Meeting { id: 9, room: None }.planning_id(), 9);
}
