//! Session lifecycle: fact bookkeeping, poisoning and configuration.

use std::sync::Arc;

use streamforge_config::{EngineConfig, EnvironmentMode};
use streamforge_core::{Result, SimpleScore, StreamForgeError};
use streamforge_scoring::{
    Constraint, ConstraintFactory, ConstraintJustification, ConstraintSessionFactory, EntityRef,
};
use streamforge_test::{init_tracing, scheduling_model, Employee, Meeting, Room};

fn meetings(cf: &ConstraintFactory<SimpleScore>) -> Result<Vec<Constraint>> {
    Ok(vec![
        cf.for_each::<Meeting>()?
            .penalize(SimpleScore::of(1))
            .as_constraint("Meetings")?,
        cf.for_each::<Room>()?
            .reward(SimpleScore::of(1))
            .as_constraint_in("rooms", "Rooms")?,
    ])
}

fn factory() -> ConstraintSessionFactory<SimpleScore> {
    init_tracing();
    ConstraintSessionFactory::new(scheduling_model(), meetings).unwrap()
}

#[test]
fn test_inserting_the_same_fact_twice_fails() {
    let mut session = factory().build_default_session().unwrap();
    session.insert(Arc::new(Meeting::new(1, Some('A'), 3))).unwrap();
    let err = session
        .insert(Arc::new(Meeting::new(1, Some('B'), 3)))
        .unwrap_err();
    assert!(matches!(err, StreamForgeError::DuplicateFact(_)));

    // the rejected insert left nothing behind
    assert_eq!(session.fact_count(), 1);
    assert_eq!(session.calculate_score().unwrap(), SimpleScore::of(-1));
}

#[test]
fn test_update_and_retract_require_an_inserted_fact() {
    let mut session = factory().build_default_session().unwrap();
    assert!(matches!(
        session.update(Arc::new(Meeting::new(7, None, 1))),
        Err(StreamForgeError::UnknownFact(_))
    ));
    assert!(matches!(
        session.retract(&Meeting::new(7, None, 1)),
        Err(StreamForgeError::UnknownFact(_))
    ));

    session.insert(Arc::new(Meeting::new(7, None, 1))).unwrap();
    session.retract(&Meeting::new(7, None, 1)).unwrap();
    assert!(matches!(
        session.retract(&Meeting::new(7, None, 1)),
        Err(StreamForgeError::UnknownFact(_))
    ));
    assert!(!session.is_poisoned());
}

#[test]
fn test_facts_outside_the_domain_model_are_rejected() {
    let mut session = factory().build_default_session().unwrap();
    assert!(matches!(
        session.insert(Arc::new(Employee::new(1, "Ann"))),
        Err(StreamForgeError::DomainModel(_))
    ));
    assert_eq!(session.fact_count(), 0);
}

#[test]
fn test_unassigned_entities_are_filtered_by_for_each() {
    let mut session = factory().build_default_session().unwrap();
    session.insert(Arc::new(Meeting::new(1, None, 3))).unwrap();
    session.insert(Arc::new(Room::new('A', 4))).unwrap();
    assert_eq!(session.calculate_score().unwrap(), SimpleScore::of(1));

    session.update(Arc::new(Meeting::new(1, Some('A'), 3))).unwrap();
    assert_eq!(session.calculate_score().unwrap(), SimpleScore::of(0));
}

#[test]
fn test_panicking_predicate_poisons_the_session() {
    init_tracing();
    let factory = ConstraintSessionFactory::<SimpleScore>::new(scheduling_model(), |cf| {
        Ok(vec![cf
            .for_each::<Meeting>()?
            .filter(|m: &Meeting| {
                assert!(m.attendees < 100, "too many attendees");
                true
            })?
            .penalize(SimpleScore::of(1))
            .as_constraint("Fragile")?])
    })
    .unwrap();

    let mut session = factory.build_default_session().unwrap();
    session.insert(Arc::new(Meeting::new(1, Some('A'), 5))).unwrap();
    assert_eq!(session.calculate_score().unwrap(), SimpleScore::of(-1));

    session
        .update(Arc::new(Meeting::new(1, Some('A'), 500)))
        .unwrap();
    match session.calculate_score() {
        Err(StreamForgeError::Evaluation {
            constraints,
            message,
            ..
        }) => {
            assert_eq!(constraints, vec!["Fragile".to_string()]);
            assert!(message.contains("too many attendees"));
        }
        other => panic!("expected an evaluation error, got {:?}", other),
    }

    assert!(session.is_poisoned());
    assert!(matches!(
        session.calculate_score(),
        Err(StreamForgeError::Poisoned)
    ));
    assert!(matches!(
        session.insert(Arc::new(Meeting::new(2, None, 1))),
        Err(StreamForgeError::Poisoned)
    ));

    // a new session from the same factory is unaffected
    let mut fresh = factory.build_default_session().unwrap();
    fresh.insert(Arc::new(Meeting::new(1, Some('A'), 5))).unwrap();
    assert_eq!(fresh.calculate_score().unwrap(), SimpleScore::of(-1));
}

#[test]
fn test_config_weights_override_declared_weights() {
    init_tracing();
    let config = EngineConfig::from_toml_str(
        r#"
        environment_mode = "full_assert"
        constraint_match_tracking = true

        [constraint_weights]
        "Meetings" = "3"
        "rooms/Rooms" = "0"
        "#,
    )
    .unwrap();

    let factory = ConstraintSessionFactory::<SimpleScore>::builder(scheduling_model())
        .with_config(&config)
        .unwrap()
        .build(meetings)
        .unwrap();
    assert_eq!(factory.environment_mode(), EnvironmentMode::FullAssert);
    let names: Vec<String> = factory
        .constraint_refs()
        .iter()
        .map(|c| c.full_name())
        .collect();
    assert_eq!(names, vec!["Meetings".to_string()]);

    let mut session = factory.build_default_session().unwrap();
    assert!(session.is_match_tracking());
    session.insert(Arc::new(Meeting::new(1, Some('A'), 3))).unwrap();
    session.insert(Arc::new(Meeting::new(2, Some('A'), 3))).unwrap();
    session.insert(Arc::new(Room::new('A', 4))).unwrap();
    assert_eq!(session.calculate_score().unwrap(), SimpleScore::of(-6));

    let totals = session.constraint_totals().unwrap();
    assert_eq!(totals.len(), 1);
    assert_eq!(totals[0].match_count, 2);
}

#[test]
fn test_invalid_config_weight_is_a_config_error() {
    let config = EngineConfig::default().with_constraint_weight("Meetings", "lots");
    let err = ConstraintSessionFactory::<SimpleScore>::builder(scheduling_model())
        .with_config(&config)
        .err()
        .unwrap();
    assert!(matches!(err, StreamForgeError::Config(_)));
}

#[test]
fn test_custom_justification_and_indictment() {
    let factory = ConstraintSessionFactory::<SimpleScore>::new(scheduling_model(), |cf| {
        Ok(vec![cf
            .for_each::<Meeting>()?
            .filter(|m: &Meeting| m.attendees > 10)?
            .penalize_weighted(SimpleScore::of(1), |m: &Meeting| m.attendees - 10)
            .justify_with(|m: &Meeting, score: &SimpleScore| {
                ConstraintJustification::with_description(
                    vec![EntityRef::new(m)],
                    format!("meeting {} costs {}", m.id, score),
                )
            })
            .indict_with(|m: &Meeting| {
                m.room
                    .map(|id| vec![EntityRef::new(&Room::new(id, 0))])
                    .unwrap_or_default()
            })
            .as_constraint("Large meeting")?])
    })
    .unwrap();

    let mut session = factory.build_session(&Default::default(), true).unwrap();
    session.insert(Arc::new(Meeting::new(1, Some('A'), 14))).unwrap();
    session.insert(Arc::new(Meeting::new(2, Some('A'), 12))).unwrap();
    session.insert(Arc::new(Meeting::new(3, Some('B'), 5))).unwrap();

    let analyses = session.constraint_matches().unwrap();
    let mut descriptions: Vec<String> = analyses[0]
        .matches
        .iter()
        .map(|m| m.justification.description.clone())
        .collect();
    descriptions.sort();
    assert_eq!(
        descriptions,
        vec!["meeting 1 costs -4".to_string(), "meeting 2 costs -2".to_string()]
    );

    let indictments = session.indictments().unwrap();
    let room_a = indictments
        .get(&EntityRef::new(&Room::new('A', 0)))
        .unwrap();
    assert_eq!(room_a.match_count(), 2);
    assert_eq!(room_a.score, SimpleScore::of(-6));
}
