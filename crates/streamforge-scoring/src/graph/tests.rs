use std::any::TypeId;
use std::sync::Arc;

use streamforge_core::{PlanningId, Score, SimpleScore, StreamForgeError};
use streamforge_test::{scheduling_model, Meeting, Room};

use super::*;
use crate::api::weight_overrides::ConstraintWeightOverrides;
use crate::session::ConstraintSessionFactory;
use crate::stream::collector::count;
use crate::stream::joiner::equal_bi;
use crate::stream::{key, ConstraintFactory};

fn factory() -> ConstraintFactory<SimpleScore> {
    ConstraintFactory::new(Arc::new(scheduling_model()))
}

fn kinds(graph: &DeclarationGraph<SimpleScore>) -> Vec<OpKind> {
    (0..graph.len()).map(|i| graph.key(DeclId(i)).kind()).collect()
}

#[test]
fn test_identical_chains_share_declarations() {
    let cf = factory();
    let first = cf
        .for_each::<Meeting>()
        .unwrap()
        .join(
            cf.for_each::<Room>().unwrap(),
            equal_bi(|m: &Meeting| m.room, |r: &Room| Some(r.id)),
        )
        .unwrap();
    let declared = cf.declaration_count();

    let second = cf
        .for_each::<Meeting>()
        .unwrap()
        .join(
            cf.for_each::<Room>().unwrap(),
            equal_bi(|m: &Meeting| m.room, |r: &Room| Some(r.id)),
        )
        .unwrap();

    // distinct closure literals are distinct types
    assert_ne!(first.declaration_id(), second.declaration_id());

    let by_room = |m: &Meeting| m.room;
    let room_id = |r: &Room| Some(r.id);
    let third = cf
        .for_each::<Meeting>()
        .unwrap()
        .join(cf.for_each::<Room>().unwrap(), equal_bi(by_room, room_id))
        .unwrap();
    let after_third = cf.declaration_count();
    let fourth = cf
        .for_each::<Meeting>()
        .unwrap()
        .join(cf.for_each::<Room>().unwrap(), equal_bi(by_room, room_id))
        .unwrap();
    assert_eq!(third.declaration_id(), fourth.declaration_id());
    assert_eq!(cf.declaration_count(), after_third);
    assert!(after_third > declared);
}

#[test]
fn test_source_is_shared_across_constraints() {
    let cf = factory();
    let a = cf.for_each::<Room>().unwrap();
    let b = cf.for_each_including_unassigned::<Room>().unwrap();
    // problem facts are always assigned
    assert_eq!(a.declaration_id(), b.declaration_id());

    let assigned = cf.for_each::<Meeting>().unwrap();
    let all = cf.for_each_including_unassigned::<Meeting>().unwrap();
    assert_ne!(assigned.declaration_id(), all.declaration_id());
}

#[test]
fn test_join_is_wrapped_in_bridges() {
    let factory = ConstraintSessionFactory::<SimpleScore>::new(scheduling_model(), |cf| {
        Ok(vec![cf
            .for_each::<Meeting>()?
            .join(cf.for_each::<Room>()?, equal_bi(|m: &Meeting| m.room, |r: &Room| Some(r.id)))?
            .penalize(SimpleScore::of(1))
            .as_constraint("Paired")?])
    })
    .unwrap();

    let graph = factory.graph();
    assert_eq!(
        kinds(graph),
        vec![
            OpKind::Source,
            OpKind::Source,
            OpKind::ForeBridge,
            OpKind::ForeBridge,
            OpKind::Join,
            OpKind::AftBridge,
            OpKind::Score,
        ]
    );
    assert_eq!(graph.children(DeclId(4)), &[DeclId(5)]);
    assert_eq!(graph.key(DeclId(4)).parents(), &[DeclId(2), DeclId(3)]);
    assert_eq!(graph.owner_names(DeclId(0)), vec!["Paired".to_string()]);
}

#[test]
fn test_duplicate_constraint_name_is_rejected() {
    let cf = factory();
    cf.for_each::<Room>()
        .unwrap()
        .penalize(SimpleScore::of(1))
        .as_constraint("Rooms")
        .unwrap();
    let err = cf
        .for_each::<Meeting>()
        .unwrap()
        .penalize(SimpleScore::of(1))
        .as_constraint("Rooms")
        .unwrap_err();
    assert!(matches!(err, StreamForgeError::Config(_)));

    // another package is another constraint
    assert!(cf
        .for_each::<Meeting>()
        .unwrap()
        .penalize(SimpleScore::of(1))
        .as_constraint_in("other", "Rooms")
        .is_ok());
}

#[test]
fn test_streams_of_different_factories_cannot_join() {
    let cf = factory();
    let other = factory();
    let err = cf
        .for_each::<Meeting>()
        .unwrap()
        .join(other.for_each::<Room>().unwrap(), ())
        .unwrap_err();
    assert!(matches!(err, StreamForgeError::Config(_)));
}

#[test]
fn test_unknown_source_type_is_rejected() {
    #[derive(Debug)]
    struct Unlisted;

    impl PlanningId for Unlisted {
        type Id = u8;
        fn planning_id(&self) -> u8 {
            0
        }
    }

    let cf = factory();
    assert!(matches!(
        cf.for_each::<Unlisted>(),
        Err(StreamForgeError::Config(_))
    ));
}

#[test]
fn test_group_keys_must_precede_collectors() {
    let cf = factory();
    let err = cf
        .for_each::<Room>()
        .unwrap()
        .group_by((count(), key(|r: &Room| r.capacity)))
        .unwrap_err();
    assert!(matches!(err, StreamForgeError::Config(_)));
}

#[test]
fn test_zero_weight_deactivates_constraint() {
    let factory = ConstraintSessionFactory::<SimpleScore>::builder(scheduling_model())
        .weight_overrides(
            ConstraintWeightOverrides::new().with("Unused rooms", SimpleScore::zero()),
        )
        .build(|cf| {
            Ok(vec![
                cf.for_each::<Room>()?
                    .penalize(SimpleScore::of(1))
                    .as_constraint("Unused rooms")?,
                cf.for_each::<Meeting>()?
                    .penalize(SimpleScore::of(1))
                    .as_constraint("Meetings")?,
            ])
        })
        .unwrap();

    let graph = factory.graph();
    let names: Vec<String> = graph.active_constraints().map(|c| c.name.clone()).collect();
    assert_eq!(names, vec!["Meetings".to_string()]);
    // the room source and its score node get no runtime node
    assert!(!graph.is_active(DeclId(0)));
    assert_eq!(graph.active_count(), 2);
}

#[test]
fn test_sharing_a_declaration_with_children_is_a_violation() {
    let mut builder = GraphBuilder::<SimpleScore>::new();
    let source = builder
        .share_plain(Declaration::source(TypeId::of::<Room>(), "Room", true))
        .unwrap();

    let mut candidate = Declaration::fore_bridge(source, Side::Left, 1);
    candidate.children.push(source);
    assert!(matches!(
        builder.share_plain(candidate),
        Err(StreamForgeError::SharingViolation(_))
    ));
}

#[test]
fn test_share_runs_first_insertion_step_once() {
    let mut builder = GraphBuilder::<SimpleScore>::new();
    let source = builder
        .share_plain(Declaration::source(TypeId::of::<Room>(), "Room", true))
        .unwrap();

    let mut runs = 0;
    for _ in 0..3 {
        builder
            .share(Declaration::fore_bridge(source, Side::Right, 1), |_, _| {
                runs += 1;
                Ok(())
            })
            .unwrap();
    }
    assert_eq!(runs, 1);
    assert_eq!(builder.len(), 2);
    assert_eq!(builder.declaration(source).children, vec![DeclId(1)]);
}
