use std::sync::Arc;

use streamforge_core::{ConstraintRef, HardSoftScore, Score, SimpleScore};

use super::analysis::*;
use crate::value::Value;

#[derive(Clone, Debug, PartialEq)]
struct Lecture {
    id: i32,
    name: String,
}

fn lecture(id: i32, name: &str) -> Lecture {
    Lecture {
        id,
        name: name.to_string(),
    }
}

fn matched(
    constraint: &ConstraintRef,
    score: i64,
    entities: &[&EntityRef],
) -> DetailedConstraintMatch<SimpleScore> {
    let entities: Vec<EntityRef> = entities.iter().map(|e| (*e).clone()).collect();
    DetailedConstraintMatch::new(
        constraint.clone(),
        SimpleScore::of(score),
        ConstraintJustification::new(entities.clone()),
        entities,
    )
}

#[test]
fn test_entity_ref_names_and_label() {
    let entity = EntityRef::new(&lecture(1, "Algebra"));

    assert!(entity.type_name().ends_with("Lecture"));
    assert_eq!(entity.short_type_name(), "Lecture");
    assert!(entity.label().contains("Algebra"));
    assert_eq!(format!("{:?}", entity), format!("Lecture({:?})", lecture(1, "Algebra")));
}

#[test]
fn test_entity_ref_downcast() {
    let entity = EntityRef::from_arc(Arc::new(lecture(42, "Logic")));

    assert_eq!(entity.as_entity::<Lecture>().map(|l| l.id), Some(42));
    assert!(entity.as_entity::<String>().is_none());
}

#[test]
fn test_entity_ref_equality_ignores_allocation() {
    let a = EntityRef::new(&lecture(1, "Algebra"));
    let b = EntityRef::from_arc(Arc::new(lecture(1, "Algebra")));
    let c = EntityRef::new(&lecture(2, "Logic"));

    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn test_justification_from_row_lists_columns() {
    let row: Vec<Value> = vec![Arc::new(lecture(1, "Algebra")), Arc::new(7_i64)];
    let justification = ConstraintJustification::from_row(&row);

    assert_eq!(justification.entities.len(), 2);
    assert_eq!(justification.entities[1].as_entity::<i64>(), Some(&7));
    assert!(justification.to_string().ends_with(", 7"));
}

#[test]
fn test_hard_weight_marks_analysis_hard() {
    let cr = ConstraintRef::new("", "Overlap");
    let hard = ConstraintAnalysis::new(
        cr.clone(),
        HardSoftScore::of_hard(1),
        HardSoftScore::zero(),
        Vec::new(),
    );
    let soft = ConstraintAnalysis::new(
        cr,
        HardSoftScore::of_soft(1),
        HardSoftScore::zero(),
        Vec::new(),
    );
    assert!(hard.is_hard);
    assert!(!soft.is_hard);
}

#[test]
fn test_explanation_totals() {
    let cr = ConstraintRef::new("timetable", "Overlap");
    let algebra = EntityRef::new(&lecture(1, "Algebra"));
    let m = matched(&cr, -1, &[&algebra]);
    let explanation = ScoreExplanation::new(
        SimpleScore::of(-2),
        vec![
            ConstraintAnalysis::new(
                cr,
                SimpleScore::of(1),
                SimpleScore::of(-2),
                vec![m.clone(), m],
            ),
            ConstraintAnalysis::new(
                ConstraintRef::new("timetable", "Idle"),
                SimpleScore::of(1),
                SimpleScore::zero(),
                Vec::new(),
            ),
        ],
    );

    assert_eq!(explanation.total_match_count(), 2);
    assert_eq!(explanation.impacting().count(), 1);
    assert_eq!(explanation.matches().count(), 2);
    assert_eq!(explanation.constraint("Overlap").map(|a| a.name()), Some("Overlap"));
    assert!(explanation.constraint("timetable/Idle").is_some());
    assert!(explanation.constraint("Missing").is_none());
}

#[test]
fn test_indictments_follow_indicted_entities() {
    let cr = ConstraintRef::new("", "Overlap");
    let algebra = EntityRef::new(&lecture(1, "Algebra"));
    let logic = EntityRef::new(&lecture(2, "Logic"));
    let matches = vec![
        matched(&cr, -1, &[&algebra, &logic]),
        // listed twice, indicted once
        matched(&cr, -3, &[&logic, &logic]),
    ];

    let map = IndictmentMap::from_matches(matches);
    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&algebra).map(|i| i.score), Some(SimpleScore::of(-1)));
    assert_eq!(map.get(&logic).map(|i| i.score), Some(SimpleScore::of(-4)));
    assert_eq!(map.get(&logic).map(|i| i.match_count()), Some(2));
    assert_eq!(map.get(&logic).map(|i| i.constraints().len()), Some(1));
    assert_eq!(map.worst_first()[0].entity, logic);
}
