use std::sync::Arc;

use super::*;
use crate::graph::JoinIndexer;
use crate::value::{Key, Value};

#[derive(Debug)]
struct Shift {
    employee: u32,
    start: i64,
    end: i64,
}

fn shift(employee: u32, start: i64, end: i64) -> Value {
    Arc::new(Shift {
        employee,
        start,
        end,
    })
}

fn parts<J: Joiner<(Shift,), Shift>>(joiner: J) -> JoinerParts {
    joiner.into_parts()
}

#[test]
fn test_equal_builds_index_keys() {
    let indexer = JoinIndexer::new(parts(equal(|s: &Shift| s.employee)));
    let a = [shift(1, 0, 8)];
    let b = [shift(1, 8, 16)];
    let c = [shift(2, 8, 16)];

    assert_eq!(indexer.left_key(&a).as_slice(), &[Key::new(1_u32)]);
    assert_eq!(indexer.left_key(&a), indexer.right_key(&b));
    assert_ne!(indexer.left_key(&a), indexer.right_key(&c));
    assert!(indexer.matches(&a, &b));
}

#[test]
fn test_comparison_filters_combined_row() {
    let indexer = JoinIndexer::new(parts(less_than(|s: &Shift| s.end, |s: &Shift| s.start)));
    let early = [shift(1, 0, 8)];
    let late = [shift(1, 8, 16)];

    assert!(indexer.left_key(&early).is_empty());
    assert!(!indexer.matches(&early, &late));
    let early_end = [shift(1, 0, 7)];
    assert!(indexer.matches(&early_end, &late));
    assert!(!indexer.matches(&late, &early_end));
}

#[test]
fn test_overlapping_is_half_open() {
    let indexer = JoinIndexer::new(parts(overlapping(
        |s: &Shift| s.start,
        |s: &Shift| s.end,
        |s: &Shift| s.start,
        |s: &Shift| s.end,
    )));

    assert!(indexer.matches(&[shift(1, 0, 10)], &[shift(2, 5, 15)]));
    assert!(!indexer.matches(&[shift(1, 0, 10)], &[shift(2, 10, 20)]));
    assert!(!indexer.matches(&[shift(1, 0, 5)], &[shift(2, 10, 15)]));
}

#[test]
fn test_and_combines_keys_and_filters() {
    let joiner = equal(|s: &Shift| s.employee)
        .and(greater_than(|s: &Shift| s.start, |s: &Shift| s.start))
        .and(filtering(|a: &Shift, b: &Shift| a.end != b.end));
    let indexer = JoinIndexer::new(parts(joiner));

    assert!(indexer.matches(&[shift(1, 8, 16)], &[shift(1, 0, 8)]));
    assert!(!indexer.matches(&[shift(1, 0, 8)], &[shift(1, 8, 16)]));
    assert!(!indexer.matches(&[shift(1, 8, 16)], &[shift(1, 0, 16)]));
}

#[test]
fn test_capture_free_joiners_have_equal_params() {
    fn by_employee(s: &Shift) -> u32 {
        s.employee
    }

    let first = parts(equal(by_employee));
    let second = parts(equal(by_employee));
    assert_eq!(first.params, second.params);

    let shifted = |offset: u32| move |s: &Shift| s.employee + offset;
    let capturing = parts(equal(shifted(3)));
    let again = parts(equal(shifted(3)));
    assert_ne!(capturing.params, again.params);
}

#[test]
fn test_unit_joiner_is_cross_join() {
    let indexer = JoinIndexer::new(parts(()));
    assert!(indexer.left_key(&[shift(1, 0, 1)]).is_empty());
    assert!(indexer.matches(&[shift(1, 0, 1)], &[shift(2, 5, 6)]));
}
