use std::sync::Arc;

use smallvec::smallvec;

use super::exists::{ExistenceCounter, Transition};
use super::*;
use crate::graph::{GroupKeyFn, JoinIndexer, KeyPart, RowExpander, RowMapper, RowPredicate, Side};
use crate::session::tuple::{Event, TupleArena, TupleId, TupleState};
use crate::stream::collector::{CountCollector, DynCollector};
use crate::stream::joiner::JoinerParts;
use crate::value::{column, Key, Row, Value};

/// An arena plus the output queue of the node under test.
#[derive(Default)]
struct Harness {
    tuples: TupleArena,
    queue: Vec<TupleId>,
}

impl Harness {
    /// A settled parent tuple.
    fn input(&mut self, row: Row) -> TupleId {
        let mut staged = Vec::new();
        let id = self.tuples.stage_insert(row, &mut staged);
        self.tuples.begin_propagation(id);
        id
    }

    /// Replaces a parent tuple's row as if its update had been settled.
    fn change(&mut self, id: TupleId, row: Row) {
        let mut staged = Vec::new();
        self.tuples.stage_update(id, row, &mut staged);
        self.tuples.begin_propagation(id);
    }

    fn ctx(&mut self) -> Ctx<'_> {
        Ctx {
            tuples: &mut self.tuples,
            queue: &mut self.queue,
        }
    }

    /// Settles the node's queue and returns what its children would see.
    fn settle(&mut self) -> Vec<(Event, TupleId)> {
        let queue = std::mem::take(&mut self.queue);
        queue
            .into_iter()
            .filter_map(|id| self.tuples.begin_propagation(id).map(|event| (event, id)))
            .collect()
    }

    fn ints(&self, id: TupleId) -> Vec<i32> {
        let row = self.tuples.row(id);
        (0..row.len()).map(|i| *column::<i32>(row, i)).collect()
    }
}

fn int(n: i32) -> Row {
    smallvec![Arc::new(n) as Value]
}

fn events(settled: &[(Event, TupleId)], event: Event) -> usize {
    settled.iter().filter(|(e, _)| *e == event).count()
}

fn first_column_key() -> KeyPart {
    Arc::new(|row: &[Value]| Key::new(*column::<i32>(row, 0)))
}

fn equal_indexer() -> JoinIndexer {
    JoinIndexer::new(JoinerParts {
        left: vec![first_column_key()],
        right: vec![first_column_key()],
        filters: Vec::new(),
        params: Vec::new(),
    })
}

#[test]
fn test_filter_tracks_predicate_changes() {
    let predicate: RowPredicate = Arc::new(|row: &[Value]| *column::<i32>(row, 0) > 0);
    let mut node = FilterNode::new(predicate);
    let mut h = Harness::default();

    let a = h.input(int(1));
    let b = h.input(int(-1));
    node.on_event(Event::Insert, a, &mut h.ctx());
    node.on_event(Event::Insert, b, &mut h.ctx());
    let settled = h.settle();
    assert_eq!(settled.len(), 1);
    assert_eq!(settled[0].0, Event::Insert);

    h.change(a, int(-5));
    node.on_event(Event::Update, a, &mut h.ctx());
    h.change(b, int(5));
    node.on_event(Event::Update, b, &mut h.ctx());
    let settled = h.settle();
    assert_eq!(events(&settled, Event::Retract), 1);
    assert_eq!(events(&settled, Event::Insert), 1);
}

#[test]
fn test_filter_insert_then_fail_before_settle_is_never_seen() {
    let predicate: RowPredicate = Arc::new(|row: &[Value]| *column::<i32>(row, 0) > 0);
    let mut node = FilterNode::new(predicate);
    let mut h = Harness::default();

    let a = h.input(int(1));
    node.on_event(Event::Insert, a, &mut h.ctx());
    h.change(a, int(0));
    node.on_event(Event::Update, a, &mut h.ctx());

    assert!(h.settle().is_empty());
    assert_eq!(h.tuples.live(), 1);
}

#[test]
fn test_join_pairs_equal_keys() {
    let mut node = JoinNode::new(equal_indexer());
    let mut h = Harness::default();

    let l1 = h.input(int(1));
    let r1 = h.input(int(1));
    let r1b = h.input(int(1));
    let r2 = h.input(int(2));
    node.on_event(Side::Left, Event::Insert, l1, &mut h.ctx());
    for r in [r1, r1b, r2] {
        node.on_event(Side::Right, Event::Insert, r, &mut h.ctx());
    }

    let settled = h.settle();
    assert_eq!(events(&settled, Event::Insert), 2);
    for (_, out) in &settled {
        assert_eq!(h.ints(*out), vec![1, 1]);
    }
}

#[test]
fn test_join_key_change_moves_pairs() {
    let mut node = JoinNode::new(equal_indexer());
    let mut h = Harness::default();

    let l = h.input(int(1));
    let r = h.input(int(1));
    node.on_event(Side::Left, Event::Insert, l, &mut h.ctx());
    node.on_event(Side::Right, Event::Insert, r, &mut h.ctx());
    assert_eq!(h.settle().len(), 1);

    h.change(r, int(2));
    node.on_event(Side::Right, Event::Update, r, &mut h.ctx());
    let settled = h.settle();
    assert_eq!(settled.len(), 1);
    assert_eq!(settled[0].0, Event::Retract);

    h.change(l, int(2));
    node.on_event(Side::Left, Event::Update, l, &mut h.ctx());
    let settled = h.settle();
    assert_eq!(settled.len(), 1);
    assert_eq!(settled[0].0, Event::Insert);
    assert_eq!(h.ints(settled[0].1), vec![2, 2]);
}

#[test]
fn test_join_update_with_same_key_refreshes_output() {
    let mut node = JoinNode::new(equal_indexer());
    let mut h = Harness::default();

    let l = h.input(int(3));
    let r = h.input(int(3));
    node.on_event(Side::Left, Event::Insert, l, &mut h.ctx());
    node.on_event(Side::Right, Event::Insert, r, &mut h.ctx());
    let out = h.settle()[0].1;

    h.change(l, int(3));
    node.on_event(Side::Left, Event::Update, l, &mut h.ctx());
    assert_eq!(h.settle(), vec![(Event::Update, out)]);
}

#[test]
fn test_join_retract_removes_every_pair() {
    let mut node = JoinNode::new(equal_indexer());
    let mut h = Harness::default();

    let l = h.input(int(1));
    let l2 = h.input(int(1));
    let r = h.input(int(1));
    node.on_event(Side::Left, Event::Insert, l, &mut h.ctx());
    node.on_event(Side::Left, Event::Insert, l2, &mut h.ctx());
    node.on_event(Side::Right, Event::Insert, r, &mut h.ctx());
    assert_eq!(h.settle().len(), 2);

    node.on_event(Side::Right, Event::Retract, r, &mut h.ctx());
    assert_eq!(events(&h.settle(), Event::Retract), 2);
}

#[test]
fn test_if_exists_emits_on_first_match_and_retracts_on_last() {
    let mut node = ExistsNode::new(true, equal_indexer());
    let mut h = Harness::default();

    let left = h.input(int(7));
    node.on_event(Side::Left, Event::Insert, left, &mut h.ctx());
    assert!(h.settle().is_empty());

    let r1 = h.input(int(7));
    let r2 = h.input(int(7));
    node.on_event(Side::Right, Event::Insert, r1, &mut h.ctx());
    let settled = h.settle();
    assert_eq!(settled.len(), 1);
    assert_eq!(settled[0].0, Event::Insert);
    assert_eq!(h.ints(settled[0].1), vec![7]);

    node.on_event(Side::Right, Event::Insert, r2, &mut h.ctx());
    node.on_event(Side::Right, Event::Retract, r1, &mut h.ctx());
    assert!(h.settle().is_empty());

    node.on_event(Side::Right, Event::Retract, r2, &mut h.ctx());
    let settled = h.settle();
    assert_eq!(settled.len(), 1);
    assert_eq!(settled[0].0, Event::Retract);
}

#[test]
fn test_if_not_exists_inverts_visibility() {
    let mut node = ExistsNode::new(false, equal_indexer());
    let mut h = Harness::default();

    let left = h.input(int(1));
    node.on_event(Side::Left, Event::Insert, left, &mut h.ctx());
    let settled = h.settle();
    assert_eq!(settled.len(), 1);
    assert_eq!(settled[0].0, Event::Insert);

    let right = h.input(int(2));
    node.on_event(Side::Right, Event::Insert, right, &mut h.ctx());
    assert!(h.settle().is_empty());

    h.change(right, int(1));
    node.on_event(Side::Right, Event::Update, right, &mut h.ctx());
    let settled = h.settle();
    assert_eq!(settled.len(), 1);
    assert_eq!(settled[0].0, Event::Retract);
}

#[test]
fn test_exists_left_update_recounts_matches() {
    let mut node = ExistsNode::new(true, equal_indexer());
    let mut h = Harness::default();

    let right = h.input(int(1));
    node.on_event(Side::Right, Event::Insert, right, &mut h.ctx());
    let left = h.input(int(1));
    node.on_event(Side::Left, Event::Insert, left, &mut h.ctx());
    assert_eq!(events(&h.settle(), Event::Insert), 1);

    h.change(left, int(2));
    node.on_event(Side::Left, Event::Update, left, &mut h.ctx());
    assert_eq!(events(&h.settle(), Event::Retract), 1);

    h.change(left, int(1));
    node.on_event(Side::Left, Event::Update, left, &mut h.ctx());
    assert_eq!(events(&h.settle(), Event::Insert), 1);
}

#[test]
fn test_existence_counter_transitions() {
    let mut counter = ExistenceCounter::default();
    assert!(counter.is_empty());
    assert_eq!(counter.increment(), Transition::BecameNonEmpty);
    assert_eq!(counter.increment(), Transition::Unchanged);
    assert_eq!(counter.decrement(), Transition::Unchanged);
    assert_eq!(counter.decrement(), Transition::BecameEmpty);
}

fn parity_key() -> GroupKeyFn {
    Arc::new(|row: &[Value]| {
        let parity = column::<i32>(row, 0) % 2;
        (Key::new(parity), Arc::new(parity) as Value)
    })
}

fn count_collector() -> Arc<dyn DynCollector> {
    Arc::new(CountCollector)
}

fn key_and_count(h: &Harness, id: TupleId) -> (i32, usize) {
    let row = h.tuples.row(id);
    (*column::<i32>(row, 0), *column::<usize>(row, 1))
}

#[test]
fn test_group_counts_per_key() {
    let mut node = GroupNode::new(vec![parity_key()], vec![count_collector()]);
    let mut h = Harness::default();

    for n in [1, 3, 4] {
        let id = h.input(int(n));
        node.on_event(Event::Insert, id, &mut h.ctx());
    }

    let settled = h.settle();
    assert_eq!(events(&settled, Event::Insert), 2);
    let mut groups: Vec<(i32, usize)> = settled
        .iter()
        .map(|(_, id)| key_and_count(&h, *id))
        .collect();
    groups.sort_unstable();
    assert_eq!(groups, vec![(0, 1), (1, 2)]);
}

#[test]
fn test_group_update_moves_input_between_groups() {
    let mut node = GroupNode::new(vec![parity_key()], vec![count_collector()]);
    let mut h = Harness::default();

    let odd = h.input(int(1));
    let even = h.input(int(2));
    node.on_event(Event::Insert, odd, &mut h.ctx());
    node.on_event(Event::Insert, even, &mut h.ctx());
    h.settle();

    h.change(odd, int(6));
    node.on_event(Event::Update, odd, &mut h.ctx());
    let settled = h.settle();
    assert_eq!(events(&settled, Event::Retract), 1);
    let updated: Vec<(i32, usize)> = settled
        .iter()
        .filter(|(e, _)| *e == Event::Update)
        .map(|(_, id)| key_and_count(&h, *id))
        .collect();
    assert_eq!(updated, vec![(0, 2)]);
}

#[test]
fn test_global_group_exists_only_while_non_empty() {
    let mut node = GroupNode::new(Vec::new(), vec![count_collector()]);
    let mut h = Harness::default();

    let a = h.input(int(1));
    node.on_event(Event::Insert, a, &mut h.ctx());
    let settled = h.settle();
    assert_eq!(settled.len(), 1);
    assert_eq!(*column::<usize>(h.tuples.row(settled[0].1), 0), 1);

    node.on_event(Event::Retract, a, &mut h.ctx());
    let settled = h.settle();
    assert_eq!(settled, vec![(Event::Retract, settled[0].1)]);
    assert_eq!(h.tuples.state(settled[0].1), TupleState::Dead);
}

fn list(values: Vec<i32>) -> Row {
    smallvec![Arc::new(values) as Value]
}

#[test]
fn test_flatten_pairs_outputs_by_position() {
    let expander: RowExpander = Arc::new(|row: &[Value]| {
        column::<Vec<i32>>(row, 0)
            .iter()
            .map(|n| Arc::new(*n) as Value)
            .collect()
    });
    let mut node = FlattenNode::new(expander);
    let mut h = Harness::default();

    let input = h.input(list(vec![1, 2, 3]));
    node.on_event(Event::Insert, input, &mut h.ctx());
    assert_eq!(events(&h.settle(), Event::Insert), 3);

    h.change(input, list(vec![9]));
    node.on_event(Event::Update, input, &mut h.ctx());
    let settled = h.settle();
    assert_eq!(events(&settled, Event::Update), 1);
    assert_eq!(events(&settled, Event::Retract), 2);

    node.on_event(Event::Retract, input, &mut h.ctx());
    assert_eq!(events(&h.settle(), Event::Retract), 1);
}

#[test]
fn test_map_replaces_columns() {
    let mapper: RowMapper = Arc::new(|row: &[Value]| Arc::new(column::<i32>(row, 0) * 10) as Value);
    let mut node = MapNode::new(vec![mapper]);
    let mut h = Harness::default();

    let input = h.input(int(4));
    node.on_event(Event::Insert, input, &mut h.ctx());
    let out = h.settle()[0].1;
    assert_eq!(h.ints(out), vec![40]);

    h.change(input, int(5));
    node.on_event(Event::Update, input, &mut h.ctx());
    assert_eq!(h.settle(), vec![(Event::Update, out)]);
    assert_eq!(h.ints(out), vec![50]);
}

#[test]
fn test_concat_keeps_both_sides() {
    let mut node = ConcatNode::new();
    let mut h = Harness::default();

    let left = h.input(int(1));
    let right = h.input(int(1));
    node.on_event(Side::Left, Event::Insert, left, &mut h.ctx());
    node.on_event(Side::Right, Event::Insert, right, &mut h.ctx());
    assert_eq!(events(&h.settle(), Event::Insert), 2);

    node.on_event(Side::Left, Event::Retract, left, &mut h.ctx());
    assert_eq!(events(&h.settle(), Event::Retract), 1);
}

#[test]
fn test_source_respects_assignment() {
    use std::any::TypeId;

    use streamforge_core::{FactClass, PlanningId};

    #[derive(Debug)]
    struct Slot {
        id: u8,
        value: Option<i32>,
    }

    impl PlanningId for Slot {
        type Id = u8;
        fn planning_id(&self) -> u8 {
            self.id
        }
    }

    let class = FactClass::planning_entity(|s: &Slot| s.value.is_some());
    let mut node = SourceNode::new(TypeId::of::<Slot>(), Some(class));
    let mut h = Harness::default();
    let key = Key::new(1_u8);

    let unassigned: Value = Arc::new(Slot { id: 1, value: None });
    node.insert(&key, &unassigned, &mut h.ctx());
    assert!(h.settle().is_empty());

    let assigned: Value = Arc::new(Slot { id: 1, value: Some(3) });
    node.update(&key, &assigned, &mut h.ctx());
    assert_eq!(events(&h.settle(), Event::Insert), 1);

    node.update(&key, &unassigned, &mut h.ctx());
    assert_eq!(events(&h.settle(), Event::Retract), 1);
}
