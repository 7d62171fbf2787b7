use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};

use super::index::TupleIndex;
use super::{joined_row, Ctx};
use crate::graph::{JoinIndexer, Side};
use crate::session::tuple::{Event, TupleId};
use crate::value::IndexKey;

/// Joins tuples of two parents into one output per matching pair.
pub(crate) struct JoinNode {
    indexer: JoinIndexer,
    left: TupleIndex,
    right: TupleIndex,
    // left -> right -> output
    by_left: HashMap<TupleId, IndexMap<TupleId, TupleId>>,
    by_right: HashMap<TupleId, IndexSet<TupleId>>,
}

impl JoinNode {
    pub(crate) fn new(indexer: JoinIndexer) -> Self {
        Self {
            indexer,
            left: TupleIndex::default(),
            right: TupleIndex::default(),
            by_left: HashMap::new(),
            by_right: HashMap::new(),
        }
    }

    pub(crate) fn on_event(&mut self, side: Side, event: Event, input: TupleId, ctx: &mut Ctx<'_>) {
        match event {
            Event::Insert => self.insert(side, input, ctx),
            Event::Update => {
                let key = self.key(side, ctx, input);
                let unchanged = self.index(side).key_of(input) == Some(&key);
                if unchanged {
                    for other in self.opposite(side).matching(&key) {
                        let (l, r) = oriented(side, input, other);
                        self.refresh_pair(l, r, ctx);
                    }
                } else {
                    self.retract(side, input, ctx);
                    self.insert(side, input, ctx);
                }
            }
            Event::Retract => self.retract(side, input, ctx),
        }
    }

    fn key(&self, side: Side, ctx: &Ctx<'_>, input: TupleId) -> IndexKey {
        let row = ctx.row(input);
        match side {
            Side::Left => self.indexer.left_key(row),
            Side::Right => self.indexer.right_key(row),
        }
    }

    fn index(&self, side: Side) -> &TupleIndex {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    fn opposite(&self, side: Side) -> &TupleIndex {
        match side {
            Side::Left => &self.right,
            Side::Right => &self.left,
        }
    }

    fn insert(&mut self, side: Side, input: TupleId, ctx: &mut Ctx<'_>) {
        let key = self.key(side, ctx, input);
        let candidates = self.opposite(side).matching(&key);
        match side {
            Side::Left => self.left.insert(input, key),
            Side::Right => self.right.insert(input, key),
        }
        for other in candidates {
            let (l, r) = oriented(side, input, other);
            self.refresh_pair(l, r, ctx);
        }
    }

    fn retract(&mut self, side: Side, input: TupleId, ctx: &mut Ctx<'_>) {
        match side {
            Side::Left => {
                self.left.remove(input);
                for (r, out) in self.by_left.remove(&input).unwrap_or_default() {
                    if let Some(lefts) = self.by_right.get_mut(&r) {
                        lefts.swap_remove(&input);
                    }
                    ctx.retract(out);
                }
            }
            Side::Right => {
                self.right.remove(input);
                for l in self.by_right.remove(&input).unwrap_or_default() {
                    if let Some(outputs) = self.by_left.get_mut(&l) {
                        if let Some(out) = outputs.swap_remove(&input) {
                            ctx.retract(out);
                        }
                    }
                }
            }
        }
    }

    /// Re-evaluates the residual filter of one pair with equal keys.
    fn refresh_pair(&mut self, l: TupleId, r: TupleId, ctx: &mut Ctx<'_>) {
        let (left_row, right_row) = (ctx.row(l), ctx.row(r));
        let passes = self.indexer.matches(left_row, right_row);
        let existing = self.by_left.get(&l).and_then(|outputs| outputs.get(&r)).copied();
        match (existing, passes) {
            (Some(out), true) => {
                let row = joined_row(ctx.row(l), ctx.row(r));
                ctx.update(out, row);
            }
            (Some(out), false) => {
                if let Some(outputs) = self.by_left.get_mut(&l) {
                    outputs.swap_remove(&r);
                }
                if let Some(lefts) = self.by_right.get_mut(&r) {
                    lefts.swap_remove(&l);
                }
                ctx.retract(out);
            }
            (None, true) => {
                let row = joined_row(ctx.row(l), ctx.row(r));
                let out = ctx.insert(row);
                self.by_left.entry(l).or_default().insert(r, out);
                self.by_right.entry(r).or_default().insert(l);
            }
            (None, false) => {}
        }
    }
}

fn oriented(side: Side, input: TupleId, other: TupleId) -> (TupleId, TupleId) {
    match side {
        Side::Left => (input, other),
        Side::Right => (other, input),
    }
}
