use std::collections::HashMap;

use indexmap::IndexSet;

use super::index::TupleIndex;
use super::Ctx;
use crate::graph::{JoinIndexer, Side};
use crate::session::tuple::{Event, TupleId};
use crate::value::IndexKey;

/// Change of a counter relative to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Transition {
    BecameNonEmpty,
    Unchanged,
    BecameEmpty,
}

/// Number of right tuples currently matching one left tuple.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct ExistenceCounter {
    count: usize,
}

impl ExistenceCounter {
    pub(crate) fn is_empty(self) -> bool {
        self.count == 0
    }

    pub(crate) fn increment(&mut self) -> Transition {
        self.count += 1;
        if self.count == 1 {
            Transition::BecameNonEmpty
        } else {
            Transition::Unchanged
        }
    }

    pub(crate) fn decrement(&mut self) -> Transition {
        debug_assert!(self.count > 0, "existence counter underflow");
        self.count = self.count.saturating_sub(1);
        if self.count == 0 {
            Transition::BecameEmpty
        } else {
            Transition::Unchanged
        }
    }
}

#[derive(Debug, Default)]
struct LeftEntry {
    counter: ExistenceCounter,
    matches: IndexSet<TupleId>,
    output: Option<TupleId>,
}

/// Passes left tuples through while at least one (or, negated, no) right
/// tuple matches them.
pub(crate) struct ExistsNode {
    should_exist: bool,
    indexer: JoinIndexer,
    left: TupleIndex,
    right: TupleIndex,
    lefts: HashMap<TupleId, LeftEntry>,
    rights: HashMap<TupleId, IndexSet<TupleId>>,
}

impl ExistsNode {
    pub(crate) fn new(should_exist: bool, indexer: JoinIndexer) -> Self {
        Self {
            should_exist,
            indexer,
            left: TupleIndex::default(),
            right: TupleIndex::default(),
            lefts: HashMap::new(),
            rights: HashMap::new(),
        }
    }

    pub(crate) fn on_event(&mut self, side: Side, event: Event, input: TupleId, ctx: &mut Ctx<'_>) {
        match (side, event) {
            (Side::Left, Event::Insert) => self.count_left(input, false, ctx),
            (Side::Left, Event::Update) => {
                let output = self.forget_left(input);
                self.lefts.insert(
                    input,
                    LeftEntry {
                        output,
                        ..LeftEntry::default()
                    },
                );
                self.count_left(input, true, ctx);
            }
            (Side::Left, Event::Retract) => {
                if let Some(out) = self.forget_left(input) {
                    ctx.retract(out);
                }
            }
            (Side::Right, Event::Insert) => {
                let key = self.indexer.right_key(ctx.row(input));
                let matches = self.matching_lefts(input, &key, ctx);
                self.right.insert(input, key);
                for l in &matches {
                    self.attach(*l, input, ctx);
                }
                self.rights.insert(input, matches);
            }
            (Side::Right, Event::Update) => {
                let key = self.indexer.right_key(ctx.row(input));
                let current = self.matching_lefts(input, &key, ctx);
                self.right.remove(input);
                self.right.insert(input, key);
                let previous = self.rights.remove(&input).unwrap_or_default();
                for l in previous.difference(&current) {
                    self.detach(*l, input, ctx);
                }
                for l in current.difference(&previous) {
                    self.attach(*l, input, ctx);
                }
                self.rights.insert(input, current);
            }
            (Side::Right, Event::Retract) => {
                self.right.remove(input);
                for l in self.rights.remove(&input).unwrap_or_default() {
                    self.detach(l, input, ctx);
                }
            }
        }
    }

    fn matching_lefts(
        &self,
        right: TupleId,
        key: &IndexKey,
        ctx: &Ctx<'_>,
    ) -> IndexSet<TupleId> {
        let right_row = ctx.row(right);
        self.left
            .matching(key)
            .into_iter()
            .filter(|l| self.indexer.matches(ctx.row(*l), right_row))
            .collect()
    }

    /// Counts the matches of a left tuple from scratch.
    fn count_left(&mut self, input: TupleId, row_changed: bool, ctx: &mut Ctx<'_>) {
        let left_row = ctx.row(input);
        let key = self.indexer.left_key(left_row);
        let matches: IndexSet<TupleId> = self
            .right
            .matching(&key)
            .into_iter()
            .filter(|r| self.indexer.matches(left_row, ctx.row(*r)))
            .collect();
        self.left.insert(input, key);
        for r in &matches {
            self.rights.entry(*r).or_default().insert(input);
        }
        let entry = self.lefts.entry(input).or_default();
        entry.counter = ExistenceCounter {
            count: matches.len(),
        };
        entry.matches = matches;
        self.refresh_output(input, row_changed, ctx);
    }

    /// Drops a left tuple from the index and from every right match set.
    /// Returns its output tuple, if visible.
    fn forget_left(&mut self, input: TupleId) -> Option<TupleId> {
        self.left.remove(input);
        let entry = self.lefts.remove(&input)?;
        for r in entry.matches {
            if let Some(lefts) = self.rights.get_mut(&r) {
                lefts.swap_remove(&input);
            }
        }
        entry.output
    }

    fn attach(&mut self, left: TupleId, right: TupleId, ctx: &mut Ctx<'_>) {
        let Some(entry) = self.lefts.get_mut(&left) else {
            return;
        };
        entry.matches.insert(right);
        if entry.counter.increment() != Transition::Unchanged {
            self.refresh_output(left, false, ctx);
        }
    }

    fn detach(&mut self, left: TupleId, right: TupleId, ctx: &mut Ctx<'_>) {
        let Some(entry) = self.lefts.get_mut(&left) else {
            return;
        };
        entry.matches.swap_remove(&right);
        if entry.counter.decrement() != Transition::Unchanged {
            self.refresh_output(left, false, ctx);
        }
    }

    fn refresh_output(&mut self, left: TupleId, row_changed: bool, ctx: &mut Ctx<'_>) {
        let should_exist = self.should_exist;
        let Some(entry) = self.lefts.get_mut(&left) else {
            return;
        };
        let visible = !entry.counter.is_empty() == should_exist;
        match (entry.output, visible) {
            (Some(out), true) if row_changed => {
                let row = ctx.row(left).clone();
                ctx.update(out, row);
            }
            (Some(out), false) => {
                entry.output = None;
                ctx.retract(out);
            }
            (None, true) => {
                let row = ctx.row(left).clone();
                entry.output = Some(ctx.insert(row));
            }
            _ => {}
        }
    }
}
