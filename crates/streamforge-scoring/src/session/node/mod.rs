//! Runtime nodes of the constraint network.
//!
//! A node reacts to events from its parents by staging inserts, updates
//! and retracts of its own output tuples; nothing reaches its children
//! until the network settles the node's queue.

mod concat;
mod exists;
mod group;
mod index;
mod join;
mod score;
mod simple;
mod source;

#[cfg(test)]
mod tests;

pub(crate) use concat::ConcatNode;
pub(crate) use exists::ExistsNode;
pub(crate) use group::GroupNode;
pub(crate) use join::JoinNode;
pub(crate) use score::ScoreNode;
pub(crate) use simple::{FilterNode, FlattenNode, MapNode};
pub(crate) use source::SourceNode;

use streamforge_core::Score;

use super::tuple::{TupleArena, TupleId};
use crate::graph::Side;
use crate::value::Row;

/// What a node handler may touch: the arena and the node's own queue.
pub(crate) struct Ctx<'a> {
    pub(crate) tuples: &'a mut TupleArena,
    pub(crate) queue: &'a mut Vec<TupleId>,
}

impl Ctx<'_> {
    pub(crate) fn row(&self, id: TupleId) -> &Row {
        self.tuples.row(id)
    }

    pub(crate) fn insert(&mut self, row: Row) -> TupleId {
        self.tuples.stage_insert(row, self.queue)
    }

    pub(crate) fn update(&mut self, id: TupleId, row: Row) {
        self.tuples.stage_update(id, row, self.queue);
    }

    pub(crate) fn retract(&mut self, id: TupleId) {
        self.tuples.stage_retract(id, self.queue);
    }
}

/// Concatenation of a left row and a right row.
pub(crate) fn joined_row(left: &Row, right: &Row) -> Row {
    left.iter().chain(right.iter()).cloned().collect()
}

pub(crate) enum NodeKind<Sc: Score> {
    Source(SourceNode),
    ForeBridge { side: Side, width: usize },
    AftBridge { width: usize },
    Filter(FilterNode),
    Map(MapNode),
    Flatten(FlattenNode),
    Concat(ConcatNode),
    Join(JoinNode),
    Exists(ExistsNode),
    Group(GroupNode),
    Score(ScoreNode<Sc>),
}
