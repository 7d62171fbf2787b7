//! Tuple storage and lifecycle.

use crate::value::Row;

/// Handle to a tuple slot in the session's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct TupleId(u32);

impl TupleId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Lifecycle state of a tuple.
///
/// Staging never delivers anything; a tuple's pending change is delivered
/// to the children of its node when the node's queue is settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TupleState {
    /// Created, insert pending.
    Creating,
    /// Settled and visible to children.
    Ok,
    /// Settled, update pending.
    Updating,
    /// Settled, retract pending.
    Dying,
    /// Created and retracted before settling; children never see it.
    Aborting,
    /// Retracted; the slot is freed once delivery ends.
    Dead,
}

impl TupleState {
    pub fn is_active(self) -> bool {
        matches!(
            self,
            TupleState::Creating | TupleState::Ok | TupleState::Updating
        )
    }
}

/// Event delivered to the children of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Event {
    Insert,
    Update,
    Retract,
}

#[derive(Debug)]
struct TupleSlot {
    row: Row,
    state: TupleState,
}

/// Arena of every tuple of one session, with slot reuse.
#[derive(Debug, Default)]
pub(crate) struct TupleArena {
    slots: Vec<TupleSlot>,
    free: Vec<TupleId>,
    live: usize,
}

impl TupleArena {
    pub(crate) fn row(&self, id: TupleId) -> &Row {
        &self.slots[id.index()].row
    }

    #[cfg(test)]
    pub(crate) fn state(&self, id: TupleId) -> TupleState {
        self.slots[id.index()].state
    }

    pub(crate) fn live(&self) -> usize {
        self.live
    }

    /// Creates a tuple and queues its insert.
    pub(crate) fn stage_insert(&mut self, row: Row, queue: &mut Vec<TupleId>) -> TupleId {
        let slot = TupleSlot {
            row,
            state: TupleState::Creating,
        };
        let id = match self.free.pop() {
            Some(id) => {
                self.slots[id.index()] = slot;
                id
            }
            None => {
                let id = TupleId(self.slots.len() as u32);
                self.slots.push(slot);
                id
            }
        };
        self.live += 1;
        queue.push(id);
        id
    }

    /// Replaces a tuple's row and queues an update unless a change is
    /// already pending.
    pub(crate) fn stage_update(&mut self, id: TupleId, row: Row, queue: &mut Vec<TupleId>) {
        let slot = &mut self.slots[id.index()];
        slot.row = row;
        match slot.state {
            TupleState::Ok => {
                slot.state = TupleState::Updating;
                queue.push(id);
            }
            TupleState::Creating | TupleState::Updating => {}
            state => debug_assert!(false, "update of a {:?} tuple", state),
        }
    }

    /// Queues a tuple's retract; a tuple never settled is aborted instead.
    pub(crate) fn stage_retract(&mut self, id: TupleId, queue: &mut Vec<TupleId>) {
        let slot = &mut self.slots[id.index()];
        match slot.state {
            TupleState::Ok => {
                slot.state = TupleState::Dying;
                queue.push(id);
            }
            TupleState::Updating => slot.state = TupleState::Dying,
            TupleState::Creating => slot.state = TupleState::Aborting,
            state => debug_assert!(false, "retract of a {:?} tuple", state),
        }
    }

    /// Moves a queued tuple past its pending change and returns the event
    /// to deliver, if any. Aborted tuples are freed here.
    pub(crate) fn begin_propagation(&mut self, id: TupleId) -> Option<Event> {
        let slot = &mut self.slots[id.index()];
        match slot.state {
            TupleState::Creating => {
                slot.state = TupleState::Ok;
                Some(Event::Insert)
            }
            TupleState::Updating => {
                slot.state = TupleState::Ok;
                Some(Event::Update)
            }
            TupleState::Dying => {
                slot.state = TupleState::Dead;
                Some(Event::Retract)
            }
            TupleState::Aborting => {
                self.free(id);
                None
            }
            TupleState::Ok | TupleState::Dead => None,
        }
    }

    pub(crate) fn free(&mut self, id: TupleId) {
        let slot = &mut self.slots[id.index()];
        slot.state = TupleState::Dead;
        slot.row.clear();
        self.live -= 1;
        self.free.push(id);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use smallvec::smallvec;

    use super::*;
    use crate::value::Value;

    fn row(n: i32) -> Row {
        smallvec![Arc::new(n) as Value]
    }

    #[test]
    fn test_insert_then_settle() {
        let mut arena = TupleArena::default();
        let mut queue = Vec::new();
        let id = arena.stage_insert(row(1), &mut queue);

        assert_eq!(queue, vec![id]);
        assert_eq!(arena.state(id), TupleState::Creating);
        assert_eq!(arena.begin_propagation(id), Some(Event::Insert));
        assert_eq!(arena.state(id), TupleState::Ok);
    }

    #[test]
    fn test_repeated_updates_queue_once() {
        let mut arena = TupleArena::default();
        let mut queue = Vec::new();
        let id = arena.stage_insert(row(1), &mut queue);
        arena.begin_propagation(id);
        queue.clear();

        arena.stage_update(id, row(2), &mut queue);
        arena.stage_update(id, row(3), &mut queue);
        assert_eq!(queue.len(), 1);
        assert_eq!(arena.state(id), TupleState::Updating);
        assert_eq!(arena.begin_propagation(id), Some(Event::Update));
        assert_eq!(*crate::value::column::<i32>(arena.row(id), 0), 3);
    }

    #[test]
    fn test_create_then_retract_aborts() {
        let mut arena = TupleArena::default();
        let mut queue = Vec::new();
        let id = arena.stage_insert(row(1), &mut queue);
        arena.stage_retract(id, &mut queue);

        assert_eq!(queue.len(), 1);
        assert_eq!(arena.state(id), TupleState::Aborting);
        assert_eq!(arena.begin_propagation(id), None);
        assert_eq!(arena.live(), 0);
    }

    #[test]
    fn test_update_then_retract_dies() {
        let mut arena = TupleArena::default();
        let mut queue = Vec::new();
        let id = arena.stage_insert(row(1), &mut queue);
        arena.begin_propagation(id);
        queue.clear();

        arena.stage_update(id, row(2), &mut queue);
        arena.stage_retract(id, &mut queue);
        assert_eq!(queue.len(), 1);
        assert_eq!(arena.begin_propagation(id), Some(Event::Retract));
        assert!(!arena.state(id).is_active());
    }

    #[test]
    fn test_slots_are_reused() {
        let mut arena = TupleArena::default();
        let mut queue = Vec::new();
        let first = arena.stage_insert(row(1), &mut queue);
        arena.begin_propagation(first);
        arena.stage_retract(first, &mut queue);
        arena.begin_propagation(first);
        arena.free(first);

        let second = arena.stage_insert(row(2), &mut queue);
        assert_eq!(first, second);
        assert_eq!(arena.live(), 1);
    }
}
