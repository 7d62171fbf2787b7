use std::collections::HashMap;
use std::sync::Arc;

use smallvec::SmallVec;

use super::Ctx;
use crate::graph::{group_key, GroupKeyFn};
use crate::session::tuple::{Event, TupleId};
use crate::stream::collector::{DynAccumulator, DynCollector};
use crate::value::{GroupKey, Row, Value};

struct Group {
    key_values: SmallVec<[Value; 4]>,
    size: usize,
    accumulators: Vec<Box<dyn DynAccumulator>>,
    output: Option<TupleId>,
}

/// What an input contributed, so it can be undone exactly.
struct GroupInput {
    key: GroupKey,
    values: Vec<Value>,
}

/// Groups inputs by key and folds each group through its collectors.
///
/// A group emits one tuple, the key columns followed by the collector
/// results, while it has at least one member.
pub(crate) struct GroupNode {
    keys: Vec<GroupKeyFn>,
    collectors: Vec<Arc<dyn DynCollector>>,
    groups: HashMap<GroupKey, Group>,
    inputs: HashMap<TupleId, GroupInput>,
    // reset accumulators of emptied groups, reused by new ones
    spare: Vec<Vec<Box<dyn DynAccumulator>>>,
}

impl GroupNode {
    pub(crate) fn new(keys: Vec<GroupKeyFn>, collectors: Vec<Arc<dyn DynCollector>>) -> Self {
        Self {
            keys,
            collectors,
            groups: HashMap::new(),
            inputs: HashMap::new(),
            spare: Vec::new(),
        }
    }

    pub(crate) fn on_event(&mut self, event: Event, input: TupleId, ctx: &mut Ctx<'_>) {
        match event {
            Event::Insert => {
                let key = self.fold_in(input, ctx);
                self.refresh(&key, ctx);
            }
            Event::Update => {
                let Some(previous) = self.inputs.remove(&input) else {
                    let key = self.fold_in(input, ctx);
                    self.refresh(&key, ctx);
                    return;
                };
                self.fold_out(&previous);
                let key = self.fold_in(input, ctx);
                if key != previous.key {
                    self.refresh(&previous.key, ctx);
                }
                self.refresh(&key, ctx);
            }
            Event::Retract => {
                if let Some(previous) = self.inputs.remove(&input) {
                    self.fold_out(&previous);
                    self.refresh(&previous.key, ctx);
                }
            }
        }
    }

    /// Adds an input to its group, creating the group when needed.
    fn fold_in(&mut self, input: TupleId, ctx: &Ctx<'_>) -> GroupKey {
        let row = ctx.row(input);
        let (key, key_values) = group_key(&self.keys, row);
        let values: Vec<Value> = self
            .collectors
            .iter()
            .map(|collector| collector.extract(row))
            .collect();
        let collectors = &self.collectors;
        let spare = &mut self.spare;
        let group = self.groups.entry(key.clone()).or_insert_with(|| Group {
            key_values,
            size: 0,
            accumulators: spare
                .pop()
                .unwrap_or_else(|| collectors.iter().map(|c| c.create_accumulator()).collect()),
            output: None,
        });
        group.size += 1;
        for (accumulator, value) in group.accumulators.iter_mut().zip(&values) {
            accumulator.accumulate(value);
        }
        self.inputs.insert(
            input,
            GroupInput {
                key: key.clone(),
                values,
            },
        );
        key
    }

    fn fold_out(&mut self, previous: &GroupInput) {
        let Some(group) = self.groups.get_mut(&previous.key) else {
            debug_assert!(false, "input of a missing group");
            return;
        };
        group.size -= 1;
        for (accumulator, value) in group.accumulators.iter_mut().zip(&previous.values) {
            accumulator.retract(value);
        }
    }

    /// Brings a group's output tuple in line with its members.
    fn refresh(&mut self, key: &GroupKey, ctx: &mut Ctx<'_>) {
        let Some(group) = self.groups.get_mut(key) else {
            return;
        };
        if group.size == 0 {
            if let Some(out) = group.output {
                ctx.retract(out);
            }
            if let Some(mut emptied) = self.groups.remove(key) {
                for accumulator in &mut emptied.accumulators {
                    accumulator.reset();
                }
                self.spare.push(emptied.accumulators);
            }
            return;
        }
        let row: Row = group
            .key_values
            .iter()
            .cloned()
            .chain(group.accumulators.iter().map(|a| a.finish()))
            .collect();
        match group.output {
            Some(out) => ctx.update(out, row),
            None => group.output = Some(ctx.insert(row)),
        }
    }
}
