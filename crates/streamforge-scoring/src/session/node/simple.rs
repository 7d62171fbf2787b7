//! Single-input nodes with one output per input (filter, map) or a list of
//! outputs per input (flatten).

use std::collections::HashMap;

use super::Ctx;
use crate::graph::{RowExpander, RowMapper, RowPredicate};
use crate::session::tuple::{Event, TupleId};
use crate::value::Row;

pub(crate) struct FilterNode {
    predicate: RowPredicate,
    outputs: HashMap<TupleId, TupleId>,
}

impl FilterNode {
    pub(crate) fn new(predicate: RowPredicate) -> Self {
        Self {
            predicate,
            outputs: HashMap::new(),
        }
    }

    pub(crate) fn on_event(&mut self, event: Event, input: TupleId, ctx: &mut Ctx<'_>) {
        if event == Event::Retract {
            if let Some(out) = self.outputs.remove(&input) {
                ctx.retract(out);
            }
            return;
        }
        let row = ctx.row(input).clone();
        let passes = (self.predicate)(&row);
        match (self.outputs.get(&input).copied(), passes) {
            (Some(out), true) => ctx.update(out, row),
            (Some(out), false) => {
                self.outputs.remove(&input);
                ctx.retract(out);
            }
            (None, true) => {
                let out = ctx.insert(row);
                self.outputs.insert(input, out);
            }
            (None, false) => {}
        }
    }
}

pub(crate) struct MapNode {
    mappers: Vec<RowMapper>,
    outputs: HashMap<TupleId, TupleId>,
}

impl MapNode {
    pub(crate) fn new(mappers: Vec<RowMapper>) -> Self {
        Self {
            mappers,
            outputs: HashMap::new(),
        }
    }

    pub(crate) fn on_event(&mut self, event: Event, input: TupleId, ctx: &mut Ctx<'_>) {
        match event {
            Event::Insert => {
                let row = self.map(ctx.row(input));
                let out = ctx.insert(row);
                self.outputs.insert(input, out);
            }
            Event::Update => {
                let row = self.map(ctx.row(input));
                match self.outputs.get(&input).copied() {
                    Some(out) => ctx.update(out, row),
                    None => {
                        let out = ctx.insert(row);
                        self.outputs.insert(input, out);
                    }
                }
            }
            Event::Retract => {
                if let Some(out) = self.outputs.remove(&input) {
                    ctx.retract(out);
                }
            }
        }
    }

    fn map(&self, row: &Row) -> Row {
        self.mappers.iter().map(|mapper| mapper(row)).collect()
    }
}

/// Expands the last column of each input into zero or more outputs.
///
/// Updates pair old and new outputs by position.
pub(crate) struct FlattenNode {
    expander: RowExpander,
    outputs: HashMap<TupleId, Vec<TupleId>>,
}

impl FlattenNode {
    pub(crate) fn new(expander: RowExpander) -> Self {
        Self {
            expander,
            outputs: HashMap::new(),
        }
    }

    pub(crate) fn on_event(&mut self, event: Event, input: TupleId, ctx: &mut Ctx<'_>) {
        if event == Event::Retract {
            for out in self.outputs.remove(&input).unwrap_or_default() {
                ctx.retract(out);
            }
            return;
        }
        let rows = self.expand(ctx.row(input));
        let previous = self.outputs.remove(&input).unwrap_or_default();
        let mut outputs = Vec::with_capacity(rows.len());
        let mut previous = previous.into_iter();
        for row in rows {
            match previous.next() {
                Some(out) => {
                    ctx.update(out, row);
                    outputs.push(out);
                }
                None => outputs.push(ctx.insert(row)),
            }
        }
        for stale in previous {
            ctx.retract(stale);
        }
        if !outputs.is_empty() {
            self.outputs.insert(input, outputs);
        }
    }

    fn expand(&self, row: &Row) -> Vec<Row> {
        let prefix = &row[..row.len().saturating_sub(1)];
        (self.expander)(row)
            .into_iter()
            .map(|item| {
                let mut expanded: Row = prefix.iter().cloned().collect();
                expanded.push(item);
                expanded
            })
            .collect()
    }
}
