use std::collections::HashMap;

use super::Ctx;
use crate::graph::Side;
use crate::session::tuple::{Event, TupleId};

/// Passes tuples of both parents through unchanged.
pub(crate) struct ConcatNode {
    outputs: HashMap<(Side, TupleId), TupleId>,
}

impl ConcatNode {
    pub(crate) fn new() -> Self {
        Self {
            outputs: HashMap::new(),
        }
    }

    pub(crate) fn on_event(&mut self, side: Side, event: Event, input: TupleId, ctx: &mut Ctx<'_>) {
        match event {
            Event::Insert => {
                let row = ctx.row(input).clone();
                let out = ctx.insert(row);
                self.outputs.insert((side, input), out);
            }
            Event::Update => {
                let row = ctx.row(input).clone();
                match self.outputs.get(&(side, input)).copied() {
                    Some(out) => ctx.update(out, row),
                    None => {
                        let out = ctx.insert(row);
                        self.outputs.insert((side, input), out);
                    }
                }
            }
            Event::Retract => {
                if let Some(out) = self.outputs.remove(&(side, input)) {
                    ctx.retract(out);
                }
            }
        }
    }
}
