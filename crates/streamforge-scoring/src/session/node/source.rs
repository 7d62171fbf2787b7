use std::any::TypeId;
use std::collections::HashMap;

use smallvec::smallvec;
use streamforge_core::FactClass;

use super::Ctx;
use crate::value::{ColumnValue, Key, Value};

/// Entry point of one fact type.
///
/// With a class attached, only facts it reports as assigned produce a
/// tuple; an update that changes assignment inserts or retracts.
pub(crate) struct SourceNode {
    type_id: TypeId,
    assigned_only: Option<FactClass>,
    outputs: HashMap<Key, super::TupleId>,
}

impl SourceNode {
    pub(crate) fn new(type_id: TypeId, assigned_only: Option<FactClass>) -> Self {
        Self {
            type_id,
            assigned_only,
            outputs: HashMap::new(),
        }
    }

    pub(crate) fn type_id(&self) -> TypeId {
        self.type_id
    }

    fn accepts(&self, value: &Value) -> bool {
        match &self.assigned_only {
            Some(class) => {
                let inner: &dyn ColumnValue = &**value;
                class.is_assigned(inner.as_any())
            }
            None => true,
        }
    }

    pub(crate) fn insert(&mut self, key: &Key, value: &Value, ctx: &mut Ctx<'_>) {
        if self.accepts(value) {
            let id = ctx.insert(smallvec![value.clone()]);
            self.outputs.insert(key.clone(), id);
        }
    }

    pub(crate) fn update(&mut self, key: &Key, value: &Value, ctx: &mut Ctx<'_>) {
        let accepted = self.accepts(value);
        match (self.outputs.get(key).copied(), accepted) {
            (Some(id), true) => ctx.update(id, smallvec![value.clone()]),
            (Some(id), false) => {
                self.outputs.remove(key);
                ctx.retract(id);
            }
            (None, true) => {
                let id = ctx.insert(smallvec![value.clone()]);
                self.outputs.insert(key.clone(), id);
            }
            (None, false) => {}
        }
    }

    pub(crate) fn retract(&mut self, key: &Key, ctx: &mut Ctx<'_>) {
        if let Some(id) = self.outputs.remove(key) {
            ctx.retract(id);
        }
    }
}
