//! Type-erased column values and hashable keys.
//!
//! Tuples flowing through the runtime network are rows of [`Value`]s. Facts
//! enter as the caller's own `Arc<T>`; derived columns (group keys,
//! collector results, mapped values) are allocated once when produced.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

use smallvec::SmallVec;
use streamforge_core::Fact;

/// Any value that can sit in a tuple column.
///
/// Implemented for every `Debug + Send + Sync + 'static` type.
pub trait ColumnValue: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn column_type_name(&self) -> &'static str;
}

impl<T: Any + fmt::Debug + Send + Sync> ColumnValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn column_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// A shared, type-erased column value.
pub type Value = Arc<dyn ColumnValue>;

/// One tuple row; width 1 to 4.
pub(crate) type Row = SmallVec<[Value; 4]>;

/// Index key of a join or existence node: one entry per equality joiner.
pub(crate) type IndexKey = SmallVec<[Key; 2]>;

/// Group key of a group-by node: one entry per key mapping, empty for the
/// single global group.
pub(crate) type GroupKey = SmallVec<[Key; 4]>;

pub(crate) fn downcast<T: 'static>(value: &Value) -> Option<&T> {
    let inner: &dyn ColumnValue = &**value;
    inner.as_any().downcast_ref::<T>()
}

pub(crate) fn value_type_name(value: &Value) -> &'static str {
    let inner: &dyn ColumnValue = &**value;
    inner.column_type_name()
}

/// Typed access to a tuple column.
///
/// Column types are fixed by the typed stream API, so a mismatch is an
/// engine defect and panics; the panic is reported as an evaluation error by
/// the session.
pub(crate) fn column<T: 'static>(row: &[Value], index: usize) -> &T {
    match row.get(index).and_then(downcast::<T>) {
        Some(value) => value,
        None => panic!(
            "column {} of a {}-wide tuple is not a {}",
            index,
            row.len(),
            std::any::type_name::<T>()
        ),
    }
}

pub(crate) fn expect_value<T: 'static>(value: &Value) -> &T {
    match downcast::<T>(value) {
        Some(value) => value,
        None => panic!(
            "collected value {:?} is not a {}",
            value,
            std::any::type_name::<T>()
        ),
    }
}

/// Object-safe equality and hashing.
pub trait DynKey: fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn dyn_eq(&self, other: &dyn DynKey) -> bool;
    fn dyn_hash(&self, state: &mut dyn Hasher);
}

impl<T: Eq + Hash + fmt::Debug + Send + Sync + 'static> DynKey for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn DynKey) -> bool {
        other.as_any().downcast_ref::<T>().is_some_and(|o| o == self)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        TypeId::of::<T>().hash(&mut state);
        self.hash(&mut state);
    }
}

/// A hashable, type-erased key compared by value equality.
#[derive(Clone)]
pub struct Key(Arc<dyn DynKey>);

impl Key {
    pub fn new<K: Eq + Hash + fmt::Debug + Send + Sync + 'static>(key: K) -> Self {
        Key(Arc::new(key))
    }

    pub(crate) fn from_arc<K: Eq + Hash + fmt::Debug + Send + Sync + 'static>(key: Arc<K>) -> Self {
        Key(key)
    }

    pub fn downcast_ref<K: 'static>(&self) -> Option<&K> {
        let inner: &dyn DynKey = &*self.0;
        inner.as_any().downcast_ref::<K>()
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        let inner: &dyn DynKey = &*self.0;
        inner.dyn_eq(&*other.0)
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let inner: &dyn DynKey = &*self.0;
        inner.dyn_hash(state);
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

/// Identity of a fact in working memory: its type and planning id.
pub(crate) fn fact_key<T: Fact>(fact: &T) -> Key {
    Key::new((TypeId::of::<T>(), fact.planning_id()))
}

/// Value equality of one column of type `A`, used by `distinct`.
pub(crate) struct ColumnKey<A> {
    value: Value,
    _column: PhantomData<fn() -> A>,
}

impl<A: 'static> ColumnKey<A> {
    pub(crate) fn new(value: Value) -> Self {
        Self {
            value,
            _column: PhantomData,
        }
    }

    fn get(&self) -> &A {
        expect_value::<A>(&self.value)
    }
}

impl<A: Eq + 'static> PartialEq for ColumnKey<A> {
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}

impl<A: Eq + 'static> Eq for ColumnKey<A> {}

impl<A: Hash + 'static> Hash for ColumnKey<A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.get().hash(state);
    }
}

impl<A> fmt::Debug for ColumnKey<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.value, f)
    }
}
