//! Shapes accepted by `group_by`.
//!
//! A group spec is a tuple of one to four parts: zero or more [`key`]
//! mappings followed by zero or more collectors. Each part becomes one
//! column of the grouped stream.
//!
//! ```
//! use std::sync::Arc;
//!
//! use streamforge_core::{DomainModel, PlanningId, SimpleScore};
//! use streamforge_scoring::stream::collector::{count, sum};
//! use streamforge_scoring::stream::group_spec::key;
//! use streamforge_scoring::ConstraintFactory;
//!
//! #[derive(Debug)]
//! struct Shift { id: u32, employee: u32, hours: i64 }
//!
//! impl PlanningId for Shift {
//!     type Id = u32;
//!     fn planning_id(&self) -> u32 { self.id }
//! }
//!
//! let factory = ConstraintFactory::<SimpleScore>::new(Arc::new(
//!     DomainModel::new().with_problem_fact::<Shift>(),
//! ));
//! // (employee, shift count, total hours)
//! let per_employee = factory
//!     .for_each::<Shift>()
//!     .unwrap()
//!     .group_by((key(|s: &Shift| s.employee), count(), sum(|s: &Shift| s.hours)))
//!     .unwrap();
//! # let _ = per_employee;
//! ```

use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::graph::{ClosureId, GroupKeyFn, ParamId};
use crate::row::{RowFn, RowType};
use crate::value::{ColumnValue, Key, Value};

use super::collector::{Collector, CollectorPart, CountCollector, MappedCollector};

/// Groups by the value returned by `mapping`.
pub fn key<F, K>(mapping: F) -> GroupKey<F, K> {
    GroupKey {
        mapping,
        _key: PhantomData,
    }
}

pub struct GroupKey<F, K> {
    mapping: F,
    _key: PhantomData<fn() -> K>,
}

/// One column of a grouped stream.
pub trait GroupPart<T>: Send + 'static {
    type Output: ColumnValue;

    #[doc(hidden)]
    fn into_erased(self) -> ErasedPart;
}

#[doc(hidden)]
pub enum ErasedPart {
    Key {
        mapper: GroupKeyFn,
        params: Vec<ParamId>,
    },
    Collector(CollectorPart),
}

impl<T, F, K> GroupPart<T> for GroupKey<F, K>
where
    T: RowType,
    F: RowFn<T, K>,
    K: Eq + Hash + Debug + Send + Sync + 'static,
{
    type Output = K;

    fn into_erased(self) -> ErasedPart {
        let params = vec![ParamId::Closure(ClosureId::of::<F>())];
        let mapping = self.mapping;
        let mapper: GroupKeyFn = Arc::new(move |row: &[Value]| {
            let key = Arc::new(mapping.apply(row));
            let value: Value = key.clone();
            (Key::from_arc(key), value)
        });
        ErasedPart::Key { mapper, params }
    }
}

impl<T: RowType> GroupPart<T> for CountCollector {
    type Output = usize;

    fn into_erased(self) -> ErasedPart {
        ErasedPart::Collector(<Self as Collector<T>>::into_part(self))
    }
}

impl<T, F, V, A> GroupPart<T> for MappedCollector<F, V, A>
where
    MappedCollector<F, V, A>: Collector<T>,
{
    type Output = <Self as Collector<T>>::Output;

    fn into_erased(self) -> ErasedPart {
        ErasedPart::Collector(<Self as Collector<T>>::into_part(self))
    }
}

/// A tuple of one to four [`GroupPart`]s.
pub trait GroupSpec<T> {
    type Output: RowType;

    #[doc(hidden)]
    fn into_parts(self) -> Vec<ErasedPart>;
}

macro_rules! impl_group_spec {
    ($($p:ident),+) => {
        impl<T, $($p: GroupPart<T>),+> GroupSpec<T> for ($($p,)+) {
            type Output = ($($p::Output,)+);

            #[allow(non_snake_case)]
            fn into_parts(self) -> Vec<ErasedPart> {
                let ($($p,)+) = self;
                vec![$($p.into_erased()),+]
            }
        }
    };
}

impl_group_spec!(P1);
impl_group_spec!(P1, P2);
impl_group_spec!(P1, P2, P3);
impl_group_spec!(P1, P2, P3, P4);
