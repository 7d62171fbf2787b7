//! Arity-specific stream and builder methods.
//!
//! Methods taking user closures over the columns of a tuple are generated
//! per tuple shape, so closures like `|a: &A, b: &B| ..` need no extra
//! annotations.

use std::hash::Hash;
use std::sync::Arc;

use streamforge_core::{ImpactType, MatchWeight, Result, Score};

use super::builder::ConstraintBuilder;
use super::constraint_stream::distinct_column;
use super::ConstraintStream;
use crate::api::analysis::{ConstraintJustification, EntityRef};
use crate::graph::{
    ClosureId, Declaration, Indicter, Justifier, RowExpander, RowMapper, RowPredicate, Weigher,
};
use crate::row::{RowFn, RowType};
use crate::value::{column, ColumnValue, Value};

fn erase_mapper<T, R, M>(mapping: M) -> (RowMapper, ClosureId)
where
    T: RowType,
    R: ColumnValue,
    M: RowFn<T, R>,
{
    let closure = ClosureId::of::<M>();
    let mapper: RowMapper = Arc::new(move |row: &[Value]| Arc::new(mapping.apply(row)) as Value);
    (mapper, closure)
}

fn erase_predicate<T, P>(predicate: P) -> (RowPredicate, ClosureId)
where
    T: RowType,
    P: RowFn<T, bool>,
{
    let closure = ClosureId::of::<P>();
    let predicate: RowPredicate = Arc::new(move |row: &[Value]| predicate.apply(row));
    (predicate, closure)
}

fn erase_weigher<T, W, F>(weigher: F) -> Weigher
where
    T: RowType,
    W: Into<MatchWeight>,
    F: RowFn<T, W>,
{
    Arc::new(move |row: &[Value]| -> MatchWeight { weigher.apply(row).into() })
}

impl<'f, T: RowType, Sc: Score> ConstraintStream<'f, T, Sc> {
    fn filter_erased(self, predicate: RowPredicate, closure: ClosureId) -> Result<Self> {
        let parent = self.decl;
        let decl = self.factory.with_graph(|graph| {
            graph.share_plain(Declaration::filter(parent, predicate, closure, T::WIDTH))
        })?;
        Ok(ConstraintStream::new(self.factory, decl))
    }

    fn flatten_erased<U: RowType>(
        self,
        expander: RowExpander,
        closure: ClosureId,
    ) -> Result<ConstraintStream<'f, U, Sc>> {
        let parent = self.decl;
        let decl = self.factory.with_graph(|graph| {
            graph.share_bridged(Declaration::flatten_last(parent, expander, closure, T::WIDTH))
        })?;
        Ok(ConstraintStream::new(self.factory, decl))
    }
}

macro_rules! impl_arity_stream {
    (columns = ($($t:ident => $i:tt),+); prefix = ($($p:ident),*); last = $last:ident) => {
        impl<'f, $($t: ColumnValue,)+ Sc: Score> ConstraintStream<'f, ($($t,)+), Sc> {
            /// Keeps the tuples matching `predicate`.
            pub fn filter<P>(self, predicate: P) -> Result<Self>
            where
                P: Fn($(&$t),+) -> bool + Send + Sync + 'static,
            {
                let (predicate, closure) = erase_predicate::<($($t,)+), P>(predicate);
                self.filter_erased(predicate, closure)
            }

            /// Maps each tuple to a single column.
            pub fn map<R, M>(self, mapping: M) -> Result<ConstraintStream<'f, (R,), Sc>>
            where
                R: ColumnValue,
                M: Fn($(&$t),+) -> R + Send + Sync + 'static,
            {
                self.map_columns(vec![erase_mapper::<($($t,)+), R, M>(mapping)])
            }

            /// Maps each tuple to two columns.
            pub fn map2<R1, R2, M1, M2>(
                self,
                first: M1,
                second: M2,
            ) -> Result<ConstraintStream<'f, (R1, R2), Sc>>
            where
                R1: ColumnValue,
                R2: ColumnValue,
                M1: Fn($(&$t),+) -> R1 + Send + Sync + 'static,
                M2: Fn($(&$t),+) -> R2 + Send + Sync + 'static,
            {
                self.map_columns(vec![
                    erase_mapper::<($($t,)+), R1, M1>(first),
                    erase_mapper::<($($t,)+), R2, M2>(second),
                ])
            }

            /// Maps each tuple to three columns.
            pub fn map3<R1, R2, R3, M1, M2, M3>(
                self,
                first: M1,
                second: M2,
                third: M3,
            ) -> Result<ConstraintStream<'f, (R1, R2, R3), Sc>>
            where
                R1: ColumnValue,
                R2: ColumnValue,
                R3: ColumnValue,
                M1: Fn($(&$t),+) -> R1 + Send + Sync + 'static,
                M2: Fn($(&$t),+) -> R2 + Send + Sync + 'static,
                M3: Fn($(&$t),+) -> R3 + Send + Sync + 'static,
            {
                self.map_columns(vec![
                    erase_mapper::<($($t,)+), R1, M1>(first),
                    erase_mapper::<($($t,)+), R2, M2>(second),
                    erase_mapper::<($($t,)+), R3, M3>(third),
                ])
            }

            /// Maps each tuple to four columns.
            pub fn map4<R1, R2, R3, R4, M1, M2, M3, M4>(
                self,
                first: M1,
                second: M2,
                third: M3,
                fourth: M4,
            ) -> Result<ConstraintStream<'f, (R1, R2, R3, R4), Sc>>
            where
                R1: ColumnValue,
                R2: ColumnValue,
                R3: ColumnValue,
                R4: ColumnValue,
                M1: Fn($(&$t),+) -> R1 + Send + Sync + 'static,
                M2: Fn($(&$t),+) -> R2 + Send + Sync + 'static,
                M3: Fn($(&$t),+) -> R3 + Send + Sync + 'static,
                M4: Fn($(&$t),+) -> R4 + Send + Sync + 'static,
            {
                self.map_columns(vec![
                    erase_mapper::<($($t,)+), R1, M1>(first),
                    erase_mapper::<($($t,)+), R2, M2>(second),
                    erase_mapper::<($($t,)+), R3, M3>(third),
                    erase_mapper::<($($t,)+), R4, M4>(fourth),
                ])
            }

            /// Replaces the last column with each item `expand` returns for it.
            ///
            /// A tuple whose last column expands to nothing disappears.
            pub fn flatten_last<I, R, F>(
                self,
                expand: F,
            ) -> Result<ConstraintStream<'f, ($($p,)* R,), Sc>>
            where
                R: ColumnValue,
                I: IntoIterator<Item = R>,
                F: Fn(&$last) -> I + Send + Sync + 'static,
            {
                let closure = ClosureId::of::<F>();
                let last = <($($t,)+) as RowType>::WIDTH - 1;
                let expander: RowExpander = Arc::new(move |row: &[Value]| {
                    expand(column::<$last>(row, last))
                        .into_iter()
                        .map(|item| Arc::new(item) as Value)
                        .collect()
                });
                self.flatten_erased(expander, closure)
            }

            /// Removes duplicate tuples, comparing columns by value.
            pub fn distinct(self) -> Result<Self>
            where
                $($t: Eq + Hash,)+
            {
                self.distinct_by(vec![$(distinct_column::<$t>($i)),+])
            }

            /// Penalizes every tuple by `weight` times its match weight.
            pub fn penalize_weighted<W, F>(
                self,
                weight: Sc,
                weigher: F,
            ) -> ConstraintBuilder<'f, ($($t,)+), Sc>
            where
                W: Into<MatchWeight>,
                F: Fn($(&$t),+) -> W + Send + Sync + 'static,
            {
                let weigher = erase_weigher::<($($t,)+), W, F>(weigher);
                ConstraintBuilder::new(self, ImpactType::Penalty, weight, Some(weigher))
            }

            /// Rewards every tuple by `weight` times its match weight.
            pub fn reward_weighted<W, F>(
                self,
                weight: Sc,
                weigher: F,
            ) -> ConstraintBuilder<'f, ($($t,)+), Sc>
            where
                W: Into<MatchWeight>,
                F: Fn($(&$t),+) -> W + Send + Sync + 'static,
            {
                let weigher = erase_weigher::<($($t,)+), W, F>(weigher);
                ConstraintBuilder::new(self, ImpactType::Reward, weight, Some(weigher))
            }

            /// Impacts every tuple by `weight` times a signed match weight:
            /// positive match weights reward, negative ones penalize.
            pub fn impact_weighted<W, F>(
                self,
                weight: Sc,
                weigher: F,
            ) -> ConstraintBuilder<'f, ($($t,)+), Sc>
            where
                W: Into<MatchWeight>,
                F: Fn($(&$t),+) -> W + Send + Sync + 'static,
            {
                self.reward_weighted(weight, weigher)
            }
        }

        impl<'f, $($t: ColumnValue,)+ Sc: Score> ConstraintBuilder<'f, ($($t,)+), Sc> {
            /// Replaces the default justification (every column of the match).
            pub fn justify_with<F>(mut self, justify: F) -> Self
            where
                F: Fn($(&$t,)+ &Sc) -> ConstraintJustification + Send + Sync + 'static,
            {
                let justifier: Justifier<Sc> = Arc::new(move |row: &[Value], score: &Sc| {
                    justify($(column::<$t>(row, $i),)+ score)
                });
                self.justifier = Some(justifier);
                self
            }

            /// Replaces the default indicted objects (every column of the match).
            pub fn indict_with<F>(mut self, indict: F) -> Self
            where
                F: Fn($(&$t),+) -> Vec<EntityRef> + Send + Sync + 'static,
            {
                let indicter: Indicter = Arc::new(move |row: &[Value]| {
                    indict($(column::<$t>(row, $i)),+)
                });
                self.indicter = Some(indicter);
                self
            }
        }
    };
}

impl_arity_stream!(columns = (A => 0); prefix = (); last = A);
impl_arity_stream!(columns = (A => 0, B => 1); prefix = (A); last = B);
impl_arity_stream!(columns = (A => 0, B => 1, C => 2); prefix = (A, B); last = C);
impl_arity_stream!(columns = (A => 0, B => 1, C => 2, D => 3); prefix = (A, B, C); last = D);
