//! Typed handle to a declaration in a constraint factory's graph.

use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

use streamforge_core::{Fact, ImpactType, Result, Score};

use super::builder::ConstraintBuilder;
use super::collector::Collector;
use super::factory::ConstraintFactory;
use super::group_spec::{key, ErasedPart, GroupKey, GroupPart, GroupSpec};
use super::joiner::Joiner;
use crate::graph::{ClosureId, DeclId, Declaration, GraphBuilder, ParamId, RowMapper, Side};
use crate::row::{Append, RowType};
use crate::value::{ColumnKey, ColumnValue, Key, Value};

/// A stream of tuples of shape `T`.
///
/// Streams are cheap copyable handles; every operation declares (or reuses)
/// a node in the factory's graph and returns a handle to it.
pub struct ConstraintStream<'f, T, Sc: Score> {
    pub(crate) factory: &'f ConstraintFactory<Sc>,
    pub(crate) decl: DeclId,
    _row: PhantomData<fn() -> T>,
}

impl<T, Sc: Score> Clone for ConstraintStream<'_, T, Sc> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, Sc: Score> Copy for ConstraintStream<'_, T, Sc> {}

impl<T, Sc: Score> std::fmt::Debug for ConstraintStream<'_, T, Sc> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstraintStream")
            .field("declaration", &self.decl)
            .field("row", &std::any::type_name::<T>())
            .finish()
    }
}

impl<'f, T: RowType, Sc: Score> ConstraintStream<'f, T, Sc> {
    pub(crate) fn new(factory: &'f ConstraintFactory<Sc>, decl: DeclId) -> Self {
        Self {
            factory,
            decl,
            _row: PhantomData,
        }
    }

    /// The declaration this stream reads from; equal ids mean shared nodes.
    pub fn declaration_id(&self) -> DeclId {
        self.decl
    }

    fn derive<U: RowType>(
        self,
        declare: impl FnOnce(&mut GraphBuilder<Sc>, DeclId) -> Result<DeclId>,
    ) -> Result<ConstraintStream<'f, U, Sc>> {
        let parent = self.decl;
        let decl = self.factory.with_graph(|graph| declare(graph, parent))?;
        Ok(ConstraintStream::new(self.factory, decl))
    }

    /// Pairs each tuple with every `B` of `other` matching `joiner`.
    pub fn join<B, J>(
        self,
        other: ConstraintStream<'f, (B,), Sc>,
        joiner: J,
    ) -> Result<ConstraintStream<'f, T::Output, Sc>>
    where
        B: ColumnValue,
        T: Append<B>,
        J: Joiner<T, B>,
    {
        self.factory.check_same(other.factory)?;
        let parts = joiner.into_parts();
        let right = other.decl;
        self.derive(|graph, left| {
            let left = graph.fore_bridge(left, Side::Left)?;
            let right = graph.fore_bridge(right, Side::Right)?;
            graph.share_bridged(Declaration::join(left, right, parts, T::WIDTH + 1))
        })
    }

    /// Keeps tuples for which at least one `B` of `other` matches `joiner`.
    pub fn if_exists<B, J>(self, other: ConstraintStream<'f, (B,), Sc>, joiner: J) -> Result<Self>
    where
        B: ColumnValue,
        J: Joiner<T, B>,
    {
        self.existence(other, joiner, true)
    }

    /// Keeps tuples for which no `B` of `other` matches `joiner`.
    pub fn if_not_exists<B, J>(
        self,
        other: ConstraintStream<'f, (B,), Sc>,
        joiner: J,
    ) -> Result<Self>
    where
        B: ColumnValue,
        J: Joiner<T, B>,
    {
        self.existence(other, joiner, false)
    }

    /// [`if_exists`](Self::if_exists) against every assigned `B`.
    pub fn if_exists_other<B, J>(self, joiner: J) -> Result<Self>
    where
        B: Fact,
        J: Joiner<T, B>,
    {
        let other = self.factory.for_each::<B>()?;
        self.existence(other, joiner, true)
    }

    /// [`if_not_exists`](Self::if_not_exists) against every assigned `B`.
    pub fn if_not_exists_other<B, J>(self, joiner: J) -> Result<Self>
    where
        B: Fact,
        J: Joiner<T, B>,
    {
        let other = self.factory.for_each::<B>()?;
        self.existence(other, joiner, false)
    }

    pub fn if_exists_other_including_unassigned<B, J>(self, joiner: J) -> Result<Self>
    where
        B: Fact,
        J: Joiner<T, B>,
    {
        let other = self.factory.for_each_including_unassigned::<B>()?;
        self.existence(other, joiner, true)
    }

    pub fn if_not_exists_other_including_unassigned<B, J>(self, joiner: J) -> Result<Self>
    where
        B: Fact,
        J: Joiner<T, B>,
    {
        let other = self.factory.for_each_including_unassigned::<B>()?;
        self.existence(other, joiner, false)
    }

    fn existence<B, J>(
        self,
        other: ConstraintStream<'f, (B,), Sc>,
        joiner: J,
        should_exist: bool,
    ) -> Result<Self>
    where
        B: ColumnValue,
        J: Joiner<T, B>,
    {
        self.factory.check_same(other.factory)?;
        let parts = joiner.into_parts();
        let right = other.decl;
        self.derive(|graph, left| {
            let left = graph.fore_bridge(left, Side::Left)?;
            let right = graph.fore_bridge(right, Side::Right)?;
            graph.share_bridged(Declaration::exists(left, right, should_exist, parts, T::WIDTH))
        })
    }

    /// Groups tuples by the keys of `spec` and collects each group.
    ///
    /// Without keys, a single group covers every tuple; it only exists
    /// while at least one tuple does.
    pub fn group_by<G: GroupSpec<T>>(self, spec: G) -> Result<ConstraintStream<'f, G::Output, Sc>> {
        let declaration = Declaration::group(self.decl, spec.into_parts())?;
        self.derive(|graph, _| graph.share_bridged(declaration))
    }

    /// Shorthand for `group_by((key(mapping),))`.
    pub fn group_by_key<F, K>(self, mapping: F) -> Result<ConstraintStream<'f, (K,), Sc>>
    where
        GroupKey<F, K>: GroupPart<T, Output = K>,
    {
        self.group_by((key(mapping),))
    }

    /// Shorthand for `group_by((collector,))`: one global group.
    pub fn group_by_collect<C>(
        self,
        collector: C,
    ) -> Result<ConstraintStream<'f, (<C as GroupPart<T>>::Output,), Sc>>
    where
        C: Collector<T> + GroupPart<T>,
    {
        self.group_by((collector,))
    }

    pub(crate) fn distinct_by(self, parts: Vec<ErasedPart>) -> Result<Self> {
        let declaration = Declaration::group(self.decl, parts)?;
        self.derive(|graph, _| graph.share_bridged(declaration))
    }

    /// Every tuple of this stream followed by every tuple of `other`.
    ///
    /// A tuple present in both appears twice.
    pub fn concat(self, other: Self) -> Result<Self> {
        self.factory.check_same(other.factory)?;
        let right = other.decl;
        self.derive(|graph, left| {
            let left = graph.fore_bridge(left, Side::Left)?;
            let right = graph.fore_bridge(right, Side::Right)?;
            graph.share_bridged(Declaration::concat(left, right, T::WIDTH))
        })
    }

    pub(crate) fn map_columns<U: RowType>(
        self,
        mappers: Vec<(RowMapper, ClosureId)>,
    ) -> Result<ConstraintStream<'f, U, Sc>> {
        self.derive(|graph, parent| graph.share_bridged(Declaration::map(parent, mappers)))
    }

    /// Penalizes every tuple by `weight`.
    pub fn penalize(self, weight: Sc) -> ConstraintBuilder<'f, T, Sc> {
        ConstraintBuilder::new(self, ImpactType::Penalty, weight, None)
    }

    /// Rewards every tuple by `weight`.
    pub fn reward(self, weight: Sc) -> ConstraintBuilder<'f, T, Sc> {
        ConstraintBuilder::new(self, ImpactType::Reward, weight, None)
    }
}

/// Group key of column `index` compared by value, for `distinct`.
pub(crate) fn distinct_column<A: ColumnValue + Eq + Hash>(index: usize) -> ErasedPart {
    ErasedPart::Key {
        mapper: Arc::new(move |row: &[Value]| {
            let value = row[index].clone();
            (Key::new(ColumnKey::<A>::new(value.clone())), value)
        }),
        params: vec![ParamId::Label("distinct"), ParamId::Index(index)],
    }
}
