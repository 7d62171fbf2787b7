// Constraint factory: entry point of the fluent constraint API.

use std::any::TypeId;
use std::cell::RefCell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use streamforge_core::{DomainModel, Fact, Result, Score, StreamForgeError};

use super::joiner::{less_than, AndJoiner, Joiner};
use super::{Constraint, ConstraintStream};
use crate::api::weight_overrides::WeightProvider;
use crate::graph::{Declaration, DeclarationGraph, GraphBuilder};

static NEXT_FACTORY_ID: AtomicUsize = AtomicUsize::new(0);

// Builds the declaration graph of one constraint provider.
//
// Every stream created from the same factory shares nodes with every other
// stream of that factory. Streams of different factories cannot be combined.
//
// # Example
//
// ```
// use std::sync::Arc;
//
// use streamforge_core::{DomainModel, PlanningId, SimpleScore};
// use streamforge_scoring::ConstraintFactory;
//
// #[derive(Debug)]
// struct Room { id: char }
//
// impl PlanningId for Room {
//     type Id = char;
//     fn planning_id(&self) -> char { self.id }
// }
//
// let factory = ConstraintFactory::<SimpleScore>::new(Arc::new(
//     DomainModel::new().with_problem_fact::<Room>(),
// ));
// let a = factory.for_each::<Room>().unwrap();
// let b = factory.for_each::<Room>().unwrap();
// assert_eq!(a.declaration_id(), b.declaration_id());
// ```
pub struct ConstraintFactory<Sc: Score> {
    id: usize,
    domain: Arc<DomainModel>,
    graph: RefCell<GraphBuilder<Sc>>,
}

impl<Sc: Score> ConstraintFactory<Sc> {
    pub fn new(domain: Arc<DomainModel>) -> Self {
        Self {
            id: NEXT_FACTORY_ID.fetch_add(1, Ordering::Relaxed),
            domain,
            graph: RefCell::new(GraphBuilder::new()),
        }
    }

    pub fn domain(&self) -> &DomainModel {
        &self.domain
    }

    // Number of distinct declarations created so far.
    pub fn declaration_count(&self) -> usize {
        self.graph.borrow().len()
    }

    // Every fully assigned `A` in working memory.
    //
    // Planning entities whose assignment predicate fails are skipped.
    pub fn for_each<A: Fact>(&self) -> Result<ConstraintStream<'_, (A,), Sc>> {
        self.source::<A>(false)
    }

    // Every `A` in working memory, assigned or not.
    pub fn for_each_including_unassigned<A: Fact>(&self) -> Result<ConstraintStream<'_, (A,), Sc>> {
        self.source::<A>(true)
    }

    // Every pair `(a, b)` of assigned `A`s matching `joiner` with
    // `a.planning_id() < b.planning_id()`, so each pair appears once and
    // never pairs a fact with itself.
    pub fn for_each_unique_pair<A, J>(&self, joiner: J) -> Result<ConstraintStream<'_, (A, A), Sc>>
    where
        A: Fact,
        A::Id: Ord,
        J: Joiner<(A,), A>,
    {
        let left = self.for_each::<A>()?;
        let right = self.for_each::<A>()?;
        left.join(
            right,
            AndJoiner::new(joiner, less_than(planning_id::<A>, planning_id::<A>)),
        )
    }

    fn source<A: Fact>(&self, include_unassigned: bool) -> Result<ConstraintStream<'_, (A,), Sc>> {
        let class = self.domain.class_of::<A>().ok_or_else(|| {
            StreamForgeError::Config(format!(
                "{} is not part of the domain model",
                std::any::type_name::<A>()
            ))
        })?;
        // Problem facts are always assigned, so both selections are the same node.
        let include_unassigned = include_unassigned || !class.can_be_unassigned();
        let declaration = Declaration::source(
            TypeId::of::<A>(),
            std::any::type_name::<A>(),
            include_unassigned,
        );
        let decl = self.with_graph(|graph| graph.share_plain(declaration))?;
        Ok(ConstraintStream::new(self, decl))
    }

    pub(crate) fn with_graph<R>(&self, f: impl FnOnce(&mut GraphBuilder<Sc>) -> R) -> R {
        f(&mut self.graph.borrow_mut())
    }

    pub(crate) fn id(&self) -> usize {
        self.id
    }

    pub(crate) fn check_same(&self, other: &ConstraintFactory<Sc>) -> Result<()> {
        if self.id == other.id {
            Ok(())
        } else {
            Err(StreamForgeError::Config(
                "streams of different constraint factories cannot be combined".to_string(),
            ))
        }
    }

    // Freezes the graph for the given constraints of this factory.
    pub(crate) fn freeze(
        self,
        constraints: &[Constraint],
        weights: &dyn WeightProvider<Sc>,
    ) -> Result<DeclarationGraph<Sc>> {
        let mut selected = Vec::with_capacity(constraints.len());
        for constraint in constraints {
            if constraint.factory_id != self.id {
                return Err(StreamForgeError::Config(format!(
                    "constraint '{}' belongs to a different constraint factory",
                    constraint.constraint_ref()
                )));
            }
            selected.push(constraint.index);
        }
        self.graph.into_inner().freeze(&selected, weights)
    }
}

fn planning_id<A: Fact>(fact: &A) -> A::Id {
    fact.planning_id()
}
