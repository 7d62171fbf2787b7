//! Frozen constraint graphs and the sessions built from them.

use std::fmt;
use std::sync::Arc;

use rayon::prelude::*;
use streamforge_config::{EngineConfig, EnvironmentMode};
use streamforge_core::{ConstraintRef, DomainModel, ParseableScore, Result, Score};
use tracing::info;

use super::constraint_session::ConstraintSession;
use super::fact_set::FactSet;
use crate::api::weight_overrides::ConstraintWeightOverrides;
use crate::graph::DeclarationGraph;
use crate::stream::{Constraint, ConstraintFactory};

/// Builds sessions that share one frozen, immutable constraint graph.
///
/// The factory is `Send + Sync`; every session it builds is private to its
/// owner.
///
/// # Example
///
/// ```
/// use streamforge_core::{DomainModel, PlanningId, SimpleScore};
/// use streamforge_scoring::{ConstraintSessionFactory, FactSet};
///
/// #[derive(Debug)]
/// struct Task { id: u32, done: bool }
///
/// impl PlanningId for Task {
///     type Id = u32;
///     fn planning_id(&self) -> u32 { self.id }
/// }
///
/// let factory = ConstraintSessionFactory::new(
///     DomainModel::new().with_problem_fact::<Task>(),
///     |cf| {
///         Ok(vec![cf
///             .for_each::<Task>()?
///             .filter(|t: &Task| !t.done)?
///             .penalize(SimpleScore::of(1))
///             .as_constraint("Open task")?])
///     },
/// )
/// .unwrap();
///
/// let facts = FactSet::new()
///     .with(Task { id: 1, done: false })
///     .with(Task { id: 2, done: true });
/// assert_eq!(factory.fire_and_forget(&facts).unwrap(), SimpleScore::of(-1));
/// ```
pub struct ConstraintSessionFactory<Sc: Score> {
    graph: Arc<DeclarationGraph<Sc>>,
    domain: Arc<DomainModel>,
    environment_mode: EnvironmentMode,
    default_match_tracking: bool,
}

impl<Sc: Score> ConstraintSessionFactory<Sc> {
    /// Freezes the constraints returned by `provider` with default settings.
    pub fn new<P>(domain: DomainModel, provider: P) -> Result<Self>
    where
        P: FnOnce(&ConstraintFactory<Sc>) -> Result<Vec<Constraint>>,
    {
        Self::builder(domain).build(provider)
    }

    pub fn builder(domain: DomainModel) -> SessionFactoryBuilder<Sc> {
        SessionFactoryBuilder {
            domain: Arc::new(domain),
            overrides: ConstraintWeightOverrides::new(),
            environment_mode: EnvironmentMode::default(),
            match_tracking: false,
        }
    }

    /// Builds a session holding `facts`; nothing is propagated until the
    /// first score calculation.
    pub fn build_session(
        &self,
        facts: &FactSet,
        match_tracking: bool,
    ) -> Result<ConstraintSession<Sc>> {
        let mut session = ConstraintSession::new(
            Arc::clone(&self.graph),
            Arc::clone(&self.domain),
            match_tracking,
            self.environment_mode,
        )?;
        for fact in facts.iter() {
            session.insert_erased(fact)?;
        }
        info!(
            nodes = session.node_count(),
            constraints = self.graph.active_constraint_indices().len(),
            facts = facts.len(),
            match_tracking,
            "Constraint session built"
        );
        Ok(session)
    }

    /// Builds an empty session with the configured match tracking default.
    pub fn build_default_session(&self) -> Result<ConstraintSession<Sc>> {
        self.build_session(&FactSet::new(), self.default_match_tracking)
    }

    /// Scores `facts` on a throwaway session.
    pub fn fire_and_forget(&self, facts: &FactSet) -> Result<Sc> {
        self.build_session(facts, false)?.calculate_score()
    }

    /// Scores each fact set on its own session, in parallel.
    pub fn score_all(&self, fact_sets: &[FactSet]) -> Vec<Result<Sc>> {
        fact_sets
            .par_iter()
            .map(|facts| self.fire_and_forget(facts))
            .collect()
    }

    /// The active constraints, in declaration order.
    pub fn constraint_refs(&self) -> Vec<ConstraintRef> {
        self.graph.active_constraints().cloned().collect()
    }

    pub fn graph(&self) -> &DeclarationGraph<Sc> {
        &self.graph
    }

    pub fn domain(&self) -> &DomainModel {
        &self.domain
    }

    pub fn environment_mode(&self) -> EnvironmentMode {
        self.environment_mode
    }
}

impl<Sc: Score> fmt::Debug for ConstraintSessionFactory<Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintSessionFactory")
            .field("graph", &self.graph)
            .field("environment_mode", &self.environment_mode)
            .field("default_match_tracking", &self.default_match_tracking)
            .finish()
    }
}

/// Settings applied when a [`ConstraintSessionFactory`] is frozen.
pub struct SessionFactoryBuilder<Sc: Score> {
    domain: Arc<DomainModel>,
    overrides: ConstraintWeightOverrides<Sc>,
    environment_mode: EnvironmentMode,
    match_tracking: bool,
}

impl<Sc: Score> SessionFactoryBuilder<Sc> {
    /// Replaces constraint weights by name or full name. A zero weight
    /// disables the constraint.
    pub fn weight_overrides(mut self, overrides: ConstraintWeightOverrides<Sc>) -> Self {
        self.overrides.extend(overrides);
        self
    }

    pub fn environment_mode(mut self, mode: EnvironmentMode) -> Self {
        self.environment_mode = mode;
        self
    }

    /// Default match tracking of [`ConstraintSessionFactory::build_default_session`].
    pub fn constraint_match_tracking(mut self, enabled: bool) -> Self {
        self.match_tracking = enabled;
        self
    }

    /// Freezes the provider's constraints.
    ///
    /// # Errors
    ///
    /// Whatever the provider returns, or a configuration error if a
    /// constraint comes from another factory.
    pub fn build<P>(self, provider: P) -> Result<ConstraintSessionFactory<Sc>>
    where
        P: FnOnce(&ConstraintFactory<Sc>) -> Result<Vec<Constraint>>,
    {
        let factory = ConstraintFactory::new(Arc::clone(&self.domain));
        let constraints = provider(&factory)?;
        let graph = factory.freeze(&constraints, &self.overrides)?;
        info!(
            declarations = graph.len(),
            active_declarations = graph.active_count(),
            constraints = graph.active_constraint_indices().len(),
            environment_mode = ?self.environment_mode,
            "Constraint session factory built"
        );
        Ok(ConstraintSessionFactory {
            graph: Arc::new(graph),
            domain: self.domain,
            environment_mode: self.environment_mode,
            default_match_tracking: self.match_tracking,
        })
    }
}

impl<Sc: ParseableScore> SessionFactoryBuilder<Sc> {
    /// Applies an engine configuration: environment mode, match tracking
    /// default and constraint weights.
    pub fn with_config(self, config: &EngineConfig) -> Result<Self> {
        let overrides = ConstraintWeightOverrides::from_config(config)?;
        Ok(self
            .environment_mode(config.environment_mode)
            .constraint_match_tracking(config.constraint_match_tracking)
            .weight_overrides(overrides))
    }
}
