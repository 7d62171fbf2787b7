//! A private working memory evaluated against a frozen constraint graph.

use std::any::TypeId;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use indexmap::IndexMap;
use streamforge_config::EnvironmentMode;
use streamforge_core::{DomainModel, Fact, Result, Score, StreamForgeError};
use tracing::{debug, warn};

use super::compiler::compile;
use super::fact_set::ErasedFact;
use super::inliner::ConstraintTotal;
use super::network::Network;
use crate::api::analysis::{ConstraintAnalysis, IndictmentMap, ScoreExplanation};
use crate::graph::DeclarationGraph;
use crate::value::{fact_key, Key, Value};

struct StoredFact {
    type_id: TypeId,
    value: Value,
}

/// Incremental evaluation of one set of facts.
///
/// `insert`, `update` and `retract` only stage changes at the source nodes;
/// [`calculate_score`](Self::calculate_score) propagates everything staged
/// since the previous call. A panic inside a user closure poisons the
/// session: the call that raised it returns
/// [`StreamForgeError::Evaluation`] and every later call returns
/// [`StreamForgeError::Poisoned`].
pub struct ConstraintSession<Sc: Score> {
    network: Network<Sc>,
    graph: Arc<DeclarationGraph<Sc>>,
    domain: Arc<DomainModel>,
    facts: IndexMap<Key, StoredFact>,
    match_tracking: bool,
    environment_mode: EnvironmentMode,
    poisoned: bool,
}

impl<Sc: Score> ConstraintSession<Sc> {
    pub(crate) fn new(
        graph: Arc<DeclarationGraph<Sc>>,
        domain: Arc<DomainModel>,
        match_tracking: bool,
        environment_mode: EnvironmentMode,
    ) -> Result<Self> {
        let network = compile(Arc::clone(&graph), &domain)?;
        Ok(Self {
            network,
            graph,
            domain,
            facts: IndexMap::new(),
            match_tracking,
            environment_mode,
            poisoned: false,
        })
    }

    /// Stages the insertion of a new fact.
    ///
    /// # Errors
    ///
    /// [`StreamForgeError::DuplicateFact`] if a fact of the same type and
    /// planning id is already inserted, [`StreamForgeError::DomainModel`]
    /// if `T` is not part of the domain model.
    pub fn insert<T: Fact>(&mut self, fact: Arc<T>) -> Result<()> {
        self.check_usable()?;
        let type_id = self.check_known::<T>()?;
        let key = fact_key(&*fact);
        if self.facts.contains_key(&key) {
            return Err(StreamForgeError::DuplicateFact(describe(&*fact)));
        }
        let value: Value = fact;
        self.guarded("insert", |network| {
            network.insert_fact(type_id, &key, &value)
        })?;
        self.facts.insert(key, StoredFact { type_id, value });
        Ok(())
    }

    /// Stages the replacement of an inserted fact by a new instance with
    /// the same planning id.
    pub fn update<T: Fact>(&mut self, fact: Arc<T>) -> Result<()> {
        self.check_usable()?;
        let type_id = self.check_known::<T>()?;
        let key = fact_key(&*fact);
        if !self.facts.contains_key(&key) {
            return Err(StreamForgeError::UnknownFact(describe(&*fact)));
        }
        let value: Value = fact;
        self.guarded("update", |network| {
            network.update_fact(type_id, &key, &value)
        })?;
        if let Some(stored) = self.facts.get_mut(&key) {
            stored.value = value;
        }
        Ok(())
    }

    /// Stages the removal of an inserted fact, identified by type and
    /// planning id.
    pub fn retract<T: Fact>(&mut self, fact: &T) -> Result<()> {
        self.check_usable()?;
        self.check_known::<T>()?;
        let key = fact_key(fact);
        let Some(stored) = self.facts.shift_remove(&key) else {
            return Err(StreamForgeError::UnknownFact(describe(fact)));
        };
        self.guarded("retract", |network| {
            network.retract_fact(stored.type_id, &key, &stored.value)
        })
    }

    pub(crate) fn insert_erased(&mut self, fact: &ErasedFact) -> Result<()> {
        self.check_usable()?;
        if !self.domain.contains(fact.type_id) {
            return Err(unknown_type(fact.type_name));
        }
        if self.facts.contains_key(&fact.key) {
            return Err(StreamForgeError::DuplicateFact(format!(
                "{} {:?}",
                fact.type_name, fact.key
            )));
        }
        let (type_id, key, value) = (fact.type_id, fact.key.clone(), fact.value.clone());
        self.guarded("insert", |network| {
            network.insert_fact(type_id, &key, &value)
        })?;
        self.facts.insert(key, StoredFact { type_id, value });
        Ok(())
    }

    /// Propagates every staged change and returns the score.
    ///
    /// In [`EnvironmentMode::FullAssert`] the score is checked against a
    /// session rebuilt from the current facts.
    pub fn calculate_score(&mut self) -> Result<Sc> {
        self.check_usable()?;
        self.guarded("calculate_score", |network| network.settle())?;
        let score = self.network.score();
        if self.environment_mode.is_asserted() {
            let expected = self.rebuilt_score()?;
            if expected != score {
                warn!(
                    incremental = %score,
                    expected = %expected,
                    "Score corruption detected"
                );
                return Err(StreamForgeError::ScoreCorruption {
                    incremental: score.to_string(),
                    expected: expected.to_string(),
                });
            }
        }
        Ok(score)
    }

    fn rebuilt_score(&mut self) -> Result<Sc> {
        let mut fresh = compile(Arc::clone(&self.graph), &self.domain)?;
        let facts = &self.facts;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            for (key, stored) in facts {
                fresh.insert_fact(stored.type_id, key, &stored.value);
            }
            fresh.settle();
        }));
        match outcome {
            Ok(()) => {
                debug!(score = %fresh.score(), "Rebuilt session for score verification");
                Ok(fresh.score())
            }
            Err(payload) => {
                let err = fresh.evaluation_error("calculate_score (verification)", payload);
                self.mark_poisoned(&err);
                Err(err)
            }
        }
    }

    /// Every live match of every active constraint, after propagating
    /// staged changes.
    ///
    /// # Errors
    ///
    /// [`StreamForgeError::MatchTrackingDisabled`] if the session was built
    /// without match tracking.
    pub fn constraint_matches(&mut self) -> Result<Vec<ConstraintAnalysis<Sc>>> {
        self.check_usable()?;
        if !self.match_tracking {
            return Err(StreamForgeError::MatchTrackingDisabled);
        }
        self.guarded("constraint_matches", |network| {
            network.settle();
            network.constraint_analyses()
        })
    }

    /// The score with its per-constraint breakdown.
    pub fn explain_score(&mut self) -> Result<ScoreExplanation<Sc>> {
        let analyses = self.constraint_matches()?;
        Ok(ScoreExplanation::new(self.network.score(), analyses))
    }

    /// Matches regrouped by the facts they indict.
    pub fn indictments(&mut self) -> Result<IndictmentMap<Sc>> {
        let analyses = self.constraint_matches()?;
        Ok(IndictmentMap::from_matches(
            analyses.into_iter().flat_map(|a| a.matches).collect(),
        ))
    }

    /// Score and match count per active constraint. Available without
    /// match tracking.
    pub fn constraint_totals(&mut self) -> Result<Vec<ConstraintTotal<Sc>>> {
        self.check_usable()?;
        self.guarded("constraint_totals", |network| network.settle())?;
        Ok(self.network.constraint_totals())
    }

    pub fn fact_count(&self) -> usize {
        self.facts.len()
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    pub fn is_match_tracking(&self) -> bool {
        self.match_tracking
    }

    pub fn environment_mode(&self) -> EnvironmentMode {
        self.environment_mode
    }

    pub fn graph(&self) -> &DeclarationGraph<Sc> {
        &self.graph
    }

    pub(crate) fn node_count(&self) -> usize {
        self.network.node_count()
    }

    fn check_usable(&self) -> Result<()> {
        if self.poisoned {
            Err(StreamForgeError::Poisoned)
        } else {
            Ok(())
        }
    }

    fn check_known<T: Fact>(&self) -> Result<TypeId> {
        let type_id = TypeId::of::<T>();
        if self.domain.contains(type_id) {
            Ok(type_id)
        } else {
            Err(unknown_type(std::any::type_name::<T>()))
        }
    }

    /// Runs `f` on the network, poisoning the session if it panics.
    fn guarded<R>(&mut self, operation: &str, f: impl FnOnce(&mut Network<Sc>) -> R) -> Result<R> {
        let network = &mut self.network;
        match panic::catch_unwind(AssertUnwindSafe(|| f(network))) {
            Ok(result) => Ok(result),
            Err(payload) => {
                let err = self.network.evaluation_error(operation, payload);
                self.mark_poisoned(&err);
                Err(err)
            }
        }
    }

    fn mark_poisoned(&mut self, err: &StreamForgeError) {
        self.poisoned = true;
        warn!(error = %err, "Session poisoned");
    }
}

impl<Sc: Score> fmt::Debug for ConstraintSession<Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintSession")
            .field("facts", &self.facts.len())
            .field("nodes", &self.network.node_count())
            .field("live_tuples", &self.network.live_tuples())
            .field("match_tracking", &self.match_tracking)
            .field("poisoned", &self.poisoned)
            .finish()
    }
}

fn describe<T: Fact>(fact: &T) -> String {
    format!(
        "{} with id {:?}",
        std::any::type_name::<T>(),
        fact.planning_id()
    )
}

fn unknown_type(type_name: &str) -> StreamForgeError {
    StreamForgeError::DomainModel(format!("{} is not part of the domain model", type_name))
}
