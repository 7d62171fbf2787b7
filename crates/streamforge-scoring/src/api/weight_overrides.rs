// Constraint weights replaced without redeclaring the constraints.
//
// A session factory consults its overrides once, when the constraint graph
// is frozen; sessions built afterwards never see a later change.

use std::collections::HashMap;
use std::fmt::Debug;

use streamforge_config::EngineConfig;
use streamforge_core::{ConstraintRef, ParseableScore, Result, Score, StreamForgeError};

// Replacement weights keyed by full name (`package/name`) or bare name.
//
// A zero weight disables the constraint: its nodes are left out of every
// session built from the factory.
#[derive(Clone)]
pub struct ConstraintWeightOverrides<Sc: Score> {
    weights: HashMap<String, Sc>,
}

impl<Sc: Score> ConstraintWeightOverrides<Sc> {
    pub fn new() -> Self {
        Self {
            weights: HashMap::new(),
        }
    }

    pub fn put(&mut self, name: impl Into<String>, weight: Sc) {
        self.weights.insert(name.into(), weight);
    }

    pub fn with(mut self, name: impl Into<String>, weight: Sc) -> Self {
        self.put(name, weight);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Sc> {
        self.weights.get(name)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

impl<Sc: ParseableScore> ConstraintWeightOverrides<Sc> {
    // Parses the `constraint_weights` table of an engine configuration.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        config
            .parse_constraint_weights::<Sc>()
            .map(|weights| Self {
                weights: weights.into_iter().collect(),
            })
            .map_err(|e| StreamForgeError::Config(e.to_string()))
    }
}

impl<Sc: Score> Default for ConstraintWeightOverrides<Sc> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Sc: Score, N: Into<String>> FromIterator<(N, Sc)> for ConstraintWeightOverrides<Sc> {
    fn from_iter<I: IntoIterator<Item = (N, Sc)>>(iter: I) -> Self {
        Self {
            weights: iter.into_iter().map(|(n, w)| (n.into(), w)).collect(),
        }
    }
}

// Later entries replace earlier ones.
impl<Sc: Score, N: Into<String>> Extend<(N, Sc)> for ConstraintWeightOverrides<Sc> {
    fn extend<I: IntoIterator<Item = (N, Sc)>>(&mut self, iter: I) {
        for (name, weight) in iter {
            self.put(name, weight);
        }
    }
}

impl<Sc: Score> IntoIterator for ConstraintWeightOverrides<Sc> {
    type Item = (String, Sc);
    type IntoIter = std::collections::hash_map::IntoIter<String, Sc>;

    fn into_iter(self) -> Self::IntoIter {
        self.weights.into_iter()
    }
}

impl<Sc: Score> Debug for ConstraintWeightOverrides<Sc> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.weights.iter()).finish()
    }
}

// Source of constraint weights consulted when a graph is frozen.
pub trait WeightProvider<Sc: Score>: Send + Sync {
    fn weight(&self, name: &str) -> Option<Sc>;

    // The weight a constraint runs with: an override for its full name,
    // else one for its bare name, else `declared`.
    fn effective_weight(&self, constraint: &ConstraintRef, declared: Sc) -> Sc {
        self.weight(&constraint.full_name())
            .or_else(|| self.weight(&constraint.name))
            .unwrap_or(declared)
    }
}

impl<Sc: Score> WeightProvider<Sc> for ConstraintWeightOverrides<Sc> {
    fn weight(&self, name: &str) -> Option<Sc> {
        self.get(name).copied()
    }
}

// No overrides: every constraint keeps the weight it was declared with.
impl<Sc: Score> WeightProvider<Sc> for () {
    fn weight(&self, _name: &str) -> Option<Sc> {
        None
    }
}
