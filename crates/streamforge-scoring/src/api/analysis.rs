//! What a session reports about its score: live matches with their
//! justifications, a per-constraint breakdown, and the facts each match is
//! blamed on.

use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use streamforge_core::{ConstraintRef, Score};

use crate::value::{downcast, value_type_name, ColumnValue, Value};

/// A fact or derived column value taking part in a match.
///
/// Two refs are equal when their type and `Debug` rendering are, so the
/// same fact reached through different `Arc`s indicts one entity.
#[derive(Clone)]
pub struct EntityRef {
    type_name: &'static str,
    label: String,
    value: Value,
}

impl EntityRef {
    /// Refers to a copy of `entity`.
    pub fn new<T: Clone + Debug + Send + Sync + 'static>(entity: &T) -> Self {
        Self::from_arc(Arc::new(entity.clone()))
    }

    pub fn from_arc<T: Debug + Send + Sync + 'static>(entity: Arc<T>) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            label: format!("{:?}", entity),
            value: entity,
        }
    }

    pub(crate) fn from_value(value: &Value) -> Self {
        let inner: &dyn ColumnValue = &**value;
        Self {
            type_name: value_type_name(value),
            label: format!("{:?}", inner),
            value: Arc::clone(value),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The type name without its module path.
    pub fn short_type_name(&self) -> &'static str {
        self.type_name.rsplit("::").next().unwrap_or(self.type_name)
    }

    /// The `Debug` rendering of the referenced value.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn as_entity<T: 'static>(&self) -> Option<&T> {
        downcast::<T>(&self.value)
    }
}

impl Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.short_type_name(), self.label)
    }
}

impl PartialEq for EntityRef {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name && self.label == other.label
    }
}

impl Eq for EntityRef {}

impl Hash for EntityRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_name.hash(state);
        self.label.hash(state);
    }
}

/// Why a constraint matched.
#[derive(Debug, Clone)]
pub struct ConstraintJustification {
    pub entities: Vec<EntityRef>,
    pub description: String,
}

impl ConstraintJustification {
    /// Describes the match by listing its entities.
    pub fn new(entities: Vec<EntityRef>) -> Self {
        let description = entities
            .iter()
            .map(EntityRef::label)
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            entities,
            description,
        }
    }

    pub fn with_description(entities: Vec<EntityRef>, description: impl Into<String>) -> Self {
        Self {
            entities,
            description: description.into(),
        }
    }

    pub(crate) fn from_row(row: &[Value]) -> Self {
        Self::new(row.iter().map(EntityRef::from_value).collect())
    }
}

impl fmt::Display for ConstraintJustification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

/// One live match and its impact on the score.
#[derive(Debug, Clone)]
pub struct DetailedConstraintMatch<Sc: Score> {
    pub constraint_ref: ConstraintRef,
    pub score: Sc,
    pub justification: ConstraintJustification,
    /// Entities the match is blamed on in an [`IndictmentMap`].
    pub indicted: Vec<EntityRef>,
}

impl<Sc: Score> DetailedConstraintMatch<Sc> {
    pub fn new(
        constraint_ref: ConstraintRef,
        score: Sc,
        justification: ConstraintJustification,
        indicted: Vec<EntityRef>,
    ) -> Self {
        Self {
            constraint_ref,
            score,
            justification,
            indicted,
        }
    }
}

/// The matches and total of one active constraint.
#[derive(Debug, Clone)]
pub struct ConstraintAnalysis<Sc: Score> {
    pub constraint_ref: ConstraintRef,
    /// Effective weight after overrides.
    pub weight: Sc,
    pub score: Sc,
    pub matches: Vec<DetailedConstraintMatch<Sc>>,
    pub is_hard: bool,
}

impl<Sc: Score> ConstraintAnalysis<Sc> {
    pub fn new(
        constraint_ref: ConstraintRef,
        weight: Sc,
        score: Sc,
        matches: Vec<DetailedConstraintMatch<Sc>>,
    ) -> Self {
        Self {
            is_hard: weight.has_hard_component(),
            constraint_ref,
            weight,
            score,
            matches,
        }
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    pub fn name(&self) -> &str {
        &self.constraint_ref.name
    }
}

/// A score with its per-constraint breakdown.
#[derive(Debug, Clone)]
pub struct ScoreExplanation<Sc: Score> {
    pub score: Sc,
    pub constraints: Vec<ConstraintAnalysis<Sc>>,
}

impl<Sc: Score> ScoreExplanation<Sc> {
    pub fn new(score: Sc, constraints: Vec<ConstraintAnalysis<Sc>>) -> Self {
        Self { score, constraints }
    }

    pub fn total_match_count(&self) -> usize {
        self.constraints.iter().map(ConstraintAnalysis::match_count).sum()
    }

    /// Looks a constraint up by bare or full name.
    pub fn constraint(&self, name: &str) -> Option<&ConstraintAnalysis<Sc>> {
        self.constraints
            .iter()
            .find(|a| a.constraint_ref.name == name || a.constraint_ref.full_name() == name)
    }

    /// Constraints currently contributing a non-zero score.
    pub fn impacting(&self) -> impl Iterator<Item = &ConstraintAnalysis<Sc>> {
        self.constraints.iter().filter(|a| a.score != Sc::zero())
    }

    pub fn matches(&self) -> impl Iterator<Item = &DetailedConstraintMatch<Sc>> {
        self.constraints.iter().flat_map(|a| &a.matches)
    }
}

/// Everything one entity is blamed for.
#[derive(Debug, Clone)]
pub struct Indictment<Sc: Score> {
    pub entity: EntityRef,
    /// Sum of the scores of `matches`.
    pub score: Sc,
    pub matches: Vec<DetailedConstraintMatch<Sc>>,
}

impl<Sc: Score> Indictment<Sc> {
    fn new(entity: EntityRef) -> Self {
        Self {
            entity,
            score: Sc::zero(),
            matches: Vec::new(),
        }
    }

    fn push(&mut self, constraint_match: DetailedConstraintMatch<Sc>) {
        self.score = self.score + constraint_match.score;
        self.matches.push(constraint_match);
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// The distinct constraints among the matches, in first-seen order.
    pub fn constraints(&self) -> Vec<&ConstraintRef> {
        let mut refs: Vec<&ConstraintRef> = Vec::new();
        for m in &self.matches {
            if !refs.contains(&&m.constraint_ref) {
                refs.push(&m.constraint_ref);
            }
        }
        refs
    }
}

/// Matches regrouped by the entities they indict.
#[derive(Debug, Clone)]
pub struct IndictmentMap<Sc: Score> {
    indictments: HashMap<EntityRef, Indictment<Sc>>,
}

impl<Sc: Score> IndictmentMap<Sc> {
    /// Files each match under every entity it indicts; an entity listed
    /// twice by one match is indicted once for it.
    pub fn from_matches(matches: Vec<DetailedConstraintMatch<Sc>>) -> Self {
        let mut indictments: HashMap<EntityRef, Indictment<Sc>> = HashMap::new();
        for m in matches {
            let mut unique: Vec<&EntityRef> = Vec::with_capacity(m.indicted.len());
            for entity in &m.indicted {
                if !unique.contains(&entity) {
                    unique.push(entity);
                }
            }
            for entity in unique {
                indictments
                    .entry(entity.clone())
                    .or_insert_with(|| Indictment::new(entity.clone()))
                    .push(m.clone());
            }
        }
        Self { indictments }
    }

    pub fn get(&self, entity: &EntityRef) -> Option<&Indictment<Sc>> {
        self.indictments.get(entity)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Indictment<Sc>> {
        self.indictments.values()
    }

    /// Indictments from the worst score to the best.
    pub fn worst_first(&self) -> Vec<&Indictment<Sc>> {
        let mut sorted: Vec<&Indictment<Sc>> = self.indictments.values().collect();
        sorted.sort_by(|a, b| a.score.cmp(&b.score));
        sorted
    }

    pub fn len(&self) -> usize {
        self.indictments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indictments.is_empty()
    }
}

impl<Sc: Score> Default for IndictmentMap<Sc> {
    fn default() -> Self {
        Self {
            indictments: HashMap::new(),
        }
    }
}
