//! Owned, type-erased batches of facts for building sessions.

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use streamforge_core::Fact;

use crate::value::{fact_key, Key, Value};

#[derive(Clone)]
pub(crate) struct ErasedFact {
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) key: Key,
    pub(crate) value: Value,
}

/// Facts of any domain types, inserted together when a session is built.
///
/// # Example
///
/// ```
/// use streamforge_core::PlanningId;
/// use streamforge_scoring::FactSet;
///
/// #[derive(Debug)]
/// struct Room { id: char }
///
/// impl PlanningId for Room {
///     type Id = char;
///     fn planning_id(&self) -> char { self.id }
/// }
///
/// let facts = FactSet::new().with(Room { id: 'A' }).with(Room { id: 'B' });
/// assert_eq!(facts.len(), 2);
/// ```
#[derive(Clone, Default)]
pub struct FactSet {
    facts: Vec<ErasedFact>,
}

impl FactSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<T: Fact>(mut self, fact: T) -> Self {
        self.add(Arc::new(fact));
        self
    }

    pub fn add<T: Fact>(&mut self, fact: Arc<T>) {
        let key = fact_key(&*fact);
        self.facts.push(ErasedFact {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            key,
            value: fact,
        });
    }

    pub fn extend<T, I>(&mut self, facts: I)
    where
        T: Fact,
        I: IntoIterator<Item = Arc<T>>,
    {
        for fact in facts {
            self.add(fact);
        }
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &ErasedFact> {
        self.facts.iter()
    }
}

impl fmt::Debug for FactSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.facts.iter().map(|fact| &fact.value))
            .finish()
    }
}
