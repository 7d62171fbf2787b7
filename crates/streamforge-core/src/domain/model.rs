//! Runtime domain model: the fact types a session may hold.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::traits::Fact;

type AssignedFn = Arc<dyn Fn(&dyn Any) -> bool + Send + Sync>;

/// Whether a fact type is read-only input or carries decision variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FactKind {
    ProblemFact,
    PlanningEntity,
}

/// Descriptor for one fact type.
#[derive(Clone)]
pub struct FactClass {
    type_id: TypeId,
    type_name: &'static str,
    kind: FactKind,
    is_assigned: Option<AssignedFn>,
}

impl FactClass {
    /// Describes a problem fact; problem facts are always fully assigned.
    pub fn problem_fact<T: Fact>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            kind: FactKind::ProblemFact,
            is_assigned: None,
        }
    }

    /// Describes a planning entity with its "fully assigned" predicate.
    pub fn planning_entity<T, F>(is_assigned: F) -> Self
    where
        T: Fact,
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let predicate: AssignedFn = Arc::new(move |fact: &dyn Any| {
            fact.downcast_ref::<T>().is_some_and(&is_assigned)
        });
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            kind: FactKind::PlanningEntity,
            is_assigned: Some(predicate),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn kind(&self) -> FactKind {
        self.kind
    }

    /// Returns true if the given instance has every decision variable set.
    ///
    /// Problem facts and entities without a predicate are always assigned.
    pub fn is_assigned(&self, fact: &dyn Any) -> bool {
        match &self.is_assigned {
            Some(predicate) => predicate(fact),
            None => true,
        }
    }

    /// Returns true if instances of this type can ever be unassigned.
    pub fn can_be_unassigned(&self) -> bool {
        self.is_assigned.is_some()
    }
}

impl fmt::Debug for FactClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactClass")
            .field("type_name", &self.type_name)
            .field("kind", &self.kind)
            .finish()
    }
}

/// The set of fact types known to the engine, indexed by `TypeId`.
///
/// # Example
///
/// ```
/// use streamforge_core::{DomainModel, FactKind, PlanningId};
///
/// #[derive(Debug)]
/// struct Room { id: char }
/// impl PlanningId for Room {
///     type Id = char;
///     fn planning_id(&self) -> char { self.id }
/// }
///
/// #[derive(Debug)]
/// struct Meeting { id: u32, room: Option<char> }
/// impl PlanningId for Meeting {
///     type Id = u32;
///     fn planning_id(&self) -> u32 { self.id }
/// }
///
/// let model = DomainModel::new()
///     .with_problem_fact::<Room>()
///     .with_planning_entity(|m: &Meeting| m.room.is_some());
///
/// let meetings = model.class_of::<Meeting>().unwrap();
/// assert_eq!(meetings.kind(), FactKind::PlanningEntity);
/// assert!(!meetings.is_assigned(&Meeting { id: 1, room: None }));
/// assert!(model.class_of::<String>().is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DomainModel {
    classes: HashMap<TypeId, FactClass>,
}

impl DomainModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a fact class, replacing any earlier class for the same type.
    pub fn with_class(mut self, class: FactClass) -> Self {
        self.classes.insert(class.type_id, class);
        self
    }

    pub fn with_problem_fact<T: Fact>(self) -> Self {
        self.with_class(FactClass::problem_fact::<T>())
    }

    pub fn with_planning_entity<T, F>(self, is_assigned: F) -> Self
    where
        T: Fact,
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.with_class(FactClass::planning_entity::<T, F>(is_assigned))
    }

    pub fn class(&self, type_id: TypeId) -> Option<&FactClass> {
        self.classes.get(&type_id)
    }

    pub fn class_of<T: 'static>(&self) -> Option<&FactClass> {
        self.class(TypeId::of::<T>())
    }

    pub fn contains(&self, type_id: TypeId) -> bool {
        self.classes.contains_key(&type_id)
    }

    pub fn classes(&self) -> impl Iterator<Item = &FactClass> {
        self.classes.values()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
