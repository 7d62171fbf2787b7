// Terminal step of a stream: impact, weight and constraint identity.

use streamforge_core::{ConstraintRef, ImpactType, Result, Score};

use super::ConstraintStream;
use crate::graph::{ConstraintDef, Indicter, Justifier, Weigher};
use crate::row::RowType;

// Builder for a constraint's impact, returned by `penalize`, `reward` and
// their weighted variants.
//
// Finish with [`as_constraint`](Self::as_constraint).
pub struct ConstraintBuilder<'f, T, Sc: Score> {
    pub(crate) stream: ConstraintStream<'f, T, Sc>,
    impact_type: ImpactType,
    weight: Sc,
    weigher: Option<Weigher>,
    pub(crate) justifier: Option<Justifier<Sc>>,
    pub(crate) indicter: Option<Indicter>,
}

impl<'f, T: RowType, Sc: Score> ConstraintBuilder<'f, T, Sc> {
    pub(crate) fn new(
        stream: ConstraintStream<'f, T, Sc>,
        impact_type: ImpactType,
        weight: Sc,
        weigher: Option<Weigher>,
    ) -> Self {
        Self {
            stream,
            impact_type,
            weight,
            weigher,
            justifier: None,
            indicter: None,
        }
    }

    pub fn impact_type(&self) -> ImpactType {
        self.impact_type
    }

    // Finalizes the constraint under `name` in the default package.
    pub fn as_constraint(self, name: &str) -> Result<Constraint> {
        self.as_constraint_in("", name)
    }

    // Finalizes the constraint under `package/name`.
    //
    // Fails if the factory already has a constraint with that full name.
    pub fn as_constraint_in(self, package: &str, name: &str) -> Result<Constraint> {
        let ConstraintBuilder {
            stream,
            impact_type,
            weight,
            weigher,
            justifier,
            indicter,
        } = self;
        let constraint_ref = ConstraintRef::new(package, name);
        let parent = stream.decl;
        let def = ConstraintDef {
            constraint_ref: constraint_ref.clone(),
            impact_type,
            weight,
            weigher,
            justifier,
            indicter,
            score_decl: parent,
        };
        let index = stream
            .factory
            .with_graph(|graph| graph.add_constraint(parent, def))?;
        Ok(Constraint {
            factory_id: stream.factory.id(),
            index,
            constraint_ref,
        })
    }
}

/// A constraint registered with a [`ConstraintFactory`](super::ConstraintFactory).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub(crate) factory_id: usize,
    pub(crate) index: usize,
    constraint_ref: ConstraintRef,
}

impl Constraint {
    pub fn constraint_ref(&self) -> &ConstraintRef {
        &self.constraint_ref
    }

    pub fn name(&self) -> &str {
        &self.constraint_ref.name
    }
}
