use std::collections::HashMap;

use streamforge_core::{ImpactType, MatchWeight, Score};

use crate::graph::{ConstraintDef, Weigher};
use crate::session::inliner::ScoreInliner;
use crate::session::tuple::{Event, TupleArena, TupleId};

/// Terminal node of one constraint; turns each live match into an impact.
pub(crate) struct ScoreNode<Sc: Score> {
    constraint: usize,
    impact_type: ImpactType,
    weight: Sc,
    weigher: Option<Weigher>,
    impacts: HashMap<TupleId, Sc>,
}

impl<Sc: Score> ScoreNode<Sc> {
    pub(crate) fn new(constraint: usize, def: &ConstraintDef<Sc>) -> Self {
        Self {
            constraint,
            impact_type: def.impact_type,
            weight: def.weight,
            weigher: def.weigher.clone(),
            impacts: HashMap::new(),
        }
    }

    pub(crate) fn constraint(&self) -> usize {
        self.constraint
    }

    pub(crate) fn on_event(
        &mut self,
        event: Event,
        input: TupleId,
        tuples: &TupleArena,
        inliner: &mut ScoreInliner<Sc>,
    ) {
        match event {
            Event::Insert => {
                let impact = self.impact(tuples, input);
                inliner.add(self.constraint, impact);
                self.impacts.insert(input, impact);
            }
            Event::Update => {
                let impact = self.impact(tuples, input);
                match self.impacts.insert(input, impact) {
                    Some(old) => inliner.replace(self.constraint, old, impact),
                    None => inliner.add(self.constraint, impact),
                }
            }
            Event::Retract => {
                if let Some(old) = self.impacts.remove(&input) {
                    inliner.remove(self.constraint, old);
                }
            }
        }
    }

    fn impact(&self, tuples: &TupleArena, input: TupleId) -> Sc {
        let match_weight = match &self.weigher {
            Some(weigher) => weigher(tuples.row(input)),
            None => MatchWeight::ONE,
        };
        let magnitude = self.weight.multiply_weight(&match_weight);
        match self.impact_type {
            ImpactType::Penalty => -magnitude,
            ImpactType::Reward => magnitude,
        }
    }

    /// Live matches of this constraint with their impacts.
    pub(crate) fn matches(&self) -> impl Iterator<Item = (TupleId, Sc)> + '_ {
        self.impacts.iter().map(|(id, impact)| (*id, *impact))
    }
}
