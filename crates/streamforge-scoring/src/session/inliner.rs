//! Running score totals, per constraint and overall.

use streamforge_core::{ConstraintRef, Score};

/// Score contributed by one constraint and how many matches produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintTotal<Sc: Score> {
    pub constraint_ref: ConstraintRef,
    pub score: Sc,
    pub match_count: usize,
}

/// Accumulates impact deltas from the scoring nodes of a session.
#[derive(Debug)]
pub(crate) struct ScoreInliner<Sc: Score> {
    score: Sc,
    totals: Vec<ConstraintTotal<Sc>>,
}

impl<Sc: Score> ScoreInliner<Sc> {
    /// One total slot per constraint of the graph, by constraint index.
    pub(crate) fn new(constraints: Vec<ConstraintRef>) -> Self {
        Self {
            score: Sc::zero(),
            totals: constraints
                .into_iter()
                .map(|constraint_ref| ConstraintTotal {
                    constraint_ref,
                    score: Sc::zero(),
                    match_count: 0,
                })
                .collect(),
        }
    }

    pub(crate) fn score(&self) -> Sc {
        self.score
    }

    pub(crate) fn add(&mut self, constraint: usize, impact: Sc) {
        let total = &mut self.totals[constraint];
        total.score = total.score + impact;
        total.match_count += 1;
        self.score = self.score + impact;
    }

    pub(crate) fn replace(&mut self, constraint: usize, old: Sc, new: Sc) {
        let total = &mut self.totals[constraint];
        total.score = total.score - old + new;
        self.score = self.score - old + new;
    }

    pub(crate) fn remove(&mut self, constraint: usize, impact: Sc) {
        let total = &mut self.totals[constraint];
        total.score = total.score - impact;
        total.match_count -= 1;
        self.score = self.score - impact;
    }

    pub(crate) fn total(&self, constraint: usize) -> &ConstraintTotal<Sc> {
        &self.totals[constraint]
    }
}

#[cfg(test)]
mod tests {
    use streamforge_core::SimpleScore;

    use super::*;

    #[test]
    fn test_deltas_cancel_out() {
        let mut inliner = ScoreInliner::<SimpleScore>::new(vec![
            ConstraintRef::new("", "a"),
            ConstraintRef::new("", "b"),
        ]);
        inliner.add(0, SimpleScore::of(-3));
        inliner.add(1, SimpleScore::of(2));
        inliner.replace(0, SimpleScore::of(-3), SimpleScore::of(-5));
        assert_eq!(inliner.score(), SimpleScore::of(-3));
        assert_eq!(inliner.total(0).score, SimpleScore::of(-5));

        inliner.remove(0, SimpleScore::of(-5));
        inliner.remove(1, SimpleScore::of(2));
        assert_eq!(inliner.score(), SimpleScore::zero());
        assert_eq!(inliner.total(0).match_count, 0);
    }
}
