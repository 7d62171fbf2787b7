use std::sync::Arc;

use streamforge::prelude::*;
use streamforge::{EngineConfig, EnvironmentMode};
use streamforge_test::{shift_model, Employee, Shift};

#[test]
fn test_roster_scored_through_the_prelude() {
    let config = EngineConfig::default()
        .with_constraint_weight("Long shift", "0hard/2soft")
        .with_environment_mode(EnvironmentMode::FullAssert);

    let factory = ConstraintSessionFactory::<HardSoftScore>::builder(shift_model())
        .with_config(&config)
        .unwrap()
        .build(|cf| {
            Ok(vec![
                cf.for_each::<Shift>()?
                    .join(
                        cf.for_each::<Employee>()?,
                        equal_bi(|s: &Shift| s.employee, |e: &Employee| Some(e.id)),
                    )?
                    .filter(|s: &Shift, _: &Employee| s.hours() > 8)?
                    .penalize(HardSoftScore::of_soft(1))
                    .as_constraint("Long shift")?,
                cf.for_each::<Shift>()?
                    .group_by((key(|s: &Shift| s.employee), count()))?
                    .filter(|_: &Option<u32>, n: &usize| *n > 1)?
                    .penalize(HardSoftScore::of_hard(1))
                    .as_constraint("Double booked")?,
            ])
        })
        .unwrap();

    let facts = FactSet::new()
        .with(Employee::new(1, "Ann"))
        .with(Shift::new(1, Some(1), 6, 18));
    let mut session = factory.build_session(&facts, false).unwrap();
    assert_eq!(session.calculate_score().unwrap(), HardSoftScore::of_soft(-2));

    session
        .insert(Arc::new(Shift::new(2, Some(1), 20, 22)))
        .unwrap();
    assert_eq!(session.calculate_score().unwrap(), HardSoftScore::of(-1, -2));
}
