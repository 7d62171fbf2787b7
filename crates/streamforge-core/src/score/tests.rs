use rust_decimal::Decimal;

use super::*;
use crate::constraint::MatchWeight;

mod simple_score {
    use super::*;

    #[test]
    fn test_group_operations() {
        let a = SimpleScore::of(10);
        let b = SimpleScore::of(3);

        assert_eq!(a + b, SimpleScore::of(13));
        assert_eq!(a - b, SimpleScore::of(7));
        assert_eq!(-a, SimpleScore::of(-10));
        assert_eq!(a + SimpleScore::zero(), a);
        assert_eq!(a - a, SimpleScore::zero());
    }

    #[test]
    fn test_parse() {
        assert_eq!(SimpleScore::parse("42").unwrap(), SimpleScore::of(42));
        assert_eq!(SimpleScore::parse(" -10 ").unwrap(), SimpleScore::of(-10));
        assert!(SimpleScore::parse("ten").is_err());
        assert!(SimpleScore::parse("1/2").is_err());
        assert_eq!(SimpleScore::of(-7).to_string_repr(), "-7");
    }

    #[test]
    fn test_multiply_weight() {
        let weight = SimpleScore::of(3);
        assert_eq!(weight.multiply_weight(&MatchWeight::ONE), weight);
        assert_eq!(weight.multiply_weight(&MatchWeight::Int(4)), SimpleScore::of(12));
        assert_eq!(
            weight.multiply_weight(&MatchWeight::Decimal(Decimal::new(15, 1))),
            SimpleScore::of(5)
        );
        assert_eq!(
            SimpleScore::of(i64::MAX).multiply_long(2),
            SimpleScore::of(i64::MAX)
        );
    }

    #[test]
    fn test_single_soft_level() {
        assert_eq!(SimpleScore::LEVELS, &[ScoreLevel::Soft]);
        assert!(!SimpleScore::of(-4).has_hard_component());
        assert_eq!(SimpleScore::from_level_numbers(&[9]), SimpleScore::of(9));
    }
}

mod hard_soft_score {
    use super::*;

    #[test]
    fn test_hard_level_dominates() {
        let infeasible = HardSoftScore::of(-1, 0);
        let feasible = HardSoftScore::of(0, -1000);
        assert!(feasible > infeasible);
        assert!(HardSoftScore::of(0, -50) > HardSoftScore::of(0, -100));
        assert!(feasible.is_feasible());
        assert!(!infeasible.is_feasible());
    }

    #[test]
    fn test_group_operations() {
        let a = HardSoftScore::of(-1, -100);
        let b = HardSoftScore::of(-1, -50);

        assert_eq!(a + b, HardSoftScore::of(-2, -150));
        assert_eq!(a - b, HardSoftScore::of(0, -50));
        assert_eq!(-a, HardSoftScore::of(1, 100));
    }

    #[test]
    fn test_parse_and_display() {
        let score = HardSoftScore::parse("-1hard/-100soft").unwrap();
        assert_eq!(score, HardSoftScore::of(-1, -100));
        assert_eq!(score.to_string(), "-1hard/-100soft");
        assert_eq!(score.to_string_repr(), "-1hard/-100soft");
        assert!(HardSoftScore::parse("-1hard").is_err());
        assert!(HardSoftScore::parse("-1hard/2soft/3soft").is_err());
        assert!(HardSoftScore::parse("-1/2soft").is_err());
    }

    #[test]
    fn test_hard_component() {
        assert!(HardSoftScore::ONE_HARD.has_hard_component());
        assert!(!HardSoftScore::ONE_SOFT.has_hard_component());
    }

    #[test]
    fn test_multiply_long_scales_every_level() {
        let weight = HardSoftScore::of(1, 2);
        assert_eq!(weight.multiply_long(3), HardSoftScore::of(3, 6));
        assert_eq!(weight.multiply_long(-1), HardSoftScore::of(-1, -2));
    }

    #[test]
    fn test_missing_levels_are_zero() {
        assert_eq!(HardSoftScore::from_level_numbers(&[4]), HardSoftScore::of_hard(4));
    }
}

mod hard_soft_decimal_score {
    use super::*;

    #[test]
    fn test_whole_levels_are_scaled() {
        let score = HardSoftDecimalScore::of(-2, -100);
        assert_eq!(score.hard_scaled(), -200000);
        assert_eq!(score.soft_scaled(), -10000000);
    }

    #[test]
    fn test_parse_decimal() {
        let score = HardSoftDecimalScore::parse("-30.5hard/-208.25soft").unwrap();
        assert_eq!(score.hard_scaled(), -3050000);
        assert_eq!(score.soft_scaled(), -20825000);
        assert!(HardSoftDecimalScore::parse("-30.5hard").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            HardSoftDecimalScore::of_scaled(-3050000, -20825000).to_string(),
            "-30.5hard/-208.25soft"
        );
        assert_eq!(HardSoftDecimalScore::of(-2, -100).to_string(), "-2hard/-100soft");
        assert_eq!(HardSoftDecimalScore::ZERO.to_string(), "0hard/0soft");
    }

    #[test]
    fn test_multiply_decimal_rounds_at_fifth_place() {
        let impact = HardSoftDecimalScore::ONE_SOFT.multiply_decimal(Decimal::new(1234567, 6));
        assert_eq!(impact.soft_scaled(), 123457);
        assert_eq!(impact.hard_scaled(), 0);
    }

    #[test]
    fn test_of_decimal() {
        let score = HardSoftDecimalScore::of_decimal(Decimal::new(-15, 1), Decimal::ONE).unwrap();
        assert_eq!(score, HardSoftDecimalScore::of_scaled(-150000, 100000));
    }
}
