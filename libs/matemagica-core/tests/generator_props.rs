//! Property tests for problem generation.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use matemagica_core::generator::{self, OPTION_COUNT};
use matemagica_core::{Level, Operation};

fn operation() -> impl Strategy<Value = Operation> {
    prop::sample::select(Operation::ALL.to_vec())
}

fn level() -> impl Strategy<Value = Level> {
    prop::sample::select(vec![Level::Easy, Level::Medium, Level::Advanced])
}

proptest! {
    #[test]
    fn options_are_distinct_and_contain_answer(op in operation(), lvl in level(), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let problem = generator::generate(op, lvl, &mut rng);

        prop_assert_eq!(problem.options.len(), OPTION_COUNT);
        prop_assert_eq!(
            problem.options.iter().filter(|&&o| o == problem.correct_answer).count(),
            1
        );
        prop_assert!(problem.options.iter().all(|&o| o >= 0));
        for (i, a) in problem.options.iter().enumerate() {
            for b in &problem.options[i + 1..] {
                prop_assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn operands_match_answer(op in operation(), lvl in level(), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let problem = generator::generate(op, lvl, &mut rng);
        let (a, b) = problem.operands;

        match op {
            Operation::Addition => prop_assert_eq!(a + b, problem.correct_answer),
            Operation::Subtraction => {
                prop_assert_eq!(a - b, problem.correct_answer);
                prop_assert!(problem.correct_answer >= 0);
            }
            Operation::Multiplication => prop_assert_eq!(a * b, problem.correct_answer),
            Operation::Division => prop_assert_eq!(a, b * problem.correct_answer),
            Operation::Exponentiation => {
                prop_assert_eq!(a.pow(b as u32), problem.correct_answer)
            }
            Operation::SquareRoot => {
                prop_assert_eq!(a, problem.correct_answer * problem.correct_answer)
            }
        }
    }
}
