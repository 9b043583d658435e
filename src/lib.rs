pub mod error;
pub mod loader;
pub mod model;
pub mod solver;

pub use error::{ConfigError, ConvergenceReason, LoadError, PuzzleError};
pub use loader::{load_categories, load_rules, PuzzleDefinition};
pub use model::{Category, CategorySet, PossibilityTable, Solution, SolverSettings, Status, Value};
pub use solver::{LogicPuzzle, Rule, SolverState};

#[cfg(test)]
mod tests {
    use std::rc::Rc;
    use std::sync::Once;
    use test_context::TestContext;

    use crate::model::{Category, CategorySet};

    static INIT_LOGGER: Once = Once::new();

    pub struct UsingLogger {
        _value: String,
    }

    impl TestContext for UsingLogger {
        fn setup() -> UsingLogger {
            INIT_LOGGER.call_once(|| {
                let _ = env_logger::builder().is_test(true).try_init();
            });

            UsingLogger {
                _value: "Hello, World!".to_string(),
            }
        }

        fn teardown(self) {}
    }

    /// years {1964, 1968, 1972}, names {A, B, C}, topics {x, y, z}
    pub fn create_test_categories() -> Rc<CategorySet> {
        Rc::new(
            CategorySet::new(vec![
                Category::integers("years", &[1964, 1968, 1972]).unwrap(),
                Category::tokens("names", &["A", "B", "C"]).unwrap(),
                Category::tokens("topics", &["x", "y", "z"]).unwrap(),
            ])
            .unwrap(),
        )
    }
}
