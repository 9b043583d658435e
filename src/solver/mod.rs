pub mod filter;
pub mod inference;
mod lookup;
mod puzzle;
mod rule;
pub mod rules;

pub use filter::{category_value_filter, force_filter, value_filter, Filter};
pub use inference::clean_up;
pub use lookup::{Binding, LiteralLookup};
pub use puzzle::{LogicPuzzle, SolverState};
pub use rule::{Comparison, Rule, RuleKind};
