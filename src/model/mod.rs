mod category;
mod possibility_table;
mod settings;
mod solution;
mod status;
mod value;

pub use category::{Category, CategorySet};
pub use possibility_table::{PossibilityRow, PossibilityTable, RowMask};
pub use settings::SolverSettings;
pub use solution::Solution;
pub use status::Status;
pub use value::{decimal_from_f64, month_aliases, parse_month, Literal, Number, Value, ValueType};
