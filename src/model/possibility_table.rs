use std::ops::{BitAnd, BitOr, Not};
use std::rc::Rc;

use itertools::Itertools;
use log::trace;

use crate::error::PuzzleError;
use crate::model::{CategorySet, Number, Status, Value};

/// One boolean per table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowMask(Vec<bool>);

impl RowMask {
    pub fn filled(len: usize, value: bool) -> Self {
        Self(vec![value; len])
    }

    pub fn from_fn(len: usize, f: impl FnMut(usize) -> bool) -> Self {
        Self((0..len).map(f).collect())
    }

    pub fn get(&self, row: usize) -> bool {
        self.0[row]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn count(&self) -> usize {
        self.0.iter().filter(|b| **b).count()
    }

    pub fn any(&self) -> bool {
        self.0.iter().any(|b| *b)
    }

    /// Indices of the selected rows.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, b)| **b)
            .map(|(idx, _)| idx)
    }
}

impl BitAnd for RowMask {
    type Output = RowMask;

    fn bitand(self, rhs: RowMask) -> RowMask {
        RowMask(self.0.iter().zip(rhs.0.iter()).map(|(a, b)| *a && *b).collect())
    }
}

impl BitOr for RowMask {
    type Output = RowMask;

    fn bitor(self, rhs: RowMask) -> RowMask {
        RowMask(self.0.iter().zip(rhs.0.iter()).map(|(a, b)| *a || *b).collect())
    }
}

impl Not for RowMask {
    type Output = RowMask;

    fn not(self) -> RowMask {
        RowMask(self.0.into_iter().map(|b| !b).collect())
    }
}

/// One combination of category values. `values[c]` indexes into category `c`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PossibilityRow {
    values: Vec<usize>,
    status: Status,
}

impl PossibilityRow {
    pub fn value_index(&self, category: usize) -> usize {
        self.values[category]
    }

    pub fn status(&self) -> Status {
        self.status
    }
}

/// Every combination of one value per category, each with a status. Rows are never
/// added or removed after `build`; only their status moves.
#[derive(Clone, PartialEq, Eq)]
pub struct PossibilityTable {
    categories: Rc<CategorySet>,
    rows: Vec<PossibilityRow>,
}

impl std::fmt::Debug for PossibilityTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut output = String::new();
        output.push('\n');
        output.push_str(&format!(" |{}|\n", self.category_columns().join("|")));
        for row in self.rows.iter() {
            output.push(row.status.marker());
            output.push('|');
            for (col, value_idx) in row.values.iter().enumerate() {
                output.push_str(&format!("{}|", self.categories.get(col).values[*value_idx]));
            }
            output.push('\n');
        }
        write!(f, "{}", output)
    }
}

impl PossibilityTable {
    /// The Cartesian product of all categories, every row unsure. The first
    /// category varies slowest.
    pub fn build(categories: Rc<CategorySet>) -> Self {
        let rows: Vec<PossibilityRow> = categories
            .iter()
            .map(|category| 0..category.len())
            .multi_cartesian_product()
            .map(|values| PossibilityRow {
                values,
                status: Status::Unsure,
            })
            .collect();
        trace!(target: "table", "Built table with {} rows", rows.len());
        Self { categories, rows }
    }

    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    pub fn shared_categories(&self) -> Rc<CategorySet> {
        Rc::clone(&self.categories)
    }

    /// Every column name except the status.
    pub fn category_columns(&self) -> Vec<&str> {
        self.categories.names()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[PossibilityRow] {
        &self.rows
    }

    pub fn row(&self, row: usize) -> &PossibilityRow {
        &self.rows[row]
    }

    pub fn status(&self, row: usize) -> Status {
        self.rows[row].status
    }

    pub fn value(&self, row: usize, category: usize) -> &Value {
        &self.categories.get(category).values[self.rows[row].values[category]]
    }

    pub fn row_values(&self, row: usize) -> Vec<Value> {
        (0..self.categories.len())
            .map(|col| self.value(row, col).clone())
            .collect()
    }

    /// True for every row that is not rejected.
    pub fn is_possible(&self) -> RowMask {
        RowMask::from_fn(self.len(), |row| self.rows[row].status.is_possible())
    }

    pub fn status_mask(&self, status: Status) -> RowMask {
        RowMask::from_fn(self.len(), |row| self.rows[row].status == status)
    }

    /// Rows whose value in `category` has a numeric projection satisfying `predicate`.
    pub fn numeric_mask(&self, category: usize, predicate: impl Fn(Number) -> bool) -> RowMask {
        RowMask::from_fn(self.len(), |row| {
            self.value(row, category)
                .number()
                .map(&predicate)
                .unwrap_or(false)
        })
    }

    /// Numeric values of `category` over the rows selected by `mask`.
    pub fn numbers(&self, category: usize, mask: &RowMask) -> Vec<Number> {
        mask.indices()
            .filter_map(|row| self.value(row, category).number())
            .collect()
    }

    pub fn possible_rows(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len()).filter(move |row| self.rows[*row].status.is_possible())
    }

    pub fn rows_with_status(&self, status: Status) -> impl Iterator<Item = usize> + '_ {
        (0..self.len()).filter(move |row| self.rows[*row].status == status)
    }

    pub fn unsure_count(&self) -> usize {
        self.rows_with_status(Status::Unsure).count()
    }

    pub fn confirmed_count(&self) -> usize {
        self.rows_with_status(Status::Confirmed).count()
    }

    pub fn rejected_count(&self) -> usize {
        self.rows_with_status(Status::Rejected).count()
    }

    pub fn is_solved(&self) -> bool {
        self.rows.iter().all(|row| row.status != Status::Unsure)
    }

    /// Every value of every category still has at least one possible row.
    pub fn is_consistent(&self) -> bool {
        (0..self.categories.len()).all(|col| {
            let mut seen = vec![false; self.categories.get(col).len()];
            for row in self.possible_rows() {
                seen[self.rows[row].values[col]] = true;
            }
            seen.into_iter().all(|s| s)
        })
    }

    /// Rejects the unsure rows selected by `mask` and returns how many changed.
    /// Confirmed rows are left alone.
    pub(crate) fn reject(&mut self, mask: &RowMask) -> usize {
        let mut rejected = 0;
        for row in mask.indices() {
            match self.rows[row].status {
                Status::Unsure => {
                    self.rows[row].status = Status::Rejected;
                    rejected += 1;
                }
                Status::Confirmed => {
                    trace!(target: "table", "Not rejecting confirmed row {}", row);
                }
                Status::Rejected => {}
            }
        }
        rejected
    }

    /// Promotes an unsure row to confirmed; returns false for any other status.
    pub(crate) fn confirm(&mut self, row: usize) -> bool {
        if self.rows[row].status == Status::Unsure {
            self.rows[row].status = Status::Confirmed;
            true
        } else {
            false
        }
    }

    /// Checks that every row moved only from unsure to a terminal status since
    /// `previous`.
    pub fn check_transition_from(&self, previous: &PossibilityTable) -> Result<(), PuzzleError> {
        for (row, (before, after)) in previous.rows.iter().zip(self.rows.iter()).enumerate() {
            if !before.status.can_become(after.status) {
                return Err(PuzzleError::InvariantViolation {
                    row,
                    from: before.status,
                    to: after.status,
                });
            }
        }
        Ok(())
    }

    /// Test helper: marks rows listed as `<marker>|value|value|...` with the given
    /// status. Rows not listed stay as they are.
    #[cfg(test)]
    pub fn with_statuses(mut self, input: &str) -> Self {
        for line in input.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let mut cells = line.split('|').filter(|c| !c.is_empty());
            let status = cells
                .next()
                .and_then(|m| m.trim().chars().next())
                .and_then(Status::from_marker)
                .unwrap_or_else(|| panic!("Invalid status marker in {}", line));
            let cells: Vec<&str> = cells.map(str::trim).collect();
            let row = (0..self.len())
                .find(|row| {
                    cells
                        .iter()
                        .enumerate()
                        .all(|(col, cell)| self.value(*row, col).canonical() == cell.to_lowercase())
                })
                .unwrap_or_else(|| panic!("No row matches {}", line));
            self.rows[row].status = status;
        }
        self
    }

    /// Test helper: the value tuples of rows with `status`, as strings.
    #[cfg(test)]
    pub fn describe_rows(&self, status: Status) -> Vec<String> {
        self.rows_with_status(status)
            .map(|row| {
                self.row_values(row)
                    .iter()
                    .map(|v| v.to_string())
                    .join("|")
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::create_test_categories;

    #[test]
    fn test_build_is_cartesian_product() {
        let table = PossibilityTable::build(create_test_categories());
        assert_eq!(table.len(), 27);
        assert_eq!(table.unsure_count(), 27);
        assert_eq!(table.category_columns(), vec!["years", "names", "topics"]);
        assert_eq!(table.row_values(0), vec![Value::Integer(1964), "A".into(), "x".into()]);
        assert_eq!(
            table.row_values(26),
            vec![Value::Integer(1972), "C".into(), "z".into()]
        );
        assert!(table.is_possible().indices().eq(0..27));
    }

    #[test]
    fn test_reject_leaves_confirmed_rows() {
        let mut table = PossibilityTable::build(create_test_categories()).with_statuses(
            "
            +|1964|A|x|
            x|1964|A|y|
            ",
        );
        let rejected = table.reject(&RowMask::from_fn(27, |row| row < 3));
        assert_eq!(rejected, 1);
        assert_eq!(table.status(0), Status::Confirmed);
        assert_eq!(table.status(1), Status::Rejected);
        assert_eq!(table.status(2), Status::Rejected);
    }

    #[test]
    fn test_is_consistent() {
        let table = PossibilityTable::build(create_test_categories());
        assert!(table.is_consistent());

        let mut table = table;
        let names_a = RowMask::from_fn(27, |row| table.row(row).value_index(1) == 0);
        table.reject(&names_a);
        assert!(!table.is_consistent());
        assert!(!table.is_solved());
    }

    #[test]
    fn test_check_transition_from() {
        let before = PossibilityTable::build(create_test_categories()).with_statuses("+|1964|A|x|");
        let mut after = before.clone();
        after.reject(&RowMask::from_fn(27, |row| row == 1));
        assert!(after.check_transition_from(&before).is_ok());

        let mut reverted = after.clone();
        reverted.rows[1].status = Status::Unsure;
        assert!(matches!(
            reverted.check_transition_from(&after),
            Err(PuzzleError::InvariantViolation {
                row: 1,
                from: Status::Rejected,
                to: Status::Unsure
            })
        ));
    }

    #[test]
    fn test_debug_output() {
        let table = PossibilityTable::build(create_test_categories()).with_statuses("x|1964|A|x|");
        let rendered = format!("{:?}", table);
        assert!(rendered.contains(" |years|names|topics|"));
        assert!(rendered.contains("x|1964|A|x|"));
        assert!(rendered.contains("?|1972|C|z|"));
    }
}
