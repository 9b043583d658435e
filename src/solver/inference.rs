use log::trace;

use crate::model::{PossibilityTable, Status};

use super::filter::category_value_filter;
use super::rules::apply_is_same;

/// Rows of `status_filter` grouped by their value index in `col`, in category order.
fn group_rows(
    table: &PossibilityTable,
    col: usize,
    status_filter: impl Fn(Status) -> bool,
) -> Vec<Vec<usize>> {
    let mut groups = vec![Vec::new(); table.categories().get(col).len()];
    for row in 0..table.len() {
        if status_filter(table.status(row)) {
            groups[table.row(row).value_index(col)].push(row);
        }
    }
    groups
}

fn forced_pairing_pass(table: &mut PossibilityTable) -> usize {
    let columns = table.categories().len();
    let mut rejected = 0;
    for col in 0..columns {
        let groups = group_rows(table, col, |status| status.is_possible());
        for rows in groups.iter().filter(|rows| !rows.is_empty()) {
            for other in (0..columns).filter(|other| *other != col) {
                let first = table.row(rows[0]).value_index(other);
                if rows
                    .iter()
                    .all(|row| table.row(*row).value_index(other) == first)
                {
                    let value = table.value(rows[0], col).clone();
                    let paired = table.value(rows[0], other).clone();
                    let filt1 = category_value_filter(&table.categories().get(col).name, value);
                    let filt2 =
                        category_value_filter(&table.categories().get(other).name, paired);
                    let count = apply_is_same(table, &filt1, &filt2);
                    if count > 0 {
                        trace!(
                            target: "inference",
                            "{} can only be {}; rejected {} rows",
                            filt1,
                            filt2,
                            count
                        );
                    }
                    rejected += count;
                }
            }
        }
    }
    rejected
}

fn mark_confirmed_pass(table: &mut PossibilityTable) -> usize {
    let mut confirmed = 0;
    for col in 0..table.categories().len() {
        let unsure = group_rows(table, col, |status| status == Status::Unsure);
        let held = group_rows(table, col, |status| status == Status::Confirmed);
        for (rows, held) in unsure.iter().zip(held.iter()) {
            if rows.len() == 1 && held.is_empty() && table.confirm(rows[0]) {
                trace!(
                    target: "inference",
                    "Confirmed {:?}: last candidate for {}",
                    table.row_values(rows[0]),
                    table.value(rows[0], col)
                );
                confirmed += 1;
            }
        }
    }
    confirmed
}

/// When every possible row holding a value agrees on the value of another column,
/// the two values are paired. Repeats until nothing changes.
pub fn forced_pairing(table: &PossibilityTable) -> PossibilityTable {
    let mut next = table.clone();
    while forced_pairing_pass(&mut next) > 0 {}
    next
}

/// Confirms the row holding the only unsure candidate left for a value, unless a
/// confirmed row already holds that value. Repeats until nothing changes.
pub fn mark_confirmed(table: &PossibilityTable) -> PossibilityTable {
    let mut next = table.clone();
    while mark_confirmed_pass(&mut next) > 0 {}
    next
}

pub fn clean_up(table: &PossibilityTable) -> PossibilityTable {
    mark_confirmed(&forced_pairing(table))
}

#[cfg(test)]
mod tests {
    use test_context::test_context;

    use super::*;
    use crate::tests::{create_test_categories, UsingLogger};

    fn create_a_is_y_table() -> PossibilityTable {
        PossibilityTable::build(create_test_categories()).with_statuses(
            "
            x|1964|A|x|
            x|1964|A|z|
            x|1968|A|x|
            x|1968|A|z|
            x|1972|A|x|
            x|1972|A|z|
            ",
        )
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_forced_pairing(_: &mut UsingLogger) {
        let table = create_a_is_y_table();
        let next = forced_pairing(&table);
        assert_eq!(next.rejected_count(), 12);
        assert!(next
            .describe_rows(Status::Unsure)
            .iter()
            .filter(|row| row.ends_with("|y"))
            .all(|row| row.contains("|A|")));
        assert_eq!(next.confirmed_count(), 0);
    }

    #[test]
    fn test_forced_pairing_is_idempotent() {
        let once = forced_pairing(&create_a_is_y_table());
        assert_eq!(forced_pairing(&once), once);
    }

    #[test]
    fn test_mark_confirmed() {
        let table = PossibilityTable::build(create_test_categories()).with_statuses(
            "
            x|1964|A|x|
            x|1964|A|y|
            x|1964|A|z|
            x|1968|A|x|
            x|1968|A|z|
            x|1972|A|x|
            x|1972|A|y|
            x|1972|A|z|
            ",
        );
        let next = mark_confirmed(&table);
        assert_eq!(next.describe_rows(Status::Confirmed), vec!["1968|A|y"]);
        assert_eq!(mark_confirmed(&next), next);
    }

    #[test]
    fn test_mark_confirmed_skips_values_already_confirmed() {
        let table = PossibilityTable::build(create_test_categories()).with_statuses(
            "
            +|1964|C|x|
            x|1964|C|z|
            x|1968|C|x|
            x|1968|C|y|
            x|1968|C|z|
            x|1972|C|x|
            x|1972|C|y|
            x|1972|C|z|
            ",
        );
        let next = mark_confirmed(&table);
        assert_eq!(next.describe_rows(Status::Confirmed), vec!["1964|C|x"]);
        assert_eq!(next.status(7), Status::Unsure);
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_clean_up_is_idempotent(_: &mut UsingLogger) {
        let once = clean_up(&create_a_is_y_table());
        assert_eq!(clean_up(&once), once);
        assert!(once.check_transition_from(&create_a_is_y_table()).is_ok());
    }
}
