use std::collections::BTreeSet;

use itertools::Itertools;
use log::trace;

use crate::model::{Number, PossibilityTable};

use super::filter::Filter;

fn reject_where(table: &mut PossibilityTable, mask: crate::model::RowMask, rule: &str) -> usize {
    let rejected = table.reject(&mask);
    if rejected > 0 {
        trace!(target: "rules", "{} rejected {} rows", rule, rejected);
    }
    rejected
}

pub(crate) fn apply_is_same(table: &mut PossibilityTable, filt1: &Filter, filt2: &Filter) -> usize {
    let mut rejected = 0;
    let mask = filt1.evaluate(table) & !filt2.evaluate(table);
    rejected += reject_where(table, mask, "is_same");
    let mask = !filt1.evaluate(table) & filt2.evaluate(table);
    rejected += reject_where(table, mask, "is_same");
    rejected
}

pub(crate) fn apply_is_diff(table: &mut PossibilityTable, filt1: &Filter, filt2: &Filter) -> usize {
    let mask = filt1.evaluate(table) & filt2.evaluate(table);
    reject_where(table, mask, "is_diff")
}

fn apply_is_either_or(
    table: &mut PossibilityTable,
    isfilt: &Filter,
    eitherfilt: &Filter,
    orfilt: &Filter,
) -> usize {
    let mut rejected = apply_is_diff(table, eitherfilt, orfilt);
    let mask = isfilt.evaluate(table) & !(eitherfilt.evaluate(table) | orfilt.evaluate(table));
    rejected += reject_where(table, mask, "is_either_or");
    rejected
}

/// "A is B": rows matching exactly one of the two filters are impossible.
pub fn is_same(table: &PossibilityTable, filt1: &Filter, filt2: &Filter) -> PossibilityTable {
    let mut next = table.clone();
    apply_is_same(&mut next, filt1, filt2);
    next
}

/// "A is not B".
pub fn is_diff(table: &PossibilityTable, filt1: &Filter, filt2: &Filter) -> PossibilityTable {
    let mut next = table.clone();
    apply_is_diff(&mut next, filt1, filt2);
    next
}

/// "A is either B or C": B and C are different, and A is one of them.
pub fn is_either_or(
    table: &PossibilityTable,
    isfilt: &Filter,
    eitherfilt: &Filter,
    orfilt: &Filter,
) -> PossibilityTable {
    let mut next = table.clone();
    apply_is_either_or(&mut next, isfilt, eitherfilt, orfilt);
    next
}

/// "A is neither B nor C": B and C are different, and A is neither of them.
pub fn is_neither_nor(
    table: &PossibilityTable,
    isfilt: &Filter,
    neitherfilt: &Filter,
    norfilt: &Filter,
) -> PossibilityTable {
    let mut next = table.clone();
    apply_is_diff(&mut next, neitherfilt, norfilt);
    let mask = isfilt.evaluate(&next) & (neitherfilt.evaluate(&next) | norfilt.evaluate(&next));
    reject_where(&mut next, mask, "is_neither_nor");
    next
}

/// "(A, B) is (C, D)": each member of one pair is one of the other pair.
pub fn pair_is_pair(
    table: &PossibilityTable,
    filt11: &Filter,
    filt12: &Filter,
    filt21: &Filter,
    filt22: &Filter,
) -> PossibilityTable {
    let mut next = table.clone();
    apply_is_either_or(&mut next, filt11, filt21, filt22);
    apply_is_either_or(&mut next, filt12, filt21, filt22);
    apply_is_either_or(&mut next, filt21, filt11, filt12);
    apply_is_either_or(&mut next, filt22, filt11, filt12);
    next
}

/// `comp_cat(big) > comp_cat(small) + offset`, where `comp_cat` is a column index
/// of an orderable category.
pub fn is_ordered(
    table: &PossibilityTable,
    comp_cat: usize,
    bigfilt: &Filter,
    smallfilt: &Filter,
    offset: Number,
) -> PossibilityTable {
    let mut next = table.clone();
    apply_is_diff(&mut next, bigfilt, smallfilt);

    // big must exceed the smallest candidate for small
    let small_mask = smallfilt.evaluate(&next);
    if let Some(min_small) = next.numbers(comp_cat, &small_mask).into_iter().min() {
        let threshold = min_small.saturating_add(offset);
        let mask = bigfilt.evaluate(&next) & next.numeric_mask(comp_cat, |v| v <= threshold);
        reject_where(&mut next, mask, "is_ordered");
    }

    // small must stay under the largest candidate for big
    let big_mask = bigfilt.evaluate(&next);
    if let Some(max_big) = next.numbers(comp_cat, &big_mask).into_iter().max() {
        let threshold = max_big.saturating_sub(offset);
        let mask = smallfilt.evaluate(&next) & next.numeric_mask(comp_cat, |v| v >= threshold);
        reject_where(&mut next, mask, "is_ordered");
    }

    next
}

/// `comp_cat(big) == comp_cat(small) + offset`.
pub fn is_incremented(
    table: &PossibilityTable,
    comp_cat: usize,
    bigfilt: &Filter,
    smallfilt: &Filter,
    offset: Number,
) -> PossibilityTable {
    let mut next = table.clone();
    apply_is_diff(&mut next, bigfilt, smallfilt);

    let small: BTreeSet<Number> = next
        .numbers(comp_cat, &smallfilt.evaluate(&next))
        .into_iter()
        .collect();
    let big: BTreeSet<Number> = next
        .numbers(comp_cat, &bigfilt.evaluate(&next))
        .into_iter()
        .collect();

    let bad_small: BTreeSet<Number> = small
        .iter()
        .filter(|v| !big.contains(&v.saturating_add(offset)))
        .copied()
        .collect();
    let bad_big: BTreeSet<Number> = big
        .iter()
        .filter(|v| !small.contains(&v.saturating_sub(offset)))
        .copied()
        .collect();
    trace!(
        target: "rules",
        "is_incremented: small {:?} big {:?}; unmatched small {:?} big {:?}",
        small,
        big,
        bad_small,
        bad_big
    );

    let mask = smallfilt.evaluate(&next) & next.numeric_mask(comp_cat, |v| bad_small.contains(&v));
    reject_where(&mut next, mask, "is_incremented");
    let mask = bigfilt.evaluate(&next) & next.numeric_mask(comp_cat, |v| bad_big.contains(&v));
    reject_where(&mut next, mask, "is_incremented");

    next
}

/// "[A, B, C, ...] are all different": no row may match two filters of the list.
pub fn similarity_group_updates(table: &PossibilityTable, filtlist: &[Filter]) -> PossibilityTable {
    let mut next = table.clone();
    for (filt1, filt2) in filtlist.iter().tuple_combinations() {
        apply_is_diff(&mut next, filt1, filt2);
    }
    next
}
