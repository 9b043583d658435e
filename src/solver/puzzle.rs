use std::rc::Rc;

use log::{debug, info, warn};

use crate::error::{ConfigError, ConvergenceReason, PuzzleError};
use crate::model::{CategorySet, PossibilityTable, Solution, SolverSettings, Status, Value};

use super::inference;
use super::rule::Rule;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverState {
    Unsolved,
    Solved,
    Failed,
}

/// Owns the possibility table for one puzzle and drives the rules over it until
/// nothing is left unsure. Every table it replaces is kept for `undo`.
#[derive(Debug)]
pub struct LogicPuzzle {
    categories: Rc<CategorySet>,
    rules: Vec<Rule>,
    settings: SolverSettings,
    table: Rc<PossibilityTable>,
    history: Vec<Rc<PossibilityTable>>,
    attempts: usize,
    failed: bool,
}

impl LogicPuzzle {
    pub fn new(
        categories: Rc<CategorySet>,
        rules: Vec<Rule>,
        settings: SolverSettings,
    ) -> Result<Self, PuzzleError> {
        for rule in rules.iter() {
            rule.validate(&categories)?;
        }
        let table = Rc::new(PossibilityTable::build(Rc::clone(&categories)));
        debug!(
            target: "puzzle",
            "New puzzle: {} categories, {} rows, {} rules",
            categories.len(),
            table.len(),
            rules.len()
        );
        Ok(Self {
            categories,
            rules,
            settings,
            table,
            history: Vec::new(),
            attempts: 0,
            failed: false,
        })
    }

    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    pub fn table(&self) -> &PossibilityTable {
        &self.table
    }

    /// Prior tables, oldest first.
    pub fn history(&self) -> &[Rc<PossibilityTable>] {
        &self.history
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// No row is unsure and every value still has its row.
    pub fn is_solved(&self) -> bool {
        self.table.is_solved() && self.table.is_consistent()
    }

    pub fn state(&self) -> SolverState {
        if self.failed {
            SolverState::Failed
        } else if self.is_solved() {
            SolverState::Solved
        } else {
            SolverState::Unsolved
        }
    }

    /// Value tuples of every row not yet rejected.
    pub fn possible(&self) -> Vec<Vec<Value>> {
        self.table
            .possible_rows()
            .map(|row| self.table.row_values(row))
            .collect()
    }

    /// Value tuples of the confirmed rows.
    pub fn results(&self) -> Vec<Vec<Value>> {
        self.solution().rows
    }

    pub fn solution(&self) -> Solution {
        Solution::from_table(&self.table)
    }

    fn replace_table(&mut self, next: PossibilityTable) -> Result<(), PuzzleError> {
        next.check_transition_from(&self.table)?;
        let previous = std::mem::replace(&mut self.table, Rc::new(next));
        self.history.push(previous);
        Ok(())
    }

    /// One pass over the rule list in order, without the inference step.
    pub fn apply_rules(&mut self) -> Result<(), PuzzleError> {
        for idx in 0..self.rules.len() {
            let next = self.rules[idx].apply(&self.table);
            self.replace_table(next)?;
        }
        Ok(())
    }

    fn clean_up(&mut self) -> Result<(), PuzzleError> {
        let next = inference::clean_up(&self.table);
        self.replace_table(next)
    }

    fn fail(&mut self, reason: ConvergenceReason) -> PuzzleError {
        self.failed = true;
        warn!(
            target: "puzzle",
            "Giving up after {} attempts: {}",
            self.attempts,
            reason
        );
        PuzzleError::Convergence {
            attempts: self.attempts,
            reason,
            table: Box::new(self.table.as_ref().clone()),
        }
    }

    /// Applies the rules and the inference pass until no row is unsure.
    pub fn solve(&mut self) -> Result<Solution, PuzzleError> {
        while !self.is_solved() {
            let before = Rc::clone(&self.table);
            self.attempts += 1;
            self.apply_rules()?;
            self.clean_up()?;
            info!(
                target: "puzzle",
                "Iteration {}: {} unsure, {} confirmed",
                self.attempts,
                self.table.unsure_count(),
                self.table.confirmed_count()
            );

            if !self.table.is_consistent() {
                return Err(self.fail(ConvergenceReason::Contradiction));
            }
            if self.is_solved() {
                break;
            }
            if *self.table == *before {
                return Err(self.fail(ConvergenceReason::Stalled));
            }
            if self.settings.is_capped() && self.attempts >= self.settings.max_solve_attempts {
                return Err(self.fail(ConvergenceReason::IterationCap));
            }
        }
        self.failed = false;
        Ok(self.solution())
    }

    /// Restores the table from before the latest replacement.
    pub fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some(previous) => {
                self.table = previous;
                self.failed = false;
                debug!(target: "puzzle", "Undo, {} snapshots left", self.history.len());
                true
            }
            None => false,
        }
    }

    /// Confirmed rows grouped per value of `category`, for callers that want to read
    /// the solution through one column.
    pub fn confirmed_for(&self, category: &str) -> Result<Vec<(Value, Vec<Value>)>, ConfigError> {
        let col = self.categories.require(category)?;
        Ok(self
            .table
            .rows_with_status(Status::Confirmed)
            .map(|row| (self.table.value(row, col).clone(), self.table.row_values(row)))
            .collect())
    }
}
