//! This module defines the `TransitionTable`, an immutable mapping from state identifier to
//! the pair of rules applied on a blank or filled cell, and the `TableBuilder` used to
//! assemble one.

use crate::analyzer::analyze;
use crate::types::{Action, Cell, Rule, StateRules, TallyError};
use serde::Serialize;
use std::collections::BTreeMap;

/// The result of looking up a rule.
///
/// A state without an entry yields `NoRule` rather than a silent default, leaving the
/// caller to decide whether that means "halt" or "error".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    Found(&'a Rule),
    NoRule,
}

/// An immutable transition table.
///
/// Once built the table offers no mutation, so it can be shared by reference between
/// any number of machines.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionTable {
    states: BTreeMap<String, StateRules>,
}

impl TransitionTable {
    /// Starts building a new table.
    pub fn builder() -> TableBuilder {
        TableBuilder::default()
    }

    /// Looks up the rule for `state` when the cursor is on `cell`.
    pub fn lookup(&self, state: &str, cell: Cell) -> Lookup<'_> {
        match self.states.get(state) {
            Some(rules) => Lookup::Found(rules.rule(cell)),
            None => Lookup::NoRule,
        }
    }

    /// Like [`lookup`](Self::lookup), but resolves a missing state to the halting rule `(Halt, "")`.
    pub fn rule(&self, state: &str, cell: Cell) -> Rule {
        match self.lookup(state, cell) {
            Lookup::Found(rule) => rule.clone(),
            Lookup::NoRule => Rule::halt(),
        }
    }

    /// Returns the rule pair for `state`, if defined.
    pub fn get(&self, state: &str) -> Option<&StateRules> {
        self.states.get(state)
    }

    pub fn contains(&self, state: &str) -> bool {
        self.states.contains_key(state)
    }

    /// Iterates over the defined states in name order.
    pub fn states(&self) -> impl Iterator<Item = (&str, &StateRules)> {
        self.states.iter().map(|(name, rules)| (name.as_str(), rules))
    }

    /// Returns the number of defined states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Returns the number of rules in the table (two per state).
    pub fn rule_count(&self) -> usize {
        self.states.len() * 2
    }
}

/// Assembles a [`TransitionTable`].
///
/// Defining the same state twice keeps the last definition.
#[derive(Debug, Default, Clone)]
pub struct TableBuilder {
    states: BTreeMap<String, StateRules>,
}

impl TableBuilder {
    /// Defines the rules for `name`: `blank` applies on a blank cell, `filled` on a filled one.
    pub fn state(mut self, name: impl Into<String>, blank: Rule, filled: Rule) -> Self {
        self.states.insert(name.into(), StateRules::new(blank, filled));
        self
    }

    /// Shorthand for [`state`](Self::state) taking `(action, next_state)` pairs.
    ///
    /// ```
    /// use tally::table::TransitionTable;
    /// use tally::types::Action;
    ///
    /// let table = TransitionTable::builder()
    ///     .rules("q1", (Action::Write, "q1"), (Action::Halt, ""))
    ///     .build();
    /// assert!(table.contains("q1"));
    /// ```
    pub fn rules(
        self,
        name: impl Into<String>,
        blank: (Action, &str),
        filled: (Action, &str),
    ) -> Self {
        self.state(name, Rule::new(blank.0, blank.1), Rule::new(filled.0, filled.1))
    }

    /// Finishes the table without any checks.
    pub fn build(self) -> TransitionTable {
        TransitionTable {
            states: self.states,
        }
    }

    /// Finishes the table and runs static analysis from `initial_state`.
    ///
    /// # Returns
    ///
    /// * `Ok(TransitionTable)` if the analyzer finds nothing wrong.
    /// * `Err(TallyError::ValidationError)` with the first problem otherwise.
    pub fn build_checked(self, initial_state: &str) -> Result<TransitionTable, TallyError> {
        let table = self.build();
        analyze(&table, initial_state)?;
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_state_table() -> TransitionTable {
        TransitionTable::builder()
            .rules("q1", (Action::MoveRight, "q2"), (Action::Erase, "q1"))
            .rules("q2", (Action::Write, "q2"), (Action::Halt, ""))
            .build()
    }

    #[test]
    fn test_lookup_selects_branch() {
        let table = two_state_table();

        assert_eq!(
            table.lookup("q1", Cell::Blank),
            Lookup::Found(&Rule::new(Action::MoveRight, "q2"))
        );
        assert_eq!(
            table.lookup("q1", Cell::Filled),
            Lookup::Found(&Rule::new(Action::Erase, "q1"))
        );
    }

    #[test]
    fn test_lookup_unknown_state() {
        let table = two_state_table();

        assert_eq!(table.lookup("q9", Cell::Blank), Lookup::NoRule);
        assert_eq!(table.rule("q9", Cell::Filled), Rule::halt());
    }

    #[test]
    fn test_table_counts() {
        let table = two_state_table();

        assert_eq!(table.len(), 2);
        assert_eq!(table.rule_count(), 4);
        assert!(!table.is_empty());
        assert_eq!(
            table.states().map(|(name, _)| name).collect::<Vec<_>>(),
            vec!["q1", "q2"]
        );
    }

    #[test]
    fn test_redefining_state_keeps_last() {
        let table = TransitionTable::builder()
            .rules("q1", (Action::Write, "q1"), (Action::Halt, ""))
            .rules("q1", (Action::Erase, "q1"), (Action::Halt, ""))
            .build();

        assert_eq!(table.rule("q1", Cell::Blank).action, Action::Erase);
    }

    #[test]
    fn test_build_checked_rejects_undefined_next_state() {
        let result = TransitionTable::builder()
            .rules("q1", (Action::MoveRight, "q2"), (Action::Halt, ""))
            .build_checked("q1");

        assert!(matches!(result, Err(TallyError::ValidationError(_))));
    }

    #[test]
    fn test_build_checked_accepts_valid_table() {
        let result = TransitionTable::builder()
            .rules("q1", (Action::MoveRight, "q2"), (Action::Halt, ""))
            .rules("q2", (Action::Write, "q1"), (Action::MoveLeft, "q1"))
            .build_checked("q1");

        assert!(result.is_ok());
    }

    #[test]
    fn test_table_serialization() {
        let table = two_state_table();
        let json = serde_json::to_value(&table).unwrap();

        assert_eq!(json["states"]["q1"]["blank"]["action"], "MoveRight");
        assert_eq!(json["states"]["q2"]["filled"]["action"], "Halt");
    }
}
