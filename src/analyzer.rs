//! This module provides functions for analyzing transition tables to detect common errors
//! before execution. An unknown state halts a running machine without complaint, so a typo in
//! a next-state name silently truncates a program; these checks surface such mistakes up front.

use crate::table::TransitionTable;
use crate::types::{Rule, TallyError};
use std::collections::HashSet;

/// Represents the problems the analyzer can find in a transition table.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AnalysisError {
    /// The initial state has no entry in the table.
    InvalidStartState(String),
    /// Rules reference next states that have no entry in the table.
    UndefinedNextStates(Vec<String>),
    /// States are defined but cannot be reached from the initial state.
    UnreachableStates(Vec<String>),
}

impl From<AnalysisError> for TallyError {
    /// Converts an `AnalysisError` into a `TallyError::ValidationError`.
    fn from(error: AnalysisError) -> Self {
        match error {
            AnalysisError::InvalidStartState(state) => {
                TallyError::ValidationError(format!("Invalid start state: {}", state))
            }
            AnalysisError::UndefinedNextStates(transitions) => TallyError::ValidationError(
                format!("Transitions reference undefined states: {:?}", transitions),
            ),
            AnalysisError::UnreachableStates(states) => TallyError::ValidationError(format!(
                "Unreachable states detected: {:?}",
                states
            )),
        }
    }
}

/// Analyzes a transition table for structural and logical errors.
///
/// # Arguments
///
/// * `table` - The table to analyze.
/// * `initial_state` - The state execution will start from.
///
/// # Returns
///
/// * `Ok(())` if no errors are found.
/// * `Err(TallyError::ValidationError)` describing the first violated check.
pub fn analyze(table: &TransitionTable, initial_state: &str) -> Result<(), TallyError> {
    let checks: [fn(&TransitionTable, &str) -> Result<(), AnalysisError>; 3] = [
        check_valid_start_state,
        check_undefined_next_states,
        check_unreachable_states,
    ];

    match checks.iter().find_map(|check| check(table, initial_state).err()) {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}

/// Returns the rules of a table that carry a next state, i.e. every rule that does not halt,
/// tagged with the owning state and the cell branch.
fn moving_rules(table: &TransitionTable) -> impl Iterator<Item = (&str, &'static str, &Rule)> {
    table.states().flat_map(|(state, rules)| {
        [("blank", &rules.blank), ("filled", &rules.filled)]
            .into_iter()
            .filter(|(_, rule)| !rule.is_halt())
            .map(move |(branch, rule)| (state, branch, rule))
    })
}

/// Checks whether the initial state is defined in the table.
fn check_valid_start_state(
    table: &TransitionTable,
    initial_state: &str,
) -> Result<(), AnalysisError> {
    if !table.contains(initial_state) {
        return Err(AnalysisError::InvalidStartState(initial_state.to_string()));
    }

    Ok(())
}

/// Checks that every non-halting rule points to a state defined in the table.
///
/// Halting rules are skipped since their next state is never used.
fn check_undefined_next_states(
    table: &TransitionTable,
    _initial_state: &str,
) -> Result<(), AnalysisError> {
    let undefined: Vec<String> = moving_rules(table)
        .filter(|(_, _, rule)| !table.contains(&rule.next_state))
        .map(|(state, branch, rule)| format!("{}[{}] -> {}", state, branch, rule.next_state))
        .collect();

    if !undefined.is_empty() {
        return Err(AnalysisError::UndefinedNextStates(undefined));
    }

    Ok(())
}

/// Checks for unreachable states with a depth-first traversal starting from the initial state.
fn check_unreachable_states(
    table: &TransitionTable,
    initial_state: &str,
) -> Result<(), AnalysisError> {
    let mut visited = HashSet::new();
    let mut queue = vec![initial_state];

    while let Some(state) = queue.pop() {
        if !visited.insert(state) {
            continue;
        }

        if let Some(rules) = table.get(state) {
            for rule in [&rules.blank, &rules.filled] {
                if !rule.is_halt() && !visited.contains(rule.next_state.as_str()) {
                    queue.push(&rule.next_state);
                }
            }
        }
    }

    let mut unreachable: Vec<String> = table
        .states()
        .map(|(name, _)| name)
        .filter(|name| !visited.contains(name))
        .map(str::to_string)
        .collect();

    if !unreachable.is_empty() {
        unreachable.sort();
        return Err(AnalysisError::UnreachableStates(unreachable));
    }

    Ok(())
}
