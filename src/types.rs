//! This module defines the core data structures and types used throughout the simulator,
//! including cells, actions, rules, execution outcomes and the crate error type.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The character used to display a blank cell.
pub const BLANK_SYMBOL: char = '0';
/// The character used to display a filled cell.
pub const FILLED_SYMBOL: char = '1';
/// The character marking the cursor position in a rendered tape.
pub const CURSOR_SYMBOL: char = '*';
/// The default number of steps a bounded run executes before giving up.
pub const DEFAULT_MAX_STEPS: usize = 10000;

/// A single tape cell. A cell is either blank or filled, nothing else.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Blank,
    Filled,
}

impl Cell {
    /// Returns the display symbol of the cell (`0` or `1`).
    pub fn symbol(self) -> char {
        match self {
            Cell::Blank => BLANK_SYMBOL,
            Cell::Filled => FILLED_SYMBOL,
        }
    }

    pub fn is_filled(self) -> bool {
        self == Cell::Filled
    }
}

impl From<bool> for Cell {
    fn from(filled: bool) -> Self {
        if filled {
            Cell::Filled
        } else {
            Cell::Blank
        }
    }
}

impl TryFrom<char> for Cell {
    type Error = char;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            BLANK_SYMBOL => Ok(Cell::Blank),
            FILLED_SYMBOL => Ok(Cell::Filled),
            other => Err(other),
        }
    }
}

/// The action a rule prescribes for the cell under the cursor.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Stop execution. Carries no next state.
    #[default]
    Halt,
    /// Move the cursor one position to the left.
    MoveLeft,
    /// Move the cursor one position to the right.
    MoveRight,
    /// Set the current cell to blank.
    Erase,
    /// Set the current cell to filled.
    Write,
}

impl Action {
    /// The literal tag printed in execution traces.
    pub fn tag(self) -> &'static str {
        match self {
            Action::Halt => "HALT",
            Action::MoveLeft => "LEFT",
            Action::MoveRight => "RIGHT",
            Action::Erase => "ERASE",
            Action::Write => "WRITE",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A single transition rule: the action to take and the state to enter afterwards.
///
/// The next state is meaningless when the action is [`Action::Halt`].
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub action: Action,
    pub next_state: String,
}

impl Rule {
    pub fn new(action: Action, next_state: impl Into<String>) -> Self {
        Self {
            action,
            next_state: next_state.into(),
        }
    }

    /// The halting rule, `(Halt, "")`.
    pub fn halt() -> Self {
        Self::default()
    }

    pub fn is_halt(&self) -> bool {
        self.action == Action::Halt
    }
}

/// The pair of rules defined for one state, one per cell value.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRules {
    /// Rule applied when the cursor is on a blank cell.
    pub blank: Rule,
    /// Rule applied when the cursor is on a filled cell.
    pub filled: Rule,
}

impl StateRules {
    pub fn new(blank: Rule, filled: Rule) -> Self {
        Self { blank, filled }
    }

    /// Selects the rule for the given cell.
    pub fn rule(&self, cell: Cell) -> &Rule {
        match cell {
            Cell::Blank => &self.blank,
            Cell::Filled => &self.filled,
        }
    }
}

/// Controls how the machine handles a state that has no entry in the transition table.
///
/// - `Normal` (default): the unknown state halts the machine immediately, leaving the tape untouched.
/// - `Strict`: the unknown state halts the machine with [`TallyError::UndefinedState`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Normal,
    Strict,
}

/// Execution settings for a machine.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineConfig {
    /// Unknown-state policy.
    pub mode: Mode,
    /// Upper bound on executed steps. `None` runs until the machine halts, which may be never.
    pub max_steps: Option<usize>,
}

/// Represents the outcome of a single execution step.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// The machine performed a transition and can continue.
    Continue,
    /// The machine has halted. No further transitions fire.
    Halt(Halt),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Halt {
    /// A halting action was reached.
    Ok,

    Err(TallyError),
}

/// Represents the errors that can occur while building or running a machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TallyError {
    /// The initial tape string had zero length.
    #[error("Tape length cannot be 0")]
    EmptyTape,
    /// The initial tape string contained something other than `0` or `1`.
    #[error("Invalid tape symbol {symbol:?} at index {index}")]
    InvalidTapeSymbol { index: usize, symbol: char },
    /// The starting cursor position lies outside the initial tape.
    #[error("Invalid head position {head} for tape of length {len}")]
    InvalidHead { head: usize, len: usize },
    /// The current state has no entry in the transition table (strict mode only).
    #[error("No rule defined for state {0:?}")]
    UndefinedState(String),
    /// A bounded run did not halt within its step budget.
    #[error("Machine did not halt within {0} steps")]
    StepLimitExceeded(usize),
    /// A transition table failed static analysis.
    #[error("Program validation error: {0}")]
    ValidationError(String),
    /// No built-in program with the given name or index exists.
    #[error("Program not found: {0}")]
    ProgramNotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_serialization() {
        let left_json = serde_json::to_string(&Action::MoveLeft).unwrap();
        assert_eq!(left_json, "\"MoveLeft\"");

        let deserialized: Action = serde_json::from_str(&left_json).unwrap();
        assert_eq!(deserialized, Action::MoveLeft);
    }

    #[test]
    fn test_action_tags() {
        assert_eq!(Action::Halt.to_string(), "HALT");
        assert_eq!(Action::MoveLeft.to_string(), "LEFT");
        assert_eq!(Action::MoveRight.to_string(), "RIGHT");
        assert_eq!(Action::Erase.to_string(), "ERASE");
        assert_eq!(Action::Write.to_string(), "WRITE");
    }

    #[test]
    fn test_default_rule_is_halt() {
        let rule = Rule::default();
        assert!(rule.is_halt());
        assert_eq!(rule, Rule::halt());
        assert!(rule.next_state.is_empty());
    }

    #[test]
    fn test_cell_conversions() {
        assert_eq!(Cell::try_from('1'), Ok(Cell::Filled));
        assert_eq!(Cell::try_from('0'), Ok(Cell::Blank));
        assert_eq!(Cell::try_from('x'), Err('x'));
        assert_eq!(Cell::from(true), Cell::Filled);
        assert_eq!(Cell::Blank.symbol(), '0');
    }

    #[test]
    fn test_state_rules_selects_branch() {
        let rules = StateRules::new(
            Rule::new(Action::MoveRight, "q2"),
            Rule::new(Action::Erase, "q1"),
        );

        assert_eq!(rules.rule(Cell::Blank).action, Action::MoveRight);
        assert_eq!(rules.rule(Cell::Filled).next_state, "q1");
    }

    #[test]
    fn test_error_display() {
        let error = TallyError::UndefinedState("q9".to_string());

        let error_msg = format!("{}", error);
        assert!(error_msg.contains("No rule defined"));
        assert!(error_msg.contains("q9"));
        assert_eq!(TallyError::EmptyTape.to_string(), "Tape length cannot be 0");
    }
}
