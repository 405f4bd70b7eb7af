use crate::machine::Machine;
use crate::table::TransitionTable;
use crate::types::{Action, TallyError};
use serde::Serialize;

use Action::{Erase, Halt, MoveLeft, MoveRight, Write};

/// A named transition table together with the state it starts from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    /// The name used to look the program up.
    pub name: String,
    /// A one-line description of what the program computes.
    pub description: String,
    /// The state execution starts from.
    pub initial_state: String,
    /// A tape the program is meant to be run on.
    pub sample_tape: String,
    pub table: TransitionTable,
}

impl Program {
    /// Creates a machine running this program on `tape`, starting at `head`.
    pub fn machine(&self, tape: &str, head: usize) -> Result<Machine<'_>, TallyError> {
        Machine::new(tape, head, &self.table, self.initial_state.as_str())
    }
}

/// Unary addition: erases the first tally mark, then fills the gap between the two blocks.
fn addition() -> Program {
    Program {
        name: "addition".to_string(),
        description: "Adds two blocks of tally marks separated by a blank".to_string(),
        initial_state: "q1".to_string(),
        sample_tape: "110111".to_string(),
        table: TransitionTable::builder()
            .rules("q1", (MoveRight, "q2"), (Erase, "q1"))
            .rules("q2", (Write, "q3"), (MoveRight, "q2"))
            .rules("q3", (MoveRight, "q4"), (MoveLeft, "q3"))
            .rules("q4", (Halt, ""), (Halt, ""))
            .build(),
    }
}

/// Fills the current cell and the two cells to its left.
fn fill_three() -> Program {
    Program {
        name: "fill-three".to_string(),
        description: "Fills the current cell and the two cells to its left".to_string(),
        initial_state: "q1".to_string(),
        sample_tape: "0".to_string(),
        table: TransitionTable::builder()
            .rules("q1", (Write, "q1"), (MoveLeft, "q2"))
            .rules("q2", (Write, "q2"), (MoveLeft, "q3"))
            .rules("q3", (Write, "q3"), (Halt, ""))
            .build(),
    }
}

lazy_static::lazy_static! {
    pub static ref PROGRAMS: Vec<Program> = vec![addition(), fill_three()];
}

pub struct ProgramManager;

impl ProgramManager {
    /// Get the number of available programs
    pub fn get_program_count() -> usize {
        PROGRAMS.len()
    }

    /// Get a program by its index
    pub fn get_program_by_index(index: usize) -> Result<&'static Program, TallyError> {
        PROGRAMS.get(index).ok_or_else(|| {
            TallyError::ProgramNotFound(format!("index {} out of range", index))
        })
    }

    /// Get a program by its name
    pub fn get_program_by_name(name: &str) -> Result<&'static Program, TallyError> {
        PROGRAMS
            .iter()
            .find(|program| program.name == name)
            .ok_or_else(|| TallyError::ProgramNotFound(name.to_string()))
    }

    /// List all program names
    pub fn list_program_names() -> Vec<String> {
        PROGRAMS.iter().map(|program| program.name.clone()).collect()
    }

    /// Get information about a program by its index
    pub fn get_program_info(index: usize) -> Result<ProgramInfo, TallyError> {
        let program = Self::get_program_by_index(index)?;

        Ok(ProgramInfo {
            index,
            name: program.name.clone(),
            description: program.description.clone(),
            initial_state: program.initial_state.clone(),
            sample_tape: program.sample_tape.clone(),
            state_count: program.table.len(),
            rule_count: program.table.rule_count(),
        })
    }

    /// Search for programs by name or description
    pub fn search_programs(query: &str) -> Vec<usize> {
        let query = query.to_lowercase();

        PROGRAMS
            .iter()
            .enumerate()
            .filter(|(_, program)| {
                program.name.to_lowercase().contains(&query)
                    || program.description.to_lowercase().contains(&query)
            })
            .map(|(index, _)| index)
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgramInfo {
    pub index: usize,
    pub name: String,
    pub description: String,
    pub initial_state: String,
    pub sample_tape: String,
    pub state_count: usize,
    pub rule_count: usize,
}
