//! This crate provides the core logic for a single-tape binary Turing machine.
//! It includes the growable tape, immutable transition tables, the step/run engine,
//! static analysis of tables, per-step observers and a small set of built-in programs.

pub mod analyzer;
pub mod machine;
pub mod observer;
pub mod programs;
pub mod table;
pub mod tape;
pub mod types;

/// Re-exports the `analyze` function and `AnalysisError` enum from the analyzer module.
pub use analyzer::{analyze, AnalysisError};
/// Re-exports the `Machine` struct from the machine module.
pub use machine::Machine;
/// Re-exports the observer trait and the stock observers.
pub use observer::{NoopObserver, Observer, RecordedStep, Recorder, Snapshot, WriterObserver};
/// Re-exports `Program`, `ProgramInfo`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{Program, ProgramInfo, ProgramManager, PROGRAMS};
/// Re-exports the transition table types from the table module.
pub use table::{Lookup, TableBuilder, TransitionTable};
/// Re-exports the `Tape` struct from the tape module.
pub use tape::Tape;
/// Re-exports the core value types from the types module.
pub use types::{
    Action, Cell, Halt, MachineConfig, Mode, Rule, StateRules, Step, TallyError,
    DEFAULT_MAX_STEPS,
};
