//! This module defines the `Machine`, which couples a tape, a current state and a borrowed
//! transition table, and drives execution one step at a time.
//!
//! `step` is the primitive. `run` loops over it until a halting action and carries no bound of
//! its own: a table that never halts keeps the loop going forever. Callers that need a bound
//! use `run_bounded`, or drive `step` themselves.

use crate::observer::{NoopObserver, Observer, Snapshot};
use crate::table::{Lookup, TransitionTable};
use crate::tape::Tape;
use crate::types::{Action, Cell, Halt, MachineConfig, Mode, Rule, Step, TallyError};
use tracing::{debug, info, warn};

/// A single-tape binary Turing machine.
///
/// The machine owns its tape and borrows its transition table, so any number of machines
/// can run over the same table.
#[derive(Debug, Clone)]
pub struct Machine<'t> {
    tape: Tape,
    state: String,
    table: &'t TransitionTable,
    mode: Mode,
    step_count: usize,
    halted: Option<Halt>,
}

impl<'t> Machine<'t> {
    /// Creates a machine from an initial tape string, a starting cursor position, a
    /// transition table and a starting state.
    ///
    /// # Arguments
    ///
    /// * `tape` - The initial tape, made of `0` (blank) and `1` (filled) characters.
    /// * `head` - The starting cursor position, an index into `tape`.
    /// * `table` - The transition table to execute.
    /// * `state` - The starting state.
    ///
    /// # Returns
    ///
    /// * `Err(TallyError::EmptyTape)` if `tape` is empty.
    /// * `Err(TallyError::InvalidTapeSymbol)` if `tape` holds anything but `0` and `1`.
    /// * `Err(TallyError::InvalidHead)` if `head` lies outside `tape`.
    pub fn new(
        tape: &str,
        head: usize,
        table: &'t TransitionTable,
        state: impl Into<String>,
    ) -> Result<Self, TallyError> {
        Ok(Self::from_tape(Tape::parse(tape, head)?, table, state))
    }

    /// Creates a machine over an already built tape.
    pub fn from_tape(tape: Tape, table: &'t TransitionTable, state: impl Into<String>) -> Self {
        Self {
            tape,
            state: state.into(),
            table,
            mode: Mode::default(),
            step_count: 0,
            halted: None,
        }
    }

    /// Sets how a state missing from the table is handled.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Executes a single step.
    ///
    /// # Returns
    ///
    /// * `Step::Continue` if a non-halting action was applied.
    /// * `Step::Halt(Halt::Ok)` if the rule for the current state and cell was a halt, or the
    ///   state is unknown in `Mode::Normal`.
    /// * `Step::Halt(Halt::Err(_))` if the state is unknown in `Mode::Strict`.
    ///
    /// Once halted, every further call returns the same outcome and changes nothing.
    pub fn step(&mut self) -> Step {
        self.step_with(&mut NoopObserver)
    }

    /// Executes a single step and reports the result to `observer`.
    pub fn step_with(&mut self, observer: &mut dyn Observer) -> Step {
        if let Some(halt) = &self.halted {
            return Step::Halt(halt.clone());
        }

        let cell = self.tape.read();
        let rule = match self.resolve(cell) {
            Ok(rule) => rule,
            Err(e) => {
                warn!(state = %self.state, error = %e, "machine stopped on undefined state");
                self.halted = Some(Halt::Err(e.clone()));
                return Step::Halt(Halt::Err(e));
            }
        };

        self.apply(rule.action);
        self.step_count += 1;

        debug!(
            step = self.step_count,
            state = %self.state,
            cell = ?cell,
            action = %rule.action,
            next_state = %rule.next_state,
            head = self.tape.head(),
            "step"
        );

        let halting = rule.is_halt();
        observer.observe(&Snapshot {
            step: self.step_count,
            action: rule.action,
            state: &self.state,
            next_state: (!halting).then_some(rule.next_state.as_str()),
            tape: &self.tape,
        });

        if halting {
            info!(steps = self.step_count, result = %self.result(), "machine halted");
            self.halted = Some(Halt::Ok);
            return Step::Halt(Halt::Ok);
        }

        self.state.clone_from(&rule.next_state);
        Step::Continue
    }

    /// Finds the rule for the current state and `cell`, applying the unknown-state policy.
    fn resolve(&self, cell: Cell) -> Result<Rule, TallyError> {
        match self.table.lookup(&self.state, cell) {
            Lookup::Found(rule) => Ok(rule.clone()),
            Lookup::NoRule => match self.mode {
                Mode::Normal => {
                    warn!(state = %self.state, "no rule for state, halting");
                    Ok(Rule::halt())
                }
                Mode::Strict => Err(TallyError::UndefinedState(self.state.clone())),
            },
        }
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Halt => {}
            Action::MoveLeft => self.tape.move_left(),
            Action::MoveRight => self.tape.move_right(),
            Action::Erase => self.tape.write(Cell::Blank),
            Action::Write => self.tape.write(Cell::Filled),
        }
    }

    /// Runs the machine until it halts. There is no step limit: a table that never
    /// halts never returns.
    pub fn run(&mut self) -> Step {
        self.run_with(&mut NoopObserver)
    }

    /// Like [`run`](Self::run), reporting every step to `observer`.
    pub fn run_with(&mut self, observer: &mut dyn Observer) -> Step {
        loop {
            if let Step::Halt(halt) = self.step_with(observer) {
                return Step::Halt(halt);
            }
        }
    }

    /// Runs at most `limit` further steps.
    ///
    /// # Returns
    ///
    /// * `Ok(steps)` with the total step count once the machine halts.
    /// * `Err(TallyError::StepLimitExceeded)` if it is still running after `limit` steps. The
    ///   machine is left as it was, so the run can be resumed.
    /// * `Err(TallyError::UndefinedState)` if the machine halts on an unknown state in strict mode.
    pub fn run_bounded(&mut self, limit: usize) -> Result<usize, TallyError> {
        self.run_bounded_with(limit, &mut NoopObserver)
    }

    /// Like [`run_bounded`](Self::run_bounded), reporting every step to `observer`.
    pub fn run_bounded_with(
        &mut self,
        limit: usize,
        observer: &mut dyn Observer,
    ) -> Result<usize, TallyError> {
        let mut remaining = limit;

        loop {
            if let Some(halt) = &self.halted {
                return match halt {
                    Halt::Ok => Ok(self.step_count),
                    Halt::Err(e) => Err(e.clone()),
                };
            }

            if remaining == 0 {
                debug!(limit, steps = self.step_count, "step limit reached");
                return Err(TallyError::StepLimitExceeded(limit));
            }

            self.step_with(observer);
            remaining -= 1;
        }
    }

    /// Runs according to `config`: bounded when `max_steps` is set, unbounded otherwise.
    /// The configured mode replaces the machine's current one.
    pub fn execute(
        &mut self,
        config: &MachineConfig,
        observer: &mut dyn Observer,
    ) -> Result<usize, TallyError> {
        self.mode = config.mode;

        match config.max_steps {
            Some(limit) => self.run_bounded_with(limit, observer),
            None => match self.run_with(observer) {
                Step::Halt(Halt::Err(e)) => Err(e),
                _ => Ok(self.step_count),
            },
        }
    }

    /// Returns the collapsed tape: leading and trailing blanks removed.
    pub fn result(&self) -> String {
        self.tape.collapse()
    }

    /// Returns the current state. Its value after halting is not meaningful.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Returns the total number of steps executed.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn is_halted(&self) -> bool {
        self.halted.is_some()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns the cursor position in the tape's backing buffer.
    pub fn head(&self) -> usize {
        self.tape.head()
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn table(&self) -> &'t TransitionTable {
        self.table
    }
}
