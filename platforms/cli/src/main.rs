use clap::Parser;
use serde::Serialize;
use std::error::Error;
use std::io::{self, Write};
use std::process;
use tally::{
    Machine, MachineConfig, Mode, NoopObserver, ProgramManager, Tape, WriterObserver,
    DEFAULT_MAX_STEPS,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Runs a built-in Turing machine program on a binary tape and prints the collapsed result.
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  tally-cli --program addition --tape 110111
  tally-cli -p fill-three -t 010101 --trace
  tally-cli --list")]
struct Cli {
    /// Name of the built-in program to run
    #[clap(short, long, default_value = "addition")]
    program: String,

    /// Initial tape made of 0 and 1. Defaults to the program's sample tape
    #[clap(short, long)]
    tape: Option<String>,

    /// Starting cursor position on the initial tape
    #[clap(long, default_value_t = 0)]
    head: usize,

    /// Starting state. Defaults to the program's initial state
    #[clap(short, long)]
    state: Option<String>,

    /// Print the tape after each step of the execution
    #[clap(short = 'd', long)]
    trace: bool,

    /// Treat a state missing from the table as an error instead of a halt
    #[clap(long)]
    strict: bool,

    /// Give up after this many steps
    #[clap(long, default_value_t = DEFAULT_MAX_STEPS, conflicts_with = "unbounded")]
    max_steps: usize,

    /// Run without a step limit. A program that never halts never returns
    #[clap(long)]
    unbounded: bool,

    /// Print a JSON report instead of the bare result
    #[clap(long)]
    json: bool,

    /// List the built-in programs and exit
    #[clap(short, long)]
    list: bool,

    /// Enable debug logging (overridden by RUST_LOG)
    #[clap(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    program: &'a str,
    tape: &'a str,
    initial_state: &'a str,
    steps: usize,
    result: String,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    if cli.list {
        return list_programs(cli.json);
    }

    let program = ProgramManager::get_program_by_name(&cli.program)?;
    let tape = cli.tape.as_deref().unwrap_or(&program.sample_tape);
    let state = cli.state.as_deref().unwrap_or(&program.initial_state);

    let mut machine = Machine::new(tape, cli.head, &program.table, state)?;
    let config = MachineConfig {
        mode: if cli.strict { Mode::Strict } else { Mode::Normal },
        max_steps: (!cli.unbounded).then_some(cli.max_steps),
    };

    info!(program = %program.name, tape, state, ?config, "starting machine");

    let steps = if cli.trace {
        // Keep stdout clean for the JSON report.
        let sink: Box<dyn Write> = if cli.json {
            Box::new(io::stderr())
        } else {
            Box::new(io::stdout())
        };
        run_traced(&mut machine, &config, sink)?
    } else {
        machine.execute(&config, &mut NoopObserver)?
    };

    if cli.json {
        let report = Report {
            program: &program.name,
            tape,
            initial_state: state,
            steps,
            result: machine.result(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", machine.result());
    }

    Ok(())
}

fn run_traced(
    machine: &mut Machine<'_>,
    config: &MachineConfig,
    mut sink: Box<dyn Write>,
) -> Result<usize, Box<dyn Error>> {
    writeln!(sink, "Initial state:")?;
    print_tape(&mut sink, machine.tape())?;
    writeln!(sink, "Starting program:")?;

    let mut observer = WriterObserver::new(&mut sink);
    let outcome = machine.execute(config, &mut observer);
    if let Some(e) = observer.last_error() {
        warn!(error = %e, "failed to write trace");
    }
    drop(observer);

    let steps = outcome?;
    writeln!(sink, "End result:")?;
    print_tape(&mut sink, machine.tape())?;

    Ok(steps)
}

fn print_tape(sink: &mut dyn Write, tape: &Tape) -> io::Result<()> {
    let (cursor_line, tape_line) = tape.render();
    writeln!(sink, "{}", cursor_line)?;
    writeln!(sink, "{}", tape_line)
}

fn list_programs(json: bool) -> Result<(), Box<dyn Error>> {
    let infos = (0..ProgramManager::get_program_count())
        .map(ProgramManager::get_program_info)
        .collect::<Result<Vec<_>, _>>()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    for info in infos {
        println!(
            "{:<12} {} (start: {}, sample: {})",
            info.name, info.description, info.initial_state, info.sample_tape
        );
    }

    Ok(())
}
