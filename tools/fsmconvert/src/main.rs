use std::fs::File;
use std::io::stdout;
use std::io::BufWriter;
use std::io::Write;
use std::process::ExitCode;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use clap::ValueEnum;
use itertools::Itertools;
use log::info;

use fsmkit_automaton::check_dfa;
use fsmkit_automaton::check_nfa;
use fsmkit_automaton::Automaton;
use fsmkit_io::read_table;
use fsmkit_io::write_table;
use fsmkit_reduction::dfa_minimize;
use fsmkit_reduction::nfa_to_dfa;
use fsmkit_reduction::PartitionRounds;
use fsmkit_utilities::Timing;

#[derive(Clone, Debug, ValueEnum)]
enum Operation {
    /// Converts a nondeterministic automaton into a deterministic one.
    Determinize,

    /// Minimizes a deterministic automaton.
    Minimize,
}

#[derive(clap::Parser, Debug)]
#[command(name = "fsmconvert", about = "A finite automaton conversion tool")]
struct Cli {
    operation: Operation,

    #[arg(value_name = "FILE")]
    filename: String,

    output: Option<String>,

    /// Print the time of every phase.
    #[arg(long)]
    time: bool,

    /// Print the partition of every refinement round after minimization.
    #[arg(long)]
    rounds: bool,
}

fn main() -> Result<ExitCode> {
    env_logger::init();

    let cli = Cli::parse();

    let mut timing = Timing::new();

    let mut read_time = timing.start("read");
    let file = File::open(&cli.filename).with_context(|| format!("Cannot open {}", cli.filename))?;
    let automaton = read_table(file).with_context(|| format!("Cannot read {}", cli.filename))?;
    read_time.finish();

    info!("Read automaton {automaton}");

    let mut operation_time = timing.start("operation");
    let result = match cli.operation {
        Operation::Determinize => {
            check_nfa(&automaton).context("The automaton cannot be determinized")?;

            let (dfa, symbols) = nfa_to_dfa(&automaton);
            info!("Determinized over symbols {}", symbols.iter().join(", "));
            dfa
        }
        Operation::Minimize => {
            check_dfa(&automaton).context("The automaton cannot be minimized")?;

            let (minimal, rounds) = dfa_minimize(&automaton);
            if cli.rounds {
                eprintln!("{}", format_rounds(&automaton, &rounds));
            }

            minimal
        }
    };
    operation_time.finish();

    info!("Resulting automaton {result}");

    let mut write_time = timing.start("write");
    if let Some(file) = cli.output {
        let mut writer = BufWriter::new(File::create(&file).with_context(|| format!("Cannot create {file}"))?);
        write_table(&mut writer, &result)?;
        writer.flush()?;
    } else {
        write_table(&mut stdout(), &result)?;
    }
    write_time.finish();

    if cli.time {
        timing.print();
    }

    Ok(ExitCode::SUCCESS)
}

/// Formats every round as `P_i = {{q0,q1}, {q2}}` on its own line, using the state names.
fn format_rounds(dfa: &Automaton, rounds: &PartitionRounds) -> String {
    let states_by_id = dfa.states_by_id();

    rounds
        .iter()
        .enumerate()
        .map(|(index, round)| {
            let groups = round
                .iter()
                .map(|group| {
                    let names: Vec<&str> = group
                        .iter()
                        .filter_map(|id| states_by_id.get(id))
                        .map(|state| state.name.as_str())
                        .collect();
                    format!("{{{}}}", names.join(","))
                })
                .join(", ");

            format!("P_{index} = {{{groups}}}")
        })
        .join("\n")
}

#[cfg(test)]
mod tests {
    use fsmkit_automaton::State;
    use test_log::test;

    use super::*;

    #[test]
    fn test_format_rounds() {
        // Accepts the words that end with b, states 0 and 1 are equivalent.
        let dfa = Automaton::from_states(
            vec![
                State::new(0, "q0", true, false).with_targets("a", &[1]).with_targets("b", &[2]),
                State::new(1, "q1", false, false).with_targets("a", &[1]).with_targets("b", &[2]),
                State::new(2, "q2", false, true).with_targets("a", &[1]).with_targets("b", &[2]),
            ],
            vec!["a".into(), "b".into()],
            false,
        );

        let (_, rounds) = dfa_minimize(&dfa);
        assert_eq!(
            format_rounds(&dfa, &rounds),
            "P_0 = {{q2}, {q0,q1}}\nP_1 = {{q2}, {q0,q1}}"
        );
    }
}
