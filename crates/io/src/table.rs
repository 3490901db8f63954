use std::io::Read;
use std::io::Write;

use fsmkit_automaton::Automaton;
use fsmkit_automaton::State;
use fsmkit_automaton::StateId;
use fsmkit_automaton::EPSILON;
use itertools::Itertools;
use log::trace;
use regex::Regex;
use streaming_iterator::StreamingIterator;
use thiserror::Error;

use crate::line_iterator::LineIterator;

/// The columns that precede the symbols in every row.
const FIXED_COLUMNS: [&str; 4] = ["id", "node", "q0", "F"];

#[derive(Error, Debug)]
pub enum IOError {
    #[error("Invalid table header: {0}")]
    InvalidHeader(&'static str),

    #[error("Line {line}: expected {expected} columns, but found {found}")]
    InvalidColumnCount { line: usize, expected: usize, found: usize },

    #[error("Line {line}: invalid state identifier {value:?}")]
    InvalidId { line: usize, value: String },

    #[error("Line {line}: state identifier {id} occurs twice")]
    DuplicateId { line: usize, id: StateId },

    #[error("Line {line}: expected true or false, but found {value:?}")]
    InvalidFlag { line: usize, value: String },

    #[error("Line {line}: invalid target {value:?}")]
    InvalidTarget { line: usize, value: String },

    #[error("The table contains no states")]
    NoStates,

    #[error("State {id} has the name {name:?}, which cannot be written to a table")]
    InvalidName { id: StateId, name: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Loads an automaton in the table format from the given reader.
///
/// The table format consists of a header that lists the symbols, where an
/// epsilon column indicates a nondeterministic automaton:
///     `|id|node|q0|F|ε|a|b|`
///
/// An optional separator:
///     `|---|---|---|---|---|---|---|`
///
/// And one row for every state, with comma separated targets for every symbol:
///     `|0|q0|true|false|1,2||0|`
///
/// Empty lines are ignored. The automaton is not validated.
pub fn read_table(reader: impl Read) -> Result<Automaton, IOError> {
    let mut lines = LineIterator::new(reader);

    // Regex for |---|---|...|, allowing for alignment markers.
    let separator_regex = Regex::new(r#"^\s*\|(\s*:?-{3,}:?\s*\|)+\s*$"#).expect("Regex compilation should not fail");

    let mut line_number = 0;

    // The header is the first line that is not empty.
    let symbols = loop {
        lines.advance();
        let Some(line) = lines.get() else {
            if let Some(error) = lines.take_error() {
                return Err(error.into());
            }

            return Err(IOError::InvalidHeader("The first line should be the header"));
        };

        line_number += 1;
        if !line.trim().is_empty() {
            break parse_header(&split_row(line))?;
        }
    };

    let mut states: Vec<State> = Vec::new();
    while let Some(line) = lines.next() {
        line_number += 1;
        trace!("{}", line);

        if line.trim().is_empty() || separator_regex.is_match(line) {
            continue;
        }

        let cells = split_row(line);
        let expected = FIXED_COLUMNS.len() + symbols.len();
        if cells.len() != expected {
            return Err(IOError::InvalidColumnCount {
                line: line_number,
                expected,
                found: cells.len(),
            });
        }

        let id: StateId = cells[0].parse().map_err(|_| IOError::InvalidId {
            line: line_number,
            value: cells[0].to_string(),
        })?;

        if states.iter().any(|state| state.id == id) {
            return Err(IOError::DuplicateId { line: line_number, id });
        }

        let is_initial = parse_flag(cells[2], line_number)?;
        let is_final = parse_flag(cells[3], line_number)?;

        let mut state = State::new(id, cells[1], is_initial, is_final);
        for (symbol, cell) in symbols.iter().zip(&cells[FIXED_COLUMNS.len()..]) {
            state.outputs.set_targets(symbol, parse_targets(cell, line_number)?);
        }

        trace!("Read state {id} {}", state.name);
        states.push(state);
    }

    if let Some(error) = lines.take_error() {
        return Err(error.into());
    }

    if states.is_empty() {
        return Err(IOError::NoStates);
    }

    let is_nfa = symbols.iter().any(|symbol| symbol == EPSILON);
    let symbols = symbols.into_iter().filter(|symbol| symbol != EPSILON).collect();
    Ok(Automaton::from_states(states, symbols, is_nfa))
}

/// Write the automaton in the table format to the given writer, see [read_table].
///
/// Names must survive reading the table again: they cannot contain bars or
/// line breaks, and cannot start or end with whitespace. Otherwise nothing is
/// written and [IOError::InvalidName] is returned.
pub fn write_table(writer: &mut impl Write, automaton: &Automaton) -> Result<(), IOError> {
    if let Some(state) = automaton.states().iter().find(|state| !is_writable_name(&state.name)) {
        return Err(IOError::InvalidName {
            id: state.id,
            name: state.name.clone(),
        });
    }

    let symbols: Vec<&str> = automaton.full_symbols().collect();

    writeln!(writer, "|{}|", FIXED_COLUMNS.iter().chain(symbols.iter()).join("|"))?;
    writeln!(writer, "{}|", "|---".repeat(FIXED_COLUMNS.len() + symbols.len()))?;

    for state in automaton.states() {
        write!(
            writer,
            "|{}|{}|{}|{}|",
            state.id, state.name, state.is_initial, state.is_final
        )?;

        for symbol in &symbols {
            write!(writer, "{}|", state.outputs.targets(symbol).iter().join(","))?;
        }

        writeln!(writer)?;
    }

    Ok(())
}

/// Returns true iff the name is read back unchanged from a row.
fn is_writable_name(name: &str) -> bool {
    name.trim() == name && !name.contains(&['|', '\n', '\r'][..])
}

/// Splits a row into its trimmed cells, without the empty cells outside of the outer bars.
fn split_row(line: &str) -> Vec<&str> {
    let line = line.trim();
    let line = line.strip_prefix('|').unwrap_or(line);
    let line = line.strip_suffix('|').unwrap_or(line);

    line.split('|').map(str::trim).collect()
}

/// Checks the fixed columns of the header and returns its symbols.
fn parse_header(cells: &[&str]) -> Result<Vec<String>, IOError> {
    if cells.len() < FIXED_COLUMNS.len() || cells[..FIXED_COLUMNS.len()] != FIXED_COLUMNS {
        return Err(IOError::InvalidHeader("The first line should start with |id|node|q0|F|"));
    }

    let symbols: Vec<String> = cells[FIXED_COLUMNS.len()..].iter().map(|cell| cell.to_string()).collect();
    if symbols.iter().any(|symbol| symbol.is_empty()) {
        return Err(IOError::InvalidHeader("Symbols cannot be empty"));
    }

    if !symbols.iter().all_unique() {
        return Err(IOError::InvalidHeader("Symbols must be unique"));
    }

    Ok(symbols)
}

fn parse_flag(cell: &str, line: usize) -> Result<bool, IOError> {
    if cell.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if cell.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(IOError::InvalidFlag {
            line,
            value: cell.to_string(),
        })
    }
}

/// Parses a comma separated list of targets, sorted in ascending order.
fn parse_targets(cell: &str, line: usize) -> Result<Vec<StateId>, IOError> {
    let mut targets = cell
        .split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| {
            value.parse::<StateId>().map_err(|_| IOError::InvalidTarget {
                line,
                value: value.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    targets.sort_unstable();
    Ok(targets)
}
