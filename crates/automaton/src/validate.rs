use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::Automaton;
use crate::StateId;

/// Violations of the preconditions of the reductions. An automaton with any of
/// these violations must not be passed to them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreconditionViolation {
    #[error("State {0} has an empty name")]
    EmptyName(StateId),

    #[error("The name {0:?} is used by more than one state")]
    DuplicateName(String),

    #[error("The identifier {0} is used by more than one state")]
    DuplicateId(StateId),

    #[error("Expected exactly one initial state, but found {0}")]
    InitialStateCount(usize),

    #[error("There is no final state")]
    NoFinalState,

    #[error("State {from} has a transition on {symbol:?} to the unknown state {to}")]
    DanglingTarget {
        from: StateId,
        symbol: String,
        to: StateId,
    },

    #[error("State {state} has {count} transitions on {symbol:?}, but a deterministic automaton needs exactly one")]
    NotDeterministic {
        state: StateId,
        symbol: String,
        count: usize,
    },

    #[error("Expected a {expected}, but the automaton is a {actual}")]
    WrongMode {
        expected: &'static str,
        actual: &'static str,
    },
}

/// Checks the preconditions of the subset construction.
///
/// Zero final states are allowed, the resulting deterministic automaton then
/// has no final states either.
pub fn check_nfa(automaton: &Automaton) -> Result<(), PreconditionViolation> {
    check_mode(automaton, true)?;
    check_states(automaton, false)?;
    check_targets(automaton)
}

/// Checks the preconditions of the minimization.
pub fn check_dfa(automaton: &Automaton) -> Result<(), PreconditionViolation> {
    check_mode(automaton, false)?;
    check_states(automaton, true)?;
    check_targets(automaton)
}

/// Returns true iff the automaton can be converted by the subset construction.
pub fn is_convertible(automaton: &Automaton) -> bool {
    check_nfa(automaton).is_ok()
}

/// Returns true iff the automaton can be minimized.
pub fn is_minimizable(automaton: &Automaton) -> bool {
    check_dfa(automaton).is_ok()
}

fn mode_name(is_nfa: bool) -> &'static str {
    if is_nfa {
        "nondeterministic automaton"
    } else {
        "deterministic automaton"
    }
}

fn check_mode(automaton: &Automaton, is_nfa: bool) -> Result<(), PreconditionViolation> {
    if automaton.is_nfa() != is_nfa {
        return Err(PreconditionViolation::WrongMode {
            expected: mode_name(is_nfa),
            actual: mode_name(automaton.is_nfa()),
        });
    }

    Ok(())
}

/// Checks the names, identifiers and flags of all states. For deterministic
/// automata also checks that every symbol has exactly one target.
fn check_states(automaton: &Automaton, deterministic: bool) -> Result<(), PreconditionViolation> {
    let mut names: FxHashSet<&str> = FxHashSet::default();
    let mut ids: FxHashSet<StateId> = FxHashSet::default();
    let mut initial_count = 0;
    let mut final_count = 0;

    for state in automaton.states() {
        if state.name.is_empty() {
            return Err(PreconditionViolation::EmptyName(state.id));
        }

        if !names.insert(&state.name) {
            return Err(PreconditionViolation::DuplicateName(state.name.clone()));
        }

        if !ids.insert(state.id) {
            return Err(PreconditionViolation::DuplicateId(state.id));
        }

        if state.is_initial {
            initial_count += 1;
        }

        if state.is_final {
            final_count += 1;
        }

        if deterministic {
            for symbol in automaton.symbols() {
                let count = state.outputs.targets(symbol).len();
                if count != 1 {
                    return Err(PreconditionViolation::NotDeterministic {
                        state: state.id,
                        symbol: symbol.clone(),
                        count,
                    });
                }
            }
        }
    }

    if initial_count != 1 {
        return Err(PreconditionViolation::InitialStateCount(initial_count));
    }

    if deterministic && final_count == 0 {
        return Err(PreconditionViolation::NoFinalState);
    }

    Ok(())
}

/// Checks that all targets refer to existing states.
fn check_targets(automaton: &Automaton) -> Result<(), PreconditionViolation> {
    let ids: FxHashSet<StateId> = automaton.states().iter().map(|state| state.id).collect();

    for state in automaton.states() {
        for symbol in automaton.full_symbols() {
            if let Some(to) = state.outputs.targets(symbol).iter().find(|to| !ids.contains(to)) {
                return Err(PreconditionViolation::DanglingTarget {
                    from: state.id,
                    symbol: symbol.to_string(),
                    to: *to,
                });
            }
        }
    }

    Ok(())
}
