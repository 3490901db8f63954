use rand::Rng;

use crate::Automaton;
use crate::State;
use crate::StateId;
use crate::EPSILON;

/// Returns the lower case letters used as the alphabet of random automata.
fn random_symbols(num_of_symbols: u32) -> Vec<String> {
    debug_assert!(num_of_symbols <= 26, "There are only 26 lower case letters");

    (0..num_of_symbols)
        .filter_map(|i| char::from_digit(i + 10, 36))
        .map(String::from)
        .collect()
}

/// Generates a nondeterministic automaton with the desired number of states
/// and symbols, where every state has at most `outdegree` targets per symbol.
/// The first state is initial, the epsilon transitions are sparser than the
/// others.
pub fn random_nfa(num_of_states: usize, num_of_symbols: u32, outdegree: usize) -> Automaton {
    debug_assert!(num_of_states > 0, "An automaton needs at least one state");

    let mut rng = rand::rng();
    let symbols = random_symbols(num_of_symbols);

    let mut states: Vec<State> = Vec::with_capacity(num_of_states);
    for id in 0..num_of_states {
        let mut state = State::new(id, format!("q{id}"), id == 0, rng.random_bool(0.3));

        for symbol in std::iter::once(EPSILON).chain(symbols.iter().map(String::as_str)) {
            let degree = if symbol == EPSILON {
                rng.random_range(0..=1)
            } else {
                rng.random_range(0..=outdegree)
            };

            let mut targets: Vec<StateId> = (0..degree).map(|_| rng.random_range(0..num_of_states)).collect();
            targets.sort_unstable();
            targets.dedup();

            state.outputs.set_targets(symbol, targets);
        }

        states.push(state);
    }

    Automaton::from_states(states, symbols, true)
}

/// Generates a complete deterministic automaton with the desired number of
/// states and symbols. The first state is initial and at least one state is
/// final.
pub fn random_dfa(num_of_states: usize, num_of_symbols: u32) -> Automaton {
    debug_assert!(num_of_states > 0, "An automaton needs at least one state");

    let mut rng = rand::rng();
    let symbols = random_symbols(num_of_symbols);

    let mut states: Vec<State> = Vec::with_capacity(num_of_states);
    for id in 0..num_of_states {
        let mut state = State::new(id, format!("q{id}"), id == 0, rng.random_bool(0.4));

        for symbol in &symbols {
            state.outputs.set_targets(symbol, vec![rng.random_range(0..num_of_states)]);
        }

        states.push(state);
    }

    if !states.iter().any(|state| state.is_final) {
        let last = states.len() - 1;
        states[last].is_final = true;
    }

    Automaton::from_states(states, symbols, false)
}
