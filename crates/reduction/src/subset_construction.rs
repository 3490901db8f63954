use std::time::Instant;

use fsmkit_automaton::Automaton;
use fsmkit_automaton::State;
use fsmkit_automaton::StateId;
use itertools::Itertools;
use log::debug;
use log::trace;
use rustc_hash::FxHashMap;

use crate::EpsilonClosure;
use crate::StateSet;

/// The canonical name of the empty set of states, an implicit non-accepting sink.
pub const NOTHING: &str = "nothing";

/// Converts a nondeterministic automaton, possibly with epsilon transitions,
/// into an equivalent deterministic automaton. Returns the deterministic
/// automaton and its alphabet, which is the input alphabet without epsilon.
///
/// Every state of the result is a set of input states and is identified by its
/// canonical name, see [canonical_name]. Sets are discovered depth first from
/// the closure of the initial state, which becomes state 0. The empty set, if
/// it is reachable, becomes the last state.
///
/// The automaton must satisfy [fsmkit_automaton::check_nfa].
pub fn nfa_to_dfa(nfa: &Automaton) -> (Automaton, Vec<String>) {
    let start = Instant::now();

    debug_assert!(
        nfa.states().iter().filter(|state| state.is_initial).count() == 1,
        "The subset construction requires exactly one initial state"
    );

    let initial = match nfa.initial_state() {
        Some(state) => state.id,
        None => panic!("The subset construction requires exactly one initial state"),
    };

    let states_by_id = nfa.states_by_id();
    let symbols: Vec<String> = nfa.symbols().to_vec();
    let closure = EpsilonClosure::new(nfa);

    // For every state and symbol, the closed set of states reachable from its closure.
    let mut reachable: FxHashMap<StateId, Vec<StateSet>> = FxHashMap::default();
    for state in nfa.states() {
        let per_symbol = symbols
            .iter()
            .map(|symbol| {
                let mut result = StateSet::new();
                for inner_id in closure.closure(state.id) {
                    result.extend(closure.closure_of_set(states_by_id[inner_id].outputs.targets(symbol)));
                }

                result
            })
            .collect();

        reachable.insert(state.id, per_symbol);
    }

    // The discovered sets, their successor names, and the index of every canonical name.
    let mut discovered: Vec<(String, StateSet)> = Vec::new();
    let mut successors: Vec<Vec<String>> = Vec::new();
    let mut index: FxHashMap<String, usize> = FxHashMap::default();

    // A depth first search where every frame is a set and the next symbol to expand.
    let mut stack: Vec<(usize, usize)> = Vec::new();

    let initial_set = closure.closure(initial).clone();
    let initial_name = canonical_name(&initial_set, nfa);
    index.insert(initial_name.clone(), 0);
    discovered.push((initial_name, initial_set));
    successors.push(Vec::new());
    stack.push((0, 0));

    while let Some((set_index, symbol_index)) = stack.pop() {
        if symbol_index == symbols.len() {
            continue;
        }

        // Continue with the next symbol once the successor has been explored.
        stack.push((set_index, symbol_index + 1));

        let mut successor = StateSet::new();
        for id in &discovered[set_index].1 {
            successor.extend(&reachable[id][symbol_index]);
        }

        let name = canonical_name(&successor, nfa);
        trace!("{} --[{}]-> {name}", discovered[set_index].0, symbols[symbol_index]);

        successors[set_index].push(name.clone());
        if !index.contains_key(&name) {
            let new_index = discovered.len();
            index.insert(name.clone(), new_index);
            discovered.push((name, successor));
            successors.push(Vec::new());
            stack.push((new_index, 0));
        }
    }

    // Keep the discovery order of the non-empty sets, but place the empty set last.
    let order: Vec<usize> = (0..discovered.len())
        .filter(|set_index| !discovered[*set_index].1.is_empty())
        .chain((0..discovered.len()).filter(|set_index| discovered[*set_index].1.is_empty()))
        .collect();

    let mut new_id: Vec<StateId> = vec![0; discovered.len()];
    for (id, set_index) in order.iter().enumerate() {
        new_id[*set_index] = id;
    }

    let mut states: Vec<State> = Vec::with_capacity(order.len());
    for (id, set_index) in order.iter().enumerate() {
        let (name, set) = &discovered[*set_index];
        let is_final = set.iter().any(|member| states_by_id[member].is_final);

        let mut state = State::new(id, name.clone(), id == 0, is_final);
        for (symbol, successor_name) in symbols.iter().zip(&successors[*set_index]) {
            state.outputs.set_targets(symbol, vec![new_id[index[successor_name]]]);
        }

        states.push(state);
    }

    debug!(
        "Time nfa_to_dfa: {:.3}s, found {} states",
        start.elapsed().as_secs_f64(),
        states.len()
    );

    (Automaton::from_states(states, symbols.clone(), false), symbols)
}

/// Returns the canonical name of a set of states: the sorted names of its
/// members separated by commas and enclosed in braces, or [NOTHING] for the
/// empty set. Sets whose members have the same names share a canonical name.
pub fn canonical_name(set: &StateSet, automaton: &Automaton) -> String {
    if set.is_empty() {
        return NOTHING.to_string();
    }

    let names = automaton.target_names(&set.iter().copied().collect::<Vec<_>>());
    format!("{{{}}}", names.into_iter().sorted_unstable().join(","))
}
