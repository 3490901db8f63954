use std::collections::BTreeSet;

use fsmkit_automaton::Automaton;
use fsmkit_automaton::StateId;
use fsmkit_automaton::EPSILON;
use log::trace;
use rustc_hash::FxHashMap;
use rustc_hash::FxHashSet;

/// A set of states ordered by ascending identifier.
pub type StateSet = BTreeSet<StateId>;

/// The epsilon closures of all states of an automaton, computed once.
pub struct EpsilonClosure {
    closures: FxHashMap<StateId, StateSet>,
}

impl EpsilonClosure {
    /// Computes the closure of every state. For automata without epsilon
    /// transitions every closure is the state itself.
    pub fn new(automaton: &Automaton) -> EpsilonClosure {
        let states_by_id = automaton.states_by_id();

        // The stack and visited set of the depth first search, reused for every state.
        let mut stack: Vec<StateId> = Vec::new();
        let mut visited: FxHashSet<StateId> = FxHashSet::default();

        let mut closures = FxHashMap::default();
        for state in automaton.states() {
            stack.push(state.id);
            visited.insert(state.id);

            while let Some(inner_id) = stack.pop() {
                let Some(inner_state) = states_by_id.get(&inner_id) else {
                    continue;
                };

                for to in inner_state.outputs.targets(EPSILON) {
                    // Explore all the states reachable with epsilon transitions.
                    if visited.insert(*to) {
                        stack.push(*to);
                    }
                }
            }

            let closure: StateSet = visited.drain().collect();
            trace!("Closure of {}: {closure:?}", state.id);
            closures.insert(state.id, closure);
        }

        EpsilonClosure { closures }
    }

    /// Returns the states reachable from the given state with zero or more
    /// epsilon transitions, including the state itself.
    pub fn closure(&self, id: StateId) -> &StateSet {
        &self.closures[&id]
    }

    /// Returns the union of the closures of the given states.
    pub fn closure_of_set<'a>(&self, ids: impl IntoIterator<Item = &'a StateId>) -> StateSet {
        let mut result = StateSet::new();
        for id in ids {
            result.extend(self.closure(*id));
        }

        result
    }
}
