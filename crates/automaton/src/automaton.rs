use std::fmt;

use log::trace;
use rustc_hash::FxHashMap;

/// The identity of a state. This is stable under edits and is not the
/// position of the state in the automaton.
pub type StateId = usize;

/// The reserved symbol for silent transitions of a nondeterministic automaton.
pub const EPSILON: &str = "ε";

/// The outgoing transitions of a single state, an association from symbols to
/// target states that is kept in the order of the alphabet.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Outputs {
    entries: Vec<(String, Vec<StateId>)>,
}

impl Outputs {
    pub fn new() -> Outputs {
        Outputs::default()
    }

    /// Returns the targets for the given symbol, which are empty when the
    /// symbol has no entry.
    pub fn targets(&self, symbol: &str) -> &[StateId] {
        self.entries
            .iter()
            .find(|(other, _)| other == symbol)
            .map(|(_, targets)| targets.as_slice())
            .unwrap_or(&[])
    }

    /// Replaces the targets of the given symbol, a new symbol is appended at
    /// the end.
    pub fn set_targets(&mut self, symbol: &str, targets: Vec<StateId>) {
        match self.targets_mut(symbol) {
            Some(current) => *current = targets,
            None => self.entries.push((symbol.to_string(), targets)),
        }
    }

    /// Iterates over all (symbol, targets) pairs in alphabet order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[StateId])> + '_ {
        self.entries
            .iter()
            .map(|(symbol, targets)| (symbol.as_str(), &targets[..]))
    }

    /// Returns the total number of targets over all symbols.
    pub fn num_of_transitions(&self) -> usize {
        self.entries.iter().map(|(_, targets)| targets.len()).sum()
    }

    fn targets_mut(&mut self, symbol: &str) -> Option<&mut Vec<StateId>> {
        self.entries
            .iter_mut()
            .find(|(other, _)| other == symbol)
            .map(|(_, targets)| targets)
    }

    /// Reorders the entries to follow the given alphabet. Missing symbols get
    /// an empty entry and symbols outside the alphabet are dropped.
    fn align<'a>(&mut self, alphabet: impl Iterator<Item = &'a str>) {
        let mut old = std::mem::take(&mut self.entries);

        for symbol in alphabet {
            let targets = old
                .iter()
                .position(|(other, _)| other == symbol)
                .map(|index| old.swap_remove(index).1)
                .unwrap_or_default();

            self.entries.push((symbol.to_string(), targets));
        }
    }

    fn remove_symbol(&mut self, symbol: &str) {
        self.entries.retain(|(other, _)| other != symbol);
    }

    fn remove_target(&mut self, target: StateId) {
        for (_, targets) in &mut self.entries {
            targets.retain(|id| *id != target);
        }
    }
}

/// A single state of the automaton together with its outgoing transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    pub id: StateId,
    pub name: String,
    pub is_initial: bool,
    pub is_final: bool,
    pub outputs: Outputs,
}

impl State {
    pub fn new(id: StateId, name: impl Into<String>, is_initial: bool, is_final: bool) -> State {
        State {
            id,
            name: name.into(),
            is_initial,
            is_final,
            outputs: Outputs::new(),
        }
    }

    /// Adds the targets for the given symbol, used to construct states
    /// inline.
    pub fn with_targets(mut self, symbol: &str, targets: &[StateId]) -> State {
        self.outputs.set_targets(symbol, targets.to_vec());
        self
    }
}

/// A finite automaton with named states and an ordered alphabet. In
/// nondeterministic mode the reserved symbol [EPSILON] is part of the working
/// alphabet, but it is never stored in the list of symbols.
#[derive(Clone, PartialEq, Eq)]
pub struct Automaton {
    states: Vec<State>,
    symbols: Vec<String>,
    is_nfa: bool,
}

impl Automaton {
    /// Creates the default automaton over the alphabet `a, b`, consisting of a
    /// single initial state `q_0` without transitions.
    pub fn new(is_nfa: bool) -> Automaton {
        let mut result = Automaton {
            states: Vec::new(),
            symbols: vec!["a".to_string(), "b".to_string()],
            is_nfa,
        };
        result.reset_states();
        result
    }

    /// Creates an automaton from its parts. The outputs of every state are
    /// aligned to the alphabet, duplicate symbols and [EPSILON] are removed from
    /// the given symbols.
    pub fn from_states(mut states: Vec<State>, symbols: Vec<String>, is_nfa: bool) -> Automaton {
        let mut unique_symbols: Vec<String> = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            if symbol != EPSILON && !unique_symbols.contains(&symbol) {
                unique_symbols.push(symbol);
            }
        }

        let alphabet: Vec<&str> = is_nfa
            .then_some(EPSILON)
            .into_iter()
            .chain(unique_symbols.iter().map(String::as_str))
            .collect();
        for state in &mut states {
            state.outputs.align(alphabet.iter().copied());
        }

        Automaton {
            states,
            symbols: unique_symbols,
            is_nfa,
        }
    }

    /// Returns the states in their order.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// Returns the alphabet, which never contains [EPSILON].
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Returns the working alphabet, which starts with [EPSILON] in
    /// nondeterministic mode.
    pub fn full_symbols(&self) -> impl Iterator<Item = &str> + '_ {
        self.is_nfa
            .then_some(EPSILON)
            .into_iter()
            .chain(self.symbols.iter().map(String::as_str))
    }

    /// Returns true iff [EPSILON] is part of the working alphabet.
    pub fn is_nfa(&self) -> bool {
        self.is_nfa
    }

    /// Returns the number of states.
    pub fn num_of_states(&self) -> usize {
        self.states.len()
    }

    /// Returns the number of transitions, counting every target separately.
    pub fn num_of_transitions(&self) -> usize {
        self.states.iter().map(|state| state.outputs.num_of_transitions()).sum()
    }

    /// Returns the state with the given id.
    pub fn state(&self, id: StateId) -> Option<&State> {
        self.states.iter().find(|state| state.id == id)
    }

    /// Returns the position of the state with the given id.
    pub fn position(&self, id: StateId) -> Option<usize> {
        self.states.iter().position(|state| state.id == id)
    }

    /// Returns a lookup table from identifiers to states.
    pub fn states_by_id(&self) -> FxHashMap<StateId, &State> {
        self.states.iter().map(|state| (state.id, state)).collect()
    }

    /// Returns the first initial state.
    pub fn initial_state(&self) -> Option<&State> {
        self.states.iter().find(|state| state.is_initial)
    }

    /// Resolves the given targets to the names of their states, unknown
    /// identifiers are skipped.
    pub fn target_names(&self, targets: &[StateId]) -> Vec<&str> {
        let states_by_id = self.states_by_id();

        targets
            .iter()
            .filter_map(|id| states_by_id.get(id).map(|state| state.name.as_str()))
            .collect()
    }

    /// Appends a new state with the identifier following the last state,
    /// returns its identifier.
    pub fn add_state(&mut self) -> StateId {
        let id = self.states.last().map_or(0, |state| state.id + 1);

        let mut state = State::new(id, format!("q_{id}"), false, false);
        state.outputs.align(self.full_symbols());
        self.states.push(state);

        trace!("Added state {id}");
        id
    }

    /// Removes the state with the given id and all transitions leading to it.
    /// Returns false when no such state exists.
    pub fn remove_state(&mut self, id: StateId) -> bool {
        let Some(position) = self.position(id) else {
            return false;
        };

        self.states.remove(position);
        for state in &mut self.states {
            state.outputs.remove_target(id);
        }

        true
    }

    /// Changes the name of the given state.
    pub fn set_name(&mut self, id: StateId, name: impl Into<String>) -> bool {
        self.state_mut(id).map(|state| state.name = name.into()).is_some()
    }

    /// Marks or unmarks the given state as initial.
    pub fn set_initial(&mut self, id: StateId, is_initial: bool) -> bool {
        self.state_mut(id).map(|state| state.is_initial = is_initial).is_some()
    }

    /// Marks or unmarks the given state as final.
    pub fn set_final(&mut self, id: StateId, is_final: bool) -> bool {
        self.state_mut(id).map(|state| state.is_final = is_final).is_some()
    }

    /// Toggles the transition from `id` on `symbol` to `target`.
    ///
    /// In nondeterministic mode the target is added to or removed from the
    /// targets, which are kept in the order of the states. In deterministic mode
    /// the target replaces the current one, or clears it when it was already
    /// the target. Returns false when the state or symbol does not exist.
    pub fn toggle_target(&mut self, id: StateId, symbol: &str, target: StateId) -> bool {
        if !self.full_symbols().any(|other| other == symbol) {
            return false;
        }

        let order: Vec<StateId> = self.states.iter().map(|state| state.id).collect();
        let is_nfa = self.is_nfa;

        let Some(state) = self.state_mut(id) else {
            return false;
        };

        let current = state.outputs.targets(symbol);
        let targets: Vec<StateId> = if current.contains(&target) {
            current.iter().copied().filter(|other| *other != target).collect()
        } else if is_nfa {
            order
                .into_iter()
                .filter(|other| *other == target || current.contains(other))
                .collect()
        } else {
            vec![target]
        };

        state.outputs.set_targets(symbol, targets);
        true
    }

    /// Appends the first lower case letter that is not yet a symbol, and
    /// returns it. Returns None when all letters are in use.
    pub fn add_symbol(&mut self) -> Option<String> {
        let symbol = ('a'..='z')
            .map(String::from)
            .find(|letter| !self.symbols.contains(letter))?;

        for state in &mut self.states {
            state.outputs.set_targets(&symbol, Vec::new());
        }
        self.symbols.push(symbol.clone());

        Some(symbol)
    }

    /// Removes the given symbol and all its transitions. The [EPSILON] symbol
    /// cannot be removed.
    pub fn remove_symbol(&mut self, symbol: &str) -> bool {
        if symbol == EPSILON || !self.symbols.iter().any(|other| other == symbol) {
            return false;
        }

        self.symbols.retain(|other| other != symbol);
        for state in &mut self.states {
            state.outputs.remove_symbol(symbol);
        }

        true
    }

    /// Switches between nondeterministic and deterministic mode. Leaving
    /// nondeterministic mode resets the states to the default automaton, but
    /// keeps the alphabet.
    pub fn set_nfa(&mut self, is_nfa: bool) {
        if is_nfa == self.is_nfa {
            return;
        }

        let was_nfa = self.is_nfa;
        self.is_nfa = is_nfa;

        if was_nfa {
            self.reset_states();
        } else {
            let alphabet: Vec<String> = self.full_symbols().map(String::from).collect();
            for state in &mut self.states {
                state.outputs.align(alphabet.iter().map(String::as_str));
            }
        }
    }

    fn state_mut(&mut self, id: StateId) -> Option<&mut State> {
        self.states.iter_mut().find(|state| state.id == id)
    }

    fn reset_states(&mut self) {
        let mut initial = State::new(0, "q_0", true, false);
        initial.outputs.align(self.full_symbols());
        self.states = vec![initial];
    }
}

impl Default for Automaton {
    fn default() -> Self {
        Automaton::new(false)
    }
}

impl fmt::Display for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Print some information about the automaton.
        writeln!(f, "Number of states: {}", self.states.len())?;
        writeln!(f, "Number of symbols: {}", self.symbols.len())?;
        writeln!(f, "Number of transitions: {}", self.num_of_transitions())
    }
}

impl fmt::Debug for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(initial) = self.initial_state() {
            writeln!(f, "Initial state: {}", initial.id)?;
        }

        for state in &self.states {
            for (symbol, targets) in state.outputs.iter() {
                for to in targets {
                    writeln!(f, "{} --[{symbol}]-> {to}", state.id)?;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_default_automaton() {
        let automaton = Automaton::new(true);

        assert_eq!(automaton.num_of_states(), 1);
        assert_eq!(automaton.full_symbols().collect::<Vec<_>>(), vec![EPSILON, "a", "b"]);

        let initial = automaton.initial_state().unwrap();
        assert_eq!(initial.name, "q_0");
        assert!(!initial.is_final);
        assert_eq!(initial.outputs.iter().count(), 3);
    }

    #[test]
    fn test_from_states_aligns_outputs() {
        let state = State::new(0, "q0", true, true)
            .with_targets("b", &[0])
            .with_targets("x", &[0])
            .with_targets("a", &[0]);

        let automaton = Automaton::from_states(vec![state], vec!["a".into(), EPSILON.into(), "b".into(), "a".into()], false);

        assert_eq!(automaton.symbols(), &["a".to_string(), "b".to_string()]);
        let symbols: Vec<&str> = automaton.states()[0].outputs.iter().map(|(symbol, _)| symbol).collect();
        assert_eq!(symbols, vec!["a", "b"]);
    }

    #[test]
    fn test_add_and_remove_state() {
        let mut automaton = Automaton::new(true);
        let first = automaton.add_state();
        let second = automaton.add_state();
        assert_eq!((first, second), (1, 2));
        assert_eq!(automaton.state(2).unwrap().name, "q_2");

        assert!(automaton.toggle_target(0, "a", 1));
        assert!(automaton.toggle_target(0, "a", 2));
        assert!(automaton.remove_state(1));
        assert!(!automaton.remove_state(1));

        assert_eq!(automaton.state(0).unwrap().outputs.targets("a"), &[2]);

        // Identifiers follow the last state, not the number of states.
        assert_eq!(automaton.add_state(), 3);
    }

    #[test]
    fn test_toggle_target_nfa_keeps_state_order() {
        let mut automaton = Automaton::new(true);
        automaton.add_state();
        automaton.add_state();

        automaton.toggle_target(0, EPSILON, 2);
        automaton.toggle_target(0, EPSILON, 0);
        automaton.toggle_target(0, EPSILON, 1);
        assert_eq!(automaton.state(0).unwrap().outputs.targets(EPSILON), &[0, 1, 2]);

        automaton.toggle_target(0, EPSILON, 1);
        assert_eq!(automaton.state(0).unwrap().outputs.targets(EPSILON), &[0, 2]);

        assert!(!automaton.toggle_target(0, "c", 1));
        assert!(!automaton.toggle_target(7, "a", 1));
    }

    #[test]
    fn test_toggle_target_dfa_replaces() {
        let mut automaton = Automaton::new(false);
        automaton.add_state();

        automaton.toggle_target(0, "a", 0);
        automaton.toggle_target(0, "a", 1);
        assert_eq!(automaton.state(0).unwrap().outputs.targets("a"), &[1]);

        automaton.toggle_target(0, "a", 1);
        assert!(automaton.state(0).unwrap().outputs.targets("a").is_empty());
        assert!(!automaton.toggle_target(0, EPSILON, 1));
    }

    #[test]
    fn test_symbols() {
        let mut automaton = Automaton::new(true);

        assert!(automaton.remove_symbol("a"));
        assert!(!automaton.remove_symbol(EPSILON));
        assert_eq!(automaton.add_symbol().as_deref(), Some("a"));
        assert_eq!(automaton.add_symbol().as_deref(), Some("c"));

        assert_eq!(automaton.full_symbols().collect::<Vec<_>>(), vec![EPSILON, "b", "a", "c"]);
        let symbols: Vec<&str> = automaton.states()[0].outputs.iter().map(|(symbol, _)| symbol).collect();
        assert_eq!(symbols, vec![EPSILON, "b", "a", "c"]);

        for _ in 0..23 {
            assert!(automaton.add_symbol().is_some());
        }
        assert_eq!(automaton.add_symbol(), None);
    }

    #[test]
    fn test_set_nfa() {
        let mut automaton = Automaton::new(false);
        automaton.add_state();
        automaton.add_symbol();

        automaton.set_nfa(true);
        assert_eq!(automaton.num_of_states(), 2);
        assert_eq!(automaton.states()[1].outputs.iter().next().map(|(symbol, _)| symbol), Some(EPSILON));

        automaton.set_nfa(false);
        assert_eq!(automaton.num_of_states(), 1);
        assert_eq!(automaton.symbols().len(), 3);
        assert_eq!(automaton.states()[0].outputs.iter().count(), 3);
    }

    #[test]
    fn test_target_names() {
        let mut automaton = Automaton::new(false);
        automaton.add_state();
        automaton.set_name(1, "sink");

        assert_eq!(automaton.target_names(&[1, 0, 5]), vec!["sink", "q_0"]);
    }
}
