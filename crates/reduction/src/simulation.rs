use fsmkit_automaton::Automaton;
use log::trace;

use crate::EpsilonClosure;
use crate::StateSet;

/// Returns true iff the automaton accepts the given word, a sequence of
/// symbols. Works for both modes: the current states are always closed under
/// epsilon transitions. Symbols outside the alphabet lead to no states.
pub fn accepts<S: AsRef<str>>(automaton: &Automaton, word: &[S]) -> bool {
    let closure = EpsilonClosure::new(automaton);
    let states_by_id = automaton.states_by_id();

    let initial: Vec<_> = automaton
        .states()
        .iter()
        .filter(|state| state.is_initial)
        .map(|state| state.id)
        .collect();
    let mut current: StateSet = closure.closure_of_set(&initial);

    for symbol in word {
        let symbol = symbol.as_ref();

        let mut next = StateSet::new();
        for id in &current {
            if let Some(state) = states_by_id.get(id) {
                next.extend(closure.closure_of_set(state.outputs.targets(symbol)));
            }
        }

        trace!("{current:?} --[{symbol}]-> {next:?}");
        current = next;
    }

    current
        .iter()
        .any(|id| states_by_id.get(id).is_some_and(|state| state.is_final))
}

#[cfg(test)]
mod tests {
    use fsmkit_automaton::State;
    use fsmkit_automaton::EPSILON;
    use test_case::test_case;

    use super::*;

    /// Accepts a, optionally followed by b, using an epsilon transition.
    fn optional_b() -> Automaton {
        Automaton::from_states(
            vec![
                State::new(0, "q0", true, false).with_targets("a", &[1]),
                State::new(1, "q1", false, false).with_targets(EPSILON, &[2]).with_targets("b", &[2]),
                State::new(2, "q2", false, true),
            ],
            vec!["a".into(), "b".into()],
            true,
        )
    }

    #[test_case(&[], false ; "empty word")]
    #[test_case(&["a"], true ; "a")]
    #[test_case(&["a", "b"], true ; "ab")]
    #[test_case(&["a", "b", "b"], false ; "abb")]
    #[test_case(&["b"], false ; "b")]
    #[test_case(&["c"], false ; "unknown symbol")]
    fn test_accepts(word: &[&str], expected: bool) {
        assert_eq!(accepts(&optional_b(), word), expected);
    }
}
