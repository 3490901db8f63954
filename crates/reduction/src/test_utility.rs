//! Functions in this module are only relevant for testing purposes.

use fsmkit_automaton::Automaton;

use crate::accepts;

/// Returns all words over the given symbols up to and including the given length.
pub fn all_words(symbols: &[String], max_length: usize) -> Vec<Vec<String>> {
    let mut result: Vec<Vec<String>> = vec![Vec::new()];
    let mut previous: Vec<Vec<String>> = vec![Vec::new()];

    for _ in 0..max_length {
        let mut next = Vec::new();
        for word in &previous {
            for symbol in symbols {
                let mut extended = word.clone();
                extended.push(symbol.clone());
                next.push(extended);
            }
        }

        result.extend(next.iter().cloned());
        previous = next;
    }

    result
}

/// Asserts that both automata accept the same words up to the given length,
/// over the alphabet of the left automaton.
pub fn assert_same_language(left: &Automaton, right: &Automaton, max_length: usize) {
    for word in all_words(left.symbols(), max_length) {
        assert_eq!(
            accepts(left, &word),
            accepts(right, &word),
            "The automata disagree on the word {word:?}\n{left:?}\n{right:?}"
        );
    }
}
