use fsmkit_automaton::Automaton;
use fsmkit_automaton::StateId;
use rustc_hash::FxHashMap;

use crate::Partition;

/// The signature of a state: for every symbol, in alphabet order, the block
/// that its transition lands in. Signatures are compared as sequences.
pub type Signature = Vec<usize>;

/// The transitions of a deterministic automaton, indexed by the position of
/// the source state and the position of the symbol in the alphabet. Targets are
/// positions as well.
pub struct TransitionTable {
    targets: Vec<usize>,
    num_of_symbols: usize,
}

impl TransitionTable {
    /// Builds the table of a deterministic automaton.
    ///
    /// # Panics
    ///
    /// When a state does not have exactly one existing target for every symbol.
    pub fn new(dfa: &Automaton) -> TransitionTable {
        let positions: FxHashMap<StateId, usize> = dfa
            .states()
            .iter()
            .enumerate()
            .map(|(position, state)| (state.id, position))
            .collect();

        let num_of_symbols = dfa.symbols().len();
        let mut targets = Vec::with_capacity(dfa.num_of_states() * num_of_symbols);

        for state in dfa.states() {
            for symbol in dfa.symbols() {
                let target = match state.outputs.targets(symbol) {
                    [target] => *target,
                    other => panic!(
                        "State {} has {} transitions on {symbol:?}, but a deterministic automaton needs exactly one",
                        state.id,
                        other.len()
                    ),
                };

                targets.push(positions[&target]);
            }
        }

        TransitionTable {
            targets,
            num_of_symbols,
        }
    }

    /// Returns the position of the target of the given state on the given symbol.
    pub fn target(&self, position: usize, symbol_index: usize) -> usize {
        self.targets[position * self.num_of_symbols + symbol_index]
    }

    /// Returns the number of symbols of the alphabet.
    pub fn num_of_symbols(&self) -> usize {
        self.num_of_symbols
    }
}

/// Computes the signature sig(s, pi) = [ pi(t_1), ..., pi(t_n) ] where `s -a_i-> t_i` into the builder.
pub fn moore_signature(position: usize, table: &TransitionTable, partition: &impl Partition, builder: &mut Signature) {
    builder.clear();

    for symbol_index in 0..table.num_of_symbols() {
        builder.push(partition.block_number(table.target(position, symbol_index)));
    }
}
