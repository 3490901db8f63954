use std::time::Instant;

use fsmkit_automaton::Automaton;
use fsmkit_automaton::State;
use fsmkit_automaton::StateId;
use itertools::Itertools;
use log::debug;
use rustc_hash::FxHashMap;

use crate::Partition;

/// Returns a new deterministic automaton based on the given partition of
/// state positions.
///
/// Every block becomes a single state whose identifier is the block number,
/// named by the comma separated names of its members. A block is initial
/// (final) iff one of its members is. The transitions of a block are those of
/// its first member, mapped to blocks.
pub fn quotient_dfa(dfa: &Automaton, partition: &impl Partition) -> Automaton {
    let start = Instant::now();

    let positions: FxHashMap<StateId, usize> = dfa
        .states()
        .iter()
        .enumerate()
        .map(|(position, state)| (state.id, position))
        .collect();

    let num_of_blocks = partition.num_of_blocks();
    let mut names: Vec<Vec<&str>> = vec![Vec::new(); num_of_blocks];
    let mut representative: Vec<Option<&State>> = vec![None; num_of_blocks];
    let mut is_initial = vec![false; num_of_blocks];
    let mut is_final = vec![false; num_of_blocks];

    for (position, state) in dfa.states().iter().enumerate() {
        let block = partition.block_number(position);
        debug_assert!(
            block < num_of_blocks,
            "Quotienting assumes that the block numbers do not exceed the number of blocks"
        );

        names[block].push(&state.name);
        representative[block].get_or_insert(state);
        is_initial[block] |= state.is_initial;
        is_final[block] |= state.is_final;
    }

    let mut states: Vec<State> = Vec::with_capacity(num_of_blocks);
    for block in 0..num_of_blocks {
        debug_assert!(representative[block].is_some(), "Block {block} is empty");

        let mut state = State::new(block, names[block].iter().join(","), is_initial[block], is_final[block]);

        if let Some(member) = representative[block] {
            for symbol in dfa.symbols() {
                let targets = member
                    .outputs
                    .targets(symbol)
                    .iter()
                    .map(|to| partition.block_number(positions[to]))
                    .dedup()
                    .collect();

                state.outputs.set_targets(symbol, targets);
            }
        }

        states.push(state);
    }

    debug!("Time quotient_dfa: {:.3}s", start.elapsed().as_secs_f64());
    Automaton::from_states(states, dfa.symbols().to_vec(), false)
}
