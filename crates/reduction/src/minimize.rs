use std::time::Instant;

use fsmkit_automaton::Automaton;
use fsmkit_automaton::StateId;
use log::debug;
use log::trace;
use rustc_hash::FxHashMap;

use crate::moore_signature;
use crate::quotient_dfa;
use crate::BlockPartition;
use crate::Partition;
use crate::Signature;
use crate::TransitionTable;

/// The partitions of every refinement round, as groups of state identifiers.
pub type PartitionRounds = Vec<Vec<Vec<StateId>>>;

/// Minimizes a deterministic automaton, returning the minimal automaton
/// together with the partition of every refinement round.
///
/// The automaton must satisfy [fsmkit_automaton::check_dfa]. The last round
/// confirms that no group was split any more, so there are at least two rounds
/// for a non-empty automaton.
pub fn dfa_minimize(dfa: &Automaton) -> (Automaton, PartitionRounds) {
    debug_assert!(
        dfa.states().iter().filter(|state| state.is_initial).count() == 1,
        "Minimization requires exactly one initial state"
    );

    let table = TransitionTable::new(dfa);
    let (partition, rounds) = moore_refinement(dfa, &table);

    debug_assert!(
        is_valid_refinement(&table, &partition),
        "The resulting partition {partition} is not stable for automaton {dfa:?}"
    );

    let minimal = quotient_dfa(dfa, &partition);
    let rounds: PartitionRounds = rounds
        .iter()
        .map(|round| {
            round
                .iter()
                .map(|block| block.iter().map(|position| dfa.states()[*position].id).collect())
                .collect()
        })
        .collect();

    (minimal, rounds)
}

/// Computes the coarsest stable partition of the state positions, starting from
/// the final states followed by the non-final states. Returns the final
/// partition and the partitions of all rounds.
pub fn moore_refinement(dfa: &Automaton, table: &TransitionTable) -> (BlockPartition, Vec<BlockPartition>) {
    let start = Instant::now();

    let (final_states, other_states): (Vec<usize>, Vec<usize>) =
        (0..dfa.num_of_states()).partition(|position| dfa.states()[*position].is_final);

    let mut partition = BlockPartition::from_blocks(dfa.num_of_states(), vec![final_states, other_states]);
    let mut rounds = vec![partition.clone()];

    // Avoids reallocations when computing the signature.
    let mut builder = Signature::new();
    let mut iteration = 0;

    loop {
        debug!("Iteration {iteration}, found {} blocks", partition.num_of_blocks());

        let next_partition = refine(&partition, table, &mut builder);
        rounds.push(next_partition.clone());
        iteration += 1;

        debug_assert!(
            iteration <= dfa.num_of_states().max(1),
            "There can never be more splits than number of states"
        );

        // Blocks are only split, so an equal number of blocks means that no block was split.
        if next_partition.num_of_blocks() == partition.num_of_blocks() {
            break;
        }

        partition = next_partition;
    }

    debug!(
        "Time moore_refinement: {:.3}s, {} rounds",
        start.elapsed().as_secs_f64(),
        rounds.len()
    );
    trace!("Final partition {partition}");
    (partition, rounds)
}

/// Splits every block of the partition by the signatures of its members. The
/// new blocks of an old block follow the order in which their signatures are
/// first encountered.
fn refine(partition: &BlockPartition, table: &TransitionTable, builder: &mut Signature) -> BlockPartition {
    let mut blocks: Vec<Vec<usize>> = Vec::with_capacity(partition.num_of_blocks());
    let mut id: FxHashMap<Signature, usize> = FxHashMap::default();
    let mut num_of_elements = 0;

    for block in partition.iter() {
        // Signatures are only compared within a single block.
        id.clear();

        for position in block {
            moore_signature(*position, table, partition, builder);
            trace!("State {position} signature {:?}", builder);

            match id.get(builder.as_slice()) {
                Some(index) => blocks[*index].push(*position),
                None => {
                    id.insert(builder.clone(), blocks.len());
                    blocks.push(vec![*position]);
                }
            }
        }

        num_of_elements += block.len();
    }

    BlockPartition::from_blocks(num_of_elements, blocks)
}

/// Returns true iff all members of every block have the same signature.
pub fn is_valid_refinement(table: &TransitionTable, partition: &BlockPartition) -> bool {
    let mut builder = Signature::new();
    let mut representative_signature = Signature::new();

    for (block_index, block) in partition.iter().enumerate() {
        let Some((representative, members)) = block.split_first() else {
            continue;
        };

        moore_signature(*representative, table, partition, &mut representative_signature);
        for position in members {
            moore_signature(*position, table, partition, &mut builder);

            if builder != representative_signature {
                trace!("State {position} has a different signature than representative state {representative}, but are in the same block {block_index}");
                return false;
            }
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use fsmkit_automaton::random_dfa;
    use fsmkit_automaton::State;
    use test_log::test;

    use crate::test_utility::assert_same_language;

    use super::*;

    fn symbols() -> Vec<String> {
        vec!["a".into(), "b".into()]
    }

    /// The automaton 0 -a-> 1, 0 -b-> 2, 1 -a-> 1, 1 -b-> 2, 2 -a-> 1, 2 -b-> 2
    /// with initial state 0 and final state 2.
    fn ends_with_b() -> Automaton {
        Automaton::from_states(
            vec![
                State::new(0, "q0", true, false).with_targets("a", &[1]).with_targets("b", &[2]),
                State::new(1, "q1", false, false).with_targets("a", &[1]).with_targets("b", &[2]),
                State::new(2, "q2", false, true).with_targets("a", &[1]).with_targets("b", &[2]),
            ],
            symbols(),
            false,
        )
    }

    #[test]
    fn test_final_and_non_final_are_distinguished() {
        let dfa = ends_with_b();
        let (minimal, rounds) = dfa_minimize(&dfa);

        // States 0 and 1 have identical transitions and are both non-final.
        assert_eq!(rounds, vec![vec![vec![2], vec![0, 1]], vec![vec![2], vec![0, 1]]]);
        assert_eq!(minimal.num_of_states(), 2);

        let accepting = minimal.state(0).unwrap();
        assert_eq!(accepting.name, "q2");
        assert!(accepting.is_final && !accepting.is_initial);
        assert_eq!(accepting.outputs.targets("a"), &[1]);
        assert_eq!(accepting.outputs.targets("b"), &[0]);

        let initial = minimal.state(1).unwrap();
        assert_eq!(initial.name, "q0,q1");
        assert!(initial.is_initial && !initial.is_final);
        assert_eq!(initial.outputs.targets("a"), &[1]);
        assert_eq!(initial.outputs.targets("b"), &[0]);

        assert_same_language(&dfa, &minimal, 6);
    }

    #[test]
    fn test_already_minimal() {
        // Accepts the words with an odd number of a's that end in b.
        let dfa = Automaton::from_states(
            vec![
                State::new(0, "even", true, false).with_targets("a", &[1]).with_targets("b", &[0]),
                State::new(1, "odd", false, false).with_targets("a", &[0]).with_targets("b", &[2]),
                State::new(2, "odd_b", false, true).with_targets("a", &[0]).with_targets("b", &[2]),
            ],
            symbols(),
            false,
        );

        let (minimal, rounds) = dfa_minimize(&dfa);

        assert_eq!(minimal.num_of_states(), 3);
        assert_eq!(
            rounds,
            vec![
                vec![vec![2], vec![0, 1]],
                vec![vec![2], vec![0], vec![1]],
                vec![vec![2], vec![0], vec![1]],
            ]
        );

        let names: Vec<&str> = minimal.states().iter().map(|state| state.name.as_str()).collect();
        assert_eq!(names, vec!["odd_b", "even", "odd"]);
        assert_same_language(&dfa, &minimal, 6);

        // Minimizing again gives the same automaton.
        let (again, _) = dfa_minimize(&minimal);
        assert_eq!(again.num_of_states(), 3);
        assert_same_language(&minimal, &again, 6);
    }

    #[test]
    fn test_collapsing() {
        // States 1 and 3 behave identically and both lead to the final state 2.
        let dfa = Automaton::from_states(
            vec![
                State::new(0, "q0", true, false).with_targets("a", &[1]).with_targets("b", &[3]),
                State::new(1, "q1", false, false).with_targets("a", &[2]).with_targets("b", &[2]),
                State::new(2, "q2", false, true).with_targets("a", &[2]).with_targets("b", &[2]),
                State::new(3, "q3", false, false).with_targets("a", &[2]).with_targets("b", &[2]),
            ],
            symbols(),
            false,
        );

        let (minimal, rounds) = dfa_minimize(&dfa);

        assert_eq!(minimal.num_of_states(), 3);
        assert_eq!(rounds.last(), Some(&vec![vec![2], vec![0], vec![1, 3]]));

        let merged = minimal.state(2).unwrap();
        assert_eq!(merged.name, "q1,q3");
        assert_eq!(merged.outputs.targets("a"), &[0]);

        let initial = minimal.state(1).unwrap();
        assert!(initial.is_initial);
        assert_eq!(initial.outputs.targets("a"), &[2]);
        assert_eq!(initial.outputs.targets("b"), &[2]);

        assert_same_language(&dfa, &minimal, 6);
    }

    #[test]
    fn test_single_state() {
        let dfa = Automaton::from_states(
            vec![State::new(7, "all", true, true).with_targets("a", &[7]).with_targets("b", &[7])],
            symbols(),
            false,
        );

        let (minimal, rounds) = dfa_minimize(&dfa);

        assert_eq!(rounds, vec![vec![vec![7]], vec![vec![7]]]);
        assert_eq!(minimal.num_of_states(), 1);
        assert_eq!(minimal.states()[0].id, 0);
        assert_eq!(minimal.states()[0].outputs.targets("b"), &[0]);
    }

    #[test]
    fn test_all_final_states() {
        let mut dfa = ends_with_b();
        dfa.set_final(0, true);
        dfa.set_final(1, true);

        let (minimal, rounds) = dfa_minimize(&dfa);

        assert_eq!(rounds[0], vec![vec![0, 1, 2]]);
        assert_eq!(minimal.num_of_states(), 1);
        assert_eq!(minimal.states()[0].name, "q0,q1,q2");
    }

    #[test]
    fn test_random_minimize() {
        for _ in 0..50 {
            let dfa = random_dfa(8, 2);
            let (minimal, rounds) = dfa_minimize(&dfa);

            assert!(minimal.num_of_states() <= dfa.num_of_states());
            assert_eq!(minimal.num_of_states(), rounds.last().map_or(0, |round| round.len()));

            // Groups are only ever split.
            for window in rounds.windows(2) {
                assert!(window[0].len() <= window[1].len(), "Rounds {:?} are not monotone", rounds);
            }

            assert_same_language(&dfa, &minimal, 5);

            let (again, _) = dfa_minimize(&minimal);
            assert_eq!(again.num_of_states(), minimal.num_of_states(), "Minimization is not idempotent on {dfa:?}");
        }
    }
}
