//!
//! Partitions of the states of an automaton, used by the minimization.
//!
//! The invariants are that the union of all blocks is the original set, and
//! that each block contains distinct elements.

use std::fmt;

/// A trait for partition refinement algorithms that expose the block number
/// for every element. Can be used to compute the quotient automaton.
pub trait Partition {
    /// Returns the block number for the given element.
    fn block_number(&self, element: usize) -> usize;

    /// Returns the number of blocks in the partition.
    fn num_of_blocks(&self) -> usize;
}

/// A partition that stores its blocks explicitly and in order, together with
/// the block number of every element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockPartition {
    blocks: Vec<Vec<usize>>,
    block_of: Vec<usize>,
}

impl BlockPartition {
    /// Creates a partition of the elements `0..num_of_elements` from the given
    /// blocks. Empty blocks are removed.
    pub fn from_blocks(num_of_elements: usize, mut blocks: Vec<Vec<usize>>) -> BlockPartition {
        blocks.retain(|block| !block.is_empty());

        let mut block_of = vec![0; num_of_elements];
        for (block_index, block) in blocks.iter().enumerate() {
            for element in block {
                block_of[*element] = block_index;
            }
        }

        let partition = BlockPartition { blocks, block_of };

        debug_assert!(
            partition.is_consistent(),
            "The blocks {:?} do not partition 0..{num_of_elements}",
            partition.blocks
        );

        partition
    }

    /// Returns the elements of the given block, in order.
    pub fn block(&self, block_index: usize) -> &[usize] {
        &self.blocks[block_index]
    }

    /// Returns an iterator over all blocks, in order.
    pub fn iter(&self) -> impl Iterator<Item = &[usize]> + '_ {
        self.blocks.iter().map(|block| &block[..])
    }

    /// Returns true iff the invariants of a partition hold
    fn is_consistent(&self) -> bool {
        let mut marked = vec![false; self.block_of.len()];

        for block in &self.blocks {
            for element in block {
                if *element >= marked.len() || marked[*element] {
                    // This element belongs to another block
                    return false;
                }

                marked[*element] = true;
            }
        }

        // Check that every element belongs to a block.
        !marked.contains(&false)
    }
}

impl Partition for BlockPartition {
    fn block_number(&self, element: usize) -> usize {
        self.block_of[element]
    }

    fn num_of_blocks(&self) -> usize {
        self.blocks.len()
    }
}

impl fmt::Display for BlockPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;

        let mut first_block = true;
        for block in &self.blocks {
            if !first_block {
                write!(f, ", ")?;
            }
            write!(f, "{{")?;

            let mut first = true;
            for element in block {
                if !first {
                    write!(f, ", ")?;
                }
                write!(f, "{}", element)?;
                first = false;
            }

            write!(f, "}}")?;
            first_block = false;
        }

        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_block_partition() {
        let partition = BlockPartition::from_blocks(5, vec![vec![3, 1], vec![], vec![0, 2, 4]]);

        assert_eq!(partition.num_of_blocks(), 2);
        assert_eq!(partition.block(0), &[3, 1]);
        assert_eq!(partition.block_number(4), 1);
        assert_eq!(partition.block_number(1), 0);
        assert_eq!(partition.to_string(), "{{3, 1}, {0, 2, 4}}");
    }

    #[test]
    fn test_consistency() {
        let partition = BlockPartition {
            blocks: vec![vec![0, 1], vec![1]],
            block_of: vec![0, 0, 0],
        };
        assert!(!partition.is_consistent());

        let partition = BlockPartition {
            blocks: vec![vec![0], vec![2]],
            block_of: vec![0, 0, 1],
        };
        assert!(!partition.is_consistent());
    }
}
