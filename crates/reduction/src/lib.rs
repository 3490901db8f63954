//!
//! A crate containing the reductions on finite automata: the subset
//! construction that determinizes an automaton with epsilon transitions, and
//! the partition refinement that minimizes a deterministic automaton.
//!
//! This crate does not use unsafe code.

#![forbid(unsafe_code)]

mod epsilon_closure;
mod minimize;
mod partition;
mod quotient;
mod signatures;
mod simulation;
mod subset_construction;

#[cfg(test)]
pub mod test_utility;

pub use epsilon_closure::*;
pub use minimize::*;
pub use partition::*;
pub use quotient::*;
pub use signatures::*;
pub use simulation::*;
pub use subset_construction::*;
