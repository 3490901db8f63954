//!
//! A crate containing the finite automaton model that is shared by the
//! reductions, together with the validation of their preconditions.
//!
//! This crate does not use unsafe code.

#![forbid(unsafe_code)]

mod automaton;
mod random_automaton;
mod validate;

pub use automaton::*;
pub use random_automaton::*;
pub use validate::*;
