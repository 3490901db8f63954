//!
//! A crate containing IO related functionality. This includes the reading and
//! writing of automata in the table text format.
//!
//! This crate does not use unsafe code.

#![forbid(unsafe_code)]

mod line_iterator;
mod table;

pub use table::*;
