//! Compiles Boolean truth tables into quantum oracle circuits.
//! Given a CSV truth table, the library:
//! - loads and validates the table
//! - synthesizes a sum-of-products expression from the rows whose output is 1
//! - assigns a qubit to each variable, plus one output qubit
//! - compiles each clause to a multi-controlled NOT on the output qubit
//! - renders the circuit as a diagram, a gate listing, or OpenQASM 2.0.
//!
//! ## Running
//!
//! A truth table can be compiled using:
//!
//! ```bash
//! cargo run -- truth_table.csv
//! ```
//!
//! or passed in through stdin with `-`. For all options see:
//! ```bash
//! cargo run -- --help
//! ```

pub mod circuit;
pub mod compile;
pub mod expr;
pub mod mapping;
pub mod qasm;
pub mod render;
pub mod table;
pub mod text;
pub mod verify;
