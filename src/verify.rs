//! Checking a compiled circuit against its truth table on every basis input.

use log::info;
use miette::Diagnostic;
use thiserror::Error;

use crate::{
    circuit::{Circuit, CircuitError},
    mapping::QubitMap,
    table::TruthTable,
};

/// Largest number of inputs checked exhaustively.
pub const MAX_INPUTS: usize = 24;

/// Errors raised by verification.
#[derive(Debug, Error, Diagnostic)]
pub enum VerifyError {
    /// Too many inputs to enumerate.
    #[error("{inputs} inputs is too many to check exhaustively (at most 24)")]
    #[diagnostic(code(truthq::verify::too_many_inputs))]
    TooManyInputs {
        /// Number of table inputs
        inputs: usize,
    },
    /// A table input has no qubit.
    #[error("input `{name}` has no qubit")]
    #[diagnostic(code(truthq::verify::unmapped))]
    Unmapped {
        /// Input column name
        name: String,
    },
    /// The circuit measures the wrong value.
    #[error("circuit measures {found} for inputs {assignment}, table says {expected}")]
    #[diagnostic(code(truthq::verify::mismatch))]
    Mismatch {
        /// Input assignment, as `A=0 B=1 ...`
        assignment: String,
        /// Output from the table
        expected: u8,
        /// Output measured from the circuit
        found: u8,
    },
    /// A qubit other than the output was left changed.
    #[error("qubit {qubit} is not restored for inputs {assignment}")]
    #[diagnostic(code(truthq::verify::dirty))]
    Dirty {
        /// Input assignment, as `A=0 B=1 ...`
        assignment: String,
        /// The changed qubit
        qubit: usize,
    },
    /// The circuit could not be evaluated.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Circuit(#[from] CircuitError),
}

/// Runs `circuit` on every assignment of the table's inputs and checks the
/// measured bit against the table. Inputs and ancillas must come back unchanged.
/// Returns the number of assignments checked.
pub fn verify(table: &TruthTable, map: &QubitMap, circuit: &Circuit) -> Result<usize, VerifyError> {
    let k = table.inputs().len();
    if k > MAX_INPUTS {
        return Err(VerifyError::TooManyInputs { inputs: k });
    }
    // position of each qubit's variable within the table's columns
    let columns = (0..map.len())
        .map(|q| {
            map.name_of(q)
                .and_then(|name| table.inputs().get_index_of(name))
                .ok_or_else(|| VerifyError::Unmapped {
                    name: map.name_of(q).map(|n| n.to_string()).unwrap_or_default(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    if let Some(name) = table.inputs().iter().find(|n| map.index_of(n).is_none()) {
        return Err(VerifyError::Unmapped {
            name: name.to_string(),
        });
    }

    let total = 1usize << k;
    for bits in 0..total {
        let values: Vec<bool> = (0..k).map(|i| bits >> (k - 1 - i) & 1 == 1).collect();
        let describe = || {
            table
                .inputs()
                .iter()
                .zip(&values)
                .map(|(n, &v)| format!("{n}={}", v as u8))
                .collect::<Vec<_>>()
                .join(" ")
        };
        let inputs: Vec<bool> = columns.iter().map(|&c| values[c]).collect();
        let outcome = circuit.eval_basis(&inputs)?;

        let expected = table.lookup(&values);
        let found = outcome.clbits.first().copied().unwrap_or(false);
        if found != expected {
            return Err(VerifyError::Mismatch {
                assignment: describe(),
                expected: expected as u8,
                found: found as u8,
            });
        }
        for (qubit, &value) in outcome.state.iter().enumerate() {
            if qubit == map.output() {
                continue;
            }
            let initial = inputs.get(qubit).copied().unwrap_or(false);
            if value != initial {
                return Err(VerifyError::Dirty {
                    assignment: describe(),
                    qubit,
                });
            }
        }
    }
    info!("circuit agrees with the table on all {total} inputs");
    Ok(total)
}
