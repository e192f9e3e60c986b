//! OpenQASM 2.0 export.
//!
//! `qelib1.inc` provides `x`, `cx`, `ccx`, `c3x` and `c4x`. Multi-controlled
//! NOTs with five or more controls are declared as opaque `c<n>x` gates.

use std::{collections::BTreeSet, fmt};

use crate::circuit::{Circuit, Gate};

fn mcx_name(controls: usize) -> String {
    match controls {
        1 => "cx".to_owned(),
        2 => "ccx".to_owned(),
        n => format!("c{n}x"),
    }
}

fn operands(qubits: impl Iterator<Item = usize>) -> String {
    qubits
        .map(|q| format!("q[{q}]"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Displays a circuit as an OpenQASM 2.0 program over registers `q` and `c`.
pub struct Qasm<'a>(pub &'a Circuit);

impl fmt::Display for Qasm<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let circuit = self.0;
        writeln!(f, "OPENQASM 2.0;")?;
        writeln!(f, "include \"qelib1.inc\";")?;

        let opaque: BTreeSet<usize> = circuit
            .gates()
            .iter()
            .filter_map(|g| match g {
                Gate::Mcx { controls, .. } if controls.len() > 4 => Some(controls.len()),
                _ => None,
            })
            .collect();
        for n in opaque {
            let args = (0..=n).map(|i| format!("a{i}")).collect::<Vec<_>>().join(",");
            writeln!(f, "opaque c{n}x {args};")?;
        }

        writeln!(f, "qreg q[{}];", circuit.num_qubits())?;
        if circuit.num_clbits() > 0 {
            writeln!(f, "creg c[{}];", circuit.num_clbits())?;
        }
        for gate in circuit.gates() {
            match gate {
                Gate::Measure { qubit, clbit } => writeln!(f, "measure q[{qubit}] -> c[{clbit}];")?,
                Gate::Mcx { controls, .. } => writeln!(
                    f,
                    "{} {};",
                    mcx_name(controls.len()),
                    operands(gate.qubits())
                )?,
                _ => writeln!(f, "{} {};", gate.name(), operands(gate.qubits()))?,
            }
        }
        Ok(())
    }
}

/// Writes `circuit` as an OpenQASM 2.0 program.
pub fn to_qasm(circuit: &Circuit) -> String {
    Qasm(circuit).to_string()
}
