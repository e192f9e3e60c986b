//! A gate-list representation of quantum circuits.
//!
//! Only classical reversible gates are represented (X and its controlled
//! forms) together with measurement, so a circuit maps computational basis
//! states to basis states. [`Circuit::eval_basis`] computes that map directly.

use indexmap::IndexMap;
use miette::Diagnostic;
use thiserror::Error;

/// Index of a qubit within a circuit.
pub type Qubit = usize;

/// Index of a classical bit within a circuit.
pub type Clbit = usize;

/// Errors raised when building or evaluating a circuit.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum CircuitError {
    /// A gate refers to a qubit the circuit does not have.
    #[error("qubit {qubit} is out of range for a circuit with {num_qubits} qubits")]
    #[diagnostic(code(truthq::circuit::qubit_range))]
    QubitOutOfRange {
        /// Offending qubit
        qubit: Qubit,
        /// Width of the circuit
        num_qubits: usize,
    },
    /// A measurement refers to a classical bit the circuit does not have.
    #[error("classical bit {clbit} is out of range for a circuit with {num_clbits} bits")]
    #[diagnostic(code(truthq::circuit::clbit_range))]
    ClbitOutOfRange {
        /// Offending bit
        clbit: Clbit,
        /// Number of classical bits
        num_clbits: usize,
    },
    /// A gate uses the same qubit twice.
    #[error("qubit {qubit} is used more than once by one gate")]
    #[diagnostic(code(truthq::circuit::repeated_qubit))]
    RepeatedQubit {
        /// Offending qubit
        qubit: Qubit,
    },
    /// Too many input bits for the circuit.
    #[error("{given} input bits given to a circuit with {num_qubits} qubits")]
    #[diagnostic(code(truthq::circuit::input_width))]
    InputWidth {
        /// Number of bits given
        given: usize,
        /// Width of the circuit
        num_qubits: usize,
    },
}

/// A gate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Gate {
    /// Pauli X (NOT).
    X(Qubit),
    /// Controlled NOT.
    Cx {
        /// Control
        control: Qubit,
        /// Target
        target: Qubit,
    },
    /// Toffoli (doubly controlled NOT).
    Ccx {
        /// Controls
        controls: [Qubit; 2],
        /// Target
        target: Qubit,
    },
    /// NOT controlled on the conjunction of any number of qubits.
    Mcx {
        /// Controls
        controls: Vec<Qubit>,
        /// Target
        target: Qubit,
    },
    /// Measurement in the computational basis.
    Measure {
        /// Measured qubit
        qubit: Qubit,
        /// Classical bit receiving the result
        clbit: Clbit,
    },
}

impl Gate {
    /// Lower-case gate name, as used in OpenQASM.
    pub fn name(&self) -> &'static str {
        match self {
            Gate::X(_) => "x",
            Gate::Cx { .. } => "cx",
            Gate::Ccx { .. } => "ccx",
            Gate::Mcx { .. } => "mcx",
            Gate::Measure { .. } => "measure",
        }
    }

    /// Control qubits, in order.
    pub fn controls(&self) -> &[Qubit] {
        match self {
            Gate::X(_) | Gate::Measure { .. } => &[],
            Gate::Cx { control, .. } => std::slice::from_ref(control),
            Gate::Ccx { controls, .. } => controls,
            Gate::Mcx { controls, .. } => controls,
        }
    }

    /// The qubit acted on: the target, or the measured qubit.
    pub fn target(&self) -> Qubit {
        match self {
            Gate::X(target)
            | Gate::Cx { target, .. }
            | Gate::Ccx { target, .. }
            | Gate::Mcx { target, .. } => *target,
            Gate::Measure { qubit, .. } => *qubit,
        }
    }

    /// All qubits touched by the gate, controls first.
    pub fn qubits(&self) -> impl Iterator<Item = Qubit> + '_ {
        self.controls()
            .iter()
            .copied()
            .chain(std::iter::once(self.target()))
    }
}

/// The result of running a circuit on a basis state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasisOutcome {
    /// Final value of every qubit.
    pub state: Vec<bool>,
    /// Final value of every classical bit.
    pub clbits: Vec<bool>,
}

/// A circuit: a register of qubits, a register of classical bits, and a gate list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Circuit {
    num_qubits: usize,
    num_clbits: usize,
    ancillas: Vec<Qubit>,
    gates: Vec<Gate>,
}

impl Circuit {
    /// An empty circuit.
    pub fn new(num_qubits: usize, num_clbits: usize) -> Self {
        Circuit {
            num_qubits,
            num_clbits,
            ancillas: Vec::new(),
            gates: Vec::new(),
        }
    }

    /// Number of qubits, ancillas included.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Number of classical bits.
    pub fn num_clbits(&self) -> usize {
        self.num_clbits
    }

    /// Ancilla qubits, in allocation order.
    pub fn ancillas(&self) -> &[Qubit] {
        &self.ancillas
    }

    /// Gates in application order.
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Adds a fresh qubit at the end of the register and marks it as an ancilla.
    pub fn add_ancilla(&mut self) -> Qubit {
        let qubit = self.num_qubits;
        self.num_qubits += 1;
        self.ancillas.push(qubit);
        qubit
    }

    /// Appends a gate after checking its operands.
    pub fn push(&mut self, gate: Gate) -> Result<(), CircuitError> {
        let mut seen = Vec::new();
        for qubit in gate.qubits() {
            if qubit >= self.num_qubits {
                return Err(CircuitError::QubitOutOfRange {
                    qubit,
                    num_qubits: self.num_qubits,
                });
            }
            if seen.contains(&qubit) {
                return Err(CircuitError::RepeatedQubit { qubit });
            }
            seen.push(qubit);
        }
        if let Gate::Measure { clbit, .. } = gate {
            if clbit >= self.num_clbits {
                return Err(CircuitError::ClbitOutOfRange {
                    clbit,
                    num_clbits: self.num_clbits,
                });
            }
        }
        self.gates.push(gate);
        Ok(())
    }

    /// Appends a NOT on `target`.
    pub fn x(&mut self, target: Qubit) -> Result<(), CircuitError> {
        self.push(Gate::X(target))
    }

    /// Appends a CNOT.
    pub fn cx(&mut self, control: Qubit, target: Qubit) -> Result<(), CircuitError> {
        self.push(Gate::Cx { control, target })
    }

    /// Appends a Toffoli gate controlled on `c1` and `c2`.
    pub fn ccx(&mut self, c1: Qubit, c2: Qubit, target: Qubit) -> Result<(), CircuitError> {
        self.push(Gate::Ccx {
            controls: [c1, c2],
            target,
        })
    }

    /// Appends a NOT on `target` controlled on every qubit in `controls`.
    pub fn mcx(&mut self, controls: Vec<Qubit>, target: Qubit) -> Result<(), CircuitError> {
        self.push(Gate::Mcx { controls, target })
    }

    /// Appends a measurement of `qubit` into `clbit`.
    pub fn measure(&mut self, qubit: Qubit, clbit: Clbit) -> Result<(), CircuitError> {
        self.push(Gate::Measure { qubit, clbit })
    }

    /// Number of gates of each kind, in order of first use.
    pub fn stats(&self) -> IndexMap<&'static str, usize> {
        let mut counts = IndexMap::new();
        for gate in &self.gates {
            *counts.entry(gate.name()).or_insert(0) += 1;
        }
        counts
    }

    /// Runs the circuit on the basis state whose first qubits are `inputs`
    /// and whose remaining qubits are 0.
    pub fn eval_basis(&self, inputs: &[bool]) -> Result<BasisOutcome, CircuitError> {
        if inputs.len() > self.num_qubits {
            return Err(CircuitError::InputWidth {
                given: inputs.len(),
                num_qubits: self.num_qubits,
            });
        }
        let mut state = vec![false; self.num_qubits];
        state[..inputs.len()].copy_from_slice(inputs);
        let mut clbits = vec![false; self.num_clbits];
        for gate in &self.gates {
            match gate {
                Gate::Measure { qubit, clbit } => clbits[*clbit] = state[*qubit],
                _ => {
                    if gate.controls().iter().all(|&c| state[c]) {
                        state[gate.target()] ^= true;
                    }
                }
            }
        }
        Ok(BasisOutcome { state, clbits })
    }
}
