//! Compilation of sum-of-products expressions to oracle circuits.
//!
//! For each clause the compiler conjugates the multi-controlled NOT with X gates
//! on the negated variables, so the output qubit flips exactly when the clause
//! holds. Successive clauses flip the same output qubit, which accumulates their
//! exclusive-or. The output qubit is measured into classical bit 0 at the end.

use log::debug;
use miette::Diagnostic;
use thiserror::Error;

use crate::{
    circuit::{Circuit, CircuitError, Qubit},
    expr::{Clause, Expression},
    mapping::QubitMap,
    text::Name,
};

/// How NOT gates with more than two controls are emitted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum McxStrategy {
    /// A single multi-controlled X primitive.
    #[default]
    Native,
    /// A ladder of Toffoli gates over clean ancillas, uncomputed afterwards.
    VChain,
}

/// Errors raised during compilation.
#[derive(Debug, Error, Diagnostic)]
pub enum CompileError {
    /// The expression mentions a variable with no qubit.
    #[error("variable `{name}` has no qubit")]
    #[diagnostic(code(truthq::compile::unknown_variable))]
    UnknownVariable {
        /// The unmapped variable
        name: Name,
    },
    /// A clause mentions the same variable twice.
    #[error("variable `{name}` appears more than once in clause {clause}")]
    #[diagnostic(code(truthq::compile::repeated_variable))]
    RepeatedVariable {
        /// The repeated variable
        name: Name,
        /// Index of the clause
        clause: usize,
    },
    /// A gate could not be added.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Circuit(#[from] CircuitError),
}

/// Compiles expressions against a fixed qubit map.
pub struct Compiler<'a> {
    map: &'a QubitMap,
    strategy: McxStrategy,
}

impl<'a> Compiler<'a> {
    /// Creates a compiler emitting gates on the qubits of `map`.
    pub fn new(map: &'a QubitMap, strategy: McxStrategy) -> Self {
        Compiler { map, strategy }
    }

    /// Builds the oracle circuit for `expr`.
    pub fn compile(&self, expr: &Expression) -> Result<Circuit, CompileError> {
        let mut circuit = Circuit::new(self.map.num_qubits(), 1);
        match expr {
            Expression::Zero => {
                debug!("constant zero expression, emitting no gates");
            }
            Expression::Sum(clauses) => {
                for (i, clause) in clauses.iter().enumerate() {
                    self.compile_clause(&mut circuit, i, clause)?;
                }
            }
        }
        circuit.measure(self.map.output(), 0)?;
        Ok(circuit)
    }

    fn compile_clause(
        &self,
        circuit: &mut Circuit,
        index: usize,
        clause: &Clause,
    ) -> Result<(), CompileError> {
        let mut controls = Vec::with_capacity(clause.literals.len());
        let mut flipped = Vec::new();
        for literal in &clause.literals {
            let qubit =
                self.map
                    .index_of(&literal.name)
                    .ok_or_else(|| CompileError::UnknownVariable {
                        name: literal.name.clone(),
                    })?;
            if controls.contains(&qubit) {
                return Err(CompileError::RepeatedVariable {
                    name: literal.name.clone(),
                    clause: index,
                });
            }
            controls.push(qubit);
            if literal.negated {
                flipped.push(qubit);
            }
        }
        debug!(
            "clause {index}: {} controls, {} negated",
            controls.len(),
            flipped.len()
        );

        for &qubit in &flipped {
            circuit.x(qubit)?;
        }
        self.multi_controlled_x(circuit, controls, self.map.output())?;
        for &qubit in flipped.iter().rev() {
            circuit.x(qubit)?;
        }
        Ok(())
    }

    fn multi_controlled_x(
        &self,
        circuit: &mut Circuit,
        controls: Vec<Qubit>,
        target: Qubit,
    ) -> Result<(), CircuitError> {
        match controls.len() {
            0 => circuit.x(target),
            1 => circuit.cx(controls[0], target),
            2 => circuit.ccx(controls[0], controls[1], target),
            _ => match self.strategy {
                McxStrategy::Native => circuit.mcx(controls, target),
                McxStrategy::VChain => v_chain(circuit, &controls, target),
            },
        }
    }
}

/// Emits a NOT on `target` controlled by all of `controls` (at least three),
/// using `controls.len() - 2` ancillas which are left in their initial state.
/// Ancillas already in the circuit are reused before new ones are added.
fn v_chain(circuit: &mut Circuit, controls: &[Qubit], target: Qubit) -> Result<(), CircuitError> {
    let needed = controls.len() - 2;
    while circuit.ancillas().len() < needed {
        let ancilla = circuit.add_ancilla();
        debug!("allocated ancilla qubit {ancilla}");
    }
    let ancillas = circuit.ancillas()[..needed].to_vec();

    // ancillas[i] holds the conjunction of controls[..=i + 1]
    let mut ladder = vec![(controls[0], controls[1], ancillas[0])];
    for i in 1..needed {
        ladder.push((controls[i + 1], ancillas[i - 1], ancillas[i]));
    }

    for &(a, b, t) in &ladder {
        circuit.ccx(a, b, t)?;
    }
    circuit.ccx(controls[controls.len() - 1], ancillas[needed - 1], target)?;
    for &(a, b, t) in ladder.iter().rev() {
        circuit.ccx(a, b, t)?;
    }
    Ok(())
}
