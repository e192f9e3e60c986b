//! Assignment of variables to qubits.

use std::fmt;

use indexmap::IndexSet;
use pretty::RcDoc;

use crate::{
    expr::Expression,
    table::TruthTable,
    text::{Name, ToDoc},
};

/// How variables are ordered onto qubits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum VariableOrder {
    /// Lexicographic order of the names.
    #[default]
    Sorted,
    /// Order of first appearance (table header, or expression text).
    Declared,
}

/// Maps each variable to a qubit `0..k`, with qubit `k` reserved for the output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QubitMap(IndexSet<Name>);

impl QubitMap {
    /// Builds a map over the distinct names in `names`.
    pub fn new(names: impl IntoIterator<Item = Name>, order: VariableOrder) -> Self {
        let mut set: IndexSet<Name> = names.into_iter().collect();
        if order == VariableOrder::Sorted {
            set.sort();
        }
        QubitMap(set)
    }

    /// One qubit per input column of `table`.
    pub fn from_table(table: &TruthTable, order: VariableOrder) -> Self {
        QubitMap::new(table.inputs().iter().cloned(), order)
    }

    /// One qubit per variable appearing in `expr`.
    pub fn from_expression(expr: &Expression, order: VariableOrder) -> Self {
        QubitMap::new(expr.variables(), order)
    }

    /// Qubit holding `name`, if it is mapped.
    pub fn index_of(&self, name: &Name) -> Option<usize> {
        self.0.get_index_of(name)
    }

    /// Variable held by `qubit`, if it is a variable qubit.
    pub fn name_of(&self, qubit: usize) -> Option<&Name> {
        self.0.get_index(qubit)
    }

    /// Mapped variables in qubit order.
    pub fn variables(&self) -> impl Iterator<Item = &Name> {
        self.0.iter()
    }

    /// Number of variable qubits.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no variables are mapped.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The output qubit.
    pub fn output(&self) -> usize {
        self.0.len()
    }

    /// Variable qubits plus the output qubit.
    pub fn num_qubits(&self) -> usize {
        self.0.len() + 1
    }
}

impl ToDoc for QubitMap {
    fn to_doc(&self) -> RcDoc {
        RcDoc::concat(
            self.0
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    RcDoc::text(format!("Qubit {i}: Variable {name}")).append(RcDoc::hardline())
                }),
        )
        .append(RcDoc::text(format!("Qubit {}: Output Qubit", self.output())))
    }
}

impl fmt::Display for QubitMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_doc().render_fmt(80, f)
    }
}
