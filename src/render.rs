//! Text renderings of circuits: a gate listing and a wire diagram.

use pretty::RcDoc;

use crate::{
    circuit::{Circuit, Gate, Qubit},
    mapping::QubitMap,
    text::ToDoc,
};

fn qubits_doc<'a>(qubits: impl Iterator<Item = &'a Qubit>) -> RcDoc<'a> {
    RcDoc::intersperse(qubits.map(|q| RcDoc::text(format!("q{q}"))), RcDoc::text(", "))
}

impl ToDoc for Gate {
    fn to_doc(&self) -> RcDoc {
        let head = RcDoc::text(self.name()).append(" ");
        match self {
            Gate::X(target) => head.append(RcDoc::text(format!("q{target}"))),
            Gate::Measure { qubit, clbit } => {
                head.append(RcDoc::text(format!("q{qubit} -> c{clbit}")))
            }
            _ => head
                .append(qubits_doc(self.controls().iter()))
                .append(RcDoc::text(format!(" -> q{}", self.target()))),
        }
    }
}

impl ToDoc for Circuit {
    fn to_doc(&self) -> RcDoc {
        let width = self.gates().len().max(1).to_string().len();
        RcDoc::intersperse(
            self.gates().iter().enumerate().map(|(i, gate)| {
                RcDoc::text(format!("{:>width$}: ", i + 1)).append(gate.to_doc())
            }),
            RcDoc::hardline(),
        )
    }
}

/// Renders the gate listing, one numbered gate per line.
pub fn listing(circuit: &Circuit) -> String {
    circuit.to_doc().pretty(80).to_string()
}

const WIRE: &str = "───";
const CONTROL: &str = "─●─";
const TARGET: &str = "─⊕─";
const NOT: &str = "─X─";
const CROSS: &str = "─┼─";
const MEASURE: &str = "─M─";
const MEASURE_PASS: &str = "─╫─";
const CLASSICAL: &str = "═══";
const CLASSICAL_READ: &str = "═╩═";

fn column(gate: &Gate, num_qubits: usize) -> Vec<&'static str> {
    let mut cells = vec![WIRE; num_qubits + 1];
    match gate {
        Gate::Measure { qubit, .. } => {
            cells[*qubit] = MEASURE;
            for cell in &mut cells[*qubit + 1..num_qubits] {
                *cell = MEASURE_PASS;
            }
            cells[num_qubits] = CLASSICAL_READ;
        }
        _ => {
            let lo = gate.qubits().min().unwrap_or(0);
            let hi = gate.qubits().max().unwrap_or(0);
            for cell in &mut cells[lo..=hi] {
                *cell = CROSS;
            }
            for &c in gate.controls() {
                cells[c] = CONTROL;
            }
            cells[gate.target()] = if gate.controls().is_empty() {
                NOT
            } else {
                TARGET
            };
            cells[num_qubits] = CLASSICAL;
        }
    }
    cells
}

fn label(qubit: Qubit, map: &QubitMap, circuit: &Circuit) -> String {
    if let Some(name) = map.name_of(qubit) {
        format!("{name}: q{qubit}")
    } else if qubit == map.output() {
        format!("out: q{qubit}")
    } else if circuit.ancillas().contains(&qubit) {
        format!("anc: q{qubit}")
    } else {
        format!("q{qubit}")
    }
}

/// Draws the circuit with one row per qubit and one row for the classical
/// register, one gate per column. Rows longer than `width` characters are
/// folded into several blocks.
pub fn diagram(circuit: &Circuit, map: &QubitMap, width: usize) -> String {
    let n = circuit.num_qubits();
    let mut labels: Vec<String> = (0..n).map(|q| label(q, map, circuit)).collect();
    labels.push(format!("c: {}", circuit.num_clbits()));
    let label_width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);

    let columns: Vec<Vec<&str>> = circuit.gates().iter().map(|g| column(g, n)).collect();
    let per_block = (width.saturating_sub(label_width + 3) / WIRE.chars().count()).max(1);
    let blocks: Vec<&[Vec<&str>]> = if columns.is_empty() {
        vec![&columns[..]]
    } else {
        columns.chunks(per_block).collect()
    };

    let mut out = Vec::new();
    for (b, block) in blocks.iter().enumerate() {
        if b > 0 {
            out.push(String::new());
        }
        for (row, label) in labels.iter().enumerate() {
            let (start, end) = if row == n { ("═", "═") } else { ("─", "─") };
            let mut line = format!("{label:>label_width$} {start}");
            for col in block.iter() {
                line.push_str(col[row]);
            }
            line.push_str(end);
            out.push(line);
        }
    }
    out.join("\n")
}
