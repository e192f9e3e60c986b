use pretty_assertions::assert_eq;
use test_case::test_case;
use truthq::{
    compile::{Compiler, McxStrategy},
    expr::Expression,
    mapping::{QubitMap, VariableOrder},
    qasm::to_qasm,
    render::diagram,
    table::TruthTable,
    verify::verify,
};

const PARITY: &str = include_str!("../truth_table.csv");

#[test]
fn parity_table_end_to_end() {
    let table = TruthTable::parse(PARITY, "Q").unwrap();
    let expr = Expression::synthesize(&table);
    assert_eq!(
        expr.to_string(),
        "(~A & ~B & C) ^ (~A & B & ~C) ^ (A & ~B & ~C) ^ (A & B & C)"
    );

    let map = QubitMap::from_table(&table, VariableOrder::Sorted);
    assert_eq!(
        map.to_string(),
        "Qubit 0: Variable A\nQubit 1: Variable B\nQubit 2: Variable C\nQubit 3: Output Qubit"
    );
    assert_eq!(
        expr.variables(),
        table.inputs().clone(),
        "expression variables should be the table inputs"
    );

    let circuit = Compiler::new(&map, McxStrategy::Native)
        .compile(&expr)
        .unwrap();
    assert_eq!(circuit.stats().get("mcx"), Some(&4));
    assert_eq!(verify(&table, &map, &circuit).unwrap(), 8);

    let qasm = to_qasm(&circuit);
    assert!(qasm.starts_with("OPENQASM 2.0;"));
    assert!(qasm.ends_with("measure q[3] -> c[0];\n"));
    assert_eq!(diagram(&circuit, &map, 80).lines().count(), 5);
}

#[test_case(McxStrategy::Native ; "native")]
#[test_case(McxStrategy::VChain ; "v-chain")]
fn wide_tables_verify(strategy: McxStrategy) {
    // output is 1 exactly when the five inputs read 10110 or 01011
    let mut src = String::from("v0,v1,v2,v3,v4,Q\n");
    for bits in 0..32u32 {
        let values: Vec<u32> = (0..5).map(|i| bits >> (4 - i) & 1).collect();
        let out = u32::from(bits == 0b10110 || bits == 0b01011);
        let row: Vec<String> = values.iter().map(u32::to_string).collect();
        src.push_str(&format!("{},{out}\n", row.join(",")));
    }
    let table = TruthTable::parse(&src, "Q").unwrap();
    let expr = Expression::synthesize(&table);
    assert_eq!(expr.clauses().len(), 2);

    let map = QubitMap::from_table(&table, VariableOrder::Declared);
    let circuit = Compiler::new(&map, strategy).compile(&expr).unwrap();
    assert_eq!(verify(&table, &map, &circuit).unwrap(), 32);
}

#[test]
fn all_zero_table_measures_zero() {
    let table = TruthTable::parse("A,B,Q\n0,0,0\n1,1,0\n", "Q").unwrap();
    let expr = Expression::synthesize(&table);
    assert_eq!(expr, Expression::Zero);
    let map = QubitMap::from_table(&table, VariableOrder::Sorted);
    let circuit = Compiler::new(&map, McxStrategy::Native)
        .compile(&expr)
        .unwrap();
    assert_eq!(circuit.gates().len(), 1);
    assert_eq!(verify(&table, &map, &circuit).unwrap(), 4);
}

#[test]
fn printed_expression_compiles_like_the_original() {
    let table = TruthTable::parse(PARITY, "Q").unwrap();
    let expr = Expression::synthesize(&table);
    let reparsed = Expression::parse(&expr.to_string()).unwrap();
    let map = QubitMap::from_expression(&reparsed, VariableOrder::Sorted);
    let a = Compiler::new(&map, McxStrategy::VChain).compile(&expr).unwrap();
    let b = Compiler::new(&map, McxStrategy::VChain)
        .compile(&reparsed)
        .unwrap();
    assert_eq!(a, b);
}
