use std::{
    io::{self, Read},
    path::PathBuf,
};

use log::info;
use miette::{IntoDiagnostic, Result, bail};
use truthq::{
    compile::{Compiler, McxStrategy},
    expr::Expression,
    mapping::{QubitMap, VariableOrder},
    qasm::Qasm,
    render::{diagram, listing},
    table::TruthTable,
    verify::verify,
};

/// How the circuit is printed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
enum Format {
    /// Wire diagram
    #[default]
    Diagram,
    /// Numbered gate list
    Listing,
    /// OpenQASM 2.0
    Qasm,
}

/// Compile a truth table into a quantum oracle circuit
#[derive(clap::Parser)]
#[command(version)]
struct Args {
    /// CSV truth table to compile, or `-` for stdin
    #[arg(value_name = "FILE", default_value = "truth_table.csv")]
    file: PathBuf,

    /// Name of the output column
    #[arg(long, default_value = "Q")]
    output_column: String,

    /// Compile this expression instead of a truth table, e.g. "(A & ~B) ^ (~A & B)"
    #[arg(long, value_name = "EXPR")]
    expr: Option<String>,

    /// Order in which variables are assigned to qubits
    #[arg(long, value_enum, default_value_t)]
    order: VariableOrder,

    /// How NOT gates with more than two controls are emitted
    #[arg(long, value_enum, default_value_t)]
    mcx: McxStrategy,

    /// How the circuit is printed
    #[arg(long, value_enum, default_value_t)]
    format: Format,

    /// Maximum line width of the diagram
    #[arg(long, default_value_t = 80)]
    width: usize,

    /// Check the circuit against the table on every input
    #[arg(long)]
    verify: bool,
}

fn load_table(args: &Args) -> Result<TruthTable> {
    if args.file.as_os_str() == "-" {
        let mut src = String::new();
        io::stdin().read_to_string(&mut src).into_diagnostic()?;
        Ok(TruthTable::parse_named("<stdin>", &src, &args.output_column)?)
    } else {
        Ok(TruthTable::load(&args.file, &args.output_column)?)
    }
}

fn run(args: &Args) -> Result<()> {
    let (expression, map, table) = if let Some(src) = &args.expr {
        let expression = Expression::parse(src)?;
        let map = QubitMap::from_expression(&expression, args.order);
        (expression, map, None)
    } else {
        let table = load_table(args)?;
        info!(
            "loaded {} rows with inputs {:?}",
            table.rows().len(),
            table.inputs()
        );
        let expression = Expression::synthesize(&table);
        let map = QubitMap::from_table(&table, args.order);
        (expression, map, Some(table))
    };
    println!("Boolean Expression: {expression}");
    println!("\n--- Qubit to Variable Mapping ---");
    println!("{map}\n");

    let circuit = Compiler::new(&map, args.mcx).compile(&expression)?;
    info!(
        "compiled {} gates on {} qubits: {:?}",
        circuit.gates().len(),
        circuit.num_qubits(),
        circuit.stats()
    );
    match args.format {
        Format::Diagram => println!("{}", diagram(&circuit, &map, args.width)),
        Format::Listing => println!("{}", listing(&circuit)),
        Format::Qasm => print!("{}", Qasm(&circuit)),
    }

    if args.verify {
        let Some(table) = &table else {
            bail!("--verify needs a truth table, not --expr");
        };
        let checked = verify(table, &map, &circuit)?;
        println!("\nVerified: circuit matches the table on all {checked} inputs");
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args: Args = clap::Parser::parse();
    run(&args)
}
