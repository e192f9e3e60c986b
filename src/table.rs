//! Loading truth tables from CSV.
//!
//! The first non-blank line names the columns. Every following line holds one
//! value per column, each of which must be `0` or `1`. One column (by default `Q`)
//! is the output; all the others are inputs, kept in header order. Fields may
//! be quoted.

use std::{collections::HashMap, fs, ops::Range, path::Path};

use csv::{ReaderBuilder, StringRecord, Trim};
use indexmap::{IndexMap, IndexSet};
use log::{debug, warn};
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::text::{Name, Spanned};

/// Errors raised while reading a truth table.
#[derive(Debug, Error, Diagnostic)]
pub enum TableError {
    /// The file could not be read.
    #[error("failed to read `{path}`")]
    #[diagnostic(code(truthq::table::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// No header line.
    #[error("truth table is empty")]
    #[diagnostic(
        code(truthq::table::empty),
        help("the first line must name the columns, e.g. `A,B,Q`")
    )]
    Empty,
    /// The text is not well-formed CSV.
    #[error("malformed CSV")]
    #[diagnostic(code(truthq::table::syntax))]
    Syntax {
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: SourceSpan,
        message: String,
    },
    /// A header cell is not an identifier.
    #[error("invalid column name `{name}`")]
    #[diagnostic(
        code(truthq::table::invalid_name),
        help("column names start with a letter or underscore")
    )]
    InvalidName {
        #[source_code]
        src: NamedSource<String>,
        #[label("not an identifier")]
        span: SourceSpan,
        name: String,
    },
    /// A header names the same column twice.
    #[error("column `{name}` appears more than once")]
    #[diagnostic(code(truthq::table::duplicate_column))]
    DuplicateColumn {
        #[source_code]
        src: NamedSource<String>,
        #[label("first defined here")]
        first: SourceSpan,
        #[label("defined again here")]
        second: SourceSpan,
        name: String,
    },
    /// The output column is not in the header.
    #[error("no output column `{column}`")]
    #[diagnostic(
        code(truthq::table::missing_output),
        help("choose the output column with `--output-column`")
    )]
    MissingOutput {
        #[source_code]
        src: NamedSource<String>,
        #[label("header has no `{column}`")]
        span: SourceSpan,
        column: String,
    },
    /// A row has the wrong number of fields.
    #[error("expected {expected} fields, found {found}")]
    #[diagnostic(code(truthq::table::field_count))]
    FieldCount {
        #[source_code]
        src: NamedSource<String>,
        #[label("this row")]
        span: SourceSpan,
        expected: usize,
        found: usize,
    },
    /// A value is not an integer.
    #[error("`{text}` is not an integer")]
    #[diagnostic(code(truthq::table::not_integer))]
    NotInteger {
        #[source_code]
        src: NamedSource<String>,
        #[label("expected an integer")]
        span: SourceSpan,
        text: String,
    },
    /// A value is an integer other than 0 or 1.
    #[error("value {value} is not binary")]
    #[diagnostic(code(truthq::table::non_binary))]
    NonBinary {
        #[source_code]
        src: NamedSource<String>,
        #[label("expected 0 or 1")]
        span: SourceSpan,
        value: i64,
    },
    /// Two rows have the same inputs but different outputs.
    #[error("rows disagree on the output for the same inputs")]
    #[diagnostic(code(truthq::table::conflict))]
    Conflict {
        #[source_code]
        src: NamedSource<String>,
        #[label("output {first_output} here")]
        first: SourceSpan,
        #[label("output {second_output} here")]
        second: SourceSpan,
        first_output: u8,
        second_output: u8,
    },
}

type Cell = Spanned<Range<usize>, String>;

/// Locates the fields of `record` in `text`, the source of the record starting
/// at byte `offset`. A field whose unescaped text does not occur verbatim gets
/// the rest of the record.
fn cells(record: &StringRecord, text: &str, offset: usize) -> Vec<Cell> {
    let mut cursor = 0;
    record
        .iter()
        .map(|field| {
            let span = match text[cursor..].find(field) {
                Some(at) => {
                    let start = cursor + at;
                    cursor = start + field.len();
                    start..cursor
                }
                None => cursor..text.len(),
            };
            Spanned {
                inner: field.to_owned(),
                span: offset + span.start..offset + span.end,
            }
        })
        .collect()
}

/// Splits `src` into records of located cells. Quoting follows RFC 4180 and
/// whitespace around fields is dropped.
fn read_records(src: &str) -> Result<Vec<Vec<Cell>>, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(src.as_bytes());
    let mut raw = Vec::new();
    for record in reader.records() {
        let record = record?;
        let start = record.position().map_or(0, |p| p.byte() as usize);
        raw.push((start, record));
    }
    let ends = raw
        .iter()
        .skip(1)
        .map(|(start, _)| *start)
        .chain([src.len()]);
    Ok(raw
        .iter()
        .zip(ends)
        .map(|((start, record), end)| cells(record, &src[*start..end], *start))
        .collect())
}

fn is_blank(record: &[Cell]) -> bool {
    record.len() == 1 && record[0].inner.is_empty()
}

fn record_span(record: &[Cell]) -> Range<usize> {
    match (record.first(), record.last()) {
        (Some(first), Some(last)) => first.span.start..last.span.end,
        _ => 0..0,
    }
}

fn line_of(src: &str, offset: usize) -> usize {
    src[..offset].matches('\n').count() + 1
}

/// One row of a truth table.
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    values: Vec<bool>,
    output: bool,
    span: Range<usize>,
}

impl Row {
    /// Input values, in the table's input column order.
    pub fn values(&self) -> &[bool] {
        &self.values
    }

    /// Output value.
    pub fn output(&self) -> bool {
        self.output
    }
}

/// A truth table with named binary inputs and one output.
#[derive(Clone, Debug)]
pub struct TruthTable {
    inputs: IndexSet<Name>,
    output_column: Name,
    rows: Vec<Row>,
    index: HashMap<Vec<bool>, usize>,
}

impl TruthTable {
    /// Read a truth table from a CSV file.
    pub fn load(path: &Path, output_column: &str) -> Result<Self, TableError> {
        let src = fs::read_to_string(path).map_err(|source| TableError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse_named(&path.display().to_string(), &src, output_column)
    }

    /// Parse a truth table from CSV text.
    pub fn parse(src: &str, output_column: &str) -> Result<Self, TableError> {
        Self::parse_named("<input>", src, output_column)
    }

    /// Parse a truth table from CSV text, naming the source `name` in diagnostics.
    pub fn parse_named(name: &str, src: &str, output_column: &str) -> Result<Self, TableError> {
        let source = || NamedSource::new(name, src.to_owned());

        let records = read_records(src).map_err(|e| {
            let offset = e.position().map_or(0, |p| p.byte() as usize).min(src.len());
            TableError::Syntax {
                src: source(),
                span: (offset..offset).into(),
                message: e.to_string(),
            }
        })?;
        let mut records = records.into_iter().filter(|r| !is_blank(r));

        let header = records.next().ok_or(TableError::Empty)?;
        let mut columns = IndexMap::<Name, Range<usize>>::new();
        for cell in &header {
            let name = Name::new(&cell.inner).ok_or_else(|| TableError::InvalidName {
                src: source(),
                span: cell.span.clone().into(),
                name: cell.inner.clone(),
            })?;
            if let Some(first) = columns.get(&name) {
                return Err(TableError::DuplicateColumn {
                    src: source(),
                    first: first.clone().into(),
                    second: cell.span.clone().into(),
                    name: cell.inner.clone(),
                });
            }
            columns.insert(name, cell.span.clone());
        }

        let (output_index, output_name) = columns
            .keys()
            .enumerate()
            .find(|(_, n)| n.as_str() == output_column)
            .map(|(i, n)| (i, n.clone()))
            .ok_or_else(|| TableError::MissingOutput {
                src: source(),
                span: record_span(&header).into(),
                column: output_column.to_owned(),
            })?;
        let inputs: IndexSet<Name> = columns
            .keys()
            .enumerate()
            .filter(|(i, _)| *i != output_index)
            .map(|(_, n)| n.clone())
            .collect();

        let mut rows: Vec<Row> = Vec::new();
        let mut index = HashMap::new();
        for record in records {
            let span = record_span(&record);
            if record.len() != columns.len() {
                return Err(TableError::FieldCount {
                    src: source(),
                    span: span.into(),
                    expected: columns.len(),
                    found: record.len(),
                });
            }
            let mut values = Vec::with_capacity(inputs.len());
            let mut output = false;
            for (i, cell) in record.iter().enumerate() {
                let value: i64 = cell.inner.parse().map_err(|_| TableError::NotInteger {
                    src: source(),
                    span: cell.span.clone().into(),
                    text: cell.inner.clone(),
                })?;
                let bit = match value {
                    0 => false,
                    1 => true,
                    _ => {
                        return Err(TableError::NonBinary {
                            src: source(),
                            span: cell.span.clone().into(),
                            value,
                        });
                    }
                };
                if i == output_index {
                    output = bit;
                } else {
                    values.push(bit);
                }
            }

            if let Some(&existing) = index.get(&values) {
                let first: &Row = &rows[existing];
                if first.output == output {
                    warn!(
                        "dropping duplicate of line {} at line {}",
                        line_of(src, first.span.start),
                        line_of(src, span.start)
                    );
                    continue;
                }
                return Err(TableError::Conflict {
                    src: source(),
                    first: first.span.clone().into(),
                    second: span.into(),
                    first_output: first.output as u8,
                    second_output: output as u8,
                });
            }
            index.insert(values.clone(), rows.len());
            rows.push(Row {
                values,
                output,
                span,
            });
        }

        debug!(
            "loaded {} rows over {} inputs from {name}",
            rows.len(),
            inputs.len()
        );
        Ok(TruthTable {
            inputs,
            output_column: output_name,
            rows,
            index,
        })
    }

    /// Input column names, in header order.
    pub fn inputs(&self) -> &IndexSet<Name> {
        &self.inputs
    }

    /// Name of the output column.
    pub fn output_column(&self) -> &Name {
        &self.output_column
    }

    /// All rows, in file order, without duplicates.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Rows whose output is 1.
    pub fn true_rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter().filter(|r| r.output)
    }

    /// Pairs each input name with its value in `row`.
    pub fn assignment<'a>(&'a self, row: &'a Row) -> impl Iterator<Item = (&'a Name, bool)> {
        self.inputs.iter().zip(row.values.iter().copied())
    }

    /// Expected output for the given input values (in input column order).
    /// Assignments missing from the table read as 0.
    pub fn lookup(&self, values: &[bool]) -> bool {
        self.index
            .get(values)
            .is_some_and(|&i| self.rows[i].output)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use std::path::Path;

    use super::{TableError, TruthTable};

    const XOR: &str = "A,B,Q\n0,0,0\n0,1,1\n1,0,1\n1,1,0\n";

    fn names(table: &TruthTable) -> Vec<&str> {
        table.inputs().iter().map(|n| n.as_str()).collect()
    }

    #[test]
    fn parses_rows_in_file_order() {
        let table = TruthTable::parse(XOR, "Q").unwrap();
        assert_eq!(names(&table), vec!["A", "B"]);
        assert_eq!(table.output_column().as_str(), "Q");
        assert_eq!(table.rows().len(), 4);
        assert_eq!(table.rows()[1].values(), &[false, true]);
        assert!(table.rows()[1].output());
        assert_eq!(table.true_rows().count(), 2);
    }

    #[test]
    fn accepts_crlf_spaces_and_blank_lines() {
        let src = "\r\n A , B ,Q\r\n\r\n1, 1 ,1\r\n0,0,0";
        let table = TruthTable::parse(src, "Q").unwrap();
        assert_eq!(names(&table), vec!["A", "B"]);
        assert_eq!(table.rows().len(), 2);
        assert!(table.lookup(&[true, true]));
    }

    #[test]
    fn accepts_quoted_fields() {
        let src = "\"A\",\"B\",\"Q\"\n\"1\",\"1\",\"1\"\n0,\"0\",0\n";
        let table = TruthTable::parse(src, "Q").unwrap();
        assert_eq!(names(&table), vec!["A", "B"]);
        assert_eq!(table.rows().len(), 2);
        assert!(table.lookup(&[true, true]));
        assert!(!table.lookup(&[false, false]));
    }

    #[test]
    fn quoted_errors_point_inside_quotes() {
        let err = TruthTable::parse("\"A\",\"Q\"\n\"x\",\"1\"\n", "Q").unwrap_err();
        let TableError::NotInteger { span, text, .. } = err else {
            panic!("expected NotInteger, got {err:?}");
        };
        assert_eq!(text, "x");
        assert_eq!((span.offset(), span.len()), (9, 1));
    }

    #[test]
    fn loads_from_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("truth_table.csv");
        let table = TruthTable::load(&path, "Q").unwrap();
        assert_eq!(names(&table), vec!["A", "B", "C"]);
        assert_eq!(table.rows().len(), 8);
    }

    #[test]
    fn missing_file_is_io_error() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("no_such_table.csv");
        let err = TruthTable::load(&path, "Q").unwrap_err();
        assert!(matches!(err, TableError::Io { path, .. } if path.ends_with("no_such_table.csv")));
    }

    #[test]
    fn output_column_may_be_anywhere() {
        let table = TruthTable::parse("Out,X,Y\n1,0,1\n", "Out").unwrap();
        assert_eq!(names(&table), vec!["X", "Y"]);
        assert_eq!(table.rows()[0].values(), &[false, true]);
        let assignment: Vec<_> = table
            .assignment(&table.rows()[0])
            .map(|(n, v)| (n.as_str(), v))
            .collect();
        assert_eq!(assignment, vec![("X", false), ("Y", true)]);
    }

    #[test]
    fn missing_rows_read_as_zero() {
        let table = TruthTable::parse("A,B,Q\n1,1,1\n", "Q").unwrap();
        assert!(table.lookup(&[true, true]));
        assert!(!table.lookup(&[false, true]));
    }

    #[test]
    fn header_only_table_has_no_rows() {
        let table = TruthTable::parse("A,Q\n", "Q").unwrap();
        assert_eq!(table.rows().len(), 0);
    }

    #[test]
    fn duplicate_rows_are_dropped() {
        let table = TruthTable::parse("A,Q\n1,1\n0,0\n1,1\n", "Q").unwrap();
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.true_rows().count(), 1);
    }

    #[test]
    fn conflicting_rows_are_rejected() {
        let err = TruthTable::parse("A,Q\n1,1\n1,0\n", "Q").unwrap_err();
        assert!(matches!(
            err,
            TableError::Conflict {
                first_output: 1,
                second_output: 0,
                ..
            }
        ));
    }

    #[test]
    fn missing_output_column() {
        let err = TruthTable::parse("A,B\n0,1\n", "Q").unwrap_err();
        assert!(matches!(err, TableError::MissingOutput { column, .. } if column == "Q"));
    }

    #[test]
    fn non_integer_value() {
        let err = TruthTable::parse("A,Q\nyes,1\n", "Q").unwrap_err();
        assert!(matches!(err, TableError::NotInteger { text, .. } if text == "yes"));
    }

    #[test]
    fn non_binary_value() {
        let err = TruthTable::parse("A,Q\n2,1\n", "Q").unwrap_err();
        assert!(matches!(err, TableError::NonBinary { value: 2, .. }));
    }

    #[test]
    fn wrong_field_count() {
        let err = TruthTable::parse("A,B,Q\n0,1\n", "Q").unwrap_err();
        assert!(matches!(
            err,
            TableError::FieldCount {
                expected: 3,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn duplicate_column() {
        let err = TruthTable::parse("A,A,Q\n", "Q").unwrap_err();
        assert!(matches!(err, TableError::DuplicateColumn { name, .. } if name == "A"));
    }

    #[test]
    fn invalid_column_name() {
        let err = TruthTable::parse("A,2B,Q\n", "Q").unwrap_err();
        assert!(matches!(err, TableError::InvalidName { name, .. } if name == "2B"));
    }

    #[test]
    fn empty_input() {
        assert!(matches!(
            TruthTable::parse("\n\n", "Q").unwrap_err(),
            TableError::Empty
        ));
    }
}
