//! Sum-of-products Boolean expressions.
//!
//! An expression is either the constant `0` or a non-empty sequence of clauses
//! joined by exclusive-or. Each clause is a conjunction of possibly negated
//! variables, written `(A & ~B & C)`.
//!
//! Clauses synthesized from a truth table are minterms of distinct rows, so at
//! most one of them holds for any input and the exclusive-or agrees with an
//! inclusive-or. The circuit compiler relies on the exclusive-or reading: every
//! clause flips the output qubit once.

use std::fmt;

use indexmap::IndexSet;
use log::debug;
use miette::{Diagnostic, NamedSource, SourceSpan};
use pretty::RcDoc;
use thiserror::Error;
use winnow::{
    LocatingSlice, ModalResult, Parser,
    ascii::multispace0,
    combinator::{alt, cut_err, delimited, opt, separated, terminated},
    error::{StrContext, StrContextValue},
};

use crate::{
    table::TruthTable,
    text::{HasParser, Name, ToDoc},
};

/// Width used when printing expressions with `Display`. Expressions never
/// break across lines.
pub const DISPLAY_WIDTH: usize = 100;

/// Errors raised while parsing an expression.
#[derive(Debug, Error, Diagnostic)]
pub enum ExprError {
    /// The text is not a valid expression.
    #[error("invalid expression")]
    #[diagnostic(
        code(truthq::expr::syntax),
        help("expressions look like `(A & ~B) ^ (~A & B)`, or `0`")
    )]
    Syntax {
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: SourceSpan,
        message: String,
    },
}

/// A variable or its negation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Literal {
    /// The variable
    pub name: Name,
    /// Whether the literal is `~name`
    pub negated: bool,
}

/// A conjunction of literals. The empty clause is constant true.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Clause {
    /// Literals, in the order they are written.
    pub literals: Vec<Literal>,
}

/// A Boolean expression in sum-of-products form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expression {
    /// Constant false.
    Zero,
    /// Exclusive-or of one or more clauses.
    Sum(Vec<Clause>),
}

impl Literal {
    fn eval(&self, lookup: &impl Fn(&Name) -> Option<bool>) -> Option<bool> {
        lookup(&self.name).map(|v| v != self.negated)
    }
}

impl Clause {
    /// Builds the minterm for one row: every input, negated where its value is 0.
    pub fn minterm<'a>(assignment: impl IntoIterator<Item = (&'a Name, bool)>) -> Self {
        Clause {
            literals: assignment
                .into_iter()
                .map(|(name, value)| Literal {
                    name: name.clone(),
                    negated: !value,
                })
                .collect(),
        }
    }

    fn eval(&self, lookup: &impl Fn(&Name) -> Option<bool>) -> Option<bool> {
        let mut result = true;
        for literal in &self.literals {
            result &= literal.eval(lookup)?;
        }
        Some(result)
    }
}

impl Expression {
    /// Builds the sum-of-products expression for the rows of `table` whose output is 1.
    /// Returns `Expression::Zero` if there are none.
    pub fn synthesize(table: &TruthTable) -> Self {
        let clauses: Vec<Clause> = table
            .true_rows()
            .map(|row| Clause::minterm(table.assignment(row)))
            .collect();
        debug!(
            "synthesized {} clauses over {} variables",
            clauses.len(),
            table.inputs().len()
        );
        if clauses.is_empty() {
            Expression::Zero
        } else {
            Expression::Sum(clauses)
        }
    }

    /// Parses an expression from its text form.
    pub fn parse(src: &str) -> Result<Self, ExprError> {
        terminated(Expression::parser, multispace0)
            .parse(LocatingSlice::new(src))
            .map_err(|e| {
                let message = e.inner().to_string();
                ExprError::Syntax {
                    src: NamedSource::new("<expression>", src.to_owned()),
                    span: (e.offset()..e.offset()).into(),
                    message: if message.is_empty() {
                        "unexpected input".to_owned()
                    } else {
                        message
                    },
                }
            })
    }

    /// The clauses of the expression; empty for `Zero`.
    pub fn clauses(&self) -> &[Clause] {
        match self {
            Expression::Zero => &[],
            Expression::Sum(clauses) => clauses,
        }
    }

    /// Variables appearing in the expression, in order of first appearance.
    pub fn variables(&self) -> IndexSet<Name> {
        self.clauses()
            .iter()
            .flat_map(|c| c.literals.iter())
            .map(|l| l.name.clone())
            .collect()
    }

    /// Evaluates the expression. Returns `None` if `lookup` has no value for some variable.
    pub fn eval(&self, lookup: impl Fn(&Name) -> Option<bool>) -> Option<bool> {
        let mut result = false;
        for clause in self.clauses() {
            result ^= clause.eval(&lookup)?;
        }
        Some(result)
    }
}

fn literal(input: &mut LocatingSlice<&str>) -> ModalResult<Literal> {
    (opt(('~', multispace0)), Name::parser)
        .map(|(negation, name)| Literal {
            name,
            negated: negation.is_some(),
        })
        .parse_next(input)
}

impl HasParser for Clause {
    fn parser(input: &mut LocatingSlice<&str>) -> ModalResult<Self> {
        delimited(
            ('(', multispace0),
            cut_err(separated(0.., literal, (multispace0, '&', multispace0))),
            cut_err(
                (multispace0, ')')
                    .context(StrContext::Expected(StrContextValue::CharLiteral(')'))),
            ),
        )
        .map(|literals| Clause { literals })
        .context(StrContext::Label("clause"))
        .parse_next(input)
    }
}

impl HasParser for Expression {
    fn parser(input: &mut LocatingSlice<&str>) -> ModalResult<Self> {
        (
            multispace0,
            alt((
                '0'.value(Expression::Zero),
                separated(1.., Clause::parser, (multispace0, '^', multispace0))
                    .map(Expression::Sum),
            ))
            .context(StrContext::Expected(StrContextValue::CharLiteral('0')))
            .context(StrContext::Expected(StrContextValue::CharLiteral('('))),
        )
            .map(|(_, e)| e)
            .parse_next(input)
    }
}

impl ToDoc for Literal {
    fn to_doc(&self) -> RcDoc {
        if self.negated {
            RcDoc::text("~").append(self.name.to_doc())
        } else {
            self.name.to_doc()
        }
    }
}

impl ToDoc for Clause {
    fn to_doc(&self) -> RcDoc {
        RcDoc::text("(")
            .append(RcDoc::intersperse(
                self.literals.iter().map(Literal::to_doc),
                RcDoc::text(" & "),
            ))
            .append(")")
    }
}

impl ToDoc for Expression {
    fn to_doc(&self) -> RcDoc {
        match self {
            Expression::Zero => RcDoc::text("0"),
            Expression::Sum(clauses) => {
                RcDoc::intersperse(clauses.iter().map(Clause::to_doc), RcDoc::text(" ^ "))
            }
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_doc().render_fmt(DISPLAY_WIDTH, f)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    use super::{Clause, Expression, Literal};
    use crate::{table::TruthTable, text::Name};

    fn lit(name: &str, negated: bool) -> Literal {
        Literal {
            name: Name::new(name).unwrap(),
            negated,
        }
    }

    #[test]
    fn single_all_ones_row_gives_unnegated_conjunction() {
        let table = TruthTable::parse("A,B,C,Q\n1,1,1,1\n0,1,1,0\n", "Q").unwrap();
        let expr = Expression::synthesize(&table);
        assert_eq!(
            expr,
            Expression::Sum(vec![Clause {
                literals: vec![lit("A", false), lit("B", false), lit("C", false)]
            }])
        );
        assert_eq!(expr.to_string(), "(A & B & C)");
    }

    #[test]
    fn two_true_rows_are_joined_with_xor() {
        let table = TruthTable::parse("A,B,Q\n0,0,0\n0,1,1\n1,0,1\n1,1,0\n", "Q").unwrap();
        let expr = Expression::synthesize(&table);
        assert_eq!(expr.clauses().len(), 2);
        assert_eq!(expr.to_string(), "(~A & B) ^ (A & ~B)");
    }

    #[test]
    fn wide_expression_prints_on_one_line() {
        let table = TruthTable::parse(
            "A,B,C,D,Q\n0,0,0,0,1\n0,0,1,1,1\n0,1,0,1,1\n0,1,1,0,1\n1,0,0,1,1\n1,1,1,1,1\n",
            "Q",
        )
        .unwrap();
        let printed = Expression::synthesize(&table).to_string();
        assert!(printed.len() > 100);
        assert!(!printed.contains('\n'), "{printed}");
        assert!(printed.starts_with("(~A & ~B & ~C & ~D) ^ (~A & ~B & C & D) ^ "));
        assert!(printed.ends_with(" ^ (A & B & C & D)"));
    }

    #[test]
    fn no_true_rows_is_zero() {
        let table = TruthTable::parse("A,B,Q\n0,0,0\n1,1,0\n", "Q").unwrap();
        let expr = Expression::synthesize(&table);
        assert_eq!(expr, Expression::Zero);
        assert_eq!(expr.to_string(), "0");
        assert!(expr.variables().is_empty());
    }

    #[test]
    fn true_row_without_inputs_is_empty_clause() {
        let table = TruthTable::parse("Q\n1\n", "Q").unwrap();
        let expr = Expression::synthesize(&table);
        assert_eq!(expr.to_string(), "()");
        assert_eq!(expr.eval(|_| None), Some(true));
    }

    #[test]
    fn variables_match_table_inputs() {
        let table = TruthTable::parse("Y,X,Q,W\n0,1,1,0\n1,1,0,1\n", "Q").unwrap();
        let expr = Expression::synthesize(&table);
        let vars: Vec<_> = expr.variables().into_iter().collect();
        let inputs: Vec<_> = table.inputs().iter().cloned().collect();
        assert_eq!(vars, inputs);
    }

    #[test]
    fn multi_character_names_survive() {
        let table = TruthTable::parse("carry,a1,Out\n1,0,1\n", "Out").unwrap();
        let expr = Expression::synthesize(&table);
        assert_eq!(expr.to_string(), "(carry & ~a1)");
    }

    #[test_case("0" ; "zero")]
    #[test_case("(A)" ; "single variable")]
    #[test_case("(~A & B) ^ (A & ~B)" ; "xor")]
    #[test_case("(carry_in & ~x1 & y) ^ ()" ; "long names and empty clause")]
    fn printing_parses_back(src: &str) {
        let expr = Expression::parse(src).unwrap();
        assert_eq!(expr.to_string(), src);
        assert_eq!(Expression::parse(&expr.to_string()).unwrap(), expr);
    }

    #[test]
    fn parse_tolerates_whitespace() {
        let expr = Expression::parse("  ( ~ A&B )^(C)\n").unwrap();
        assert_eq!(expr.to_string(), "(~A & B) ^ (C)");
    }

    #[test_case("" ; "empty")]
    #[test_case("A & B" ; "missing brackets")]
    #[test_case("(A & B" ; "unclosed")]
    #[test_case("(A) | (B)" ; "or operator")]
    #[test_case("(A &)" ; "dangling and")]
    fn parse_rejects(src: &str) {
        assert!(Expression::parse(src).is_err());
    }

    #[test]
    fn eval_is_xor_of_clauses() {
        let expr = Expression::parse("(A) ^ (B)").unwrap();
        let a = Name::new("A").unwrap();
        let value = |x: bool, y: bool| expr.eval(|n| Some(if *n == a { x } else { y }));
        assert_eq!(value(false, false), Some(false));
        assert_eq!(value(true, false), Some(true));
        assert_eq!(value(true, true), Some(false));
        assert_eq!(expr.eval(|_| None), None);
    }
}
