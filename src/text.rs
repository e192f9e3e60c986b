//! Helpers for parsing and pretty printing.

use std::fmt;

use pretty::RcDoc;
use winnow::{
    LocatingSlice, ModalResult, Parser,
    error::{StrContext, StrContextValue},
    token::{one_of, take_while},
};

/// Trait for types which can be pretty-printed
pub trait ToDoc {
    /// Produce an `RcDoc` for pretty-printing.
    fn to_doc(&self) -> RcDoc;
}

/// Trait for types which can be parsed
pub trait HasParser: Sized {
    /// Parse an element of this type.
    fn parser(input: &mut LocatingSlice<&str>) -> ModalResult<Self>;
}

/// Wraps data of type `T` in a span of type `S`, locating it in the source text.
#[derive(Clone, Debug, PartialEq)]
pub struct Spanned<S, T> {
    /// Wrapped data
    pub inner: T,
    /// Text span
    pub span: S,
}

/// A variable identifier: an ASCII letter or underscore followed by letters, digits or underscores.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(String);

impl Name {
    /// Returns `Some` if the whole of `s` is a valid identifier.
    pub fn new(s: &str) -> Option<Self> {
        Name::parser.parse(LocatingSlice::new(s)).ok()
    }

    /// The identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl ToDoc for Name {
    fn to_doc(&self) -> RcDoc {
        RcDoc::text(&self.0)
    }
}

impl HasParser for Name {
    fn parser(input: &mut LocatingSlice<&str>) -> ModalResult<Self> {
        (
            one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
            take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
        )
            .take()
            .map(|s: &str| Name(s.to_owned()))
            .context(StrContext::Label("identifier"))
            .context(StrContext::Expected(StrContextValue::Description(
                "letter or underscore",
            )))
            .parse_next(input)
    }
}
