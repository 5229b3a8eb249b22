//! Contains the common [`ErrorKind`] trait used by all errors to display user-facing error
//! messages.
//!
//! Errors raised while normalizing or evaluating an expression are reported as an [`Error`],
//! which pairs the regions of the input that caused the failure with a boxed [`ErrorKind`]. The
//! kind knows how to render itself as an [`ariadne::Report`].

#[cfg(test)]
extern crate self as cas_error;

use ariadne::{Color, Report};
use std::{any::Any, fmt::Debug, ops::Range};

/// The color to use to highlight expressions.
pub const EXPR: Color = Color::RGB(52, 235, 152);

/// Represents any kind of error that can occur during some operation.
pub trait ErrorKind: Debug + Send {
    /// Returns the error as an [`Any`], so it can be downcast to its concrete type.
    fn as_any(&self) -> &dyn Any;

    /// Builds the report for this error.
    fn build_report<'a>(
        &self,
        src_id: &'a str,
        spans: &[Range<usize>],
    ) -> Report<(&'a str, Range<usize>)>;
}

/// An error associated with regions of source code that can be highlighted.
#[derive(Debug)]
pub struct Error {
    /// The regions of the source code that this error originated from.
    pub spans: Vec<Range<usize>>,

    /// The kind of error that occurred.
    pub kind: Box<dyn ErrorKind>,
}

impl Error {
    /// Creates a new error with the given spans and kind.
    pub fn new(spans: Vec<Range<usize>>, kind: impl ErrorKind + 'static) -> Self {
        Self { spans, kind: Box::new(kind) }
    }

    /// Returns true if the kind of this error is `T`.
    pub fn is<T: ErrorKind + 'static>(&self) -> bool {
        self.kind.as_any().is::<T>()
    }

    /// Returns the kind of this error as `T`, if it is one.
    pub fn downcast_ref<T: ErrorKind + 'static>(&self) -> Option<&T> {
        self.kind.as_any().downcast_ref::<T>()
    }

    /// Build a report from this error kind.
    pub fn build_report<'a>(&self, src_id: &'a str) -> Report<(&'a str, Range<usize>)> {
        self.kind.build_report(src_id, &self.spans)
    }
}

#[cfg(test)]
mod tests {
    use ariadne::Source;
    use cas_attrs::ErrorKind;
    use super::*;

    #[derive(Debug, Clone, ErrorKind, PartialEq)]
    #[error(
        message = format!("cannot add `{}` and `{}`", left, right),
        labels = ["this sum".to_string()],
        help = "convert one of the operands first",
    )]
    struct Mismatch {
        left: String,
        right: String,
    }

    #[derive(Debug, Clone, ErrorKind, PartialEq)]
    #[error(message = "nothing to point at", labels = ["", ""])]
    struct Spanless;

    fn render(error: &Error, src: &str) -> String {
        let mut buf = Vec::new();
        error.build_report("input")
            .write(("input", Source::from(src)), &mut buf)
            .unwrap();
        String::from_utf8(strip_ansi_escapes::strip(buf)).unwrap()
    }

    #[test]
    fn report_contains_message_and_help() {
        let error = Error::new(vec![0..9], Mismatch {
            left: "m".to_string(),
            right: "g".to_string(),
        });
        let report = render(&error, "3 m + 5 g");
        assert!(report.contains("cannot add `m` and `g`"));
        assert!(report.contains("this sum"));
        assert!(report.contains("convert one of the operands first"));
    }

    #[test]
    fn downcast_kind() {
        let error = Error::new(vec![0..1], Spanless);
        assert!(error.is::<Spanless>());
        assert!(!error.is::<Mismatch>());
        assert_eq!(error.downcast_ref::<Spanless>(), Some(&Spanless));
    }

    #[test]
    fn more_labels_than_spans() {
        let error = Error::new(Vec::new(), Spanless);
        let report = render(&error, "x");
        assert!(report.contains("nothing to point at"));
    }
}
