//! Error adapter for converting FibermapError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI.
//!
//! A network document that fails to parse is rendered against its source
//! text, with the offending TOML span labelled. Every other error is rendered
//! as a plain diagnostic with a stable code.

use std::{fmt, ops::Range};

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, NamedSource, SourceSpan};

use fibermap::FibermapError;
use fibermap_store::StoreError;

/// Adapter for a network document that failed to load.
pub struct DocumentAdapter {
    message: String,
    span: Option<Range<usize>>,
    src: NamedSource<String>,
}

impl DocumentAdapter {
    /// Create a new document adapter over a copy of the document text.
    pub fn new(name: &str, message: impl Into<String>, span: Option<Range<usize>>, src: &str) -> Self {
        Self {
            message: message.into(),
            span,
            src: NamedSource::new(name, src.to_string()),
        }
    }
}

impl fmt::Debug for DocumentAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentAdapter")
            .field("message", &self.message)
            .field("span", &self.span)
            .finish()
    }
}

impl fmt::Display for DocumentAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for DocumentAdapter {}

impl MietteDiagnostic for DocumentAdapter {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new("fibermap::document"))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(
            "network documents hold [[origins]], [[boxes]] and [[segments]] tables",
        ))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.span.clone()?;
        let label = LabeledSpan::new_primary_with_span(Some("here".to_string()), range_to_miette(span));
        Some(Box::new(std::iter::once(label)))
    }
}

/// Adapter for [`FibermapError`] variants without source information.
pub struct ErrorAdapter<'a>(pub &'a FibermapError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            FibermapError::Io(_) => "fibermap::io",
            FibermapError::Load { .. } => "fibermap::load",
            FibermapError::Repository(_) => "fibermap::repository",
            FibermapError::RepositoryWrite { .. } => "fibermap::write",
            FibermapError::Config(_) => "fibermap::config",
            FibermapError::Export(_) => "fibermap::export",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            FibermapError::RepositoryWrite { .. } => {
                "origins written before this one keep their offsets; rerun with --no-persist to skip writing"
            }
            FibermapError::Config(_) => "check the configuration file passed with --config",
            _ => return None,
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        None
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A document error with source location information.
    Document(DocumentAdapter),
    /// A simple error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Document(d) => fmt::Display::fmt(d, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Document(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Document(d) => d.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Document(d) => d.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Document(d) => d.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Document(d) => d.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Convert a byte range of the document to a miette [`SourceSpan`].
fn range_to_miette(range: Range<usize>) -> SourceSpan {
    SourceSpan::new(range.start.into(), range.len())
}

/// Convert a [`FibermapError`] into a list of reportable errors.
///
/// A [`FibermapError::Load`] caused by a TOML error becomes a
/// [`Reportable::Document`] pointing into the document text. Everything
/// else becomes a single [`Reportable::Error`].
pub fn to_reportables(err: &FibermapError) -> Vec<Reportable<'_>> {
    match err {
        FibermapError::Load {
            path,
            src,
            err: StoreError::Parse(parse_err),
        } if !src.is_empty() => {
            let name = path.display().to_string();
            vec![Reportable::Document(DocumentAdapter::new(
                &name,
                parse_err.message(),
                parse_err.span(),
                src,
            ))]
        }
        FibermapError::Load {
            path,
            src,
            err: err @ StoreError::DuplicateCode { .. },
        } if !src.is_empty() => {
            let name = path.display().to_string();
            vec![Reportable::Document(DocumentAdapter::new(
                &name,
                err.to_string(),
                None,
                src,
            ))]
        }
        _ => vec![Reportable::Error(ErrorAdapter(err))],
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use fibermap::{identifier::Id, repository::RepositoryError};
    use fibermap_store::NetworkDocument;

    use super::*;

    fn load_error(src: &str) -> FibermapError {
        let err = NetworkDocument::from_toml(src).expect_err("invalid document");
        FibermapError::Load {
            path: PathBuf::from("network.toml"),
            src: src.to_string(),
            err,
        }
    }

    #[test]
    fn test_parse_error_points_into_document() {
        let err = load_error("[[origins]]\ncode = 12\n");

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);

        match &reportables[0] {
            Reportable::Document(d) => {
                let labels: Vec<_> = d.labels().expect("labels").collect();
                assert_eq!(labels.len(), 1);
                assert!(labels[0].primary());
                assert!(d.source_code().is_some());
            }
            Reportable::Error(_) => panic!("Expected Document"),
        }
    }

    #[test]
    fn test_duplicate_code_has_no_label() {
        let err = load_error("[[origins]]\ncode = \"A\"\n[[origins]]\ncode = \"A\"\n");

        let reportables = to_reportables(&err);

        match &reportables[0] {
            Reportable::Document(d) => {
                assert_eq!(d.to_string(), "duplicate origin code `A`");
                assert!(d.labels().is_none());
            }
            Reportable::Error(_) => panic!("Expected Document"),
        }
    }

    #[test]
    fn test_non_document_error() {
        let err = FibermapError::RepositoryWrite {
            root: Id::new("SRO-01"),
            source: RepositoryError::Write("disk full".to_string()),
        };

        let reportables = to_reportables(&err);

        assert_eq!(reportables.len(), 1);
        match &reportables[0] {
            Reportable::Error(e) => {
                assert!(e.to_string().contains("SRO-01"));
                assert!(e.help().is_some());
                assert_eq!(
                    e.code().map(|code| code.to_string()),
                    Some("fibermap::write".to_string())
                );
            }
            Reportable::Document(_) => panic!("Expected Error"),
        }
    }

    #[test]
    fn test_unreadable_file_is_plain_error() {
        let err = FibermapError::Load {
            path: PathBuf::from("missing.toml"),
            src: String::new(),
            err: StoreError::Io {
                path: PathBuf::from("missing.toml"),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            },
        };

        let reportables = to_reportables(&err);

        assert!(matches!(reportables[0], Reportable::Error(_)));
    }
}
