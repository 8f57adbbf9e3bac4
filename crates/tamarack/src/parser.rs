//! GraphQL document parsing, built on [`apollo_parser`].
//!
//! [`Parser`] turns source text into an [`ast::Document`] while collecting
//! syntax errors into a [`DiagnosticList`]. Parsing is lossy in the face of
//! errors: a partial document is still produced and returned together with
//! the diagnostics ([`WithErrors`]).

use crate::ast::Document;
use crate::diagnostic::CliReport;
use crate::diagnostic::Diagnostic;
use crate::diagnostic::ToCliReport;
use crate::sources::FileId;
use crate::sources::SourceFile;
use crate::sources::SourceMap;
use crate::sources::SourceSpan;
use std::fmt;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::OnceLock;

/// Configuration for parsing an input string as GraphQL syntax
#[derive(Default, Debug, Clone)]
pub struct Parser {
    recursion_limit: Option<usize>,
    token_limit: Option<usize>,
    recursion_reached: usize,
    tokens_reached: usize,
}

/// A syntax error from parsing a GraphQL document
#[derive(Debug, Clone, thiserror::Error)]
#[error("{details}")]
pub struct ParseError {
    pub(crate) location: Option<SourceSpan>,
    pub(crate) details: Details,
}

#[derive(Debug, Clone, thiserror::Error)]
pub(crate) enum Details {
    #[error("syntax error: {message}")]
    SyntaxError { message: String },
    #[error("parser limit reached: {message}")]
    ParserLimit { message: String },
}

/// A collection of parse errors, with the sources needed to render them
#[derive(Clone)]
pub struct DiagnosticList {
    pub(crate) sources: SourceMap,
    errors: Vec<ParseError>,
}

/// A partial result, with errors attached
pub struct WithErrors<T> {
    /// The partial result. Typically some components expected to be present are missing.
    pub partial: T,

    /// The errors collected while producing `partial`
    pub errors: DiagnosticList,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the recursion limit to use while parsing.
    pub fn recursion_limit(mut self, value: usize) -> Self {
        self.recursion_limit = Some(value);
        self
    }

    /// Configure the limit on the number of tokens to parse.
    /// If an input document is too big, parsing will be aborted.
    /// By default, there is no limit.
    pub fn token_limit(mut self, value: usize) -> Self {
        self.token_limit = Some(value);
        self
    }

    /// Parse the given source text into an executable document.
    ///
    /// `path` is the filesystem path (or arbitrary string) used in diagnostics
    /// to identify this source file to users.
    pub fn parse(
        &mut self,
        source_text: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> Result<Document, WithErrors<Document>> {
        let mut errors = DiagnosticList::new(Default::default());
        let document = self.parse_inner(source_text, path, FileId::new(), &mut errors);
        errors.into_result_with(document)
    }

    pub(crate) fn parse_inner(
        &mut self,
        source_text: impl Into<String>,
        path: impl AsRef<Path>,
        file_id: FileId,
        errors: &mut DiagnosticList,
    ) -> Document {
        let tree = self.parse_common(
            source_text.into(),
            path.as_ref().to_owned(),
            file_id,
            errors,
        );
        Document::from_cst(tree.document(), file_id, errors.sources.clone())
    }

    fn parse_common(
        &mut self,
        source_text: String,
        path: PathBuf,
        file_id: FileId,
        errors: &mut DiagnosticList,
    ) -> apollo_parser::SyntaxTree {
        let mut parser = apollo_parser::Parser::new(&source_text);
        if let Some(value) = self.recursion_limit {
            parser = parser.recursion_limit(value)
        }
        if let Some(value) = self.token_limit {
            parser = parser.token_limit(value)
        }
        let tree = parser.parse();
        self.recursion_reached = tree.recursion_limit().high;
        self.tokens_reached = tree.token_limit().high;
        let source_file = Arc::new(SourceFile {
            path,
            source_text,
            mapped_source: OnceLock::new(),
        });
        Arc::make_mut(&mut errors.sources).insert(file_id, source_file);
        for parser_error in tree.errors() {
            // Silently skip parse errors at index beyond 4 GiB.
            // Rowan in apollo-parser might complain about files that large
            // before we get here anyway.
            let Ok(index) = parser_error.index().try_into() else {
                continue;
            };
            let Ok(len) = parser_error.data().len().try_into() else {
                continue;
            };
            let location = Some(SourceSpan {
                file_id,
                text_range: rowan::TextRange::at(index, len),
            });
            let details = if parser_error.is_limit() {
                Details::ParserLimit {
                    message: parser_error.message().to_owned(),
                }
            } else {
                Details::SyntaxError {
                    message: parser_error.message().to_owned(),
                }
            };
            errors.push(ParseError { location, details })
        }
        tree
    }

    /// What level of recursion was reached during the last call to a `parse_*` method.
    ///
    /// Collecting this on a corpus of documents can help decide
    /// how to set [`recursion_limit`][Self::recursion_limit].
    pub fn recursion_reached(&self) -> usize {
        self.recursion_reached
    }

    /// How many tokens were created during the last call to a `parse_*` method.
    ///
    /// Collecting this on a corpus of documents can help decide
    /// how to set [`token_limit`][Self::token_limit].
    pub fn tokens_reached(&self) -> usize {
        self.tokens_reached
    }
}

impl ParseError {
    /// The source location of this error, if known
    pub fn location(&self) -> Option<SourceSpan> {
        self.location
    }
}

impl ToCliReport for ParseError {
    fn location(&self) -> Option<SourceSpan> {
        self.location
    }

    fn report(&self, report: &mut CliReport) {
        report.with_message(&self.details);
        let label = match &self.details {
            Details::SyntaxError { message } | Details::ParserLimit { message } => message,
        };
        report.with_label_opt(self.location, label);
    }
}

impl DiagnosticList {
    pub(crate) fn new(sources: SourceMap) -> Self {
        Self {
            sources,
            errors: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Diagnostic<&ParseError>> {
        self.errors
            .iter()
            .map(|error| error.to_diagnostic(&self.sources))
    }

    pub(crate) fn push(&mut self, error: ParseError) {
        self.errors.push(error)
    }

    pub(crate) fn into_result(mut self) -> Result<(), Self> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            // Parse errors arrive in lexical order within a file, but merged
            // lists interleave files.
            self.errors.sort_by_key(|error| {
                error
                    .location
                    .map(|location| (location.file_id(), location.offset()))
            });
            Err(self)
        }
    }

    pub(crate) fn into_result_with<T>(self, value: T) -> Result<T, WithErrors<T>> {
        match self.into_result() {
            Ok(()) => Ok(value),
            Err(errors) => Err(WithErrors {
                partial: value,
                errors,
            }),
        }
    }
}

/// Pretty-format all errors in the list, without colors
impl fmt::Display for DiagnosticList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in self.iter() {
            fmt::Display::fmt(&diagnostic, f)?
        }
        Ok(())
    }
}

/// Pretty-format all errors in the list, with colors for the CLI
impl fmt::Debug for DiagnosticList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in self.iter() {
            fmt::Debug::fmt(&diagnostic, f)?
        }
        Ok(())
    }
}

impl std::error::Error for DiagnosticList {}

impl<T> fmt::Display for WithErrors<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.errors.fmt(f)
    }
}

impl<T> fmt::Debug for WithErrors<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.errors, f)
    }
}

impl<T> std::error::Error for WithErrors<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_recovers_partial_document() {
        let err = Parser::new()
            .parse("{ pet { name } } fragment F on", "bad.graphql")
            .unwrap_err();
        assert!(!err.errors.is_empty());
        // The valid anonymous operation survives, the truncated fragment is dropped
        assert_eq!(err.partial.definitions.len(), 1);
        let messages = err.errors.to_string();
        assert!(messages.contains("syntax error"), "{messages}");
    }

    #[test]
    fn token_limit_reported_as_limit_error() {
        let err = Parser::new()
            .token_limit(3)
            .parse("{ a b c d e }", "big.graphql")
            .unwrap_err();
        let messages = err.errors.to_string();
        assert!(messages.contains("limit"), "{messages}");
    }
}
