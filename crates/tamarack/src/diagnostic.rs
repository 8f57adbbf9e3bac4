//! Pretty-printable reports for errors that reference GraphQL source text.
//!
//! Implement [`ToCliReport`] to give a custom error type labeled source
//! excerpts; wrap it in [`Diagnostic`] (usually through
//! [`ToCliReport::to_diagnostic`]) for formatting. `Debug`-formatting a
//! diagnostic uses ANSI colors when stderr is a terminal, `Display` never
//! does.

use crate::response::GraphQLError;
use crate::response::GraphQLLocation;
use crate::sources::FileId;
use crate::sources::SourceFile;
use crate::sources::SourceMap;
use crate::sources::SourceSpan;
use ariadne::ColorGenerator;
use ariadne::ReportKind;
use std::fmt;
use std::io;
use std::ops::Range;
use std::sync::Arc;
use std::sync::OnceLock;

/// A pretty-printable diagnostic: an error bundled with the sources it points into.
pub struct Diagnostic<T> {
    pub sources: SourceMap,
    pub error: T,
}

/// A diagnostic report that can be printed to a CLI with pretty colors and labeled lines of
/// GraphQL source code.
pub struct CliReport {
    sources: SourceMap,
    colors: ColorGenerator,
    report: ariadne::ReportBuilder<'static, MappedSpan>,
}

/// Indicate when to use ANSI colors for printing.
#[derive(Debug, Clone, Copy)]
pub enum Color {
    /// Do not use colors.
    Never,
    /// Use colors if stderr is a terminal.
    StderrIsTerminal,
}

/// Trait for pretty-printing custom error types.
pub trait ToCliReport {
    /// Return the main location for this error. May be `None` if a location doesn't make sense for
    /// the particular error.
    fn location(&self) -> Option<SourceSpan>;

    /// Fill in the report with messages and source code labels.
    fn report(&self, report: &mut CliReport);

    /// Returns a pretty-printable diagnostic.
    ///
    /// Provide a source map containing the files that may be referenced by the
    /// diagnostic, normally [`Document::sources`][crate::ast::Document::sources].
    fn to_diagnostic(self, sources: &SourceMap) -> Diagnostic<Self>
    where
        Self: Sized,
    {
        Diagnostic {
            sources: sources.clone(),
            error: self,
        }
    }
}

type MappedSpan = (FileId, Range<usize>);

/// Translate a byte-offset location into a char-offset location for use with ariadne.
fn map_span(sources: &SourceMap, location: SourceSpan) -> Option<MappedSpan> {
    let source = sources.get(&location.file_id())?;
    let mapped_source = source.mapped_source();
    let start = mapped_source.map_index(location.offset());
    let end = mapped_source.map_index(location.end_offset());
    Some((location.file_id(), start..end))
}

/// Provide a [`std::io::Write`] API for a [`std::fmt::Formatter`].
struct WriteToFormatter<'a, 'b> {
    f: &'a mut fmt::Formatter<'b>,
}

impl io::Write for WriteToFormatter<'_, '_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = std::str::from_utf8(buf).map_err(|_| io::ErrorKind::Other)?;
        self.f.write_str(s).map_err(|_| io::ErrorKind::Other)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl CliReport {
    /// Returns a builder for creating diagnostic reports.
    ///
    /// Provide GraphQL source files and the main location for the diagnostic.
    pub fn builder(sources: SourceMap, location: Option<SourceSpan>) -> Self {
        let (file_id, range) = location
            .and_then(|location| map_span(&sources, location))
            .unwrap_or((FileId::NONE, 0..0));
        Self {
            sources,
            colors: ColorGenerator::new(),
            report: ariadne::Report::build(ReportKind::Error, file_id, range.start),
        }
    }

    fn with_color(self, color: Color) -> Self {
        let enable_color = match color {
            Color::Never => false,
            // Rely on ariadne's `auto-color` feature, which uses `concolor` to enable colors
            // only if stderr is a terminal.
            Color::StderrIsTerminal => true,
        };
        let config = ariadne::Config::default().with_color(enable_color);
        Self {
            report: self.report.with_config(config),
            ..self
        }
    }

    /// Set the main message for the report.
    pub fn with_message(&mut self, message: impl ToString) {
        self.report.set_message(message);
    }

    /// Set the help message for the report, usually a suggestion on how to fix the error.
    pub fn with_help(&mut self, help: impl ToString) {
        self.report.set_help(help);
    }

    /// Add a label at a given location. If the location is `None`, the message is discarded.
    pub fn with_label_opt(&mut self, location: Option<SourceSpan>, message: impl ToString) {
        if let Some(mapped_span) = location.and_then(|location| map_span(&self.sources, location)) {
            self.report.add_label(
                ariadne::Label::new(mapped_span)
                    .with_message(message)
                    .with_color(self.colors.next()),
            );
        }
    }

    /// Write the report to a [`Write`].
    ///
    /// [`Write`]: std::io::Write
    pub fn write(self, w: impl io::Write) -> io::Result<()> {
        let report = self.report.finish();
        report.write(Cache(&self.sources), w)
    }

    /// Write the report to a [`fmt::Formatter`].
    pub fn fmt(self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(WriteToFormatter { f }).map_err(|_| fmt::Error)
    }
}

struct Cache<'a>(&'a SourceMap);

impl ariadne::Cache<FileId> for Cache<'_> {
    type Storage = String;

    fn fetch(&mut self, file_id: &FileId) -> Result<&ariadne::Source, Box<dyn fmt::Debug + '_>> {
        struct NotFound(FileId);
        impl fmt::Debug for NotFound {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "source file not found: {:?}", self.0)
            }
        }
        if let Some(source_file) = self.0.get(file_id) {
            Ok(source_file.ariadne())
        } else if *file_id == FileId::NONE {
            static EMPTY: OnceLock<ariadne::Source> = OnceLock::new();
            Ok(EMPTY.get_or_init(|| ariadne::Source::from(String::new())))
        } else {
            Err(Box::new(NotFound(*file_id)))
        }
    }

    fn display<'a>(&self, file_id: &'a FileId) -> Option<Box<dyn fmt::Display + 'a>> {
        if *file_id != FileId::NONE {
            struct Path(Arc<SourceFile>);
            impl fmt::Display for Path {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    self.0.path().display().fmt(f)
                }
            }
            let source_file = self.0.get(file_id)?;
            Some(Box::new(Path(source_file.clone())))
        } else {
            struct NoSourceFile;
            impl fmt::Display for NoSourceFile {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str("(no source file)")
                }
            }
            Some(Box::new(NoSourceFile))
        }
    }
}

impl<T> std::ops::Deref for Diagnostic<T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        &self.error
    }
}

impl<T: std::error::Error + ToCliReport> std::error::Error for Diagnostic<T> {}

impl<T: ToCliReport> ToCliReport for &T {
    fn location(&self) -> Option<SourceSpan> {
        ToCliReport::location(*self)
    }

    fn report(&self, report: &mut CliReport) {
        ToCliReport::report(*self, report)
    }
}

impl<T: ToCliReport> Diagnostic<T> {
    /// Get the line and column number where this diagnostic was raised.
    pub fn get_line_column(&self) -> Option<GraphQLLocation> {
        GraphQLLocation::from_span(&self.sources, self.error.location())
    }

    /// Get a [`serde`]-serializable version of this diagnostic, in the JSON
    /// error shape described in [the GraphQL spec].
    ///
    /// [the GraphQL spec]: https://spec.graphql.org/draft/#sec-Errors
    pub fn to_json(&self) -> GraphQLError
    where
        T: ToString,
    {
        GraphQLError::new(self.error.to_string(), self.error.location(), &self.sources)
    }

    /// Produce the diagnostic report, optionally with colors for the CLI.
    fn report(&self, color: Color) -> CliReport {
        let mut report =
            CliReport::builder(self.sources.clone(), self.error.location()).with_color(color);
        self.error.report(&mut report);
        report
    }

    /// Pretty-print the diagnostic to a [`Write`].
    ///
    /// [`Write`]: std::io::Write
    pub fn write(&self, color: Color, w: impl io::Write) -> io::Result<()> {
        self.report(color).write(w)
    }
}

impl<T: ToCliReport> fmt::Debug for Diagnostic<T> {
    /// Pretty-format the diagnostic, with colors for the CLI.
    ///
    /// The debug formatting expects to be written to stderr and ANSI colors are used if stderr is
    /// a terminal.
    ///
    /// To output *without* colors, format with `Display`: `format!("{diagnostic}")`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.report(Color::StderrIsTerminal).fmt(f)
    }
}

impl<T: ToCliReport> fmt::Display for Diagnostic<T> {
    /// Pretty-format the diagnostic without colors.
    ///
    /// To output *with* colors, format with `Debug`: `eprintln!("{diagnostic:?}")`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.report(Color::Never).fmt(f)
    }
}
