//! Source files for parsed documents, and byte-span to line/column mapping.

use crate::response::GraphQLLocation;
use indexmap::IndexMap;
use rowan::TextRange;
use std::fmt;
use std::num::NonZeroU64;
use std::path::Path;
use std::path::PathBuf;
use std::sync::atomic;
use std::sync::Arc;
use std::sync::OnceLock;

/// Translation of byte offsets in a source file to (line, column) pairs,
/// and to the char offsets [`ariadne`] works with.
///
/// Both tables are built lazily, on the first diagnostic that needs them.
#[derive(Clone)]
pub(crate) struct MappedSource {
    ariadne: ariadne::Source,
    /// Index: byte offset in the source. Value: char offset.
    map: Vec<u32>,
    /// Byte offset of the start of each line.
    line_starts: Vec<usize>,
}

/// Identifies a parsed source file. Cheap to copy and compare.
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct FileId {
    id: NonZeroU64,
}

/// A byte range in a parsed source file, attached to AST nodes.
#[derive(Clone, Copy, Hash, PartialEq, Eq)]
pub struct SourceSpan {
    pub(crate) file_id: FileId,
    pub(crate) text_range: TextRange,
}

/// The source text of a parsed document, retained for error reporting.
pub struct SourceFile {
    pub(crate) path: PathBuf,
    pub(crate) source_text: String,
    pub(crate) mapped_source: OnceLock<MappedSource>,
}

/// All source files that contributed to a document, keyed by [`FileId`].
pub type SourceMap = Arc<IndexMap<FileId, Arc<SourceFile>>>;

impl MappedSource {
    fn new(input: &str) -> Self {
        let mut map = vec![0; input.len() + 1];
        let mut line_starts = vec![0];
        for (char_index, (byte_index, ch)) in input.char_indices().enumerate() {
            map[byte_index] = char_index as u32;
            if ch == '\n' {
                line_starts.push(byte_index + 1);
            }
        }
        map[input.len()] = input.chars().count() as u32;
        Self {
            ariadne: ariadne::Source::from(input.to_owned()),
            map,
            line_starts,
        }
    }

    pub(crate) fn map_index(&self, byte_index: usize) -> usize {
        self.map.get(byte_index).copied().unwrap_or_default() as usize
    }
}

/// The next file ID to use. This is global so file IDs do not conflict between
/// different documents parsed in the same process.
static NEXT: atomic::AtomicU64 = atomic::AtomicU64::new(INITIAL);
static INITIAL: u64 = 2;

impl FileId {
    /// Sentinel for locations not backed by any source file.
    pub(crate) const NONE: Self = Self {
        id: match NonZeroU64::new(1) {
            Some(id) => id,
            None => unreachable!(),
        },
    };

    pub(crate) fn new() -> Self {
        loop {
            let id = NEXT.fetch_add(1, atomic::Ordering::AcqRel);
            if let Some(id) = NonZeroU64::new(id) {
                return Self { id };
            }
        }
    }
}

impl fmt::Debug for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileId({})", self.id)
    }
}

impl SourceSpan {
    pub(crate) fn new(file_id: FileId, node: &apollo_parser::SyntaxNode) -> Self {
        Self {
            file_id,
            text_range: node.text_range(),
        }
    }

    /// The file containing this span.
    pub fn file_id(&self) -> FileId {
        self.file_id
    }

    /// The byte offset of the start of this span in its file.
    pub fn offset(&self) -> usize {
        self.text_range.start().into()
    }

    /// The byte offset of the end of this span in its file.
    pub fn end_offset(&self) -> usize {
        self.text_range.end().into()
    }

    /// If the span points into a file present in `sources`,
    /// convert its start to 1-based line and column numbers.
    pub fn line_column(&self, sources: &SourceMap) -> Option<GraphQLLocation> {
        let source = sources.get(&self.file_id)?;
        source.get_line_column(self.offset())
    }
}

impl fmt::Debug for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} @{}..{}",
            self.file_id,
            self.offset(),
            self.end_offset(),
        )
    }
}

impl SourceFile {
    /// The filesystem path (or hypothetical path) of this source file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub(crate) fn mapped_source(&self) -> &MappedSource {
        self.mapped_source
            .get_or_init(|| MappedSource::new(&self.source_text))
    }

    pub(crate) fn ariadne(&self) -> &ariadne::Source {
        &self.mapped_source().ariadne
    }

    /// Convert a byte offset in this file to 1-based line and column numbers.
    ///
    /// Once the line index is built, this is a pure function of the offset.
    pub fn get_line_column(&self, offset: usize) -> Option<GraphQLLocation> {
        let text = &self.source_text;
        if offset > text.len() || !text.is_char_boundary(offset) {
            return None;
        }
        let line_starts = &self.mapped_source().line_starts;
        let line = line_starts.partition_point(|&start| start <= offset) - 1;
        let column = text[line_starts[line]..offset].chars().count() + 1;
        Some(GraphQLLocation {
            line: line + 1,
            column,
        })
    }
}

impl fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceFile")
            .field("path", &self.path)
            .field("source_text", &self.source_text)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(text: &str) -> SourceFile {
        SourceFile {
            path: "test.graphql".into(),
            source_text: text.to_owned(),
            mapped_source: OnceLock::new(),
        }
    }

    #[test]
    fn line_column_from_offset() {
        let source = file("{\n  patron {\n    id\n  }\n}\n");
        let loc = |offset| {
            let l = source.get_line_column(offset).unwrap();
            (l.line, l.column)
        };
        assert_eq!(loc(0), (1, 1));
        assert_eq!(loc(4), (2, 3));
        assert_eq!(loc(17), (3, 5));
        // Same offset twice: the index is memoized, the answer stable.
        assert_eq!(loc(17), (3, 5));
        assert_eq!(source.get_line_column(1000), None);
    }

    #[test]
    fn line_column_counts_chars_not_bytes() {
        let source = file("# émoji hére\n{ a }");
        let l = source.get_line_column(15).unwrap();
        assert_eq!((l.line, l.column), (2, 1));
    }
}
