//! Immutable layout tree for constructor parameter lists.
//!
//! `syn` discards whitespace, so the linter keeps a small tree of its own for
//! the region between a constructor's parentheses: each parameter with its
//! verbatim text, the trivia in front of it and the separator after it.
//!
//! Nodes are never mutated. Edits build a new tree that shares every
//! unchanged [`Parameter`] with the old one through [`Arc`].

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

/// A position in source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextPos {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column in characters (0-indexed).
    pub column: usize,
    /// Byte offset from the start of the document.
    pub offset: usize,
}

impl TextPos {
    /// Creates a new position.
    #[must_use]
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }

    /// Returns the position reached after writing `text` at this position.
    #[must_use]
    pub fn advance(self, text: &str) -> Self {
        let mut pos = self;
        for ch in text.chars() {
            if ch == '\n' {
                pos.line += 1;
                pos.column = 0;
            } else {
                pos.column += 1;
            }
            pos.offset += ch.len_utf8();
        }
        pos
    }
}

/// A contiguous span of source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TextSpan {
    /// Start position (inclusive).
    pub start: TextPos,
    /// End position (exclusive).
    pub end: TextPos,
}

impl TextSpan {
    /// Creates a new span.
    #[must_use]
    pub fn new(start: TextPos, end: TextPos) -> Self {
        Self { start, end }
    }

    /// Length of the span in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.offset.saturating_sub(self.start.offset)
    }

    /// Returns true if the span covers no text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Line terminator used by a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LineEnding {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    CrLf,
}

impl LineEnding {
    /// Detects the line ending from the first line break in `text`.
    #[must_use]
    pub fn detect(text: &str) -> Self {
        match text.find('\n') {
            Some(i) if text[..i].ends_with('\r') => Self::CrLf,
            _ => Self::Lf,
        }
    }

    /// The trivia piece for this line ending.
    #[must_use]
    pub fn piece(self) -> TriviaPiece {
        match self {
            Self::Lf => TriviaPiece::Newline,
            Self::CrLf => TriviaPiece::CrLf,
        }
    }
}

/// One piece of non-semantic source text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TriviaPiece {
    /// A run of horizontal whitespace (spaces, tabs, a lone `\r`).
    Whitespace(String),
    /// A single `\n`.
    Newline,
    /// A `\r\n` pair.
    CrLf,
    /// A `//` comment, without its terminating newline.
    LineComment(String),
    /// A `/* ... */` comment, possibly nested.
    BlockComment(String),
    /// Text the trivia lexer does not recognize; kept as is.
    Verbatim(String),
}

impl TriviaPiece {
    /// Returns the source text of this piece.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Newline => "\n",
            Self::CrLf => "\r\n",
            Self::Whitespace(s)
            | Self::LineComment(s)
            | Self::BlockComment(s)
            | Self::Verbatim(s) => s,
        }
    }

    /// Returns true for `\n` and `\r\n`.
    #[must_use]
    pub fn is_line_break(&self) -> bool {
        matches!(self, Self::Newline | Self::CrLf)
    }

    /// Returns true for pieces that carry content and must survive edits.
    #[must_use]
    pub fn is_content(&self) -> bool {
        matches!(
            self,
            Self::LineComment(_) | Self::BlockComment(_) | Self::Verbatim(_)
        )
    }
}

/// Whitespace and comments attached in front of a token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Trivia {
    pieces: Vec<TriviaPiece>,
}

impl Trivia {
    /// Creates trivia from its pieces.
    #[must_use]
    pub fn new(pieces: Vec<TriviaPiece>) -> Self {
        Self { pieces }
    }

    /// Trivia consisting of a single line break.
    #[must_use]
    pub fn line_break(ending: LineEnding) -> Self {
        Self::new(vec![ending.piece()])
    }

    /// Splits raw gap text into trivia pieces.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut pieces = Vec::new();
        let mut rest = text;

        while let Some(ch) = rest.chars().next() {
            let (piece, len) = if ch == '\n' {
                (TriviaPiece::Newline, 1)
            } else if rest.starts_with("\r\n") {
                (TriviaPiece::CrLf, 2)
            } else if rest.starts_with("//") {
                let len = line_end(rest);
                (TriviaPiece::LineComment(rest[..len].to_string()), len)
            } else if rest.starts_with("/*") {
                let len = block_comment_len(rest);
                (TriviaPiece::BlockComment(rest[..len].to_string()), len)
            } else if ch.is_whitespace() {
                let len = rest
                    .char_indices()
                    .find(|&(i, c)| {
                        c == '\n' || !c.is_whitespace() || rest[i..].starts_with("\r\n")
                    })
                    .map_or(rest.len(), |(i, _)| i);
                (TriviaPiece::Whitespace(rest[..len].to_string()), len)
            } else {
                let len = rest
                    .char_indices()
                    .skip(1)
                    .find(|&(_, c)| c.is_whitespace() || c == '/')
                    .map_or(rest.len(), |(i, _)| i);
                (TriviaPiece::Verbatim(rest[..len].to_string()), len)
            };
            pieces.push(piece);
            rest = &rest[len..];
        }

        Self { pieces }
    }

    /// Returns the pieces of this trivia.
    #[must_use]
    pub fn pieces(&self) -> &[TriviaPiece] {
        &self.pieces
    }

    /// Replaces all whitespace with a single leading line break.
    ///
    /// Comments are kept in order, each followed by one space.
    #[must_use]
    pub fn broken_before(&self, ending: LineEnding) -> Self {
        let mut pieces = Self::line_break(ending).pieces;
        for piece in self.pieces.iter().filter(|p| p.is_content()) {
            pieces.push(piece.clone());
            pieces.push(TriviaPiece::Whitespace(" ".to_string()));
        }
        Self { pieces }
    }

    /// Returns true if this trivia opens with a line break that has no
    /// indentation after it.
    #[must_use]
    pub fn needs_indent(&self) -> bool {
        self.pieces.first().is_some_and(TriviaPiece::is_line_break)
            && !matches!(self.pieces.get(1), Some(TriviaPiece::Whitespace(_)))
    }

    /// Inserts `indent` after the leading line break.
    #[must_use]
    pub fn indented(&self, indent: &str) -> Self {
        if !self.needs_indent() || indent.is_empty() {
            return self.clone();
        }
        let mut pieces = self.pieces.clone();
        pieces.insert(1, TriviaPiece::Whitespace(indent.to_string()));
        Self { pieces }
    }
}

impl fmt::Display for Trivia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for piece in &self.pieces {
            f.write_str(piece.as_str())?;
        }
        Ok(())
    }
}

/// Length of the first line of `text`, excluding its line ending.
fn line_end(text: &str) -> usize {
    match text.find('\n') {
        Some(i) if text[..i].ends_with('\r') => i - 1,
        Some(i) => i,
        None => text.len(),
    }
}

/// Length in bytes of the (possibly nested) block comment at the start of `text`.
fn block_comment_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut depth = 0_usize;
    let mut idx = 0_usize;

    while idx + 1 < bytes.len() {
        match (bytes[idx], bytes[idx + 1]) {
            (b'/', b'*') => {
                depth += 1;
                idx += 2;
            }
            (b'*', b'/') => {
                depth -= 1;
                idx += 2;
                if depth == 0 {
                    return idx;
                }
            }
            _ => idx += 1,
        }
    }

    text.len()
}

/// One entry of a parameter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    name: Arc<str>,
    leading: Trivia,
    text: Arc<str>,
    separator: Arc<str>,
    span: TextSpan,
}

impl Parameter {
    /// Creates a new parameter.
    ///
    /// `text` is the verbatim source of the parameter (attributes, pattern
    /// and type); `separator` is everything after it up to and including the
    /// following comma, or empty for a last parameter without one.
    #[must_use]
    pub fn new(
        name: impl Into<Arc<str>>,
        leading: Trivia,
        text: impl Into<Arc<str>>,
        separator: impl Into<Arc<str>>,
        span: TextSpan,
    ) -> Self {
        Self {
            name: name.into(),
            leading,
            text: text.into(),
            separator: separator.into(),
            span,
        }
    }

    /// Name of the parameter (its pattern as written).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Trivia in front of the parameter.
    #[must_use]
    pub fn leading(&self) -> &Trivia {
        &self.leading
    }

    /// Verbatim parameter text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Text following the parameter, including its comma.
    #[must_use]
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Source span of the parameter text.
    #[must_use]
    pub fn span(&self) -> TextSpan {
        self.span
    }

    /// Line on which the parameter ends.
    #[must_use]
    pub fn end_line(&self) -> usize {
        self.span.end.line
    }

    /// Returns a copy with different leading trivia.
    ///
    /// The span of the copy is stale until the owning list is laid out again.
    #[must_use]
    pub fn with_leading(&self, leading: Trivia) -> Self {
        Self {
            leading,
            ..self.clone()
        }
    }

    fn with_span(&self, span: TextSpan) -> Self {
        Self {
            span,
            ..self.clone()
        }
    }
}

/// The parameters between a constructor's parentheses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterList {
    source_range: Range<usize>,
    start: TextPos,
    parameters: Vec<Arc<Parameter>>,
    trailing: Trivia,
}

impl ParameterList {
    /// Creates a list as it appears in the source.
    ///
    /// `source_range` is the byte range between `(` and `)` in the original
    /// document and `start` the position right after `(`.
    #[must_use]
    pub fn new(
        source_range: Range<usize>,
        start: TextPos,
        parameters: Vec<Arc<Parameter>>,
        trailing: Trivia,
    ) -> Self {
        Self {
            source_range,
            start,
            parameters,
            trailing,
        }
    }

    /// Byte range of the list content in the original document.
    #[must_use]
    pub fn source_range(&self) -> Range<usize> {
        self.source_range.clone()
    }

    /// Position right after the opening parenthesis.
    #[must_use]
    pub fn start(&self) -> TextPos {
        self.start
    }

    /// Parameters in declaration order.
    #[must_use]
    pub fn parameters(&self) -> &[Arc<Parameter>] {
        &self.parameters
    }

    /// Trivia between the last parameter and `)`.
    #[must_use]
    pub fn trailing(&self) -> &Trivia {
        &self.trailing
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Returns true if the list has no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Returns a list with the given parameters, positions recomputed from
    /// the rendered text.
    #[must_use]
    pub fn with_parameters(&self, parameters: Vec<Arc<Parameter>>) -> Self {
        Self {
            source_range: self.source_range.clone(),
            start: self.start,
            parameters: relayout(self.start, parameters),
            trailing: self.trailing.clone(),
        }
    }

    /// Renders the list content (without parentheses).
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ParameterList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for param in &self.parameters {
            write!(f, "{}{}{}", param.leading, param.text, param.separator)?;
        }
        write!(f, "{}", self.trailing)
    }
}

/// Recomputes parameter spans by walking the rendered text from `start`.
///
/// Parameters whose span is already correct are shared, not copied.
fn relayout(start: TextPos, parameters: Vec<Arc<Parameter>>) -> Vec<Arc<Parameter>> {
    let mut pos = start;
    parameters
        .into_iter()
        .map(|param| {
            let text_start = pos.advance(&param.leading.to_string());
            let text_end = text_start.advance(&param.text);
            pos = text_end.advance(&param.separator);

            let span = TextSpan::new(text_start, text_end);
            if param.span == span {
                param
            } else {
                Arc::new(param.with_span(span))
            }
        })
        .collect()
}

/// A constructor declaration: an associated function returning its own type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorDecl {
    owner: Arc<str>,
    name: Arc<str>,
    indent: Arc<str>,
    line_ending: LineEnding,
    parameters: ParameterList,
    needs_format: bool,
}

impl ConstructorDecl {
    /// Creates a new declaration.
    ///
    /// `indent` is the leading whitespace of the line holding `fn`.
    #[must_use]
    pub fn new(
        owner: impl Into<Arc<str>>,
        name: impl Into<Arc<str>>,
        indent: impl Into<Arc<str>>,
        parameters: ParameterList,
    ) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            indent: indent.into(),
            line_ending: LineEnding::Lf,
            parameters,
            needs_format: false,
        }
    }

    /// Sets the line ending of the surrounding document.
    #[must_use]
    pub fn with_line_ending(self, line_ending: LineEnding) -> Self {
        Self {
            line_ending,
            ..self
        }
    }

    /// Name of the type being constructed.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Name of the constructor function.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Indentation of the signature line.
    #[must_use]
    pub fn indent(&self) -> &str {
        &self.indent
    }

    /// Line ending used when inserting line breaks.
    #[must_use]
    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// The parameter list.
    #[must_use]
    pub fn parameters(&self) -> &ParameterList {
        &self.parameters
    }

    /// Whether the node awaits indentation normalization.
    #[must_use]
    pub fn needs_format(&self) -> bool {
        self.needs_format
    }

    /// Returns a copy with a new parameter list; everything else is shared.
    #[must_use]
    pub fn with_parameters(&self, parameters: Vec<Arc<Parameter>>) -> Self {
        Self {
            parameters: self.parameters.with_parameters(parameters),
            ..self.clone()
        }
    }

    /// Flags the node for indentation normalization.
    #[must_use]
    pub fn mark_needs_format(self) -> Self {
        Self {
            needs_format: true,
            ..self
        }
    }

    /// Clears the normalization flag.
    #[must_use]
    pub fn formatted(self) -> Self {
        Self {
            needs_format: false,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(name: &str, leading: &str, sep: &str) -> Arc<Parameter> {
        Arc::new(Parameter::new(
            name,
            Trivia::parse(leading),
            format!("{name}: i32"),
            sep,
            TextSpan::default(),
        ))
    }

    #[test]
    fn test_advance_counts_lines_and_chars() {
        let pos = TextPos::new(1, 4, 4).advance("ab\ncdé");
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 3);
        assert_eq!(pos.offset, 4 + 7);
    }

    #[test]
    fn test_trivia_parse_pieces() {
        let trivia = Trivia::parse("  /* a */\n    // b\n\t");
        assert_eq!(
            trivia.pieces(),
            &[
                TriviaPiece::Whitespace("  ".to_string()),
                TriviaPiece::BlockComment("/* a */".to_string()),
                TriviaPiece::Newline,
                TriviaPiece::Whitespace("    ".to_string()),
                TriviaPiece::LineComment("// b".to_string()),
                TriviaPiece::Newline,
                TriviaPiece::Whitespace("\t".to_string()),
            ]
        );
        assert_eq!(trivia.to_string(), "  /* a */\n    // b\n\t");
    }

    #[test]
    fn test_trivia_nested_block_comment() {
        let trivia = Trivia::parse("/* a /* b */ c */ ");
        assert_eq!(trivia.pieces().len(), 2);
        assert_eq!(trivia.pieces()[0].as_str(), "/* a /* b */ c */");
    }

    #[test]
    fn test_broken_before_drops_whitespace_keeps_comments() {
        assert_eq!(
            Trivia::parse("   ").broken_before(LineEnding::Lf).to_string(),
            "\n"
        );
        assert_eq!(
            Trivia::parse(" /* x */ ")
                .broken_before(LineEnding::Lf)
                .to_string(),
            "\n/* x */ "
        );
    }

    #[test]
    fn test_crlf_line_breaks() {
        assert_eq!(LineEnding::detect("a\r\nb\n"), LineEnding::CrLf);
        assert_eq!(LineEnding::detect("a\nb\r\n"), LineEnding::Lf);
        assert_eq!(LineEnding::detect("a"), LineEnding::Lf);

        let trivia = Trivia::parse(" \r\n  // c\r\n\t");
        assert_eq!(
            trivia.pieces(),
            &[
                TriviaPiece::Whitespace(" ".to_string()),
                TriviaPiece::CrLf,
                TriviaPiece::Whitespace("  ".to_string()),
                TriviaPiece::LineComment("// c".to_string()),
                TriviaPiece::CrLf,
                TriviaPiece::Whitespace("\t".to_string()),
            ]
        );

        let broken = Trivia::parse("  ").broken_before(LineEnding::CrLf);
        assert_eq!(broken.to_string(), "\r\n");
        assert_eq!(broken.indented("    ").to_string(), "\r\n    ");
    }

    #[test]
    fn test_indented_only_bare_line_breaks() {
        assert_eq!(
            Trivia::line_break(LineEnding::Lf)
                .indented("    ")
                .to_string(),
            "\n    "
        );
        let already = Trivia::parse("\n  ");
        assert_eq!(already.indented("    ").to_string(), "\n  ");
        let inline = Trivia::parse(" ");
        assert_eq!(inline.indented("    ").to_string(), " ");
    }

    #[test]
    fn test_relayout_recomputes_spans() {
        let list = ParameterList::new(
            10..30,
            TextPos::new(1, 10, 10),
            vec![param("a", "", ","), param("b", " ", ",")],
            Trivia::default(),
        );
        let moved = list.parameters()[1].with_leading(Trivia::line_break(LineEnding::Lf));
        let relaid = list.with_parameters(vec![
            Arc::clone(&list.parameters()[0]),
            Arc::new(moved),
        ]);

        assert_eq!(relaid.parameters()[0].end_line(), 1);
        assert_eq!(relaid.parameters()[1].span().start, TextPos::new(2, 0, 18));
        assert_eq!(relaid.parameters()[1].end_line(), 2);
        assert_eq!(relaid.render(), "a: i32,\nb: i32,");
        assert_eq!(relaid.source_range(), 10..30);
    }

    #[test]
    fn test_relayout_shares_unchanged_parameters() {
        let list = ParameterList::new(0..0, TextPos::new(1, 0, 0), Vec::new(), Trivia::default());
        let first = list.with_parameters(vec![param("a", "", "")]);
        let second = first.with_parameters(first.parameters().to_vec());
        assert!(Arc::ptr_eq(&first.parameters()[0], &second.parameters()[0]));
    }
}
