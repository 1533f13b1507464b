//! Declare-block rewriter.
//!
//! Takes a script of the shape
//!
//! ```sql
//! declare @table nvarchar(128) = 'dbo.Customers'
//! go
//! select * from dbo.Customers
//! ```
//!
//! and turns the body into a dynamic SQL statement that splices the
//! variables back in by concatenation:
//!
//! ```sql
//! declare @table nvarchar(max) = 'dbo.Customers'
//!
//! declare @dynsql nvarchar(max) = N'
//! go
//! select * from ' + @table + N''
//! exec(@dynsql)
//! ```

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::ops::Range;

use crate::errors::Error;
use crate::quotes::{double_quotes, normalize_quotes, unwrap_doubled};
use crate::scanner::{Scanner, TokenKind};

/// Data type used for rebuilt declarations when none is configured.
pub const DEFAULT_DATA_TYPE: &str = "nvarchar(max)";

/// Name of the variable holding the generated statement.
pub const DYNSQL_VARIABLE: &str = "@dynsql";

/// The `declare` block located in a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclareBlock<'a> {
    source: &'a str,
    span: Range<usize>,
    content: Range<usize>,
    terminator: Option<Range<usize>>,
}

impl<'a> DeclareBlock<'a> {
    /// Byte range from the `declare` keyword to the last token before the terminator.
    #[must_use]
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// The block as written, starting with the `declare` keyword.
    #[must_use]
    pub fn raw(&self) -> &'a str {
        &self.source[self.span.clone()]
    }

    /// The declarations following the `declare` keyword, trimmed.
    #[must_use]
    pub fn content(&self) -> &'a str {
        &self.source[self.content.clone()]
    }

    /// Byte range of the `go` keyword closing the block, if any.
    #[must_use]
    pub fn terminator(&self) -> Option<Range<usize>> {
        self.terminator.clone()
    }

    /// Byte range removed from the script when the block is lifted out:
    /// the block and the whitespace after it. A closing `go` stays in the
    /// script.
    fn removal(&self) -> Range<usize> {
        let rest = &self.source[self.span.end..];
        let trailing = rest.len() - rest.trim_start().len();
        self.span.start..self.span.end + trailing
    }
}

/// Locate the first `declare` block in `source`.
///
/// The block runs from the `declare` keyword up to the next standalone `go`
/// keyword, or to the end of input when there is none. Keywords inside
/// string literals and comments are ignored.
///
/// # Errors
///
/// Returns [`Error::NoDeclareBlockFound`] if there is no `declare` keyword
/// or nothing follows it, and [`Error::Scan`] if a string literal before
/// the end of the block is left open.
pub fn locate_declare_block(source: &str) -> Result<DeclareBlock<'_>, Error> {
    let mut scanner = Scanner::new(source);

    let keyword = loop {
        let token = scanner.next()?;
        match token.kind {
            TokenKind::Declare => break token.span,
            TokenKind::Eof => return Err(Error::NoDeclareBlockFound),
            _ => {}
        }
    };

    let mut end = keyword.end;
    let mut content_start = None;
    let terminator = loop {
        let token = scanner.next()?;
        match token.kind {
            TokenKind::Go => break Some(token.span),
            TokenKind::Eof => break None,
            _ => {
                content_start.get_or_insert(token.span.start);
                end = token.span.end;
            }
        }
    };

    let Some(content_start) = content_start else {
        return Err(Error::NoDeclareBlockFound);
    };

    Ok(DeclareBlock {
        source,
        span: keyword.start..end,
        content: content_start..end,
        terminator,
    })
}

/// One `@name <type>(<args>) = '<literal>'` entry of a declare block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDeclaration {
    /// Variable name including the leading `@`.
    pub name: String,
    /// The literal exactly as written between its quotes.
    pub original_rhs: String,
    /// Text before a bare `=` inside the literal, empty when there is none.
    pub lhs: String,
    /// The value part of the literal, with quotes escaped exactly once.
    pub rhs: String,
    /// Whether the value part contains a single quote.
    pub has_quotes: bool,
}

impl VariableDeclaration {
    /// Build a declaration from its name and raw literal text.
    #[must_use]
    pub fn new(name: impl Into<String>, original_rhs: impl Into<String>) -> Self {
        let original_rhs = original_rhs.into();
        let (lhs, rhs) = match find_bare_equals(&original_rhs) {
            Some(pos) => (
                original_rhs[..pos].trim().into(),
                original_rhs[pos + 1..].trim(),
            ),
            None => (String::new(), original_rhs.as_str()),
        };
        let has_quotes = rhs.contains('\'');
        let rhs = normalize_quotes(rhs);
        Self {
            name: name.into(),
            lhs,
            rhs,
            has_quotes,
            original_rhs,
        }
    }

    /// Quotes placed around the variable when it is spliced into the body.
    #[must_use]
    pub fn quote_wrap(&self) -> &'static str {
        if self.has_quotes { "''" } else { "" }
    }

    /// The concatenation expression that replaces the literal in the body.
    ///
    /// The body is already inside the `N'…'` dynamic SQL literal, so the
    /// expression closes it, appends the variable and opens a new one.
    #[must_use]
    pub fn usage_replacement(&self) -> String {
        let wrap = self.quote_wrap();
        if self.lhs.is_empty() {
            format!("{wrap}' + {} + N'{wrap}", self.name)
        } else {
            format!("{} = {wrap}' + {} + N'{wrap}", self.lhs, self.name)
        }
    }

    /// The literal assigned to the variable in the rebuilt declare block.
    #[must_use]
    pub fn declaration_literal(&self) -> String {
        if self.has_quotes {
            if let Some(literal) = unwrap_doubled(&self.rhs) {
                return literal;
            }
        }
        format!("'{}'", self.rhs)
    }

    /// The `@name <type> = '<value>'` entry of the rebuilt declare block.
    #[must_use]
    pub fn declaration(&self, data_type: &str) -> String {
        format!("{} {data_type} = {}", self.name, self.declaration_literal())
    }
}

/// Byte offset of the first `=` that is not part of `<=`, `>=`, `!=` or `==`.
fn find_bare_equals(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    (0..bytes.len()).find(|&i| {
        bytes[i] == b'='
            && !matches!(i.checked_sub(1).map(|p| bytes[p]), Some(b'<' | b'>' | b'!' | b'='))
            && bytes.get(i + 1) != Some(&b'=')
    })
}

/// Parse the variable declarations of a declare block, in declaration order.
///
/// An entry is `@name`, an optional type word, an optional parenthesized
/// argument list, `=` and a string literal. Variables that do not follow
/// this shape, such as `@count int = 5`, are skipped.
///
/// # Errors
///
/// Returns [`Error::Scan`] if a string literal in the block is left open.
pub fn parse_variables(block: &DeclareBlock<'_>) -> Result<Vec<VariableDeclaration>, Error> {
    let mut scanner = Scanner::new(block.content());
    let mut variables = Vec::new();

    loop {
        let token = scanner.next()?;
        let name = match token.kind {
            TokenKind::Variable(name) => name,
            TokenKind::Eof => return Ok(variables),
            _ => continue,
        };

        if matches!(scanner.peek()?.kind, TokenKind::Word(_)) {
            scanner.next()?;
        }
        if scanner.peek()?.kind == TokenKind::LParen && !skip_group(&mut scanner)? {
            return Ok(variables);
        }
        if scanner.peek()?.kind != TokenKind::Equals {
            continue;
        }
        scanner.next()?;
        if let TokenKind::StringLiteral { raw, .. } = &scanner.peek()?.kind {
            variables.push(VariableDeclaration::new(name, raw.as_str()));
            scanner.next()?;
        }
    }
}

/// Consume a balanced parenthesized group. Returns `false` if input ends first.
fn skip_group(scanner: &mut Scanner<'_>) -> Result<bool, Error> {
    let mut depth = 0usize;
    loop {
        match scanner.next()?.kind {
            TokenKind::LParen => depth += 1,
            TokenKind::RParen => {
                depth -= 1;
                if depth == 0 {
                    return Ok(true);
                }
            }
            TokenKind::Eof => return Ok(false),
            _ => {}
        }
    }
}

/// A piece of the script body during substitution.
enum Segment {
    /// Script text still open to substitution.
    Text(String),
    /// Output of an earlier substitution, never matched again.
    Substituted(String),
}

/// Replace every occurrence of `needle` in the untouched segments.
fn substitute(segments: Vec<Segment>, needle: &str, replacement: &str) -> Vec<Segment> {
    let mut out = Vec::with_capacity(segments.len());
    for segment in segments {
        match segment {
            Segment::Text(text) if text.contains(needle) => {
                for (i, piece) in text.split(needle).enumerate() {
                    if i > 0 {
                        out.push(Segment::Substituted(replacement.into()));
                    }
                    if !piece.is_empty() {
                        out.push(Segment::Text(piece.into()));
                    }
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Rewrite a script so its body runs as dynamic SQL built from the
/// variables of its `declare` block.
///
/// # Arguments
///
/// * `source` - The selected script text.
/// * `data_type` - Data type given to every rebuilt declaration and to `@dynsql`.
///
/// # Errors
///
/// Returns [`Error::NoDeclareBlockFound`] if the script has no declare
/// block, or [`Error::Scan`] if the block holds an unterminated literal.
pub fn transform(source: &str, data_type: &str) -> Result<String, Error> {
    let block = locate_declare_block(source)?;
    let variables = parse_variables(&block)?;

    let removal = block.removal();
    let mut body = String::with_capacity(source.len());
    body.push_str(&source[..removal.start]);
    body.push_str(&source[removal.end..]);

    let mut segments = alloc::vec![Segment::Text(double_quotes(&body))];
    for variable in &variables {
        if variable.original_rhs.is_empty() {
            continue;
        }
        segments = substitute(segments, &variable.original_rhs, &variable.usage_replacement());
    }
    let body: String = segments
        .into_iter()
        .map(|segment| match segment {
            Segment::Text(text) | Segment::Substituted(text) => text,
        })
        .collect();

    let mut output = String::new();
    if !variables.is_empty() {
        let declarations: Vec<String> = variables
            .iter()
            .map(|variable| variable.declaration(data_type))
            .collect();
        output.push_str("declare ");
        output.push_str(&declarations.join(",\n        "));
        output.push_str("\n\n");
    }
    output.push_str(&format!(
        "declare {DYNSQL_VARIABLE} {data_type} = N'\n{body}'\nexec({DYNSQL_VARIABLE})"
    ));
    output.truncate(output.trim_end().len());
    Ok(output)
}

/// Configured form of [`transform`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformer {
    data_type: String,
}

impl Default for Transformer {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_TYPE)
    }
}

impl Transformer {
    /// Create a transformer emitting `data_type` declarations.
    #[must_use]
    pub fn new(data_type: impl Into<String>) -> Self {
        Self {
            data_type: data_type.into(),
        }
    }

    /// The data type used for rebuilt declarations.
    #[must_use]
    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    /// Run [`transform`] with this transformer's data type.
    ///
    /// # Errors
    ///
    /// See [`transform`].
    pub fn transform(&self, source: &str) -> Result<String, Error> {
        transform(source, &self.data_type)
    }
}
