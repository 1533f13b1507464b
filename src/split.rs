//! Delimiter line splitter.
//!
//! Splits one line at the last delimiter that actually separates items, to
//! undo a manual line join. Repeating the split on the first half walks
//! backwards through a delimited list one item at a time:
//!
//! ```text
//! select a, b, c      ->  select a, b
//!                         , c
//! ```

use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;
use core::ops::Range;

use crate::errors::Error;
use crate::host::ConfigStore;

/// Parameters of a single split.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
#[cfg_attr(feature = "testing", derive(arbitrary::Arbitrary))]
pub struct SplitParams {
    /// The delimiter text, such as `,` or `and`.
    pub delimiter: String,
    /// Keep the delimiter at the end of the first line instead of moving
    /// it to the start of the second.
    pub delimiter_newline: bool,
    /// Only count delimiters surrounded by whitespace.
    pub padding: bool,
    /// Ignore delimiters inside parentheses.
    pub ignore_parentheses: bool,
    /// Put a space back between the delimiter and the text it is joined to.
    pub reapply_padding: bool,
    /// Match the delimiter case-sensitively.
    pub case_sensitive: bool,
}

impl Default for SplitParams {
    fn default() -> Self {
        Self {
            delimiter: ",".into(),
            delimiter_newline: false,
            padding: false,
            ignore_parentheses: true,
            reapply_padding: true,
            case_sensitive: false,
        }
    }
}

impl SplitParams {
    /// Parameters for comma-separated lists.
    #[must_use]
    pub fn comma() -> Self {
        Self::default()
    }

    /// Parameters for `and`-joined conditions.
    #[must_use]
    pub fn and() -> Self {
        Self::word("and")
    }

    /// Parameters for `or`-joined conditions.
    #[must_use]
    pub fn or() -> Self {
        Self::word("or")
    }

    fn word(delimiter: &str) -> Self {
        Self {
            delimiter: delimiter.into(),
            padding: true,
            reapply_padding: true,
            ..Self::default()
        }
    }

    /// Read parameters from a configuration store, falling back to the
    /// defaults for missing keys.
    #[must_use]
    pub fn from_config(config: &dyn ConfigStore) -> Self {
        let defaults = Self::default();
        Self {
            delimiter: config.get_string("delimiter", &defaults.delimiter),
            delimiter_newline: config.get_bool("delimiterNewline", defaults.delimiter_newline),
            padding: config.get_bool("padding", defaults.padding),
            ignore_parentheses: config.get_bool("ignoreParentheses", defaults.ignore_parentheses),
            reapply_padding: config.get_bool("reapplyPadding", defaults.reapply_padding),
            case_sensitive: config.get_bool("caseSensitive", defaults.case_sensitive),
        }
    }
}

/// The two lines a split produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSplit {
    /// The first line, keeping the original indentation.
    pub before: String,
    /// The second line, without indentation.
    pub after: String,
    /// Leading whitespace of the original line, applied to the second line.
    pub indentation: String,
    /// Cursor column after the split: the end of `before`.
    pub cursor_column: usize,
}

impl LineSplit {
    /// The replacement text for the original line.
    #[must_use]
    pub fn joined(&self) -> String {
        let mut text =
            String::with_capacity(self.before.len() + self.indentation.len() + self.after.len() + 1);
        text.push_str(&self.before);
        text.push('\n');
        text.push_str(&self.indentation);
        text.push_str(&self.after);
        text
    }
}

/// Blank out every parenthesized span of `line`, keeping byte offsets.
///
/// Nested parentheses are masked as part of their outermost span. An
/// unclosed `(` masks the rest of the line.
#[must_use]
pub fn mask_parentheses(line: &str) -> String {
    let mut masked = String::with_capacity(line.len());
    let mut depth = 0usize;
    for c in line.chars() {
        match c {
            '(' => depth += 1,
            ')' if depth > 0 => {
                depth -= 1;
                masked.push(' ');
                continue;
            }
            _ => {}
        }
        if depth > 0 {
            masked.extend(core::iter::repeat_n(' ', c.len_utf8()));
        } else {
            masked.push(c);
        }
    }
    masked
}

/// Finds delimiter occurrences in a line.
#[derive(Debug, Clone, Copy)]
pub struct DelimiterMatcher<'a> {
    delimiter: &'a str,
    padding: bool,
    case_sensitive: bool,
}

impl<'a> DelimiterMatcher<'a> {
    /// Create a matcher for `delimiter`.
    #[must_use]
    pub fn new(delimiter: &'a str, padding: bool, case_sensitive: bool) -> Self {
        Self {
            delimiter,
            padding,
            case_sensitive,
        }
    }

    /// Whether `text` starts with the delimiter.
    #[must_use]
    pub fn is_prefix_of(&self, text: &str) -> bool {
        text.get(..self.delimiter.len())
            .is_some_and(|head| self.same(head.as_bytes()))
    }

    /// Byte ranges of all non-overlapping occurrences, left to right.
    ///
    /// With padding, an occurrence must have whitespace on both sides; the
    /// range covers the delimiter text only. The delimiter is matched as
    /// given, including any whitespace it carries.
    #[must_use]
    pub fn find_all(&self, line: &str) -> Vec<Range<usize>> {
        let bytes = line.as_bytes();
        let len = self.delimiter.len();
        let mut found = Vec::new();
        if len == 0 {
            return found;
        }

        let mut i = 0;
        while i + len <= bytes.len() {
            if self.same(&bytes[i..i + len]) && self.padded(bytes, i, i + len) {
                found.push(i..i + len);
                i += len;
            } else {
                i += 1;
            }
        }
        found
    }

    fn same(&self, candidate: &[u8]) -> bool {
        if self.case_sensitive {
            candidate == self.delimiter.as_bytes()
        } else {
            candidate.eq_ignore_ascii_case(self.delimiter.as_bytes())
        }
    }

    fn padded(&self, bytes: &[u8], start: usize, end: usize) -> bool {
        !self.padding
            || (start > 0
                && bytes[start - 1].is_ascii_whitespace()
                && bytes.get(end).is_some_and(u8::is_ascii_whitespace))
    }
}

/// Split `line` at its last qualifying delimiter.
///
/// # Errors
///
/// Returns [`Error::DelimiterCriteriaNotMet`] when the line has no
/// qualifying delimiter, or its only one is the line's leading token.
pub fn split_line(line: &str, params: &SplitParams) -> Result<LineSplit, Error> {
    let delimiter = params.delimiter.as_str();
    if delimiter.trim().is_empty() {
        return Err(Error::DelimiterCriteriaNotMet);
    }

    let scratch: Cow<'_, str> = if params.ignore_parentheses {
        Cow::Owned(mask_parentheses(line))
    } else {
        Cow::Borrowed(line)
    };
    let matcher = DelimiterMatcher::new(delimiter, params.padding, params.case_sensitive);
    let mut occurrences = matcher.find_all(&scratch);
    // Masked blanks stand in for neither the delimiter nor its padding.
    occurrences.retain(|range| {
        line.get(range.clone())
            .is_some_and(|text| matcher.same(text.as_bytes()))
            && matcher.padded(line.as_bytes(), range.start, range.end)
    });

    let content = line.trim_start();
    let leading = DelimiterMatcher::new(delimiter.trim_start(), false, params.case_sensitive);
    let leading_only = occurrences.len() == 1 && leading.is_prefix_of(content);
    let Some(last) = occurrences.last().filter(|_| !leading_only).cloned() else {
        return Err(Error::DelimiterCriteriaNotMet);
    };

    let indentation = &line[..line.len() - content.len()];
    let found = &line[last.clone()];
    let head = line[..last.start].trim_end();
    let tail = line[last.end..].trim();

    let mut before = String::from(head);
    let mut after = String::new();
    if params.delimiter_newline {
        let found = if head.is_empty() {
            found.trim()
        } else {
            found.trim_end()
        };
        if params.padding
            && params.reapply_padding
            && !head.is_empty()
            && !found.starts_with(char::is_whitespace)
        {
            before.push(' ');
        }
        before.push_str(found);
        after.push_str(tail);
    } else {
        after.push_str(found.trim_start());
        if params.reapply_padding && !tail.is_empty() && !after.ends_with(char::is_whitespace) {
            after.push(' ');
        }
        after.push_str(tail);
    }

    Ok(LineSplit {
        cursor_column: before.len(),
        before,
        after,
        indentation: indentation.into(),
    })
}
