//! Contracts for the editor environment the commands run in, with
//! in-memory implementations.
//!
//! The transformers themselves are pure functions; everything that talks
//! to an editor, a settings store or the user goes through the traits
//! defined here, so the command layer can run against [`TextBuffer`],
//! [`Settings`] and [`Notifications`] in tests and in the command line
//! front end alike.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::ops::Range;

use indexmap::IndexMap as IndexMapRaw;

/// `IndexMap` alias using hashbrown's default hasher for `no_std` compatibility.
type IndexMap<K, V> = IndexMapRaw<K, V, hashbrown::DefaultHashBuilder>;

/// A zero-based line and byte column in a buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    /// Zero-based line index.
    pub line: usize,
    /// Byte offset within the line.
    pub column: usize,
}

impl Position {
    /// Create a position.
    #[must_use]
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// The text editing surface a command operates on.
pub trait Editor {
    /// The selected text, empty when nothing is selected.
    fn selected_text(&self) -> &str;

    /// Replace the selected text.
    fn replace_selection(&mut self, text: &str);

    /// The cursor position.
    fn cursor(&self) -> Position;

    /// The text of line `line`, without its line break.
    fn line(&self, line: usize) -> Option<&str>;

    /// Replace the text of line `line`. `text` may contain `\n` line
    /// breaks, which take the line ending already used by the buffer.
    fn replace_line(&mut self, line: usize, text: &str);

    /// Move the cursor.
    fn set_cursor(&mut self, position: Position);
}

/// Read-only access to string settings.
pub trait ConfigStore {
    /// The value stored under `key`, or `default` when there is none.
    fn get_string(&self, key: &str, default: &str) -> String;

    /// The boolean stored under `key`, or `default` when there is none or
    /// it is not `true`/`false`.
    fn get_bool(&self, key: &str, default: bool) -> bool {
        let value = self.get_string(key, "");
        match value.trim() {
            v if v.eq_ignore_ascii_case("true") => true,
            v if v.eq_ignore_ascii_case("false") => false,
            _ => default,
        }
    }
}

/// Fire-and-forget user messages.
pub trait Notifier {
    /// Show an informational message.
    fn info(&mut self, message: &str);

    /// Show an error message.
    fn error(&mut self, message: &str);
}

/// An in-memory editor buffer with a selection and a cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
    selection: Range<usize>,
    cursor: Position,
}

impl TextBuffer {
    /// Create a buffer with an empty selection and the cursor at the start.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            selection: 0..0,
            cursor: Position::default(),
        }
    }

    /// Select the byte range `selection`, clamped to the buffer.
    #[must_use]
    pub fn with_selection(mut self, selection: Range<usize>) -> Self {
        let end = selection.end.min(self.text.len());
        let start = selection.start.min(end);
        self.selection = start..end;
        self
    }

    /// Select the whole buffer.
    #[must_use]
    pub fn select_all(self) -> Self {
        let len = self.text.len();
        self.with_selection(0..len)
    }

    /// Place the cursor.
    #[must_use]
    pub fn with_cursor(mut self, position: Position) -> Self {
        self.cursor = position;
        self
    }

    /// The whole buffer text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The selected byte range.
    #[must_use]
    pub fn selection(&self) -> Range<usize> {
        self.selection.clone()
    }

    /// Consume the buffer, returning its text.
    #[must_use]
    pub fn into_text(self) -> String {
        self.text
    }

    /// Byte range of line `line`, excluding its line break.
    fn line_range(&self, line: usize) -> Option<Range<usize>> {
        let mut start = 0;
        for (index, text) in self.text.split('\n').enumerate() {
            if index == line {
                return Some(start..start + text.trim_end_matches('\r').len());
            }
            start += text.len() + 1;
        }
        None
    }
}

impl Editor for TextBuffer {
    fn selected_text(&self) -> &str {
        self.text.get(self.selection.clone()).unwrap_or_default()
    }

    fn replace_selection(&mut self, text: &str) {
        let range = self.selection.clone();
        if self.text.get(range.clone()).is_none() {
            return;
        }
        self.text.replace_range(range.clone(), text);
        self.selection = range.start..range.start + text.len();
    }

    fn cursor(&self) -> Position {
        self.cursor
    }

    fn line(&self, line: usize) -> Option<&str> {
        self.line_range(line).map(|range| &self.text[range])
    }

    fn replace_line(&mut self, line: usize, text: &str) {
        if let Some(range) = self.line_range(line) {
            let crlf = match self.text.get(range.end..) {
                Some(rest) if !rest.is_empty() => rest.starts_with("\r\n"),
                _ => self.text.contains("\r\n"),
            };
            if crlf {
                let text = text.replace("\r\n", "\n").replace('\n', "\r\n");
                self.text.replace_range(range, &text);
            } else {
                self.text.replace_range(range, text);
            }
            self.selection = 0..0;
        }
    }

    fn set_cursor(&mut self, position: Position) {
        self.cursor = position;
    }
}

/// Ordered in-memory settings.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    values: IndexMap<String, String>,
}

impl Settings {
    /// Create an empty settings store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) -> Option<String> {
        self.values.insert(key.into(), value.to_string())
    }

    /// Builder form of [`Settings::set`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    /// Number of stored settings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no settings are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Settings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut settings = Self::new();
        for (key, value) in iter {
            settings.set(key, value);
        }
        settings
    }
}

impl ConfigStore for Settings {
    fn get_string(&self, key: &str, default: &str) -> String {
        self.values
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.into())
    }
}

/// A message posted through [`Notifications`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// An informational message.
    Info(String),
    /// An error message.
    Error(String),
}

/// A [`Notifier`] that records every message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notifications {
    messages: Vec<Notification>,
}

impl Notifications {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded messages, oldest first.
    #[must_use]
    pub fn messages(&self) -> &[Notification] {
        &self.messages
    }
}

impl Notifier for Notifications {
    fn info(&mut self, message: &str) {
        self.messages.push(Notification::Info(message.into()));
    }

    fn error(&mut self, message: &str) {
        self.messages.push(Notification::Error(message.into()));
    }
}
