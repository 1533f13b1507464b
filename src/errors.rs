//! Submodule defining the errors used across the crate.

use alloc::string::String;

use crate::scanner::ScanError;

/// Errors reported by the transformers and the command layer.
///
/// Every variant is non-fatal: the invocation that produced it is aborted
/// and the buffer is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The host has no editor to operate on.
    #[error("No active editor found.")]
    NoActiveEditor,
    /// The editor selection is empty.
    #[error("No text selected.")]
    NoSelection,
    /// The selected text has no `declare` block.
    #[error("No declare block found.")]
    NoDeclareBlockFound,
    /// The current line has no delimiter that qualifies as a separator.
    #[error("Delimiter criteria not met.")]
    DelimiterCriteriaNotMet,
    /// The requested command name is not registered.
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
    /// The declare block could not be tokenized.
    #[error("Scanner error: {0}")]
    Scan(#[from] ScanError),
}

/// How an [`Error`] should be surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Shown as an informational message.
    Info,
    /// Shown as an error message.
    Error,
}

impl Error {
    /// Returns the notification severity for this error.
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::NoActiveEditor | Self::NoSelection | Self::DelimiterCriteriaNotMet => {
                Severity::Info
            }
            Self::NoDeclareBlockFound | Self::UnknownCommand(_) | Self::Scan(_) => Severity::Error,
        }
    }
}
