#![doc = include_str!("../README.md")]
#![no_std]
#![deny(clippy::mod_module_files)]

extern crate alloc;
#[cfg(feature = "testing")]
extern crate std;

pub mod commands;
pub mod declare;
pub mod errors;
pub mod host;
pub mod quotes;
pub mod scanner;
pub mod split;
#[cfg(feature = "testing")]
pub mod testing;

// Re-export main types
pub use commands::{Command, CommandId, CommandRegistry, Session};
pub use declare::{
    DEFAULT_DATA_TYPE, DeclareBlock, Transformer, VariableDeclaration, locate_declare_block,
    parse_variables, transform,
};
pub use host::{
    ConfigStore, Editor, Notification, Notifications, Notifier, Position, Settings, TextBuffer,
};
pub use split::{LineSplit, SplitParams, split_line};

// Re-export errors
pub use errors::{Error, Severity};
