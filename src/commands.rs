//! The named commands exposed to the host, and the session that runs them.

use alloc::string::{String, ToString};

use hashbrown::HashMap;

use crate::declare::{DEFAULT_DATA_TYPE, transform};
use crate::errors::{Error, Severity};
use crate::host::{ConfigStore, Editor, Notifier, Position};
use crate::split::{SplitParams, split_line};

/// Prefix under which the host registers the commands.
pub const COMMAND_PREFIX: &str = "makedynsql.";

/// Settings key holding the data type for rebuilt declarations.
pub const DATA_TYPE_KEY: &str = "defaultDataType";

/// A command together with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Rewrite the selection into dynamic SQL.
    MakeDynamic,
    /// Split the cursor line. Without parameters they are read from the settings.
    UnJoinLines(Option<SplitParams>),
    /// Split the cursor line at its last comma.
    UnJoinLinesComma,
    /// Split the cursor line at its last padded `and`.
    UnJoinLinesAnd,
    /// Split the cursor line at its last padded `or`.
    UnJoinLinesOr,
}

impl Command {
    /// The name the command is registered under, without prefix.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.id().name()
    }

    /// The identifier of this command.
    #[must_use]
    pub fn id(&self) -> CommandId {
        match self {
            Self::MakeDynamic => CommandId::MakeDynamic,
            Self::UnJoinLines(_) => CommandId::UnJoinLines,
            Self::UnJoinLinesComma => CommandId::UnJoinLinesComma,
            Self::UnJoinLinesAnd => CommandId::UnJoinLinesAnd,
            Self::UnJoinLinesOr => CommandId::UnJoinLinesOr,
        }
    }
}

/// Identifies a command independently of its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandId {
    /// See [`Command::MakeDynamic`].
    MakeDynamic,
    /// See [`Command::UnJoinLines`].
    UnJoinLines,
    /// See [`Command::UnJoinLinesComma`].
    UnJoinLinesComma,
    /// See [`Command::UnJoinLinesAnd`].
    UnJoinLinesAnd,
    /// See [`Command::UnJoinLinesOr`].
    UnJoinLinesOr,
}

impl CommandId {
    /// Every command, in registration order.
    pub const ALL: [Self; 5] = [
        Self::MakeDynamic,
        Self::UnJoinLines,
        Self::UnJoinLinesComma,
        Self::UnJoinLinesAnd,
        Self::UnJoinLinesOr,
    ];

    /// The name the command is registered under, without prefix.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::MakeDynamic => "makeDynamic",
            Self::UnJoinLines => "unJoinLines",
            Self::UnJoinLinesComma => "unJoinLinesComma",
            Self::UnJoinLinesAnd => "unJoinLinesAnd",
            Self::UnJoinLinesOr => "unJoinLinesOr",
        }
    }

    /// Attach arguments. Only `unJoinLines` takes any.
    #[must_use]
    pub fn with_params(self, params: Option<SplitParams>) -> Command {
        match self {
            Self::MakeDynamic => Command::MakeDynamic,
            Self::UnJoinLines => Command::UnJoinLines(params),
            Self::UnJoinLinesComma => Command::UnJoinLinesComma,
            Self::UnJoinLinesAnd => Command::UnJoinLinesAnd,
            Self::UnJoinLinesOr => Command::UnJoinLinesOr,
        }
    }
}

/// Lookup table from command names, bare or prefixed, to commands.
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    by_name: HashMap<String, CommandId>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        let mut by_name = HashMap::with_capacity(CommandId::ALL.len() * 2);
        for id in CommandId::ALL {
            by_name.insert(id.name().to_string(), id);
            by_name.insert(alloc::format!("{COMMAND_PREFIX}{}", id.name()), id);
        }
        Self { by_name }
    }
}

impl CommandRegistry {
    /// Create a registry holding every command.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `name` into a command carrying `params`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCommand`] if no command has that name.
    pub fn resolve(&self, name: &str, params: Option<SplitParams>) -> Result<Command, Error> {
        self.by_name
            .get(name)
            .map(|id| id.with_params(params))
            .ok_or_else(|| Error::UnknownCommand(name.into()))
    }
}

/// One invocation context: the active editor, settings and notifications.
pub struct Session<'a> {
    editor: Option<&'a mut dyn Editor>,
    config: &'a dyn ConfigStore,
    notifier: &'a mut dyn Notifier,
}

impl<'a> Session<'a> {
    /// Create a session. `editor` is `None` when no editor is active.
    #[must_use]
    pub fn new(
        editor: Option<&'a mut dyn Editor>,
        config: &'a dyn ConfigStore,
        notifier: &'a mut dyn Notifier,
    ) -> Self {
        Self {
            editor,
            config,
            notifier,
        }
    }

    /// Run `command`.
    ///
    /// Failures are posted to the notifier before being returned, and leave
    /// the buffer untouched.
    ///
    /// # Errors
    ///
    /// Returns the error that aborted the command.
    pub fn execute(&mut self, command: &Command) -> Result<(), Error> {
        tracing::debug!(command = command.name(), "executing command");
        let result = match command {
            Command::MakeDynamic => self.make_dynamic(),
            Command::UnJoinLines(params) => {
                let params = params
                    .clone()
                    .unwrap_or_else(|| SplitParams::from_config(self.config));
                self.unjoin_lines(&params)
            }
            Command::UnJoinLinesComma => self.unjoin_lines(&SplitParams::comma()),
            Command::UnJoinLinesAnd => self.unjoin_lines(&SplitParams::and()),
            Command::UnJoinLinesOr => self.unjoin_lines(&SplitParams::or()),
        };

        if let Err(error) = &result {
            tracing::debug!(command = command.name(), %error, "command aborted");
            let message = error.to_string();
            match error.severity() {
                Severity::Info => self.notifier.info(&message),
                Severity::Error => self.notifier.error(&message),
            }
        }
        result
    }

    fn editor(&mut self) -> Result<&mut dyn Editor, Error> {
        match self.editor.as_deref_mut() {
            Some(editor) => Ok(editor),
            None => Err(Error::NoActiveEditor),
        }
    }

    fn make_dynamic(&mut self) -> Result<(), Error> {
        let data_type = self.config.get_string(DATA_TYPE_KEY, DEFAULT_DATA_TYPE);
        let editor = self.editor()?;
        let selection = editor.selected_text();
        if selection.trim().is_empty() {
            return Err(Error::NoSelection);
        }

        let output = transform(selection, &data_type)?;
        editor.replace_selection(&output);
        tracing::info!(data_type = %data_type, "rewrote selection as dynamic SQL");
        Ok(())
    }

    fn unjoin_lines(&mut self, params: &SplitParams) -> Result<(), Error> {
        let editor = self.editor()?;
        let cursor = editor.cursor();
        let line = editor.line(cursor.line).ok_or(Error::DelimiterCriteriaNotMet)?;

        let split = split_line(line, params)?;
        editor.replace_line(cursor.line, &split.joined());
        editor.set_cursor(Position::new(cursor.line, split.cursor_column));
        tracing::debug!(
            line = cursor.line,
            column = split.cursor_column,
            delimiter = %params.delimiter,
            "split line"
        );
        Ok(())
    }
}
