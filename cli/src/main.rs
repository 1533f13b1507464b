//! Command line front end for `makedynsql`.
//!
//! Reads a script from a file or standard input, runs one command against it
//! and writes the result to standard output (or back to the file with
//! `--in-place`). Exits with 1 when the command declined to change anything
//! and with 2 on errors.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::builder::RangedU64ValueParser;
use clap::{Args, Parser, Subcommand};
use makedynsql::commands::{COMMAND_PREFIX, DATA_TYPE_KEY};
use makedynsql::{
    Command, Editor, Notifier, Position, Session, Settings, Severity, SplitParams, TextBuffer,
};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "makedynsql",
    version,
    about = "Rewrite T-SQL declare blocks into dynamic SQL and split joined lines"
)]
struct Cli {
    #[command(subcommand)]
    action: Action,

    /// Settings file (a JSON object). Defaults to makedynsql/settings.json
    /// in the user configuration directory
    #[arg(long, global = true)]
    settings: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Action {
    /// Rewrite the declare block of the script into dynamic SQL
    MakeDynamic {
        #[command(flatten)]
        io: IoArgs,

        /// Data type of the rebuilt declarations
        #[arg(long)]
        data_type: Option<String>,
    },
    /// Split a line at its last delimiter, using the given or configured parameters
    Unjoin {
        #[command(flatten)]
        target: LineArgs,

        #[command(flatten)]
        split: SplitArgs,
    },
    /// Split a line at its last comma
    UnjoinComma {
        #[command(flatten)]
        target: LineArgs,
    },
    /// Split a line at its last padded `and`
    UnjoinAnd {
        #[command(flatten)]
        target: LineArgs,
    },
    /// Split a line at its last padded `or`
    UnjoinOr {
        #[command(flatten)]
        target: LineArgs,
    },
}

#[derive(Args)]
struct IoArgs {
    /// Script to read; standard input when omitted
    input: Option<PathBuf>,

    /// Write the result back to the input file
    #[arg(long, requires = "input")]
    in_place: bool,
}

#[derive(Args)]
struct LineArgs {
    #[command(flatten)]
    io: IoArgs,

    /// Line to split, counting from 1
    #[arg(long, default_value_t = 1, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    line: usize,
}

#[derive(Args)]
struct SplitArgs {
    /// Split parameters as a JSON object, e.g. '{"delimiter": "and", "padding": true}'
    #[arg(long, conflicts_with_all = [
        "delimiter",
        "delimiter_newline",
        "padding",
        "count_parentheses",
        "no_reapply_padding",
        "case_sensitive",
    ])]
    params: Option<String>,

    /// Delimiter to split at
    #[arg(long)]
    delimiter: Option<String>,

    /// Keep the delimiter at the end of the first line
    #[arg(long)]
    delimiter_newline: bool,

    /// Only split at delimiters surrounded by whitespace
    #[arg(long)]
    padding: bool,

    /// Also split at delimiters inside parentheses
    #[arg(long)]
    count_parentheses: bool,

    /// Do not put a space back next to the delimiter
    #[arg(long)]
    no_reapply_padding: bool,

    /// Match the delimiter case-sensitively
    #[arg(long)]
    case_sensitive: bool,
}

impl SplitArgs {
    /// Explicit parameters, or `None` to read them from the settings.
    fn into_params(self) -> Result<Option<SplitParams>, String> {
        if let Some(json) = self.params {
            return serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| format!("Invalid --params: {e}"));
        }
        let flagged = self.delimiter_newline
            || self.padding
            || self.count_parentheses
            || self.no_reapply_padding
            || self.case_sensitive;
        if self.delimiter.is_none() && !flagged {
            return Ok(None);
        }
        let defaults = SplitParams::default();
        Ok(Some(SplitParams {
            delimiter: self.delimiter.unwrap_or(defaults.delimiter),
            delimiter_newline: self.delimiter_newline,
            padding: self.padding,
            ignore_parentheses: !self.count_parentheses,
            reapply_padding: !self.no_reapply_padding,
            case_sensitive: self.case_sensitive,
        }))
    }
}

/// Posts notifications to standard error.
struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn info(&mut self, message: &str) {
        eprintln!("{message}");
    }

    fn error(&mut self, message: &str) {
        eprintln!("error: {message}");
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(code) = run(cli) {
        process::exit(code);
    }
}

fn run(cli: Cli) -> Result<(), i32> {
    let mut settings = load_settings(cli.settings.as_deref()).map_err(|e| fail(&e))?;

    let (io_args, command, line) = match cli.action {
        Action::MakeDynamic { io, data_type } => {
            if let Some(data_type) = data_type {
                settings.set(DATA_TYPE_KEY, data_type);
            }
            (io, Command::MakeDynamic, None)
        }
        Action::Unjoin { target, split } => {
            let params = split.into_params().map_err(|e| fail(&e))?;
            (target.io, Command::UnJoinLines(params), Some(target.line))
        }
        Action::UnjoinComma { target } => (target.io, Command::UnJoinLinesComma, Some(target.line)),
        Action::UnjoinAnd { target } => (target.io, Command::UnJoinLinesAnd, Some(target.line)),
        Action::UnjoinOr { target } => (target.io, Command::UnJoinLinesOr, Some(target.line)),
    };

    let text = read_input(io_args.input.as_deref())
        .map_err(|e| fail(&format!("Error reading input: {e}")))?;
    let mut buffer = match line {
        Some(line) => TextBuffer::new(text).with_cursor(Position::new(line - 1, 0)),
        None => TextBuffer::new(text).select_all(),
    };

    let mut notifier = StderrNotifier;
    let editor: &mut dyn Editor = &mut buffer;
    if let Err(error) = Session::new(Some(editor), &settings, &mut notifier).execute(&command) {
        return Err(match error.severity() {
            Severity::Info => 1,
            Severity::Error => 2,
        });
    }

    let output = buffer.into_text();
    let written = match (io_args.in_place, io_args.input.as_deref()) {
        (true, Some(path)) => fs::write(path, &output),
        _ => write_stdout(&output),
    };
    written.map_err(|e| fail(&format!("Error writing output: {e}")))
}

/// Print `message` and return the exit code for errors.
fn fail(message: &str) -> i32 {
    eprintln!("{message}");
    2
}

fn read_input(path: Option<&Path>) -> io::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn write_stdout(output: &str) -> io::Result<()> {
    let mut out = io::stdout().lock();
    out.write_all(output.as_bytes())?;
    if !output.is_empty() && !output.ends_with('\n') {
        out.write_all(b"\n")?;
    }
    out.flush()
}

fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut path| {
        path.push("makedynsql");
        path.push("settings.json");
        path
    })
}

/// Load settings from `path`, or from the default location when it exists.
fn load_settings(path: Option<&Path>) -> Result<Settings, String> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match default_settings_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(Settings::new()),
        },
    };
    let content = fs::read_to_string(&path)
        .map_err(|e| format!("Error reading {}: {e}", path.display()))?;
    let settings = parse_settings(&content)
        .map_err(|e| format!("Error parsing {}: {e}", path.display()))?;
    if settings.is_empty() {
        tracing::warn!(path = %path.display(), "settings file holds no usable settings");
    } else {
        tracing::debug!(path = %path.display(), count = settings.len(), "loaded settings");
    }
    Ok(settings)
}

/// Flatten a JSON object into settings. Keys may carry the command prefix.
fn parse_settings(content: &str) -> Result<Settings, String> {
    let Value::Object(map) = serde_json::from_str(content).map_err(|e| e.to_string())? else {
        return Err("expected a JSON object".into());
    };
    let settings: Settings = map
        .into_iter()
        .filter_map(|(key, value)| {
            let key = key.strip_prefix(COMMAND_PREFIX).unwrap_or(&key).to_owned();
            let value = match value {
                Value::String(value) => value,
                Value::Bool(value) => value.to_string(),
                Value::Number(value) => value.to_string(),
                _ => {
                    tracing::warn!(key = %key, "ignoring setting that is not a scalar");
                    return None;
                }
            };
            Some((key, value))
        })
        .collect();
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use makedynsql::ConfigStore;

    #[test]
    fn test_parse_settings_strips_prefix() {
        let settings = parse_settings(
            r#"{"makedynsql.defaultDataType": "varchar(100)", "padding": true, "nested": {}}"#,
        )
        .unwrap();
        assert_eq!(settings.len(), 2);
        assert_eq!(settings.get_string(DATA_TYPE_KEY, ""), "varchar(100)");
        assert!(settings.get_bool("padding", false));
    }

    #[test]
    fn test_parse_settings_without_scalars_is_empty() {
        let settings = parse_settings(r#"{"makedynsql.delimiter": null, "list": [1]}"#).unwrap();
        assert!(settings.is_empty());
    }

    #[test]
    fn test_parse_settings_rejects_non_objects() {
        assert!(parse_settings("[1, 2]").is_err());
        assert!(parse_settings("{").is_err());
    }

    #[test]
    fn test_split_args_without_flags_defer_to_settings() {
        let cli = Cli::parse_from(["makedynsql", "unjoin"]);
        let Action::Unjoin { split, .. } = cli.action else {
            panic!("expected unjoin");
        };
        assert_eq!(split.into_params(), Ok(None));
    }

    #[test]
    fn test_split_args_from_flags() {
        let cli = Cli::parse_from([
            "makedynsql",
            "unjoin",
            "--delimiter",
            "|",
            "--delimiter-newline",
            "--line",
            "3",
        ]);
        let Action::Unjoin { target, split } = cli.action else {
            panic!("expected unjoin");
        };
        assert_eq!(target.line, 3);
        let params = split.into_params().unwrap().unwrap();
        assert_eq!(params.delimiter, "|");
        assert!(params.delimiter_newline);
        assert!(params.ignore_parentheses);
    }

    #[test]
    fn test_params_conflict_with_flags() {
        assert!(
            Cli::try_parse_from(["makedynsql", "unjoin", "--params", "{}", "--padding"]).is_err()
        );
    }
}
