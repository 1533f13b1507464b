//! Testing utilities shared by the fuzz harnesses and the regression tests.
//!
//! This module is gated behind the `testing` feature.
//!
//! # Provided helpers
//!
//! - [`FuzzScript`]: an `arbitrary`-generated declare block plus a body quoting its values
//! - [`test_transform`]: run the declare rewriter on arbitrary text and check its output shape
//! - [`test_script`]: render a [`FuzzScript`] and check every declaration survives
//! - [`test_split`]: run the line splitter on arbitrary input and check no text is lost

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use arbitrary::Arbitrary;

use crate::declare::{DYNSQL_VARIABLE, transform};
use crate::errors::Error;
use crate::quotes::double_quotes;
use crate::split::{SplitParams, split_line};

/// Type names the fuzzer picks from for generated declarations.
const TYPE_NAMES: [&str; 4] = ["nvarchar(50)", "varchar(max)", "char(10)", "sysname"];

/// One generated `@name <type> = '<value>'` declaration.
#[derive(Debug, Clone, Arbitrary)]
pub struct FuzzDeclaration {
    type_index: u8,
    value: String,
}

impl FuzzDeclaration {
    /// The value with everything but a small safe alphabet removed.
    #[must_use]
    pub fn value(&self) -> String {
        self.value
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '\'' | '=' | '.'))
            .collect()
    }

    fn type_name(&self) -> &'static str {
        TYPE_NAMES[usize::from(self.type_index) % TYPE_NAMES.len()]
    }
}

/// A generated script: a declare block, a `go` line and a body.
#[derive(Debug, Clone, Arbitrary)]
pub struct FuzzScript {
    /// The declarations, named `@v0`, `@v1`, ... in order.
    pub declarations: Vec<FuzzDeclaration>,
    /// Whether the block is closed by `go`.
    pub terminated: bool,
}

impl FuzzScript {
    /// Render the script text.
    #[must_use]
    pub fn render(&self) -> String {
        let entries: Vec<String> = self
            .declarations
            .iter()
            .enumerate()
            .map(|(i, declaration)| {
                format!(
                    "@v{i} {} = '{}'",
                    declaration.type_name(),
                    double_quotes(&declaration.value())
                )
            })
            .collect();

        let mut script = format!("declare {}\n", entries.join(",\n        "));
        if self.terminated {
            script.push_str("go\n");
        }
        for declaration in &self.declarations {
            script.push_str(&format!(
                "select * from t where c = '{}'\n",
                double_quotes(&declaration.value())
            ));
        }
        script
    }
}

/// Run the declare rewriter on `source` and check the shape of its output.
///
/// # Panics
///
/// Panics if the rewriter returns an unexpected error or malformed output.
pub fn test_transform(source: &str, data_type: &str) {
    match transform(source, data_type) {
        Ok(output) => {
            let wrapper = format!("declare {DYNSQL_VARIABLE} {data_type} = N'\n");
            assert!(
                output.contains(&wrapper),
                "missing dynamic SQL wrapper in {output:?}"
            );
            assert!(
                output.ends_with(&format!("'\nexec({DYNSQL_VARIABLE})")),
                "missing exec in {output:?}"
            );
        }
        Err(Error::NoDeclareBlockFound | Error::Scan(_)) => {}
        Err(other) => panic!("unexpected error {other:?} for {source:?}"),
    }
}

/// Render `script`, rewrite it and check every declaration is rebuilt.
///
/// # Panics
///
/// Panics if a declaration is dropped or typed with the wrong data type.
pub fn test_script(script: &FuzzScript, data_type: &str) {
    let source = script.render();
    let result = transform(&source, data_type);
    if script.declarations.is_empty() {
        assert_eq!(result, Err(Error::NoDeclareBlockFound));
        return;
    }

    let output = result.unwrap_or_else(|error| panic!("{error} for {source:?}"));
    let header = output
        .split(&format!("declare {DYNSQL_VARIABLE}"))
        .next()
        .unwrap_or_default();
    for i in 0..script.declarations.len() {
        let entry = format!("@v{i} {data_type} = ");
        assert_eq!(
            header.matches(&entry).count(),
            1,
            "expected one {entry:?} in {header:?}"
        );
    }
}

/// Run the line splitter on `line` and check nothing but whitespace moved.
///
/// # Panics
///
/// Panics if the split loses or reorders text, or misplaces the cursor.
pub fn test_split(line: &str, params: &SplitParams) {
    let Ok(split) = split_line(line, params) else {
        return;
    };

    assert_eq!(split.cursor_column, split.before.len());
    assert!(!split.after.starts_with(char::is_whitespace));
    assert!(line.starts_with(split.indentation.as_str()));

    let visible = |text: &str| -> String { text.chars().filter(|c| !c.is_whitespace()).collect() };
    let mut rejoined = split.before.clone();
    rejoined.push_str(&split.after);
    assert_eq!(
        visible(&rejoined),
        visible(line),
        "split of {line:?} with {params:?} changed its text"
    );
}
