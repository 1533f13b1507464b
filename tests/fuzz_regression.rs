//! Regression tests for inputs that broke the fuzz harnesses.
//!
//! Each input is replayed through the same shared helper its harness uses:
//!
//! | Harness     | Input type                | Helper                 |
//! |-------------|---------------------------|------------------------|
//! | `transform` | `(String, bool)`          | [`test_transform`]     |
//! | `script`    | `FuzzScript`              | [`test_script`]        |
//! | `split`     | `(String, SplitParams)`   | [`test_split`]         |

use arbitrary::{Arbitrary, Unstructured};
use makedynsql::SplitParams;
use makedynsql::testing::{FuzzScript, test_script, test_split, test_transform};

const DATA_TYPE: &str = "nvarchar(max)";

/// A `declare` keyword at the very end of the input has no block after it.
#[test]
fn fuzz_regression_bare_declare() {
    test_transform("declare", DATA_TYPE);
    test_transform("select 1 declare   ", DATA_TYPE);
}

/// An `N` prefix right before end of input must not be read as a literal.
#[test]
fn fuzz_regression_trailing_national_prefix() {
    test_transform("declare @x = N", DATA_TYPE);
    test_transform("declare @x = N'", DATA_TYPE);
}

/// Unclosed argument lists and block comments run to end of input.
#[test]
fn fuzz_regression_unclosed_groups() {
    test_transform("declare @x nvarchar((10 = 'a'", DATA_TYPE);
    test_transform("declare @x /* nvarchar(10) = 'a'", DATA_TYPE);
    test_transform("declare @x nvarchar(10) = 'a' /*", DATA_TYPE);
}

/// Multi-byte characters around keywords and variables.
#[test]
fn fuzz_regression_multibyte_text() {
    test_transform("déclare @é = 'ü'\ngo\nselect 'ü'", DATA_TYPE);
    test_transform("declare @x nvarchar(5) = '日本'\ngo\nselect '日本'", DATA_TYPE);
}

/// Empty literals are never substituted into the body.
#[test]
fn fuzz_regression_empty_literal() {
    test_transform("declare @x nvarchar(5) = ''\ngo\nselect 1", DATA_TYPE);
}

/// Generated scripts with quote-only and assignment-only values.
#[test]
fn fuzz_regression_quote_and_equals_values() {
    for bytes in [
        &[1u8, 0, 1, b'\'', 0][..],
        &[1, 3, 2, b'=', b'=', 1],
        &[2, 0, 1, b'\'', 1, 4, b'=', b'\'', b'x', b'\'', 0],
    ] {
        let mut unstructured = Unstructured::new(bytes);
        if let Ok(script) = FuzzScript::arbitrary(&mut unstructured) {
            test_script(&script, DATA_TYPE);
        }
    }
}

/// Masked blanks inside parentheses must not match a delimiter containing a space.
#[test]
fn fuzz_regression_masked_blank_delimiter() {
    let params = SplitParams {
        delimiter: "a b".into(),
        ..SplitParams::default()
    };
    test_split("x(é) a b c", &params);
    test_split("(ab)a b", &params);
}

/// Multi-byte characters next to a case-insensitive delimiter.
#[test]
fn fuzz_regression_multibyte_split() {
    test_split("ä, ö, ü", &SplitParams::comma());
    test_split("ä AND ö", &SplitParams::and());
    test_split("\u{3000}x, y", &SplitParams::comma());
}

/// Delimiter at the very end of the line.
#[test]
fn fuzz_regression_trailing_delimiter() {
    test_split("a, b,", &SplitParams::comma());
    test_split("a,,", &SplitParams::comma());
}
