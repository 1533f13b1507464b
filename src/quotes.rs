//! Single-quote escaping helpers for T-SQL string literals.

use alloc::string::String;

/// Double every single quote, escaping `s` for use inside a string literal.
#[must_use]
pub fn double_quotes(s: &str) -> String {
    s.replace('\'', "''")
}

/// Collapse every doubled single quote back to one quote.
#[must_use]
pub fn collapse_quotes(s: &str) -> String {
    s.replace("''", "'")
}

/// Escape `s` exactly once, whether or not it was already escaped.
///
/// Doubled pairs are collapsed before every quote is doubled again, so
/// `normalize_quotes(normalize_quotes(s)) == normalize_quotes(s)`.
#[must_use]
pub fn normalize_quotes(s: &str) -> String {
    double_quotes(&collapse_quotes(s))
}

/// Replace an outer `''…''` wrapper with a single pair of quotes.
///
/// Returns `None` when `s` is not wrapped in doubled quotes.
#[must_use]
pub fn unwrap_doubled(s: &str) -> Option<String> {
    let inner = s.strip_prefix("''")?.strip_suffix("''")?;
    let mut literal = String::with_capacity(inner.len() + 2);
    literal.push('\'');
    literal.push_str(inner);
    literal.push('\'');
    Some(literal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_then_collapse_is_identity() {
        for s in ["", "plain", "it's", "'wrapped'", "a'b'c"] {
            assert_eq!(collapse_quotes(&double_quotes(s)), s);
        }
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for s in ["it's", "it''s", "''abc''", "'abc'", "x'''y"] {
            let once = normalize_quotes(s);
            assert_eq!(normalize_quotes(&once), once);
        }
        assert_eq!(normalize_quotes("it's"), "it''s");
        assert_eq!(normalize_quotes("it''s"), "it''s");
    }

    #[test]
    fn test_unwrap_doubled() {
        assert_eq!(unwrap_doubled("''abc''").as_deref(), Some("'abc'"));
        assert_eq!(unwrap_doubled("''O''Brien''").as_deref(), Some("'O''Brien'"));
        assert_eq!(unwrap_doubled("abc"), None);
        // Too short to hold both halves of the wrapper.
        assert_eq!(unwrap_doubled("'''"), None);
    }
}
