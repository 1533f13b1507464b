//! Tests for rewriting declare blocks into dynamic SQL.
//!
//! This module tests:
//! - Locating the declare block and keeping its `go` terminator in the body
//! - Rebuilding declarations with the configured data type
//! - Substituting literal usages in the body, with and without embedded assignments
//! - Quote escaping of the body and of quoted values
//! - Failure when there is no declare block

use makedynsql::quotes::{collapse_quotes, double_quotes, normalize_quotes};
use makedynsql::{DEFAULT_DATA_TYPE, Error, Transformer, locate_declare_block, parse_variables, transform};

// =============================================================================
// Basic rewriting
// =============================================================================

#[test]
fn test_single_variable() {
    let source = "declare @table nvarchar(128) = 'dbo.Customers'\ngo\nselect * from dbo.Customers\n";
    let output = transform(source, DEFAULT_DATA_TYPE).unwrap();
    assert_eq!(
        output,
        "declare @table nvarchar(max) = 'dbo.Customers'\n\
         \n\
         declare @dynsql nvarchar(max) = N'\n\
         go\n\
         select * from ' + @table + N'\n\
         '\n\
         exec(@dynsql)"
    );
}

#[test]
fn test_multiple_variables_keep_declaration_order() {
    let source = "\
declare @db sysname = 'Sales',
        @schema nvarchar(20) = 'dbo'
go
use Sales
select * from dbo.Orders";
    let output = transform(source, "varchar(8000)").unwrap();
    assert!(output.starts_with(
        "declare @db varchar(8000) = 'Sales',\n        @schema varchar(8000) = 'dbo'\n\n"
    ));
    assert!(output.contains("declare @dynsql varchar(8000) = N'\n"));
    assert!(output.contains("use ' + @db + N'\n"));
    assert!(output.contains("select * from ' + @schema + N'.Orders"));
    assert!(output.ends_with("'\nexec(@dynsql)"));
}

#[test]
fn test_declaration_count_matches_variables() {
    let source = "declare @a varchar(10) = 'one', @b varchar(10) = 'two', @c varchar(10) = 'three'\ngo\nselect 1";
    let output = transform(source, "nvarchar(100)").unwrap();
    let header = output.split("declare @dynsql").next().unwrap();
    assert_eq!(header.matches(" nvarchar(100) = ").count(), 3);
}

#[test]
fn test_transformer_uses_configured_data_type() {
    let output = Transformer::new("nvarchar(4000)")
        .transform("declare @x nvarchar(5) = 'abc'\ngo\nselect abc")
        .unwrap();
    assert!(output.starts_with("declare @x nvarchar(4000) = 'abc'"));
    assert!(output.contains("declare @dynsql nvarchar(4000) = N'"));
}

#[test]
fn test_go_terminator_stays_in_body() {
    let output = transform(
        "declare @t nvarchar(20) = 'dbo.T'\ngo\nselect * from dbo.T",
        DEFAULT_DATA_TYPE,
    )
    .unwrap();
    assert!(output.ends_with("N'\ngo\nselect * from ' + @t + N''\nexec(@dynsql)"));
}

#[test]
fn test_whitespace_before_go_is_removed_with_block() {
    let output = transform(
        "declare @t nvarchar(20) = 'x'  \n\n  go\nselect x",
        DEFAULT_DATA_TYPE,
    )
    .unwrap();
    assert!(output.contains("N'\ngo\nselect ' + @t + N''"));
}

#[test]
fn test_block_without_go_runs_to_end() {
    let output = transform("declare @x nvarchar(5) = 'abc'\n", DEFAULT_DATA_TYPE).unwrap();
    assert_eq!(
        output,
        "declare @x nvarchar(max) = 'abc'\n\ndeclare @dynsql nvarchar(max) = N'\n'\nexec(@dynsql)"
    );
}

#[test]
fn test_text_before_declare_stays_in_body() {
    let output = transform(
        "set nocount on\ndeclare @x nvarchar(5) = 'abc'\ngo\nselect abc",
        DEFAULT_DATA_TYPE,
    )
    .unwrap();
    assert!(output.contains("N'\nset nocount on\ngo\nselect ' + @x + N''\nexec"));
}

// =============================================================================
// Quotes and embedded assignments
// =============================================================================

#[test]
fn test_body_quotes_are_doubled() {
    let output = transform(
        "declare @t nvarchar(20) = 'dbo.T'\ngo\nselect 'it''s' from dbo.T",
        DEFAULT_DATA_TYPE,
    )
    .unwrap();
    assert!(output.contains("select ''it''''s'' from ' + @t + N''"));
}

#[test]
fn test_embedded_assignment_with_quoted_value() {
    let source = "declare @name nvarchar(50) = 'name = ''Smith'''\ngo\nselect * from people where name = 'Smith'";
    let output = transform(source, DEFAULT_DATA_TYPE).unwrap();
    assert!(output.starts_with("declare @name nvarchar(max) = 'Smith'\n"));
    assert!(output.contains("select * from people where name = ''' + @name + N'''"));
}

#[test]
fn test_embedded_assignment_without_quotes() {
    let source = "declare @top nvarchar(10) = 'top = 10'\ngo\nselect * from t where top = 10";
    let output = transform(source, DEFAULT_DATA_TYPE).unwrap();
    assert!(output.starts_with("declare @top nvarchar(max) = '10'\n"));
    assert!(output.contains("where top = ' + @top + N'"));
}

#[test]
fn test_quoted_value_without_assignment() {
    let source = "declare @c nvarchar(10) = '''red'''\ngo\nselect * from cars where color = 'red'";
    let output = transform(source, DEFAULT_DATA_TYPE).unwrap();
    assert!(output.starts_with("declare @c nvarchar(max) = 'red'\n"));
    assert!(output.contains("where color = ''' + @c + N'''"));
}

#[test]
fn test_unused_literal_is_a_no_op() {
    let output = transform(
        "declare @x nvarchar(5) = 'missing'\ngo\nselect 1",
        DEFAULT_DATA_TYPE,
    )
    .unwrap();
    assert!(output.contains("N'\ngo\nselect 1'\nexec(@dynsql)"));
}

#[test]
fn test_substituted_text_is_not_rewritten_by_later_variables() {
    // The second literal appears inside the first variable's replacement.
    let source = "declare @a nvarchar(5) = 'x', @b nvarchar(5) = 'N'\ngo\nselect x";
    let output = transform(source, DEFAULT_DATA_TYPE).unwrap();
    assert!(output.contains("select ' + @a + N''\nexec"));
}

#[test]
fn test_variables_without_string_literal_are_skipped() {
    let block = locate_declare_block("declare @n int = 5, @s nvarchar(5) = 'abc'").unwrap();
    let variables = parse_variables(&block).unwrap();
    assert_eq!(variables.len(), 1);
    assert_eq!(variables[0].name, "@s");
    assert_eq!(variables[0].original_rhs, "abc");
}

#[test]
fn test_national_literals_are_accepted() {
    let block = locate_declare_block("declare @s nvarchar(5) = N'abc'").unwrap();
    let variables = parse_variables(&block).unwrap();
    assert_eq!(variables[0].original_rhs, "abc");
}

// =============================================================================
// Quote helpers
// =============================================================================

#[test]
fn test_quote_round_trip() {
    for s in ["", "O'Brien", "'quoted'", "no quotes"] {
        assert_eq!(collapse_quotes(&double_quotes(s)), s);
    }
}

#[test]
fn test_normalization_is_idempotent() {
    for s in ["O'Brien", "O''Brien", "''x''", "'''"] {
        assert_eq!(normalize_quotes(&normalize_quotes(s)), normalize_quotes(s));
    }
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_no_declare_block() {
    assert_eq!(
        transform("select * from dbo.Customers", DEFAULT_DATA_TYPE),
        Err(Error::NoDeclareBlockFound)
    );
}

#[test]
fn test_declare_inside_literal_or_comment_is_not_a_block() {
    assert_eq!(
        transform("select 'declare' -- declare\n", DEFAULT_DATA_TYPE),
        Err(Error::NoDeclareBlockFound)
    );
}

#[test]
fn test_unterminated_literal_in_block() {
    assert!(matches!(
        transform("declare @x nvarchar(5) = 'abc", DEFAULT_DATA_TYPE),
        Err(Error::Scan(_))
    ));
}
