//! Transform fuzzer: feed arbitrary text to the declare-block rewriter.
//!
//! This fuzzer tests:
//! 1. The rewriter never panics, whatever the input
//! 2. Every successful rewrite ends with `exec(@dynsql)`
//! 3. Each string variable of the block gets exactly one rebuilt declaration

use honggfuzz::fuzz;
use makedynsql::testing::test_transform;

fn main() {
    loop {
        fuzz!(|input: (String, bool)| {
            let (source, wide) = input;
            let data_type = if wide { "nvarchar(max)" } else { "varchar(8000)" };
            test_transform(&source, data_type);
        });
    }
}
