//! Split fuzzer: split arbitrary lines with arbitrary parameters.
//!
//! This fuzzer tests:
//! 1. Splitting never panics, including on multi-byte text
//! 2. A split never loses or invents non-whitespace characters
//! 3. The cursor column always sits at the end of the first line

use honggfuzz::fuzz;
use makedynsql::SplitParams;
use makedynsql::testing::test_split;

fn main() {
    loop {
        fuzz!(|input: (String, SplitParams)| {
            let (line, params) = input;
            test_split(&line, &params);
        });
    }
}
