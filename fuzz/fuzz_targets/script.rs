//! Script fuzzer: rewrite generated scripts with a well-formed declare block.
//!
//! Unlike the raw-text fuzzer, every input here reaches the substitution
//! stage, since the declarations always parse.

use honggfuzz::fuzz;
use makedynsql::testing::{FuzzScript, test_script};

fn main() {
    loop {
        fuzz!(|script: FuzzScript| {
            test_script(&script, "nvarchar(max)");
        });
    }
}
