//! `jslt`: run or check JSLT-like expressions.
//!
//! Usage:
//!   jslt transform '<expression>' [--input FILE]
//!   jslt validate '<expression>'
//!
//! Without `--input`, the document is read from stdin.

use clap::Parser;
use jslt::cli::{init_tracing, run, Args};

fn main() {
    init_tracing();
    let args = Args::parse();
    match run(&args) {
        Ok((output, ok)) => {
            println!("{output}");
            if !ok {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
