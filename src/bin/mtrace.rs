//! Entry point of the `mtrace` replay tool.

use std::process;

fn main() {
    match mtrace::cli::run() {
        Ok(status) => process::exit(status.code()),
        Err(exit) => exit.terminate(),
    }
}
