//! `auc` — the `.au` dialect translator and build driver.

use std::process;

use au_build::cli;
use au_build::driver;

fn main() {
    let raw_args: Vec<String> = std::env::args().skip(1).collect();

    let opts = match cli::parse(raw_args) {
        Ok(opts) => opts,
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    };

    if opts.help {
        println!("{}", cli::usage());
        return;
    }

    if opts.inputs.is_empty() {
        eprintln!("auc: no input files");
        process::exit(1);
    }

    if let Err(err) = driver::run(&opts) {
        eprintln!("error: {err}");
        process::exit(match &err {
            au_build::BuildError::ToolchainFailure { code, .. } => *code,
            _ => 1,
        });
    }
}
