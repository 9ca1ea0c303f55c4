use anyhow::Context;
use colored::Colorize;
use std::process::ExitCode;

fn main() -> ExitCode {
    match labgen::run().context("labgen") {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}
