mod cli;
mod cmd;
mod constants;
mod git;
mod progress;
mod types;

use std::{
    io,
    process::ExitCode,
    sync::atomic::{AtomicBool, Ordering},
};

use clap::Parser;
use colored::Colorize;

use crate::{cli::Cli, git::GixCloner, types::CloneError};

/// Raises the interrupt flag and reports whether it was already raised.
fn interrupt(flag: &AtomicBool) -> bool {
    flag.swap(true, Ordering::SeqCst)
}

fn main() -> ExitCode {
    env_logger::init();

    log::debug!("Started");

    let args = Cli::parse_from(cli::normalize_args(std::env::args_os()));

    if let Some(shell) = args.completion {
        cmd::completion::completion(shell, &mut io::stdout());
        return ExitCode::SUCCESS;
    }

    // The first Ctrl-C lets gix stop at its next check, a second one exits
    // even when gix is blocked and never looks at the flag.
    if let Err(e) = ctrlc::set_handler(|| {
        if interrupt(&gix::interrupt::IS_INTERRUPTED) {
            eprintln!("{}", "Interrupted".red());
            std::process::exit(130);
        }
    }) {
        log::debug!("Interrupt handler not installed: {}", e);
    }

    let cloner = GixCloner::new(!args.quiet);

    match cmd::clone::run(&args, &cloner, &mut io::stdout()) {
        Ok(_) => {
            println!("{}", "Repository cloned successfully!".green());
            ExitCode::SUCCESS
        }
        Err(e @ CloneError::MissingInput(_)) => {
            cli::print_usage(&e);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("{} {}", "Failed to clone repository:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_interrupt_is_reported_as_pending() {
        let flag = AtomicBool::new(false);

        assert!(!interrupt(&flag));
        assert!(flag.load(Ordering::SeqCst));
        assert!(interrupt(&flag));
    }
}
