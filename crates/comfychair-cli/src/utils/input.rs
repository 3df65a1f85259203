//! User input utilities for interactive command-line prompts.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use comfychair_core::PortConfirmer;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::task::block_in_place;
use tracing::warn;

/// Prompts the user for a yes/no confirmation.
///
/// Accepts 'y', 'yes', 'n', 'no' (case insensitive).
/// Empty input is treated as 'no'.
pub fn prompt_confirmation(prompt: &str) -> Result<bool> {
    let stdin = io::stdin();
    confirm_from(&mut stdin.lock(), &mut io::stdout(), prompt)
}

fn confirm_from(input: &mut impl BufRead, output: &mut impl Write, prompt: &str) -> Result<bool> {
    loop {
        write!(output, "{prompt} (y/N): ").context("Failed to write prompt")?;
        output.flush().context("Failed to write prompt")?;

        let mut line = String::new();
        let read = input
            .read_line(&mut line)
            .context("Failed to read user input")?;
        // EOF counts as "no"
        if read == 0 {
            return Ok(false);
        }

        match line.trim().to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" | "" => return Ok(false),
            _ => eprintln!("Please enter 'y' for yes or 'n' for no."),
        }
    }
}

/// Run a blocking terminal read without stalling other tasks.
///
/// Only the multi-threaded runtime can hand its worker over; elsewhere the
/// read simply blocks the caller.
fn blocking_prompt<T>(read: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            block_in_place(read)
        }
        _ => read(),
    }
}

/// Port confirmer that asks on the terminal.
///
/// Called from inside `Supervisor::start`, so the stdin read goes through
/// [`blocking_prompt`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPortConfirmer;

impl PortConfirmer for TerminalPortConfirmer {
    fn confirm_fallback(&self, desired: u16, proposed: u16) -> bool {
        println!("Port {desired} is already in use.");
        blocking_prompt(|| prompt_confirmation(&format!("Start on port {proposed} instead?")))
            .unwrap_or_else(|e| {
                warn!(error = %e, "Cannot read confirmation, declining port fallback");
                false
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(input: &str) -> bool {
        let mut output = Vec::new();
        confirm_from(&mut input.as_bytes(), &mut output, "Remove?").unwrap()
    }

    #[test]
    fn yes_variants_confirm() {
        assert!(answer("y\n"));
        assert!(answer("YES\n"));
    }

    #[test]
    fn empty_no_and_eof_decline() {
        assert!(!answer("\n"));
        assert!(!answer("no\n"));
        assert!(!answer(""));
    }

    #[test]
    fn invalid_answer_reprompts() {
        let mut output = Vec::new();
        let confirmed = confirm_from(&mut "maybe\ny\n".as_bytes(), &mut output, "Remove?").unwrap();
        assert!(confirmed);
        assert_eq!(String::from_utf8(output).unwrap().matches("(y/N)").count(), 2);
    }

    #[test]
    fn blocking_prompt_runs_outside_a_runtime() {
        assert_eq!(blocking_prompt(|| 7), 7);
    }

    #[tokio::test]
    async fn blocking_prompt_runs_on_current_thread_runtime() {
        assert!(blocking_prompt(|| answer("yes\n")));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn blocking_prompt_runs_on_multi_thread_runtime() {
        assert!(!blocking_prompt(|| answer("n\n")));
    }
}
