//! The prompt-and-answer loop.
//!
//! Reads one password per line, prints either the flag or the error message, and moves on to
//! the next line. The loop ends at end of input or once the attempt bound is reached; a failed
//! attempt never ends it.

use crate::constants::PROMPT;
use crate::flag::FlagService;
use crate::matcher::SecretMatcher;
use passflag_types::Password;
use std::io::{self, BufRead, Write};
use std::num::NonZeroUsize;

/// What happened over one run of the loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopSummary {
    /// Lines read and run through the pipeline.
    pub attempts: usize,
    /// Attempts that produced a flag.
    pub flags: usize,
}

impl LoopSummary {
    pub fn failures(&self) -> usize {
        self.attempts - self.flags
    }
}

/// Removes one trailing `\n` or `\r\n`.
fn strip_line_ending(line: &mut Vec<u8>) {
    if line.ends_with(b"\n") {
        line.pop();
        if line.ends_with(b"\r") {
            line.pop();
        }
    }
}

/// Drives `service` with passwords read from `input`, writing prompts and results to `output`.
///
/// # Errors
///
/// Only I/O errors on `input` or `output` end the loop early. Pipeline errors are written to
/// `output` and the loop continues.
pub fn run_loop<M, R, W>(
    service: &FlagService<M>,
    mut input: R,
    mut output: W,
    max_attempts: Option<NonZeroUsize>,
) -> io::Result<LoopSummary>
where
    M: SecretMatcher,
    R: BufRead,
    W: Write,
{
    let mut summary = LoopSummary::default();

    loop {
        if max_attempts.is_some_and(|max| summary.attempts >= max.get()) {
            tracing::info!(attempts = summary.attempts, "attempt limit reached");
            break;
        }

        writeln!(output, "{PROMPT}")?;
        output.flush()?;

        let mut line = Vec::new();
        if input.read_until(b'\n', &mut line)? == 0 {
            tracing::debug!(attempts = summary.attempts, "end of input");
            break;
        }
        strip_line_ending(&mut line);
        summary.attempts += 1;

        let password = Password::new(line);
        tracing::debug!(attempt = summary.attempts, ?password, "attempt read");

        match service.flag(password.as_bytes()) {
            Ok(flag) => {
                summary.flags += 1;
                tracing::info!(attempt = summary.attempts, "flag issued");
                writeln!(output, "{flag}")?;
            }
            Err(e) => writeln!(output, "{e}")?,
        }
    }

    Ok(summary)
}
