use crate::config::Config;
use crate::input::{LineSource, ReadLine};
use crate::transcript::Transcript;
use crate::validator::{self, Violation, MAX_EMAIL_LENGTH, MIN_EMAIL_LENGTH};
use anyhow::Result;
use std::cell::RefCell;
use std::io::Write;

pub struct Context {
    pub config: Config,
    pub session_id: String,
    pub transcript: RefCell<Option<Transcript>>,
}

impl Context {
    pub fn new(config: Config, session_id: String, transcript: Option<Transcript>) -> Self {
        Self {
            config,
            session_id,
            transcript: RefCell::new(transcript),
        }
    }

    /// Write a transcript event if a transcript is open. Failures are
    /// reported but never interrupt the prompt.
    fn record(&self, event: impl FnOnce(&mut Transcript) -> Result<()>) {
        if let Some(transcript) = self.transcript.borrow_mut().as_mut() {
            if let Err(e) = event(transcript) {
                eprintln!("Warning: failed to write transcript: {}", e);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// Input ended (EOF or Ctrl-D) before a valid address was given
    EndOfInput,
    /// Ctrl-C at the prompt
    Interrupted,
    TooManyAttempts,
}

impl AbortReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EndOfInput => "end_of_input",
            Self::Interrupted => "interrupted",
            Self::TooManyAttempts => "too_many_attempts",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Accepted(String),
    Aborted(AbortReason),
}

/// Validate each address without prompting. Returns true if all are valid.
pub fn run_once(ctx: &Context, emails: &[String], out: &mut dyn Write) -> Result<bool> {
    ctx.record(|t| t.session_start("once", None));

    let mut all_valid = true;
    for (i, email) in emails.iter().enumerate() {
        let result = validator::check_email(email);
        ctx.record(|t| t.attempt(i + 1, email, result.err()));

        match result {
            Ok(()) => writeln!(out, "✓ {}", email)?,
            Err(violation) if ctx.config.prompt.explain => {
                writeln!(out, "✗ {}: {}", email, violation)?
            }
            Err(_) => writeln!(out, "✗ {}", email)?,
        }
        all_valid &= result.is_ok();
    }

    Ok(all_valid)
}

/// The full interactive program: banner, prompt loop, closing message.
/// Returns true if an address was accepted.
pub fn run_interactive(
    ctx: &Context,
    source: &mut dyn LineSource,
    out: &mut dyn Write,
) -> Result<bool> {
    writeln!(out, "=== Email Address Validation Program ===")?;
    writeln!(out, "This program will validate your email address format.")?;
    writeln!(out)?;

    match prompt_for_email(ctx, source, out)? {
        Outcome::Accepted(email) => {
            writeln!(
                out,
                "\nSuccess! Your email '{}' has been validated and stored.",
                email
            )?;
            Ok(true)
        }
        Outcome::Aborted(_) => {
            writeln!(out, "\nProgram terminated due to input error.")?;
            Ok(false)
        }
    }
}

/// Prompt until a valid address is entered, input ends, or the attempt
/// limit is reached.
pub fn prompt_for_email(
    ctx: &Context,
    source: &mut dyn LineSource,
    out: &mut dyn Write,
) -> Result<Outcome> {
    let settings = &ctx.config.prompt;
    ctx.record(|t| t.session_start("interactive", settings.max_attempts));

    let mut attempts = 0;
    loop {
        if settings.max_attempts.is_some_and(|max| attempts >= max) {
            writeln!(out, "Error: Too many invalid attempts ({})", attempts)?;
            return Ok(abort(ctx, AbortReason::TooManyAttempts, attempts));
        }

        let line = match source.read_line(&settings.text, out)? {
            ReadLine::Line(line) => line,
            ReadLine::End => {
                writeln!(out, "Error: Failed to read input")?;
                return Ok(abort(ctx, AbortReason::EndOfInput, attempts));
            }
            ReadLine::Interrupted => {
                writeln!(out, "Error: Failed to read input")?;
                return Ok(abort(ctx, AbortReason::Interrupted, attempts));
            }
        };
        attempts += 1;

        // Length limits apply to the raw bytes, before any decoding
        if line.len() > MAX_EMAIL_LENGTH {
            writeln!(
                out,
                "Error: Email address is too long (maximum {} characters)",
                MAX_EMAIL_LENGTH
            )?;
            ctx.record(|t| t.rejected(attempts, "too_long", line.len()));
            continue;
        }

        if line.is_empty() {
            writeln!(out, "Error: Please enter a non-empty email address")?;
            ctx.record(|t| t.rejected(attempts, "empty", 0));
            continue;
        }

        let result = validator::check_email_bytes(&line);
        let shown = String::from_utf8_lossy(&line).into_owned();
        ctx.record(|t| t.attempt(attempts, &shown, result.err()));

        match result {
            Ok(()) => {
                // Accepted addresses are pure ASCII, so `shown` is exact
                writeln!(out, "✓ Valid email address entered: {}", shown)?;
                ctx.record(|t| t.accepted(&shown, attempts));
                return Ok(Outcome::Accepted(shown));
            }
            Err(violation) => {
                let explain = settings.explain.then_some(violation);
                print_checklist(out, explain)?;
            }
        }
    }
}

fn abort(ctx: &Context, reason: AbortReason, attempts: usize) -> Outcome {
    ctx.record(|t| t.aborted(reason.as_str(), attempts));
    Outcome::Aborted(reason)
}

fn print_checklist(out: &mut dyn Write, failed: Option<Violation>) -> Result<()> {
    writeln!(out, "✗ Invalid email address. Please check the following:")?;
    writeln!(out, "  - Must contain exactly one '@' symbol")?;
    writeln!(out, "  - Must have text before and after '@'")?;
    writeln!(out, "  - Domain must contain at least one '.' (dot)")?;
    writeln!(
        out,
        "  - Must end with valid domain extension (at least 2 characters)"
    )?;
    writeln!(out, "  - No spaces allowed")?;
    writeln!(out, "  - Cannot start or end with '.' or '-'")?;
    writeln!(
        out,
        "  - Length must be between {} and {} characters",
        MIN_EMAIL_LENGTH, MAX_EMAIL_LENGTH
    )?;
    if let Some(violation) = failed {
        writeln!(out, "  Failed rule: {}", violation)?;
    }
    writeln!(out)?;
    Ok(())
}
