//! Newsletter signup command.
//!
//! Signup is a demo: nothing is sent anywhere.

use std::io::Write;
use std::time::Instant;

use alyssa_loops_core::contact::{NewsletterForm, NewsletterNote};

use super::CommandError;

/// Submit `email` to the signup form and print the note.
///
/// # Errors
///
/// Returns error if output cannot be written.
pub fn run<W: Write>(email: &str, out: &mut W) -> Result<NewsletterNote, CommandError> {
    let mut form = NewsletterForm::new(email);
    let note = form.submit(Instant::now());
    writeln!(out, "{}", note.message())?;
    Ok(note)
}
