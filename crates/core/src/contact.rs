//! Custom order / contact form.
//!
//! Both sides validate the same way: `name`, `email` and `details` are
//! required and must be non-empty after trimming. The client refuses to send
//! an incomplete form; the server rejects one with `400 Missing fields`.
//!
//! The newsletter signup lives here too. It never leaves the client: a
//! plausible address is acknowledged and the field is cleared.

use std::time::{Duration, Instant};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// How long a success note stays visible.
pub const NOTE_CLEAR_DELAY: Duration = Duration::from_millis(3500);

/// Contact form validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactError {
    /// One or more fields were empty.
    #[error("missing fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}

/// A contact request as submitted by the form.
///
/// Absent and `null` fields read as empty strings, so such a body is
/// reported as missing fields rather than a parse error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub details: String,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl ContactRequest {
    /// Build a request from raw form values.
    #[must_use]
    pub fn new(name: &str, email: &str, details: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            details: details.to_string(),
        }
    }

    /// Trim every field and check that none is empty.
    ///
    /// # Errors
    ///
    /// Returns [`ContactError::MissingFields`] naming each empty field.
    pub fn validate(&self) -> Result<Self, ContactError> {
        let trimmed = Self::new(self.name.trim(), self.email.trim(), self.details.trim());

        let missing: Vec<&'static str> = [
            ("name", &trimmed.name),
            ("email", &trimmed.email),
            ("details", &trimmed.details),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| field)
        .collect();

        if missing.is_empty() {
            Ok(trimmed)
        } else {
            Err(ContactError::MissingFields(missing))
        }
    }
}

/// The note shown under the contact form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormNote {
    /// Nothing shown.
    Idle,
    /// A field was empty; nothing was sent.
    Incomplete,
    /// Request in flight.
    Sending,
    /// Request accepted; the note clears itself at `clear_at`.
    Sent { name: String, clear_at: Instant },
    /// Transport error or non-ok response.
    Failed,
}

impl FormNote {
    /// Success note for `name`, expiring [`NOTE_CLEAR_DELAY`] after `now`.
    #[must_use]
    pub fn sent(name: &str, now: Instant) -> Self {
        Self::Sent {
            name: name.to_string(),
            clear_at: now + NOTE_CLEAR_DELAY,
        }
    }

    /// Text shown to the user.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Idle => String::new(),
            Self::Incomplete => "Please fill out all fields.".to_string(),
            Self::Sending => "Sending…".to_string(),
            Self::Sent { name, .. } if name.is_empty() => "Thanks! Message sent ✿".to_string(),
            Self::Sent { name, .. } => format!("Thanks, {name}! Message sent ✿"),
            Self::Failed => "Couldn’t send. Is the server running?".to_string(),
        }
    }

    /// Clear an expired success note.
    #[must_use]
    pub fn tick(self, now: Instant) -> Self {
        match self {
            Self::Sent { clear_at, .. } if clear_at <= now => Self::Idle,
            other => other,
        }
    }
}

/// The note shown under the newsletter field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewsletterNote {
    /// Nothing shown.
    Idle,
    /// Empty input or no `@`.
    InvalidEmail,
    /// Accepted; the note clears itself at `clear_at`.
    Subscribed { clear_at: Instant },
}

impl NewsletterNote {
    /// Text shown to the user.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Idle => "",
            Self::InvalidEmail => "Please enter a valid email.",
            Self::Subscribed { .. } => "Subscribed! (Demo — no email is actually sent.)",
        }
    }

    /// Clear an expired success note.
    #[must_use]
    pub fn tick(self, now: Instant) -> Self {
        match self {
            Self::Subscribed { clear_at } if clear_at <= now => Self::Idle,
            other => other,
        }
    }
}

/// Newsletter signup field and its note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsletterForm {
    pub email: String,
    pub note: NewsletterNote,
}

impl NewsletterForm {
    /// A form holding `email`.
    #[must_use]
    pub fn new(email: &str) -> Self {
        Self {
            email: email.to_string(),
            note: NewsletterNote::Idle,
        }
    }

    /// Submit the field. Only checks for a non-empty value containing `@`;
    /// on success the field is cleared. Returns the new note.
    pub fn submit(&mut self, now: Instant) -> NewsletterNote {
        let email = self.email.trim();
        self.note = if email.is_empty() || !email.contains('@') {
            NewsletterNote::InvalidEmail
        } else {
            self.email.clear();
            NewsletterNote::Subscribed {
                clear_at: now + NOTE_CLEAR_DELAY,
            }
        };
        self.note
    }

    /// Advance the note's timer.
    pub fn tick(&mut self, now: Instant) {
        self.note = self.note.tick(now);
    }
}
