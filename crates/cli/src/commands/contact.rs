//! Custom order request command.

use std::io::Write;
use std::time::Instant;

use alyssa_loops_core::contact::{ContactRequest, FormNote};

use super::CommandError;
use crate::client::StorefrontApi;

/// Validate and send a contact request. Incomplete forms are never sent.
///
/// # Errors
///
/// Returns error if output cannot be written.
pub async fn run<W: Write>(
    request: &ContactRequest,
    api: &dyn StorefrontApi,
    out: &mut W,
) -> Result<FormNote, CommandError> {
    let note = match request.validate() {
        Err(e) => {
            tracing::debug!(error = %e, "Contact form incomplete");
            FormNote::Incomplete
        }
        Ok(valid) => {
            writeln!(out, "{}", FormNote::Sending.message())?;
            match api.submit_contact(&valid).await {
                Ok(response) if response.ok => FormNote::sent(&valid.name, Instant::now()),
                Ok(response) => {
                    tracing::warn!(error = ?response.error, "Contact request refused");
                    FormNote::Failed
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Contact request failed");
                    FormNote::Failed
                }
            }
        }
    };

    writeln!(out, "{}", note.message())?;
    Ok(note)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::commands::testing::FakeApi;

    #[tokio::test]
    async fn test_incomplete_form_is_not_sent() {
        let api = FakeApi {
            contact_ok: true,
            ..Default::default()
        };
        let mut out = Vec::new();

        let note = run(&ContactRequest::new("Ada", "  ", "hat"), &api, &mut out)
            .await
            .unwrap();
        assert_eq!(note, FormNote::Incomplete);
        assert_eq!(api.calls(), 0);
        assert_eq!(String::from_utf8(out).unwrap(), "Please fill out all fields.\n");
    }

    #[tokio::test]
    async fn test_sends_trimmed_fields() {
        let api = FakeApi {
            contact_ok: true,
            ..Default::default()
        };
        let mut out = Vec::new();

        let note = run(
            &ContactRequest::new(" Ada ", "ada@example.com", "A frog hat "),
            &api,
            &mut out,
        )
        .await
        .unwrap();
        assert!(matches!(note, FormNote::Sent { ref name, .. } if name == "Ada"));
        assert_eq!(api.contacts.lock().unwrap()[0].details, "A frog hat");
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Sending…\nThanks, Ada! Message sent ✿\n"
        );
    }

    #[tokio::test]
    async fn test_failure_note() {
        let request = ContactRequest::new("Ada", "ada@example.com", "hat");

        let refused = FakeApi::default();
        assert_eq!(
            run(&request, &refused, &mut Vec::new()).await.unwrap(),
            FormNote::Failed
        );

        let broken = FakeApi {
            fail: true,
            ..Default::default()
        };
        assert_eq!(
            run(&request, &broken, &mut Vec::new()).await.unwrap(),
            FormNote::Failed
        );
    }
}
