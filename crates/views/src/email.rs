//! AI-drafted retention email.

use std::io;
use std::time::{Duration, Instant};

use retention_client::{ApiError, Backend};
use retention_core::Employee;
use tracing::error;

/// How long the "Copied" acknowledgement stays up.
pub const COPY_ACK_DURATION: Duration = Duration::from_secs(2);

/// Fixed single-shot prompt for a personalised meeting request.
pub fn build_prompt(employee: &Employee) -> String {
    format!(
        "Draft a professional, empathetic, and confidential retention email to an employee named {name}.\n\
         Context: They are at {risk} risk of leaving.\n\
         Key concern factors: {factors}.\n\
         Their Department: {department}.\n\
         Goal: Schedule a 1:1 meeting to discuss their career growth and satisfaction.\n\
         Tone: Supportive, not accusatory. Do not mention \"attrition score\" directly.",
        name = employee.name,
        risk = employee.risk.label,
        factors = employee.key_factors.join(", "),
        department = employee.department,
    )
}

/// Destination for the copy action.
pub trait Clipboard {
    fn copy(&mut self, text: &str) -> io::Result<()>;
}

/// Transient "copied" flag that reverts on its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyAck {
    copied_at: Option<Instant>,
}

impl CopyAck {
    pub fn mark(&mut self, now: Instant) {
        self.copied_at = Some(now);
    }

    pub fn is_active(&self, now: Instant) -> bool {
        self.copied_at
            .is_some_and(|at| now.saturating_duration_since(at) < COPY_ACK_DURATION)
    }
}

#[derive(Debug, Clone)]
pub struct EmailGenerator {
    prompt: String,
    draft: Option<String>,
    busy: bool,
    ack: CopyAck,
}

impl EmailGenerator {
    pub fn new(employee: &Employee) -> Self {
        Self {
            prompt: build_prompt(employee),
            draft: None,
            busy: false,
            ack: CopyAck::default(),
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn draft(&self) -> Option<&str> {
        self.draft.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn is_copied(&self, now: Instant) -> bool {
        self.ack.is_active(now)
    }

    /// Draft (or redraft) the email. A new draft replaces the previous one;
    /// on failure the previous draft is left as it was.
    pub async fn generate(&mut self, backend: &dyn Backend) -> bool {
        if self.busy {
            return false;
        }
        self.busy = true;
        let reply = backend.chat(&self.prompt, &[]).await;
        self.finish(reply)
    }

    pub async fn regenerate(&mut self, backend: &dyn Backend) -> bool {
        self.generate(backend).await
    }

    fn finish(&mut self, reply: Result<String, ApiError>) -> bool {
        self.busy = false;
        match reply {
            Ok(text) => {
                self.draft = Some(text);
                true
            }
            Err(e) => {
                error!(error = %e, "Email draft failed");
                false
            }
        }
    }

    /// Copy the draft. Returns `Ok(false)` when there is nothing to copy.
    pub fn copy(&mut self, clipboard: &mut dyn Clipboard, now: Instant) -> io::Result<bool> {
        let Some(draft) = self.draft.as_deref() else {
            return Ok(false);
        };
        clipboard.copy(draft)?;
        self.ack.mark(now);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{employee, unavailable, FakeBackend};
    use retention_core::{ImpactCategory, RiskLabel};

    #[derive(Default)]
    struct MemoryClipboard(Vec<String>);

    impl Clipboard for MemoryClipboard {
        fn copy(&mut self, text: &str) -> io::Result<()> {
            self.0.push(text.to_string());
            Ok(())
        }
    }

    fn subject() -> Employee {
        let mut e = employee("E9", "Priya Nair", "Sales", RiskLabel::High, ImpactCategory::Critical);
        e.key_factors = vec!["Overtime: frequent".into(), "Low income: below peers".into()];
        e
    }

    #[test]
    fn test_prompt_embeds_employee_fields() {
        let prompt = build_prompt(&subject());
        assert!(prompt.starts_with(
            "Draft a professional, empathetic, and confidential retention email to an employee named Priya Nair."
        ));
        assert!(prompt.contains("Context: They are at High Risk risk of leaving."));
        assert!(prompt.contains("Key concern factors: Overtime: frequent, Low income: below peers."));
        assert!(prompt.contains("Their Department: Sales."));
        assert!(prompt.ends_with("Do not mention \"attrition score\" directly."));
    }

    #[tokio::test]
    async fn test_generate_sends_prompt_without_history() {
        let backend = FakeBackend::default();
        let mut gen = EmailGenerator::new(&subject());
        assert!(gen.generate(&backend).await);
        let calls = backend.chat_calls.lock().unwrap();
        assert_eq!(calls[0].0, gen.prompt());
        assert!(calls[0].1.is_empty());
        assert_eq!(gen.draft(), Some(format!("re: {}", gen.prompt()).as_str()));
    }

    #[tokio::test]
    async fn test_regenerate_replaces_draft() {
        let backend = FakeBackend::default();
        {
            let mut replies = backend.chat_replies.lock().unwrap();
            replies.push_back(Ok("first".into()));
            replies.push_back(Ok("second".into()));
            replies.push_back(Err(unavailable()));
        }
        let mut gen = EmailGenerator::new(&subject());
        gen.generate(&backend).await;
        assert_eq!(gen.draft(), Some("first"));
        gen.regenerate(&backend).await;
        assert_eq!(gen.draft(), Some("second"));
        assert!(!gen.regenerate(&backend).await);
        assert_eq!(gen.draft(), Some("second"));
        assert_eq!(backend.chat_calls.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_copy_ack_expires_after_two_seconds() {
        let backend = FakeBackend::default();
        let mut gen = EmailGenerator::new(&subject());
        let mut clipboard = MemoryClipboard::default();
        let t0 = Instant::now();

        assert!(!gen.copy(&mut clipboard, t0).unwrap());
        assert!(!gen.is_copied(t0));

        gen.generate(&backend).await;
        assert!(gen.copy(&mut clipboard, t0).unwrap());
        assert_eq!(clipboard.0.len(), 1);
        assert!(gen.is_copied(t0 + Duration::from_millis(1999)));
        assert!(!gen.is_copied(t0 + Duration::from_secs(2)));
    }
}
