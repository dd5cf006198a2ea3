//! Debounce gate for automatic prefill lookups.
//!
//! Each edit of the company name or email reschedules the lookup; it only
//! fires once the pair has been stable for the configured delay, and never
//! twice in a row for the same pair.

use std::time::{Duration, Instant};

use tracing::trace;

pub const DEFAULT_PREFILL_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefillKey {
    pub company_name: String,
    pub email: String,
}

impl PrefillKey {
    /// Trimmed pair, or `None` when both sides are blank.
    pub fn new(company_name: &str, email: &str) -> Option<Self> {
        let company_name = company_name.trim();
        let email = email.trim();
        if company_name.is_empty() && email.is_empty() {
            return None;
        }
        Some(Self {
            company_name: company_name.to_string(),
            email: email.to_string(),
        })
    }
}

#[derive(Debug)]
struct Pending {
    key: PrefillKey,
    due: Instant,
}

#[derive(Debug)]
pub struct PrefillGate {
    delay: Duration,
    pending: Option<Pending>,
    last_issued: Option<PrefillKey>,
}

impl Default for PrefillGate {
    fn default() -> Self {
        Self::new(DEFAULT_PREFILL_DELAY)
    }
}

impl PrefillGate {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            last_issued: None,
        }
    }

    /// Records an edit. Any pending lookup is cancelled; a new one is
    /// scheduled unless the pair is blank or was the last one issued.
    pub fn observe(&mut self, company_name: &str, email: &str, now: Instant) {
        self.pending = None;

        let Some(key) = PrefillKey::new(company_name, email) else {
            trace!("prefill cancelled: nothing to look up");
            return;
        };
        if self.last_issued.as_ref() == Some(&key) {
            trace!("prefill skipped: pair already looked up");
            return;
        }

        trace!(company = %key.company_name, email = %key.email, "prefill scheduled");
        self.pending = Some(Pending {
            key,
            due: now + self.delay,
        });
    }

    /// When the pending lookup becomes due, if there is one.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.due)
    }

    /// Releases the pending pair once it is due and remembers it as issued.
    pub fn poll(&mut self, now: Instant) -> Option<PrefillKey> {
        if self.pending.as_ref().is_none_or(|pending| now < pending.due) {
            return None;
        }
        let key = self.pending.take()?.key;
        self.last_issued = Some(key.clone());
        Some(key)
    }

    /// Forgets everything, e.g. after a successful submit.
    pub fn reset(&mut self) {
        self.pending = None;
        self.last_issued = None;
    }
}
